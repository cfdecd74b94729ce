use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("Invalid gateway URL {url:?}: {reason}")]
    InvalidGatewayUrl { url: String, reason: String },

    #[error("Invalid launcher configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Window {0:?} is not declared in tauri.conf.json")]
    MissingWindow(String),

    #[error(transparent)]
    Tauri(#[from] tauri::Error),
}
