use crate::proxy::ClientError;
use crate::settings::SettingsError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config Error: {0}")]
    Config(#[from] SettingsError),

    #[error("Client Error: {0}")]
    Client(#[from] ClientError),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}
