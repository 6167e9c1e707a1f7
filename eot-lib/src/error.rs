#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("csv log error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),

    /// The symbol source failed, e.g., the upstream socket could not be reached.
    #[cfg(feature = "zmq")]
    #[error("symbol source error: {0}")]
    Zmq(#[from] zmq::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
