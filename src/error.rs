use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Exchange Errors
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        status: u16,
        body: String,
    },

    #[error("Bybit API error: code {code} - {message}")]
    ApiError {
        code: i32,
        message: String,
    },

    #[error("Response deserialization failed: {0}")]
    DeserializationError(String),

    // Record Errors
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid funding rate: {0}")]
    InvalidFundingRate(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Malformed kline: expected at least {expected} fields, found {found}")]
    MalformedKline {
        expected: usize,
        found: usize,
    },

    // Analysis Errors
    #[error("Empty input")]
    EmptyInput,

    #[error("Non-finite value at index {0}")]
    NonFiniteValue(usize),

    #[error("Normalization failed: {0}")]
    NormalizationError(String),

    // Output Errors
    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::HttpError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
