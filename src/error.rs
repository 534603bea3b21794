//! Error types and handling for the Breeze application

use thiserror::Error;

/// Main error type for the Breeze library
#[derive(Error, Debug)]
pub enum BreezeError {
    /// Request rejected by the network layer or answered with a non-2xx status
    #[error("Network error: {message}")]
    Network {
        message: String,
        status: Option<u16>,
    },

    /// 2xx response that lacks the fields we need
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Well-formed but empty result for the requested location or query
    #[error("No data: {message}")]
    NoData { message: String },

    /// Input we refuse to act on (too-short query, missing capability)
    #[error("Unsupported input: {message}")]
    UnsupportedInput { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Preference store errors
    #[error("Preference store error: {message}")]
    Preferences { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl BreezeError {
    /// Create a new network error without a status code
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            status: None,
        }
    }

    /// Create a new network error for a non-2xx HTTP status
    pub fn http_status<S: Into<String>>(message: S, status: u16) -> Self {
        Self::Network {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new no-data error
    pub fn no_data<S: Into<String>>(message: S) -> Self {
        Self::NoData {
            message: message.into(),
        }
    }

    /// Create a new unsupported-input error
    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        Self::UnsupportedInput {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new preference store error
    pub fn preferences<S: Into<String>>(message: S) -> Self {
        Self::Preferences {
            message: message.into(),
        }
    }

    /// HTTP status carried by a network error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            BreezeError::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BreezeError::Network { .. } => "Unable to fetch air quality data.".to_string(),
            BreezeError::MalformedResponse { .. } => "No air quality data available.".to_string(),
            BreezeError::NoData { message } | BreezeError::UnsupportedInput { message } => {
                message.clone()
            }
            BreezeError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            BreezeError::Preferences { .. } => {
                "Preferences could not be saved. Check the preference store location.".to_string()
            }
            BreezeError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for BreezeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

impl From<serde_json::Error> for BreezeError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}
