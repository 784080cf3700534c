//! Typed failures for every remote call the viewer makes.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("{url} not found")]
    NotFound { url: String },
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },
    #[error("no `{language}` name for {resource}")]
    MissingLocalization { resource: String, language: String },
}

impl FetchError {
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return Self::from_status(url, status.as_u16());
        }
        if error.is_decode() {
            return Self::Decode {
                url: url.to_string(),
                message: error.to_string(),
            };
        }
        Self::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    pub fn from_status(url: &str, status: u16) -> Self {
        if status == 404 {
            Self::NotFound {
                url: url.to_string(),
            }
        } else {
            Self::Status {
                url: url.to_string(),
                status,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_missing_localization(&self) -> bool {
        matches!(self, Self::MissingLocalization { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_404_maps_to_not_found() {
        let error = FetchError::from_status("https://example.test/pokemon/9999", 404);
        assert!(error.is_not_found());
        let error = FetchError::from_status("https://example.test/pokemon/1", 500);
        assert_eq!(
            error,
            FetchError::Status {
                url: "https://example.test/pokemon/1".into(),
                status: 500
            }
        );
    }

    #[test]
    fn missing_localization_message_names_resource() {
        let error = FetchError::MissingLocalization {
            resource: "pokemon-species/25".into(),
            language: "ko".into(),
        };
        assert_eq!(error.to_string(), "no `ko` name for pokemon-species/25");
    }
}
