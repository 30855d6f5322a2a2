use thiserror::Error;

/// Top-level error type for Raidline.
///
/// Subsystem crates define their own error types for the failures they own
/// (dialogue steps, gateway transport, chat sessions) and convert into this
/// type where a failure crosses into configuration or I/O territory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RaidError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("API error: {0}")]
    Api(String),
}

impl From<toml::de::Error> for RaidError {
    fn from(err: toml::de::Error) -> Self {
        RaidError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RaidError {
    fn from(err: toml::ser::Error) -> Self {
        RaidError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RaidError {
    fn from(err: serde_json::Error) -> Self {
        RaidError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Raidline operations.
pub type Result<T> = std::result::Result<T, RaidError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let cases: Vec<(RaidError, &str)> = vec![
            (
                RaidError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                RaidError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
            (
                RaidError::Api("unauthorized".to_string()),
                "API error: unauthorized",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RaidError = io_err.into();
        assert!(matches!(err, RaidError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let raid_err: RaidError = err.unwrap_err().into();
        assert!(matches!(raid_err, RaidError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let raid_err: RaidError = err.unwrap_err().into();
        assert!(matches!(raid_err, RaidError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
