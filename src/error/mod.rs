use thiserror::Error;

/// Unified error type for the crate.
///
/// The notification store itself is pure in-memory state mutation and cannot
/// fail; errors only arise at the configuration boundary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = AppError::Validation("proxy.upstream must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: proxy.upstream must not be empty"
        );
    }
}
