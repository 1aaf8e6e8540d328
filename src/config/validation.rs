use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("storage.root_dir must not be empty")]
    EmptyRootDir,

    #[error("ledger.path must name a file, got '{0}'")]
    InvalidLedgerPath(String),

    #[error("ledger.lock_timeout_ms must be positive")]
    ZeroLockTimeout,

    #[error("server.max_upload_bytes must be positive")]
    ZeroUploadLimit,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_storage(config)?;
    validate_ledger(config)?;
    validate_server(config)?;
    Ok(())
}

fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    if config.storage.root_dir.as_os_str().is_empty() {
        return Err(ValidationError::EmptyRootDir);
    }
    Ok(())
}

fn validate_ledger(config: &Config) -> Result<(), ValidationError> {
    if config.ledger.path.file_name().is_none() {
        return Err(ValidationError::InvalidLedgerPath(
            config.ledger.path.display().to_string(),
        ));
    }

    if config.ledger.lock_timeout_ms == 0 {
        return Err(ValidationError::ZeroLockTimeout);
    }

    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    if config.server.max_upload_bytes == 0 {
        return Err(ValidationError::ZeroUploadLimit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_root_dir() {
        let mut config = Config::default();
        config.storage.root_dir = PathBuf::new();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyRootDir)
        ));
    }

    #[test]
    fn test_ledger_path_without_file_name() {
        let mut config = Config::default();
        config.ledger.path = PathBuf::from("saved_pdfs/..");

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidLedgerPath(_))
        ));
    }

    #[test]
    fn test_zero_lock_timeout() {
        let mut config = Config::default();
        config.ledger.lock_timeout_ms = 0;

        assert!(matches!(
            validate(&config),
            Err(ValidationError::ZeroLockTimeout)
        ));
    }

    #[test]
    fn test_zero_upload_limit() {
        let mut config = Config::default();
        config.server.max_upload_bytes = 0;

        assert!(matches!(
            validate(&config),
            Err(ValidationError::ZeroUploadLimit)
        ));
    }
}
