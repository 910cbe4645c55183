//! Error taxonomy of the signing engine.

use thiserror::Error;

/// The configuration handed to [`crate::SignerOptions`] is incomplete or invalid.
///
/// Detected before any cryptographic step runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("the WMID identifier is not configured")]
    WmIdNotConfigured,
    #[error("the WMID identifier '{0}' is incorrect, expected 12 digits")]
    WmIdIncorrect(String),
    #[error("the key container is not configured")]
    KeyNotConfigured,
    #[error("the key container password is not configured")]
    PasswordNotConfigured,
}

/// The key container is corrupt or not in the expected binary layout.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("key container is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("key file is broken: expected {expected} bytes, got {actual}")]
    KeyLength { expected: usize, actual: usize },
    #[error("{record}: need {needed} bytes, only {remaining} left")]
    Truncated {
        record: &'static str,
        needed: usize,
        remaining: usize,
    },
    #[error("{record}: encoded {actual} bytes, layout is {expected}")]
    Length {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("key material requested from an unverified key container")]
    Unverified,
    #[error("key container holds a zero modulus")]
    ZeroModulus,
    #[error("{0}")]
    Codec(String),
}

#[derive(Debug, Error)]
pub enum SignerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Checksum mismatch; a wrong password is the usual cause.
    #[error("key file is broken")]
    Integrity,
    #[error("secure random source unavailable: {0}")]
    Random(String),
}

impl SignerError {
    /// Whether retrying the failed call can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, SignerError::Random(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_random_failures_are_transient() {
        assert!(SignerError::Random("busy".into()).is_transient());
        assert!(!SignerError::Integrity.is_transient());
        assert!(!SignerError::from(ConfigError::KeyNotConfigured).is_transient());
        assert!(!SignerError::from(FormatError::Unverified).is_transient());
    }

    #[test]
    fn config_errors_display_through_signer_error() {
        let err = SignerError::from(ConfigError::WmIdIncorrect("1234".into()));
        assert_eq!(
            err.to_string(),
            "the WMID identifier '1234' is incorrect, expected 12 digits"
        );
    }
}
