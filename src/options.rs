//! Configuration surface of [`crate::Signer`].

use std::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::container::{ContainerFactory, open_legacy};
use crate::error::ConfigError;
use crate::external::{External, SystemExternal};

/// Number of digits in a WMID identifier.
pub const WMID_LEN: usize = 12;

/// Options for building a [`crate::Signer`].
///
/// ```no_run
/// use wmsign::{Signer, SignerOptions};
///
/// let signer = Signer::new(
///     SignerOptions::new()
///         .wmid("405002833238")
///         .key("gQABADCW...")
///         .password("secret"),
/// )?;
/// # Ok::<(), wmsign::SignerError>(())
/// ```
#[derive(Default)]
pub struct SignerOptions {
    wmid: Option<String>,
    key: Option<String>,
    password: Option<Zeroizing<String>>,
    container_factory: Option<ContainerFactory>,
    external: Option<Arc<dyn External>>,
}

impl fmt::Debug for SignerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerOptions")
            .field("wmid", &self.wmid)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("container_factory", &self.container_factory.is_some())
            .field("external", &self.external.is_some())
            .finish()
    }
}

impl SignerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The 12-digit WMID the key container belongs to.
    pub fn wmid(mut self, wmid: impl Into<String>) -> Self {
        self.wmid = Some(wmid.into());
        self
    }

    /// The base64-encoded `.kvm` key container.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Replaces the legacy key container implementation.
    pub fn container_factory(mut self, factory: ContainerFactory) -> Self {
        self.container_factory = Some(factory);
        self
    }

    /// Replaces the random source and record codec.
    pub fn external(mut self, external: Arc<dyn External>) -> Self {
        self.external = Some(external);
        self
    }

    /// Checks the options, filling in defaults.
    ///
    /// # Errors
    ///
    /// The first failing rule, in order: WMID missing, WMID not 12 digits,
    /// key missing, password missing. Empty values count as missing.
    pub fn validate(self) -> Result<ValidatedOptions, ConfigError> {
        let wmid = self
            .wmid
            .filter(|w| !w.is_empty())
            .ok_or(ConfigError::WmIdNotConfigured)?;

        if !is_wmid(&wmid) {
            return Err(ConfigError::WmIdIncorrect(wmid));
        }

        let key = self
            .key
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::KeyNotConfigured)?;

        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::PasswordNotConfigured)?;

        Ok(ValidatedOptions {
            wmid,
            key,
            password,
            container_factory: self
                .container_factory
                .unwrap_or_else(|| Box::new(open_legacy)),
            external: self.external.unwrap_or_else(|| Arc::new(SystemExternal)),
        })
    }
}

/// Options that passed [`SignerOptions::validate`].
pub struct ValidatedOptions {
    pub wmid: String,
    pub key: String,
    pub password: Zeroizing<String>,
    pub container_factory: ContainerFactory,
    pub external: Arc<dyn External>,
}

/// Exactly twelve ASCII digits.
///
/// Deliberately stricter than searching for a run of twelve digits: a value
/// that merely contains one, such as `"wmid 405002833238"`, is rejected.
pub fn is_wmid(value: &str) -> bool {
    value.len() == WMID_LEN && value.bytes().all(|b| b.is_ascii_digit())
}
