//! Key container files on disk.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::PathBuf;
use zeroize::Zeroizing;

use crate::format::kvm::HEADER_LEN;

/// A `.kvm` key container file.
///
/// Read-only: containers are issued by the service, never written here.
#[derive(Clone, Debug)]
pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns `true` if the key file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads the raw container bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not the size of a
    /// key container.
    pub fn load(&self) -> Result<Zeroizing<Vec<u8>>> {
        if !self.exists() {
            bail!("key file {} does not exist", self.path.display());
        }

        let data = Zeroizing::new(
            fs::read(&self.path)
                .with_context(|| format!("failed to read key file {}", self.path.display()))?,
        );

        if data.len() != HEADER_LEN {
            bail!(
                "key file {} is broken: expected {HEADER_LEN} bytes, got {}",
                self.path.display(),
                data.len()
            );
        }

        Ok(data)
    }

    /// Loads the container in the base64 form taken by
    /// [`crate::SignerOptions::key`].
    pub fn load_base64(&self) -> Result<Zeroizing<String>> {
        let data = self.load()?;
        Ok(Zeroizing::new(STANDARD.encode(&data[..])))
    }
}
