//! Request signing with legacy WebMoney Pro key containers.
//!
//! A `.kvm` key container is decrypted with the WMID and password, checked
//! against its stored checksum, and yields the key pair a [`Signer`] uses to
//! sign request strings.

mod container;
mod crypto;
mod error;
mod external;
mod format;
mod keyfile;
mod options;
mod request;
mod signer;

pub use crate::container::{
    ContainerFactory, ContainerState, KeyContainer, KeyPair, LegacyKeyContainer, open_legacy,
};
pub use crate::crypto::{keyed_hash, reverse_bytes, reverse_bytes_as_words, reverse_words};
pub use crate::error::{ConfigError, FormatError, SignerError};
pub use crate::external::{External, SystemExternal};
pub use crate::format::kvm::{HEADER_LEN, KeyContainerHeader, KeyData, Word};
pub use crate::format::{ByteOrder, Layout, Packed, Reader, Writer, layout_len};
pub use crate::keyfile::KeyFile;
pub use crate::options::{SignerOptions, ValidatedOptions, is_wmid};
pub use crate::request::{
    BalanceRequest, HistoryRequest, SignatureSource, SignedRequest, TransferRequest,
    current_request_number, request_number,
};
pub use crate::signer::{MessageSigner, Signer};

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// `key.kvm` in the platform configuration directory.
pub fn default_key_file() -> Result<KeyFile> {
    let project_dirs =
        ProjectDirs::from("", "", "wmsign").context("could not determine platform directories")?;

    Ok(KeyFile::new(project_dirs.config_dir().join("key.kvm")))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    pub const TEST_WMID: &str = "405002833238";
    pub const TEST_KEY: &str = "gQABADCWZW2w1EMgHCYswfVPdf6MAAAAAAAAAEIADHN9yDTlBIQnJd4W/Rk+UDGhrYiYoC5yVGjSkV9GFSkLFKgMk2r2bJDnFUAub2sc9vjXbpkcUlS8QX60Ti83ECQXbomCybZS4zN/pO0IJU77H3FBeFOvjh32PLswJaEqKGCIgU7lydVsT7KBJd9vfNhYaRNVnbH5NQdF+nmDv373G+Ovt9Y=";
    pub const TEST_PASSWORD: &str = "FvGqPdAy8reVWw789";

    pub const TEST_POWER: &str = "37dd77279d04f9284841cd2cd4ee7fbecafdb2e39b0bbf922a82476bb4485840052ee5010c16a3ead6c3aae714f0181b568977b4f63ed32e01fcc8434e341516755";
    pub const TEST_MODULUS: &str = "76026cf0faeb9fad5e701a9c20db1314c829a454c81bb2a89bb7a5e8a549d49349908a47471ede473ae40d03325c62f82afc85d0ba289605e735f93f6db1a361855";

    pub fn raw_key() -> Vec<u8> {
        STANDARD.decode(TEST_KEY).unwrap()
    }
}
