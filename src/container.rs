//! The password-protected `.kvm` key container.
//!
//! A container moves through `Decrypted -> Verified | Rejected`; key
//! material can only be extracted from a verified one.

use std::fmt;
use std::sync::Arc;

use num_bigint::BigUint;
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{MASK_OFFSET, keyed_hash, reverse_bytes};
use crate::error::{FormatError, SignerError};
use crate::external::External;
use crate::format::ByteOrder;
use crate::format::kvm::{KeyContainerHeader, KeyData};

/// Signing exponent and modulus taken from a verified container.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub power: BigUint,
    pub modulus: BigUint,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("power_bits", &self.power.bits())
            .field("modulus_bits", &self.modulus.bits())
            .finish()
    }
}

pub trait KeyContainer {
    /// Recomputes the checksum of the decrypted container.
    ///
    /// A mismatch is a routine outcome (usually a wrong password), so it is
    /// reported as `false` rather than an error.
    fn verify(&mut self) -> bool;

    fn extract(&self) -> Result<KeyPair, SignerError>;
}

/// Builds a container from `(raw bytes, wmid, password, external)`.
pub type ContainerFactory = Box<
    dyn Fn(&[u8], &str, &str, Arc<dyn External>) -> Result<Box<dyn KeyContainer>, SignerError>
        + Send
        + Sync,
>;

/// Lifecycle of a [`LegacyKeyContainer`].
///
/// Only [`KeyContainer::verify`] moves a container out of `Decrypted`.
/// Extraction reads the key without changing state: a `Verified` container
/// can be extracted any number of times, and a failed extraction leaves it
/// `Verified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Decrypted,
    Verified,
    Rejected,
}

pub struct LegacyKeyContainer {
    header: KeyContainerHeader,
    external: Arc<dyn External>,
    state: ContainerState,
}

impl LegacyKeyContainer {
    /// Decodes `raw` and decrypts its key buffer with `wmid` and `password`.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if `raw` does not hold a full container header.
    pub fn new(
        raw: &[u8],
        wmid: &str,
        password: &str,
        external: Arc<dyn External>,
    ) -> Result<Self, SignerError> {
        let mut header = KeyContainerHeader::default();
        external.binary_read(raw, ByteOrder::LittleEndian, &mut header)?;
        debug!(
            sign_flag = header.sign_flag,
            length = header.length,
            "key container decoded"
        );

        let mut container = Self {
            header,
            external,
            state: ContainerState::Decrypted,
        };
        container.decrypt(wmid, password);

        Ok(container)
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    fn decrypt(&mut self, wmid: &str, password: &str) {
        let mut seed = Zeroizing::new(Vec::with_capacity(wmid.len() + password.len()));
        seed.extend_from_slice(wmid.as_bytes());
        seed.extend_from_slice(password.as_bytes());

        let mut mask = keyed_hash(&seed);
        apply_mask(&mut self.header.buffer, &mask, MASK_OFFSET);
        mask.zeroize();
    }

    /// The header as it was when the checksum was taken: sign flag and
    /// checksum zeroed.
    fn checksum_view(&self) -> KeyContainerHeader {
        KeyContainerHeader {
            reserved: self.header.reserved,
            length: self.header.length,
            buffer: self.header.buffer,
            ..KeyContainerHeader::default()
        }
    }
}

impl KeyContainer for LegacyKeyContainer {
    fn verify(&mut self) -> bool {
        let mut view = self.checksum_view();
        let encoded = self.external.binary_write(&view, ByteOrder::LittleEndian);
        view.buffer.zeroize();

        let valid = match encoded {
            Ok(bytes) => {
                let bytes = Zeroizing::new(bytes);
                keyed_hash(&bytes) == self.header.checksum
            }
            Err(e) => {
                warn!(error = %e, "unable to encode key container for checksum");
                false
            }
        };

        if valid {
            self.state = ContainerState::Verified;
            debug!("key container checksum verified");
        } else {
            self.state = ContainerState::Rejected;
            warn!("key container checksum mismatch");
        }

        valid
    }

    fn extract(&self) -> Result<KeyPair, SignerError> {
        if self.state != ContainerState::Verified {
            return Err(FormatError::Unverified.into());
        }

        let mut data = KeyData::default();
        self.external
            .binary_read(&self.header.buffer, ByteOrder::LittleEndian, &mut data)?;

        let pair = KeyPair {
            power: BigUint::from_bytes_be(&Zeroizing::new(reverse_bytes(&data.power))),
            modulus: BigUint::from_bytes_be(&reverse_bytes(&data.modulus)),
        };
        data.power.zeroize();
        debug!(modulus_bits = pair.modulus.bits(), "key material extracted");

        Ok(pair)
    }
}

impl Drop for LegacyKeyContainer {
    fn drop(&mut self) {
        self.header.buffer.zeroize();
    }
}

/// The default [`ContainerFactory`].
pub fn open_legacy(
    raw: &[u8],
    wmid: &str,
    password: &str,
    external: Arc<dyn External>,
) -> Result<Box<dyn KeyContainer>, SignerError> {
    Ok(Box::new(LegacyKeyContainer::new(raw, wmid, password, external)?))
}

/// XORs `buffer[offset..]` with `mask`, repeating the mask as needed.
fn apply_mask(buffer: &mut [u8], mask: &[u8], offset: usize) {
    for (byte, m) in buffer[offset..].iter_mut().zip(mask.iter().cycle()) {
        *byte ^= m;
    }
}
