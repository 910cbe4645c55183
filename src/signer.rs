use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;
use zeroize::Zeroizing;

use crate::container::KeyPair;
use crate::crypto::{DIGEST_LEN, RANDOM_LEN, keyed_hash, reverse_bytes, reverse_bytes_as_words};
use crate::error::{FormatError, SignerError};
use crate::external::External;
use crate::format::kvm::HEADER_LEN;
use crate::options::SignerOptions;

/// Length byte of the signed block: digest plus random tail (56).
const BODY_LEN: u8 = (DIGEST_LEN + RANDOM_LEN) as u8;

/// Produces the signature the service expects for a request string.
pub trait MessageSigner {
    fn sign(&self, data: &str) -> Result<String, SignerError>;
}

/// Signs with the key pair of a verified key container.
///
/// Immutable once built; safe to share between threads.
pub struct Signer {
    power: BigUint,
    modulus: BigUint,
    external: Arc<dyn External>,
}

impl Signer {
    /// Decodes, decrypts and verifies the configured key container.
    ///
    /// # Errors
    ///
    /// - [`SignerError::Config`] if the options are incomplete
    /// - [`SignerError::Format`] if the key is not base64 or not a 164-byte container
    /// - [`SignerError::Integrity`] if the checksum does not match (wrong password)
    pub fn new(options: SignerOptions) -> Result<Self, SignerError> {
        let options = options.validate()?;

        let raw = decode_key(&options.key)?;
        if raw.len() != HEADER_LEN {
            return Err(FormatError::KeyLength {
                expected: HEADER_LEN,
                actual: raw.len(),
            }
            .into());
        }

        let mut container = (options.container_factory)(
            &raw[..],
            options.wmid.as_str(),
            options.password.as_str(),
            Arc::clone(&options.external),
        )?;

        if !container.verify() {
            return Err(SignerError::Integrity);
        }

        let pair = container.extract()?;
        debug!(wmid = %options.wmid, "signer initialized");

        Self::from_key_pair(pair, options.external)
    }

    pub fn from_key_pair(pair: KeyPair, external: Arc<dyn External>) -> Result<Self, SignerError> {
        if pair.modulus.is_zero() {
            return Err(FormatError::ZeroModulus.into());
        }

        Ok(Self {
            power: pair.power,
            modulus: pair.modulus,
            external,
        })
    }

    pub fn modulus_bits(&self) -> u64 {
        self.modulus.bits()
    }

    /// Signs raw bytes; [`MessageSigner::sign`] signs their UTF-8 form.
    ///
    /// Every call draws fresh randomness, so signatures of the same input
    /// differ.
    pub fn sign_bytes(&self, data: &[u8]) -> Result<String, SignerError> {
        let mut random = Zeroizing::new([0u8; RANDOM_LEN]);
        self.external.rand_read(&mut random[..])?;

        let mut block = Zeroizing::new(Vec::with_capacity(2 + DIGEST_LEN + RANDOM_LEN));
        block.push(BODY_LEN);
        block.push(0);
        block.extend_from_slice(&keyed_hash(data));
        block.extend_from_slice(&random[..]);

        let message = BigUint::from_bytes_be(&reverse_bytes(&block));
        let result = message.modpow(&self.power, &self.modulus);

        // zero has no significant bytes
        let bytes = if result.is_zero() {
            Vec::new()
        } else {
            result.to_bytes_be()
        };

        let signature = reverse_bytes_as_words(self.external.as_ref(), &bytes)?;
        Ok(hex::encode(signature))
    }
}

/// Decodes a base64 key, skipping the line breaks of a wrapped key.
fn decode_key(key: &str) -> Result<Zeroizing<Vec<u8>>, FormatError> {
    let unwrapped: Zeroizing<Vec<u8>> = Zeroizing::new(
        key.bytes()
            .filter(|&b| b != b'\r' && b != b'\n')
            .collect(),
    );
    Ok(Zeroizing::new(STANDARD.decode(&unwrapped[..])?))
}

impl MessageSigner for Signer {
    fn sign(&self, data: &str) -> Result<String, SignerError> {
        self.sign_bytes(data.as_bytes())
    }
}
