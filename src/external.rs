//! Operating-system primitives the signer depends on.
//!
//! Randomness and record packing are reached through [`External`] so tests
//! can substitute deterministic or failing implementations.

use crate::error::{FormatError, SignerError};
use crate::format::{self, ByteOrder, Packed};

pub trait External: Send + Sync {
    /// Fill `buf` with cryptographically secure random bytes.
    fn rand_read(&self, buf: &mut [u8]) -> Result<(), SignerError>;

    fn binary_read(
        &self,
        data: &[u8],
        order: ByteOrder,
        into: &mut dyn Packed,
    ) -> Result<(), FormatError>;

    fn binary_write(&self, from: &dyn Packed, order: ByteOrder) -> Result<Vec<u8>, FormatError>;
}

/// OS random generator and the packed codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExternal;

impl External for SystemExternal {
    fn rand_read(&self, buf: &mut [u8]) -> Result<(), SignerError> {
        getrandom::fill(buf).map_err(|e| SignerError::Random(e.to_string()))
    }

    fn binary_read(
        &self,
        data: &[u8],
        order: ByteOrder,
        into: &mut dyn Packed,
    ) -> Result<(), FormatError> {
        format::decode(data, order, into)
    }

    fn binary_write(&self, from: &dyn Packed, order: ByteOrder) -> Result<Vec<u8>, FormatError> {
        format::encode(from, order)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Deterministic randomness with optional injected failures.
    #[derive(Debug, Default, Clone)]
    pub struct TestExternal {
        random_byte: u8,
        fail_random: Option<&'static str>,
        fail_read: Option<&'static str>,
        fail_write: Option<&'static str>,
    }

    impl TestExternal {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn random_byte(mut self, byte: u8) -> Self {
            self.random_byte = byte;
            self
        }

        pub fn fail_random(mut self, msg: &'static str) -> Self {
            self.fail_random = Some(msg);
            self
        }

        pub fn fail_read(mut self, msg: &'static str) -> Self {
            self.fail_read = Some(msg);
            self
        }

        pub fn fail_write(mut self, msg: &'static str) -> Self {
            self.fail_write = Some(msg);
            self
        }
    }

    impl External for TestExternal {
        fn rand_read(&self, buf: &mut [u8]) -> Result<(), SignerError> {
            if let Some(msg) = self.fail_random {
                return Err(SignerError::Random(msg.to_string()));
            }
            buf.fill(self.random_byte);
            Ok(())
        }

        fn binary_read(
            &self,
            data: &[u8],
            order: ByteOrder,
            into: &mut dyn Packed,
        ) -> Result<(), FormatError> {
            if let Some(msg) = self.fail_read {
                return Err(FormatError::Codec(msg.to_string()));
            }
            format::decode(data, order, into)
        }

        fn binary_write(
            &self,
            from: &dyn Packed,
            order: ByteOrder,
        ) -> Result<Vec<u8>, FormatError> {
            if let Some(msg) = self.fail_write {
                return Err(FormatError::Codec(msg.to_string()));
            }
            format::encode(from, order)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_random_fills_buffer() {
        let mut a = [0u8; 40];
        let mut b = [0u8; 40];
        SystemExternal.rand_read(&mut a).unwrap();
        SystemExternal.rand_read(&mut b).unwrap();

        assert_ne!(a, b);
    }
}
