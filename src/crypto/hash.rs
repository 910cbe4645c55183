use md4::{Digest, Md4};

use super::DIGEST_LEN;

/// MD4 of `data`, as the legacy client takes it.
///
/// The client reads the 16 bytes that follow the input once the digest is
/// appended to it, which is exactly the MD4 digest.
pub fn keyed_hash(data: &[u8]) -> [u8; DIGEST_LEN] {
    let digest = Md4::digest(data);

    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_md4_reference_digests() {
        assert_eq!(hex::encode(keyed_hash(b"")), "31d6cfe0d16ae931b73c59d7e0c089c0");
        assert_eq!(hex::encode(keyed_hash(b"abc")), "a448017aaf21d8525fc10ae87aa6729d");
        assert_eq!(
            hex::encode(keyed_hash(b"1234567890")),
            "85b196c3e39457d91cab9c905f9a11c0"
        );
    }

    #[test]
    fn is_deterministic() {
        let input = b"405002833238FvGqPdAy8reVWw789";
        assert_eq!(keyed_hash(input), keyed_hash(input));
        assert_ne!(keyed_hash(input), keyed_hash(b"405002833238"));
    }
}
