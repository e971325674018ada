//! Stable hashing helpers for structural plan fingerprints.

use blake3::Hasher;
use serde::Serialize;

use crate::error::Result;

/// 256-bit blake3 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

pub fn hash_bytes(bytes: &[u8]) -> Fingerprint {
    Fingerprint(blake3::hash(bytes).into())
}

/// Hash a node's own serialized form together with its children's
/// fingerprints, in order.
pub fn hash_node<T: Serialize>(local: &T, children: &[Fingerprint]) -> Result<Fingerprint> {
    let mut h = Hasher::new();
    h.update(&serde_json::to_vec(local)?);
    h.update(&(children.len() as u64).to_le_bytes());
    for c in children {
        h.update(&c.0);
    }
    Ok(Fingerprint(h.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_order_matters() {
        let a = hash_bytes(b"a");
        let b = hash_bytes(b"b");
        let ab = hash_node(&"join", &[a, b]).unwrap();
        let ba = hash_node(&"join", &[b, a]).unwrap();
        assert_ne!(ab, ba);
        assert_eq!(ab, hash_node(&"join", &[a, b]).unwrap());
    }

    #[test]
    fn hex_is_64_chars() {
        assert_eq!(hash_bytes(b"x").to_hex().len(), 64);
    }
}
