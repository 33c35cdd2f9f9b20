//! Federation member keys.
//!
//! Members are identified by compressed secp256k1 public keys. The canonical
//! string form is lowercase hex, which is also the key format of every
//! persisted liveness record.

use std::fmt;
use std::str::FromStr;

use bitcoin::secp256k1::{self, Secp256k1};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Length of a compressed secp256k1 public key.
pub const MEMBER_KEY_LEN: usize = 33;

/// Public key of a federation member.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberKey(secp256k1::PublicKey);

impl MemberKey {
    /// Wrap a secp256k1 public key.
    pub fn new(key: secp256k1::PublicKey) -> Self {
        Self(key)
    }

    /// Parse a compressed or uncompressed key from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self(secp256k1::PublicKey::from_slice(bytes)?))
    }

    /// Parse from the canonical hex form.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        if bytes.len() != MEMBER_KEY_LEN {
            return Err(Error::invalid_key(format!(
                "expected {} bytes, got {}",
                MEMBER_KEY_LEN,
                bytes.len()
            )));
        }
        Self::from_slice(&bytes)
    }

    /// Derive the public key belonging to a 32-byte secret.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self> {
        let secp = Secp256k1::signing_only();
        let sk = secp256k1::SecretKey::from_slice(secret)?;
        Ok(Self(secp256k1::PublicKey::from_secret_key(&secp, &sk)))
    }

    /// Compressed key bytes.
    pub fn to_bytes(&self) -> [u8; MEMBER_KEY_LEN] {
        self.0.serialize()
    }

    /// Canonical lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The underlying secp256k1 key.
    pub fn inner(&self) -> &secp256k1::PublicKey {
        &self.0
    }
}

impl fmt::Debug for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for MemberKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<secp256k1::PublicKey> for MemberKey {
    fn from(key: secp256k1::PublicKey) -> Self {
        Self(key)
    }
}

// Hex in human-readable formats (JSON), raw bytes otherwise (bincode).
impl Serialize for MemberKey {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.serialize_str(&self.to_hex())
        } else {
            s.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for MemberKey {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = MemberKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a compressed secp256k1 public key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<MemberKey, E> {
                MemberKey::from_hex(v).map_err(E::custom)
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<MemberKey, E> {
                MemberKey::from_slice(v).map_err(E::custom)
            }

            fn visit_seq<A: de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<MemberKey, A::Error> {
                let mut bytes = Vec::with_capacity(MEMBER_KEY_LEN);
                while let Some(b) = seq.next_element::<u8>()? {
                    bytes.push(b);
                }
                MemberKey::from_slice(&bytes).map_err(de::Error::custom)
            }
        }

        if d.is_human_readable() {
            d.deserialize_str(KeyVisitor)
        } else {
            d.deserialize_bytes(KeyVisitor)
        }
    }
}
