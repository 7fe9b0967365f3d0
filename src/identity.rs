//! Ledger identities and caller-chosen tags.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CustodyError;

/// Width of an identity in bytes.
pub const IDENTITY_LEN: usize = 20;

/// Opaque fixed-width account reference on the ledger.
///
/// Administrators, callers and subaccounts all share this type. The text form is
/// `0x` followed by 40 lowercase hex digits, which is also how it serializes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    pub const ZERO: Identity = Identity([0u8; IDENTITY_LEN]);

    pub const fn from_bytes(bytes: [u8; IDENTITY_LEN]) -> Self {
        Identity(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Fresh random identity, e.g. for a throwaway recipient.
    pub fn random() -> Self {
        let mut bytes = [0u8; IDENTITY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Identity(bytes)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Identity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_hex())
    }
}

impl FromStr for Identity {
    type Err = CustodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes = hex::decode(digits)
            .map_err(|e| CustodyError::InvalidIdentity(format!("{}: {}", s, e)))?;
        let bytes: [u8; IDENTITY_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            CustodyError::InvalidIdentity(format!(
                "{}: expected {} bytes, got {}",
                s,
                IDENTITY_LEN,
                b.len()
            ))
        })?;

        Ok(Identity(bytes))
    }
}

impl TryFrom<String> for Identity {
    type Error = CustodyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_hex()
    }
}

/// Caller-chosen byte sequence namespacing a subaccount.
///
/// Bytes are taken verbatim: the tag `"0x"` is the two bytes `0x30 0x78`, not an
/// empty hex string.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Tag(Vec<u8>);

impl Tag {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Tag(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Tag {
    fn from(bytes: &[u8]) -> Self {
        Tag(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Tag {
    fn from(bytes: Vec<u8>) -> Self {
        Tag(bytes)
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
