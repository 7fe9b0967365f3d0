//! Counterfactual identity derivation.
//!
//! A subaccount's identity is fixed before it exists:
//!
//! ```text
//! salt     = SHA256(caller || tag)
//! identity = SHA256(0xff || factory || salt || SUBACCOUNT_CODE_HASH)[12..32]
//! ```
//!
//! Binding the caller into the salt lets two callers use the same tag without
//! colliding, and makes "whoever provisions first" the only possible controller.

use lazy_static::lazy_static;
use sha2::{Digest, Sha256};

use crate::identity::{Identity, Tag, IDENTITY_LEN};

/// Domain label hashed into [`SUBACCOUNT_CODE_HASH`].
pub const SUBACCOUNT_TEMPLATE: &[u8] = b"rust_custody.subaccount.v1";

/// Leading byte separating derived identities from other hash-addressed spaces.
const DERIVATION_PREFIX: u8 = 0xff;

lazy_static! {
    /// Hash of the subaccount template every factory provisions.
    pub static ref SUBACCOUNT_CODE_HASH: [u8; 32] = Sha256::digest(SUBACCOUNT_TEMPLATE).into();
}

/// Pure mapping from (factory, caller, tag) to a subaccount identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityDeriver;

impl IdentityDeriver {
    pub const fn new() -> Self {
        IdentityDeriver
    }

    /// Per-caller salt for a tag.
    pub fn salt(&self, caller: &Identity, tag: &Tag) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(caller.as_bytes());
        hasher.update(tag.as_bytes());
        hasher.finalize().into()
    }

    /// Identity the subaccount for `(caller, tag)` has under `factory`, whether or
    /// not it has been provisioned yet.
    pub fn derive(&self, factory: &Identity, caller: &Identity, tag: &Tag) -> Identity {
        let salt = self.salt(caller, tag);

        let mut hasher = Sha256::new();
        hasher.update([DERIVATION_PREFIX]);
        hasher.update(factory.as_bytes());
        hasher.update(salt);
        hasher.update(*SUBACCOUNT_CODE_HASH);
        let digest = hasher.finalize();

        let mut bytes = [0u8; IDENTITY_LEN];
        bytes.copy_from_slice(&digest[32 - IDENTITY_LEN..]);
        Identity::from_bytes(bytes)
    }
}
