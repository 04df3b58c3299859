//! Ledger key formats.
//!
//! Account keys are `G…` strkeys and contract ids are `C…` strkeys; both are
//! base32 with a version byte and a CRC16 checksum.

use stellar_strkey::{ed25519, Contract};

/// Check that `key` is a valid ed25519 account strkey.
pub fn is_valid_public_key(key: &str) -> bool {
    ed25519::PublicKey::from_string(key).is_ok()
}

/// Check that `id` is a valid contract strkey.
pub fn is_valid_contract_id(id: &str) -> bool {
    Contract::from_string(id).is_ok()
}

/// Raw ed25519 key bytes of an account strkey.
pub fn public_key_bytes(key: &str) -> Option<[u8; 32]> {
    ed25519::PublicKey::from_string(key).ok().map(|pk| pk.0)
}
