//! Utilities for the deploy scripts.

use alloy::primitives::{keccak256, Address, B256};

use crate::constants::{NUM_BYTES_ADDRESS, NUM_BYTES_STORAGE_SLOT};

/// The salt used to deploy `name` deterministically, given its network suffix
pub fn deterministic_salt(name: &str, suffix: &str) -> B256 {
    keccak256(format!("{name}{suffix}").as_bytes())
}

/// The address a CREATE2 deployment from `deployer` with the given salt and
/// init code lands at.
///
/// See https://eips.ethereum.org/EIPS/eip-1014
pub fn create2_address(deployer: Address, salt: B256, init_code: &[u8]) -> Address {
    let init_code_hash = keccak256(init_code);
    let preimage =
        [&[0xffu8][..], deployer.as_slice(), salt.as_slice(), init_code_hash.as_slice()].concat();

    Address::from_slice(&keccak256(preimage)[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..])
}

/// Read an address out of a storage word, in which it is right-aligned
pub fn address_from_word(word: B256) -> Address {
    Address::from_slice(&word[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..NUM_BYTES_STORAGE_SLOT])
}
