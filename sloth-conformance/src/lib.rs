#![forbid(unsafe_code)]

//! Shared fixtures for the conformance suite.
//!
//! The reference vectors come from the established encoder: seed
//! `SHA-512("subspace")`, data block `SHA-512("subspace-data")`, 64 byte blocks.

use sha2::{Digest, Sha512};
use sloth_vdf::{EngineHandle, SlothConfig};

pub const REFERENCE_BLOCK_SIZE: usize = 64;
pub const REFERENCE_ROUNDS: u64 = 100;

/// Prime derived from [`reference_seed`].
pub const REFERENCE_PRIME_HEX: &str = concat!(
    "d5226c4ecb84e69bf5c089a39549e424f5f2ccbf274774931ef493cd47c0c721",
    "51496fa09e02a2f94d28ba3ccb0c36340b727adccfd97a786005dcd73d4bcf3b",
);

/// One encoded block of [`reference_block`] after [`REFERENCE_ROUNDS`] rounds.
pub const REFERENCE_ENCODED_BLOCK_HEX: &str = concat!(
    "a96c35054ed689e59d598aacd8dbd5598c38c282288251cb50fb35adfa6b3807",
    "f9427eb51be207748cf24d663b357360bf71c1295cbedd8a8134caa912e73507",
);

/// [`reference_block`] after one round.
pub const REFERENCE_ONE_ROUND_HEX: &str = concat!(
    "9c6e7d507554800f39da6c2fd50443594c1223aa79b8d252fb13cc226009b1c7",
    "5cbda38753863a462af7bbbb4425a48ef321510804fe7813d0f20ff06b68af37",
);

/// All-zero block after three rounds.
pub const ZERO_BLOCK_THREE_ROUNDS_HEX: &str = concat!(
    "08d5be7a67a3726e79db62236cf32d1405eaad182d90949f28540c4c6218f784",
    "e61b7eeef88c3c47980f175b821fca9397eec17f66727367638a8ab57f6bb29d",
);

/// 128 byte block size: seed and data are the 64 byte digests doubled, 10 rounds.
pub const WIDE_ENCODED_HEX: &str = concat!(
    "a8840ad50029ef987663fbc8d49e720b20581138aad673e6b05962a6c499ed2e",
    "786992b145ff5157937ba8fd6767eceecc66ce5ecb9460d2902d123a3f7adecf",
    "2326bd481de2c61f633e00992c1d44e47dd4dddf06c359fdc0451d102931a1df",
    "27daf6cd09eece12302ca9fc361a970939f55b089744ac88bc74f3ccf9dca43e",
);

#[must_use]
pub fn reference_seed() -> Vec<u8> {
    Sha512::digest(b"subspace").to_vec()
}

#[must_use]
pub fn reference_block() -> Vec<u8> {
    Sha512::digest(b"subspace-data").to_vec()
}

/// Two copies of the reference block.
#[must_use]
pub fn reference_data() -> Vec<u8> {
    [reference_block(), reference_block()].concat()
}

/// Handle over the reference prime.
#[must_use]
pub fn reference_handle() -> EngineHandle {
    EngineHandle::instantiate(&reference_seed(), REFERENCE_BLOCK_SIZE).expect("reference prime")
}

/// Handle with rayon disabled, for timing-sensitive checks.
#[must_use]
pub fn sequential_handle(seed: &[u8], block_size: usize) -> EngineHandle {
    let cfg = SlothConfig { parallel_blocks: false, ..SlothConfig::default() };
    EngineHandle::with_config(seed, block_size, &cfg).expect("prime")
}
