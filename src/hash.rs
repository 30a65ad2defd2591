use crate::constants::hash::{FNV1A64_OFFSET, FNV1A64_PRIME};

/// FNV-1a over raw bytes; stable across platforms and toolchains.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    fnv1a64_continue(FNV1A64_OFFSET, bytes)
}

fn fnv1a64_continue(mut hash: u64, bytes: &[u8]) -> u64 {
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV1A64_PRIME);
    }
    hash
}

pub fn stable_hash_str(seed: u64, value: &str) -> u64 {
    let hash = fnv1a64_continue(FNV1A64_OFFSET, &seed.to_le_bytes());
    fnv1a64_continue(hash, value.as_bytes())
}

/// Mix a seed with a sequence index (splitmix64 finalizer).
pub fn mix_index(seed: u64, index: u64) -> u64 {
    let mut z = seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
