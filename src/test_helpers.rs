//! Shared helpers for the unit tests: reference conversions to `num_bigint::BigUint` and
//! reproducible pseudo-random operands.
#![cfg(test)]

extern crate alloc;
use alloc::vec::Vec;

use num_bigint::BigUint;

use super::limb::LimbType;
use super::limbs_buffer::{mp_ct_nlimbs, mp_limbs_to_be_bytes, mp_limbs_to_le_bytes};

const MERSENNE_PRIME_31: LimbType = 2147483647;
const MERSENNE_PRIME_61: LimbType = 2305843009213693951;

pub fn mp_to_biguint(v: &[LimbType]) -> BigUint {
    let mut bytes = vec![0u8; v.len() * 8];
    mp_limbs_to_le_bytes(&mut bytes, v);
    BigUint::from_bytes_le(&bytes)
}

/// Big-endian byte string of exactly `len` bytes holding `v`.
pub fn biguint_to_be_bytes(v: &BigUint, len: usize) -> Vec<u8> {
    let bytes = v.to_bytes_be();
    assert!(bytes.len() <= len);
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(&bytes);
    out
}

/// Deterministic operand of `nlimbs` words, all of them populated.
pub fn mersenne_mp(nlimbs: usize, seed: LimbType) -> Vec<LimbType> {
    let mut out = Vec::with_capacity(nlimbs);
    let mut v = MERSENNE_PRIME_61.wrapping_mul(seed.wrapping_add(1));
    for i in 0..nlimbs as LimbType {
        v = v.wrapping_mul(MERSENNE_PRIME_31).wrapping_add(MERSENNE_PRIME_61 ^ i);
        out.push(v ^ (v >> 29));
    }
    out
}

/// Deterministic big-endian byte string of `len` bytes.
pub fn mersenne_bytes(len: usize, seed: LimbType) -> Vec<u8> {
    let limbs = mersenne_mp(mp_ct_nlimbs(len), seed);
    let mut out = vec![0u8; len];
    mp_limbs_to_be_bytes(&mut out, &limbs);
    out
}
