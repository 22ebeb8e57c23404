//! Implementation of multiprecision integer comparison primitives.
//!
//! All operands are little-endian ordered word arrays of equal, public length. None of the
//! primitives exit early on the first differing word.

use super::limb::{ct_eq_l_l, ct_gt_l_l, ct_is_zero_l, ct_lt_l_l, LimbChoice, LimbType};

/// Compare two multiprecision integers for `==`.
///
/// Runs in constant time.
///
/// # Arguments
///
/// * `op0` - The first operand.
/// * `op1` - The second operand. Must have the same length as `op0`.
///
pub fn ct_eq_mp_mp(op0: &[LimbType], op1: &[LimbType]) -> LimbChoice {
    debug_assert_eq!(op0.len(), op1.len());
    let mut diff: LimbType = 0;
    for (v0, v1) in op0.iter().zip(op1.iter()) {
        diff |= v0 ^ v1;
    }
    LimbChoice::from(ct_is_zero_l(diff))
}

pub fn ct_neq_mp_mp(op0: &[LimbType], op1: &[LimbType]) -> LimbChoice {
    !ct_eq_mp_mp(op0, op1)
}

/// Compare two multiprecision integers for `>` and `<` at once.
///
/// Returns the pair of "greater" and "lower" flags. The words are scanned from the most
/// significant downwards and the flags only pick up the comparison of the first differing word,
/// tracked by a running "still equal" mask instead of a loop exit.
fn ct_cmp_mp_mp(op0: &[LimbType], op1: &[LimbType]) -> (LimbChoice, LimbChoice) {
    debug_assert_eq!(op0.len(), op1.len());
    let mut is_gt = LimbChoice::from(0);
    let mut is_lt = LimbChoice::from(0);
    let mut undecided = LimbChoice::from(1);
    for (v0, v1) in op0.iter().zip(op1.iter()).rev() {
        is_gt |= undecided & ct_gt_l_l(*v0, *v1);
        is_lt |= undecided & ct_lt_l_l(*v0, *v1);
        undecided &= ct_eq_l_l(*v0, *v1);
    }
    (is_gt, is_lt)
}

/// Compare two multiprecision integers for `>=`.
///
/// Runs in constant time.
///
/// # Arguments
///
/// * `op0` - The first operand.
/// * `op1` - The second operand. Must have the same length as `op0`.
///
pub fn ct_geq_mp_mp(op0: &[LimbType], op1: &[LimbType]) -> LimbChoice {
    let (_, is_lt) = ct_cmp_mp_mp(op0, op1);
    !is_lt
}

pub fn ct_gt_mp_mp(op0: &[LimbType], op1: &[LimbType]) -> LimbChoice {
    let (is_gt, _) = ct_cmp_mp_mp(op0, op1);
    is_gt
}

pub fn ct_lt_mp_mp(op0: &[LimbType], op1: &[LimbType]) -> LimbChoice {
    let (_, is_lt) = ct_cmp_mp_mp(op0, op1);
    is_lt
}

pub fn ct_is_zero_mp(op0: &[LimbType]) -> LimbChoice {
    let mut acc: LimbType = 0;
    for v in op0.iter() {
        acc |= *v;
    }
    LimbChoice::from(ct_is_zero_l(acc))
}

pub fn ct_is_one_mp(op0: &[LimbType]) -> LimbChoice {
    let mut acc: LimbType = 0;
    for (i, v) in op0.iter().enumerate() {
        acc |= if i == 0 { *v ^ 1 } else { *v };
    }
    LimbChoice::from(ct_is_zero_l(acc))
}

#[cfg(test)]
fn u128_to_mp(v: u128) -> [LimbType; 2] {
    [v as LimbType, (v >> 64) as LimbType]
}

#[test]
fn test_ct_cmp_mp_mp() {
    const MERSENNE_PRIME_61: u128 = (1 << 61) - 1;
    const MERSENNE_PRIME_89: u128 = (1 << 89) - 1;
    let mut values = vec![0u128, 1, u64::MAX as u128, 1 << 64, (1 << 64) + 1, u128::MAX];
    for i in 0..32u128 {
        values.push(MERSENNE_PRIME_89.wrapping_mul(MERSENNE_PRIME_61.wrapping_mul(i + 3)));
    }

    for a in values.iter() {
        for b in values.iter() {
            let op0 = u128_to_mp(*a);
            let op1 = u128_to_mp(*b);
            assert_eq!(ct_eq_mp_mp(&op0, &op1).unwrap() != 0, a == b);
            assert_eq!(ct_neq_mp_mp(&op0, &op1).unwrap() != 0, a != b);
            assert_eq!(ct_geq_mp_mp(&op0, &op1).unwrap() != 0, a >= b);
            assert_eq!(ct_gt_mp_mp(&op0, &op1).unwrap() != 0, a > b);
            assert_eq!(ct_lt_mp_mp(&op0, &op1).unwrap() != 0, a < b);
        }
    }
}

#[test]
fn test_ct_geq_mp_mp_low_word_irrelevant() {
    // Only the most significant differing word decides.
    let op0: [LimbType; 3] = [0, 0, 2];
    let op1: [LimbType; 3] = [!0, !0, 1];
    assert_eq!(ct_geq_mp_mp(&op0, &op1).unwrap(), 1);
    assert_eq!(ct_geq_mp_mp(&op1, &op0).unwrap(), 0);
}

#[test]
fn test_ct_is_zero_one_mp() {
    assert_eq!(ct_is_zero_mp(&[0, 0, 0]).unwrap(), 1);
    assert_eq!(ct_is_zero_mp(&[0, 0, 1]).unwrap(), 0);
    assert_eq!(ct_is_one_mp(&[1, 0, 0]).unwrap(), 1);
    assert_eq!(ct_is_one_mp(&[1, 0, 1]).unwrap(), 0);
    assert_eq!(ct_is_one_mp(&[3, 0, 0]).unwrap(), 0);
    assert_eq!(ct_is_one_mp(&[0, 0, 0]).unwrap(), 0);
}
