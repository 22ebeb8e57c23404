//! Implementation of multiprecision integer addition related primitives.
//!
//! The three-operand forms write into a distinct destination, the `_assign` forms update their
//! first operand in place.

use super::limb::{ct_add_l_l, ct_add_l_l_c, ct_sub_l_l_b, LimbChoice, LimbType, LIMB_BITS};

/// Add two multiprecision integers.
///
/// Returns the carry out of the most significant word.
///
/// Runs in constant time for a given operand width.
///
/// # Arguments:
///
/// * `out` - The destination for the sum.
/// * `op0` - The first addend. Must have the same length as `out`.
/// * `op1` - The second addend. Must have the same length as `out`.
///
pub fn ct_add_mp_mp(out: &mut [LimbType], op0: &[LimbType], op1: &[LimbType]) -> LimbType {
    debug_assert_eq!(out.len(), op0.len());
    debug_assert_eq!(out.len(), op1.len());
    let mut carry = 0;
    for ((o, v0), v1) in out.iter_mut().zip(op0.iter()).zip(op1.iter()) {
        (carry, *o) = ct_add_l_l_c(*v0, *v1, carry);
    }
    carry
}

/// Subtract two multiprecision integers.
///
/// Returns the borrow out of the most significant word, i.e. `1` iff `op0 < op1`.
///
/// Runs in constant time for a given operand width.
///
/// # Arguments:
///
/// * `out` - The destination for the difference.
/// * `op0` - The minuend. Must have the same length as `out`.
/// * `op1` - The subtrahend. Must have the same length as `out`.
///
pub fn ct_sub_mp_mp(out: &mut [LimbType], op0: &[LimbType], op1: &[LimbType]) -> LimbType {
    debug_assert_eq!(out.len(), op0.len());
    debug_assert_eq!(out.len(), op1.len());
    let mut borrow = 0;
    for ((o, v0), v1) in out.iter_mut().zip(op0.iter()).zip(op1.iter()) {
        (borrow, *o) = ct_sub_l_l_b(*v0, *v1, borrow);
    }
    borrow
}

/// Conditionally add `op1` to `op0` in place.
///
/// `op1` may be shorter than `op0`, in which case the carry gets propagated through the excess
/// high words of `op0`. Returns the carry out of `op0`'s most significant word.
///
/// Runs in constant time for a given configuration of operand widths.
///
/// # Arguments:
///
/// * `op0` - The first addend, overwritten by the sum.
/// * `op1` - The second addend. Its length must not exceed the length of `op0`.
/// * `cond` - Whether to actually add or just run through the motions.
///
pub fn ct_add_cond_assign_mp_mp(op0: &mut [LimbType], op1: &[LimbType], cond: LimbChoice) -> LimbType {
    debug_assert!(op1.len() <= op0.len());
    let mut carry = 0;
    for (i, v0) in op0.iter_mut().enumerate() {
        let v1 = cond.select(0, op1.get(i).copied().unwrap_or(0));
        (carry, *v0) = ct_add_l_l_c(*v0, v1, carry);
    }
    carry
}

pub fn ct_add_assign_mp_mp(op0: &mut [LimbType], op1: &[LimbType]) -> LimbType {
    ct_add_cond_assign_mp_mp(op0, op1, LimbChoice::from(1))
}

/// Add a single word to a multiprecision integer in place, returning the carry.
pub fn ct_add_assign_mp_l(op0: &mut [LimbType], op1: LimbType) -> LimbType {
    let mut carry = op1;
    for v0 in op0.iter_mut() {
        (carry, *v0) = ct_add_l_l(*v0, carry);
    }
    carry
}

/// Conditionally subtract `op1` from `op0` in place.
///
/// Returns the borrow out of `op0`'s most significant word.
///
/// Runs in constant time for a given configuration of operand widths.
///
/// # Arguments:
///
/// * `op0` - The minuend, overwritten by the difference.
/// * `op1` - The subtrahend. Its length must not exceed the length of `op0`.
/// * `cond` - Whether to actually subtract or just run through the motions.
///
pub fn ct_sub_cond_assign_mp_mp(op0: &mut [LimbType], op1: &[LimbType], cond: LimbChoice) -> LimbType {
    debug_assert!(op1.len() <= op0.len());
    let mut borrow = 0;
    for (i, v0) in op0.iter_mut().enumerate() {
        let v1 = cond.select(0, op1.get(i).copied().unwrap_or(0));
        (borrow, *v0) = ct_sub_l_l_b(*v0, v1, borrow);
    }
    borrow
}

pub fn ct_sub_assign_mp_mp(op0: &mut [LimbType], op1: &[LimbType]) -> LimbType {
    ct_sub_cond_assign_mp_mp(op0, op1, LimbChoice::from(1))
}

/// Double a multiprecision integer in place, returning the bit shifted out at the top.
pub fn ct_lshift1_assign_mp(op0: &mut [LimbType]) -> LimbType {
    let mut carry = 0;
    for v in op0.iter_mut() {
        let next_carry = *v >> (LIMB_BITS - 1);
        *v = (*v << 1) | carry;
        carry = next_carry;
    }
    carry
}

#[cfg(test)]
fn u128_to_mp(v: u128) -> [LimbType; 2] {
    [v as LimbType, (v >> 64) as LimbType]
}

#[cfg(test)]
fn mp_to_u128(v: &[LimbType]) -> u128 {
    (v[0] as u128) | ((v[1] as u128) << 64)
}

#[cfg(test)]
fn test_values() -> Vec<u128> {
    const MERSENNE_PRIME_61: u128 = (1 << 61) - 1;
    const MERSENNE_PRIME_127: u128 = (1 << 127) - 1;
    let mut values = vec![0u128, 1, u64::MAX as u128, 1 << 64, u128::MAX - 1, u128::MAX];
    for i in 0..16u128 {
        values.push(MERSENNE_PRIME_127.wrapping_mul(MERSENNE_PRIME_61.wrapping_mul(i + 5)));
    }
    values
}

#[test]
fn test_ct_add_sub_mp_mp() {
    for a in test_values() {
        for b in test_values() {
            let op0 = u128_to_mp(a);
            let op1 = u128_to_mp(b);
            let mut out = [0 as LimbType; 2];

            let carry = ct_add_mp_mp(&mut out, &op0, &op1);
            let (expected, expected_carry) = a.overflowing_add(b);
            assert_eq!(mp_to_u128(&out), expected);
            assert_eq!(carry, expected_carry as LimbType);

            let borrow = ct_sub_mp_mp(&mut out, &op0, &op1);
            let (expected, expected_borrow) = a.overflowing_sub(b);
            assert_eq!(mp_to_u128(&out), expected);
            assert_eq!(borrow, expected_borrow as LimbType);

            let mut acc = op0;
            assert_eq!(ct_add_assign_mp_mp(&mut acc, &op1), a.overflowing_add(b).1 as LimbType);
            assert_eq!(mp_to_u128(&acc), a.wrapping_add(b));
            let mut acc = op0;
            assert_eq!(ct_sub_assign_mp_mp(&mut acc, &op1), a.overflowing_sub(b).1 as LimbType);
            assert_eq!(mp_to_u128(&acc), a.wrapping_sub(b));
        }
    }
}

#[test]
fn test_ct_add_sub_cond_assign_mp_mp() {
    let mut op0: [LimbType; 2] = [!0, 0];
    let op1: [LimbType; 1] = [!0];
    assert_eq!(ct_add_cond_assign_mp_mp(&mut op0, &op1, LimbChoice::from(0)), 0);
    assert_eq!(op0, [!0, 0]);
    assert_eq!(ct_add_cond_assign_mp_mp(&mut op0, &op1, LimbChoice::from(1)), 0);
    assert_eq!(op0, [!1, 1]);

    assert_eq!(ct_sub_cond_assign_mp_mp(&mut op0, &op1, LimbChoice::from(0)), 0);
    assert_eq!(op0, [!1, 1]);
    assert_eq!(ct_sub_cond_assign_mp_mp(&mut op0, &op1, LimbChoice::from(1)), 0);
    assert_eq!(op0, [!0, 0]);

    let mut op0: [LimbType; 2] = [0, 0];
    assert_eq!(ct_sub_cond_assign_mp_mp(&mut op0, &op1, LimbChoice::from(1)), 1);
    assert_eq!(op0, [1, !0]);
}

#[test]
fn test_ct_add_assign_mp_l() {
    let mut op0: [LimbType; 3] = [!0, !0, 0];
    assert_eq!(ct_add_assign_mp_l(&mut op0, 1), 0);
    assert_eq!(op0, [0, 0, 1]);
    let mut op0: [LimbType; 2] = [!0, !0];
    assert_eq!(ct_add_assign_mp_l(&mut op0, 2), 1);
    assert_eq!(op0, [1, 0]);
}

#[test]
fn test_ct_lshift1_assign_mp() {
    for a in test_values() {
        let mut op0 = u128_to_mp(a);
        let carry = ct_lshift1_assign_mp(&mut op0);
        assert_eq!(mp_to_u128(&op0), a << 1);
        assert_eq!(carry, (a >> 127) as LimbType);
    }
}
