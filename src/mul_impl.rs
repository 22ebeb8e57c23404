//! Implementation of multiprecision integer multiplication primitives.
//!
//! Whether the single word products are computed natively or from half-word lanes is decided
//! once, in [`ct_mul_l_l()`](super::limb::ct_mul_l_l). The word array primitives here are
//! bit-for-bit identical either way.

use super::add_impl::{ct_add_assign_mp_l, ct_lshift1_assign_mp};
use super::limb::{ct_add_l_l_c, ct_mul_add_l_l_l_c, ct_mul_l_l, LimbType};

/// Multiply a multiprecision integer by a word and accumulate the product.
///
/// Computes `out += op0 * op1`, propagating the carry through all of `out`, and returns the
/// carry out of `out`'s most significant word.
///
/// Runs in constant time for a given configuration of operand widths.
///
/// # Arguments
///
/// * `out` - The accumulator. Must be at least one word longer than `op0`.
/// * `op0` - The multiprecision factor.
/// * `op1` - The single word factor.
///
pub fn ct_addmul_mp_l(out: &mut [LimbType], op0: &[LimbType], op1: LimbType) -> LimbType {
    debug_assert!(out.len() > op0.len());
    let mut carry = 0;
    for (o, v0) in out.iter_mut().zip(op0.iter()) {
        (carry, *o) = ct_mul_add_l_l_l_c(*o, *v0, op1, carry);
    }
    ct_add_assign_mp_l(&mut out[op0.len()..], carry)
}

/// Multiply a multiprecision integer by a two-word scalar and accumulate the product.
///
/// Computes `out += op0 * (op1_lo + op1_hi * 2^64)` and returns the carry out of `out`'s most
/// significant word. The two partial products are interleaved: a two-word carry is moved up one
/// position per input word.
///
/// Runs in constant time for a given configuration of operand widths.
///
/// # Arguments
///
/// * `out` - The accumulator. Must be at least two words longer than `op0`.
/// * `op0` - The multiprecision factor.
/// * `op1_lo` - The scalar's low word.
/// * `op1_hi` - The scalar's high word.
///
pub fn ct_addmul128_mp(out: &mut [LimbType], op0: &[LimbType], op1_lo: LimbType, op1_hi: LimbType) -> LimbType {
    debug_assert!(out.len() >= op0.len() + 2);
    let mut carry_lo = 0;
    let mut carry_hi = 0;
    for (o, v0) in out.iter_mut().zip(op0.iter()) {
        // out[i] + v0 * op1_lo + carry_lo < 2^128.
        let (h, l) = ct_mul_add_l_l_l_c(*o, *v0, op1_lo, carry_lo);
        *o = l;
        // h + v0 * op1_hi + carry_hi <= 2^128 - 1.
        (carry_hi, carry_lo) = ct_mul_add_l_l_l_c(h, *v0, op1_hi, carry_hi);
    }
    let n = op0.len();
    let c0 = ct_add_assign_mp_l(&mut out[n..], carry_lo);
    let c1 = ct_add_assign_mp_l(&mut out[n + 1..], carry_hi);
    c0 + c1
}

/// Multiply two multiprecision integers of equal length.
///
/// Schoolbook multiplication, consuming `op1` two words at a time through
/// [`ct_addmul128_mp()`].
///
/// Runs in constant time for a given operand width.
///
/// # Arguments
///
/// * `out` - The destination for the product. Must be twice as long as the operands.
/// * `op0` - The first factor.
/// * `op1` - The second factor. Must have the same length as `op0`.
///
pub fn ct_product_mp_mp(out: &mut [LimbType], op0: &[LimbType], op1: &[LimbType]) {
    let n = op0.len();
    debug_assert_eq!(op1.len(), n);
    debug_assert_eq!(out.len(), 2 * n);
    for o in out.iter_mut() {
        *o = 0;
    }

    let mut i = 0;
    while i + 1 < n {
        let carry = ct_addmul128_mp(&mut out[i..], op0, op1[i], op1[i + 1]);
        debug_assert_eq!(carry, 0);
        i += 2;
    }
    if i < n {
        let carry = ct_addmul_mp_l(&mut out[i..], op0, op1[i]);
        debug_assert_eq!(carry, 0);
    }
}

/// Square a multiprecision integer.
///
/// Each mixed product `op0[i] * op0[j]`, `i < j`, is computed once, the sum of them doubled and
/// the diagonal squares added on top.
///
/// Runs in constant time for a given operand width.
///
/// # Arguments
///
/// * `out` - The destination for the square. Must be twice as long as `op0`.
/// * `op0` - The value to square.
///
pub fn ct_square_mp(out: &mut [LimbType], op0: &[LimbType]) {
    let n = op0.len();
    debug_assert_eq!(out.len(), 2 * n);
    for o in out.iter_mut() {
        *o = 0;
    }

    for i in 0..n {
        let mut carry = 0;
        for j in i + 1..n {
            (carry, out[i + j]) = ct_mul_add_l_l_l_c(out[i + j], op0[i], op0[j], carry);
        }
        // Not written by any previous row.
        out[i + n] = carry;
    }

    let carry = ct_lshift1_assign_mp(out);
    debug_assert_eq!(carry, 0);

    let mut carry = 0;
    for i in 0..n {
        let sq = ct_mul_l_l(op0[i], op0[i]);
        let (c, lo) = ct_add_l_l_c(out[2 * i], sq.low(), carry);
        out[2 * i] = lo;
        (carry, out[2 * i + 1]) = ct_add_l_l_c(out[2 * i + 1], sq.high(), c);
    }
    debug_assert_eq!(carry, 0);
}

#[cfg(test)]
use super::test_helpers::{mersenne_mp, mp_to_biguint};

#[test]
fn test_ct_addmul_mp_l() {
    let mut out: [LimbType; 3] = [!0, !0, 0];
    let carry = ct_addmul_mp_l(&mut out, &[!0, !0], !0);
    // (2^128 - 1) + (2^128 - 1) * (2^64 - 1) = 2^192 - 2^64
    assert_eq!(carry, 0);
    assert_eq!(out, [0, !0, !0]);

    for nlimbs in 1..6 {
        for seed in 0..8 {
            let op0 = mersenne_mp(nlimbs, seed);
            let op1 = mersenne_mp(1, seed + 100)[0];
            let mut out = mersenne_mp(nlimbs + 1, seed + 200);
            out[nlimbs] = 0;
            let expected = mp_to_biguint(&out) + mp_to_biguint(&op0) * op1;
            let carry = ct_addmul_mp_l(&mut out, &op0, op1);
            assert_eq!(carry, 0);
            assert_eq!(mp_to_biguint(&out), expected);
        }
    }
}

#[test]
fn test_ct_addmul128_mp() {
    let mut out: [LimbType; 4] = [!0, !0, 0, 0];
    let carry = ct_addmul128_mp(&mut out, &[!0, !0], !0, !0);
    // (2^128 - 1) + (2^128 - 1)^2 = 2^256 - 2^128
    assert_eq!(carry, 0);
    assert_eq!(out, [0, 0, !0, !0]);

    for nlimbs in 1..6 {
        for seed in 0..8 {
            let op0 = mersenne_mp(nlimbs, seed);
            let op1 = mersenne_mp(2, seed + 100);
            let mut out = mersenne_mp(nlimbs + 2, seed + 200);
            out[nlimbs] = 0;
            out[nlimbs + 1] = 0;
            let expected = mp_to_biguint(&out) + mp_to_biguint(&op0) * mp_to_biguint(&op1);
            let carry = ct_addmul128_mp(&mut out, &op0, op1[0], op1[1]);
            assert_eq!(carry, 0);
            assert_eq!(mp_to_biguint(&out), expected);
        }
    }
}

#[test]
fn test_ct_product_square_mp() {
    for nlimbs in 1..9 {
        for seed in 0..6 {
            let op0 = mersenne_mp(nlimbs, seed);
            let op1 = mersenne_mp(nlimbs, seed + 50);
            let mut out = vec![0; 2 * nlimbs];
            ct_product_mp_mp(&mut out, &op0, &op1);
            assert_eq!(mp_to_biguint(&out), mp_to_biguint(&op0) * mp_to_biguint(&op1));

            ct_square_mp(&mut out, &op0);
            assert_eq!(mp_to_biguint(&out), mp_to_biguint(&op0) * mp_to_biguint(&op0));
        }
    }

    let ones = [!0 as LimbType; 4];
    let mut out = [0 as LimbType; 8];
    ct_square_mp(&mut out, &ones);
    assert_eq!(mp_to_biguint(&out), mp_to_biguint(&ones) * mp_to_biguint(&ones));
    ct_product_mp_mp(&mut out, &ones, &ones);
    assert_eq!(mp_to_biguint(&out), mp_to_biguint(&ones) * mp_to_biguint(&ones));
}
