//! Accessors for multiprecision integers stored in byte buffers and word arrays.
//!
//! The arithmetic primitives all operate on little-endian ordered arrays of [`LimbType`] words,
//! whereas integers enter and leave the crate as big- or little-endian byte strings. This helper
//! module converts between the two and provides the constant-time selection and swapping
//! primitives everything on top builds on.

extern crate alloc;
use alloc::vec::Vec;

use super::error::{Error, Result};
use super::limb::{LimbChoice, LimbType, LIMB_BYTES};
use super::zeroizing::Zeroizing;

/// Determine the number of [`LimbType`] limbs needed to hold a multiprecision integer of `len`
/// bytes.
///
/// # Arguments
///
/// * `len` - The multiprecision integer's byte buffer length.
///
pub fn mp_ct_nlimbs(len: usize) -> usize {
    (len + LIMB_BYTES - 1) / LIMB_BYTES
}

#[test]
fn test_mp_ct_nlimbs() {
    assert_eq!(mp_ct_nlimbs(0), 0);
    assert_eq!(mp_ct_nlimbs(1), 1);
    assert_eq!(mp_ct_nlimbs(LIMB_BYTES - 1), 1);
    assert_eq!(mp_ct_nlimbs(LIMB_BYTES), 1);
    assert_eq!(mp_ct_nlimbs(LIMB_BYTES + 1), 2);
    assert_eq!(mp_ct_nlimbs(2 * LIMB_BYTES - 1), 2);
}

/// Allocate a zero-initialized word array which gets wiped on drop.
///
/// Allocation failure is reported as [`Error::Memory`] rather than aborting.
pub fn alloc_limbs(nlimbs: usize) -> Result<Zeroizing<Vec<LimbType>>> {
    let mut v = Vec::new();
    v.try_reserve_exact(nlimbs).map_err(|_| Error::Memory)?;
    v.resize(nlimbs, 0);
    Ok(Zeroizing::from(v))
}

/// Load some limb from a multiprecision integer big-endian byte buffer.
///
/// The byte buffer's length doesn't necessarily align with the size of a [`LimbType`], in which
/// case the most significant limb is stored only partially, with its virtual excess high bytes
/// defined to equal zero.
///
/// Execution time depends only on the buffer's length and the limb index `i`.
///
/// # Arguments
///
/// * `bytes` - The multiprecision integer's underlying byte buffer in big-endian order.
/// * `i` - The index of the limb to load, counted from least to most significant.
///
fn mp_be_load_l(bytes: &[u8], i: usize) -> LimbType {
    debug_assert!(i * LIMB_BYTES < bytes.len());
    let src_end = bytes.len() - i * LIMB_BYTES;
    let src_begin = src_end.saturating_sub(LIMB_BYTES);
    let mut src: [u8; LIMB_BYTES] = [0; LIMB_BYTES];
    src[LIMB_BYTES - (src_end - src_begin)..].copy_from_slice(&bytes[src_begin..src_end]);
    LimbType::from_be_bytes(src)
}

/// Store some limb into a multiprecision integer big-endian byte buffer.
///
/// If the limb is the partially covered most significant one, its excess high bytes are
/// dropped.
fn mp_be_store_l(bytes: &mut [u8], i: usize, value: LimbType) {
    debug_assert!(i * LIMB_BYTES < bytes.len());
    let dst_end = bytes.len() - i * LIMB_BYTES;
    let dst_begin = dst_end.saturating_sub(LIMB_BYTES);
    let src = value.to_be_bytes();
    bytes[dst_begin..dst_end].copy_from_slice(&src[LIMB_BYTES - (dst_end - dst_begin)..]);
}

fn mp_le_load_l(bytes: &[u8], i: usize) -> LimbType {
    debug_assert!(i * LIMB_BYTES < bytes.len());
    let src_begin = i * LIMB_BYTES;
    let src_end = (src_begin + LIMB_BYTES).min(bytes.len());
    let mut src: [u8; LIMB_BYTES] = [0; LIMB_BYTES];
    src[..src_end - src_begin].copy_from_slice(&bytes[src_begin..src_end]);
    LimbType::from_le_bytes(src)
}

fn mp_le_store_l(bytes: &mut [u8], i: usize, value: LimbType) {
    debug_assert!(i * LIMB_BYTES < bytes.len());
    let dst_begin = i * LIMB_BYTES;
    let dst_end = (dst_begin + LIMB_BYTES).min(bytes.len());
    let src = value.to_le_bytes();
    bytes[dst_begin..dst_end].copy_from_slice(&src[..dst_end - dst_begin]);
}

#[test]
fn test_mp_be_load_store_l() {
    let bytes: [u8; 11] = [0xa, 0xb, 0xc, 1, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(mp_be_load_l(&bytes, 0), 0x0102030405060708);
    assert_eq!(mp_be_load_l(&bytes, 1), 0x0a0b0c);

    let mut out = [0u8; 11];
    mp_be_store_l(&mut out, 0, 0x0102030405060708);
    mp_be_store_l(&mut out, 1, 0xffff_ffff_ff0a_0b0c);
    assert_eq!(out, bytes);
}

#[test]
fn test_mp_le_load_store_l() {
    let bytes: [u8; 11] = [8, 7, 6, 5, 4, 3, 2, 1, 0xc, 0xb, 0xa];
    assert_eq!(mp_le_load_l(&bytes, 0), 0x0102030405060708);
    assert_eq!(mp_le_load_l(&bytes, 1), 0x0a0b0c);

    let mut out = [0u8; 11];
    mp_le_store_l(&mut out, 0, 0x0102030405060708);
    mp_le_store_l(&mut out, 1, 0xffff_ffff_ff0a_0b0c);
    assert_eq!(out, bytes);
}

/// Load a big-endian byte string into a word array, zero-extending it.
///
/// # Arguments
///
/// * `out` - The destination word array, at least [`mp_ct_nlimbs(bytes.len())`](mp_ct_nlimbs)
///           words long.
/// * `bytes` - The big-endian byte string.
///
pub fn mp_limbs_from_be_bytes(out: &mut [LimbType], bytes: &[u8]) {
    let nlimbs = mp_ct_nlimbs(bytes.len());
    debug_assert!(out.len() >= nlimbs);
    for (i, l) in out.iter_mut().enumerate() {
        *l = if i < nlimbs { mp_be_load_l(bytes, i) } else { 0 };
    }
}

/// Load a little-endian byte string into a word array, zero-extending it.
pub fn mp_limbs_from_le_bytes(out: &mut [LimbType], bytes: &[u8]) {
    let nlimbs = mp_ct_nlimbs(bytes.len());
    debug_assert!(out.len() >= nlimbs);
    for (i, l) in out.iter_mut().enumerate() {
        *l = if i < nlimbs { mp_le_load_l(bytes, i) } else { 0 };
    }
}

/// Store a word array into a big-endian byte string of the destination's length.
///
/// Words, or parts of the most significant word, not fitting the destination are dropped.
/// Missing words are written as zero.
pub fn mp_limbs_to_be_bytes(out: &mut [u8], limbs: &[LimbType]) {
    for i in 0..mp_ct_nlimbs(out.len()) {
        mp_be_store_l(out, i, limbs.get(i).copied().unwrap_or(0));
    }
}

/// Store a word array into a little-endian byte string of the destination's length.
pub fn mp_limbs_to_le_bytes(out: &mut [u8], limbs: &[LimbType]) {
    for i in 0..mp_ct_nlimbs(out.len()) {
        mp_le_store_l(out, i, limbs.get(i).copied().unwrap_or(0));
    }
}

#[test]
fn test_mp_limbs_bytes_conversions() {
    let be: [u8; 9] = [0x80, 1, 2, 3, 4, 5, 6, 7, 0xff];
    let mut limbs = [!0 as LimbType; 3];
    mp_limbs_from_be_bytes(&mut limbs, &be);
    assert_eq!(limbs, [0x01020304050607ff, 0x80, 0]);

    let mut out = [0u8; 9];
    mp_limbs_to_be_bytes(&mut out, &limbs);
    assert_eq!(out, be);

    let mut le = be;
    le.reverse();
    let mut limbs_le = [!0 as LimbType; 3];
    mp_limbs_from_le_bytes(&mut limbs_le, &le);
    assert_eq!(limbs_le, limbs);

    let mut out = [0u8; 9];
    mp_limbs_to_le_bytes(&mut out, &limbs_le);
    assert_eq!(out, le);

    // Wider destination is zero-padded.
    let mut out = [0xffu8; 17];
    mp_limbs_to_be_bytes(&mut out, &limbs);
    assert_eq!(&out[..8], &[0u8; 8]);
    assert_eq!(&out[8..], &be);
}

/// Set all words of `out` to zero except for the least significant one, which is set to `v`.
pub fn mp_set_l(out: &mut [LimbType], v: LimbType) {
    for l in out.iter_mut() {
        *l = 0;
    }
    if let Some(l0) = out.first_mut() {
        *l0 = v;
    }
}

/// Conditionally select between two word arrays.
///
/// Sets `out` to `op0` if `cond` is unset and to `op1` otherwise.
///
/// Runs in constant time: the selection is done with a mask over every word of both operands.
///
/// # Arguments
///
/// * `out` - The destination. Must have the same length as the two operands.
/// * `op0` - The value selected for an unset `cond`.
/// * `op1` - The value selected for a set `cond`.
/// * `cond` - The condition.
///
pub fn ct_select_mp(out: &mut [LimbType], op0: &[LimbType], op1: &[LimbType], cond: LimbChoice) {
    debug_assert_eq!(out.len(), op0.len());
    debug_assert_eq!(out.len(), op1.len());
    for ((o, v0), v1) in out.iter_mut().zip(op0.iter()).zip(op1.iter()) {
        *o = cond.select(*v0, *v1);
    }
}

/// In-place flavour of [`ct_select_mp()`]: replace `op0` by `op1` if `cond` is set.
pub fn ct_assign_cond_mp(op0: &mut [LimbType], op1: &[LimbType], cond: LimbChoice) {
    debug_assert_eq!(op0.len(), op1.len());
    for (v0, v1) in op0.iter_mut().zip(op1.iter()) {
        *v0 = cond.select(*v0, *v1);
    }
}

/// Conditionally swap two word arrays in constant time.
pub fn ct_swap_cond_mp(op0: &mut [LimbType], op1: &mut [LimbType], cond: LimbChoice) {
    debug_assert_eq!(op0.len(), op1.len());
    for (v0, v1) in op0.iter_mut().zip(op1.iter_mut()) {
        let t = cond.select(*v0, *v1);
        *v1 = cond.select(*v1, *v0);
        *v0 = t;
    }
}

#[test]
fn test_ct_select_mp() {
    let a: [LimbType; 3] = [1, 2, 3];
    let b: [LimbType; 3] = [!0, 0, 1 << 63];

    let mut out = [0 as LimbType; 3];
    ct_select_mp(&mut out, &a, &b, LimbChoice::from_nonzero(0));
    assert_eq!(out, a);
    for cond in [0x01, 0xff, 0x8000_0000_0000_0000, !0] {
        ct_select_mp(&mut out, &a, &b, LimbChoice::from_nonzero(cond));
        assert_eq!(out, b);
    }

    let mut c = a;
    ct_assign_cond_mp(&mut c, &b, LimbChoice::from(0));
    assert_eq!(c, a);
    ct_assign_cond_mp(&mut c, &b, LimbChoice::from(1));
    assert_eq!(c, b);
}

#[test]
fn test_ct_swap_cond_mp() {
    let a: [LimbType; 3] = [1, 2, 3];
    let b: [LimbType; 3] = [!0, 0, 1 << 63];

    let (mut x, mut y) = (a, b);
    ct_swap_cond_mp(&mut x, &mut y, LimbChoice::from(0));
    assert_eq!((x, y), (a, b));
    ct_swap_cond_mp(&mut x, &mut y, LimbChoice::from_nonzero(0xff));
    assert_eq!((x, y), (b, a));
}
