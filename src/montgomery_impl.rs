//! Montgomery context and arithmetic in Montgomery representation.
//!
//! A [`MontContext`] is built once for a given odd modulus `N` and is immutable afterwards. Numbers
//! in Montgomery form, `x * R mod N` with `R = 2^(64 * words)`, are plain word arrays of the
//! context's length, allocated through [`MontContext::new_number()`]. The arithmetic never
//! branches on the numbers' values, only on the public modulus length.

extern crate alloc;
use alloc::vec::Vec;

use tracing::debug;

use super::add_impl::{
    ct_add_assign_mp_mp, ct_add_mp_mp, ct_lshift1_assign_mp, ct_sub_assign_mp_mp, ct_sub_mp_mp,
};
use super::cmp_impl::{ct_eq_mp_mp, ct_is_one_mp, ct_is_zero_mp, ct_lt_mp_mp};
use super::error::{Error, Result};
use super::limb::{ct_add_l_l, ct_inv_mod_l, ct_mul_l_l, LimbChoice, LimbType, LIMB_BITS, LIMB_BYTES};
use super::limbs_buffer::{
    alloc_limbs, ct_assign_cond_mp, ct_select_mp, ct_swap_cond_mp, mp_ct_nlimbs,
    mp_limbs_from_be_bytes, mp_limbs_to_be_bytes, mp_set_l,
};
use super::mul_impl::{ct_addmul128_mp, ct_addmul_mp_l, ct_product_mp_mp, ct_square_mp};
use super::zeroizing::Zeroizing;

/// A number in Montgomery representation, wiped on drop.
pub type MontNumber = Zeroizing<Vec<LimbType>>;

/// Compute `-n0^{-1} mod 2^LIMB_BITS` for the modulus' least significant word `n0`.
pub fn ct_montgomery_neg_n0_inv_mod_l(n0: LimbType) -> LimbType {
    let n0_inv_mod_l = ct_inv_mod_l(n0);
    (!n0_inv_mod_l).wrapping_add(1)
}

#[test]
fn test_ct_montgomery_neg_n0_inv_mod_l() {
    for n0 in 0 as LimbType..128 {
        let n0 = 2 * n0 + 1;
        for j in 0..2048 {
            const MERSENNE_PRIME_13: LimbType = 8191 as LimbType;
            let v = MERSENNE_PRIME_13.wrapping_mul((511 as LimbType).wrapping_mul(j));
            let v = v << 8;
            let n0 = n0.wrapping_add(v);
            let neg_n0_inv = ct_montgomery_neg_n0_inv_mod_l(n0);
            assert_eq!(n0.wrapping_mul(neg_n0_inv), !0);
        }
    }
}

/// Temporaries for the Montgomery multiplication.
///
/// One scratch area may be reused for any number of operations under the same context, but
/// must not be shared between concurrent computations.
#[derive(Clone)]
pub struct MontScratch {
    /// Double width product plus one extra word catching the reduction's carry.
    t: Zeroizing<Vec<LimbType>>,
    tmp: Zeroizing<Vec<LimbType>>,
}

impl MontScratch {
    fn new(words: usize) -> Result<Self> {
        Ok(Self { t: alloc_limbs(2 * words + 1)?, tmp: alloc_limbs(words)? })
    }
}

/// Precomputed values for Montgomery arithmetic modulo some odd `N > 1`.
#[derive(Clone, Debug)]
pub struct MontContext {
    /// Length of the modulus in bytes, as supplied at construction.
    modulus_len: usize,
    words: usize,
    modulus: Vec<LimbType>,
    /// `R^2 mod N`.
    r2_mod_n: Vec<LimbType>,
    /// `-N^{-1} mod 2^64`.
    m0: LimbType,
    /// `R mod N`, i.e. the number one in Montgomery form.
    r_mod_n: Vec<LimbType>,
    /// `N - 2`, a plain integer.
    modulus_min_2: Vec<LimbType>,
}

impl MontContext {
    /// Create a Montgomery context for the big-endian encoded `modulus`.
    ///
    /// # Errors
    ///
    /// * [`Error::NotEnoughData`] - `modulus` is empty.
    /// * [`Error::Value`] - the modulus is even or `<= 1`.
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn new(modulus: &[u8]) -> Result<Self> {
        if modulus.is_empty() {
            debug!("rejecting empty modulus");
            return Err(Error::NotEnoughData);
        }

        let words = mp_ct_nlimbs(modulus.len());
        let mut n = try_alloc_vec(words)?;
        mp_limbs_from_be_bytes(&mut n, modulus);

        if n[0] & 1 == 0 {
            debug!("rejecting even modulus");
            return Err(Error::Value);
        }
        if ct_is_one_mp(&n).unwrap() != 0 {
            debug!("rejecting modulus equal to one");
            return Err(Error::Value);
        }

        let m0 = ct_montgomery_neg_n0_inv_mod_l(n[0]);
        let r2_mod_n = Self::compute_r2_mod_n(&n)?;

        let mut modulus_min_2 = try_alloc_vec(words)?;
        let mut two = try_alloc_vec(words)?;
        mp_set_l(&mut two, 2);
        let borrow = ct_sub_mp_mp(&mut modulus_min_2, &n, &two);
        debug_assert_eq!(borrow, 0);

        let mut ctx = Self {
            modulus_len: modulus.len(),
            words,
            modulus: n,
            r2_mod_n,
            m0,
            r_mod_n: Vec::new(),
            modulus_min_2,
        };

        // R mod N = REDC(1 * R^2).
        let mut scratch = ctx.new_scratch()?;
        let mut r_mod_n = try_alloc_vec(words)?;
        let mut one = try_alloc_vec(words)?;
        mp_set_l(&mut one, 1);
        ctx.mult(&mut r_mod_n, &one, &ctx.r2_mod_n, &mut scratch);
        ctx.r_mod_n = r_mod_n;

        Ok(ctx)
    }

    /// Compute `R^2 mod N` by doubling the number one `2 * 64 * words` times, reducing after each
    /// step.
    ///
    /// A reduced value at most doubles, so a single conditional subtraction suffices per step.
    fn compute_r2_mod_n(n: &[LimbType]) -> Result<Vec<LimbType>> {
        let words = n.len();
        let mut r2 = try_alloc_vec(words)?;
        let mut tmp = alloc_limbs(words)?;
        mp_set_l(&mut r2, 1);
        for _ in 0..2 * LIMB_BITS as usize * words {
            let carry = ct_lshift1_assign_mp(&mut r2);
            let borrow = ct_sub_mp_mp(&mut tmp, &r2, n);
            let reduce = LimbChoice::from(carry) | !LimbChoice::from(borrow);
            ct_assign_cond_mp(&mut r2, &tmp, reduce);
        }
        Ok(r2)
    }

    /// Number of words in each number of this context.
    pub fn words(&self) -> usize {
        self.words
    }

    /// Length in bytes of the modulus as given to [`MontContext::new()`].
    pub fn modulus_len(&self) -> usize {
        self.modulus_len
    }

    /// The modulus as a plain word array.
    pub fn modulus(&self) -> &[LimbType] {
        &self.modulus
    }

    /// Allocate a number, initialized to zero.
    pub fn new_number(&self) -> Result<MontNumber> {
        alloc_limbs(self.words)
    }

    /// Allocate the temporaries needed by the arithmetic.
    pub fn new_scratch(&self) -> Result<MontScratch> {
        MontScratch::new(self.words)
    }

    /// Encode a big-endian byte string into Montgomery form.
    ///
    /// # Errors
    ///
    /// * [`Error::NotEnoughData`] - `number` is empty.
    /// * [`Error::Value`] - the number is not smaller than the modulus.
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn from_bytes(&self, number: &[u8]) -> Result<MontNumber> {
        if number.is_empty() {
            return Err(Error::NotEnoughData);
        }

        // Leading zeroes are public padding.
        let first_nonzero = number.iter().position(|b| *b != 0).unwrap_or(number.len());
        let number = &number[first_nonzero..];
        if number.len() > self.words * LIMB_BYTES {
            debug!("rejecting number longer than the modulus");
            return Err(Error::Value);
        }

        let mut tmp = alloc_limbs(self.words)?;
        mp_limbs_from_be_bytes(&mut tmp, number);
        if ct_lt_mp_mp(&tmp, &self.modulus).unwrap() == 0 {
            debug!("rejecting number not smaller than the modulus");
            return Err(Error::Value);
        }

        let mut scratch = self.new_scratch()?;
        let mut encoded = self.new_number()?;
        self.mult(&mut encoded, &tmp, &self.r2_mod_n, &mut scratch);
        Ok(encoded)
    }

    /// Decode a number out of Montgomery form into a big-endian byte string.
    ///
    /// The output is zero-padded to `out.len()`.
    ///
    /// # Errors
    ///
    /// * [`Error::NotEnoughData`] - `out` is shorter than the modulus.
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn to_bytes(&self, out: &mut [u8], a: &[LimbType]) -> Result<()> {
        if out.len() < self.modulus_len {
            return Err(Error::NotEnoughData);
        }
        let mut scratch = self.new_scratch()?;
        let mut one = alloc_limbs(self.words)?;
        mp_set_l(&mut one, 1);
        let mut decoded = alloc_limbs(self.words)?;
        self.mult(&mut decoded, a, &one, &mut scratch);
        mp_limbs_to_be_bytes(out, &decoded);
        Ok(())
    }

    /// Encode a small public integer into Montgomery form.
    ///
    /// Zero and one are copied from precomputed values, anything else gets multiplied by
    /// `R^2 mod N`.
    pub fn set(&self, out: &mut [LimbType], x: u64, scratch: &mut MontScratch) {
        debug_assert_eq!(out.len(), self.words);
        match x {
            0 => mp_set_l(out, 0),
            1 => out.copy_from_slice(&self.r_mod_n),
            _ => {
                // x < R and R^2 mod N < N keep the product within REDC's input range.
                let nw = self.words;
                scratch.t.fill(0);
                let carry = ct_addmul_mp_l(&mut scratch.t[..nw + 1], &self.r2_mod_n, x);
                debug_assert_eq!(carry, 0);
                self.redc(out, scratch);
            }
        }
    }

    /// Allocate a number and encode a small public integer into it.
    pub fn from_u64(&self, x: u64) -> Result<MontNumber> {
        let mut scratch = self.new_scratch()?;
        let mut out = self.new_number()?;
        self.set(&mut out, x, &mut scratch);
        Ok(out)
    }

    /// Montgomery reduction of the double width product held in `scratch.t`.
    ///
    /// The multiplier for two words is derived at once and the corresponding multiple of `N`
    /// added in a single pass. The final conditional subtraction is done with a mask.
    fn redc(&self, out: &mut [LimbType], scratch: &mut MontScratch) {
        let nw = self.words;
        let n = &self.modulus;
        let m0 = self.m0;
        let t = &mut scratch.t[..];
        debug_assert_eq!(t.len(), 2 * nw + 1);

        let mut i = 0;
        while i + 1 < nw {
            let k0 = t[i].wrapping_mul(m0);
            let prod = ct_mul_l_l(k0, n[0]);
            let (c, _) = ct_add_l_l(prod.low(), t[i]);
            // Word i + 1 after adding k0 * N, modulo 2^64.
            let t_i1 = t[i + 1]
                .wrapping_add(n[1].wrapping_mul(k0))
                .wrapping_add(prod.high())
                .wrapping_add(c);
            let k1 = t_i1.wrapping_mul(m0);
            let carry = ct_addmul128_mp(&mut t[i..], n, k0, k1);
            debug_assert_eq!(carry, 0);
            debug_assert_eq!(t[i], 0);
            debug_assert_eq!(t[i + 1], 0);
            i += 2;
        }
        if i < nw {
            let k0 = t[i].wrapping_mul(m0);
            let carry = ct_addmul_mp_l(&mut t[i..], n, k0);
            debug_assert_eq!(carry, 0);
            debug_assert_eq!(t[i], 0);
        }

        // The result t[nw..] is < 2N, possibly with a carry in the extra top word.
        let borrow = ct_sub_mp_mp(&mut scratch.tmp, &t[nw..2 * nw], n);
        let reduce = LimbChoice::from_nonzero(t[2 * nw]) | !LimbChoice::from(borrow);
        ct_select_mp(out, &t[nw..2 * nw], &scratch.tmp, reduce);
    }

    /// Montgomery multiplication: `out = a * b * R^{-1} mod N`.
    ///
    /// Runs in constant time.
    ///
    /// # Arguments
    ///
    /// * `out` - The destination, distinct from the operands.
    /// * `a` - The first factor, `< N`.
    /// * `b` - The second factor, `< N`.
    /// * `scratch` - Temporaries from [`MontContext::new_scratch()`].
    ///
    pub fn mult(&self, out: &mut [LimbType], a: &[LimbType], b: &[LimbType], scratch: &mut MontScratch) {
        let nw = self.words;
        debug_assert_eq!(out.len(), nw);
        debug_assert_eq!(a.len(), nw);
        debug_assert_eq!(b.len(), nw);

        if core::ptr::eq(a, b) {
            ct_square_mp(&mut scratch.t[..2 * nw], a);
        } else {
            ct_product_mp_mp(&mut scratch.t[..2 * nw], a, b);
        }
        scratch.t[2 * nw] = 0;
        self.redc(out, scratch);
    }

    /// In-place Montgomery multiplication: `a = a * b * R^{-1} mod N`.
    pub fn mult_assign(&self, a: &mut [LimbType], b: &[LimbType], scratch: &mut MontScratch) {
        let nw = self.words;
        ct_product_mp_mp(&mut scratch.t[..2 * nw], a, b);
        scratch.t[2 * nw] = 0;
        self.redc(a, scratch);
    }

    /// In-place Montgomery squaring: `a = a^2 * R^{-1} mod N`.
    pub fn square_assign(&self, a: &mut [LimbType], scratch: &mut MontScratch) {
        let nw = self.words;
        ct_square_mp(&mut scratch.t[..2 * nw], a);
        scratch.t[2 * nw] = 0;
        self.redc(a, scratch);
    }

    /// Modular addition: `out = a + b mod N`.
    ///
    /// Runs in constant time.
    pub fn add(&self, out: &mut [LimbType], a: &[LimbType], b: &[LimbType], scratch: &mut MontScratch) {
        let carry = ct_add_mp_mp(out, a, b);
        let borrow = ct_sub_mp_mp(&mut scratch.tmp, out, &self.modulus);
        let reduce = LimbChoice::from(carry) | !LimbChoice::from(borrow);
        ct_assign_cond_mp(out, &scratch.tmp, reduce);
    }

    /// In-place modular addition: `a = a + b mod N`.
    pub fn add_assign(&self, a: &mut [LimbType], b: &[LimbType], scratch: &mut MontScratch) {
        let carry = ct_add_assign_mp_mp(a, b);
        let borrow = ct_sub_mp_mp(&mut scratch.tmp, a, &self.modulus);
        let reduce = LimbChoice::from(carry) | !LimbChoice::from(borrow);
        ct_assign_cond_mp(a, &scratch.tmp, reduce);
    }

    /// Modular subtraction: `out = a - b mod N`.
    ///
    /// Runs in constant time.
    pub fn sub(&self, out: &mut [LimbType], a: &[LimbType], b: &[LimbType], scratch: &mut MontScratch) {
        let borrow = ct_sub_mp_mp(out, a, b);
        let carry = ct_add_mp_mp(&mut scratch.tmp, out, &self.modulus);
        debug_assert!(borrow == 0 || carry == 1);
        ct_assign_cond_mp(out, &scratch.tmp, LimbChoice::from(borrow));
    }

    /// In-place modular subtraction: `a = a - b mod N`.
    pub fn sub_assign(&self, a: &mut [LimbType], b: &[LimbType], scratch: &mut MontScratch) {
        let borrow = ct_sub_assign_mp_mp(a, b);
        ct_add_mp_mp(&mut scratch.tmp, a, &self.modulus);
        ct_assign_cond_mp(a, &scratch.tmp, LimbChoice::from(borrow));
    }

    /// Modular negation: `out = -a mod N`, mapping zero to zero.
    pub fn neg(&self, out: &mut [LimbType], a: &[LimbType]) {
        let borrow = ct_sub_mp_mp(out, &self.modulus, a);
        debug_assert_eq!(borrow, 0);
        let is_zero = ct_is_zero_mp(a);
        for o in out.iter_mut() {
            *o = is_zero.select(*o, 0);
        }
    }

    /// Modular inversion by Fermat's little theorem: `out = a^(N-2) mod N`.
    ///
    /// The modulus must be prime and public: the square-and-multiply ladder branches on the bits
    /// of `N - 2`. It does not branch on `a`. The primality is not verified; for a composite `N`
    /// the result is meaningless. Zero maps to zero.
    pub fn inv_prime(&self, out: &mut [LimbType], a: &[LimbType], scratch: &mut MontScratch) {
        let exp = &self.modulus_min_2;
        let bit = |i: usize| (exp[i / LIMB_BITS as usize] >> (i % LIMB_BITS as usize)) & 1;

        let mut nbits = self.words * LIMB_BITS as usize;
        while nbits > 0 && bit(nbits - 1) == 0 {
            nbits -= 1;
        }

        out.copy_from_slice(&self.r_mod_n);
        for i in (0..nbits).rev() {
            self.square_assign(out, scratch);
            if bit(i) != 0 {
                self.mult_assign(out, a, scratch);
            }
        }
    }

    pub fn copy(&self, out: &mut [LimbType], a: &[LimbType]) {
        out.copy_from_slice(a);
    }

    pub fn is_zero(&self, a: &[LimbType]) -> LimbChoice {
        ct_is_zero_mp(a)
    }

    /// Whether `a` is the number one in Montgomery form.
    pub fn is_one(&self, a: &[LimbType]) -> LimbChoice {
        ct_eq_mp_mp(a, &self.r_mod_n)
    }

    pub fn is_equal(&self, a: &[LimbType], b: &[LimbType]) -> LimbChoice {
        ct_eq_mp_mp(a, b)
    }

    /// Set `out` to `a` if `cond` is unset and to `b` otherwise, without branching.
    pub fn select(&self, out: &mut [LimbType], a: &[LimbType], b: &[LimbType], cond: LimbChoice) {
        ct_select_mp(out, a, b, cond)
    }

    /// Swap `a` and `b` if `cond` is set, without branching.
    pub fn cswap(&self, a: &mut [LimbType], b: &mut [LimbType], cond: LimbChoice) {
        ct_swap_cond_mp(a, b, cond)
    }
}

fn try_alloc_vec(nlimbs: usize) -> Result<Vec<LimbType>> {
    let mut v = Vec::new();
    v.try_reserve_exact(nlimbs).map_err(|_| Error::Memory)?;
    v.resize(nlimbs, 0);
    Ok(v)
}

#[cfg(test)]
use super::test_helpers::{biguint_to_be_bytes, mersenne_bytes, mp_to_biguint};

#[cfg(test)]
use num_bigint::BigUint;

#[cfg(test)]
fn decode(ctx: &MontContext, a: &[LimbType]) -> BigUint {
    let mut out = vec![0u8; ctx.modulus_len()];
    ctx.to_bytes(&mut out, a).unwrap();
    BigUint::from_bytes_be(&out)
}

#[test]
fn test_mont_context_new_errors() {
    assert_eq!(MontContext::new(&[]).unwrap_err(), Error::NotEnoughData);
    assert_eq!(MontContext::new(&[0x10, 0x00]).unwrap_err(), Error::Value);
    assert_eq!(MontContext::new(&[0x00]).unwrap_err(), Error::Value);
    assert_eq!(MontContext::new(&[0x01]).unwrap_err(), Error::Value);
    assert_eq!(MontContext::new(&[0x00, 0x00, 0x01]).unwrap_err(), Error::Value);
    assert!(MontContext::new(&[0x03]).is_ok());
}

#[test]
fn test_mont_context_constants() {
    for len in [1usize, 8, 9, 16, 31, 64, 256] {
        let mut n = mersenne_bytes(len, len as LimbType);
        n[0] |= 0x80;
        n[len - 1] |= 1;
        let ctx = MontContext::new(&n).unwrap();
        let nb = BigUint::from_bytes_be(&n);
        let r = BigUint::from(1u8) << (64 * ctx.words());

        assert_eq!(mp_to_biguint(&ctx.r2_mod_n), (&r * &r) % &nb);
        assert_eq!(mp_to_biguint(&ctx.r_mod_n), &r % &nb);
        assert_eq!(mp_to_biguint(&ctx.modulus_min_2), nb.clone() - 2u32);
        assert_eq!(ctx.modulus[0].wrapping_mul(ctx.m0), !0);
    }
}

#[test]
fn test_mont_round_trip() {
    let n = mersenne_bytes(40, 7);
    let mut n = n;
    n[39] |= 1;
    n[0] |= 0x80;
    let ctx = MontContext::new(&n).unwrap();
    for seed in 0..16 {
        let mut x = mersenne_bytes(40, seed + 300);
        x[0] &= 0x7f;
        let a = ctx.from_bytes(&x).unwrap();
        let mut out = vec![0u8; 40];
        ctx.to_bytes(&mut out, &a).unwrap();
        assert_eq!(out, x);
    }

    // Wider outputs get zero-padded, shorter ones are rejected.
    let a = ctx.from_bytes(&[0x12, 0x34]).unwrap();
    let mut out = vec![0xffu8; 41];
    ctx.to_bytes(&mut out, &a).unwrap();
    assert_eq!(&out[..39], &[0u8; 39]);
    assert_eq!(&out[39..], &[0x12, 0x34]);
    let mut out = vec![0u8; 39];
    assert_eq!(ctx.to_bytes(&mut out, &a).unwrap_err(), Error::NotEnoughData);
}

#[test]
fn test_mont_from_bytes_range() {
    let ctx = MontContext::new(&[0x00, 0x61]).unwrap();
    assert!(ctx.from_bytes(&[0x60]).is_ok());
    assert!(ctx.from_bytes(&[0x00, 0x00, 0x00, 0x60]).is_ok());
    assert_eq!(ctx.from_bytes(&[0x61]).unwrap_err(), Error::Value);
    assert_eq!(ctx.from_bytes(&[0x01, 0x00]).unwrap_err(), Error::Value);
    assert_eq!(ctx.from_bytes(&[]).unwrap_err(), Error::NotEnoughData);
    assert_eq!(ctx.from_bytes(&[1, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap_err(), Error::Value);
}

#[test]
fn test_mont_mult_exhaustive_97() {
    let ctx = MontContext::new(&[97]).unwrap();
    let mut scratch = ctx.new_scratch().unwrap();
    let mut out = ctx.new_number().unwrap();
    for a in 0..97u64 {
        let am = ctx.from_u64(a).unwrap();
        for b in 0..97u64 {
            let bm = ctx.from_bytes(&[b as u8]).unwrap();
            ctx.mult(&mut out, &am, &bm, &mut scratch);
            assert_eq!(decode(&ctx, &out), BigUint::from((a * b) % 97));

            ctx.add(&mut out, &am, &bm, &mut scratch);
            assert_eq!(decode(&ctx, &out), BigUint::from((a + b) % 97));

            ctx.sub(&mut out, &am, &bm, &mut scratch);
            assert_eq!(decode(&ctx, &out), BigUint::from((97 + a - b) % 97));
        }
        ctx.mult(&mut out, &am, &am, &mut scratch);
        assert_eq!(decode(&ctx, &out), BigUint::from((a * a) % 97));

        ctx.neg(&mut out, &am);
        assert_eq!(decode(&ctx, &out), BigUint::from((97 - a) % 97));

        ctx.inv_prime(&mut out, &am, &mut scratch);
        let expected = (1..97u64).find(|x| (x * a) % 97 == 1).unwrap_or(0);
        assert_eq!(decode(&ctx, &out), BigUint::from(expected));
    }
}

#[test]
fn test_mont_mult_large() {
    // 2048 bit odd modulus with the top bit set.
    let mut n = mersenne_bytes(256, 11);
    n[0] |= 0x80;
    n[255] |= 1;
    let nb = BigUint::from_bytes_be(&n);
    let ctx = MontContext::new(&n).unwrap();
    let mut scratch = ctx.new_scratch().unwrap();

    for seed in 0..8 {
        let a = BigUint::from_bytes_be(&mersenne_bytes(256, seed + 20)) % &nb;
        let b = BigUint::from_bytes_be(&mersenne_bytes(256, seed + 40)) % &nb;
        let am = ctx.from_bytes(&biguint_to_be_bytes(&a, 256)).unwrap();
        let bm = ctx.from_bytes(&biguint_to_be_bytes(&b, 256)).unwrap();

        let mut out = ctx.new_number().unwrap();
        ctx.mult(&mut out, &am, &bm, &mut scratch);
        assert_eq!(decode(&ctx, &out), (&a * &b) % &nb);

        let mut acc = am.clone();
        ctx.mult_assign(&mut acc, &bm, &mut scratch);
        assert_eq!(decode(&ctx, &acc), (&a * &b) % &nb);

        let mut acc = am.clone();
        ctx.square_assign(&mut acc, &mut scratch);
        assert_eq!(decode(&ctx, &acc), (&a * &a) % &nb);

        ctx.add(&mut out, &am, &bm, &mut scratch);
        assert_eq!(decode(&ctx, &out), (&a + &b) % &nb);

        let mut acc = am.clone();
        ctx.add_assign(&mut acc, &bm, &mut scratch);
        assert_eq!(decode(&ctx, &acc), (&a + &b) % &nb);

        ctx.sub(&mut out, &am, &bm, &mut scratch);
        assert_eq!(decode(&ctx, &out), (&a + &nb - &b) % &nb);

        let mut acc = am.clone();
        ctx.sub_assign(&mut acc, &bm, &mut scratch);
        assert_eq!(decode(&ctx, &acc), (&a + &nb - &b) % &nb);
    }
}

#[test]
fn test_mont_inv_prime() {
    // 2^255 - 19
    let mut p = vec![0xffu8; 32];
    p[0] = 0x7f;
    p[31] = 0xed;
    let pb = BigUint::from_bytes_be(&p);
    let ctx = MontContext::new(&p).unwrap();
    let mut scratch = ctx.new_scratch().unwrap();
    let mut inv = ctx.new_number().unwrap();
    let mut prod = ctx.new_number().unwrap();
    for seed in 0..4 {
        let a = BigUint::from_bytes_be(&mersenne_bytes(32, seed)) % &pb;
        let am = ctx.from_bytes(&biguint_to_be_bytes(&a, 32)).unwrap();
        ctx.inv_prime(&mut inv, &am, &mut scratch);
        ctx.mult(&mut prod, &am, &inv, &mut scratch);
        assert_eq!(ctx.is_one(&prod).unwrap(), 1);
    }

    let zero = ctx.new_number().unwrap();
    ctx.inv_prime(&mut inv, &zero, &mut scratch);
    assert_eq!(ctx.is_zero(&inv).unwrap(), 1);
}

#[test]
fn test_mont_set_and_predicates() {
    let ctx = MontContext::new(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xfb]).unwrap();
    let mut scratch = ctx.new_scratch().unwrap();
    let mut x = ctx.new_number().unwrap();

    ctx.set(&mut x, 0, &mut scratch);
    assert_eq!(ctx.is_zero(&x).unwrap(), 1);
    ctx.set(&mut x, 1, &mut scratch);
    assert_eq!(ctx.is_one(&x).unwrap(), 1);
    assert_eq!(ctx.is_zero(&x).unwrap(), 0);
    ctx.set(&mut x, 1000, &mut scratch);
    assert_eq!(decode(&ctx, &x), BigUint::from(1000u32 % 251));

    let y = ctx.from_u64(1000).unwrap();
    assert_eq!(ctx.is_equal(&x, &y).unwrap(), 1);
    let mut z = ctx.new_number().unwrap();
    ctx.copy(&mut z, &y);
    assert_eq!(ctx.is_equal(&z, &y).unwrap(), 1);

    let one = ctx.from_u64(1).unwrap();
    let mut out = ctx.new_number().unwrap();
    ctx.select(&mut out, &one, &y, LimbChoice::from(0));
    assert_eq!(ctx.is_one(&out).unwrap(), 1);
    ctx.select(&mut out, &one, &y, LimbChoice::from_nonzero(0xff));
    assert_eq!(ctx.is_equal(&out, &y).unwrap(), 1);

    let mut a = one.clone();
    let mut b = y.clone();
    ctx.cswap(&mut a, &mut b, LimbChoice::from(1));
    assert_eq!(ctx.is_equal(&a, &y).unwrap(), 1);
    assert_eq!(ctx.is_one(&b).unwrap(), 1);
}
