//! Fixed-window modular exponentiation and multiplication on big-endian byte strings.

extern crate alloc;
use alloc::vec::Vec;

use tracing::debug;

use super::error::{Error, Result};
use super::limb::LimbType;
use super::montgomery_impl::{MontContext, MontNumber};
use super::scatter::ProtMemory;

/// Window size of [`monty_pow()`] in bits.
const WINDOW_SIZE: u32 = 4;
/// Number of precomputed powers of the base, `2^WINDOW_SIZE`.
const WINDOW_POWERS: usize = 1 << WINDOW_SIZE;

/// Reader extracting fixed-size digits from a big-endian byte string, most significant first.
///
/// The total bit length need not be a multiple of the window size: the first digit is then
/// shorter, so that the last digit always ends at the least significant bit. Digits may
/// straddle byte boundaries.
pub struct BitWindowLr<'a> {
    exp: &'a [u8],
    window_size: u32,
    nr_windows: usize,
    /// Bits still to be collected for the current digit.
    tg: u32,
    /// Bits of `exp[scan_exp]` not yet consumed.
    available: u32,
    scan_exp: usize,
}

impl<'a> BitWindowLr<'a> {
    /// Create a reader for `exp` producing digits of `window_size` bits, `1 <= window_size <= 8`.
    pub fn new(window_size: u32, exp: &'a [u8]) -> Self {
        debug_assert!((1..=8).contains(&window_size));
        let nr_bits = 8 * exp.len();
        let ws = window_size as usize;
        let nr_windows = (nr_bits + ws - 1) / ws;
        let tg = match (nr_bits % ws) as u32 {
            0 => window_size,
            r => r,
        };
        Self { exp, window_size, nr_windows, tg, available: 8, scan_exp: 0 }
    }

    /// Number of digits not yet returned.
    pub fn nr_windows(&self) -> usize {
        self.nr_windows
    }
}

impl Iterator for BitWindowLr<'_> {
    type Item = usize;

    /// Return the next digit. The control flow depends only on the public lengths, never on the
    /// exponent's bits.
    fn next(&mut self) -> Option<usize> {
        if self.nr_windows == 0 {
            return None;
        }

        let mut digit: usize = 0;
        while self.tg > 0 {
            let tc = self.tg.min(self.available);
            let bits = ((self.exp[self.scan_exp] as usize) >> (self.available - tc)) & ((1 << tc) - 1);
            digit = (digit << tc) | bits;
            self.available -= tc;
            self.tg -= tc;
            if self.available == 0 {
                self.available = 8;
                self.scan_exp += 1;
            }
        }
        self.tg = self.window_size;
        self.nr_windows -= 1;
        Some(digit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.nr_windows, Some(self.nr_windows))
    }
}

fn check_lengths(modulus: &[u8], others: &[usize]) -> Result<()> {
    if modulus.is_empty() {
        return Err(Error::NotEnoughData);
    }
    if others.iter().any(|l| *l != modulus.len()) {
        debug!(len = modulus.len(), "rejecting operands of mismatched lengths");
        return Err(Error::Value);
    }
    Ok(())
}

/// Compute `base^exp mod modulus` in constant time.
///
/// All four byte strings are big-endian and of the same length. The base must be smaller than
/// the modulus. Leading zero bytes of the exponent are skipped, a zero exponent yields one.
///
/// The 16 powers `base^0 .. base^15` are kept in a [`ProtMemory`] table whose layout gets
/// randomized by `seed`; it has no influence on the result.
///
/// # Errors
///
/// * [`Error::NotEnoughData`] - zero length operands.
/// * [`Error::Value`] - mismatched lengths, even modulus or base not smaller than the modulus.
/// * [`Error::Memory`] - allocation failure.
///
pub fn monty_pow(out: &mut [u8], base: &[u8], exp: &[u8], modulus: &[u8], seed: u64) -> Result<()> {
    check_lengths(modulus, &[out.len(), base.len(), exp.len()])?;

    let ctx = MontContext::new(modulus)?;
    let mut scratch = ctx.new_scratch()?;

    let mut powers: Vec<MontNumber> = Vec::new();
    powers.try_reserve_exact(WINDOW_POWERS).map_err(|_| Error::Memory)?;
    powers.push(ctx.from_u64(1)?);
    powers.push(ctx.from_bytes(base)?);
    for i in 2..WINDOW_POWERS {
        let mut p = ctx.new_number()?;
        ctx.mult(&mut p, &powers[i - 1], &powers[1], &mut scratch);
        powers.push(p);
    }
    let prot = {
        let refs: Vec<&[LimbType]> = powers.iter().map(|p| p.as_slice()).collect();
        ProtMemory::scatter(&refs, seed)?
    };
    drop(powers);

    let mut x = ctx.from_u64(1)?;

    // Leading zero bytes of the exponent contribute nothing.
    let first_nonzero = exp.iter().position(|b| *b != 0);
    if let Some(first_nonzero) = first_nonzero {
        let mut power = ctx.new_number()?;
        for digit in BitWindowLr::new(WINDOW_SIZE, &exp[first_nonzero..]) {
            for _ in 0..WINDOW_SIZE {
                ctx.square_assign(&mut x, &mut scratch);
            }
            prot.gather(&mut power, digit);
            ctx.mult_assign(&mut x, &power, &mut scratch);
        }
    }

    ctx.to_bytes(out, &x)
}

/// Compute `a * b mod modulus` on big-endian byte strings of the same length.
///
/// # Errors
///
/// As for [`monty_pow()`].
///
pub fn monty_multiply(out: &mut [u8], a: &[u8], b: &[u8], modulus: &[u8]) -> Result<()> {
    check_lengths(modulus, &[out.len(), a.len(), b.len()])?;

    let ctx = MontContext::new(modulus)?;
    let mut scratch = ctx.new_scratch()?;
    let am = ctx.from_bytes(a)?;
    let bm = ctx.from_bytes(b)?;
    let mut product = ctx.new_number()?;
    ctx.mult(&mut product, &am, &bm, &mut scratch);
    ctx.to_bytes(out, &product)
}

#[cfg(test)]
use super::test_helpers::{biguint_to_be_bytes, mersenne_bytes};

#[cfg(test)]
use num_bigint::BigUint;

#[test]
fn test_bit_window_lr() {
    let exps: Vec<Vec<u8>> = vec![
        vec![0x00],
        vec![0x80],
        vec![0xff],
        vec![0x01, 0x00],
        vec![0xa5, 0x5a, 0x0f],
        mersenne_bytes(13, 3),
        mersenne_bytes(64, 9),
    ];
    for exp in exps.iter() {
        for ws in 1..=8u32 {
            let bw = BitWindowLr::new(ws, exp);
            let nr_windows = bw.nr_windows();
            assert_eq!(nr_windows, (8 * exp.len() + ws as usize - 1) / ws as usize);

            let mut acc = BigUint::from(0u8);
            let mut count = 0;
            for (i, digit) in bw.enumerate() {
                assert!(digit < (1 << ws));
                if i == 0 && (8 * exp.len()) % ws as usize != 0 {
                    assert!(digit < (1 << ((8 * exp.len()) % ws as usize)));
                }
                acc = (acc << ws) + BigUint::from(digit);
                count += 1;
            }
            assert_eq!(count, nr_windows);
            assert_eq!(acc, BigUint::from_bytes_be(exp));
        }
    }
}

#[test]
fn test_bit_window_lr_digits() {
    let digits: Vec<usize> = BitWindowLr::new(4, &[0xa5, 0x5a]).collect();
    assert_eq!(digits, vec![0xa, 0x5, 0x5, 0xa]);
    let digits: Vec<usize> = BitWindowLr::new(3, &[0xa5, 0x5a]).collect();
    // 0b1_010_010_101_011_010
    assert_eq!(digits, vec![0b1, 0b010, 0b010, 0b101, 0b011, 0b010]);
}

#[cfg(test)]
fn odd_modulus(len: usize, seed: LimbType) -> Vec<u8> {
    let mut n = mersenne_bytes(len, seed);
    n[0] |= 0x80;
    n[len - 1] |= 1;
    n
}

#[test]
fn test_monty_pow() {
    for len in [1usize, 8, 12, 32, 128, 256] {
        let n = odd_modulus(len, len as LimbType);
        let nb = BigUint::from_bytes_be(&n);
        for seed in 0..3 {
            let base = BigUint::from_bytes_be(&mersenne_bytes(len, seed + 10)) % &nb;
            let exp = mersenne_bytes(len, seed + 20);
            let mut out = vec![0u8; len];
            monty_pow(&mut out, &biguint_to_be_bytes(&base, len), &exp, &n, seed).unwrap();
            let expected = base.modpow(&BigUint::from_bytes_be(&exp), &nb);
            assert_eq!(out, biguint_to_be_bytes(&expected, len));
        }
    }
}

#[test]
fn test_monty_pow_edge_cases() {
    let len = 32;
    let n = odd_modulus(len, 5);
    let nb = BigUint::from_bytes_be(&n);
    let mut out = vec![0u8; len];

    // Zero exponent.
    let base = mersenne_bytes(len, 1);
    let base = biguint_to_be_bytes(&(BigUint::from_bytes_be(&base) % &nb), len);
    monty_pow(&mut out, &base, &[0u8; 32], &n, 0).unwrap();
    assert_eq!(out, biguint_to_be_bytes(&BigUint::from(1u8), len));

    // Base and exponent with leading zero bytes.
    let mut small_base = vec![0u8; len];
    small_base[len - 1] = 3;
    let mut exp = vec![0u8; len];
    exp[len - 2] = 0x01;
    exp[len - 1] = 0x01;
    monty_pow(&mut out, &small_base, &exp, &n, 0xdead).unwrap();
    let expected = BigUint::from(3u8).modpow(&BigUint::from(257u32), &nb);
    assert_eq!(out, biguint_to_be_bytes(&expected, len));

    // Zero base.
    monty_pow(&mut out, &[0u8; 32], &exp, &n, 0).unwrap();
    assert_eq!(out, vec![0u8; len]);

    // The seed doesn't affect the result.
    let exp = mersenne_bytes(len, 77);
    let mut out2 = vec![0u8; len];
    monty_pow(&mut out, &base, &exp, &n, 1).unwrap();
    monty_pow(&mut out2, &base, &exp, &n, 2).unwrap();
    assert_eq!(out, out2);
}

#[test]
fn test_monty_pow_errors() {
    let n = odd_modulus(16, 1);
    let mut out = vec![0u8; 16];
    let one = biguint_to_be_bytes(&BigUint::from(1u8), 16);
    assert_eq!(monty_pow(&mut [], &[], &[], &[], 0), Err(Error::NotEnoughData));
    assert_eq!(monty_pow(&mut out, &one[1..], &one, &n, 0), Err(Error::Value));
    assert_eq!(monty_pow(&mut out, &one, &one[1..], &n, 0), Err(Error::Value));
    assert_eq!(monty_pow(&mut out[1..], &one, &one, &n, 0), Err(Error::Value));

    let mut even = n.clone();
    even[15] &= 0xfe;
    assert_eq!(monty_pow(&mut out, &one, &one, &even, 0), Err(Error::Value));

    // Base not reduced.
    assert_eq!(monty_pow(&mut out, &n, &one, &n, 0), Err(Error::Value));
}

#[test]
fn test_monty_multiply() {
    for len in [1usize, 9, 64] {
        let n = odd_modulus(len, 3);
        let nb = BigUint::from_bytes_be(&n);
        let a = BigUint::from_bytes_be(&mersenne_bytes(len, 4)) % &nb;
        let b = BigUint::from_bytes_be(&mersenne_bytes(len, 5)) % &nb;
        let mut out = vec![0u8; len];
        monty_multiply(&mut out, &biguint_to_be_bytes(&a, len), &biguint_to_be_bytes(&b, len), &n).unwrap();
        assert_eq!(out, biguint_to_be_bytes(&((&a * &b) % &nb), len));
    }

    let mut out = [0u8; 2];
    assert_eq!(monty_multiply(&mut out, &[0, 1], &[1], &[0, 0x61]), Err(Error::Value));
}
