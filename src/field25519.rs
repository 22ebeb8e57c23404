//! Arithmetic modulo `p = 2^255 - 19` in radix `2^25.5`.
//!
//! A field element is stored as ten unsigned limbs of alternately 26 and 25 bits: limb `i`
//! carries weight `2^ceil(25.5 * i)`. The representation is redundant, an element is not
//! necessarily fully reduced modulo `p`.
//!
//! Two bounds are tracked throughout and checked with debug assertions on entry:
//!
//! * *reduced* - even limbs `< 2^26`, odd limbs `<= 2^25`, as produced by [`Fe25519::reduce()`]
//!   and every multiplicative operation,
//! * *loose* - even limbs `< 2^27`, odd limbs `< 2^26 + 2^6`, the sum of two reduced elements.
//!
//! [`Fe25519::add()`] takes reduced operands and produces a loose output. Every other operation
//! accepts loose inputs and yields reduced elements.

use super::limb::LimbChoice;

const LOW_25_BITS: u64 = (1 << 25) - 1;
const LOW_26_BITS: u64 = (1 << 26) - 1;

/// Bit position of each limb within the 255 bit integer.
const LIMB_SHIFTS: [u32; 10] = [0, 26, 51, 77, 102, 128, 153, 179, 204, 230];

const fn limb_width(i: usize) -> u32 {
    if i & 1 == 0 {
        26
    } else {
        25
    }
}

/// `4 * p`, limb by limb. Any loose element is limb-wise smaller.
const FOUR_P: [u32; 10] = [
    0xfffffb4, 0x7fffffc, 0xffffffc, 0x7fffffc, 0xffffffc, 0x7fffffc, 0xffffffc, 0x7fffffc, 0xffffffc,
    0x7fffffc,
];

/// An element of GF(2^255 - 19).
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize))]
pub struct Fe25519(pub(crate) [u32; 10]);

impl Fe25519 {
    pub const ZERO: Self = Self([0; 10]);
    pub const ONE: Self = Self([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    pub const fn from_limbs(limbs: [u32; 10]) -> Self {
        Self(limbs)
    }

    pub fn limbs(&self) -> &[u32; 10] {
        &self.0
    }

    /// Even limbs `< 2^26`, odd limbs `<= 2^25`.
    fn is_reduced(&self) -> bool {
        self.0.iter().enumerate().all(|(i, l)| if i & 1 == 0 { *l < 1 << 26 } else { *l <= 1 << 25 })
    }

    /// Even limbs `< 2^27`, odd limbs `< 2^26 + 2^6`.
    fn is_loose(&self) -> bool {
        self.0.iter().enumerate().all(|(i, l)| if i & 1 == 0 { *l < 1 << 27 } else { *l < (1 << 26) + (1 << 6) })
    }

    /// Carry-propagate a vector of wide limbs down to the reduced bound.
    ///
    /// Each input limb must be below `2^63`. The value is preserved modulo `p`, not necessarily
    /// reduced below `p`.
    fn reduce_wide(mut z: [u64; 10]) -> Self {
        #[inline(always)]
        fn carry(z: &mut [u64; 10], i: usize) {
            debug_assert!(i < 9);
            if i & 1 == 0 {
                z[i + 1] += z[i] >> 26;
                z[i] &= LOW_26_BITS;
            } else {
                z[i + 1] += z[i] >> 25;
                z[i] &= LOW_25_BITS;
            }
        }

        #[inline(always)]
        fn fold(z: &mut [u64; 10]) {
            // 2^255 = 19 mod p
            z[0] += 19 * (z[9] >> 25);
            z[9] &= LOW_25_BITS;
        }

        for i in 0..9 {
            carry(&mut z, i);
        }
        fold(&mut z);
        // limb 0 is now below 2^43, everything else within bounds.
        for i in 0..9 {
            carry(&mut z, i);
        }
        fold(&mut z);
        // At most 19 got added to limb 0 and no further ripple is possible past limb 1.
        carry(&mut z, 0);

        let mut out = [0u32; 10];
        for (o, v) in out.iter_mut().zip(z.iter()) {
            *o = *v as u32;
        }
        Self(out)
    }

    /// Bring the limbs down to the reduced bound.
    pub fn reduce(&self) -> Self {
        let mut z = [0u64; 10];
        for (z, v) in z.iter_mut().zip(self.0.iter()) {
            *z = *v as u64;
        }
        Self::reduce_wide(z)
    }

    /// Limb-wise sum without any carry propagation.
    ///
    /// Both operands must be reduced, the result is loose.
    pub fn add(&self, other: &Self) -> Self {
        debug_assert!(self.is_reduced() && other.is_reduced());
        let mut out = [0u32; 10];
        for i in 0..10 {
            out[i] = self.0[i] + other.0[i];
        }
        Self(out)
    }

    /// Compute `self - other`, as `self + 4p - other` followed by a reduction.
    pub fn sub(&self, other: &Self) -> Self {
        debug_assert!(self.is_loose() && other.is_loose());
        let mut z = [0u64; 10];
        for i in 0..10 {
            z[i] = self.0[i] as u64 + FOUR_P[i] as u64 - other.0[i] as u64;
        }
        Self::reduce_wide(z)
    }

    pub fn neg(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Schoolbook product.
    ///
    /// Terms with both limb indices odd carry an extra factor of two, as the weights of two
    /// 25-bit limbs sum up to half a bit less than the weight of their product's limb. Terms
    /// wrapping past limb 9 get folded back with a factor of 19.
    pub fn mul(&self, other: &Self) -> Self {
        debug_assert!(self.is_loose() && other.is_loose());
        let x = &self.0;
        let y = &other.0;

        let mut y19 = [0u64; 10];
        let mut x2 = [0u64; 10];
        for i in 0..10 {
            y19[i] = 19 * y[i] as u64;
            x2[i] = if i & 1 == 1 { 2 * x[i] as u64 } else { x[i] as u64 };
        }

        // Loose inputs keep every accumulator below 2^63.
        let mut z = [0u64; 10];
        for i in 0..10 {
            for j in 0..10 {
                let xi = if i & 1 == 1 && j & 1 == 1 { x2[i] } else { x[i] as u64 };
                if i + j < 10 {
                    z[i + j] += xi * y[j] as u64;
                } else {
                    z[i + j - 10] += xi * y19[j];
                }
            }
        }
        Self::reduce_wide(z)
    }

    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Compute `self^(2^k)`, for `k > 0`.
    pub fn pow2k(&self, k: u32) -> Self {
        debug_assert!(k > 0);
        let mut r = self.square();
        for _ in 1..k {
            r = r.square();
        }
        r
    }

    /// Multiply by a small constant.
    pub fn mul_small(&self, k: u32) -> Self {
        debug_assert!(self.is_loose());
        let mut z = [0u64; 10];
        for (z, v) in z.iter_mut().zip(self.0.iter()) {
            *z = *v as u64 * k as u64;
        }
        Self::reduce_wide(z)
    }

    /// Compute `self^(p - 2)`, the multiplicative inverse for nonzero elements.
    ///
    /// Zero maps to zero. The addition chain is fixed, so this runs in constant time.
    pub fn invert(&self) -> Self {
        let z = self;
        let z2 = z.square();
        let z8 = z2.pow2k(2);
        let z9 = z8.mul(z);
        let z11 = z9.mul(&z2);
        // 2^5 - 2^0
        let z_5_0 = z11.square().mul(&z9);
        let z_10_0 = z_5_0.pow2k(5).mul(&z_5_0);
        let z_20_0 = z_10_0.pow2k(10).mul(&z_10_0);
        let z_40_0 = z_20_0.pow2k(20).mul(&z_20_0);
        let z_50_0 = z_40_0.pow2k(10).mul(&z_10_0);
        let z_100_0 = z_50_0.pow2k(50).mul(&z_50_0);
        let z_200_0 = z_100_0.pow2k(100).mul(&z_100_0);
        let z_250_0 = z_200_0.pow2k(50).mul(&z_50_0);
        // 2^255 - 2^5 + 11 = p - 2
        z_250_0.pow2k(5).mul(&z11)
    }

    /// Swap `a` and `b` if `cond` is set, without branching.
    pub fn cswap(a: &mut Self, b: &mut Self, cond: LimbChoice) {
        for i in 0..10 {
            let t = cond.select_u32(0, a.0[i] ^ b.0[i]);
            a.0[i] ^= t;
            b.0[i] ^= t;
        }
    }

    /// Conditionally assign `other` to `self` if `cond` is set, without branching.
    pub fn cassign(&mut self, other: &Self, cond: LimbChoice) {
        for i in 0..10 {
            self.0[i] = cond.select_u32(self.0[i], other.0[i]);
        }
    }

    /// Decode 32 little-endian bytes.
    ///
    /// The most significant bit is ignored. Non-canonical encodings of values in `[p, 2^255)`
    /// are accepted.
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        let load4 = |pos: usize| -> u64 {
            let mut v = 0u64;
            for k in 0..4 {
                if pos + k < 32 {
                    v |= (bytes[pos + k] as u64) << (8 * k);
                }
            }
            v
        };

        let mut out = [0u32; 10];
        for (i, o) in out.iter_mut().enumerate() {
            let shift = LIMB_SHIFTS[i];
            let v = load4(shift as usize / 8) >> (shift % 8);
            *o = (v & ((1 << limb_width(i)) - 1)) as u32;
        }
        Self(out)
    }

    /// Encode as 32 little-endian bytes, fully reduced modulo `p`.
    pub fn to_le_bytes(&self) -> [u8; 32] {
        let words = self.to_le64();
        let mut out = [0u8; 32];
        for (chunk, w) in out.chunks_exact_mut(8).zip(words.iter()) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
        out
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut le = *bytes;
        le.reverse();
        Self::from_le_bytes(&le)
    }

    /// Decode 32 big-endian bytes holding a value in `[0, p)`.
    ///
    /// Returns `None` for any other encoding. Only meant for public inputs, the check branches.
    pub fn from_canonical_be_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let fe = Self::from_be_bytes(bytes);
        if fe.to_be_bytes() != *bytes {
            return None;
        }
        Some(fe)
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = self.to_le_bytes();
        out.reverse();
        out
    }

    /// Decode four little-endian 64 bit words. The most significant bit is ignored.
    pub fn from_le64(words: &[u64; 4]) -> Self {
        let mut bytes = [0u8; 32];
        for (chunk, w) in bytes.chunks_exact_mut(8).zip(words.iter()) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
        Self::from_le_bytes(&bytes)
    }

    /// Encode as four little-endian 64 bit words, fully reduced modulo `p`.
    pub fn to_le64(&self) -> [u64; 4] {
        let mut h = self.reduce().0;

        // With h < 2^255 + small, q = floor((h + 19) / 2^255) is one iff h >= p.
        let mut q = (h[0] + 19) >> 26;
        for (i, v) in h.iter().enumerate().skip(1) {
            q = (*v + q) >> limb_width(i);
        }

        // h - q * p = h + 19 * q - q * 2^255: add 19q, carry and drop bit 255.
        h[0] += 19 * q;
        for i in 0..9 {
            let w = limb_width(i);
            h[i + 1] += h[i] >> w;
            h[i] &= (1 << w) - 1;
        }
        h[9] &= (1 << 25) - 1;

        let mut out = [0u64; 4];
        for (i, v) in h.iter().enumerate() {
            let v = *v as u64;
            let shift = LIMB_SHIFTS[i];
            let word = (shift / 64) as usize;
            let offset = shift % 64;
            out[word] |= v << offset;
            if offset + limb_width(i) > 64 {
                out[word + 1] |= v >> (64 - offset);
            }
        }
        out
    }

    /// Whether both elements are congruent modulo `p`, in constant time.
    pub fn ct_eq(&self, other: &Self) -> LimbChoice {
        let a = self.to_le64();
        let b = other.to_le64();
        let mut diff = 0u64;
        for i in 0..4 {
            diff |= a[i] ^ b[i];
        }
        !LimbChoice::from_nonzero(diff)
    }

    pub fn is_zero(&self) -> LimbChoice {
        self.ct_eq(&Self::ZERO)
    }
}

#[cfg(test)]
use num_bigint::BigUint;

#[cfg(test)]
fn p25519() -> BigUint {
    (BigUint::from(1u8) << 255) - BigUint::from(19u8)
}

#[cfg(test)]
fn fe_to_biguint(a: &Fe25519) -> BigUint {
    BigUint::from_bytes_le(&a.to_le_bytes())
}

#[cfg(test)]
fn fe_from_biguint(v: &BigUint) -> Fe25519 {
    let mut bytes = [0u8; 32];
    let le = v.to_bytes_le();
    bytes[..le.len()].copy_from_slice(&le);
    Fe25519::from_le_bytes(&bytes)
}

#[cfg(test)]
fn test_elements() -> Vec<BigUint> {
    let p = p25519();
    let mut v = vec![
        BigUint::from(0u8),
        BigUint::from(1u8),
        BigUint::from(2u8),
        BigUint::from(19u8),
        &p - BigUint::from(1u8),
        &p - BigUint::from(2u8),
        BigUint::from(1u8) << 128,
        (BigUint::from(1u8) << 254) + BigUint::from(12345u32),
    ];
    for seed in 0..6 {
        let bytes = super::test_helpers::mersenne_bytes(32, seed);
        v.push(BigUint::from_bytes_be(&bytes) % &p);
    }
    v
}

#[test]
fn test_fe25519_bytes() {
    for a in test_elements() {
        let fe = fe_from_biguint(&a);
        assert_eq!(fe_to_biguint(&fe), a);
        let be = fe.to_be_bytes();
        assert_eq!(Fe25519::from_be_bytes(&be).to_be_bytes(), be);
        let words = fe.to_le64();
        assert_eq!(Fe25519::from_le64(&words).to_le64(), words);
    }

    // Non-canonical encodings get reduced on output.
    let mut bytes = [0xffu8; 32];
    bytes[0] = 0xee;
    bytes[31] = 0x7f;
    // p + 1
    assert_eq!(fe_to_biguint(&Fe25519::from_le_bytes(&bytes)), BigUint::from(1u8));
    // The top bit is dropped.
    let mut bytes = [0u8; 32];
    bytes[0] = 5;
    bytes[31] = 0x80;
    assert_eq!(fe_to_biguint(&Fe25519::from_le_bytes(&bytes)), BigUint::from(5u8));
}

#[test]
fn test_fe25519_arithmetic() {
    let p = p25519();
    let elements = test_elements();
    for a in elements.iter() {
        for b in elements.iter() {
            let fa = fe_from_biguint(a);
            let fb = fe_from_biguint(b);
            assert_eq!(fe_to_biguint(&fa.mul(&fb)), (a * b) % &p);
            assert_eq!(fe_to_biguint(&fa.add(&fb)), (a + b) % &p);
            assert_eq!(fe_to_biguint(&fa.sub(&fb)), (a + &p - b) % &p);
            // Loose operands.
            let loose = fa.add(&fa);
            assert_eq!(fe_to_biguint(&loose.mul(&fb.add(&fb))), (a * b * 4u8) % &p);
            assert_eq!(fe_to_biguint(&loose.sub(&fb.add(&fb))), (a * 2u8 + &p * 2u8 - b * 2u8) % &p);
        }
        let fa = fe_from_biguint(a);
        assert_eq!(fe_to_biguint(&fa.square()), (a * a) % &p);
        assert_eq!(fe_to_biguint(&fa.neg()), (&p - a) % &p);
        assert_eq!(fe_to_biguint(&fa.mul_small(121665)), (a * 121665u32) % &p);
    }
}

#[test]
fn test_fe25519_invert() {
    let p = p25519();
    for a in test_elements() {
        let fa = fe_from_biguint(&a);
        let inv = fa.invert();
        if a == BigUint::from(0u8) {
            assert_eq!(fe_to_biguint(&inv), BigUint::from(0u8));
        } else {
            assert_eq!(fe_to_biguint(&inv.mul(&fa)), BigUint::from(1u8));
            assert_eq!(fe_to_biguint(&inv), a.modpow(&(&p - BigUint::from(2u8)), &p));
        }
    }
}

#[test]
fn test_fe25519_reduce_idempotent() {
    let max_loose = Fe25519::from_limbs([
        (1 << 27) - 1,
        (1 << 26) - 1,
        (1 << 27) - 1,
        (1 << 26) - 1,
        (1 << 27) - 1,
        (1 << 26) - 1,
        (1 << 27) - 1,
        (1 << 26) - 1,
        (1 << 27) - 1,
        (1 << 26) - 1,
    ]);
    for fe in [max_loose, Fe25519::ONE, max_loose.mul(&max_loose), fe_from_biguint(&(p25519() - 1u8))] {
        let r = fe.reduce();
        for (i, l) in r.limbs().iter().enumerate() {
            assert!((*l as u64) <= (1 << limb_width(i)));
        }
        assert_eq!(r.reduce().limbs(), r.limbs());
        assert_eq!(fe_to_biguint(&r), fe_to_biguint(&fe));
    }
}

#[test]
fn test_fe25519_cswap_ct_eq() {
    let a0 = fe_from_biguint(&BigUint::from(7u8));
    let b0 = fe_from_biguint(&BigUint::from(11u8));
    let (mut a, mut b) = (a0, b0);
    Fe25519::cswap(&mut a, &mut b, LimbChoice::from(0));
    assert_eq!(a.ct_eq(&a0).unwrap(), 1);
    assert_eq!(b.ct_eq(&b0).unwrap(), 1);
    Fe25519::cswap(&mut a, &mut b, LimbChoice::from(1));
    assert_eq!(a.ct_eq(&b0).unwrap(), 1);
    assert_eq!(b.ct_eq(&a0).unwrap(), 1);
    assert_eq!(a.ct_eq(&b).unwrap(), 0);

    let mut c = a0;
    c.cassign(&b0, LimbChoice::from(1));
    assert_eq!(c.ct_eq(&b0).unwrap(), 1);

    // Different representations of the same value.
    let p_plus_7 = Fe25519::from_limbs([0x3fffff4, 0x1ffffff, 0x3ffffff, 0x1ffffff, 0x3ffffff, 0x1ffffff,
                                        0x3ffffff, 0x1ffffff, 0x3ffffff, 0x1ffffff]);
    assert_eq!(p_plus_7.ct_eq(&a0).unwrap(), 1);
    assert_eq!(Fe25519::ZERO.is_zero().unwrap(), 1);
    assert_eq!(a0.is_zero().unwrap(), 0);
}

#[test]
fn test_fe25519_bounds() {
    let p = p25519();
    for a in test_elements() {
        let fa = fe_from_biguint(&a);
        assert!(fa.is_reduced());
        let b = (&a * 3u8 + 1u8) % &p;
        let fb = fe_from_biguint(&b);
        let sum = fa.add(&fb);
        assert!(sum.is_loose());
        assert!(sum.reduce().is_reduced());
        assert!(sum.mul(&sum).is_reduced());
        assert!(sum.sub(&fb.add(&fa)).is_reduced());
        assert!(sum.mul_small(121665).is_reduced());
    }

    let max_loose = Fe25519::from_limbs([(1 << 27) - 1, (1 << 26) + 63, (1 << 27) - 1, (1 << 26) + 63,
                                         (1 << 27) - 1, (1 << 26) + 63, (1 << 27) - 1, (1 << 26) + 63,
                                         (1 << 27) - 1, (1 << 26) + 63]);
    assert!(max_loose.is_loose());
    assert!(!max_loose.is_reduced());
    assert!(max_loose.mul(&max_loose).is_reduced());
    assert_eq!(fe_to_biguint(&max_loose.sub(&max_loose)), BigUint::from(0u8));
}

#[cfg(debug_assertions)]
#[test]
#[should_panic]
fn test_fe25519_add_rejects_loose_operands() {
    let max_reduced = Fe25519::from_limbs([(1 << 26) - 1, 1 << 25, (1 << 26) - 1, 1 << 25, (1 << 26) - 1,
                                           1 << 25, (1 << 26) - 1, 1 << 25, (1 << 26) - 1, 1 << 25]);
    let loose = max_reduced.add(&max_reduced);
    let _ = loose.add(&max_reduced);
}

#[test]
fn test_fe25519_canonical_be_bytes() {
    let p = p25519();
    for a in test_elements() {
        let mut bytes = [0u8; 32];
        let be = a.to_bytes_be();
        bytes[32 - be.len()..].copy_from_slice(&be);
        let fe = Fe25519::from_canonical_be_bytes(&bytes).unwrap();
        assert_eq!(fe_to_biguint(&fe), a);
    }

    // p, p + 1, 2^255 - 1 and anything with the top bit set
    let mut p_be = [0u8; 32];
    p_be.copy_from_slice(&p.to_bytes_be());
    assert!(Fe25519::from_canonical_be_bytes(&p_be).is_none());
    p_be[31] += 1;
    assert!(Fe25519::from_canonical_be_bytes(&p_be).is_none());
    assert!(Fe25519::from_canonical_be_bytes(&[0xff; 32]).is_none());
    let mut one_top = [0u8; 32];
    one_top[0] = 0x80;
    one_top[31] = 1;
    assert!(Fe25519::from_canonical_be_bytes(&one_top).is_none());
}
