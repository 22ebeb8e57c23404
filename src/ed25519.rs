//! Point arithmetic on the twisted Edwards curve Ed25519, `-x^2 + y^2 = 1 + d x^2 y^2`.
//!
//! Points are stored in extended coordinates `(X : Y : Z : T)` with `x = X/Z`, `y = Y/Z` and
//! `T = X * Y / Z`. The addition and doubling formulas are complete, there are no exceptional
//! cases and hence no branches on the coordinates.

use tracing::debug;

use super::error::{Error, Result};
use super::field25519::Fe25519;
use super::hexstr::bytes_from_hexstr_cnst;
use super::limb::LimbChoice;

pub const ED25519_LEN: usize = 32;

/// `d = -121665 / 121666`.
const D: Fe25519 = Fe25519::from_limbs([
    0x35978a3, 0xd37284, 0x3156ebd, 0x6a0a0e, 0x1c029, 0x179e898, 0x3a03cbb, 0x1ce7198, 0x2e2b6ff, 0x1480db3,
]);

/// `2 * d`.
const D2: Fe25519 = Fe25519::from_limbs([
    0x2b2f159, 0x1a6e509, 0x22add7a, 0xd4141d, 0x38052, 0xf3d130, 0x3407977, 0x19ce331, 0x1c56dff, 0x901b67,
]);

/// Affine x-coordinate of the base point, big-endian.
pub const ED25519_BASE_X: [u8; ED25519_LEN] =
    bytes_from_hexstr_cnst::<ED25519_LEN>("216936d3cd6e53fec0a4e231fdd6dc5c692cc7609525a7b2c9562d608f25d51a");
/// Affine y-coordinate of the base point, big-endian.
pub const ED25519_BASE_Y: [u8; ED25519_LEN] =
    bytes_from_hexstr_cnst::<ED25519_LEN>("6666666666666666666666666666666666666666666666666666666666666658");
/// Order of the base point, big-endian.
pub const ED25519_ORDER: [u8; ED25519_LEN] =
    bytes_from_hexstr_cnst::<ED25519_LEN>("1000000000000000000000000000000014def9dea2f79cd65812631a5cf5d3ed");

/// A point on Ed25519 in extended coordinates.
#[derive(Clone, Debug)]
pub struct Ed25519Point {
    x: Fe25519,
    y: Fe25519,
    z: Fe25519,
    t: Fe25519,
}

impl Ed25519Point {
    /// Create a point from big-endian affine coordinates.
    ///
    /// # Errors
    ///
    /// * [`Error::Value`] - a coordinate is not 32 bytes long or not reduced modulo `p`.
    /// * [`Error::EcPoint`] - the coordinates don't satisfy the curve equation.
    ///
    pub fn new(x: &[u8], y: &[u8]) -> Result<Self> {
        let (x, y): (&[u8; ED25519_LEN], &[u8; ED25519_LEN]) = match (x.try_into(), y.try_into()) {
            (Ok(x), Ok(y)) => (x, y),
            _ => {
                debug!(x_len = x.len(), y_len = y.len(), "rejecting Ed25519 coordinates of invalid length");
                return Err(Error::Value);
            }
        };
        let (x, y) = match (Fe25519::from_canonical_be_bytes(x), Fe25519::from_canonical_be_bytes(y)) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                debug!("rejecting non-canonical Ed25519 coordinates");
                return Err(Error::Value);
            }
        };

        // -x^2 + y^2 - 1 - d x^2 y^2 == 0
        let xx = x.square();
        let yy = y.square();
        let lhs = yy.sub(&xx);
        let rhs = D.mul(&xx.mul(&yy)).add(&Fe25519::ONE);
        if lhs.ct_eq(&rhs).unwrap() == 0 {
            debug!("rejecting point not on Ed25519");
            return Err(Error::EcPoint);
        }

        let t = x.mul(&y);
        Ok(Self { x, y, z: Fe25519::ONE, t })
    }

    /// The neutral element `(0, 1)`.
    pub fn neutral() -> Self {
        Self { x: Fe25519::ZERO, y: Fe25519::ONE, z: Fe25519::ONE, t: Fe25519::ZERO }
    }

    /// The standard base point.
    pub fn base() -> Self {
        let x = Fe25519::from_be_bytes(&ED25519_BASE_X);
        let y = Fe25519::from_be_bytes(&ED25519_BASE_Y);
        let t = x.mul(&y);
        Self { x, y, z: Fe25519::ONE, t }
    }

    /// Return the big-endian affine coordinates `(x, y)`.
    pub fn get_xy(&self) -> ([u8; ED25519_LEN], [u8; ED25519_LEN]) {
        let z_inv = self.z.invert();
        (self.x.mul(&z_inv).to_be_bytes(), self.y.mul(&z_inv).to_be_bytes())
    }

    /// Add `other` to this point.
    pub fn add(&mut self, other: &Self) {
        let a = self.y.sub(&self.x).mul(&other.y.sub(&other.x));
        let b = self.y.add(&self.x).mul(&other.y.add(&other.x));
        let c = self.t.mul(&D2).mul(&other.t);
        let d = self.z.mul(&other.z).mul_small(2);
        let e = b.sub(&a);
        let f = d.sub(&c);
        let g = d.add(&c);
        let h = b.add(&a);
        self.set_from_efgh(&e, &f, &g, &h);
    }

    /// Double this point.
    pub fn double(&mut self) {
        let a = self.x.square();
        let b = self.y.square();
        let c = self.z.square().mul_small(2);
        let d = a.neg();
        let e = self.x.add(&self.y).square().sub(&a).sub(&b);
        let g = d.add(&b);
        let f = g.sub(&c);
        let h = d.sub(&b);
        self.set_from_efgh(&e, &f, &g, &h);
    }

    fn set_from_efgh(&mut self, e: &Fe25519, f: &Fe25519, g: &Fe25519, h: &Fe25519) {
        self.x = e.mul(f);
        self.y = g.mul(h);
        self.z = f.mul(g);
        self.t = e.mul(h);
    }

    /// Negate this point, `(x, y) -> (-x, y)`.
    pub fn neg(&mut self) {
        self.x = self.x.neg();
        self.t = self.t.neg();
    }

    /// Swap `a` and `b` if `cond` is set, without branching.
    fn cswap(a: &mut Self, b: &mut Self, cond: LimbChoice) {
        Fe25519::cswap(&mut a.x, &mut b.x, cond);
        Fe25519::cswap(&mut a.y, &mut b.y, cond);
        Fe25519::cswap(&mut a.z, &mut b.z, cond);
        Fe25519::cswap(&mut a.t, &mut b.t, cond);
    }

    /// Multiply the point by a big-endian scalar of any length.
    ///
    /// Runs a Montgomery ladder with masked swaps: one addition and one doubling per scalar
    /// bit, whatever the bit's value.
    pub fn scalar(&mut self, k: &[u8]) {
        let mut r0 = Self::neutral();
        let mut r1 = self.clone();
        let mut swap = LimbChoice::from(0);
        for byte in k.iter() {
            for i in (0..8).rev() {
                let bit = LimbChoice::from(((*byte >> i) & 1) as u64);
                swap = swap ^ bit;
                Self::cswap(&mut r0, &mut r1, swap);
                r1.add(&r0);
                r0.double();
                swap = bit;
            }
        }
        Self::cswap(&mut r0, &mut r1, swap);
        *self = r0;
    }

    /// Whether both points are the same, in constant time.
    pub fn ct_eq(&self, other: &Self) -> LimbChoice {
        let x_eq = self.x.mul(&other.z).ct_eq(&other.x.mul(&self.z));
        let y_eq = self.y.mul(&other.z).ct_eq(&other.y.mul(&self.z));
        x_eq & y_eq
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.clone_from(other);
    }
}

impl PartialEq for Ed25519Point {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).unwrap() != 0
    }
}

impl Eq for Ed25519Point {}

#[cfg(test)]
use num_bigint::BigUint;

#[test]
fn test_ed25519_constants() {
    let p = (BigUint::from(1u8) << 255) - BigUint::from(19u8);
    // d = -121665 / 121666
    let d = BigUint::from_bytes_le(&D.to_le_bytes());
    assert_eq!((d * BigUint::from(121666u32) + BigUint::from(121665u32)) % &p, BigUint::from(0u8));
    assert_eq!(D.add(&D).ct_eq(&D2).unwrap(), 1);

    let g = Ed25519Point::base();
    let (x, y) = g.get_xy();
    assert_eq!(x, ED25519_BASE_X);
    assert_eq!(y, ED25519_BASE_Y);
    assert_eq!(Ed25519Point::new(&x, &y).unwrap(), g);
}

#[test]
fn test_ed25519_order() {
    let mut p = Ed25519Point::base();
    p.scalar(&ED25519_ORDER);
    assert_eq!(p, Ed25519Point::neutral());

    let mut p = Ed25519Point::base();
    p.scalar(&[0u8; 32]);
    assert_eq!(p, Ed25519Point::neutral());
    let (x, y) = p.get_xy();
    assert_eq!(x, [0u8; 32]);
    assert_eq!(BigUint::from_bytes_be(&y), BigUint::from(1u8));
}

#[test]
fn test_ed25519_small_multiples() {
    let g = Ed25519Point::base();

    let mut p5 = g.clone();
    p5.scalar(&[5]);
    let (x, _) = p5.get_xy();
    assert_eq!(x, bytes_from_hexstr_cnst::<32>("49fda73eade3587bfcef7cf7d12da5de5c2819f93e1be1a591409cc0322ef233"));

    let mut sum = Ed25519Point::neutral();
    for _ in 0..5 {
        sum.add(&g);
    }
    assert_eq!(sum, p5);

    // 4G + G
    let mut p4 = g.clone();
    p4.double();
    p4.double();
    p4.add(&g);
    assert_eq!(p4, p5);

    let mut p1 = g.clone();
    p1.scalar(&[0, 0, 1]);
    assert_eq!(p1, g);
}

#[test]
fn test_ed25519_group_laws() {
    let g = Ed25519Point::base();
    let mut a = g.clone();
    a.scalar(&[0x12, 0x34, 0x56]);
    let mut b = g.clone();
    b.scalar(&[0xfe, 0xdc]);

    let mut ab = a.clone();
    ab.add(&b);
    let mut ba = b.clone();
    ba.add(&a);
    assert_eq!(ab, ba);

    // (a + b) + c == a + (b + c)
    let mut c = g.clone();
    c.scalar(&[0x77]);
    let mut ab_c = ab.clone();
    ab_c.add(&c);
    let mut bc = b.clone();
    bc.add(&c);
    let mut a_bc = a.clone();
    a_bc.add(&bc);
    assert_eq!(ab_c, a_bc);

    // a + (-a) == 0
    let mut neg_a = a.clone();
    neg_a.neg();
    let mut z = a.clone();
    z.add(&neg_a);
    assert_eq!(z, Ed25519Point::neutral());

    // a + 0 == a, 2a == a + a
    let mut a0 = a.clone();
    a0.add(&Ed25519Point::neutral());
    assert_eq!(a0, a);
    let mut a2 = a.clone();
    a2.double();
    let mut aa = a.clone();
    aa.add(&a);
    assert_eq!(a2, aa);

    // (k1 * k2) G == k1 (k2 G), 0x123456 * 0xfedc = 0x121f924de8
    let mut k = g.clone();
    k.scalar(&[0x12, 0x1f, 0x92, 0x4d, 0xe8]);
    let mut k12 = a.clone();
    k12.scalar(&[0xfe, 0xdc]);
    assert_eq!(k, k12);

    // Results are valid points.
    let (x, y) = k.get_xy();
    assert_eq!(Ed25519Point::new(&x, &y).unwrap(), k);

    let mut c = Ed25519Point::neutral();
    c.copy_from(&k);
    assert_eq!(c, k);
    assert_ne!(c, g);
}

#[test]
fn test_ed25519_invalid() {
    let mut y = ED25519_BASE_Y;
    y[31] ^= 1;
    assert_eq!(Ed25519Point::new(&ED25519_BASE_X, &y), Err(Error::EcPoint));
    assert_eq!(Ed25519Point::new(&ED25519_BASE_X[1..], &ED25519_BASE_Y), Err(Error::Value));
    assert_eq!(Ed25519Point::new(&ED25519_BASE_X, &[]), Err(Error::Value));

    // (0, 1) is on the curve, but p + 1 is no valid encoding of 1.
    let zero = [0u8; ED25519_LEN];
    let mut one = [0u8; ED25519_LEN];
    one[31] = 1;
    assert_eq!(Ed25519Point::new(&zero, &one).unwrap(), Ed25519Point::neutral());
    let p_plus_1 = bytes_from_hexstr_cnst::<ED25519_LEN>("7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffee");
    assert_eq!(Ed25519Point::new(&zero, &p_plus_1), Err(Error::Value));

    // Bit 255 set on an otherwise valid coordinate.
    let mut x = ED25519_BASE_X;
    x[0] |= 0x80;
    assert_eq!(Ed25519Point::new(&x, &ED25519_BASE_Y), Err(Error::Value));
}
