//! X-only arithmetic on Curve25519, `y^2 = x^3 + 486662 x^2 + x` over GF(2^255 - 19).
//!
//! Points are kept in projective `(X : Z)` coordinates, the point at infinity being `(1 : 0)`.
//! Scalar multiplication uses the Montgomery ladder with a masked swap, so neither the control
//! flow nor the memory accesses depend on the scalar.

use tracing::debug;

use super::error::{Error, Result};
use super::field25519::Fe25519;
use super::limb::{LimbChoice, LimbType};

/// `(A - 2) / 4` for Curve25519's `A = 486662`.
const A24: u32 = 121665;

/// One step of the Montgomery ladder.
///
/// On input, `(x2 : z2)` and `(x3 : z3)` hold two points whose difference has the affine
/// x-coordinate `x1`. On output, they hold the double of the first and the sum of both.
pub fn ladder_step(x2: &mut Fe25519, z2: &mut Fe25519, x3: &mut Fe25519, z3: &mut Fe25519, x1: &Fe25519) {
    let a = x2.add(z2);
    let aa = a.square();
    let b = x2.sub(z2);
    let bb = b.square();
    let e = aa.sub(&bb);
    let c = x3.add(z3);
    let d = x3.sub(z3);
    let da = d.mul(&a);
    let cb = c.mul(&b);
    *x3 = da.add(&cb).square();
    *z3 = x1.mul(&da.sub(&cb).square());
    *x2 = aa.mul(&bb);
    *z2 = e.mul(&aa.add(&e.mul_small(A24)));
}

/// Run the ladder for the affine x-coordinate `x1` over `bits`, most significant first.
/// Returns the projective result.
fn ladder<I: Iterator<Item = LimbChoice>>(x1: &Fe25519, bits: I) -> (Fe25519, Fe25519) {
    let mut x2 = Fe25519::ONE;
    let mut z2 = Fe25519::ZERO;
    let mut x3 = *x1;
    let mut z3 = Fe25519::ONE;

    let mut swap = LimbChoice::from(0);
    for bit in bits {
        swap = swap ^ bit;
        Fe25519::cswap(&mut x2, &mut x3, swap);
        Fe25519::cswap(&mut z2, &mut z3, swap);
        swap = bit;
        ladder_step(&mut x2, &mut z2, &mut x3, &mut z3, x1);
    }
    Fe25519::cswap(&mut x2, &mut x3, swap);
    Fe25519::cswap(&mut z2, &mut z3, swap);
    (x2, z2)
}

/// Iterate over the bits of a sequence of bytes, ordered most significant first.
fn msb_first_bits<'a, I: Iterator<Item = &'a u8> + 'a>(bytes: I) -> impl Iterator<Item = LimbChoice> + 'a {
    bytes.flat_map(|b| (0..8).rev().map(move |i| LimbChoice::from(((*b >> i) & 1) as u64)))
}

/// A point on Curve25519, in projective x-only coordinates.
#[derive(Clone, Debug)]
pub struct Curve25519Point {
    x: Fe25519,
    z: Fe25519,
}

impl Curve25519Point {
    /// Create a point from its big-endian affine x-coordinate.
    ///
    /// # Errors
    ///
    /// * [`Error::Value`] - `x` is not 32 bytes long or not reduced modulo `p`.
    ///
    pub fn new(x: &[u8]) -> Result<Self> {
        let x: &[u8; 32] = x.try_into().map_err(|_| {
            debug!(len = x.len(), "rejecting Curve25519 coordinate of invalid length");
            Error::Value
        })?;
        let x = Fe25519::from_canonical_be_bytes(x).ok_or_else(|| {
            debug!("rejecting non-canonical Curve25519 coordinate");
            Error::Value
        })?;
        Ok(Self { x, z: Fe25519::ONE })
    }

    /// The point at infinity.
    pub fn pai() -> Self {
        Self { x: Fe25519::ONE, z: Fe25519::ZERO }
    }

    pub fn is_pai(&self) -> bool {
        self.z.is_zero().unwrap() != 0
    }

    /// Multiply the point by a big-endian scalar of any length.
    ///
    /// The scalar is used as is, without any clamping. The point at infinity stays put.
    pub fn scalar(&mut self, k: &[u8]) {
        if self.is_pai() {
            return;
        }
        let x1 = self.x.mul(&self.z.invert());
        let (mut x, mut z) = ladder(&x1, msb_first_bits(k.iter()));

        // The differential addition degenerates on the order two point x = 0, whose multiples
        // are (0 : 1) for odd and the point at infinity for even scalars.
        let order_two = x1.is_zero();
        let odd = LimbChoice::from(k.last().map_or(0, |b| (b & 1) as LimbType));
        x.cassign(&Fe25519::ZERO, order_two & odd);
        z.cassign(&Fe25519::ONE, order_two & odd);
        x.cassign(&Fe25519::ONE, order_two & !odd);
        z.cassign(&Fe25519::ZERO, order_two & !odd);

        // Z = 0 is always reported as (1 : 0).
        let at_infinity = z.is_zero();
        x.cassign(&Fe25519::ONE, at_infinity);
        self.x = x;
        self.z = z;
    }

    /// Return the big-endian affine x-coordinate.
    ///
    /// # Errors
    ///
    /// * [`Error::EcPai`] - the point is the point at infinity.
    ///
    pub fn get_x(&self) -> Result<[u8; 32]> {
        if self.is_pai() {
            return Err(Error::EcPai);
        }
        Ok(self.x.mul(&self.z.invert()).to_be_bytes())
    }

    /// Whether both points are the same, compared as `X1 * Z2 == X2 * Z1`.
    pub fn ct_eq(&self, other: &Self) -> LimbChoice {
        self.x.mul(&other.z).ct_eq(&other.x.mul(&self.z))
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.x = other.x;
        self.z = other.z;
    }
}

impl PartialEq for Curve25519Point {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).unwrap() != 0
    }
}

impl Eq for Curve25519Point {}

/// Clamp a little-endian X25519 scalar.
pub fn x25519_clamp_scalar(k: &mut [u8; 32]) {
    k[0] &= 248;
    k[31] &= 127;
    k[31] |= 64;
}

/// The X25519 function on little-endian encodings.
///
/// The scalar must have been clamped already, see [`x25519_clamp_scalar()`]. The most
/// significant bit of `u` is ignored. An all-zero output indicates a low order input point.
pub fn x25519(scalar: &[u8; 32], u: &[u8; 32]) -> [u8; 32] {
    let x1 = Fe25519::from_le_bytes(u);
    let (x, z) = ladder(&x1, msb_first_bits(scalar.iter().rev()));
    x.mul(&z.invert()).to_le_bytes()
}

#[cfg(test)]
use super::hexstr::bytes_from_hexstr_cnst;

#[cfg(test)]
const P25519_BE: [u8; 32] =
    bytes_from_hexstr_cnst::<32>("7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed");

#[cfg(test)]
const BASE_U: [u8; 32] = {
    let mut u = [0u8; 32];
    u[0] = 9;
    u
};

#[test]
fn test_x25519_rfc7748() {
    let scalar = bytes_from_hexstr_cnst::<32>("a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4");
    let u = bytes_from_hexstr_cnst::<32>("e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c");
    let expected = bytes_from_hexstr_cnst::<32>("c3da55379de9c6908e94ea4df28d084f32eccf03491c71f754b4075577a28552");
    let mut k = scalar;
    x25519_clamp_scalar(&mut k);
    assert_eq!(x25519(&k, &u), expected);

    let scalar = bytes_from_hexstr_cnst::<32>("4b66e9d4d1b4673c5ad22691957d6af5c11b6421e0ea01d42ca4169e7918ba0d");
    let u = bytes_from_hexstr_cnst::<32>("e5210f12786811d3f4b7959d0538ae2c31dbe7106fc03c3efc4cd549c715a493");
    let expected = bytes_from_hexstr_cnst::<32>("95cbde9476e8907d7aade45cb4b873f88b595a68799fa152e6f8f7647aac7957");
    let mut k = scalar;
    x25519_clamp_scalar(&mut k);
    assert_eq!(x25519(&k, &u), expected);
}

#[test]
fn test_x25519_iterated_once() {
    let mut k = BASE_U;
    x25519_clamp_scalar(&mut k);
    let expected = bytes_from_hexstr_cnst::<32>("422c8e7a6227d7bca1350b3e2bb7279f7897b87bb6854b783c60e80311ae3079");
    assert_eq!(x25519(&k, &BASE_U), expected);
}

#[test]
fn test_x25519_shared_secret() {
    let mut a = bytes_from_hexstr_cnst::<32>("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a");
    let mut b = bytes_from_hexstr_cnst::<32>("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb");
    x25519_clamp_scalar(&mut a);
    x25519_clamp_scalar(&mut b);
    let pub_a = x25519(&a, &BASE_U);
    let pub_b = x25519(&b, &BASE_U);
    assert_eq!(
        pub_a,
        bytes_from_hexstr_cnst::<32>("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a")
    );
    assert_eq!(
        pub_b,
        bytes_from_hexstr_cnst::<32>("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f")
    );
    let shared = bytes_from_hexstr_cnst::<32>("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742");
    assert_eq!(x25519(&a, &pub_b), shared);
    assert_eq!(x25519(&b, &pub_a), shared);
}

#[test]
fn test_x25519_low_order() {
    let mut k = [0x55u8; 32];
    x25519_clamp_scalar(&mut k);
    assert_eq!(x25519(&k, &[0u8; 32]), [0u8; 32]);
}

#[test]
fn test_curve25519_point_matches_x25519() {
    let mut k = bytes_from_hexstr_cnst::<32>("a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4");
    x25519_clamp_scalar(&mut k);
    let u = bytes_from_hexstr_cnst::<32>("e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c");
    let mut expected = x25519(&k, &u);
    expected.reverse();

    let mut u_be = u;
    u_be.reverse();
    u_be[0] &= 0x7f;
    let mut k_be = k;
    k_be.reverse();
    let mut p = Curve25519Point::new(&u_be).unwrap();
    p.scalar(&k_be);
    assert_eq!(p.get_x().unwrap(), expected);
}

#[test]
fn test_curve25519_point_scalar() {
    let mut base_be = BASE_U;
    base_be.reverse();
    let g = Curve25519Point::new(&base_be).unwrap();

    // 0 * G
    let mut p = g.clone();
    p.scalar(&[0u8]);
    assert!(p.is_pai());
    assert_eq!(p.get_x(), Err(Error::EcPai));
    assert_eq!(p, Curve25519Point::pai());

    // 1 * G
    let mut p = g.clone();
    p.scalar(&[0, 0, 1]);
    assert_eq!(p, g);
    assert_eq!(p.get_x().unwrap(), base_be);

    // 4 * G == 2 * (2 * G), in projective and affine form.
    let mut p4 = g.clone();
    p4.scalar(&[4]);
    let mut p22 = g.clone();
    p22.scalar(&[2]);
    p22.scalar(&[2]);
    assert_eq!(p4, p22);
    assert_eq!(p4.get_x().unwrap(), p22.get_x().unwrap());
    assert_ne!(p4, g);

    // (a * b) * G == a * (b * G)
    let mut pab = g.clone();
    pab.scalar(&[0x01, 0x00, 0x0c, 0x0d]);
    let mut pa_b = g.clone();
    pa_b.scalar(&[0x01, 0x01]);
    pa_b.scalar(&[0xff, 0x0d]);
    assert_eq!(pab, pa_b);

    // The point at infinity absorbs scalars.
    let mut pai = Curve25519Point::pai();
    pai.scalar(&[7]);
    assert!(pai.is_pai());

    let mut q = Curve25519Point::pai();
    q.copy_from(&p4);
    assert_eq!(q, p4);

    assert_eq!(Curve25519Point::new(&[0u8; 31]).err(), Some(Error::Value));
    assert_eq!(Curve25519Point::new(&P25519_BE).err(), Some(Error::Value));
    assert_eq!(Curve25519Point::new(&[0xffu8; 32]).err(), Some(Error::Value));
    let mut p_minus_1 = P25519_BE;
    p_minus_1[31] -= 1;
    assert!(Curve25519Point::new(&p_minus_1).is_ok());
}

#[test]
fn test_curve25519_order_two_point() {
    use super::ed25519::ED25519_ORDER;

    let t = Curve25519Point::new(&[0u8; 32]).unwrap();
    let mut base_be = BASE_U;
    base_be.reverse();
    let g = Curve25519Point::new(&base_be).unwrap();
    let pai = Curve25519Point::pai();

    // Odd multiples of (0 : 1) are the point itself.
    let odd: [&[u8]; 3] = [&[1], &[3], &ED25519_ORDER];
    for k in odd {
        let mut p = t.clone();
        p.scalar(k);
        assert!(!p.is_pai());
        assert_eq!(p.get_x().unwrap(), [0u8; 32]);
        assert_eq!(p, t);
        assert_ne!(p, g);
        assert_ne!(p, pai);
    }

    // Even ones are the point at infinity.
    let even: [&[u8]; 3] = [&[0], &[2], &[1, 0]];
    for k in even {
        let mut p = t.clone();
        p.scalar(k);
        assert!(p.is_pai());
        assert_eq!(p.get_x(), Err(Error::EcPai));
        assert_eq!(p, pai);
        assert_ne!(p, g);
        assert_ne!(p, t);
    }

    // The base point has order l.
    let mut p = g.clone();
    p.scalar(&ED25519_ORDER);
    assert!(p.is_pai());
    assert_eq!(p, pai);
    assert_ne!(p, g);
    assert_ne!(p, t);
}
