//! X-only arithmetic on Curve448, `y^2 = x^3 + 156326 x^2 + x` over GF(2^448 - 2^224 - 1).
//!
//! The field arithmetic is the generic one from [`MontContext`]. Points live in projective
//! `(X : Z)` coordinates with the point at infinity at `(1 : 0)` and reference the
//! [`Curve448Context`] they were created for. Each point carries its own workplace, so that
//! no allocation happens during a scalar multiplication.

use tracing::debug;

use super::add_impl::ct_sub_cond_assign_mp_mp;
use super::cmp_impl::ct_geq_mp_mp;
use super::error::{Error, Result};
use super::hexstr::bytes_from_hexstr_cnst;
use super::limb::{LimbChoice, LimbType};
use super::limbs_buffer::{alloc_limbs, mp_limbs_from_le_bytes, mp_limbs_to_be_bytes};
use super::montgomery_impl::{MontContext, MontNumber, MontScratch};

/// Length of a field element's encoding in bytes.
pub const CURVE448_LEN: usize = 56;

/// `2^448 - 2^224 - 1`, big-endian.
pub(crate) const P448_BE: [u8; CURVE448_LEN] = bytes_from_hexstr_cnst::<CURVE448_LEN>(
    "fffffffffffffffffffffffffffffffffffffffffffffffffffffffe\
     ffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
);

/// `(A - 2) / 4` for Curve448's `A = 156326`.
const A24: u64 = 39081;

/// Montgomery arithmetic modulo `p448` along with the curve's constants.
#[derive(Clone, Debug)]
pub struct Curve448Context {
    mont: MontContext,
    a24: MontNumber,
}

impl Curve448Context {
    pub fn new() -> Result<Self> {
        let mont = MontContext::new(&P448_BE)?;
        let a24 = mont.from_u64(A24)?;
        Ok(Self { mont, a24 })
    }

    pub fn mont(&self) -> &MontContext {
        &self.mont
    }
}

/// Temporaries of the ladder.
#[derive(Clone)]
struct WorkplaceCurve448 {
    a: MontNumber,
    b: MontNumber,
    c: MontNumber,
    d: MontNumber,
    e: MontNumber,
    f: MontNumber,
    x1: MontNumber,
    x3: MontNumber,
    z3: MontNumber,
    scratch: MontScratch,
}

impl WorkplaceCurve448 {
    fn new(mont: &MontContext) -> Result<Self> {
        Ok(Self {
            a: mont.new_number()?,
            b: mont.new_number()?,
            c: mont.new_number()?,
            d: mont.new_number()?,
            e: mont.new_number()?,
            f: mont.new_number()?,
            x1: mont.new_number()?,
            x3: mont.new_number()?,
            z3: mont.new_number()?,
            scratch: mont.new_scratch()?,
        })
    }
}

/// A point on Curve448, in projective x-only coordinates.
#[derive(Clone)]
pub struct Curve448Point<'a> {
    x: MontNumber,
    z: MontNumber,
    wp: WorkplaceCurve448,
    ctx: &'a Curve448Context,
}

impl<'a> Curve448Point<'a> {
    /// Create a point from its big-endian affine x-coordinate.
    ///
    /// # Errors
    ///
    /// * [`Error::Value`] - `x` is not 56 bytes long or not reduced modulo `p`.
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn new(x: &[u8], ctx: &'a Curve448Context) -> Result<Self> {
        if x.len() != CURVE448_LEN {
            debug!(len = x.len(), "rejecting Curve448 coordinate of invalid length");
            return Err(Error::Value);
        }
        let x = ctx.mont.from_bytes(x)?;
        let z = ctx.mont.from_u64(1)?;
        let wp = WorkplaceCurve448::new(&ctx.mont)?;
        Ok(Self { x, z, wp, ctx })
    }

    /// The point at infinity.
    pub fn pai(ctx: &'a Curve448Context) -> Result<Self> {
        let x = ctx.mont.from_u64(1)?;
        let z = ctx.mont.new_number()?;
        let wp = WorkplaceCurve448::new(&ctx.mont)?;
        Ok(Self { x, z, wp, ctx })
    }

    pub fn is_pai(&self) -> bool {
        self.ctx.mont.is_zero(&self.z).unwrap() != 0
    }

    /// Multiply the point by a big-endian scalar of any length.
    ///
    /// The scalar is used as is, without any clamping. The point at infinity stays put.
    pub fn scalar(&mut self, k: &[u8]) {
        if self.is_pai() {
            return;
        }
        let ctx = self.ctx;
        let m = &ctx.mont;
        let wp = &mut self.wp;

        // The ladder wants an affine input.
        m.inv_prime(&mut wp.a, &self.z, &mut wp.scratch);
        m.mult(&mut wp.x1, &self.x, &wp.a, &mut wp.scratch);

        // (x2 : z2) = (x : z) = PAI, (x3 : z3) = P
        m.set(&mut self.x, 1, &mut wp.scratch);
        m.set(&mut self.z, 0, &mut wp.scratch);
        m.copy(&mut wp.x3, &wp.x1);
        m.set(&mut wp.z3, 1, &mut wp.scratch);

        let mut swap = LimbChoice::from(0);
        for byte in k.iter() {
            for i in (0..8).rev() {
                let bit = LimbChoice::from(((*byte >> i) & 1) as LimbType);
                swap = swap ^ bit;
                m.cswap(&mut self.x, &mut wp.x3, swap);
                m.cswap(&mut self.z, &mut wp.z3, swap);
                swap = bit;
                Self::ladder_step(ctx, &mut self.x, &mut self.z, wp);
            }
        }
        m.cswap(&mut self.x, &mut wp.x3, swap);
        m.cswap(&mut self.z, &mut wp.z3, swap);

        // The differential addition degenerates on the order two point x = 0, whose multiples
        // are (0 : 1) for odd and the point at infinity for even scalars.
        let order_two = m.is_zero(&wp.x1);
        let odd = LimbChoice::from(k.last().map_or(0, |b| (b & 1) as LimbType));
        m.set(&mut wp.e, 0, &mut wp.scratch);
        m.set(&mut wp.f, 1, &mut wp.scratch);
        m.cswap(&mut self.x, &mut wp.e, order_two & odd);
        m.cswap(&mut self.z, &mut wp.f, order_two & odd);
        m.set(&mut wp.e, 1, &mut wp.scratch);
        m.set(&mut wp.f, 0, &mut wp.scratch);
        m.cswap(&mut self.x, &mut wp.e, order_two & !odd);
        m.cswap(&mut self.z, &mut wp.f, order_two & !odd);

        // Z = 0 is always reported as (1 : 0).
        m.set(&mut wp.e, 1, &mut wp.scratch);
        let at_infinity = m.is_zero(&self.z);
        m.cswap(&mut self.x, &mut wp.e, at_infinity);
    }

    /// One step of the Montgomery ladder on `(x2 : z2)` and the workplace's `(x3 : z3)`,
    /// whose difference has the affine x-coordinate `wp.x1`.
    fn ladder_step(ctx: &Curve448Context, x2: &mut [LimbType], z2: &mut [LimbType], wp: &mut WorkplaceCurve448) {
        let m = &ctx.mont;
        let s = &mut wp.scratch;
        let (a, b, c, d, e, f) = (&mut wp.a, &mut wp.b, &mut wp.c, &mut wp.d, &mut wp.e, &mut wp.f);
        let (x3, z3) = (&mut wp.x3, &mut wp.z3);

        m.add(a, x2, z2, s);
        m.sub(b, x2, z2, s);
        m.add(c, x3, z3, s);
        m.sub(d, x3, z3, s);
        // DA, CB
        m.mult(e, d, a, s);
        m.mult(f, c, b, s);
        // x3 = (DA + CB)^2
        m.add(c, e, f, s);
        m.mult(x3, c, c, s);
        // z3 = x1 * (DA - CB)^2
        m.sub(d, e, f, s);
        m.mult(c, d, d, s);
        m.mult(z3, &wp.x1, c, s);
        // AA, BB
        m.mult(e, a, a, s);
        m.mult(f, b, b, s);
        // x2 = AA * BB
        m.mult(x2, e, f, s);
        // E = AA - BB, z2 = E * (AA + a24 * E)
        m.sub(a, e, f, s);
        m.mult(b, &ctx.a24, a, s);
        m.add(c, e, b, s);
        m.mult(z2, a, c, s);
    }

    /// Return the big-endian affine x-coordinate.
    ///
    /// # Errors
    ///
    /// * [`Error::EcPai`] - the point is the point at infinity.
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn get_x(&self) -> Result<[u8; CURVE448_LEN]> {
        if self.is_pai() {
            return Err(Error::EcPai);
        }
        let m = &self.ctx.mont;
        let mut scratch = m.new_scratch()?;
        let mut z_inv = m.new_number()?;
        let mut x = m.new_number()?;
        m.inv_prime(&mut z_inv, &self.z, &mut scratch);
        m.mult(&mut x, &self.x, &z_inv, &mut scratch);
        let mut out = [0u8; CURVE448_LEN];
        m.to_bytes(&mut out, &x)?;
        Ok(out)
    }

    /// Whether both points are the same, compared as `X1 * Z2 == X2 * Z1`.
    ///
    /// # Errors
    ///
    /// * [`Error::EcCurve`] - the points belong to different contexts.
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn cmp(&self, other: &Self) -> Result<bool> {
        if !core::ptr::eq(self.ctx, other.ctx) {
            return Err(Error::EcCurve);
        }
        let m = &self.ctx.mont;
        let mut scratch = m.new_scratch()?;
        let mut l = m.new_number()?;
        let mut r = m.new_number()?;
        m.mult(&mut l, &self.x, &other.z, &mut scratch);
        m.mult(&mut r, &other.x, &self.z, &mut scratch);
        Ok(m.is_equal(&l, &r).unwrap() != 0)
    }

    /// Overwrite this point with `other`.
    ///
    /// # Errors
    ///
    /// * [`Error::EcCurve`] - the points belong to different contexts.
    ///
    pub fn copy_from(&mut self, other: &Self) -> Result<()> {
        if !core::ptr::eq(self.ctx, other.ctx) {
            return Err(Error::EcCurve);
        }
        self.x.copy_from_slice(&other.x);
        self.z.copy_from_slice(&other.z);
        Ok(())
    }
}

/// Clamp a little-endian X448 scalar.
pub fn x448_clamp_scalar(k: &mut [u8; CURVE448_LEN]) {
    k[0] &= 252;
    k[55] |= 128;
}

/// The X448 function on little-endian encodings.
///
/// The scalar must have been clamped already, see [`x448_clamp_scalar()`]. Non-canonical
/// `u` values get reduced modulo `p`. An all-zero output indicates a low order input point.
///
/// # Errors
///
/// * [`Error::Memory`] - allocation failure.
///
pub fn x448(scalar: &[u8; CURVE448_LEN], u: &[u8; CURVE448_LEN]) -> Result<[u8; CURVE448_LEN]> {
    let ctx = Curve448Context::new()?;

    // u < 2^448 < 2p
    let mut u_mp = alloc_limbs(ctx.mont.words())?;
    mp_limbs_from_le_bytes(&mut u_mp, u);
    let n = ctx.mont.modulus();
    let geq = ct_geq_mp_mp(&u_mp, n);
    ct_sub_cond_assign_mp_mp(&mut u_mp, n, geq);
    let mut u_be = [0u8; CURVE448_LEN];
    mp_limbs_to_be_bytes(&mut u_be, &u_mp);

    let mut k_be = *scalar;
    k_be.reverse();

    let mut p = Curve448Point::new(&u_be, &ctx)?;
    p.scalar(&k_be);

    // A zero Z coordinate inverts to zero, mapping the point at infinity to u = 0.
    let m = &ctx.mont;
    let wp = &mut p.wp;
    m.inv_prime(&mut wp.a, &p.z, &mut wp.scratch);
    m.mult(&mut wp.b, &p.x, &wp.a, &mut wp.scratch);
    let mut out = [0u8; CURVE448_LEN];
    m.to_bytes(&mut out, &wp.b)?;
    out.reverse();
    Ok(out)
}

#[cfg(test)]
const BASE_U: [u8; CURVE448_LEN] = {
    let mut u = [0u8; CURVE448_LEN];
    u[0] = 5;
    u
};

#[test]
fn test_x448_rfc7748() {
    let mut k = bytes_from_hexstr_cnst::<56>(
        "3d262fddf9ec8e88495266fea19a34d28882acef045104d0d1aae121700a779c984c24f8cdd78fbff44943eba368f54b29259a4f1c600ad3",
    );
    let u = bytes_from_hexstr_cnst::<56>(
        "06fce640fa3487bfda5f6cf2d5263f8aad88334cbd07437f020f08f9814dc031ddbdc38c19c6da2583fa5429db94ada18aa7a7fb4ef8a086",
    );
    let expected = bytes_from_hexstr_cnst::<56>(
        "ce3e4ff95a60dc6697da1db1d85e6afbdf79b50a2412d7546d5f239fe14fbaadeb445fc66a01b0779d98223961111e21766282f73dd96b6f",
    );
    x448_clamp_scalar(&mut k);
    assert_eq!(x448(&k, &u).unwrap(), expected);
}

#[test]
fn test_x448_iterated_once() {
    let mut k = BASE_U;
    x448_clamp_scalar(&mut k);
    let expected = bytes_from_hexstr_cnst::<56>(
        "3f482c8a9f19b01e6c46ee9711d9dc14fd4bf67af30765c2ae2b846a4d23a8cd0db897086239492caf350b51f833868b9bc2b3bca9cf4113",
    );
    assert_eq!(x448(&k, &BASE_U).unwrap(), expected);
}

#[test]
fn test_x448_non_canonical_u() {
    // p + 5 is the same point as 5.
    let mut u = [0u8; CURVE448_LEN];
    u[0] = 0x04;
    u[28..].fill(0xff);
    let mut k = bytes_from_hexstr_cnst::<56>(
        "3d262fddf9ec8e88495266fea19a34d28882acef045104d0d1aae121700a779c984c24f8cdd78fbff44943eba368f54b29259a4f1c600ad3",
    );
    x448_clamp_scalar(&mut k);
    assert_eq!(x448(&k, &u).unwrap(), x448(&k, &BASE_U).unwrap());
    assert_eq!(x448(&k, &[0u8; CURVE448_LEN]).unwrap(), [0u8; CURVE448_LEN]);
}

#[test]
fn test_curve448_point() {
    let ctx = Curve448Context::new().unwrap();
    let mut base_be = BASE_U;
    base_be.reverse();
    let g = Curve448Point::new(&base_be, &ctx).unwrap();
    assert_eq!(g.get_x().unwrap(), base_be);

    let mut p = g.clone();
    p.scalar(&[0]);
    assert!(p.is_pai());
    assert_eq!(p.get_x(), Err(Error::EcPai));
    assert!(p.cmp(&Curve448Point::pai(&ctx).unwrap()).unwrap());

    let mut p = g.clone();
    p.scalar(&[1]);
    assert!(p.cmp(&g).unwrap());

    let mut p6 = g.clone();
    p6.scalar(&[6]);
    let mut p23 = g.clone();
    p23.scalar(&[2]);
    p23.scalar(&[0, 3]);
    assert!(p6.cmp(&p23).unwrap());
    assert!(!p6.cmp(&g).unwrap());
    assert_eq!(p6.get_x().unwrap(), p23.get_x().unwrap());

    let mut q = Curve448Point::pai(&ctx).unwrap();
    q.copy_from(&p6).unwrap();
    assert!(q.cmp(&p6).unwrap());

    // Scalar multiplication through the point API agrees with X448.
    let mut k = [0x5au8; CURVE448_LEN];
    x448_clamp_scalar(&mut k);
    let mut expected = x448(&k, &BASE_U).unwrap();
    expected.reverse();
    let mut k_be = k;
    k_be.reverse();
    let mut p = g.clone();
    p.scalar(&k_be);
    assert_eq!(p.get_x().unwrap(), expected);
}

#[test]
fn test_curve448_point_errors() {
    let ctx = Curve448Context::new().unwrap();
    let other_ctx = Curve448Context::new().unwrap();
    assert_eq!(Curve448Point::new(&[5u8; 55], &ctx).err(), Some(Error::Value));
    assert_eq!(Curve448Point::new(&P448_BE, &ctx).err(), Some(Error::Value));

    let mut base_be = BASE_U;
    base_be.reverse();
    let mut p = Curve448Point::new(&base_be, &ctx).unwrap();
    let q = Curve448Point::new(&base_be, &other_ctx).unwrap();
    assert_eq!(p.cmp(&q), Err(Error::EcCurve));
    assert_eq!(p.copy_from(&q), Err(Error::EcCurve));
}

#[test]
fn test_curve448_order_two_point() {
    use super::ed448::ED448_ORDER;

    let ctx = Curve448Context::new().unwrap();
    let t = Curve448Point::new(&[0u8; CURVE448_LEN], &ctx).unwrap();
    let mut base_be = BASE_U;
    base_be.reverse();
    let g = Curve448Point::new(&base_be, &ctx).unwrap();
    let pai = Curve448Point::pai(&ctx).unwrap();

    // Odd multiples of (0 : 1) are the point itself.
    let odd: [&[u8]; 3] = [&[1], &[3], &ED448_ORDER];
    for k in odd {
        let mut p = t.clone();
        p.scalar(k);
        assert!(!p.is_pai());
        assert_eq!(p.get_x().unwrap(), [0u8; CURVE448_LEN]);
        assert!(p.cmp(&t).unwrap());
        assert!(!p.cmp(&g).unwrap());
        assert!(!p.cmp(&pai).unwrap());
    }

    // Even ones are the point at infinity.
    let even: [&[u8]; 3] = [&[0], &[2], &[1, 0]];
    for k in even {
        let mut p = t.clone();
        p.scalar(k);
        assert!(p.is_pai());
        assert_eq!(p.get_x(), Err(Error::EcPai));
        assert!(p.cmp(&pai).unwrap());
        assert!(!p.cmp(&g).unwrap());
        assert!(!p.cmp(&t).unwrap());
    }

    // The base point has order q.
    let mut p = g.clone();
    p.scalar(&ED448_ORDER);
    assert!(p.is_pai());
    assert!(p.cmp(&pai).unwrap());
    assert!(!p.cmp(&g).unwrap());
}
