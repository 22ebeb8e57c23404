//! Point arithmetic on the Edwards curve Ed448-Goldilocks, `x^2 + y^2 = 1 + d x^2 y^2` with
//! `d = -39081`.
//!
//! Points are stored in projective coordinates `(X : Y : Z)` with `x = X/Z`, `y = Y/Z`, the
//! field arithmetic comes from [`MontContext`]. The addition and doubling formulas are
//! complete. Like [`Curve448Point`](super::curve448::Curve448Point), each point references its
//! [`Ed448Context`] and carries a workplace for the temporaries.

use tracing::debug;

use super::curve448::P448_BE;
use super::error::{Error, Result};
use super::hexstr::bytes_from_hexstr_cnst;
use super::limb::{LimbChoice, LimbType};
use super::montgomery_impl::{MontContext, MontNumber, MontScratch};

pub const ED448_LEN: usize = 56;

/// `d = -39081 mod p`, big-endian.
const D448_BE: [u8; ED448_LEN] = bytes_from_hexstr_cnst::<ED448_LEN>(
    "fffffffffffffffffffffffffffffffffffffffffffffffffffffffe\
     ffffffffffffffffffffffffffffffffffffffffffffffffffff6756",
);

/// Affine x-coordinate of the base point, big-endian.
pub const ED448_BASE_X: [u8; ED448_LEN] = bytes_from_hexstr_cnst::<ED448_LEN>(
    "4f1970c66bed0ded221d15a622bf36da9e146570470f1767ea6de324\
     a3d3a46412ae1af72ab66511433b80e18b00938e2626a82bc70cc05e",
);
/// Affine y-coordinate of the base point, big-endian.
pub const ED448_BASE_Y: [u8; ED448_LEN] = bytes_from_hexstr_cnst::<ED448_LEN>(
    "693f46716eb6bc248876203756c9c7624bea73736ca3984087789c1e\
     05a0c2d73ad3ff1ce67c39c4fdbd132c4ed7c8ad9808795bf230fa14",
);
/// Order of the base point, big-endian.
pub const ED448_ORDER: [u8; ED448_LEN] = bytes_from_hexstr_cnst::<ED448_LEN>(
    "3fffffffffffffffffffffffffffffffffffffffffffffffffffffff\
     7cca23e9c44edb49aed63690216cc2728dc58f552378c292ab5844f3",
);

/// Montgomery arithmetic modulo `p448` along with the curve's constants.
#[derive(Clone, Debug)]
pub struct Ed448Context {
    mont: MontContext,
    d: MontNumber,
}

impl Ed448Context {
    pub fn new() -> Result<Self> {
        let mont = MontContext::new(&P448_BE)?;
        let d = mont.from_bytes(&D448_BE)?;
        Ok(Self { mont, d })
    }

    pub fn mont(&self) -> &MontContext {
        &self.mont
    }
}

#[derive(Clone)]
struct WorkplaceEd448 {
    a: MontNumber,
    b: MontNumber,
    c: MontNumber,
    d: MontNumber,
    e: MontNumber,
    f: MontNumber,
    scratch: MontScratch,
}

impl WorkplaceEd448 {
    fn new(mont: &MontContext) -> Result<Self> {
        Ok(Self {
            a: mont.new_number()?,
            b: mont.new_number()?,
            c: mont.new_number()?,
            d: mont.new_number()?,
            e: mont.new_number()?,
            f: mont.new_number()?,
            scratch: mont.new_scratch()?,
        })
    }
}

/// A point on Ed448 in projective coordinates.
#[derive(Clone)]
pub struct Ed448Point<'a> {
    x: MontNumber,
    y: MontNumber,
    z: MontNumber,
    wp: WorkplaceEd448,
    ctx: &'a Ed448Context,
}

impl<'a> Ed448Point<'a> {
    /// Create a point from big-endian affine coordinates.
    ///
    /// # Errors
    ///
    /// * [`Error::Value`] - a coordinate is not 56 bytes long or not reduced modulo `p`.
    /// * [`Error::EcPoint`] - the coordinates don't satisfy the curve equation.
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn new(x: &[u8], y: &[u8], ctx: &'a Ed448Context) -> Result<Self> {
        if x.len() != ED448_LEN || y.len() != ED448_LEN {
            debug!(x_len = x.len(), y_len = y.len(), "rejecting Ed448 coordinates of invalid length");
            return Err(Error::Value);
        }
        let m = &ctx.mont;
        let mut p = Self {
            x: m.from_bytes(x)?,
            y: m.from_bytes(y)?,
            z: m.from_u64(1)?,
            wp: WorkplaceEd448::new(m)?,
            ctx,
        };

        // x^2 + y^2 == 1 + d x^2 y^2
        let wp = &mut p.wp;
        let s = &mut wp.scratch;
        m.mult(&mut wp.a, &p.x, &p.x, s);
        m.mult(&mut wp.b, &p.y, &p.y, s);
        m.add(&mut wp.c, &wp.a, &wp.b, s);
        m.mult(&mut wp.d, &wp.a, &wp.b, s);
        m.mult(&mut wp.e, &ctx.d, &wp.d, s);
        m.add(&mut wp.f, &wp.e, &p.z, s);
        if m.is_equal(&wp.c, &wp.f).unwrap() == 0 {
            debug!("rejecting point not on Ed448");
            return Err(Error::EcPoint);
        }
        Ok(p)
    }

    /// The neutral element `(0, 1)`.
    pub fn neutral(ctx: &'a Ed448Context) -> Result<Self> {
        let m = &ctx.mont;
        Ok(Self {
            x: m.new_number()?,
            y: m.from_u64(1)?,
            z: m.from_u64(1)?,
            wp: WorkplaceEd448::new(m)?,
            ctx,
        })
    }

    /// The standard base point.
    pub fn base(ctx: &'a Ed448Context) -> Result<Self> {
        Self::new(&ED448_BASE_X, &ED448_BASE_Y, ctx)
    }

    fn check_same_curve(&self, other: &Self) -> Result<()> {
        if !core::ptr::eq(self.ctx, other.ctx) {
            debug!("rejecting Ed448 points from different contexts");
            return Err(Error::EcCurve);
        }
        Ok(())
    }

    /// Return the big-endian affine coordinates `(x, y)`.
    ///
    /// # Errors
    ///
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn get_xy(&self) -> Result<([u8; ED448_LEN], [u8; ED448_LEN])> {
        let m = &self.ctx.mont;
        let mut scratch = m.new_scratch()?;
        let mut z_inv = m.new_number()?;
        let mut t = m.new_number()?;
        m.inv_prime(&mut z_inv, &self.z, &mut scratch);

        let mut x = [0u8; ED448_LEN];
        let mut y = [0u8; ED448_LEN];
        m.mult(&mut t, &self.x, &z_inv, &mut scratch);
        m.to_bytes(&mut x, &t)?;
        m.mult(&mut t, &self.y, &z_inv, &mut scratch);
        m.to_bytes(&mut y, &t)?;
        Ok((x, y))
    }

    /// Add `other` to this point.
    ///
    /// # Errors
    ///
    /// * [`Error::EcCurve`] - the points belong to different contexts.
    ///
    pub fn add(&mut self, other: &Self) -> Result<()> {
        self.check_same_curve(other)?;
        self.add_coords(&other.x, &other.y, &other.z);
        Ok(())
    }

    fn add_coords(&mut self, x2: &[LimbType], y2: &[LimbType], z2: &[LimbType]) {
        let ctx = self.ctx;
        let m = &ctx.mont;
        let wp = &mut self.wp;
        let s = &mut wp.scratch;
        let (a, b, c, d, e, f) = (&mut wp.a, &mut wp.b, &mut wp.c, &mut wp.d, &mut wp.e, &mut wp.f);
        let (x, y, z) = (&mut self.x, &mut self.y, &mut self.z);

        // A = Z1 Z2, B = A^2
        m.mult(a, z, z2, s);
        m.mult(b, a, a, s);
        // C = X1 X2, D = Y1 Y2, E = d C D
        m.mult(c, x, x2, s);
        m.mult(d, y, y2, s);
        m.mult(f, c, d, s);
        m.mult(e, &ctx.d, f, s);
        // F = B - E, G = B + E
        m.sub(f, b, e, s);
        m.add_assign(b, e, s);
        // H = (X1 + Y1)(X2 + Y2)
        m.add(e, x, y, s);
        m.add(z, x2, y2, s);
        m.mult(x, e, z, s);
        // X3 = A F (H - C - D), parked in z
        m.sub_assign(x, c, s);
        m.sub_assign(x, d, s);
        m.mult(e, a, f, s);
        m.mult(z, e, x, s);
        // Y3 = A G (D - C), parked in a
        m.sub(y, d, c, s);
        m.mult(e, a, b, s);
        m.mult(a, e, y, s);
        m.copy(x, z);
        m.copy(y, a);
        // Z3 = F G
        m.mult(z, f, b, s);
    }

    /// Double this point.
    pub fn double(&mut self) {
        let m = &self.ctx.mont;
        let wp = &mut self.wp;
        let s = &mut wp.scratch;
        let (a, b, c, d, e, f) = (&mut wp.a, &mut wp.b, &mut wp.c, &mut wp.d, &mut wp.e, &mut wp.f);
        let (x, y, z) = (&mut self.x, &mut self.y, &mut self.z);

        // B = (X + Y)^2, C = X^2, D = Y^2, E = C + D
        m.add(a, x, y, s);
        m.mult(b, a, a, s);
        m.mult(c, x, x, s);
        m.mult(d, y, y, s);
        m.add(e, c, d, s);
        // J = E - 2 Z^2
        m.mult(f, z, z, s);
        m.add(a, f, f, s);
        m.sub(f, e, a, s);
        // X3 = (B - E) J, Y3 = E (C - D), Z3 = E J
        m.sub(a, b, e, s);
        m.mult(x, a, f, s);
        m.sub(a, c, d, s);
        m.mult(y, e, a, s);
        m.mult(z, e, f, s);
    }

    /// Negate this point, `(x, y) -> (-x, y)`.
    pub fn neg(&mut self) {
        let m = &self.ctx.mont;
        m.neg(&mut self.wp.a, &self.x);
        m.copy(&mut self.x, &self.wp.a);
    }

    /// Multiply the point by a big-endian scalar of any length.
    ///
    /// Runs a Montgomery ladder with masked swaps: one addition and one doubling per scalar
    /// bit, whatever the bit's value.
    ///
    /// # Errors
    ///
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn scalar(&mut self, k: &[u8]) -> Result<()> {
        let m = &self.ctx.mont;
        let mut r0 = Self::neutral(self.ctx)?;
        let mut r1 = self.clone();

        let mut swap = LimbChoice::from(0);
        for byte in k.iter() {
            for i in (0..8).rev() {
                let bit = LimbChoice::from(((*byte >> i) & 1) as LimbType);
                swap = swap ^ bit;
                Self::cswap(m, &mut r0, &mut r1, swap);
                r1.add_coords(&r0.x, &r0.y, &r0.z);
                r0.double();
                swap = bit;
            }
        }
        Self::cswap(m, &mut r0, &mut r1, swap);

        m.copy(&mut self.x, &r0.x);
        m.copy(&mut self.y, &r0.y);
        m.copy(&mut self.z, &r0.z);
        Ok(())
    }

    fn cswap(m: &MontContext, p: &mut Self, q: &mut Self, cond: LimbChoice) {
        m.cswap(&mut p.x, &mut q.x, cond);
        m.cswap(&mut p.y, &mut q.y, cond);
        m.cswap(&mut p.z, &mut q.z, cond);
    }

    /// Whether both points are the same.
    ///
    /// # Errors
    ///
    /// * [`Error::EcCurve`] - the points belong to different contexts.
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn cmp(&self, other: &Self) -> Result<bool> {
        self.check_same_curve(other)?;
        let m = &self.ctx.mont;
        let mut scratch = m.new_scratch()?;
        let mut l = m.new_number()?;
        let mut r = m.new_number()?;

        m.mult(&mut l, &self.x, &other.z, &mut scratch);
        m.mult(&mut r, &other.x, &self.z, &mut scratch);
        let x_eq = m.is_equal(&l, &r);
        m.mult(&mut l, &self.y, &other.z, &mut scratch);
        m.mult(&mut r, &other.y, &self.z, &mut scratch);
        let y_eq = m.is_equal(&l, &r);
        Ok((x_eq & y_eq).unwrap() != 0)
    }

    /// Overwrite this point with `other`.
    ///
    /// # Errors
    ///
    /// * [`Error::EcCurve`] - the points belong to different contexts.
    ///
    pub fn copy_from(&mut self, other: &Self) -> Result<()> {
        self.check_same_curve(other)?;
        let m = &self.ctx.mont;
        m.copy(&mut self.x, &other.x);
        m.copy(&mut self.y, &other.y);
        m.copy(&mut self.z, &other.z);
        Ok(())
    }
}

#[test]
fn test_ed448_constants() {
    let ctx = Ed448Context::new().unwrap();
    let m = ctx.mont();
    let mut minus_d = m.new_number().unwrap();
    m.neg(&mut minus_d, &ctx.d);
    let expected = m.from_u64(39081).unwrap();
    assert_eq!(m.is_equal(&minus_d, &expected).unwrap(), 1);

    let g = Ed448Point::base(&ctx).unwrap();
    let (x, y) = g.get_xy().unwrap();
    assert_eq!(x, ED448_BASE_X);
    assert_eq!(y, ED448_BASE_Y);
}

#[test]
fn test_ed448_order() {
    let ctx = Ed448Context::new().unwrap();
    let neutral = Ed448Point::neutral(&ctx).unwrap();

    let mut p = Ed448Point::base(&ctx).unwrap();
    p.scalar(&ED448_ORDER).unwrap();
    assert!(p.cmp(&neutral).unwrap());

    let mut p = Ed448Point::base(&ctx).unwrap();
    p.scalar(&[0, 0]).unwrap();
    assert!(p.cmp(&neutral).unwrap());
    let (x, y) = p.get_xy().unwrap();
    assert_eq!(x, [0u8; ED448_LEN]);
    let mut one = [0u8; ED448_LEN];
    one[ED448_LEN - 1] = 1;
    assert_eq!(y, one);
}

#[test]
fn test_ed448_small_multiples() {
    let ctx = Ed448Context::new().unwrap();
    let g = Ed448Point::base(&ctx).unwrap();

    let mut p5 = g.clone();
    p5.scalar(&[5]).unwrap();
    let (x, y) = p5.get_xy().unwrap();
    assert_eq!(
        x,
        bytes_from_hexstr_cnst::<56>(
            "7a9f9335a48dcb0e2ba7601eedb50def80cbcf728562ada756d761e8958812808bc0d57a920c3c96f07b2d8cefc6f950d0a99d1092030034"
        )
    );
    // The result is on the curve.
    let p5_affine = Ed448Point::new(&x, &y, &ctx).unwrap();
    assert!(p5_affine.cmp(&p5).unwrap());

    let mut sum = Ed448Point::neutral(&ctx).unwrap();
    for _ in 0..5 {
        sum.add(&g).unwrap();
    }
    assert!(sum.cmp(&p5).unwrap());

    let mut p4 = g.clone();
    p4.double();
    p4.double();
    p4.add(&g).unwrap();
    assert!(p4.cmp(&p5).unwrap());
    assert!(!p4.cmp(&g).unwrap());
}

#[test]
fn test_ed448_group_laws() {
    let ctx = Ed448Context::new().unwrap();
    let g = Ed448Point::base(&ctx).unwrap();
    let neutral = Ed448Point::neutral(&ctx).unwrap();

    let mut a = g.clone();
    a.scalar(&[0x12, 0x34, 0x56]).unwrap();
    let mut b = g.clone();
    b.scalar(&[0xfe, 0xdc]).unwrap();

    let mut ab = a.clone();
    ab.add(&b).unwrap();
    let mut ba = b.clone();
    ba.add(&a).unwrap();
    assert!(ab.cmp(&ba).unwrap());

    // (a + b) + c == a + (b + c)
    let mut c = g.clone();
    c.scalar(&[0x77]).unwrap();
    let mut ab_c = ab.clone();
    ab_c.add(&c).unwrap();
    let mut bc = b.clone();
    bc.add(&c).unwrap();
    let mut a_bc = a.clone();
    a_bc.add(&bc).unwrap();
    assert!(ab_c.cmp(&a_bc).unwrap());

    let mut neg_a = a.clone();
    neg_a.neg();
    let mut z = a.clone();
    z.add(&neg_a).unwrap();
    assert!(z.cmp(&neutral).unwrap());

    let mut a2 = a.clone();
    a2.double();
    let mut aa = a.clone();
    aa.add(&a).unwrap();
    assert!(a2.cmp(&aa).unwrap());

    // 0x123456 * 0xfedc = 0x121f924de8
    let mut k = g.clone();
    k.scalar(&[0x12, 0x1f, 0x92, 0x4d, 0xe8]).unwrap();
    let mut k12 = a.clone();
    k12.scalar(&[0xfe, 0xdc]).unwrap();
    assert!(k.cmp(&k12).unwrap());

    let mut c = Ed448Point::neutral(&ctx).unwrap();
    c.copy_from(&k).unwrap();
    assert!(c.cmp(&k).unwrap());
}

#[test]
fn test_ed448_errors() {
    let ctx = Ed448Context::new().unwrap();
    let other_ctx = Ed448Context::new().unwrap();

    let mut y = ED448_BASE_Y;
    y[55] ^= 1;
    assert_eq!(Ed448Point::new(&ED448_BASE_X, &y, &ctx).err(), Some(Error::EcPoint));
    assert_eq!(Ed448Point::new(&ED448_BASE_X[1..], &ED448_BASE_Y, &ctx).err(), Some(Error::Value));
    assert_eq!(Ed448Point::new(&P448_BE, &ED448_BASE_Y, &ctx).err(), Some(Error::Value));

    let mut p = Ed448Point::base(&ctx).unwrap();
    let q = Ed448Point::base(&other_ctx).unwrap();
    assert_eq!(p.add(&q), Err(Error::EcCurve));
    assert_eq!(p.cmp(&q), Err(Error::EcCurve));
    assert_eq!(p.copy_from(&q), Err(Error::EcCurve));
}
