//! Definitions and arithmetic primitives related to [LimbType], the basic unit of multiprecision
//! integer arithmetic.
use core::arch::asm;
use core::convert;
use core::mem;
use core::ops;
#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// The basic unit used by the multiprecision integer arithmetic implementation.
///
/// # Notes
///
/// The following arithmetic on a [`LimbType`] is assumed to be constant-time:
/// - Binary operations: `not`, `or`, `and`, `xor`.
/// - Wrapping addition and subtraction of two [`LimbType`] words.
/// - Multiplication of two [`LimbType`] words where the result also fits
///   a [`LimbType`].
///
/// Word arrays are always made of 64-bit words, independent of the target's native width. On
/// targets without a constant-time 64x64->128 multiplication, enable the `portable_limb_mul`
/// feature to have [`ct_mul_l_l()`] decompose its operands into 32-bit lanes.
pub type LimbType = u64;

/// The bit width of a [`LimbType`].
pub const LIMB_BITS: u32 = LimbType::BITS;
/// The size of a [`LimbType`] in bytes.
pub const LIMB_BYTES: usize = mem::size_of::<LimbType>();

/// The bit width of half a [`LimbType`], i.e. a "halfword".
const HALF_LIMB_BITS: u32 = LIMB_BITS / 2;
/// Mask covering the lower halfword of a [`LimbType`].
const HALF_LIMB_MASK: LimbType = ct_lsb_mask_l(HALF_LIMB_BITS);

#[cfg(all(feature = "enable_arch_math_asm", target_arch = "x86_64"))]
mod x86_64_math;

// core::hint::black_box() is inefficient: it writes and reads from memory.
#[inline(always)]
pub fn black_box_l(v: LimbType) -> LimbType {
    let result: LimbType;
    unsafe {
        asm!("/* {v} */", v = inout(reg) v => result, options(pure, nomem, nostack));
    }
    result
}

/// A condition encoded as an all-zeroes or all-ones [`LimbType`] mask.
///
/// Every decision depending on secret data goes through a `LimbChoice`: selecting between two
/// values is done with the mask, never with a branch.
#[derive(Clone, Copy, Debug)]
pub struct LimbChoice {
    mask: LimbType,
}

impl LimbChoice {
    pub const fn new(cond: LimbType) -> Self {
        debug_assert!(cond == 0 || cond == 1);
        Self { mask: (0 as LimbType).wrapping_sub(cond) }
    }

    /// Map an arbitrary condition word to a choice, any non-zero value meaning "set".
    pub fn from_nonzero(cond: LimbType) -> Self {
        Self::new(ct_is_nonzero_l(cond))
    }

    pub fn unwrap(&self) -> LimbType {
        black_box_l(self.mask & 1)
    }

    /// Evaluates to `v0` if the choice is unset and to `v1` otherwise.
    pub const fn select(&self, v0: LimbType, v1: LimbType) -> LimbType {
        v0 ^ (self.mask & (v0 ^ v1))
    }

    pub fn select_u32(&self, v0: u32, v1: u32) -> u32 {
        v0 ^ (self.mask as u32 & (v0 ^ v1))
    }

    pub fn select_u8(&self, v0: u8, v1: u8) -> u8 {
        v0 ^ (self.mask as u8 & (v0 ^ v1))
    }
}

impl convert::From<LimbType> for LimbChoice {
    fn from(value: LimbType) -> Self {
        Self::new(value)
    }
}

impl ops::Not for LimbChoice {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self { mask: !self.mask }
    }
}

impl ops::BitAnd for LimbChoice {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self { mask: self.mask & rhs.mask }
    }
}

impl ops::BitAndAssign for LimbChoice {
    fn bitand_assign(&mut self, rhs: Self) {
        self.mask &= rhs.mask
    }
}

impl ops::BitOr for LimbChoice {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self { mask: self.mask | rhs.mask }
    }
}

impl ops::BitOrAssign for LimbChoice {
    fn bitor_assign(&mut self, rhs: Self) {
        self.mask |= rhs.mask
    }
}

impl ops::BitXor for LimbChoice {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Self { mask: self.mask ^ rhs.mask }
    }
}

/// Prerequisite trait for the [`zeroize::DefaultIsZeroes`] marker trait.
#[cfg(feature = "zeroize")]
impl Default for LimbChoice {
    fn default() -> Self {
        Self::from(0)
    }
}

/// Marker trait enabling a generic [`zeroize::Zeroize`] trait implementation.
#[cfg(feature = "zeroize")]
impl zeroize::DefaultIsZeroes for LimbChoice {}

#[test]
fn test_limb_choice_select() {
    for cond in [0, 1] {
        let c = LimbChoice::from(cond);
        assert_eq!(c.unwrap(), cond);
        assert_eq!(c.select(0x1234, !0), if cond == 0 { 0x1234 } else { !0 });
        assert_eq!(c.select_u32(7, 9), if cond == 0 { 7 } else { 9 });
        assert_eq!(c.select_u8(0xa5, 0x5a), if cond == 0 { 0xa5 } else { 0x5a });
    }
    for cond in [0x01, 0xff, 1 << (LIMB_BITS - 1), !0] {
        assert_eq!(LimbChoice::from_nonzero(cond).unwrap(), 1);
    }
    assert_eq!(LimbChoice::from_nonzero(0).unwrap(), 0);
}

#[allow(unused)]
pub fn generic_ct_is_nonzero_l(v: LimbType) -> LimbType {
    // If v is non-zero, then v or -v or both have the high bit set.
    black_box_l((v | v.wrapping_neg()) >> (LIMB_BITS - 1))
}

#[cfg(not(all(feature = "enable_arch_math_asm", target_arch = "x86_64")))]
pub use self::generic_ct_is_nonzero_l as ct_is_nonzero_l;

#[cfg(all(feature = "enable_arch_math_asm", target_arch = "x86_64"))]
pub use x86_64_math::ct_is_nonzero_l;

#[allow(unused)]
pub fn generic_ct_is_zero_l(v: LimbType) -> LimbType {
    (1 as LimbType) ^ ct_is_nonzero_l(v)
}

#[cfg(not(all(feature = "enable_arch_math_asm", target_arch = "x86_64")))]
pub use self::generic_ct_is_zero_l as ct_is_zero_l;

#[cfg(all(feature = "enable_arch_math_asm", target_arch = "x86_64"))]
pub use x86_64_math::ct_is_zero_l;

pub fn ct_eq_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    LimbChoice::from(ct_is_zero_l(v0 ^ v1))
}

pub fn ct_neq_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    !ct_eq_l_l(v0, v1)
}

pub fn ct_lt_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    let (borrow, _) = ct_sub_l_l(v0, v1);
    LimbChoice::from(borrow)
}

pub fn ct_le_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    !ct_lt_l_l(v1, v0)
}

pub fn ct_gt_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    ct_lt_l_l(v1, v0)
}

pub fn ct_ge_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    ct_le_l_l(v1, v0)
}

#[test]
fn test_ct_cmp_l_l() {
    assert_eq!(ct_eq_l_l(5, 5).unwrap(), 1);
    assert_eq!(ct_neq_l_l(5, 5).unwrap(), 0);
    assert_eq!(ct_lt_l_l(4, 5).unwrap(), 1);
    assert_eq!(ct_lt_l_l(5, 5).unwrap(), 0);
    assert_eq!(ct_le_l_l(5, 5).unwrap(), 1);
    assert_eq!(ct_gt_l_l(!0, 0).unwrap(), 1);
    assert_eq!(ct_ge_l_l(0, !0).unwrap(), 0);
}

pub const fn ct_lsb_mask_l(nbits: u32) -> LimbType {
    debug_assert!(nbits <= LIMB_BITS);
    // The standard way for generating a mask with nbits of the lower bits set is (1 << nbits) -
    // 1. However, for nbits == LIMB_BITS, the right shift would be undefined behaviour. Split nbits
    // into nbits_lo < LIMB_BITS and a nbits_hi == (nbits == LIMB_BITS) components and generate
    // masks for each individually.
    let nbits_lo = nbits % LIMB_BITS;
    let nbits_hi = nbits / LIMB_BITS;
    debug_assert!(nbits_hi <= 1);
    debug_assert!(nbits_hi == 0 || nbits_lo == 0);

    let mask_for_lo = (1 << nbits_lo) - 1;
    let mask_for_hi = (0 as LimbType).wrapping_sub(nbits_hi as LimbType);
    mask_for_lo | mask_for_hi
}

#[test]
fn test_ct_lsb_mask_l() {
    for i in 0..LIMB_BITS {
        let mask = ct_lsb_mask_l(i);
        assert_eq!(mask, (1 << i) - 1);
    }
    assert_eq!(ct_lsb_mask_l(LIMB_BITS), !0);
}

/// Split a limb into upper and lower half limbs.
///
/// Returns a pair of upper and lower half limb, in this order.
fn ct_l_to_hls(v: LimbType) -> (LimbType, LimbType) {
    (black_box_l(v >> HALF_LIMB_BITS), black_box_l(v & HALF_LIMB_MASK))
}

/// Add two limbs.
///
/// Returns a pair of carry and the [`LimbType::BITS`] lower bits of the sum.
///
/// Runs in constant time.
///
/// # Arguments:
///
/// * `v0` - first operand
/// * `v1` - second operand
///
#[allow(unused)]
pub fn generic_ct_add_l_l(v0: LimbType, v1: LimbType) -> (LimbType, LimbType) {
    // Don't rely on overflowing_add() for determining the carry -- that would almost certainly
    // branch and not be constant-time.
    let v0 = black_box_l(v0);
    let v1 = black_box_l(v1);
    let r = v0.wrapping_add(v1);
    let carry = black_box_l((((v0 | v1) & !r) | (v0 & v1)) >> (LIMB_BITS - 1));
    (carry, r)
}

#[cfg(not(all(feature = "enable_arch_math_asm", target_arch = "x86_64")))]
pub use self::generic_ct_add_l_l as ct_add_l_l;

#[cfg(all(feature = "enable_arch_math_asm", target_arch = "x86_64"))]
pub use x86_64_math::ct_add_l_l;

#[test]
fn test_ct_add_l_l() {
    for add in [ct_add_l_l, generic_ct_add_l_l] {
        assert_eq!(add(0, 0), (0, 0));
        assert_eq!(add(1, 0), (0, 1));
        assert_eq!(add(!0 - 1, 1), (0, !0));
        assert_eq!(add(!0, 1), (1, 0));
        assert_eq!(add(1 << (LIMB_BITS - 1), 1 << (LIMB_BITS - 1)), (1, 0));
        assert_eq!(add(!0, 1 << (LIMB_BITS - 1)), (1, ct_lsb_mask_l(LIMB_BITS - 1)));
        assert_eq!(add(!0, !0), (1, !0 - 1));
    }
}

pub fn ct_add_l_l_c(v0: LimbType, v1: LimbType, carry: LimbType) -> (LimbType, LimbType) {
    debug_assert!(carry <= 1);
    let (carry0, r) = ct_add_l_l(v0, carry);
    let (carry1, r) = ct_add_l_l(r, v1);
    let carry = carry0 + carry1;
    debug_assert!(carry <= 1);
    (carry, r)
}

/// Subtract two limbs.
///
/// Returns a pair of borrow and the [`LimbType::BITS`] lower bits of the difference.
///
/// Runs in constant time.
///
/// # Arguments:
///
/// * `v0` - first operand
/// * `v1` - second operand
///
#[allow(unused)]
pub fn generic_ct_sub_l_l(v0: LimbType, v1: LimbType) -> (LimbType, LimbType) {
    // Don't rely on overflowing_sub() for determining the borrow -- that would almost certainly
    // branch and not be constant-time.
    let v0 = black_box_l(v0);
    let v1 = black_box_l(v1);
    let r = v0.wrapping_sub(v1);
    let borrow = black_box_l((((r | v1) & !v0) | (v1 & r)) >> (LIMB_BITS - 1));
    (borrow, r)
}

#[cfg(not(all(feature = "enable_arch_math_asm", target_arch = "x86_64")))]
pub use self::generic_ct_sub_l_l as ct_sub_l_l;

#[cfg(all(feature = "enable_arch_math_asm", target_arch = "x86_64"))]
pub use x86_64_math::ct_sub_l_l;

#[test]
fn test_ct_sub_l_l() {
    for sub in [ct_sub_l_l, generic_ct_sub_l_l] {
        assert_eq!(sub(0, 0), (0, 0));
        assert_eq!(sub(1, 0), (0, 1));
        assert_eq!(sub(0, 1), (1, !0));
        assert_eq!(sub(1 << (LIMB_BITS - 1), 1 << (LIMB_BITS - 1)), (0, 0));
        assert_eq!(sub(0, 1 << (LIMB_BITS - 1)), (1, 1 << (LIMB_BITS - 1)));
        assert_eq!(sub(1 << (LIMB_BITS - 1), (1 << (LIMB_BITS - 1)) + 1), (1, !0));
    }
}

pub fn ct_sub_l_l_b(v0: LimbType, v1: LimbType, borrow: LimbType) -> (LimbType, LimbType) {
    debug_assert!(borrow <= 1);
    let (borrow0, r) = ct_sub_l_l(v0, borrow);
    let (borrow1, r) = ct_sub_l_l(r, v1);
    let borrow = borrow0 + borrow1;
    debug_assert!(borrow <= 1);
    (borrow, r)
}

/// A pair of [`LimbType`]s interpreted as a double precision integer.
///
/// Used for the result of [`LimbType`] multiplications.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "zeroize", derive(Zeroize))]
pub struct DoubleLimb {
    v: [LimbType; 2],
}

impl DoubleLimb {
    pub fn new(h: LimbType, l: LimbType) -> Self {
        Self { v: [l, h] }
    }

    pub fn high(&self) -> LimbType {
        self.v[1]
    }

    pub fn low(&self) -> LimbType {
        self.v[0]
    }
}

/// Multiply two limbs in constant time by splitting them into 32-bit lanes.
///
/// Only relies on [`LimbType`] multiplications whose result fits a [`LimbType`], for targets
/// where the widening multiplication would be lowered to a library call.
///
/// # Arguments:
///
/// * `v0` - first operand
/// * `v1` - second operand
///
#[allow(unused)]
pub fn generic_ct_mul_l_l(v0: LimbType, v1: LimbType) -> DoubleLimb {
    let (v0h, v0l) = ct_l_to_hls(v0);
    let (v1h, v1l) = ct_l_to_hls(v1);

    let prod_v0l_v1l = v0l * v1l;
    let prod_v0l_v1h = v0l * v1h;
    let prod_v0h_v1l = v0h * v1l;
    let prod_v0h_v1h = v0h * v1h;

    let mut result_low: LimbType = prod_v0l_v1l;
    let mut result_high: LimbType = prod_v0h_v1h;

    let (prod_v0l_v1h_h, prod_v0l_v1h_l) = ct_l_to_hls(prod_v0l_v1h);
    let (prod_v0h_v1l_h, prod_v0h_v1l_l) = ct_l_to_hls(prod_v0h_v1l);

    let (result_low_carry, result_low_sum) =
        ct_add_l_l(result_low, prod_v0l_v1h_l << HALF_LIMB_BITS);
    result_low = result_low_sum;
    result_high += result_low_carry;
    result_high += prod_v0l_v1h_h;

    let (result_low_carry, result_low_sum) =
        ct_add_l_l(result_low, prod_v0h_v1l_l << HALF_LIMB_BITS);
    result_low = result_low_sum;
    result_high += result_low_carry;
    result_high += prod_v0h_v1l_h;

    DoubleLimb::new(result_high, result_low)
}

/// Multiply two limbs through the native 128-bit product.
#[allow(unused)]
pub fn native_ct_mul_l_l(v0: LimbType, v1: LimbType) -> DoubleLimb {
    let prod = (v0 as u128) * (v1 as u128);
    DoubleLimb::new(black_box_l((prod >> LIMB_BITS) as LimbType), black_box_l(prod as LimbType))
}

#[cfg(feature = "portable_limb_mul")]
pub use self::generic_ct_mul_l_l as ct_mul_l_l;

#[cfg(all(
    not(feature = "portable_limb_mul"),
    not(all(feature = "enable_arch_math_asm", target_arch = "x86_64"))
))]
pub use self::native_ct_mul_l_l as ct_mul_l_l;

#[cfg(all(
    not(feature = "portable_limb_mul"),
    feature = "enable_arch_math_asm",
    target_arch = "x86_64"
))]
pub use x86_64_math::ct_mul_l_l;

#[test]
fn test_ct_mul_l_l() {
    for mul in [ct_mul_l_l, generic_ct_mul_l_l, native_ct_mul_l_l] {
        let p = mul(0, 0);
        assert_eq!(p.low(), 0);
        assert_eq!(p.high(), 0);

        let p = mul(2, 2);
        assert_eq!(p.low(), 4);
        assert_eq!(p.high(), 0);

        let p = mul(1 << (LIMB_BITS - 1), 2);
        assert_eq!(p.low(), 0);
        assert_eq!(p.high(), 1);

        let p = mul(2, 1 << (LIMB_BITS - 1));
        assert_eq!(p.low(), 0);
        assert_eq!(p.high(), 1);

        let p = mul(1 << (LIMB_BITS - 1), 1 << (LIMB_BITS - 1));
        assert_eq!(p.low(), 0);
        assert_eq!(p.high(), 1 << (LIMB_BITS - 2));

        let p = mul(!0, !0);
        assert_eq!(p.low(), 1);
        assert_eq!(p.high(), !1);
    }

    // The lane decomposition must agree with the native product bit for bit.
    const MERSENNE_PRIME_31: LimbType = 2147483647;
    for i in 0..256 as LimbType {
        let v0 = MERSENNE_PRIME_31.wrapping_mul(0x9e3779b97f4a7c15u64.wrapping_mul(i + 1));
        let v1 = MERSENNE_PRIME_31.wrapping_mul(0xc2b2ae3d27d4eb4fu64.wrapping_mul(i + 7));
        assert_eq!(generic_ct_mul_l_l(v0, v1), native_ct_mul_l_l(v0, v1));
    }
}

/// Compute `op0 + op10 * op11 + carry`.
///
/// Returns the pair of the high limb, to be used as the next carry, and the low limb.
#[allow(unused)]
pub fn generic_ct_mul_add_l_l_l_c(
    op0: LimbType,
    op10: LimbType,
    op11: LimbType,
    carry: LimbType,
) -> (LimbType, LimbType) {
    let prod = ct_mul_l_l(op10, op11);
    // Basic property of the multiplication.
    debug_assert!(prod.high() < !1 || prod.high() == !1 && prod.low() == 1);
    let (carry0, result) = ct_add_l_l(op0, carry);
    let (carry1, result) = ct_add_l_l(result, prod.low());
    // The new carry does not overflow: if carry0 != 0,
    // then the result after after the first addition is
    // <= !1, because that addition did wrap around.
    // If in addition prod.high() == !1, then prod.low() <= 1
    // and the second addition would not overflow.
    debug_assert!(prod.high() < !1 || carry0 + carry1 <= 1);
    let carry = prod.high() + carry0 + carry1;
    (carry, result)
}

#[cfg(not(all(
    not(feature = "portable_limb_mul"),
    feature = "enable_arch_math_asm",
    target_arch = "x86_64"
)))]
pub use self::generic_ct_mul_add_l_l_l_c as ct_mul_add_l_l_l_c;

#[cfg(all(
    not(feature = "portable_limb_mul"),
    feature = "enable_arch_math_asm",
    target_arch = "x86_64"
))]
pub use x86_64_math::ct_mul_add_l_l_l_c;

#[test]
fn test_ct_mul_add_l_l_l_c() {
    for mul_add in [ct_mul_add_l_l_l_c, generic_ct_mul_add_l_l_l_c] {
        assert_eq!(mul_add(0, 0, 0, 0), (0, 0));
        assert_eq!(mul_add(!0, !0, !0, !0), (!0, !0));
        assert_eq!(mul_add(1, 2, 3, 4), (0, 11));
        assert_eq!(mul_add(!0, 1, 1, 0), (1, 0));
        assert_eq!(mul_add(0, 1 << (LIMB_BITS - 1), 4, 3), (2, 3));
    }
}

/// Invert an odd limb modulo `2^LIMB_BITS`.
///
/// Closed form Newton iteration: any odd `v` is its own inverse modulo `2^3`, each step
/// `r <- r * (2 - v * r)` doubles the number of correct low bits, so five steps take the
/// initial 3 bits past 64.
///
/// Runs in constant time.
pub fn ct_inv_mod_l(v: LimbType) -> LimbType {
    debug_assert_eq!(v & 1, 1);
    let mut r = v;
    for _ in 0..5 {
        r = r.wrapping_mul((2 as LimbType).wrapping_sub(v.wrapping_mul(r)));
    }
    debug_assert_eq!(v.wrapping_mul(r), 1);
    r
}

#[test]
fn test_ct_inv_mod_l() {
    for j in 0..LIMB_BITS {
        let v = ((1 as LimbType) << j) | 1;
        assert_eq!(v.wrapping_mul(ct_inv_mod_l(v)), 1);
    }

    for j in 1..LIMB_BITS {
        let v = ((1 as LimbType) << j).wrapping_sub(1);
        assert_eq!(v.wrapping_mul(ct_inv_mod_l(v)), 1);
    }

    let v: LimbType = !0;
    assert_eq!(v.wrapping_mul(ct_inv_mod_l(v)), 1);

    const MERSENNE_PRIME_13: LimbType = 8191 as LimbType;
    for j in 0..4096 as LimbType {
        let v = MERSENNE_PRIME_13.wrapping_mul((131071 as LimbType).wrapping_mul(j)) | 1;
        assert_eq!(v.wrapping_mul(ct_inv_mod_l(v)), 1);
    }
}
