//! x86_64 inline assembly variants of the limb primitives.
//!
//! The flag producing instructions are consumed through `setc`/`adc` directly, so no
//! comparison the compiler could turn into a branch is involved.
#![cfg(all(feature = "enable_arch_math_asm", target_arch = "x86_64"))]

use super::{DoubleLimb, LimbType};
use core::arch::asm;

pub fn ct_is_nonzero_l(v: LimbType) -> LimbType {
    let result: LimbType;
    unsafe {
        asm!("xor {result:r}, {result:r};\
              test {v:r}, {v:r};\
              setnz {result:l};\
              ",
             v = in(reg) v,
             result = out(reg) result,
             options(pure, nomem, nostack),
        );
    }
    result
}

pub fn ct_is_zero_l(v: LimbType) -> LimbType {
    let result: LimbType;
    unsafe {
        asm!("xor {result:r}, {result:r};\
              test {v:r}, {v:r};\
              setz {result:l};\
              ",
             v = in(reg) v,
             result = out(reg) result,
             options(pure, nomem, nostack),
        );
    }
    result
}

pub fn ct_add_l_l(v0: LimbType, v1: LimbType) -> (LimbType, LimbType) {
    let result: LimbType;
    let carry: LimbType;
    unsafe {
        asm!("xor {carry:r}, {carry:r};\
              add {v0:r}, {v1:r};\
              setc {carry:l};\
              ",
             v0 = inout(reg) v0 => result,
             v1 = in(reg) v1,
             carry = out(reg) carry,
             options(pure, nomem, nostack),
        );
    }
    (carry, result)
}

pub fn ct_sub_l_l(v0: LimbType, v1: LimbType) -> (LimbType, LimbType) {
    let result: LimbType;
    let borrow: LimbType;
    unsafe {
        asm!("xor {borrow:r}, {borrow:r};\
              sub {v0:r}, {v1:r};\
              setc {borrow:l};\
              ",
             v0 = inout(reg) v0 => result,
             v1 = in(reg) v1,
             borrow = out(reg) borrow,
             options(pure, nomem, nostack),
        );
    }
    (borrow, result)
}

pub fn ct_mul_l_l(v0: LimbType, v1: LimbType) -> DoubleLimb {
    let l: LimbType;
    let h: LimbType;
    unsafe {
        asm!("mul {v1:r};",
             inout("ax") v0 => l,
             out("dx") h,
             v1 = in(reg) v1,
             options(pure, nomem, nostack),
        );
    }
    DoubleLimb::new(h, l)
}

/// `op0 + op10 * op11 + carry` as a (high, low) pair, with both additions chained through
/// `adc` on the high word.
pub fn ct_mul_add_l_l_l_c(
    op0: LimbType,
    op10: LimbType,
    op11: LimbType,
    carry: LimbType,
) -> (LimbType, LimbType) {
    let l: LimbType;
    let h: LimbType;
    unsafe {
        asm!("mul {op11:r};\
              add rax, {op0:r};\
              adc rdx, 0;\
              add rax, {carry:r};\
              adc rdx, 0;\
              ",
             inout("ax") op10 => l,
             out("dx") h,
             op11 = in(reg) op11,
             op0 = in(reg) op0,
             carry = in(reg) carry,
             options(pure, nomem, nostack),
        );
    }
    (h, l)
}
