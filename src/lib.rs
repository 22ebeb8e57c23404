//! Constant-time arithmetic for public-key primitives.
//!
//! Montgomery multiplication and fixed-window exponentiation over arbitrary odd moduli, the
//! GF(2^255 - 19) field, and scalar multiplication on Curve25519, Curve448, Ed25519 and Ed448.
//! None of the operations branch on or index memory by secret values, only public lengths
//! determine the control flow.

mod add_impl;
mod cmp_impl;
mod curve25519;
mod curve448;
mod ed25519;
mod ed448;
mod error;
mod field25519;
pub mod hexstr;
mod limb;
mod limbs_buffer;
mod modexp_impl;
mod montgomery_impl;
mod mul_impl;
mod scatter;
mod zeroizing;

#[cfg(test)]
mod test_helpers;

pub use limb::{
    ct_eq_l_l, ct_ge_l_l, ct_gt_l_l, ct_is_nonzero_l, ct_is_zero_l, ct_le_l_l, ct_lt_l_l, ct_neq_l_l, LimbChoice,
    LimbType, LIMB_BITS, LIMB_BYTES,
};

pub use limbs_buffer::{
    ct_select_mp, ct_swap_cond_mp, mp_ct_nlimbs, mp_limbs_from_be_bytes, mp_limbs_from_le_bytes, mp_limbs_to_be_bytes,
    mp_limbs_to_le_bytes,
};

pub use add_impl::{ct_add_mp_mp, ct_sub_mp_mp};

pub use cmp_impl::{ct_eq_mp_mp, ct_geq_mp_mp, ct_gt_mp_mp, ct_is_one_mp, ct_is_zero_mp, ct_lt_mp_mp, ct_neq_mp_mp};

pub use mul_impl::{ct_addmul128_mp, ct_addmul_mp_l, ct_product_mp_mp, ct_square_mp};

pub use montgomery_impl::{MontContext, MontNumber, MontScratch};

pub use scatter::ProtMemory;

pub use modexp_impl::{monty_multiply, monty_pow, BitWindowLr};

pub use error::{result_code, Error, Result};

pub use zeroizing::Zeroizing;

pub use field25519::Fe25519;

pub use curve25519::{ladder_step as curve25519_ladder_step, x25519, x25519_clamp_scalar, Curve25519Point};

pub use curve448::{x448, x448_clamp_scalar, Curve448Context, Curve448Point, CURVE448_LEN};

pub use ed25519::{Ed25519Point, ED25519_BASE_X, ED25519_BASE_Y, ED25519_LEN, ED25519_ORDER};

pub use ed448::{Ed448Context, Ed448Point, ED448_BASE_X, ED448_BASE_Y, ED448_LEN, ED448_ORDER};
