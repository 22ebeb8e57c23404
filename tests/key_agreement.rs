use montec::hexstr::bytes_from_hexstr_cnst;
use montec::{
    result_code, x25519, x25519_clamp_scalar, x448, x448_clamp_scalar, Curve25519Point, Curve448Context,
    Curve448Point, Ed25519Point, Ed448Context, Ed448Point, Error, ED25519_ORDER, ED448_ORDER,
};

fn scalar_bytes<const N: usize>(seed: u8) -> [u8; N] {
    let mut k = [0u8; N];
    let mut v = seed as u32;
    for b in k.iter_mut() {
        v = v.wrapping_mul(1664525).wrapping_add(1013904223);
        *b = (v >> 24) as u8;
    }
    k
}

#[test]
fn x25519_key_agreement() {
    let mut base = [0u8; 32];
    base[0] = 9;
    for seed in 0..4u8 {
        let mut a = scalar_bytes::<32>(seed);
        let mut b = scalar_bytes::<32>(seed + 100);
        x25519_clamp_scalar(&mut a);
        x25519_clamp_scalar(&mut b);
        let pub_a = x25519(&a, &base);
        let pub_b = x25519(&b, &base);
        assert_ne!(pub_a, pub_b);
        assert_eq!(x25519(&a, &pub_b), x25519(&b, &pub_a));
    }
}

#[test]
fn x448_key_agreement() {
    let alice = bytes_from_hexstr_cnst::<56>(
        "9a8f4925d1519f5775cf46b04b5800d4ee9ee8bae8bc5565d498c28dd9c9baf574a9419744897391006382a6f127ab1d9ac2d8c0a598726b",
    );
    let bob = bytes_from_hexstr_cnst::<56>(
        "1c306a7ac2a0e2e0990b294470cba339e6453772b075811d8fad0d1d6927c120bb5ee8972b0d3e21374c9c921b09d1b0366f10b65173992d",
    );
    let shared = bytes_from_hexstr_cnst::<56>(
        "07fff4181ac6cc95ec1c16a94a0f74d12da232ce40a77552281d282bb60c0b56fd2464c335543936521c24403085d59a449a5037514a879d",
    );
    let mut base = [0u8; 56];
    base[0] = 5;

    let mut a = alice;
    let mut b = bob;
    x448_clamp_scalar(&mut a);
    x448_clamp_scalar(&mut b);
    let pub_a = x448(&a, &base).unwrap();
    let pub_b = x448(&b, &base).unwrap();
    assert_eq!(x448(&a, &pub_b).unwrap(), shared);
    assert_eq!(x448(&b, &pub_a).unwrap(), shared);
}

#[test]
fn montgomery_and_edwards_ladders_agree() {
    // Ed25519's base point maps to u = 9 under the birational equivalence, so the x-only
    // ladder and the Edwards ladder must produce corresponding points.
    let k = scalar_bytes::<32>(7);
    let mut u_be = [0u8; 32];
    u_be[31] = 9;
    let mut p = Curve25519Point::new(&u_be).unwrap();
    p.scalar(&k);
    let u = p.get_x().unwrap();

    let mut q = Ed25519Point::base();
    q.scalar(&k);
    let (_, y) = q.get_xy();

    // u = (1 + y) / (1 - y), checked as u * (1 - y) == 1 + y.
    let mut y_le = y;
    y_le.reverse();
    let mut u_le = u;
    u_le.reverse();
    let y = montec::Fe25519::from_le_bytes(&y_le);
    let u = montec::Fe25519::from_le_bytes(&u_le);
    let one = montec::Fe25519::ONE;
    assert_eq!(u.mul(&one.sub(&y)).ct_eq(&one.add(&y)).unwrap(), 1);
}

#[test]
fn edwards_orders() {
    let mut p = Ed25519Point::base();
    p.scalar(&ED25519_ORDER);
    assert_eq!(p, Ed25519Point::neutral());

    let ctx = Ed448Context::new().unwrap();
    let mut p = Ed448Point::base(&ctx).unwrap();
    p.scalar(&ED448_ORDER).unwrap();
    assert!(p.cmp(&Ed448Point::neutral(&ctx).unwrap()).unwrap());
}

#[test]
fn error_codes() {
    let ctx = Curve448Context::new().unwrap();
    let pai = Curve448Point::pai(&ctx).unwrap();
    let r = pai.get_x();
    assert_eq!(r, Err(Error::EcPai));
    assert_eq!(result_code(&r), 18);

    let r = Curve448Point::new(&[1u8; 3], &ctx).map(|_| ());
    assert_eq!(result_code(&r), 14);

    let r = Ed25519Point::new(&[0u8; 32], &[0u8; 32]).map(|_| ());
    assert_eq!(r, Err(Error::EcPoint));
    assert_eq!(result_code(&r), 15);

    let other = Ed448Context::new().unwrap();
    let ctx448 = Ed448Context::new().unwrap();
    let mut p = Ed448Point::neutral(&ctx448).unwrap();
    let q = Ed448Point::neutral(&other).unwrap();
    let r = p.add(&q);
    assert_eq!(result_code(&r), 16);

    assert_eq!(result_code(&Ok(())), 0);
    assert_eq!(Error::from_code(3), Some(Error::NotEnoughData));
}
