use montec::hexstr::bytes_from_hexstr_cnst;
use montec::{monty_multiply, monty_pow, result_code, Error, MontContext};

/// The 2048 bit MODP group prime of RFC 3526.
const MODP_2048: &str = "ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e088a67cc74020bbea63b139b22514a08798e3404dd\
                         ef9519b3cd3a431b302b0a6df25f14374fe1356d6d51c245e485b576625e7ec6f44c42e9a637ed6b0bff5cb6f406b7ed\
                         ee386bfb5a899fa5ae9f24117c4b1fe649286651ece45b3dc2007cb8a163bf0598da48361c55d39a69163fa8fd24cf5f\
                         83655d23dca3ad961c62f356208552bb9ed529077096966d670c354e4abc9804f1746c08ca18217c32905e462e36ce3b\
                         e39e772c180e86039b2783a2ec07a28fb5c55df06f4c52c9de2bcbf6955817183995497cea956ae515d2261898fa0510\
                         15728e5a8aacaa68ffffffffffffffff";

#[test]
fn diffie_hellman_modp_2048() {
    let p = bytes_from_hexstr_cnst::<256>(MODP_2048).to_vec();
    assert_eq!(p.len(), 256);
    let mut g = vec![0u8; 256];
    g[255] = 2;

    let mut a = vec![0u8; 256];
    let mut b = vec![0u8; 256];
    for i in 0..32 {
        a[224 + i] = (i as u8).wrapping_mul(37).wrapping_add(11);
        b[224 + i] = (i as u8).wrapping_mul(91).wrapping_add(3);
    }

    let mut pub_a = vec![0u8; 256];
    let mut pub_b = vec![0u8; 256];
    monty_pow(&mut pub_a, &g, &a, &p, 1).unwrap();
    monty_pow(&mut pub_b, &g, &b, &p, 2).unwrap();

    let mut shared_a = vec![0u8; 256];
    let mut shared_b = vec![0u8; 256];
    monty_pow(&mut shared_a, &pub_b, &a, &p, 3).unwrap();
    monty_pow(&mut shared_b, &pub_a, &b, &p, 4).unwrap();
    assert_eq!(shared_a, shared_b);
    assert_ne!(shared_a, g);
}

#[test]
fn fermat_little_theorem() {
    // a^(p-1) == 1 mod p
    let p = bytes_from_hexstr_cnst::<256>(MODP_2048).to_vec();
    let mut p_minus_1 = p.clone();
    p_minus_1[255] -= 1;
    let mut base = vec![0u8; 256];
    base[200] = 0x42;
    base[255] = 0x17;
    let mut out = vec![0u8; 256];
    monty_pow(&mut out, &base, &p_minus_1, &p, 0).unwrap();
    let mut one = vec![0u8; 256];
    one[255] = 1;
    assert_eq!(out, one);
}

#[test]
fn multiply_and_context_round_trip() {
    let p = bytes_from_hexstr_cnst::<256>(MODP_2048).to_vec();
    let ctx = MontContext::new(&p).unwrap();
    let mut x = vec![0u8; 256];
    x[100] = 0xab;
    x[255] = 0xcd;
    let xm = ctx.from_bytes(&x).unwrap();
    let mut back = vec![0u8; 256];
    ctx.to_bytes(&mut back, &xm).unwrap();
    assert_eq!(back, x);

    // x * 1 == x
    let mut one = vec![0u8; 256];
    one[255] = 1;
    let mut out = vec![0u8; 256];
    monty_multiply(&mut out, &x, &one, &p).unwrap();
    assert_eq!(out, x);
}

#[test]
fn error_codes() {
    let r = monty_pow(&mut [], &[], &[], &[], 0);
    assert_eq!(r, Err(Error::NotEnoughData));
    assert_eq!(result_code(&r), 3);

    let mut out = [0u8; 2];
    let r = monty_pow(&mut out, &[0, 1], &[0, 1], &[0, 4], 0);
    assert_eq!(r, Err(Error::Value));
    assert_eq!(result_code(&r), 14);

    assert_eq!(MontContext::new(&[0x01]).err(), Some(Error::Value));
}
