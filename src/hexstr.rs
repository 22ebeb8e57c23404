//! Hexadecimal literals for curve constants and test vectors.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HexStrError {
    InvalidLength,
    InvalidChar,
}

const fn nibble_from_hexchar(c: u8) -> Result<u8, HexStrError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 0xa),
        b'A'..=b'F' => Ok(c - b'A' + 0xa),
        _ => Err(HexStrError::InvalidChar),
    }
}

/// Parse a hex string of exactly `2 * N` digits into `N` bytes, in the order written.
pub const fn bytes_from_hexstr<const N: usize>(hexstr: &str) -> Result<[u8; N], HexStrError> {
    let hexstr = hexstr.as_bytes();
    if hexstr.len() != 2 * N {
        return Err(HexStrError::InvalidLength);
    }

    let mut result = [0u8; N];
    let mut i = 0;
    while i < N {
        let hi = match nibble_from_hexchar(hexstr[2 * i]) {
            Ok(v) => v,
            Err(e) => return Err(e),
        };
        let lo = match nibble_from_hexchar(hexstr[2 * i + 1]) {
            Ok(v) => v,
            Err(e) => return Err(e),
        };
        result[i] = hi << 4 | lo;
        i += 1;
    }
    Ok(result)
}

/// Like [`bytes_from_hexstr()`], but for const contexts, where a malformed literal fails the
/// build.
pub const fn bytes_from_hexstr_cnst<const N: usize>(hexstr: &str) -> [u8; N] {
    match bytes_from_hexstr::<N>(hexstr) {
        Ok(result) => result,
        Err(_) => panic!("invalid hex string"),
    }
}

#[test]
fn test_bytes_from_hexstr() {
    assert_eq!(
        bytes_from_hexstr::<11>("0123456789abcdefABCDEF").unwrap(),
        [0x01u8, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0xab, 0xcd, 0xef],
    );
    assert_eq!(bytes_from_hexstr::<11>("123456789abcdefABCDEF"), Err(HexStrError::InvalidLength));
    assert_eq!(bytes_from_hexstr::<2>("01g3"), Err(HexStrError::InvalidChar));
    assert_eq!(bytes_from_hexstr::<0>(""), Ok([]));

    const C: [u8; 3] = bytes_from_hexstr_cnst::<3>("ff00a5");
    assert_eq!(C, [0xff, 0x00, 0xa5]);
}

