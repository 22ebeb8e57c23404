//! Error codes shared with the binding layer.
//!
//! The discriminants are the integer codes handed out to callers across the foreign function
//! boundary and must not be renumbered. Zero is reserved for success and has no variant.

/// Arithmetic and curve operation errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[repr(u32)]
pub enum Error {
    #[error("null argument")]
    Null = 1,
    #[error("memory allocation failed")]
    Memory = 2,
    #[error("not enough data")]
    NotEnoughData = 3,
    #[error("encryption failed")]
    Encrypt = 4,
    #[error("decryption failed")]
    Decrypt = 5,
    #[error("invalid key size")]
    KeySize = 6,
    #[error("invalid nonce size")]
    NonceSize = 7,
    #[error("invalid number of rounds")]
    NrRounds = 8,
    #[error("invalid digest size")]
    DigestSize = 9,
    #[error("maximum data length exceeded")]
    MaxData = 10,
    #[error("maximum offset exceeded")]
    MaxOffset = 11,
    #[error("invalid block size")]
    BlockSize = 12,
    #[error("invalid tag size")]
    TagSize = 13,
    #[error("invalid value")]
    Value = 14,
    #[error("ec: point not on curve")]
    EcPoint = 15,
    #[error("ec: points belong to different curves")]
    EcCurve = 16,
    #[error("invalid modulus or operand length")]
    Modulus = 17,
    #[error("ec: point at infinity")]
    EcPai = 18,
    #[error("unknown error")]
    Unknown = 32,
}

impl Error {
    const ALL: [Error; 19] = [
        Error::Null,
        Error::Memory,
        Error::NotEnoughData,
        Error::Encrypt,
        Error::Decrypt,
        Error::KeySize,
        Error::NonceSize,
        Error::NrRounds,
        Error::DigestSize,
        Error::MaxData,
        Error::MaxOffset,
        Error::BlockSize,
        Error::TagSize,
        Error::Value,
        Error::EcPoint,
        Error::EcCurve,
        Error::Modulus,
        Error::EcPai,
        Error::Unknown,
    ];

    /// The integer code reported to bindings.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Map an integer code back to its variant.
    ///
    /// Returns `None` for the success code `0` and for codes without a variant.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.code() == code)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Collapse a result into the binding layer's integer convention: `0` on success, the error's
/// code otherwise.
pub fn result_code<T>(r: &Result<T>) -> u32 {
    match r {
        Ok(_) => 0,
        Err(e) => e.code(),
    }
}

#[test]
fn test_error_codes() {
    assert_eq!(Error::Null.code(), 1);
    assert_eq!(Error::Memory.code(), 2);
    assert_eq!(Error::NotEnoughData.code(), 3);
    assert_eq!(Error::Value.code(), 14);
    assert_eq!(Error::EcPoint.code(), 15);
    assert_eq!(Error::EcCurve.code(), 16);
    assert_eq!(Error::Modulus.code(), 17);
    assert_eq!(Error::EcPai.code(), 18);
    assert_eq!(Error::Unknown.code(), 32);

    for e in Error::ALL {
        assert_eq!(Error::from_code(e.code()), Some(e));
    }
    assert_eq!(Error::from_code(0), None);
    assert_eq!(Error::from_code(19), None);
    assert_eq!(Error::from_code(31), None);
}

#[test]
fn test_result_code() {
    assert_eq!(result_code(&Ok::<(), Error>(())), 0);
    assert_eq!(result_code(&Err::<(), Error>(Error::EcPai)), 18);
}
