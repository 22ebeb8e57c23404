//! Wiping of secret-holding buffers on drop.
//!
//! With the `zeroize` feature, [`Zeroizing`] is the `zeroize` crate's wrapper. Without it, a
//! transparent stand-in with the same construction and dereferencing interface is provided so
//! that the rest of the crate doesn't need to care.

#[cfg(feature = "zeroize")]
pub use zeroize::Zeroizing;

#[cfg(not(feature = "zeroize"))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Zeroizing<T>(T);

#[cfg(not(feature = "zeroize"))]
impl<T> Zeroizing<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }
}

#[cfg(not(feature = "zeroize"))]
impl<T> From<T> for Zeroizing<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

#[cfg(not(feature = "zeroize"))]
impl<T> core::ops::Deref for Zeroizing<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

#[cfg(not(feature = "zeroize"))]
impl<T> core::ops::DerefMut for Zeroizing<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

#[test]
fn test_zeroizing_deref() {
    let mut v = Zeroizing::new(vec![1u64, 2, 3]);
    v[1] = 5;
    assert_eq!(v.as_slice(), &[1, 5, 3]);
}
