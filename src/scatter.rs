//! Scattered storage of a small table of equal-length numbers.
//!
//! Each number is cut into pieces of `64 / nr_arrays` bytes. The `i`-th pieces of all numbers
//! share the `i`-th 64-byte cache line, at slots permuted per line by a seed-derived scramble
//! word. Reading a number back touches every slot of every line, so neither the cache lines nor
//! the offsets within them depend on which number is fetched.

extern crate alloc;
use alloc::vec::Vec;

use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore as _, SeedableRng as _};
use tracing::debug;

use super::error::{Error, Result};
use super::limb::{ct_eq_l_l, LimbType, LIMB_BYTES};
use super::zeroizing::Zeroizing;

const CACHE_LINE_SIZE: usize = 64;

/// A table of numbers in scattered layout, see the module documentation.
pub struct ProtMemory {
    scattered: Zeroizing<Vec<u8>>,
    /// One scramble word per cache line.
    scramble: Vec<u16>,
    nr_arrays: usize,
    /// Length of each stored number in bytes.
    array_len: usize,
}

impl ProtMemory {
    /// Slot of the `j`-th number within a cache line scrambled with `s`.
    ///
    /// The multiplier is odd, making this a permutation of `0..nr_arrays` for any `s`.
    fn slot(s: u16, j: usize, nr_arrays: usize) -> usize {
        let s = s as usize;
        ((s & 0xff) + j * ((s >> 8) | 1)) & (nr_arrays - 1)
    }

    fn piece_len(&self) -> usize {
        CACHE_LINE_SIZE / self.nr_arrays
    }

    fn nr_lines(&self) -> usize {
        self.scramble.len()
    }

    /// Store `arrays` in scattered layout.
    ///
    /// # Arguments
    ///
    /// * `arrays` - The numbers to store. Their count must be a power of two between 2 and 64
    ///              and they must all have the same, non-zero length.
    /// * `seed` - Randomizes the slot permutations. Not secret, but should be unpredictable.
    ///
    /// # Errors
    ///
    /// * [`Error::Value`] - bad number of arrays or mismatched lengths.
    /// * [`Error::NotEnoughData`] - the arrays are empty.
    /// * [`Error::Memory`] - allocation failure.
    ///
    pub fn scatter(arrays: &[&[LimbType]], seed: u64) -> Result<Self> {
        let nr_arrays = arrays.len();
        if !(2..=CACHE_LINE_SIZE).contains(&nr_arrays) || !nr_arrays.is_power_of_two() {
            debug!(nr_arrays, "rejecting scatter table size");
            return Err(Error::Value);
        }
        let array_words = arrays[0].len();
        if array_words == 0 {
            return Err(Error::NotEnoughData);
        }
        if arrays.iter().any(|a| a.len() != array_words) {
            debug!("rejecting scatter arrays of different lengths");
            return Err(Error::Value);
        }

        let array_len = array_words * LIMB_BYTES;
        let piece_len = CACHE_LINE_SIZE / nr_arrays;
        let nr_lines = (array_len + piece_len - 1) / piece_len;

        let mut scramble = Vec::new();
        scramble.try_reserve_exact(nr_lines).map_err(|_| Error::Memory)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..nr_lines {
            scramble.push(rng.next_u32() as u16);
        }

        let mut scattered = Vec::new();
        scattered.try_reserve_exact(nr_lines * CACHE_LINE_SIZE).map_err(|_| Error::Memory)?;
        scattered.resize(nr_lines * CACHE_LINE_SIZE, 0u8);
        let mut scattered = Zeroizing::from(scattered);

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(array_len).map_err(|_| Error::Memory)?;
        let mut bytes = Zeroizing::from(bytes);
        for (j, a) in arrays.iter().enumerate() {
            bytes.clear();
            for w in a.iter() {
                bytes.extend_from_slice(&w.to_le_bytes());
            }
            for (i, s) in scramble.iter().enumerate() {
                let src_begin = i * piece_len;
                let src_end = (src_begin + piece_len).min(array_len);
                let dst_begin = i * CACHE_LINE_SIZE + Self::slot(*s, j, nr_arrays) * piece_len;
                scattered[dst_begin..dst_begin + (src_end - src_begin)]
                    .copy_from_slice(&bytes[src_begin..src_end]);
            }
        }

        Ok(Self { scattered, scramble, nr_arrays, array_len })
    }

    /// Number of stored arrays.
    pub fn nr_arrays(&self) -> usize {
        self.nr_arrays
    }

    /// Fetch the `index`-th stored number into `out`.
    ///
    /// Runs in constant time with respect to `index`.
    ///
    /// # Arguments
    ///
    /// * `out` - The destination, as long as the stored numbers.
    /// * `index` - The number to fetch, `< nr_arrays`.
    ///
    pub fn gather(&self, out: &mut [LimbType], index: usize) {
        debug_assert_eq!(out.len() * LIMB_BYTES, self.array_len);
        debug_assert!(index < self.nr_arrays);
        let piece_len = self.piece_len();
        for o in out.iter_mut() {
            *o = 0;
        }

        let mut piece = [0u8; CACHE_LINE_SIZE];
        for i in 0..self.nr_lines() {
            let line = &self.scattered[i * CACHE_LINE_SIZE..(i + 1) * CACHE_LINE_SIZE];
            let wanted = Self::slot(self.scramble[i], index, self.nr_arrays);
            piece[..piece_len].fill(0);
            for k in 0..self.nr_arrays {
                let hit = ct_eq_l_l(k as LimbType, wanted as LimbType);
                let src = &line[k * piece_len..(k + 1) * piece_len];
                for (p, b) in piece[..piece_len].iter_mut().zip(src.iter()) {
                    *p |= hit.select_u8(0, *b);
                }
            }

            let begin = i * piece_len;
            let end = (begin + piece_len).min(self.array_len);
            for (pos, b) in (begin..end).zip(piece.iter()) {
                out[pos / LIMB_BYTES] |= (*b as LimbType) << (8 * (pos % LIMB_BYTES));
            }
        }
        piece.fill(0);
    }
}

#[cfg(test)]
use super::test_helpers::mersenne_mp;

#[test]
fn test_slot_is_permutation() {
    for nr_arrays in [2usize, 4, 8, 16, 32, 64] {
        for s in [0u16, 1, 0xff, 0x100, 0x1234, 0xfffe, 0xffff] {
            let mut seen = vec![false; nr_arrays];
            for j in 0..nr_arrays {
                seen[ProtMemory::slot(s, j, nr_arrays)] = true;
            }
            assert!(seen.iter().all(|s| *s));
        }
    }
}

#[test]
fn test_scatter_gather() {
    for nr_arrays in [2usize, 4, 16, 64] {
        for words in [1usize, 3, 4, 17, 32] {
            let arrays: Vec<Vec<LimbType>> =
                (0..nr_arrays).map(|j| mersenne_mp(words, j as LimbType)).collect();
            let refs: Vec<&[LimbType]> = arrays.iter().map(|a| a.as_slice()).collect();
            for seed in [0u64, 1, 0xdead_beef] {
                let prot = ProtMemory::scatter(&refs, seed).unwrap();
                assert_eq!(prot.nr_arrays(), nr_arrays);
                let mut out = vec![0; words];
                for (j, a) in arrays.iter().enumerate() {
                    prot.gather(&mut out, j);
                    assert_eq!(&out, a);
                }
            }
        }
    }
}

#[test]
fn test_scatter_seed_changes_layout() {
    let arrays: Vec<Vec<LimbType>> = (0..16).map(|j| mersenne_mp(32, j)).collect();
    let refs: Vec<&[LimbType]> = arrays.iter().map(|a| a.as_slice()).collect();
    let p0 = ProtMemory::scatter(&refs, 1).unwrap();
    let p1 = ProtMemory::scatter(&refs, 2).unwrap();
    let p2 = ProtMemory::scatter(&refs, 1).unwrap();
    assert_ne!(*p0.scattered, *p1.scattered);
    assert_eq!(*p0.scattered, *p2.scattered);
}

#[test]
fn test_scatter_errors() {
    let a: [LimbType; 2] = [1, 2];
    let b: [LimbType; 1] = [3];
    let one: [&[LimbType]; 1] = [&a];
    assert_eq!(ProtMemory::scatter(&one, 0).err(), Some(Error::Value));
    let three: [&[LimbType]; 3] = [&a, &a, &a];
    assert_eq!(ProtMemory::scatter(&three, 0).err(), Some(Error::Value));
    let mismatched: [&[LimbType]; 2] = [&a, &b];
    assert_eq!(ProtMemory::scatter(&mismatched, 0).err(), Some(Error::Value));
    let empty: [&[LimbType]; 2] = [&[], &[]];
    assert_eq!(ProtMemory::scatter(&empty, 0).err(), Some(Error::NotEnoughData));
    let many: Vec<&[LimbType]> = (0..128).map(|_| &a[..]).collect();
    assert_eq!(ProtMemory::scatter(&many, 0).err(), Some(Error::Value));
}
