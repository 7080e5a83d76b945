// SPDX-License-Identifier: CC0-1.0

//! Thresholds
//!
//! A `k`-of-`n` collection used by `thresh`, `multi` and `sortedmulti`.

use core::{fmt, iter};

/// Error constructing a threshold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThresholdError {
    k: usize,
    n: usize,
    max: Option<usize>,
}

impl fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.n == 0 {
            f.write_str("thresholds must be nonempty")
        } else if self.k == 0 {
            f.write_str("thresholds must have k > 0")
        } else if self.k > self.n {
            write!(f, "invalid threshold {}-of-{}; cannot have k > n", self.k, self.n)
        } else {
            match self.max {
                Some(max) => {
                    write!(f, "invalid threshold {}-of-{}; maximum size is {}", self.k, self.n, max)
                }
                None => write!(f, "invalid threshold {}-of-{}", self.k, self.n),
            }
        }
    }
}

impl std::error::Error for ThresholdError {}

/// A `k`-of-`n` threshold over some arbitrary `T`.
///
/// A nonzero `MAX` caps `n`; exceeding it is an error on construction.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold<T, const MAX: usize> {
    k: usize,
    inner: Vec<T>,
}

impl<T, const MAX: usize> Threshold<T, MAX> {
    /// Constructs a threshold directly from a threshold value and collection.
    pub fn new(k: usize, inner: Vec<T>) -> Result<Self, ThresholdError> {
        if k == 0 || k > inner.len() || (MAX > 0 && inner.len() > MAX) {
            Err(ThresholdError { k, n: inner.len(), max: if MAX > 0 { Some(MAX) } else { None } })
        } else {
            Ok(Threshold { k, inner })
        }
    }

    /// The number of elements.
    pub fn n(&self) -> usize { self.inner.len() }

    /// The threshold value.
    pub const fn k(&self) -> usize { self.k }

    /// The underlying elements.
    pub fn data(&self) -> &[T] { &self.inner }

    /// Iterator over the elements.
    pub fn iter(&self) -> core::slice::Iter<T> { self.inner.iter() }
}

impl<'a, T, const MAX: usize> iter::IntoIterator for &'a Threshold<T, MAX> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter { self.inner.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction() {
        assert!(Threshold::<u8, 0>::new(0, vec![1]).is_err());
        assert!(Threshold::<u8, 0>::new(2, vec![1]).is_err());
        assert!(Threshold::<u8, 0>::new(1, vec![]).is_err());
        assert!(Threshold::<u8, 2>::new(1, vec![1, 2, 3]).is_err());
        let thresh = Threshold::<u8, 3>::new(2, vec![1, 2, 3]).unwrap();
        assert_eq!(thresh.k(), 2);
        assert_eq!(thresh.n(), 3);
        assert_eq!(thresh.data(), &[1, 2, 3]);
    }

    #[test]
    fn error_messages() {
        let err = Threshold::<u8, 2>::new(1, vec![1, 2, 3]).unwrap_err();
        assert_eq!(err.to_string(), "invalid threshold 1-of-3; maximum size is 2");
        let err = Threshold::<u8, 0>::new(3, vec![1, 2]).unwrap_err();
        assert_eq!(err.to_string(), "invalid threshold 3-of-2; cannot have k > n");
    }
}
