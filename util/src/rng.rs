use std::{fmt, hash::Hash, hash::Hasher, str::FromStr};

use anyhow::bail;
use derive_more::Deref;
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Construct a throwaway random number generator seeded by a noise value.
///
/// Good for short-term use in immutable contexts given a varying source of
/// noise like map position coordinates.
pub fn srng(seed: &(impl Hash + ?Sized)) -> XorShiftRng {
    let mut h = crate::FastHasher::default();
    seed.hash(&mut h);
    XorShiftRng::seed_from_u64(h.finish())
}

/// Strings that are normalized to be case, whitespace and punctuation
/// insensitive. Use as RNG seeds so that trivial transcription errors like an
/// added space can't mess up the seed.
///
/// ```
/// # use util::{Logos, srng};
/// use rand::prelude::*;
///
/// assert_ne!(
///   srng("pAss Word").gen_range(0..1000),
///   srng("password").gen_range(0..1000));
///
/// assert_eq!(
///   srng(&Logos::new("pAss Word")).gen_range(0..1000),
///   srng(&Logos::new("password")).gen_range(0..1000));
/// ```
#[derive(
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    Deref,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Logos(String);

impl fmt::Display for Logos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromIterator<char> for Logos {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        const MAX_LEN: usize = 64;

        Logos(
            iter.into_iter()
                .map(|c| c.to_ascii_uppercase())
                .filter(char::is_ascii_alphanumeric)
                .take(MAX_LEN)
                .collect(),
        )
    }
}

impl Logos {
    /// Construct a new logos, stripping out punctuation, whitespace,
    /// character case and non-ASCII characters from the input.
    pub fn new(s: impl AsRef<str>) -> Self {
        s.as_ref().chars().collect()
    }

    /// Generate a random logos of `len` characters.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Logos {
        const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

impl FromStr for Logos {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            bail!("not a valid logos")
        } else {
            Ok(Logos(s.into()))
        }
    }
}

pub trait RngExt {
    fn one_chance_in(&mut self, n: usize) -> bool;

    /// Bernoulli trial that tolerates probabilities outside `[0, 1]`.
    fn chance(&mut self, p: f64) -> bool;
}

impl<T: Rng + ?Sized> RngExt for T {
    fn one_chance_in(&mut self, n: usize) -> bool {
        if n == 0 {
            return false;
        }
        self.gen_range(0..n) == 0
    }

    fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.gen_bool(p)
        }
    }
}

/// Discrete distribution over a fixed set of values, sampled through a
/// cumulative weight table.
///
/// ```
/// # use util::WeightedTable;
/// let table = WeightedTable::new([('a', 1.0), ('b', 3.0)]);
/// assert_eq!(table.plot(0.0), Some(&'a'));
/// assert_eq!(table.plot(0.24), Some(&'a'));
/// assert_eq!(table.plot(0.26), Some(&'b'));
/// assert_eq!(table.plot(1.0), Some(&'b'));
/// ```
#[derive(Clone, Debug)]
pub struct WeightedTable<T> {
    items: Vec<T>,
    /// Running sums of the weights, last element is the total.
    cumulative: Vec<f64>,
}

impl<T> WeightedTable<T> {
    /// Build a table, entries with non-positive weight are dropped.
    pub fn new(entries: impl IntoIterator<Item = (T, f64)>) -> Self {
        let mut items = Vec::new();
        let mut cumulative = Vec::new();
        let mut sum = 0.0;
        for (item, w) in entries {
            if w > 0.0 {
                sum += w;
                items.push(item);
                cumulative.push(sum);
            }
        }
        WeightedTable { items, cumulative }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Map a point in `[0, 1]` to the item whose cumulative band covers it.
    pub fn plot(&self, x: f64) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        let target = x.clamp(0.0, 1.0) * self.total();
        let i = self.cumulative.partition_point(|&c| c < target);
        self.items.get(i.min(self.items.len() - 1))
    }

    /// Index of the item a point in `[0, 1]` lands on.
    pub fn plot_index(&self, x: f64) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let target = x.clamp(0.0, 1.0) * self.total();
        Some(
            self.cumulative
                .partition_point(|&c| c < target)
                .min(self.items.len() - 1),
        )
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Draw a random item, `None` if the table is empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T>
    where
        T: Clone,
    {
        self.plot(rng.gen_range(0.0..=1.0)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logos_normalization() {
        assert_eq!(Logos::new("pAss Word!"), Logos::new("PASSWORD"));
        assert!("abc".parse::<Logos>().is_err());
        assert_eq!("ABC123".parse::<Logos>().unwrap(), Logos::new("abc 123"));
    }

    #[test]
    fn weighted_table_bands() {
        let table = WeightedTable::new([(0, 2.0), (1, 0.0), (2, 2.0)]);
        assert_eq!(table.items(), &[0, 2]);
        assert_eq!(table.total(), 4.0);
        assert_eq!(table.plot(0.1), Some(&0));
        assert_eq!(table.plot(0.9), Some(&2));
        assert_eq!(table.plot_index(0.5), Some(0));
        assert!(WeightedTable::<u8>::new([]).plot(0.5).is_none());
        assert_eq!(WeightedTable::<u8>::new([]).sample(&mut srng(&0)), None);
    }

    #[test]
    fn weighted_table_frequencies() {
        let table = WeightedTable::new([('a', 1.0), ('b', 3.0)]);
        let mut rng = srng(&"frequencies");
        let n = 20_000;
        let bs = (0..n)
            .filter(|_| table.sample(&mut rng) == Some('b'))
            .count();
        let freq = bs as f64 / n as f64;
        assert!((freq - 0.75).abs() < 0.02, "observed {freq}");
    }

    #[test]
    fn chance_edges() {
        let mut rng = srng(&1);
        assert!(!rng.chance(0.0));
        assert!(!rng.chance(-3.0));
        assert!(rng.chance(1.0));
        assert!(rng.chance(7.0));
        assert!(!rng.one_chance_in(0));
    }
}
