// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Symbol frequency tables for the arithmetic coder.
//!
//! A table maps each symbol in `0..symbol_limit` to a count and
//! answers cumulative queries: `low(s)` is the sum of the counts of
//! all symbols below `s`, `high(s)` is `low(s) + get(s)`.  The coder
//! assigns symbol `s` the interval `[low(s), high(s))` out of
//! `[0, total)`.

use std::cell::OnceCell;

use crate::error::{Error, Result};
use crate::Symbol;

/// Frequency table with per-symbol counts that adapt to the input.
#[derive(Debug, Clone)]
pub struct AdaptiveFrequencies {
    counts: Vec<u64>,
    total: u64,
    // Rebuilt on the first query after a mutation.
    cumulative: OnceCell<Vec<u64>>,
}

impl AdaptiveFrequencies {
    /// Create a table for `symbol_limit` symbols, all with count zero.
    pub fn new(symbol_limit: usize) -> AdaptiveFrequencies {
        AdaptiveFrequencies::from_counts(vec![0; symbol_limit])
    }

    /// Create a table from explicit per-symbol counts.
    pub fn from_counts(counts: Vec<u64>) -> AdaptiveFrequencies {
        let total = counts.iter().sum();
        AdaptiveFrequencies {
            counts,
            total,
            cumulative: OnceCell::new(),
        }
    }

    fn cumulative(&self) -> &[u64] {
        self.cumulative.get_or_init(|| {
            let mut cumul = Vec::with_capacity(self.counts.len() + 1);
            let mut sum = 0;
            cumul.push(0);
            for &c in &self.counts {
                sum += c;
                cumul.push(sum);
            }
            debug_assert_eq!(sum, self.total);
            cumul
        })
    }

    fn increment(&mut self, symbol: Symbol) {
        self.counts[symbol] += 1;
        self.total += 1;
        self.cumulative.take();
    }

    fn set(&mut self, symbol: Symbol, count: u64) {
        self.total = self.total - self.counts[symbol] + count;
        self.counts[symbol] = count;
        self.cumulative.take();
    }
}

/// Frequency table in which every symbol has count one.  Used as the
/// order -1 fallback, so that every symbol can always be coded.
#[derive(Debug, Clone, Copy)]
pub struct FlatFrequencies {
    symbol_limit: usize,
}

impl FlatFrequencies {
    pub fn new(symbol_limit: usize) -> FlatFrequencies {
        FlatFrequencies { symbol_limit }
    }
}

#[derive(Debug, Clone)]
pub enum FrequencyTable {
    Adaptive(AdaptiveFrequencies),
    Flat(FlatFrequencies),
}

impl FrequencyTable {
    /// Adaptive table over `symbol_limit` symbols, all counts zero.
    pub fn adaptive(symbol_limit: usize) -> FrequencyTable {
        FrequencyTable::Adaptive(AdaptiveFrequencies::new(symbol_limit))
    }

    pub fn flat(symbol_limit: usize) -> FrequencyTable {
        FrequencyTable::Flat(FlatFrequencies::new(symbol_limit))
    }

    /// Number of symbols in this table.
    pub fn symbol_limit(&self) -> usize {
        match *self {
            FrequencyTable::Adaptive(ref t) => t.counts.len(),
            FrequencyTable::Flat(ref t) => t.symbol_limit,
        }
    }

    /// Sum of all symbol counts.
    pub fn total(&self) -> u64 {
        match *self {
            FrequencyTable::Adaptive(ref t) => t.total,
            FrequencyTable::Flat(ref t) => t.symbol_limit as u64,
        }
    }

    fn check(&self, symbol: Symbol) -> Result<()> {
        let limit = self.symbol_limit();
        if symbol < limit {
            Ok(())
        } else {
            Err(Error::SymbolOutOfRange { symbol, limit })
        }
    }

    pub fn get(&self, symbol: Symbol) -> Result<u64> {
        self.check(symbol)?;
        Ok(match *self {
            FrequencyTable::Adaptive(ref t) => t.counts[symbol],
            FrequencyTable::Flat(_) => 1,
        })
    }

    /// Sum of the counts of all symbols below `symbol`.
    pub fn low(&self, symbol: Symbol) -> Result<u64> {
        self.check(symbol)?;
        Ok(match *self {
            FrequencyTable::Adaptive(ref t) => t.cumulative()[symbol],
            FrequencyTable::Flat(_) => symbol as u64,
        })
    }

    /// Sum of the counts of all symbols up to and including `symbol`.
    pub fn high(&self, symbol: Symbol) -> Result<u64> {
        self.check(symbol)?;
        Ok(match *self {
            FrequencyTable::Adaptive(ref t) => t.cumulative()[symbol + 1],
            FrequencyTable::Flat(_) => symbol as u64 + 1,
        })
    }

    pub fn increment(&mut self, symbol: Symbol) -> Result<()> {
        self.check(symbol)?;
        match *self {
            FrequencyTable::Adaptive(ref mut t) => {
                t.increment(symbol);
                Ok(())
            }
            FrequencyTable::Flat(_) => Err(Error::FlatTableUpdate),
        }
    }

    pub fn set(&mut self, symbol: Symbol, count: u64) -> Result<()> {
        self.check(symbol)?;
        match *self {
            FrequencyTable::Adaptive(ref mut t) => {
                t.set(symbol, count);
                Ok(())
            }
            FrequencyTable::Flat(_) => Err(Error::FlatTableUpdate),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{AdaptiveFrequencies, FrequencyTable};
    use crate::error::Error;

    #[test]
    fn adaptive_cumulative() {
        let mut t = FrequencyTable::adaptive(5);
        t.increment(1).unwrap();
        t.increment(1).unwrap();
        t.increment(3).unwrap();
        assert_eq!(3, t.total());
        assert_eq!(0, t.low(0).unwrap());
        assert_eq!(0, t.high(0).unwrap());
        assert_eq!(0, t.low(1).unwrap());
        assert_eq!(2, t.high(1).unwrap());
        assert_eq!(2, t.low(3).unwrap());
        assert_eq!(3, t.high(3).unwrap());
        assert_eq!(3, t.high(4).unwrap());
    }

    #[test]
    fn cumulative_rebuilt_after_mutation() {
        let mut t = FrequencyTable::adaptive(4);
        t.increment(2).unwrap();
        assert_eq!(1, t.high(2).unwrap());
        t.increment(0).unwrap();
        assert_eq!(1, t.low(2).unwrap());
        assert_eq!(2, t.high(2).unwrap());
        t.set(0, 10).unwrap();
        assert_eq!(10, t.low(2).unwrap());
        assert_eq!(11, t.total());
        t.set(0, 0).unwrap();
        assert_eq!(0, t.low(2).unwrap());
        assert_eq!(1, t.total());
    }

    #[test]
    fn from_counts() {
        let t = FrequencyTable::Adaptive(AdaptiveFrequencies::from_counts(vec![3, 0, 4]));
        assert_eq!(7, t.total());
        assert_eq!(3, t.low(1).unwrap());
        assert_eq!(3, t.high(1).unwrap());
        assert_eq!(7, t.high(2).unwrap());
    }

    #[test]
    fn flat() {
        let t = FrequencyTable::flat(257);
        assert_eq!(257, t.total());
        assert_eq!(1, t.get(100).unwrap());
        assert_eq!(100, t.low(100).unwrap());
        assert_eq!(101, t.high(100).unwrap());
        assert_eq!(257, t.high(256).unwrap());
    }

    #[test]
    fn flat_is_immutable() {
        let mut t = FrequencyTable::flat(257);
        match t.increment(3) {
            Err(Error::FlatTableUpdate) => {}
            r => panic!("unexpected result {:?}", r),
        }
    }

    #[test]
    fn out_of_range() {
        let mut t = FrequencyTable::adaptive(257);
        match t.get(257) {
            Err(Error::SymbolOutOfRange { symbol: 257, limit: 257 }) => {}
            r => panic!("unexpected result {:?}", r),
        }
        assert!(t.low(300).is_err());
        assert!(t.increment(257).is_err());
        assert!(FrequencyTable::flat(10).high(10).is_err());
    }
}
