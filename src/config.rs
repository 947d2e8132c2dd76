// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Model and coder parameters.
//!
//! None of these are stored in the compressed stream.  The encoder
//! and the decoder must be given identical configurations, otherwise
//! decoding silently produces garbage.

use crate::coder::Precision;
use crate::error::{Error, Result};
use crate::Symbol;

/// Highest supported context order.
pub const MAX_ORDER: i32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Context order.  -1 disables the context model, 0 uses only
    /// the order-0 context.
    pub order: i32,
    /// Number of symbols, including the escape/EOF symbol.
    pub symbol_limit: usize,
    /// Symbol used as escape in context tables and as EOF in the
    /// order -1 table.
    pub escape_symbol: Symbol,
    /// Number of bits in the coder state.
    pub precision: u32,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            order: 3,
            symbol_limit: 257,
            escape_symbol: 256,
            precision: 32,
        }
    }
}

impl Config {
    pub fn with_order(order: i32) -> Config {
        Config {
            order,
            ..Config::default()
        }
    }

    /// Check that the parameters describe a usable model.  On success
    /// the coder precision derived from the configuration is returned.
    pub fn validate(&self) -> Result<Precision> {
        if self.order < -1 || self.order > MAX_ORDER {
            return Err(Error::InvalidOrder(self.order));
        }
        if self.escape_symbol < 256 || self.escape_symbol >= self.symbol_limit {
            return Err(Error::InvalidEscape {
                escape: self.escape_symbol,
                limit: self.symbol_limit,
            });
        }
        let precision = Precision::new(self.precision)?;
        // The order -1 table has total `symbol_limit` and must always
        // be codable.
        if self.symbol_limit as u64 > precision.max_total() {
            return Err(Error::TotalTooLarge {
                total: self.symbol_limit as u64,
                max: precision.max_total(),
            });
        }
        Ok(precision)
    }

    /// Number of history symbols kept by the driver.
    pub fn history_len(&self) -> usize {
        if self.order > 0 {
            self.order as usize
        } else {
            0
        }
    }
}

#[cfg(test)]
mod test {
    use super::Config;
    use crate::error::Error;

    #[test]
    fn default_is_valid() {
        let p = Config::default().validate().unwrap();
        assert_eq!(32, p.bits());
    }

    #[test]
    fn orders() {
        assert!(Config::with_order(-1).validate().is_ok());
        assert!(Config::with_order(0).validate().is_ok());
        assert!(Config::with_order(16).validate().is_ok());
        match Config::with_order(-2).validate() {
            Err(Error::InvalidOrder(-2)) => {}
            r => panic!("unexpected result {:?}", r),
        }
        assert!(Config::with_order(17).validate().is_err());
    }

    #[test]
    fn escape_must_not_be_a_byte() {
        let c = Config {
            escape_symbol: 255,
            ..Config::default()
        };
        assert!(c.validate().is_err());
        let c = Config {
            escape_symbol: 257,
            ..Config::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn flat_table_must_fit_precision() {
        let c = Config {
            precision: 11,
            ..Config::default()
        };
        assert!(c.validate().is_ok());
        let c = Config {
            precision: 11,
            symbol_limit: 600,
            ..Config::default()
        };
        match c.validate() {
            Err(Error::TotalTooLarge { total: 600, max: 512 }) => {}
            r => panic!("unexpected result {:?}", r),
        }
        let c = Config {
            precision: 10,
            ..Config::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn history_len() {
        assert_eq!(0, Config::with_order(-1).history_len());
        assert_eq!(0, Config::with_order(0).history_len());
        assert_eq!(5, Config::with_order(5).history_len());
    }
}
