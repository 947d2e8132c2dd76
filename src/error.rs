// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Error type shared by the bit channel, the model and the coders.

use std::io;

use thiserror::Error;

use crate::Symbol;

#[derive(Debug, Error)]
pub enum Error {
    /// The compressed stream ended before the EOF symbol was decoded.
    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("model order {0} is out of range")]
    InvalidOrder(i32),

    #[error("escape symbol {escape} is not valid for symbol limit {limit}")]
    InvalidEscape { escape: Symbol, limit: usize },

    #[error("coder precision of {0} bits is not supported")]
    InvalidPrecision(u32),

    #[error("symbol {symbol} is out of range (limit {limit})")]
    SymbolOutOfRange { symbol: Symbol, limit: usize },

    /// A frequency total exceeded what the coder precision can
    /// represent without losing intervals.
    #[error("frequency total {total} exceeds maximum {max}")]
    TotalTooLarge { total: u64, max: u64 },

    #[error("history of {len} symbols is longer than model order {order}")]
    HistoryTooLong { len: usize, order: i32 },

    #[error("symbol {0} has zero frequency")]
    ZeroFrequency(Symbol),

    #[error("flat frequency table cannot be updated")]
    FlatTableUpdate,

    #[error("decoded symbol {0} is not a byte value")]
    InvalidSymbol(Symbol),

    #[error("corrupt input stream")]
    CorruptInput,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
