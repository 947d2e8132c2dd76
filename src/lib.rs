// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! PPM compression with an adaptive arithmetic coder.
//!
//! ```
//! use std::io::Cursor;
//!
//! let compressed = ppmac::compress(Cursor::new(&b"AAAABBBCCD"[..]), vec![]).unwrap();
//! let original = ppmac::decompress(Cursor::new(&compressed[..]), vec![]).unwrap();
//! assert_eq!(&b"AAAABBBCCD"[..], &original[..]);
//! ```

pub mod error;
pub mod bitfile;

pub mod config;
pub mod frequency;
pub mod model;
pub mod coder;
pub mod ppm;

/// Byte values are symbols 0 to 255; larger values are reserved for
/// escape and end of stream.
pub type Symbol = usize;

pub use config::Config;
pub use error::{Error, Result};
pub use ppm::{compress, decompress, Decoder, Encoder, Stats};
