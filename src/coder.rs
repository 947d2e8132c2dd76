// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Arithmetic (range) coder driven by external frequency tables.
//!
//! The encoder and the decoder share the interval arithmetic in
//! `Interval::update`.  They only differ in what happens when a bit
//! is shifted out of the interval (`Rescale::shift`) and when the
//! interval straddles the middle and is expanded without producing a
//! bit (`Rescale::underflow`).
//!
//! The scheme follows Witten, Neal and Cleary, "Arithmetic Coding for
//! Data Compression", CACM 30(6), 1987, with the E3 expansion done by
//! bit manipulation instead of subtraction.

use std::io::{Read, Write};

use crate::bitfile::{BitReader, BitWriter};
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::Symbol;

pub const MIN_PRECISION: u32 = 11;
pub const MAX_PRECISION: u32 = 62;

/// Derived constants for a coder state of `bits` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    bits: u32,
    half_range: u64,
    quarter_range: u64,
    mask: u64,
}

impl Precision {
    pub fn new(bits: u32) -> Result<Precision> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&bits) {
            return Err(Error::InvalidPrecision(bits));
        }
        let full_range = 1u64 << bits;
        let half_range = full_range >> 1;
        Ok(Precision {
            bits,
            half_range,
            quarter_range: half_range >> 1,
            mask: full_range - 1,
        })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Smallest interval width after normalization.
    pub fn min_range(&self) -> u64 {
        self.quarter_range + 2
    }

    /// Largest frequency total that can be coded without collapsing
    /// symbol intervals.
    pub fn max_total(&self) -> u64 {
        self.quarter_range
    }
}

/// What encoder and decoder do while the interval is renormalized.
trait Rescale {
    /// Top bits of `low` and `high` agree and are shifted out.
    fn shift(&mut self, bit: bool) -> Result<()>;

    /// `low` is 01... and `high` is 10...; the second highest bit is
    /// removed from both.
    fn underflow(&mut self) -> Result<()>;
}

#[derive(Debug)]
struct Interval {
    precision: Precision,
    low: u64,
    high: u64,
}

impl Interval {
    fn new(precision: Precision) -> Interval {
        Interval {
            precision,
            low: 0,
            high: precision.mask,
        }
    }

    fn range(&self) -> u64 {
        self.high - self.low + 1
    }

    fn checked_total(&self, table: &FrequencyTable) -> Result<u64> {
        let total = table.total();
        let max = self.precision.max_total();
        if total > max {
            return Err(Error::TotalTooLarge { total, max });
        }
        Ok(total)
    }

    /// Narrow the interval to the sub-interval of `symbol` in `table`
    /// and renormalize.
    fn update<S: Rescale>(&mut self, table: &FrequencyTable, symbol: Symbol, rescale: &mut S) -> Result<()> {
        let total = self.checked_total(table)?;
        let sym_low = table.low(symbol)?;
        let sym_high = table.high(symbol)?;
        if sym_low == sym_high {
            return Err(Error::ZeroFrequency(symbol));
        }

        let p = self.precision;
        let range = self.range() as u128;
        let new_low = self.low + (sym_low as u128 * range / total as u128) as u64;
        let new_high = self.low + (sym_high as u128 * range / total as u128) as u64 - 1;
        self.low = new_low;
        self.high = new_high;

        while (self.low ^ self.high) & p.half_range == 0 {
            rescale.shift(self.low & p.half_range != 0)?;
            self.low = (self.low << 1) & p.mask;
            self.high = ((self.high << 1) & p.mask) | 1;
        }

        while self.low & !self.high & p.quarter_range != 0 {
            rescale.underflow()?;
            self.low = (self.low << 1) ^ p.half_range;
            self.high = ((self.high ^ p.half_range) << 1) | p.half_range | 1;
        }

        debug_assert!(self.low <= self.high);
        debug_assert!(self.high <= p.mask);
        debug_assert!(self.range() >= p.min_range());
        Ok(())
    }
}

struct BitSink<W: Write> {
    output: BitWriter<W>,
    pending: u64,
}

impl<W: Write> Rescale for BitSink<W> {
    fn shift(&mut self, bit: bool) -> Result<()> {
        self.output.write_bit(bit)?;
        while self.pending > 0 {
            self.output.write_bit(!bit)?;
            self.pending -= 1;
        }
        Ok(())
    }

    fn underflow(&mut self) -> Result<()> {
        self.pending += 1;
        Ok(())
    }
}

/// Arithmetic encoder writing to a bit channel.
pub struct Encoder<W: Write> {
    interval: Interval,
    sink: BitSink<W>,
}

impl<W: Write> Encoder<W> {
    pub fn new(precision: Precision, output: W) -> Encoder<W> {
        Encoder {
            interval: Interval::new(precision),
            sink: BitSink {
                output: BitWriter::new(output),
                pending: 0,
            },
        }
    }

    /// Encode `symbol` with the probabilities given by `table`.
    pub fn write(&mut self, table: &FrequencyTable, symbol: Symbol) -> Result<()> {
        self.interval.update(table, symbol, &mut self.sink)
    }

    /// Terminate the code.  A single one bit is enough to select a
    /// value inside the final interval, because the decoder pads the
    /// stream with zero bits.
    pub fn finish(mut self) -> Result<W> {
        self.sink.output.write_bit(true)?;
        Ok(self.sink.output.finish()?)
    }
}

struct CodeRegister<R: Read> {
    input: BitReader<R>,
    precision: Precision,
    code: u64,
    // Mirror of the encoder: bits it had written at this point, and
    // bits it still held back as pending.
    emitted: u64,
    pending: u64,
    // Position of the last one bit read and whether the input is
    // exhausted.
    bits_read: u64,
    last_one: Option<u64>,
    exhausted: bool,
}

impl<R: Read> CodeRegister<R> {
    fn new(input: R, precision: Precision) -> CodeRegister<R> {
        CodeRegister {
            input: BitReader::new(input),
            precision,
            code: 0,
            emitted: 0,
            pending: 0,
            bits_read: 0,
            last_one: None,
            exhausted: false,
        }
    }

    /// Read the next code bit.  Past the end of the input the code
    /// continues with zero bits.
    ///
    /// The last one bit of a valid stream is the bit written by
    /// `Encoder::finish`, so the encoder never emitted more bits than
    /// its position.  Needing more than that means the input was cut
    /// short.  Truncations that happen to end like a valid stream
    /// cannot be detected.
    fn next_bit(&mut self) -> Result<u64> {
        let bit = match self.input.read_bit()? {
            Some(bit) => {
                if bit {
                    self.last_one = Some(self.bits_read);
                }
                self.bits_read += 1;
                bit as u64
            }
            None => {
                self.exhausted = true;
                0
            }
        };
        if self.exhausted && self.last_one.map_or(true, |pos| self.emitted > pos) {
            return Err(Error::UnexpectedEof);
        }
        Ok(bit)
    }
}

impl<R: Read> Rescale for CodeRegister<R> {
    fn shift(&mut self, _bit: bool) -> Result<()> {
        self.emitted += self.pending + 1;
        self.pending = 0;
        let bit = self.next_bit()?;
        self.code = ((self.code << 1) & self.precision.mask) | bit;
        Ok(())
    }

    fn underflow(&mut self) -> Result<()> {
        self.pending += 1;
        let bit = self.next_bit()?;
        let p = self.precision;
        self.code = (self.code & p.half_range) | ((self.code << 1) & (p.mask >> 1)) | bit;
        Ok(())
    }
}

/// Arithmetic decoder reading from a bit channel.
pub struct Decoder<R: Read> {
    interval: Interval,
    register: CodeRegister<R>,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder, reading the first `precision.bits()` bits of
    /// the code.
    pub fn new(precision: Precision, input: R) -> Result<Decoder<R>> {
        let mut register = CodeRegister::new(input, precision);
        for _ in 0..precision.bits() {
            register.code = (register.code << 1) | register.next_bit()?;
        }
        Ok(Decoder {
            interval: Interval::new(precision),
            register,
        })
    }

    /// Decode the next symbol with the probabilities given by `table`.
    ///
    /// Once the input is exhausted, any inconsistency in the code is
    /// reported as `UnexpectedEof`.
    pub fn read(&mut self, table: &FrequencyTable) -> Result<Symbol> {
        self.decode(table).map_err(|e| self.truncated(e))
    }

    /// Whether the decoder has run past the end of its input.
    pub fn is_exhausted(&self) -> bool {
        self.register.exhausted
    }

    /// Check that the stream ends where the encoder finished it.  Call
    /// this after the last symbol; the last one bit read must be the
    /// one written by `Encoder::finish`, with nothing after it.
    pub fn finish(self) -> Result<()> {
        let r = &self.register;
        if r.exhausted && r.last_one == Some(r.emitted) {
            Ok(())
        } else {
            Err(Error::CorruptInput)
        }
    }

    fn decode(&mut self, table: &FrequencyTable) -> Result<Symbol> {
        let total = self.interval.checked_total(table)?;
        let code = self.register.code;
        // Past the end the code is exact.  A valid stream always ends
        // strictly above the low end of the final interval.
        if self.register.exhausted && code == self.interval.low {
            return Err(Error::UnexpectedEof);
        }
        if code < self.interval.low || code > self.interval.high {
            return Err(Error::CorruptInput);
        }
        let range = self.interval.range() as u128;
        let offset = (code - self.interval.low) as u128;
        let value = (((offset + 1) * total as u128 - 1) / range) as u64;
        debug_assert!(value < total);

        // Find the symbol with low(symbol) <= value < high(symbol).
        let mut start = 0;
        let mut end = table.symbol_limit();
        while end - start > 1 {
            let middle = (start + end) >> 1;
            if table.low(middle)? > value {
                end = middle;
            } else {
                start = middle;
            }
        }

        self.interval.update(table, start, &mut self.register)?;
        Ok(start)
    }

    fn truncated(&self, err: Error) -> Error {
        match err {
            Error::TotalTooLarge { .. } | Error::ZeroFrequency(_) | Error::CorruptInput
                if self.register.exhausted =>
            {
                Error::UnexpectedEof
            }
            err => err,
        }
    }
}
