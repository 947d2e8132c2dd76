// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! PPM compressor: a context model of configurable order driving an
//! arithmetic coder.
//!
//! Each symbol is coded in the longest context that has seen it.
//! Starting with the context of the full history, the coder emits an
//! escape symbol for every context in which the symbol has not been
//! seen yet and falls back to the next shorter context.  The order -1
//! table, in which all symbols are equally likely, ends the search.
//! End of input is coded as symbol 256, which in context tables
//! stands for the escape, so it always ends up in the order -1 table.

use std::io::{Read, Write};

use tracing::debug;

use crate::coder;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{History, PpmModel};
use crate::Symbol;

/// Counters collected while compressing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Symbols coded, including EOF.
    pub symbols: u64,
    /// Escape symbols coded.
    pub escapes: u64,
    /// Contexts allocated by the model.
    pub contexts: usize,
}

/// PPM encoder.  An encoder can only be used to compress one data
/// stream.
pub struct Encoder {
    config: Config,
    precision: coder::Precision,
    model: PpmModel,
    history: History,
}

impl Encoder {
    pub fn new(config: Config) -> Result<Encoder> {
        let precision = config.validate()?;
        Ok(Encoder {
            config,
            precision,
            model: PpmModel::new(&config)?,
            history: History::new(config.history_len()),
        })
    }

    fn encode_symbol<W: Write>(&self, enc: &mut coder::Encoder<W>, symbol: Symbol, stats: &mut Stats) -> Result<()> {
        let escape = self.model.escape_symbol();
        for order in (0..=self.history.len()).rev() {
            let ctx = match self.model.context(self.history.iter().take(order)) {
                Some(ctx) => ctx,
                None => continue,
            };
            if symbol != escape && ctx.frequencies.get(symbol)? > 0 {
                return enc.write(&ctx.frequencies, symbol);
            }
            enc.write(&ctx.frequencies, escape)?;
            stats.escapes += 1;
        }
        enc.write(self.model.order_minus1(), symbol)
    }

    fn update(&mut self, symbol: Symbol) -> Result<()> {
        self.model.increment_contexts(&self.history, symbol)?;
        self.history.push(symbol);
        Ok(())
    }

    /// Compress all the data from reader `input` and write the
    /// compressed data to the writer `output`.
    pub fn compress<R: Read, W: Write>(self, input: R, output: W) -> Result<W> {
        self.compress_with_stats(input, output).map(|(w, _)| w)
    }

    /// Like `compress`, but also return counters about the run.
    pub fn compress_with_stats<R: Read, W: Write>(mut self, input: R, output: W) -> Result<(W, Stats)> {
        debug!(order = self.config.order, precision = self.precision.bits(), "compressing");
        let mut enc = coder::Encoder::new(self.precision, output);
        let mut stats = Stats::default();

        for byte in input.bytes() {
            let symbol = byte? as Symbol;
            self.encode_symbol(&mut enc, symbol, &mut stats)?;
            self.update(symbol)?;
            stats.symbols += 1;
        }
        let eof = self.model.escape_symbol();
        self.encode_symbol(&mut enc, eof, &mut stats)?;
        self.update(eof)?;
        stats.symbols += 1;

        let output = enc.finish()?;
        stats.contexts = self.model.context_count();
        debug!(symbols = stats.symbols, escapes = stats.escapes, contexts = stats.contexts, "compressed");
        Ok((output, stats))
    }
}

/// PPM decoder.  A decoder can only be used to decompress one data
/// stream.
pub struct Decoder {
    config: Config,
    precision: coder::Precision,
    model: PpmModel,
    history: History,
}

impl Decoder {
    pub fn new(config: Config) -> Result<Decoder> {
        let precision = config.validate()?;
        Ok(Decoder {
            config,
            precision,
            model: PpmModel::new(&config)?,
            history: History::new(config.history_len()),
        })
    }

    fn decode_symbol<R: Read>(&self, dec: &mut coder::Decoder<R>) -> Result<Symbol> {
        let escape = self.model.escape_symbol();
        for order in (0..=self.history.len()).rev() {
            let ctx = match self.model.context(self.history.iter().take(order)) {
                Some(ctx) => ctx,
                None => continue,
            };
            let symbol = dec.read(&ctx.frequencies)?;
            if symbol != escape {
                return Ok(symbol);
            }
        }
        dec.read(self.model.order_minus1())
    }

    /// Decompress all data from the reader `input`, writing the
    /// decompressed data to the writer `output`.
    pub fn decompress<R: Read, W: Write>(mut self, input: R, mut output: W) -> Result<W> {
        debug!(order = self.config.order, precision = self.precision.bits(), "decompressing");
        let mut dec = coder::Decoder::new(self.precision, input)?;
        let eof = self.model.escape_symbol();
        let mut symbols: u64 = 0;

        loop {
            let symbol = self.decode_symbol(&mut dec)?;
            self.model.increment_contexts(&self.history, symbol)?;
            self.history.push(symbol);
            symbols += 1;
            if symbol == eof {
                break;
            }
            if symbol > 0xff {
                return Err(if dec.is_exhausted() {
                    Error::UnexpectedEof
                } else {
                    Error::InvalidSymbol(symbol)
                });
            }
            output.write_all(&[symbol as u8])?;
        }

        dec.finish()?;
        output.flush()?;
        debug!(symbols, contexts = self.model.context_count(), "decompressed");
        Ok(output)
    }
}

/// Compress all data from `input` with the default configuration and
/// write the compressed stream to `output`.  On success, the output
/// is returned.
pub fn compress<R: Read, W: Write>(input: R, output: W) -> Result<W> {
    Encoder::new(Config::default())?.compress(input, output)
}

/// Decompress all data from `input` with the default configuration
/// and write the decompressed stream to `output`.  On success, the
/// output is returned.
pub fn decompress<R: Read, W: Write>(input: R, output: W) -> Result<W> {
    Decoder::new(Config::default())?.decompress(input, output)
}
