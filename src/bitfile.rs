//! Routines for bitwise input/output.

use std::io;
use std::io::Read;
use std::io::Write;

pub struct BitReader<R> {
    inner: R,
    buf: u8,
    mask: u8,
    exhausted: bool,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` from a `Read` instance.
    pub fn new(inner: R) -> BitReader<R> {
        BitReader {
            inner,
            buf: 0,
            mask: 0,
            exhausted: false,
        }
    }

    /// Read the next bit, most significant bit of each byte first.
    /// Returns `None` once the underlying reader is exhausted, and on
    /// every call after that.
    pub fn read_bit(&mut self) -> io::Result<Option<bool>> {
        if self.mask == 0 {
            if self.exhausted {
                return Ok(None);
            }
            let mut b = [0u8; 1];
            loop {
                match self.inner.read(&mut b[..]) {
                    Ok(0) => {
                        self.exhausted = true;
                        return Ok(None);
                    }
                    Ok(_) => break,
                    Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            }
            self.buf = b[0];
            self.mask = 0x80;
        }
        let result = self.buf & self.mask;
        self.mask >>= 1;
        Ok(Some(result != 0))
    }
}

pub struct BitWriter<W: Write> {
    // Only `None` after `finish` moved the writer out.
    inner: Option<W>,
    buf: u8,
    mask: u8,
}

impl<W: Write> BitWriter<W> {
    /// Create a bit writer from a `Write` instance.
    pub fn new(inner: W) -> BitWriter<W> {
        BitWriter {
            inner: Some(inner),
            buf: 0,
            mask: 0x80,
        }
    }

    /// Write a bit to the underlying `Write` instance.
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.buf |= self.mask;
        }
        self.mask >>= 1;
        if self.mask == 0 {
            let byte = self.buf;
            self.mask = 0x80;
            self.buf = 0;
            if let Some(inner) = self.inner.as_mut() {
                inner.write_all(&[byte])?;
            }
        }
        Ok(())
    }

    /// Write out the partially filled byte, padded with zero bits.
    fn flush_partial(&mut self) -> io::Result<()> {
        if self.mask != 0x80 {
            let byte = self.buf;
            self.mask = 0x80;
            self.buf = 0;
            if let Some(inner) = self.inner.as_mut() {
                inner.write_all(&[byte])?;
            }
        }
        Ok(())
    }

    /// Flush any unwritten bits and the underlying `Write` instance
    /// and return it.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush_partial()?;
        let mut inner = self
            .inner
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "bit writer already finished"))?;
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            // Errors cannot be reported from drop.
            let _ = self.flush_partial();
            if let Some(inner) = self.inner.as_mut() {
                let _ = inner.flush();
            }
        }
    }
}
