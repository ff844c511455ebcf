//! Byte sources and sinks.
//!
//! The codec only needs "read exactly N bytes" and "write these bytes". Any
//! buffering, flushing or connection policy belongs to whatever sits behind
//! these traits.

use crate::error::ProtocolError;
use bytes::{Buf, Bytes, BytesMut};
use std::io::{Read, Write};

/// A source of bytes for decoding.
pub trait ByteSource {
    /// Fills `dst` completely or fails with `ProtocolError::Truncated`.
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<(), ProtocolError>;

    /// Reads `len` bytes into an owned buffer.
    fn read_bytes(&mut self, len: usize) -> Result<Bytes, ProtocolError> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Consumes and discards `len` bytes.
    fn skip(&mut self, len: usize) -> Result<(), ProtocolError> {
        let mut scratch = [0u8; 256];
        let mut left = len;
        while left > 0 {
            let n = left.min(scratch.len());
            self.read_exact(&mut scratch[..n])?;
            left -= n;
        }
        Ok(())
    }

    /// Number of bytes consumed so far.
    fn offset(&self) -> u64;
}

/// A sink of bytes for encoding.
pub trait ByteSink {
    /// Writes all of `src` or fails.
    fn write_all(&mut self, src: &[u8]) -> Result<(), ProtocolError>;

    /// Number of bytes written so far.
    fn offset(&self) -> u64;
}

/// In-memory cursor over any `bytes::Buf`.
///
/// Reading from a `Bytes` buffer through this cursor is zero-copy for binary
/// payloads.
#[derive(Debug, Clone)]
pub struct ByteCursor<B> {
    buf: B,
    offset: u64,
}

impl<B: Buf> ByteCursor<B> {
    pub fn new(buf: B) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Returns whether the whole buffer has been consumed.
    pub fn is_exhausted(&self) -> bool {
        !self.buf.has_remaining()
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    fn ensure(&self, len: usize) -> Result<(), ProtocolError> {
        let available = self.buf.remaining();
        if available < len {
            return Err(ProtocolError::Truncated {
                offset: self.offset,
                needed: len - available,
            });
        }
        Ok(())
    }
}

impl<B: Buf> ByteSource for ByteCursor<B> {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<(), ProtocolError> {
        self.ensure(dst.len())?;
        self.buf.copy_to_slice(dst);
        self.offset += dst.len() as u64;
        Ok(())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, ProtocolError> {
        self.ensure(len)?;
        let bytes = self.buf.copy_to_bytes(len);
        self.offset += len as u64;
        Ok(bytes)
    }

    fn skip(&mut self, len: usize) -> Result<(), ProtocolError> {
        self.ensure(len)?;
        self.buf.advance(len);
        self.offset += len as u64;
        Ok(())
    }

    fn offset(&self) -> u64 {
        self.offset
    }
}

/// Adapter reading from a blocking `std::io::Read`.
///
/// An early end of stream is reported as `Truncated`; other I/O failures pass
/// through as `ProtocolError::Io`.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<(), ProtocolError> {
        let mut filled = 0;
        while filled < dst.len() {
            match self.inner.read(&mut dst[filled..]) {
                Ok(0) => {
                    return Err(ProtocolError::Truncated {
                        offset: self.offset + filled as u64,
                        needed: dst.len() - filled,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ProtocolError::Io(e)),
            }
        }
        self.offset += filled as u64;
        Ok(())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, ProtocolError> {
        // Grow with the data actually received so a lying length prefix
        // cannot force a large up-front allocation.
        let mut buf = Vec::new();
        let got = (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        if got < len {
            return Err(ProtocolError::Truncated {
                offset: self.offset + got as u64,
                needed: len - got,
            });
        }
        self.offset += got as u64;
        Ok(Bytes::from(buf))
    }

    fn offset(&self) -> u64 {
        self.offset
    }
}

impl ByteSink for BytesMut {
    fn write_all(&mut self, src: &[u8]) -> Result<(), ProtocolError> {
        self.extend_from_slice(src);
        Ok(())
    }

    fn offset(&self) -> u64 {
        self.len() as u64
    }
}

impl ByteSink for Vec<u8> {
    fn write_all(&mut self, src: &[u8]) -> Result<(), ProtocolError> {
        self.extend_from_slice(src);
        Ok(())
    }

    fn offset(&self) -> u64 {
        self.len() as u64
    }
}

/// Adapter writing to a blocking `std::io::Write`.
#[derive(Debug)]
pub struct IoSink<W> {
    inner: W,
    offset: u64,
}

impl<W: Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, offset: 0 }
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<(), ProtocolError> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn write_all(&mut self, src: &[u8]) -> Result<(), ProtocolError> {
        self.inner.write_all(src)?;
        self.offset += src.len() as u64;
        Ok(())
    }

    fn offset(&self) -> u64 {
        self.offset
    }
}
