//! Buffered byte source with peek/reset for format sniffing.

use std::io::{self, Read};

use crate::error::{Location, Result, StlError};

/// Block size used for reads from the underlying source.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

const MIN_BUFFER_SIZE: usize = 512;

/// Buffered reader over an arbitrary byte stream.
///
/// Bytes that have been consumed are discarded on the next refill unless a
/// [`mark`](Self::mark) is set, in which case everything from the mark on is
/// retained until [`reset`](Self::reset) rewinds to it.
pub struct ByteReader<R> {
    inner: R,
    buf: Vec<u8>,
    /// Read cursor into `buf`.
    pos: usize,
    /// Index into `buf` that must survive compaction.
    mark: Option<usize>,
    /// Stream offset of `buf[0]`.
    discarded: u64,
    chunk: usize,
    eof: bool,
}

impl<R: Read> ByteReader<R> {
    /// Wrap `inner` with the default block size.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, inner)
    }

    /// Wrap `inner`, reading blocks of `chunk` bytes.
    pub fn with_capacity(chunk: usize, inner: R) -> Self {
        let chunk = chunk.max(MIN_BUFFER_SIZE);
        Self {
            inner,
            buf: Vec::with_capacity(chunk),
            pos: 0,
            mark: None,
            discarded: 0,
            chunk,
            eof: false,
        }
    }

    /// Stream offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.discarded + self.pos as u64
    }

    fn available(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Buffer until at least `want` unread bytes are held or the source ends.
    fn fill(&mut self, want: usize) -> io::Result<()> {
        while self.available() < want && !self.eof {
            let keep_from = self.mark.unwrap_or(self.pos);
            if keep_from > 0 {
                self.buf.drain(..keep_from);
                self.discarded += keep_from as u64;
                self.pos -= keep_from;
                self.mark = self.mark.map(|m| m - keep_from);
            }

            let old_len = self.buf.len();
            let grow = self.chunk.max(want - self.available());
            self.buf.resize(old_len + grow, 0);
            let read = loop {
                match self.inner.read(&mut self.buf[old_len..]) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.buf.truncate(old_len);
                        return Err(e);
                    }
                }
            };
            self.buf.truncate(old_len + read);
            if read == 0 {
                self.eof = true;
            }
        }
        Ok(())
    }

    /// Remember the current position so [`reset`](Self::reset) can return to it.
    pub fn mark(&mut self) {
        self.mark = Some(self.pos);
    }

    /// Rewind to the last [`mark`](Self::mark) and clear it.
    pub fn reset(&mut self) -> io::Result<()> {
        match self.mark.take() {
            Some(m) => {
                self.pos = m;
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "reset without a mark",
            )),
        }
    }

    /// Up to `n` upcoming bytes, without consuming them.
    ///
    /// The slice is shorter than `n` only at end of stream.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        self.fill(n)?;
        let end = self.pos + n.min(self.available());
        Ok(&self.buf[self.pos..end])
    }

    /// Consume exactly `n` bytes.
    pub fn read_exact(&mut self, n: usize) -> Result<&[u8]> {
        let start = self.position();
        self.fill(n)?;
        let available = self.available();
        if available < n {
            return Err(StlError::truncated(
                Location::Byte(start),
                format!("expected {n} bytes, found {available}"),
            ));
        }
        let begin = self.pos;
        self.pos += n;
        Ok(&self.buf[begin..self.pos])
    }

    /// Consume exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_exact(N)?);
        Ok(out)
    }

    /// Advance `n` bytes without materializing them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        let start = self.position();
        let mut remaining = n;
        while remaining > 0 {
            if self.available() == 0 {
                self.fill(remaining.min(self.chunk))?;
            }
            let step = remaining.min(self.available());
            if step == 0 {
                return Err(StlError::truncated(
                    Location::Byte(start),
                    format!("expected {n} bytes, found {}", n - remaining),
                ));
            }
            self.pos += step;
            remaining -= step;
        }
        Ok(())
    }

    /// Consume the next line, without its `\n` or `\r\n` terminator.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Returns `None` at end
    /// of stream.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut scanned = 0;
        loop {
            if let Some(i) = self.buf[self.pos + scanned..]
                .iter()
                .position(|&b| b == b'\n')
            {
                let end = self.pos + scanned + i;
                let line = decode_line(&self.buf[self.pos..end]);
                self.pos = end + 1;
                return Ok(Some(line));
            }
            scanned = self.available();
            if self.eof {
                if scanned == 0 {
                    return Ok(None);
                }
                let line = decode_line(&self.buf[self.pos..]);
                self.pos = self.buf.len();
                return Ok(Some(line));
            }
            self.fill(scanned + 1)?;
        }
    }

    /// Whether unread bytes are already buffered.
    ///
    /// Never reads from the source, so it is safe to call once the grammar
    /// has consumed everything it declared.
    pub fn has_buffered(&self) -> bool {
        self.available() > 0
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
