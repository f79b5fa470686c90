// Streaming compression writer.
//
// DeflateWriter compresses everything written to it into an inner
// `io::Write`:
//   - write()      compresses with NoFlush, returns bytes consumed
//   - flush()      SyncFlush until the codec has nothing pending
//   - try_finish() Finish until the codec reports end of stream
// Compressed bytes are staged in a fixed buffer and drained to the inner
// writer before every codec step.

use std::io::{self, Write};

use crate::codec::{NativeStream, Outcome, Step};
use crate::error::DeflateError;
use crate::params::{DeflateOptions, FlushStyle};

/// Size of the compressed staging buffer.
const OUT_BUF_SIZE: usize = 32 * 1024;

/// An `io::Write` adapter that DEFLATE-compresses into `W`.
///
/// # Example
/// ```
/// use std::io::Write;
/// use oxideflate::{DeflateOptions, DeflateWriter};
///
/// let mut w = DeflateWriter::new(Vec::new(), &DeflateOptions::default()).unwrap();
/// w.write_all(b"hello hello hello").unwrap();
/// let compressed = w.finish().unwrap();
/// assert!(!compressed.is_empty());
/// ```
pub struct DeflateWriter<W: Write> {
    stream: NativeStream,
    inner: Option<W>,
    /// Compressed bytes not yet handed to `inner`.
    buf: Vec<u8>,
    finished: bool,
    total_in: u64,
    total_out: u64,
}

impl<W: Write> DeflateWriter<W> {
    pub fn new(inner: W, opts: &DeflateOptions) -> Result<Self, DeflateError> {
        Ok(Self {
            stream: NativeStream::new(opts)?,
            inner: Some(inner),
            buf: Vec::with_capacity(OUT_BUF_SIZE),
            finished: false,
            total_in: 0,
            total_out: 0,
        })
    }

    /// Create a writer whose stream is primed with a preset dictionary.
    pub fn with_dictionary(
        inner: W,
        opts: &DeflateOptions,
        dictionary: &[u8],
    ) -> Result<Self, DeflateError> {
        let mut writer = Self::new(inner, opts)?;
        writer.stream.set_dictionary(dictionary)?;
        Ok(writer)
    }

    /// Uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compressed bytes produced so far (including any still staged).
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Adler-32 of the input so far (zlib framing only).
    pub fn checksum(&self) -> u32 {
        self.stream.checksum()
    }

    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut W> {
        self.inner.as_mut()
    }

    fn inner_mut(&mut self) -> io::Result<&mut W> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::other("deflate writer already finished"))
    }

    /// Hand all staged output to the inner writer.
    fn dump(&mut self) -> io::Result<()> {
        while !self.buf.is_empty() {
            let buf = std::mem::take(&mut self.buf);
            let written = self.inner_mut().and_then(|w| w.write(&buf));
            self.buf = buf;
            match written {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => {
                    self.buf.drain(..n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// One codec step into the (empty) staging buffer.
    fn step(&mut self, input: &[u8], flush: FlushStyle) -> io::Result<Step> {
        debug_assert!(self.buf.is_empty());
        self.buf.resize(OUT_BUF_SIZE, 0);
        let result = self.stream.step(input, &mut self.buf, flush);
        let step = match result {
            Ok(step) => step,
            Err(e) => {
                self.buf.clear();
                return Err(e.into());
            }
        };
        self.buf.truncate(step.produced);
        self.total_in += step.consumed as u64;
        self.total_out += step.produced as u64;
        if step.outcome == Outcome::Finished {
            self.finished = true;
        }
        Ok(step)
    }

    /// Finish the stream without consuming the writer.
    pub fn try_finish(&mut self) -> io::Result<()> {
        loop {
            self.dump()?;
            if self.finished {
                return Ok(());
            }
            self.step(&[], FlushStyle::Finish)?;
        }
    }

    /// Finish the stream and return the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.try_finish()?;
        self.inner
            .take()
            .ok_or_else(|| io::Error::other("deflate writer already finished"))
    }
}

impl<W: Write> Write for DeflateWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.finished {
            return Err(io::Error::other("write after deflate stream finished"));
        }
        loop {
            self.dump()?;
            let step = self.step(data, FlushStyle::NoFlush)?;
            // A step that consumed nothing filled the staging buffer; drain
            // it and go again.
            if step.consumed > 0 || data.is_empty() || step.produced == 0 {
                return Ok(step.consumed);
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.finished {
            loop {
                self.dump()?;
                let step = self.step(&[], FlushStyle::SyncFlush)?;
                if step.produced < OUT_BUF_SIZE {
                    break;
                }
            }
        }
        self.dump()?;
        self.inner_mut()?.flush()
    }
}

impl<W: Write> Drop for DeflateWriter<W> {
    fn drop(&mut self) {
        if self.inner.is_some() && !self.finished {
            let _ = self.try_finish();
        }
    }
}

impl<W: Write> std::fmt::Debug for DeflateWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateWriter")
            .field("stream", &self.stream)
            .field("staged", &self.buf.len())
            .field("finished", &self.finished)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Level;

    fn inflate(data: &[u8]) -> Vec<u8> {
        use std::io::Read;
        let mut out = Vec::new();
        flate2::read::ZlibDecoder::new(data)
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn write_all_then_finish_roundtrips() {
        let data: Vec<u8> = b"The quick brown fox jumps over the lazy dog. "
            .iter()
            .copied()
            .cycle()
            .take(100_000)
            .collect();
        let mut w = DeflateWriter::new(Vec::new(), &DeflateOptions::default()).unwrap();
        for chunk in data.chunks(777) {
            w.write_all(chunk).unwrap();
        }
        assert_eq!(w.total_in(), data.len() as u64);
        let compressed = w.finish().unwrap();
        assert!(compressed.len() < data.len() / 10);
        assert_eq!(inflate(&compressed), data);
    }

    #[test]
    fn flush_makes_prefix_decodable() {
        let mut w = DeflateWriter::new(Vec::new(), &DeflateOptions::default()).unwrap();
        w.write_all(b"first part, ").unwrap();
        w.flush().unwrap();

        let flushed = w.get_ref().unwrap().clone();
        let mut d = flate2::Decompress::new(true);
        let mut out = Vec::with_capacity(64);
        d.decompress_vec(&flushed, &mut out, flate2::FlushDecompress::Sync)
            .unwrap();
        assert_eq!(out, b"first part, ");

        w.write_all(b"second part").unwrap();
        let compressed = w.finish().unwrap();
        assert_eq!(inflate(&compressed), b"first part, second part");
    }

    #[test]
    fn write_after_finish_fails() {
        let mut w = DeflateWriter::new(Vec::new(), &DeflateOptions::default()).unwrap();
        w.write_all(b"abc").unwrap();
        w.try_finish().unwrap();
        assert!(w.write(b"more").is_err());
        // Finishing twice is harmless.
        w.try_finish().unwrap();
        assert_eq!(inflate(w.get_ref().unwrap()), b"abc");
    }

    #[test]
    fn raw_writer_with_dictionary() {
        let dict = b"common prefix shared by every message: ";
        let msg = b"common prefix shared by every message: payload 42";
        let opts = DeflateOptions::raw(Level::BEST);

        let mut w = DeflateWriter::with_dictionary(Vec::new(), &opts, dict).unwrap();
        w.write_all(msg).unwrap();
        let compressed = w.finish().unwrap();

        let mut d = flate2::Decompress::new(false);
        d.set_dictionary(dict).unwrap();
        let mut out = Vec::with_capacity(msg.len() * 2);
        let status = d
            .decompress_vec(&compressed, &mut out, flate2::FlushDecompress::Finish)
            .unwrap();
        assert_eq!(status, flate2::Status::StreamEnd);
        assert_eq!(out, msg);
    }

    #[test]
    fn drop_finishes_stream() {
        let mut sink = Vec::new();
        {
            let mut w = DeflateWriter::new(&mut sink, &DeflateOptions::default()).unwrap();
            w.write_all(b"dropped without finish").unwrap();
        }
        assert_eq!(inflate(&sink), b"dropped without finish");
    }
}
