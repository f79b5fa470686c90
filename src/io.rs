// File-level I/O helpers for compression.
//
// Provides `compress_stream()` and `compress_file()` convenience functions
// that drive a `DeflateWriter` with buffered I/O. Optionally computes a
// streaming Adler-32 of the input (feature-gated behind `adler32`), which is
// the only input checksum available for raw streams.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::DeflateError;
use crate::params::DeflateOptions;
use crate::write::DeflateWriter;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_stream()` / `compress_file()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressStats {
    /// Uncompressed bytes read.
    pub input_size: u64,
    /// Compressed bytes written.
    pub output_size: u64,
    /// Checksum reported by the codec (zlib framing only).
    pub checksum: Option<u32>,
    /// Adler-32 of the input (if the `adler32` feature is enabled).
    pub input_adler32: Option<u32>,
}

impl CompressStats {
    /// Compressed size as a fraction of the input size.
    pub fn ratio(&self) -> f64 {
        if self.input_size == 0 {
            return 0.0;
        }
        self.output_size as f64 / self.input_size as f64
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for stream and file compression.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Compression stream error.
    #[error("deflate error: {0}")]
    Deflate(#[from] DeflateError),
}

/// `DeflateWriter` reports codec failures as `io::Error`; recover the
/// `DeflateError` so callers see it as `IoError::Deflate`.
fn split_writer_error(e: io::Error) -> IoError {
    if !e.get_ref().is_some_and(|inner| inner.is::<DeflateError>()) {
        return IoError::Io(e);
    }
    match e.into_inner().map(|inner| inner.downcast::<DeflateError>()) {
        Some(Ok(err)) => IoError::Deflate(*err),
        Some(Err(inner)) => IoError::Io(io::Error::other(inner)),
        None => IoError::Io(io::Error::other("deflate writer failed")),
    }
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// compress_stream
// ---------------------------------------------------------------------------

/// Compress everything from `reader` into `writer`.
///
/// `writer` is flushed but not closed. With a `dictionary`, the stream is
/// primed before any input is compressed.
pub fn compress_stream<R: Read, W: Write>(
    mut reader: R,
    writer: W,
    opts: &DeflateOptions,
    dictionary: Option<&[u8]>,
) -> Result<CompressStats, IoError> {
    let mut encoder = match dictionary {
        Some(dict) => DeflateWriter::with_dictionary(writer, opts, dict)?,
        None => DeflateWriter::new(writer, opts)?,
    };

    #[cfg(feature = "adler32")]
    let mut hasher = simd_adler32::Adler32::new();

    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        #[cfg(feature = "adler32")]
        {
            hasher.write(&buf[..n]);
        }
        encoder.write_all(&buf[..n]).map_err(split_writer_error)?;
    }

    encoder.try_finish().map_err(split_writer_error)?;
    let input_size = encoder.total_in();
    let output_size = encoder.total_out();
    let checksum = (!opts.raw).then(|| encoder.checksum());
    let mut writer = encoder.finish().map_err(split_writer_error)?;
    writer.flush()?;

    #[cfg(feature = "adler32")]
    let input_adler32 = Some(hasher.finish());
    #[cfg(not(feature = "adler32"))]
    let input_adler32: Option<u32> = None;

    log::debug!("compressed {input_size} -> {output_size} bytes");

    Ok(CompressStats {
        input_size,
        output_size,
        checksum,
        input_adler32,
    })
}

// ---------------------------------------------------------------------------
// compress_file
// ---------------------------------------------------------------------------

/// Compress `input_path` into `output_path` (created or truncated).
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    opts: &DeflateOptions,
    dictionary: Option<&[u8]>,
) -> Result<CompressStats, IoError> {
    let input = BufReader::with_capacity(BUF_SIZE, File::open(input_path)?);
    let output = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    compress_stream(input, output, opts, dictionary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
