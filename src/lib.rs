//! Oxideflate: a DEFLATE compression stream engine.
//!
//! The crate provides:
//! - A resumable compression stream over caller-owned buffers (`deflater`)
//! - An `io::Write` adapter for streaming output (`write`)
//! - One-shot helpers (`engine`) and file-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! Streams produce zlib-framed output (RFC 1950) by default, or raw DEFLATE
//! (RFC 1951) when `raw` is set.
//!
//! # Quick Start
//!
//! ```
//! use oxideflate::{Deflater, FlushStyle, Level, Strategy};
//!
//! let input = b"hello world";
//! let mut d = Deflater::new(Level::DEFAULT, Strategy::Default, false).unwrap();
//! d.set_input(input, 0, input.len()).unwrap();
//!
//! let mut out = [0u8; 64];
//! let n = d.deflate(&mut out, 0, 64, FlushStyle::Finish).unwrap();
//! assert!(d.finished());
//! assert_eq!(d.total_in(), 11);
//! assert_eq!(d.total_out(), n as u64);
//! ```

mod codec;
pub mod deflater;
pub mod engine;
pub mod error;
pub mod io;
pub mod params;
pub mod write;

#[cfg(feature = "cli")]
pub mod cli;

pub use deflater::Deflater;
pub use engine::{compress, compress_with_dictionary, compress_with_options};
pub use error::DeflateError;
pub use params::{DeflateOptions, FlushStyle, Level, Strategy};
pub use write::DeflateWriter;

/// Version string of the linked codec library.
pub fn codec_version() -> &'static str {
    codec::version()
}
