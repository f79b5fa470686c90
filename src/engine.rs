// One-shot compression helpers built on `Deflater`.
//
// Each call creates a stream, feeds the whole input, then drains with
// `Finish` until the codec reports end of stream. Output grows in chunks
// sized from the input length.

use crate::deflater::Deflater;
use crate::error::DeflateError;
use crate::params::{DeflateOptions, FlushStyle};

/// Smallest output chunk requested per drain step.
const MIN_CHUNK: usize = 256;

/// Compress `data` with default options (zlib framing, default level).
pub fn compress(data: &[u8]) -> Result<Vec<u8>, DeflateError> {
    compress_with_options(data, &DeflateOptions::default())
}

/// Compress `data` with custom options.
pub fn compress_with_options(data: &[u8], opts: &DeflateOptions) -> Result<Vec<u8>, DeflateError> {
    let mut deflater = Deflater::with_options(opts)?;
    drain(&mut deflater, data)
}

/// Compress `data` with a preset dictionary.
///
/// The decompressor needs the same dictionary to decode the result.
pub fn compress_with_dictionary(
    data: &[u8],
    dictionary: &[u8],
    opts: &DeflateOptions,
) -> Result<Vec<u8>, DeflateError> {
    let mut deflater = Deflater::with_options(opts)?;
    deflater.set_dictionary(dictionary, 0, dictionary.len())?;
    drain(&mut deflater, data)
}

fn drain<'a>(deflater: &mut Deflater<'a>, data: &'a [u8]) -> Result<Vec<u8>, DeflateError> {
    deflater.set_input_bytes(data)?;

    let chunk = (data.len() / 2).max(MIN_CHUNK);
    let mut output = Vec::with_capacity(chunk);
    while !deflater.finished() {
        let start = output.len();
        output.resize(start + chunk, 0);
        let written = deflater.deflate(&mut output, start, chunk, FlushStyle::Finish)?;
        output.truncate(start + written);
    }
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Level, Strategy};
    use std::io::Read;

    fn inflate_zlib(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        flate2::read::ZlibDecoder::new(data)
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    fn inflate_raw(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        flate2::read::DeflateDecoder::new(data)
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn empty_input() {
        let compressed = compress(b"").unwrap();
        assert!(!compressed.is_empty());
        assert!(inflate_zlib(&compressed).is_empty());
    }

    #[test]
    fn every_level_roundtrips() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 97) as u8).collect();
        for level in -1..=9 {
            let opts = DeflateOptions {
                level: Level::new(level),
                ..Default::default()
            };
            let compressed = compress_with_options(&data, &opts).unwrap();
            assert_eq!(inflate_zlib(&compressed), data, "level {level}");
        }
    }

    #[test]
    fn every_strategy_roundtrips_raw() {
        let data = b"aaaaaaaaaabbbbbbbbbbaaaaaaaaaabbbbbbbbbb0123456789".repeat(50);
        for strategy in Strategy::ALL {
            let opts = DeflateOptions {
                strategy,
                raw: true,
                ..Default::default()
            };
            let compressed = compress_with_options(&data, &opts).unwrap();
            assert_eq!(inflate_raw(&compressed), data, "strategy {strategy:?}");
        }
    }

    #[test]
    fn level_zero_stores() {
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let opts = DeflateOptions {
            level: Level::NONE,
            ..Default::default()
        };
        let compressed = compress_with_options(&data, &opts).unwrap();
        assert!(compressed.len() > data.len());
        assert_eq!(inflate_zlib(&compressed), data);
    }

    #[test]
    fn dictionary_shrinks_short_messages() {
        let dict = b"{\"type\":\"event\",\"source\":\"sensor\",\"value\":";
        let msg = b"{\"type\":\"event\",\"source\":\"sensor\",\"value\":17}";
        let opts = DeflateOptions::raw(Level::BEST);
        let plain = compress_with_options(msg, &opts).unwrap();
        let primed = compress_with_dictionary(msg, dict, &opts).unwrap();
        assert!(primed.len() < plain.len());
    }

    #[test]
    fn invalid_level_is_initialization_error() {
        let opts = DeflateOptions {
            level: Level::new(11),
            ..Default::default()
        };
        assert!(matches!(
            compress_with_options(b"x", &opts),
            Err(DeflateError::Initialization { .. })
        ));
    }
}
