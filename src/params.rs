// Compression parameters and fixed codec tuning.
//
// Level and strategy are passed through to the codec, which is the authority
// on their valid ranges; `Level::is_valid` mirrors that range for the
// deferred setters that validate eagerly.

/// Window size exponent (32 KiB history). Negated for raw streams.
pub const WINDOW_BITS: i32 = 15;

/// Codec memory level (the codec's default: 128 KiB of hash state).
pub const MEM_LEVEL: i32 = 8;

/// Lowest accepted level value (`-1` selects the codec default).
pub const MIN_LEVEL: i32 = -1;

/// Highest accepted level value.
pub const MAX_LEVEL: i32 = 9;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Compression effort, `-1` (codec default) or `0..=9`.
///
/// The value is not validated on construction: an out-of-range level is
/// rejected by the codec when a stream is created or retuned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Level(i32);

impl Level {
    /// Let the codec choose (currently equivalent to 6).
    pub const DEFAULT: Level = Level(-1);
    /// Store only, no compression.
    pub const NONE: Level = Level(0);
    /// Fastest compression.
    pub const FASTEST: Level = Level(1);
    /// Best compression ratio.
    pub const BEST: Level = Level(9);

    pub const fn new(level: i32) -> Self {
        Self(level)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// Whether the codec will accept this level.
    pub fn is_valid(self) -> bool {
        (MIN_LEVEL..=MAX_LEVEL).contains(&self.0)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for Level {
    fn from(level: u32) -> Self {
        Self(i32::try_from(level).unwrap_or(i32::MAX))
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Match-finding strategy (zlib `Z_*` strategy values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Normal LZ77 matching.
    #[default]
    Default,
    /// Tuned for data produced by a filter or predictor.
    Filtered,
    /// Huffman coding only, no string matching.
    HuffmanOnly,
    /// Match distances limited to one (run-length encoding).
    Rle,
    /// Fixed Huffman codes only.
    Fixed,
}

impl Strategy {
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Default => 0,
            Self::Filtered => 1,
            Self::HuffmanOnly => 2,
            Self::Rle => 3,
            Self::Fixed => 4,
        }
    }

    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Default),
            1 => Some(Self::Filtered),
            2 => Some(Self::HuffmanOnly),
            3 => Some(Self::Rle),
            4 => Some(Self::Fixed),
            _ => None,
        }
    }

    pub const ALL: [Strategy; 5] = [
        Self::Default,
        Self::Filtered,
        Self::HuffmanOnly,
        Self::Rle,
        Self::Fixed,
    ];
}

// ---------------------------------------------------------------------------
// Flush style
// ---------------------------------------------------------------------------

/// How much buffered output a single `deflate` step must emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlushStyle {
    /// Compress opportunistically; output may stay buffered in the codec.
    #[default]
    NoFlush,
    /// Emit all pending output and align on a byte boundary with an empty
    /// stored block. The stream stays open.
    SyncFlush,
    /// Like `SyncFlush`, and also drop the match history so decompression
    /// can restart at this point.
    FullFlush,
    /// No more input follows: emit the final block and the trailer.
    Finish,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for creating a compression stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeflateOptions {
    /// Compression level.
    pub level: Level,
    /// Match-finding strategy.
    pub strategy: Strategy,
    /// Omit the zlib header and Adler-32 trailer (bare DEFLATE data).
    pub raw: bool,
}

impl DeflateOptions {
    /// Options for a raw (headerless) stream at the given level.
    pub fn raw(level: Level) -> Self {
        Self {
            level,
            raw: true,
            ..Default::default()
        }
    }

    pub(crate) fn window_bits(&self) -> i32 {
        if self.raw { -WINDOW_BITS } else { WINDOW_BITS }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
