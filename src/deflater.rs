// Incremental compression stream.
//
// `Deflater` is the caller-facing state object: it holds the native codec
// context, the unconsumed remainder of the caller's input, cumulative
// counters and the `finished` flag. Output cursors only exist for the
// duration of one `deflate` call.
//
// Lifecycle:
//   new -> { set_input / deflate }* -> finished -> end (or drop)
//   reset returns a stream to its freshly created state on the same
//   allocation.

use crate::codec::{NativeStream, Outcome};
use crate::error::{DeflateError, check_range};
use crate::params::{DeflateOptions, FlushStyle, Level, Strategy};

/// A DEFLATE compression stream fed from borrowed input.
///
/// Input passed to [`set_input`](Self::set_input) is not copied; the borrow
/// keeps it alive and unmodified until it has been consumed or replaced.
///
/// # Example
/// ```
/// use oxideflate::{Deflater, FlushStyle, Level, Strategy};
///
/// let mut d = Deflater::new(Level::new(6), Strategy::Default, false).unwrap();
/// d.set_input(b"hello world", 0, 11).unwrap();
/// let mut out = [0u8; 64];
/// let n = d.deflate(&mut out, 0, 64, FlushStyle::Finish).unwrap();
/// assert!(n > 0);
/// assert!(d.finished());
/// assert_eq!(d.total_in(), 11);
/// ```
#[derive(Debug)]
pub struct Deflater<'a> {
    native: Option<NativeStream>,
    /// Unconsumed part of the current input.
    input: &'a [u8],
    /// Input has been supplied (or a step has run) since create/reset.
    has_input: bool,
    /// Flush style used by `deflate_buf`.
    default_flush: FlushStyle,
    finished: bool,
    raw: bool,
    level: Level,
    strategy: Strategy,
    /// Level/strategy recorded by the deferred setters, not yet applied.
    pending_params: bool,
    total_in: u64,
    total_out: u64,
    checksum: u32,
}

impl<'a> Deflater<'a> {
    /// Create a stream. `raw` omits the zlib header and trailer.
    ///
    /// Fails with [`DeflateError::Initialization`] if the codec rejects the
    /// parameters.
    pub fn new(level: Level, strategy: Strategy, raw: bool) -> Result<Self, DeflateError> {
        Self::with_options(&DeflateOptions {
            level,
            strategy,
            raw,
        })
    }

    /// Create a stream from an options struct.
    pub fn with_options(opts: &DeflateOptions) -> Result<Self, DeflateError> {
        let native = NativeStream::new(opts)?;
        let checksum = native.checksum();
        Ok(Self {
            native: Some(native),
            input: &[],
            has_input: false,
            default_flush: FlushStyle::NoFlush,
            finished: false,
            raw: opts.raw,
            level: opts.level,
            strategy: opts.strategy,
            pending_params: false,
            total_in: 0,
            total_out: 0,
            checksum,
        })
    }

    fn native_mut(&mut self) -> Result<&mut NativeStream, DeflateError> {
        self.native
            .as_mut()
            .ok_or_else(|| DeflateError::State("deflater has been ended".into()))
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Use `buf[offset..offset + len]` as the input for following `deflate`
    /// calls, replacing any unconsumed input.
    pub fn set_input(
        &mut self,
        buf: &'a [u8],
        offset: usize,
        len: usize,
    ) -> Result<(), DeflateError> {
        check_range(offset, len, buf.len())?;
        if self.native.is_none() {
            return Err(DeflateError::State("deflater has been ended".into()));
        }

        self.apply_pending_params()?;
        self.input = &buf[offset..offset + len];
        self.has_input = true;
        Ok(())
    }

    /// Use all of `buf` as input.
    pub fn set_input_bytes(&mut self, buf: &'a [u8]) -> Result<(), DeflateError> {
        self.set_input(buf, 0, buf.len())
    }

    /// Whether all supplied input has been consumed.
    pub fn needs_input(&self) -> bool {
        self.input.is_empty()
    }

    /// Preset dictionary from `buf[offset..offset + len]`.
    ///
    /// Must come before any input is compressed; in zlib framing the codec
    /// rejects it afterwards with [`DeflateError::Codec`].
    pub fn set_dictionary(
        &mut self,
        buf: &[u8],
        offset: usize,
        len: usize,
    ) -> Result<(), DeflateError> {
        check_range(offset, len, buf.len())?;
        let native = self.native_mut()?;
        native.set_dictionary(&buf[offset..offset + len])?;
        self.checksum = native.checksum();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// Run one compression step into `out[offset..offset + len]`.
    ///
    /// Returns the number of bytes written, which may be 0 without any
    /// error: with no input left and [`FlushStyle::NoFlush`] there is simply
    /// nothing to emit yet.
    pub fn deflate(
        &mut self,
        out: &mut [u8],
        offset: usize,
        len: usize,
        flush: FlushStyle,
    ) -> Result<usize, DeflateError> {
        check_range(offset, len, out.len())?;
        if self.finished {
            return Err(DeflateError::State(
                "deflate called after the stream finished".into(),
            ));
        }

        self.apply_pending_params()?;
        let input = self.input;
        let native = self.native_mut()?;
        let step = native.step(input, &mut out[offset..offset + len], flush)?;
        let checksum = native.checksum();

        self.input = &input[step.consumed..];
        self.has_input = true;
        self.total_in += step.consumed as u64;
        self.total_out += step.produced as u64;
        self.checksum = checksum;
        if step.outcome == Outcome::Finished {
            log::debug!(
                "deflate stream finished: in={} out={}",
                self.total_in,
                self.total_out
            );
            self.finished = true;
        }
        Ok(step.produced)
    }

    /// Compress into all of `out` using the default flush style
    /// ([`FlushStyle::NoFlush`], or [`FlushStyle::Finish`] after
    /// [`finish`](Self::finish)).
    pub fn deflate_buf(&mut self, out: &mut [u8]) -> Result<usize, DeflateError> {
        let (len, flush) = (out.len(), self.default_flush);
        self.deflate(out, 0, len, flush)
    }

    /// Signal that the current input is the last; `deflate_buf` will finish
    /// the stream from now on.
    pub fn finish(&mut self) {
        self.default_flush = FlushStyle::Finish;
    }

    /// Whether the codec has emitted the end of the stream.
    pub fn finished(&self) -> bool {
        self.finished
    }

    // -----------------------------------------------------------------------
    // Counters
    // -----------------------------------------------------------------------

    /// Input bytes consumed since create/reset.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compressed bytes produced since create/reset.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Rolling Adler-32 as reported by the codec (1 for raw streams).
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    // -----------------------------------------------------------------------
    // Tuning
    // -----------------------------------------------------------------------

    /// Current level, including one recorded but not yet applied.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Current strategy, including one recorded but not yet applied.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Whether the stream omits the zlib header and trailer.
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Change level and strategy on the codec immediately.
    ///
    /// No flush may be pending. The codec rejects the change with
    /// [`DeflateError::State`] if it would have to emit output.
    pub fn set_levels(&mut self, level: Level, strategy: Strategy) -> Result<(), DeflateError> {
        self.native_mut()?.set_params(level, strategy)?;
        self.level = level;
        self.strategy = strategy;
        self.pending_params = false;
        Ok(())
    }

    /// Record a new level, applied when input is next supplied.
    pub fn set_level(&mut self, level: Level) -> Result<(), DeflateError> {
        if !level.is_valid() {
            return Err(DeflateError::InvalidArgument(format!(
                "compression level {} outside -1..=9",
                level.get()
            )));
        }
        self.check_no_input("set_level")?;
        self.level = level;
        self.pending_params = true;
        Ok(())
    }

    /// Record a new strategy, applied when input is next supplied.
    pub fn set_strategy(&mut self, strategy: Strategy) -> Result<(), DeflateError> {
        self.check_no_input("set_strategy")?;
        self.strategy = strategy;
        self.pending_params = true;
        Ok(())
    }

    /// Push deferred level/strategy to the codec before the first step.
    fn apply_pending_params(&mut self) -> Result<(), DeflateError> {
        if self.has_input || !self.pending_params {
            return Ok(());
        }
        let (level, strategy) = (self.level, self.strategy);
        self.native_mut()?.set_params(level, strategy)?;
        self.pending_params = false;
        Ok(())
    }

    fn check_no_input(&self, op: &str) -> Result<(), DeflateError> {
        if self.native.is_none() {
            return Err(DeflateError::State("deflater has been ended".into()));
        }
        if self.has_input {
            return Err(DeflateError::State(format!(
                "{op} cannot be called after input was supplied"
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start a new stream on the same native allocation. Clears counters,
    /// checksum, `finished` and any unconsumed input.
    pub fn reset(&mut self) -> Result<(), DeflateError> {
        let native = self.native_mut()?;
        native.reset()?;
        let checksum = native.checksum();

        self.input = &[];
        self.has_input = false;
        self.default_flush = FlushStyle::NoFlush;
        self.finished = false;
        self.total_in = 0;
        self.total_out = 0;
        self.checksum = checksum;
        Ok(())
    }

    /// Release the native context. Further mutating calls fail with
    /// [`DeflateError::State`]; calling `end` again does nothing.
    pub fn end(&mut self) {
        if self.native.take().is_some() {
            self.input = &[];
        }
    }

    /// Whether [`end`](Self::end) has released the native context.
    pub fn is_ended(&self) -> bool {
        self.native.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
