// Binding to the zlib-ABI deflate codec.
//
// `NativeStream` owns exactly one initialized `z_stream`. The codec keeps a
// back pointer to the struct, so it lives in a `Box` and never moves once
// initialized. Cursor fields (`next_in`/`next_out`) are only set for the
// duration of a single codec call and are nulled right after it.
//
// Status translation:
//   Z_OK, Z_BUF_ERROR  -> Outcome::Progress (Z_BUF_ERROR means "no progress
//                         possible with these buffers", which is not fatal)
//   Z_STREAM_END       -> Outcome::Finished
//   anything else      -> DeflateError

use std::ffi::{CStr, c_char, c_int};
use std::{mem, ptr};

use libz_rs_sys as zlib;
use libz_rs_sys::z_stream;

use crate::error::DeflateError;
use crate::params::{DeflateOptions, FlushStyle, Level, MEM_LEVEL, Strategy};

/// What a successful codec call reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Zero or more bytes were consumed/produced; the stream is still open.
    Progress,
    /// The compressed stream is structurally complete.
    Finished,
}

/// Result of one compression step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    /// Input bytes the codec consumed.
    pub consumed: usize,
    /// Output bytes the codec produced.
    pub produced: usize,
    pub outcome: Outcome,
}

/// Map a `deflate()` status code to an outcome, or `None` if it is fatal.
pub(crate) fn outcome_for(code: c_int) -> Option<Outcome> {
    match code {
        zlib::Z_OK | zlib::Z_BUF_ERROR => Some(Outcome::Progress),
        zlib::Z_STREAM_END => Some(Outcome::Finished),
        _ => None,
    }
}

/// The codec's standard text for a status code.
pub(crate) fn describe(code: c_int) -> &'static str {
    match code {
        0 => "ok",
        1 => "stream end",
        2 => "need dictionary",
        -1 => "file error",
        -2 => "stream error",
        -3 => "data error",
        -4 => "insufficient memory",
        -5 => "buffer error",
        -6 => "incompatible version",
        _ => "unknown error",
    }
}

fn flush_code(flush: FlushStyle) -> c_int {
    match flush {
        FlushStyle::NoFlush => zlib::Z_NO_FLUSH,
        FlushStyle::SyncFlush => zlib::Z_SYNC_FLUSH,
        FlushStyle::FullFlush => zlib::Z_FULL_FLUSH,
        FlushStyle::Finish => zlib::Z_FINISH,
    }
}

/// Version string reported by the codec library.
pub(crate) fn version() -> &'static str {
    // SAFETY: zlibVersion returns a pointer to a static NUL-terminated string.
    let ptr = unsafe { zlib::zlibVersion() };
    if ptr.is_null() {
        return "unknown";
    }
    // SAFETY: non-null, static, NUL-terminated (see above).
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("unknown")
}

/// The codec's cursors are 32-bit; longer slices are offered in pieces.
fn clamp_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// NativeStream
// ---------------------------------------------------------------------------

/// An initialized native deflate context. Released exactly once, on drop.
pub(crate) struct NativeStream {
    strm: Box<z_stream>,
}

// SAFETY: the `z_stream` and the state it points to are exclusively owned by
// this value and hold no thread-local data. Cursor pointers never outlive the
// call that set them, so moving the owner to another thread is sound. The
// type is not `Sync`: every operation needs `&mut self`.
unsafe impl Send for NativeStream {}

impl std::fmt::Debug for NativeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeStream")
            .field("total_in", &self.total_in())
            .field("total_out", &self.total_out())
            .field("checksum", &self.checksum())
            .finish()
    }
}

impl NativeStream {
    /// Allocate and initialize a codec context.
    ///
    /// On failure the boxed `z_stream` is dropped on return; the codec has
    /// already released whatever it allocated internally.
    pub fn new(opts: &DeflateOptions) -> Result<Self, DeflateError> {
        let mut strm = Box::new(z_stream::default());
        let window_bits = opts.window_bits();

        // SAFETY: `strm` is a valid, boxed, default-initialized z_stream; the
        // version string and struct size identify the ABI we were built with.
        let code = unsafe {
            zlib::deflateInit2_(
                &mut *strm,
                opts.level.get(),
                zlib::Z_DEFLATED,
                window_bits,
                MEM_LEVEL,
                opts.strategy.as_raw(),
                zlib::zlibVersion(),
                mem::size_of::<z_stream>() as c_int,
            )
        };
        if code != zlib::Z_OK {
            let message = last_message(&strm, code);
            log::debug!(
                "deflateInit2 rejected level={} strategy={:?} window_bits={window_bits}: {message}",
                opts.level.get(),
                opts.strategy
            );
            return Err(DeflateError::Initialization { code, message });
        }

        log::debug!(
            "deflate stream created: level={} strategy={:?} raw={}",
            opts.level.get(),
            opts.strategy,
            opts.raw
        );
        Ok(Self { strm })
    }

    /// Run one compression step from `input` into `output`.
    pub fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushStyle,
    ) -> Result<Step, DeflateError> {
        let avail_in = clamp_len(input.len());
        let avail_out = clamp_len(output.len());

        let strm = &mut *self.strm;
        strm.next_in = input.as_ptr() as _;
        strm.avail_in = avail_in;
        strm.next_out = output.as_mut_ptr() as _;
        strm.avail_out = avail_out;
        strm.msg = ptr::null_mut::<c_char>() as _;

        // SAFETY: the cursors point into `input`/`output`, which outlive this
        // call, and the lengths never exceed the slices.
        let code = unsafe { zlib::deflate(strm, flush_code(flush)) };

        let consumed = (avail_in - strm.avail_in) as usize;
        let produced = (avail_out - strm.avail_out) as usize;
        self.clear_cursors();

        log::trace!("deflate({flush:?}) -> {code}: consumed={consumed} produced={produced}");

        match outcome_for(code) {
            Some(outcome) => Ok(Step {
                consumed,
                produced,
                outcome,
            }),
            None => Err(DeflateError::Codec {
                code,
                message: last_message(&self.strm, code),
            }),
        }
    }

    /// Prime the history window. The codec copies what it needs.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<(), DeflateError> {
        let len = u32::try_from(dictionary.len()).map_err(|_| {
            DeflateError::InvalidArgument(format!(
                "dictionary of {} bytes exceeds the codec limit",
                dictionary.len()
            ))
        })?;

        self.strm.msg = ptr::null_mut::<c_char>() as _;
        // SAFETY: the pointer/length pair describes `dictionary`, which the
        // codec reads during this call only.
        let code = unsafe { zlib::deflateSetDictionary(&mut *self.strm, dictionary.as_ptr(), len) };
        if code != zlib::Z_OK {
            return Err(DeflateError::Codec {
                code,
                message: last_message(&self.strm, code),
            });
        }
        log::debug!("preset dictionary installed: {len} bytes");
        Ok(())
    }

    /// Change level and strategy.
    ///
    /// The output cursor is nulled first: the codec may try to flush while
    /// switching, and must never write through a pointer from an earlier
    /// call. A pending flush therefore makes the codec reject the change.
    pub fn set_params(&mut self, level: Level, strategy: Strategy) -> Result<(), DeflateError> {
        self.clear_cursors();
        self.strm.msg = ptr::null_mut::<c_char>() as _;

        // SAFETY: the stream is initialized and both cursors are null/empty.
        let code =
            unsafe { zlib::deflateParams(&mut *self.strm, level.get(), strategy.as_raw()) };
        if code != zlib::Z_OK {
            let message = last_message(&self.strm, code);
            return Err(DeflateError::State(format!(
                "codec rejected level {} / strategy {strategy:?}: {message} (code {code})",
                level.get()
            )));
        }
        log::debug!("deflate params changed: level={} strategy={strategy:?}", level.get());
        Ok(())
    }

    /// Start a fresh stream on the same allocation.
    pub fn reset(&mut self) -> Result<(), DeflateError> {
        self.clear_cursors();
        self.strm.msg = ptr::null_mut::<c_char>() as _;

        // SAFETY: the stream is initialized.
        let code = unsafe { zlib::deflateReset(&mut *self.strm) };
        if code != zlib::Z_OK {
            return Err(DeflateError::Initialization {
                code,
                message: last_message(&self.strm, code),
            });
        }
        log::debug!("deflate stream reset");
        Ok(())
    }

    pub fn total_in(&self) -> u64 {
        self.strm.total_in as u64
    }

    pub fn total_out(&self) -> u64 {
        self.strm.total_out as u64
    }

    /// Adler-32 of the input so far (zlib framing); 1 for raw streams.
    pub fn checksum(&self) -> u32 {
        self.strm.adler as u32
    }

    fn clear_cursors(&mut self) {
        self.strm.next_in = ptr::null::<u8>() as _;
        self.strm.avail_in = 0;
        self.strm.next_out = ptr::null_mut::<u8>() as _;
        self.strm.avail_out = 0;
    }
}

impl Drop for NativeStream {
    fn drop(&mut self) {
        // SAFETY: the stream was initialized in `new` and is ended only here.
        let code = unsafe { zlib::deflateEnd(&mut *self.strm) };
        match code {
            zlib::Z_OK => log::debug!("deflate stream released"),
            // Ended before the stream finished; pending output is discarded.
            zlib::Z_DATA_ERROR => log::debug!("deflate stream released before finishing"),
            _ => log::warn!("deflateEnd returned {code} ({})", describe(code)),
        }
    }
}

/// The codec's diagnostic for the last call, falling back to the standard
/// text for `code`.
fn last_message(strm: &z_stream, code: c_int) -> String {
    if strm.msg.is_null() {
        return describe(code).to_string();
    }
    // SAFETY: a non-null `msg` points at a static NUL-terminated string
    // owned by the codec.
    unsafe { CStr::from_ptr(strm.msg as *const _) }
        .to_string_lossy()
        .into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
