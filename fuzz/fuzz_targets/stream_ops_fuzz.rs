#![no_main]
use libfuzzer_sys::fuzz_target;
use oxideflate::{Deflater, FlushStyle, Level, Strategy};

// Interprets the input as a sequence of operations on one stream. Any
// sequence may fail with an error, but must never panic or corrupt the
// byte counters.
fuzz_target!(|data: &[u8]| {
    let Some((&first, ops)) = data.split_first() else {
        return;
    };
    let raw = first & 1 != 0;
    let Ok(mut d) = Deflater::new(Level::new((first >> 1) as i32 % 12 - 1), Strategy::Default, raw)
    else {
        return;
    };

    let mut out = vec![0u8; 512];
    let mut produced = 0u64;
    let mut consumed_before = 0u64;
    for chunk in ops.chunks(4) {
        let op = chunk[0];
        let arg = chunk.get(1).copied().unwrap_or(0) as usize;
        let arg2 = chunk.get(2).copied().unwrap_or(0) as usize;
        match op % 9 {
            0 => {
                let _ = d.set_input(data, arg, arg2);
            }
            1 | 2 | 3 | 4 => {
                let flush = match op % 9 {
                    1 => FlushStyle::NoFlush,
                    2 => FlushStyle::SyncFlush,
                    3 => FlushStyle::FullFlush,
                    _ => FlushStyle::Finish,
                };
                if let Ok(n) = d.deflate(&mut out, arg % 512, arg2, flush) {
                    assert!(n <= arg2);
                    produced += n as u64;
                }
            }
            5 => {
                let _ = d.set_dictionary(data, arg, arg2);
            }
            6 => {
                let _ = d.set_level(Level::new(arg as i32 % 13 - 2));
            }
            7 => {
                if d.reset().is_ok() {
                    produced = 0;
                    consumed_before = 0;
                }
            }
            _ => {
                if arg == 0 {
                    d.end();
                }
            }
        }
        assert_eq!(d.total_out(), produced);
        assert!(d.total_in() >= consumed_before);
        consumed_before = d.total_in();
    }
});
