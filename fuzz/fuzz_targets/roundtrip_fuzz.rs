#![no_main]
use std::io::Read;

use libfuzzer_sys::fuzz_target;
use oxideflate::{DeflateOptions, Level, Strategy};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks level/strategy/framing, second splits off a dictionary.
    let flags = data[0];
    let level = Level::new((flags % 11) as i32 - 1);
    let strategy = Strategy::ALL[((flags >> 4) % 5) as usize];
    let raw = flags & 0x80 != 0;
    let payload = &data[2..];
    let split = (data[1] as usize).min(payload.len());
    let (dict, input) = payload.split_at(split);

    let opts = DeflateOptions {
        level,
        strategy,
        raw,
    };
    let compressed = if dict.is_empty() {
        oxideflate::compress_with_options(input, &opts).unwrap()
    } else {
        oxideflate::compress_with_dictionary(input, dict, &opts).unwrap()
    };

    let decoded = if dict.is_empty() {
        let mut out = Vec::new();
        if raw {
            flate2::read::DeflateDecoder::new(&compressed[..])
                .read_to_end(&mut out)
                .unwrap();
        } else {
            flate2::read::ZlibDecoder::new(&compressed[..])
                .read_to_end(&mut out)
                .unwrap();
        }
        out
    } else {
        let mut dec = flate2::Decompress::new(!raw);
        let mut out = Vec::with_capacity(input.len() + 64);
        if raw {
            dec.set_dictionary(dict).unwrap();
            dec.decompress_vec(&compressed, &mut out, flate2::FlushDecompress::Finish)
                .unwrap();
        } else {
            let err = dec
                .decompress_vec(&compressed, &mut out, flate2::FlushDecompress::Finish)
                .unwrap_err();
            assert!(err.needs_dictionary().is_some());
            dec.set_dictionary(dict).unwrap();
            let consumed = dec.total_in() as usize;
            dec.decompress_vec(&compressed[consumed..], &mut out, flate2::FlushDecompress::Finish)
                .unwrap();
        }
        out
    };
    assert_eq!(decoded, input);
});
