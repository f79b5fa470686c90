use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use oxideflate::{DeflateOptions, DeflateWriter, Deflater, FlushStyle, Level, Strategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Text-like data: LCG over a small alphabet, compresses well.
fn gen_text(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push(b"etaoin shrdlu\n"[((s >> 33) % 14) as usize]);
    }
    out
}

/// Uniformly random bytes, effectively incompressible.
fn gen_random(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = vec![0u8; size];
    rng.fill(&mut out[..]);
    out
}

fn compress_level(data: &[u8], level: i32) -> Vec<u8> {
    let opts = DeflateOptions {
        level: Level::new(level),
        ..Default::default()
    };
    oxideflate::compress_with_options(data, &opts).unwrap()
}

fn write_ratio_snapshot() {
    let data = gen_text(2 * 1024 * 1024, 123);
    let mut csv = String::from("level,compressed_bytes,input_bytes,ratio\n");
    for level in 0..=9 {
        let compressed = compress_level(&data, level);
        let ratio = compressed.len() as f64 / data.len() as f64;
        csv.push_str(&format!(
            "{level},{},{},{}\n",
            compressed.len(),
            data.len(),
            ratio
        ));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_one_shot_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("one_shot_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let data = gen_text(size, 1);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(compress_level(black_box(&data), 6)));
        });
    }
    g.finish();
}

fn bench_ratio_vs_level(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("compression_ratio_vs_level");
    let data = gen_text(1024 * 1024, 3);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for level in 0..=9 {
        g.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, level| {
            b.iter(|| {
                let compressed = compress_level(&data, *level);
                black_box(compressed.len() as f64 / data.len() as f64);
            });
        });
    }
    g.finish();
}

fn bench_strategies(c: &mut Criterion) {
    let mut g = c.benchmark_group("strategy");
    let data = gen_text(1024 * 1024, 4);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for strategy in Strategy::ALL {
        let opts = DeflateOptions {
            strategy,
            raw: true,
            ..Default::default()
        };
        g.bench_function(format!("{strategy:?}"), |b| {
            b.iter(|| black_box(oxideflate::compress_with_options(&data, &opts).unwrap()));
        });
    }
    g.finish();
}

fn bench_incompressible(c: &mut Criterion) {
    let mut g = c.benchmark_group("incompressible");
    let data = gen_random(1024 * 1024, 5);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for level in [0, 1, 6, 9] {
        g.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, level| {
            b.iter(|| black_box(compress_level(&data, *level)));
        });
    }
    g.finish();
}

fn bench_output_window(c: &mut Criterion) {
    let mut g = c.benchmark_group("output_window_bytes");
    let data = gen_text(1024 * 1024, 6);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for window in [64usize, 1024, 16 * 1024, 256 * 1024] {
        g.bench_with_input(BenchmarkId::from_parameter(window), &window, |b, window| {
            let mut buf = vec![0u8; *window];
            b.iter(|| {
                let mut d = Deflater::new(Level::new(6), Strategy::Default, true).unwrap();
                d.set_input_bytes(&data).unwrap();
                let mut total = 0usize;
                while !d.finished() {
                    total += d.deflate(&mut buf, 0, *window, FlushStyle::Finish).unwrap();
                }
                black_box(total);
            });
        });
    }
    g.finish();
}

fn bench_sync_flush_messages(c: &mut Criterion) {
    // Many small messages, each made decodable with a sync flush.
    let mut g = c.benchmark_group("sync_flush_messages");
    let messages: Vec<Vec<u8>> = (0..1000u64)
        .map(|i| format!("{{\"event\":\"tick\",\"seq\":{i},\"price\":{}}}", i * 7 % 1000).into_bytes())
        .collect();
    let total: usize = messages.iter().map(Vec::len).sum();
    g.throughput(Throughput::Bytes(total as u64));
    g.bench_function("writer_flush_per_message", |b| {
        b.iter(|| {
            let opts = DeflateOptions::raw(Level::new(6));
            let mut w = DeflateWriter::new(Vec::with_capacity(total), &opts).unwrap();
            for msg in &messages {
                w.write_all(msg).unwrap();
                w.flush().unwrap();
            }
            black_box(w.finish().unwrap());
        });
    });
    g.finish();
}

fn bench_reset_reuse(c: &mut Criterion) {
    let mut g = c.benchmark_group("stream_reuse");
    let msg = gen_text(4 * 1024, 7);
    let mut buf = vec![0u8; 8 * 1024];

    g.bench_function("create_per_message", |b| {
        b.iter(|| {
            let mut d = Deflater::new(Level::new(6), Strategy::Default, true).unwrap();
            d.set_input_bytes(&msg).unwrap();
            black_box(d.deflate(&mut buf, 0, 8 * 1024, FlushStyle::Finish).unwrap());
        });
    });

    let mut d = Deflater::new(Level::new(6), Strategy::Default, true).unwrap();
    g.bench_function("reset_per_message", |b| {
        b.iter(|| {
            d.reset().unwrap();
            d.set_input_bytes(&msg).unwrap();
            black_box(d.deflate(&mut buf, 0, 8 * 1024, FlushStyle::Finish).unwrap());
        });
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_one_shot_speed,
    bench_ratio_vs_level,
    bench_strategies,
    bench_incompressible,
    bench_output_window,
    bench_sync_flush_messages,
    bench_reset_reuse
);
criterion_main!(benches);
