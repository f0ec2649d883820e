//! Benchmarks for line accumulation and image reconstruction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use vfs301_core::constants::{line, FIRST_BLOCK_SIZE, NEXT_BLOCK_SIZE};
use vfs301_core::{reconstruct, Capture, LineWidth, ScanLine};

/// Build a block of records whose samples change every `period` lines
fn swipe_block(start: u16, len: usize, period: u16) -> Vec<u8> {
    let mut buf = Vec::with_capacity(len);
    let mut counter = start;
    while buf.len() + line::RECORD_SIZE <= len {
        let value = ((counter / period) % 2) as u8 * 96;
        buf.extend_from_slice(&ScanLine::new(counter, [value; line::SAMPLES]).encode());
        counter = counter.wrapping_add(1);
    }
    buf.resize(len, 0);
    buf
}

fn bench_append(c: &mut Criterion) {
    let first = swipe_block(0, FIRST_BLOCK_SIZE, 4);
    let next = swipe_block(291, NEXT_BLOCK_SIZE, 4);

    c.bench_function("append first + next block", |b| {
        let mut capture = Capture::new(LineWidth::Samples);
        b.iter(|| {
            capture.append(true, black_box(&first)).ok();
            capture.append(false, black_box(&next)).ok();
            black_box(capture.len())
        });
    });
}

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct");

    for blocks in [1usize, 4, 16].iter() {
        let mut capture = Capture::new(LineWidth::Samples);
        capture.append(true, &swipe_block(0, FIRST_BLOCK_SIZE, 3)).ok();
        for i in 1..*blocks {
            capture
                .append(false, &swipe_block((i * 292) as u16, NEXT_BLOCK_SIZE, 3))
                .ok();
        }

        group.bench_with_input(BenchmarkId::from_parameter(blocks), &capture, |b, capture| {
            b.iter(|| black_box(reconstruct(black_box(capture))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_append, bench_reconstruct);
criterion_main!(benches);
