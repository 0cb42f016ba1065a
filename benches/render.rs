//! Frame rendering benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use quill::{Cursor, Renderer, TextBuffer, Viewport};

fn sample_buffer(lines: usize) -> TextBuffer {
    let mut buffer = TextBuffer::new(8);
    buffer.load((0..lines).map(|i| format!("{}:\tfn line_{}() {{ body(); }}", i, i).into_bytes()));
    buffer
}

fn bench_compose_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let buffer = sample_buffer(10_000);
    let viewport = Viewport::new(48, 160);
    let mut renderer = Renderer::new();
    group.throughput(Throughput::Elements(viewport.rows() as u64));

    group.bench_function("compose_frame", |b| {
        b.iter(|| {
            let frame = renderer.compose(black_box(&buffer), &viewport, Some("status"));
            black_box(frame.len())
        })
    });

    group.finish();
}

fn bench_edit_and_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    group.bench_function("insert_scroll_compose", |b| {
        b.iter(|| {
            let mut buffer = sample_buffer(500);
            let mut viewport = Viewport::new(24, 80);
            let mut renderer = Renderer::new();

            buffer.set_cursor(Cursor::new(0, 250));
            for byte in b"inserted text\t" {
                buffer.insert_char(*byte);
            }
            viewport.scroll_to_cursor(buffer.cursor().cy, buffer.render_x());
            black_box(renderer.compose(&buffer, &viewport, None).len())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_compose_frame, bench_edit_and_scroll);

criterion_main!(benches);
