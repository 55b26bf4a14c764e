use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use cvd_matrix::core::color::{simulate, Rgb};
use cvd_matrix::core::stylesheet::rewrite;
use cvd_matrix::models::Deficiency;
use std::hint::black_box;

fn sample_stylesheet(rules: usize) -> String {
    let mut css = String::from(":root { --accent: #0366d6; }\n");
    for i in 0..rules {
        css.push_str(&format!(
            "#item-{i} .label:hover {{ color: #{:02x}{:02x}{:02x}; background: url(\"bg-{i}.png\") #fff; border: 1px solid #ccc8; }}\n",
            (i * 7) % 256,
            (i * 13) % 256,
            (i * 29) % 256,
        ));
        if i % 10 == 0 {
            css.push_str("@media (prefers-color-scheme: dark) { body { color: #eee; background-color: #111; } }\n");
        }
    }
    css
}

fn bench_rewrite(c: &mut Criterion) {
    let css = sample_stylesheet(500);
    let mut group = c.benchmark_group("rewrite");
    group.throughput(Throughput::Bytes(css.len() as u64));
    for deficiency in Deficiency::ALL {
        group.bench_function(deficiency.as_str(), |b| {
            b.iter(|| rewrite(black_box(&css), deficiency).unwrap());
        });
    }
    group.finish();
}

fn bench_simulate(c: &mut Criterion) {
    c.bench_function("simulate_protanopia", |b| {
        b.iter(|| simulate(black_box(Rgb::new(0x12, 0x80, 0xf3)), Deficiency::Protanopia));
    });
}

criterion_group!(benches, bench_rewrite, bench_simulate);
criterion_main!(benches);
