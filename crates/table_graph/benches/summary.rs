use std::fmt::Write;
use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use table_graph::prelude::{parse_summary, TableGraph};

const TABLE_COUNTS: [usize; 4] = [8, 32, 128, 512];

const LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Synthesizes a dependency summary with `count` tables and a label roughly
/// every third cell below the diagonal.
fn make_summary(count: usize) -> String {
    let mut text = String::new();
    text.push_str("#pipeline ingress\n");
    for i in 0..count {
        let mut prefix = String::with_capacity(count);
        for j in 0..count {
            if j < i && (i + j) % 3 == 0 {
                prefix.push(LABELS[(i + j) % LABELS.len()]);
            } else {
                prefix.push('-');
            }
        }
        writeln!(text, "{prefix} ^ {i} - t{i} : exact").expect("write to string");
    }
    text.push_str("#dependencies\n");
    text.push_str("A : IXBAR_READ OUTPUT\n");
    text.push_str("B : CONTROL_TABLE_HIT\n");
    text.push_str("C : ANTI_TABLE_READ\n");
    text.push_str("D : CONTROL_DEFAULT_NEXT_TABLE\n");
    text
}

fn bench_parse_and_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");
    group
        .sample_size(20)
        .warm_up_time(Duration::from_secs(1))
        .measurement_time(Duration::from_secs(2));

    for count in TABLE_COUNTS {
        let text = make_summary(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("parse", count), &text, |b, text| {
            b.iter(|| parse_summary(black_box(text)).expect("valid summary"));
        });

        let summary = parse_summary(&text).expect("valid summary");
        group.bench_with_input(BenchmarkId::new("build", count), &summary, |b, summary| {
            b.iter(|| TableGraph::from_summary(black_box(summary)).expect("valid graph"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_and_build);
criterion_main!(benches);
