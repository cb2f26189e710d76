use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use csvbind::{CsvParser, FieldType, Record, Schema, Value};

fn make_input(rows: usize) -> String {
    let mut out = String::with_capacity(rows * 48);
    out.push_str("Id,Name,Score,Timestamp\n");
    for i in 0..rows {
        out.push_str(&format!(
            "{},\"Name_{}\",{}.5,2024-01-{:02} 12:00:00\n",
            i,
            i,
            i * 10,
            i % 28 + 1
        ));
    }
    out
}

fn parser() -> CsvParser {
    CsvParser::new(
        Schema::builder()
            .column("Id", FieldType::Int)
            .column("Name", FieldType::String)
            .column("Score", FieldType::Float)
            .column("Timestamp", FieldType::nullable(FieldType::DateTime))
            .has_header(true)
            .build()
            .unwrap(),
    )
}

fn benchmark_parse_str(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_str");
    let parser = parser();

    for size in [1000, 10000, 100000].iter() {
        let input = make_input(*size);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| {
                let records: Vec<Record> = parser.parse(black_box(input.as_str()));
                black_box(records);
            });
        });
    }

    group.finish();
}

fn benchmark_parse_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_bytes");
    let parser = parser();

    for size in [1000, 10000, 100000].iter() {
        let input = make_input(*size).into_bytes();
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| {
                let records: Vec<Vec<Value>> = parser.parse(black_box(input.as_slice()));
                black_box(records);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parse_str, benchmark_parse_bytes);
criterion_main!(benches);
