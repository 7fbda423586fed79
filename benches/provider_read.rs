//! Performance benchmarks for the read + decode path.
//!
//! The watcher is disabled here: registration happens once per path, so the
//! steady-state read cost is what matters.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use liveconf::codec::{Codec, JsonCodec, YamlCodec};
use liveconf::provider::{FileProvider, Provider};
use std::fs;
use tempfile::TempDir;

const YAML_DOC: &str = r#"
name: benchmark
server:
  host: localhost
  port: 8080
database:
  url: postgres://localhost/bench
  max_connections: 32
features:
  - caching
  - tracing
  - compression
"#;

const JSON_DOC: &str = r#"{
  "name": "benchmark",
  "server": {"host": "localhost", "port": 8080},
  "database": {"url": "postgres://localhost/bench", "max_connections": 32},
  "features": ["caching", "tracing", "compression"]
}"#;

fn benchmark_provider_read(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bench.yaml");
    fs::write(&config_path, YAML_DOC).unwrap();

    let provider = FileProvider::builder().without_watcher().build();
    let key = config_path.to_str().unwrap();

    let mut group = c.benchmark_group("provider_read");
    group.throughput(Throughput::Bytes(YAML_DOC.len() as u64));
    group.bench_function("file_read", |b| {
        b.iter(|| {
            let content = provider.read(black_box(key)).unwrap();
            black_box(content);
        });
    });
    group.finish();
}

fn benchmark_codec_unmarshal(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_unmarshal");
    group.bench_function("yaml", |b| {
        b.iter(|| {
            let doc = YamlCodec.unmarshal(black_box(YAML_DOC.as_bytes())).unwrap();
            black_box(doc);
        });
    });
    group.bench_function("json", |b| {
        b.iter(|| {
            let doc = JsonCodec.unmarshal(black_box(JSON_DOC.as_bytes())).unwrap();
            black_box(doc);
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_provider_read, benchmark_codec_unmarshal);
criterion_main!(benches);
