use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sloth_vdf::{EngineHandle, SlothConfig};

const ROUNDS: u64 = 5;

fn handle(block_size: usize) -> EngineHandle {
    let cfg = SlothConfig { parallel_blocks: false, ..SlothConfig::default() };
    let seed: Vec<u8> = (0..block_size).map(|i| (i * 31 + 7) as u8).collect();
    EngineHandle::with_config(&seed, block_size, &cfg).expect("derive prime")
}

/// Encode vs decode of one block across block sizes.
fn bench_permutation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sloth_permutation");
    for block_size in [64usize, 128, 256] {
        let handle = handle(block_size);
        // Leading zero byte keeps the block inside the field.
        let mut block = vec![0xa5u8; block_size];
        block[0] = 0;
        let encoded = handle.encode(ROUNDS, &block).expect("encode");

        group.throughput(Throughput::Bytes(block_size as u64));
        group.bench_with_input(BenchmarkId::new("encode", block_size), &block, |b, block| {
            b.iter(|| handle.encode(ROUNDS, block).expect("encode"))
        });
        group.bench_with_input(BenchmarkId::new("decode", block_size), &encoded, |b, encoded| {
            b.iter(|| handle.decode(ROUNDS, encoded).expect("decode"))
        });
        group.bench_with_input(BenchmarkId::new("verify", block_size), &encoded, |b, encoded| {
            b.iter(|| handle.verify_proof(ROUNDS, &block, encoded).expect("verify"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_permutation);
criterion_main!(benches);
