use criterion::{criterion_group, criterion_main};

mod mqtt;

criterion_group!(
    benches,
    mqtt::codec::bench_remaining_length,
    mqtt::codec::bench_build,
    mqtt::codec::bench_decode,
    mqtt::session::bench_exchanges
);
criterion_main!(benches);
