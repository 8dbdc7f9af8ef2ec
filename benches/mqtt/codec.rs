use criterion::{Criterion, Throughput};
use libmqtt::network::application::mqtt::{
    ConnectOptions, PacketIdentifier, PublishFlags, QoS, builder, decode, remaining_length,
};
use std::hint::black_box;

pub fn bench_remaining_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("remaining_length");
    for value in [0usize, 127, 16_383, 2_097_151, 268_435_455] {
        let encoded = remaining_length::encode(value).unwrap();
        group.bench_function(format!("encode/{value}"), |b| {
            b.iter(|| remaining_length::encode(black_box(value)).unwrap())
        });
        group.bench_function(format!("decode/{value}"), |b| {
            b.iter(|| remaining_length::decode(black_box(&encoded)).unwrap())
        });
    }
    group.finish();
}

pub fn bench_build(c: &mut Criterion) {
    let options = ConnectOptions {
        username: Some("ranma1988"),
        password: Some("secret"),
        ..ConnectOptions::new("cupz")
    };
    let message = "x".repeat(512);

    let mut group = c.benchmark_group("build");
    group.bench_function("connect", |b| {
        b.iter(|| {
            builder::connect(black_box(&options))
                .unwrap()
                .to_bytes()
                .unwrap()
        })
    });
    group.throughput(Throughput::Bytes(message.len() as u64));
    group.bench_function("publish/512", |b| {
        b.iter(|| {
            builder::publish(black_box("sensors/temperature"), &message, PublishFlags::default())
                .unwrap()
                .to_bytes()
                .unwrap()
        })
    });
    group.bench_function("subscribe", |b| {
        b.iter(|| {
            builder::subscribe(PacketIdentifier(black_box(42)), &[("sensors/#", QoS::AtLeastOnce)])
                .unwrap()
                .to_bytes()
                .unwrap()
        })
    });
    group.finish();
}

pub fn bench_decode(c: &mut Criterion) {
    let message = "x".repeat(512);
    let frame = builder::publish("sensors/temperature", &message, PublishFlags::default())
        .unwrap()
        .to_bytes()
        .unwrap();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(frame.len() as u64));
    group.bench_function("publish/512", |b| {
        b.iter(|| {
            let packet = decode(black_box(&frame)).unwrap();
            packet.publish().unwrap().map(|p| p.payload.len())
        })
    });
    group.bench_function("pingresp", |b| {
        b.iter(|| decode(black_box(&[0xD0, 0x00])).unwrap())
    });
    group.finish();
}
