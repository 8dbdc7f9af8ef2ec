use criterion::Criterion;
use libmqtt::network::application::mqtt::{Client, ConnectOptions, QoS};
use libmqtt::network::{Close, Connection, Open, Read, Transport, Write};
use std::collections::VecDeque;

/// Answers every request the way a well-behaved broker would.
#[derive(Default)]
struct AutoBroker {
    pending: VecDeque<u8>,
}

impl Open for AutoBroker {
    type Error = ();
    fn open(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Read for AutoBroker {
    type Error = ();
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for AutoBroker {
    type Error = ();
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        match buf[0] >> 4 {
            1 => self.pending.extend([0x20, 0x02, 0x00, 0x00]),
            // SUBSCRIBE with one topic: grant the requested QoS.
            8 => self
                .pending
                .extend([0x90, 0x03, buf[2], buf[3], buf[buf.len() - 1]]),
            10 => self.pending.extend([0xB0, 0x02, buf[2], buf[3]]),
            12 => self.pending.extend([0xD0, 0x00]),
            _ => {}
        }
        Ok(buf.len())
    }
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for AutoBroker {
    type Error = ();
    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Connection for AutoBroker {}
impl Transport for AutoBroker {}

pub fn bench_exchanges(c: &mut Criterion) {
    let mut client = Client::new(AutoBroker::default());
    client.connect(&ConnectOptions::new("bench")).unwrap();

    let mut group = c.benchmark_group("session");
    group.bench_function("ping", |b| b.iter(|| client.ping().unwrap()));
    group.bench_function("subscribe", |b| {
        b.iter(|| client.subscribe("sensors/#", QoS::AtLeastOnce).unwrap())
    });
    group.bench_function("unsubscribe", |b| {
        b.iter(|| client.unsubscribe("sensors/#").unwrap())
    });
    group.bench_function("publish", |b| {
        b.iter(|| client.publish("sensors/temperature", "23.5").unwrap())
    });
    group.finish();
}
