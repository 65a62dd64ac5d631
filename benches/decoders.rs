use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mcprobe::{parsers::ParserSelector, protocols::write_varint};
use rand::Rng;

fn netty_response(json: &str) -> Vec<u8> {
    let mut data = vec![0x00];
    write_varint(&mut data, json.len() as i32);
    data.extend_from_slice(json.as_bytes());

    let mut packet = Vec::new();
    write_varint(&mut packet, data.len() as i32);
    packet.extend(data);
    packet
}

fn kick_packet(reason: &str) -> Vec<u8> {
    let units = reason.encode_utf16().collect::<Vec<_>>();
    let mut packet = vec![0xff];
    packet.extend_from_slice(&(units.len() as u16).to_be_bytes());
    for unit in units {
        packet.extend_from_slice(&unit.to_be_bytes());
    }
    packet
}

fn criterion_benchmark(c: &mut Criterion) {
    let parsers = ParserSelector::default();

    let netty = netty_response(
        r#"{"version":{"name":"1.21.1","protocol":767},"players":{"max":100,"online":1,"sample":[{"name":"a","id":"e8f5b8a4-3c5e-4b0e-9a4e-3f2b1c0d9e8f"}]},"description":{"text":"hello","extra":[{"text":" world","color":"gold"}]}}"#,
    );
    let legacy = kick_packet("§1\078\01.6.4\0A Minecraft Server\05\020");
    let beta = kick_packet("A Minecraft Server§5§20");

    c.bench_function("parse_netty", |b| b.iter(|| parsers.parse(black_box(&netty))));
    // the legacy shapes have to get through every decoder before them
    c.bench_function("parse_beta", |b| b.iter(|| parsers.parse(black_box(&beta))));

    let samples = [netty, legacy, beta];
    let mut rng = rand::thread_rng();
    c.bench_function("parse_mixed", |b| {
        b.iter(|| parsers.parse(black_box(&samples[rng.gen_range(0..samples.len())])))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
