use criterion::{black_box, criterion_group, criterion_main, Criterion};
use udpnat::{Packet, PACKET_LEN};

fn benchmark_encode(c: &mut Criterion) {
    let ping = Packet::Ping { delay_secs: 300 };

    c.bench_function("encode_ping_packet", |b| {
        b.iter(|| black_box(&ping).encode());
    });

    c.bench_function("encode_reply_packet", |b| {
        b.iter(|| black_box(&Packet::Reply).encode());
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let ping_wire = Packet::Ping { delay_secs: 300 }.encode();
    let handshake_wire = Packet::Slave.encode();
    assert_eq!(ping_wire.len(), PACKET_LEN);

    c.bench_function("decode_ping_packet", |b| {
        b.iter(|| Packet::decode(black_box(&ping_wire)));
    });

    c.bench_function("decode_handshake_packet", |b| {
        b.iter(|| Packet::decode(black_box(&handshake_wire)));
    });
}

criterion_group!(benches, benchmark_encode, benchmark_decode);
criterion_main!(benches);
