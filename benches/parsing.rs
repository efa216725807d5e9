//! Benchmarks for IRC line decoding, encoding and event translation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logbot::encode::encode;
use logbot::{Event, Message};

/// Simple PING message
const SIMPLE_MESSAGE: &str = "PING :irc.example.com";

/// Message with prefix
const PREFIX_MESSAGE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// Message with IRCv3 tags
const TAGGED_MESSAGE: &str = "@time=2023-01-01T00:00:00.000Z;msgid=abc123;+example/tag=value :nick!user@host PRIVMSG #channel :Hello with tags!";

/// Numeric response
const NUMERIC_RESPONSE: &str = ":irc.server.net 001 nickname :Welcome to the IRC Network nickname!user@host";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Parsing");

    for (name, line) in [
        ("simple_ping", SIMPLE_MESSAGE),
        ("with_prefix", PREFIX_MESSAGE),
        ("with_tags", TAGGED_MESSAGE),
        ("numeric_response", NUMERIC_RESPONSE),
    ] {
        group.bench_with_input(BenchmarkId::new("decode", name), line, |b, s| {
            b.iter(|| {
                let msg = logbot::message::decode(black_box(s.as_bytes())).unwrap();
                black_box(msg)
            })
        });
    }

    group.finish();
}

fn benchmark_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Serialization");

    let with_prefix: Message = PREFIX_MESSAGE.parse().unwrap();
    let with_tags: Message = TAGGED_MESSAGE.parse().unwrap();

    group.bench_function("encode_join", |b| {
        b.iter(|| black_box(encode(black_box("JOIN"), &[black_box("#channel")])))
    });

    group.bench_function("encode_user", |b| {
        b.iter(|| black_box(encode("USER", black_box(&["logbot", "0", "*", "Log Bot"]))))
    });

    group.bench_function("with_prefix", |b| {
        b.iter(|| black_box(black_box(&with_prefix).to_string()))
    });

    group.bench_function("with_tags", |b| {
        b.iter(|| black_box(black_box(&with_tags).to_string()))
    });

    group.finish();
}

fn benchmark_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("Event Translation");

    group.bench_function("pubmsg", |b| {
        b.iter(|| {
            let event = Event::decode(black_box(PREFIX_MESSAGE.as_bytes())).unwrap();
            black_box(event)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_serialization,
    benchmark_events,
);

criterion_main!(benches);
