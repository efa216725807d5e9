//! Integration tests for line decoding and encoding
//!
//! These tests decode wire lines, encode them again, and check that the
//! result decodes to the same message.

use logbot::encode::{encode, IrcEncode};
use logbot::{DecodeError, Event, EventKind, Message};

fn round_trip(original: &str) {
    let message: Message = original.parse().expect("Failed to parse message");
    let serialized = message.to_string();

    let reparsed: Message = serialized.parse().expect("Failed to reparse message");
    assert_eq!(message, reparsed, "{original:?} -> {serialized:?}");
}

#[test]
fn test_message_round_trip_simple() {
    round_trip("PING :irc.example.com");
}

#[test]
fn test_message_round_trip_with_prefix() {
    round_trip(":nick!user@host PRIVMSG #channel :Hello, world!");
}

#[test]
fn test_message_round_trip_with_tags() {
    round_trip("@time=2023-01-01T00:00:00.000Z;msgid=abc123 :nick!user@host PRIVMSG #channel :Tagged message");
}

#[test]
fn test_message_round_trip_numeric_response() {
    round_trip(":server 001 nickname :Welcome to the IRC Network");
}

#[test]
fn test_message_round_trip_kick_with_reason() {
    round_trip(":op!o@h KICK #channel victim :go away");
}

#[test]
fn test_trailing_with_leading_colon_survives() {
    let bytes = encode("PRIVMSG", &["#c", ":)"]);
    assert_eq!(bytes, b"PRIVMSG #c ::)\r\n");

    let message = logbot::message::decode(&bytes).unwrap();
    assert_eq!(message.params, vec!["#c", ":)"]);
}

#[test]
fn test_empty_trailing_survives() {
    let bytes = encode("TOPIC", &["#c", ""]);
    assert_eq!(bytes, b"TOPIC #c :\r\n");

    let message = logbot::message::decode(&bytes).unwrap();
    assert_eq!(message.params, vec!["#c", ""]);
}

#[test]
fn test_message_construction_and_parsing() {
    let message = Message {
        tags: Some("time=2023-01-01T00:00:00Z;msgid=test123".into()),
        prefix: Some("testbot!test@example.com".into()),
        command: "PRIVMSG".into(),
        params: vec!["#test".into(), "Integration test message".into()],
    };

    let serialized = message.to_string();
    assert_eq!(
        serialized,
        "@time=2023-01-01T00:00:00Z;msgid=test123 :testbot!test@example.com PRIVMSG #test :Integration test message"
    );

    let parsed: Message = serialized
        .parse()
        .expect("Failed to parse constructed message");
    assert_eq!(message, parsed);
}

#[test]
fn test_encode_trait_matches_free_function() {
    let message = Message::new("USER", ["bot", "0", "*", "Log Bot"]);
    assert_eq!(message.to_bytes(), encode("USER", &["bot", "0", "*", "Log Bot"]));
}

#[test]
fn test_malformed_lines() {
    assert_eq!(logbot::message::decode(b""), Err(DecodeError::EmptyMessage));
    assert_eq!(logbot::message::decode(b"\r\n"), Err(DecodeError::EmptyMessage));
    assert!(matches!(
        logbot::message::decode(b":prefix.only"),
        Err(DecodeError::MissingCommand(_))
    ));
    assert!(matches!(
        logbot::message::decode(&[0x50, 0x49, 0xff, 0x0a]),
        Err(DecodeError::InvalidUtf8(_))
    ));
}

#[test]
fn test_decoded_events() {
    let cases: &[(&[u8], EventKind, &str, &[&str])] = &[
        (b":a!u@h JOIN #rust\r\n", EventKind::Join, "#rust", &[]),
        (b":a!u@h PART #rust :bye\r\n", EventKind::Part, "#rust", &["bye"]),
        (b":a!u@h PRIVMSG #rust :hi all\r\n", EventKind::PubMsg, "#rust", &["hi all"]),
        (b":a!u@h PRIVMSG bot :psst\r\n", EventKind::PrivMsg, "bot", &["psst"]),
        (b":a!u@h NOTICE bot :note\r\n", EventKind::Notice, "bot", &["note"]),
        (b":a!u@h INVITE bot #secret\r\n", EventKind::Invite, "bot", &["#secret"]),
        (b":a!u@h KICK #rust b :out\r\n", EventKind::Kick, "#rust", &["b", "out"]),
        (b":a!u@h MODE #rust +o b\r\n", EventKind::Mode, "#rust", &["+o", "b"]),
        (b":a!u@h QUIT :gone\r\n", EventKind::Quit, "", &["gone"]),
        (b":srv 372 bot :motd line\r\n", EventKind::Numeric, "bot", &["motd line"]),
    ];

    for (raw, kind, target, arguments) in cases {
        let event = Event::decode(raw).unwrap();
        assert_eq!(event.kind, *kind, "{}", String::from_utf8_lossy(raw));
        assert_eq!(event.target, *target);
        assert_eq!(event.arguments, *arguments);
    }
}
