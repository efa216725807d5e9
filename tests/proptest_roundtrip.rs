//! Property-based tests for line decoding.
//!
//! Uses proptest to generate random IRC components and verify that:
//! 1. Decoding never panics on arbitrary input
//! 2. Encoded commands decode back to the same params
//! 3. Event translation keeps sender, target and text intact

use proptest::prelude::*;
use logbot::encode::encode;
use logbot::{Event, EventKind, Message};

// =============================================================================
// STRATEGIES - Generators for valid IRC components
// =============================================================================

/// Valid IRC nickname: starts with letter or special char, followed by
/// letters, digits, or special chars.
fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

/// Valid hostname: simplified version
fn hostname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]+(\\.[a-z0-9]+)*").expect("valid regex")
}

/// Valid IRC channel name
fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[#&][a-zA-Z0-9_\\-]{1,49}").expect("valid regex")
}

/// Command name or three-digit numeric
fn command_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[A-Z]{3,10}").expect("valid regex"),
        prop::string::string_regex("[0-9]{3}").expect("valid regex"),
    ]
}

/// Middle param: non-empty, no space, no leading colon
fn middle_param_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[!-9;-~][!-~]{0,15}").expect("valid regex")
}

/// Message text that doesn't contain CR/LF/NUL
fn message_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0]{0,400}").expect("valid regex")
}

fn params_strategy() -> impl Strategy<Value = Vec<String>> {
    (
        prop::collection::vec(middle_param_strategy(), 0..6),
        prop::option::of(message_text_strategy()),
    )
        .prop_map(|(mut middle, trailing)| {
            middle.extend(trailing);
            middle
        })
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn decode_never_panics(raw in prop::collection::vec(any::<u8>(), 0..600)) {
        let _ = logbot::message::decode(&raw);
        let _ = Event::decode(&raw);
    }

    #[test]
    fn encoded_params_round_trip(command in command_strategy(), params in params_strategy()) {
        let bytes = encode(&command, &params);
        prop_assert!(bytes.ends_with(b"\r\n"));
        prop_assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), 1);

        let message = logbot::message::decode(&bytes).expect("encoded line decodes");
        prop_assert_eq!(message.command, command);
        prop_assert_eq!(message.params, params);
    }

    #[test]
    fn display_round_trip(command in command_strategy(), params in params_strategy()) {
        let message = Message::new(command, params);
        let reparsed: Message = message.to_string().parse().expect("display output parses");
        prop_assert_eq!(message, reparsed);
    }

    #[test]
    fn channel_privmsg_is_pubmsg(
        nick in nickname_strategy(),
        user in nickname_strategy(),
        host in hostname_strategy(),
        channel in channel_strategy(),
        text in message_text_strategy(),
    ) {
        prop_assume!(!text.starts_with('\x01'));

        let mut line = format!(":{nick}!{user}@{host} ").into_bytes();
        line.extend(encode("PRIVMSG", &[channel.as_str(), text.as_str()]));

        let event = Event::decode(&line).expect("valid line");
        prop_assert_eq!(event.kind, EventKind::PubMsg);
        prop_assert_eq!(event.nick(), nick.as_str());
        prop_assert_eq!(&event.target, &channel);
        prop_assert_eq!(event.argument(0), Some(text.as_str()));
    }
}
