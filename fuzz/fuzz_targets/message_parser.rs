//! Fuzz target for IRC line decoding
//!
//! Feeds arbitrary bytes to the decoder and event translation; neither may
//! panic, and anything that decodes must survive an encode/decode cycle.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > logbot::MAX_IRC_LINE_LEN {
        return;
    }

    let _ = logbot::Event::decode(data);

    if let Ok(message) = logbot::message::decode(data) {
        let line = message.to_string();
        let _ = line.parse::<logbot::Message>();
    }
});
