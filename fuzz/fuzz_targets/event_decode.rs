//! Fuzz target for PushEvent::decode
//!
//! The decoder sits at the transport boundary and consumes untrusted
//! input: arbitrary event names and arbitrary JSON payloads on any
//! channel. It must never panic — unknown names decode to None and
//! malformed payloads for known names return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lounge_proto::{Channel, PushEvent};

fuzz_target!(|data: (u8, u64, &str, &str)| {
    let (channel_kind, id, event, raw_payload) = data;

    let channel = match channel_kind % 3 {
        0 => Channel::VisitorPrivate(id),
        1 => Channel::ProviderPrivate(id),
        _ => Channel::LoungeQueue,
    };

    // Payload from arbitrary text: valid JSON when it parses, Null otherwise.
    let payload: serde_json::Value =
        serde_json::from_str(raw_payload).unwrap_or(serde_json::Value::Null);

    let _ = PushEvent::decode(channel, event, &payload);
});
