//! Fuzz target for Channel::parse
//!
//! Channel names arrive from the push transport verbatim. Parsing must
//! never panic, and every successfully parsed channel must render back to
//! the same name.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lounge_proto::Channel;

fuzz_target!(|name: &str| {
    if let Some(channel) = Channel::parse(name) {
        assert_eq!(Channel::parse(&channel.name()), Some(channel));
    }
});
