#![no_main]

use libfuzzer_sys::fuzz_target;
use origin_wire::{ClientMessage, ServerMessage};

// Decoding arbitrary bytes never panics, and whatever decodes re-encodes
// to an equal message.
fuzz_target!(|data: &[u8]| {
    if let Ok(message) = ClientMessage::decode(data) {
        let bytes = message.encode().expect("decoded message re-encodes");
        assert_eq!(ClientMessage::decode(&bytes).ok(), Some(message));
    }
    if let Ok(message) = ServerMessage::decode(data) {
        let bytes = message.encode().expect("decoded message re-encodes");
        assert_eq!(ServerMessage::decode(&bytes).ok(), Some(message));
    }
});
