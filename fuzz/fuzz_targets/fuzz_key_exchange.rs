#![no_main]

use libfuzzer_sys::fuzz_target;
use quicwire::crypto::{KeyExchange, P256KeyExchange};
use std::sync::OnceLock;

static LOCAL: OnceLock<P256KeyExchange> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    // Private key parsing must reject garbage without panicking
    let _ = P256KeyExchange::new(data);

    // Peer values are untrusted wire input
    let local = LOCAL.get_or_init(|| P256KeyExchange::generate().unwrap());
    if let Ok(shared) = local.calculate_shared_key(data) {
        assert_eq!(data.len(), 65);
        assert_eq!(shared.len(), 32);
    }
});
