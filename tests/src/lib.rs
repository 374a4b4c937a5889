//! Shared helpers for the end-to-end tests.

use std::io::Write;
use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// MLLP start-of-block byte
pub const MLLP_START: u8 = 0x0B;
/// MLLP end-of-block byte
pub const MLLP_END: u8 = 0x1C;

/// Initialize the logger for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = Builder::new()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{}] {}: {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .try_init();
        log::info!("Test logger initialized");
    });
}

/// Wrap a message in an MLLP envelope, as a transport would deliver it.
pub fn mllp_frame(message: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(message.len() + 3);
    framed.push(MLLP_START);
    framed.extend_from_slice(message);
    framed.extend_from_slice(&[MLLP_END, b'\r']);
    framed
}

/// Strip an MLLP envelope, returning the message bytes inside it.
pub fn mllp_unframe(framed: &[u8]) -> Option<&[u8]> {
    let body = framed.strip_prefix(&[MLLP_START])?;
    let end = body.iter().rposition(|&b| b == MLLP_END)?;
    Some(&body[..end])
}
