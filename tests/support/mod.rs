//! Shared helpers for the integration tests, mirroring the teacher
//! crate's own `tests/util/mod.rs::init()` — a one-time `env_logger`
//! init so `RUST_LOG=edgeio=trace cargo test -- --nocapture` shows the
//! reactor's own `trace!`/`debug!` output.
#![allow(dead_code)]

use std::sync::Once;

static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
