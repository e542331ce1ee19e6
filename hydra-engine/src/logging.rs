//! Browser-console logging through the `log` facade.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install the panic hook and console logger. Safe to call more than once.
pub fn init_logging(level: log::LevelFilter) {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Trace));
    });
    log::set_max_level(level);
}
