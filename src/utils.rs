//! wasm 运行环境相关的初始化。

use log::Level;

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}

/// 把 `log` 输出接到浏览器控制台。重复调用时保留第一个 logger，并在控制台提示。
pub fn init_logging(level: Level) {
    if let Err(error) = console_log::init_with_level(level) {
        web_sys::console::warn_1(&format!("console logger not installed: {error}").into());
    }
}
