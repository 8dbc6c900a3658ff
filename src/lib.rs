pub mod api;
pub mod chain;
pub mod config;
pub mod ffmpeg;
pub mod init;
pub mod local;
pub mod menu;
pub mod overlay;
pub mod pipeline;
pub mod platform;
pub mod script;
pub mod tts;

pub(crate) fn logv(tag: &str, message: &str) {
    eprintln!("[{}] {}", tag, message);
}

pub(crate) fn logi(message: impl AsRef<str>) {
    logv("INFO", message.as_ref());
}

pub(crate) fn logok(message: impl AsRef<str>) {
    logv("OK", message.as_ref());
}

pub(crate) fn logw(message: impl AsRef<str>) {
    logv("WARN", message.as_ref());
}

/// Timestamp suffix used for every artifact written during a run.
pub fn file_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
