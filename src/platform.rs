use std::path::Path;
use tracing::debug;

/// Opens `path` in the host file manager. Failures are only logged.
pub fn open_folder<P: AsRef<Path>>(path: P) {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return;
    }

    let opener = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    if let Err(err) = std::process::Command::new(opener).arg(path).spawn() {
        debug!(opener, error = %err, "could not open {}", path.display());
    }
}
