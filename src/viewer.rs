//! Hand a rendered chart to the desktop image viewer

use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

fn opener_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Launch the viewer without waiting for it. Returns whether it started.
pub fn open_image(path: &Path) -> bool {
    let mut cmd = opener_command(path);
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

    match cmd.spawn() {
        Ok(child) => {
            debug!("Opened {} in viewer (pid {})", path.display(), child.id());
            true
        }
        Err(e) => {
            warn!("Could not open {} in an image viewer: {}", path.display(), e);
            false
        }
    }
}
