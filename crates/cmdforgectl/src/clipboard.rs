//! System clipboard
//!
//! macOS pipes into `pbcopy`; everywhere else goes through `arboard`. The
//! arboard handle is kept for the life of the `SystemClipboard`, so on X11
//! the copied text stays available while the interactive session runs.

use cmdforge_common::{ClipboardError, ClipboardSink};
use tracing::debug;

#[derive(Default)]
pub struct SystemClipboard {
    #[cfg(not(target_os = "macos"))]
    handle: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(target_os = "macos")]
impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        use std::io::{ErrorKind, Write};
        use std::process::{Command, Stdio};

        let mut child = Command::new("pbcopy")
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ClipboardError::Unavailable("pbcopy not found".to_string()),
                _ => ClipboardError::Io(e),
            })?;

        // stdin is dropped at the end of this statement so pbcopy sees EOF
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };
        let status = child.wait()?;
        written?;

        if !status.success() {
            return Err(ClipboardError::Tool {
                tool: "pbcopy".to_string(),
                message: status.to_string(),
            });
        }
        debug!(bytes = text.len(), "copied to clipboard via pbcopy");
        Ok(())
    }
}

#[cfg(not(target_os = "macos"))]
impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = match self.handle.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().map_err(from_arboard)?,
        };

        clipboard.set_text(text).map_err(from_arboard)?;
        debug!(bytes = text.len(), "copied to clipboard");

        // A handle that failed is dropped so the next copy reconnects
        self.handle = Some(clipboard);
        Ok(())
    }
}

#[cfg(not(target_os = "macos"))]
fn from_arboard(error: arboard::Error) -> ClipboardError {
    match error {
        arboard::Error::ClipboardNotSupported => {
            ClipboardError::Unavailable("no clipboard on this system".to_string())
        }
        other => ClipboardError::Tool {
            tool: "arboard".to_string(),
            message: other.to_string(),
        },
    }
}
