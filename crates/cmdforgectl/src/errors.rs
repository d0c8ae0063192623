//! Error codes and exit status for cmdforgectl

use cmdforge_common::{CatalogError, ClipboardError, ConfigError};
use thiserror::Error;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when the catalog or config cannot be loaded or is inconsistent
pub const EXIT_INVALID_CATALOG: i32 = 65;

/// Exit code when a template id does not exist
pub const EXIT_UNKNOWN_TEMPLATE: i32 = 66;

/// Exit code when the clipboard could not be written
pub const EXIT_CLIPBOARD_UNAVAILABLE: i32 = 70;

/// Failures raised by cmdforgectl itself
#[derive(Error, Debug)]
pub enum CtlError {
    #[error("Unknown template id: {0}")]
    UnknownTemplate(String),

    #[error("Template '{template}' has no extra option '{param}' (available: {available})")]
    UnknownExtraOption {
        template: String,
        param: String,
        available: String,
    },

    #[error("Command was not copied to the clipboard: {0}")]
    ClipboardFailed(#[source] ClipboardError),
}

/// Map an error chain to the process exit code
pub fn exit_code(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(ctl) = cause.downcast_ref::<CtlError>() {
            return match ctl {
                CtlError::UnknownTemplate(_) => EXIT_UNKNOWN_TEMPLATE,
                CtlError::UnknownExtraOption { .. } => EXIT_GENERAL_ERROR,
                CtlError::ClipboardFailed(_) => EXIT_CLIPBOARD_UNAVAILABLE,
            };
        }
        if cause.is::<CatalogError>() || cause.is::<ConfigError>() {
            return EXIT_INVALID_CATALOG;
        }
    }
    EXIT_GENERAL_ERROR
}
