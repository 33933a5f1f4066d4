use std::path::PathBuf;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_IO: &str = "PATCH-ERR-IO";
pub const ERR_RULES: &str = "PATCH-ERR-RULES";
pub const ERR_RULE: &str = "PATCH-ERR-RULE";
pub const ERR_PARSE: &str = "PATCH-ERR-PARSE";
pub const ERR_NOT_FOUND: &str = "PATCH-ERR-NOT-FOUND";
pub const ERR_SHAPE: &str = "PATCH-ERR-SHAPE";
pub const ERR_OUTPUT: &str = "PATCH-ERR-OUTPUT";

/// Every way a patch run can fail. All of them are fatal: the run stops and
/// the destination file is left as it was.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("cannot {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule set {}: {source}", .path.display())]
    RuleSet {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid rule for {subject}: {message}")]
    InvalidRule { subject: String, message: String },

    #[error("failed to parse {file}:\n  {}", .messages.join("\n  "))]
    Parse { file: String, messages: Vec<String> },

    #[error("{what} not found")]
    NodeNotFound { what: String },

    #[error("constructor of class '{class}' has an unexpected shape: {message}")]
    UnexpectedShape { class: String, message: String },

    #[error("patched output for {file} is not valid:\n  {}", .messages.join("\n  "))]
    InvalidOutput { file: String, messages: Vec<String> },
}

impl PatchError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PatchError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn class_not_found(name: &str) -> Self {
        PatchError::NodeNotFound {
            what: format!("class declaration '{}'", name),
        }
    }

    pub fn constructor_not_found(class: &str) -> Self {
        PatchError::NodeNotFound {
            what: format!("constructor of class '{}'", class),
        }
    }

    pub fn shape(class: &str, message: impl Into<String>) -> Self {
        PatchError::UnexpectedShape {
            class: class.to_string(),
            message: message.into(),
        }
    }

    /// Stable code for reporting, independent of the message text.
    pub fn code(&self) -> &'static str {
        match self {
            PatchError::Io { .. } => ERR_IO,
            PatchError::RuleSet { .. } => ERR_RULES,
            PatchError::InvalidRule { .. } => ERR_RULE,
            PatchError::Parse { .. } => ERR_PARSE,
            PatchError::NodeNotFound { .. } => ERR_NOT_FOUND,
            PatchError::UnexpectedShape { .. } => ERR_SHAPE,
            PatchError::InvalidOutput { .. } => ERR_OUTPUT,
        }
    }
}
