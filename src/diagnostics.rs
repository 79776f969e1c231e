//! Transform-time diagnostics.
//!
//! Every failure the transformer can produce - a syntax error, an
//! unsupported construct, a malformed pattern - carries the originating
//! source position so the caller can point at the exact site. Failures are
//! fatal: they propagate out of the transform call and abort the file.

use serde::Serialize;
use std::fmt;

use crate::scanner::Position;

/// A fatal transformation failure with its source coordinates.
///
/// Line numbers are 1-based and columns 0-based, exactly as the parser
/// delivers them.
#[derive(Clone, Debug, Serialize)]
pub struct TransformError {
    /// Path of the file being transformed.
    pub file: String,
    /// 1-based source line.
    pub line: u32,
    /// 0-based source column.
    pub col: u32,
    /// Human-readable description naming the offending construct.
    pub message: String,
}

impl TransformError {
    pub fn new(file: impl Into<String>, pos: Position, message: impl Into<String>) -> Self {
        TransformError {
            file: file.into(),
            line: pos.line,
            col: pos.col,
            message: message.into(),
        }
    }

    /// A construct the transformer knows about but deliberately rejects.
    pub fn unsupported(file: impl Into<String>, pos: Position, construct: &str) -> Self {
        Self::new(file, pos, format!("not yet implemented: {construct}"))
    }

    /// A malformed piece of source the parser cannot make sense of.
    pub fn syntax(file: impl Into<String>, pos: Position, message: impl Into<String>) -> Self {
        Self::new(file, pos, message)
    }

    /// Render for terminal output. With `color` the `error` tag and the
    /// location are highlighted red the way the CLI reporter prints them.
    pub fn render(&self, color: bool) -> String {
        if color {
            format!(
                "\x1b[31merror\x1b[0m: {} \x1b[31m({}:{}:{})\x1b[0m",
                self.message,
                self.file,
                self.line,
                self.col + 1
            )
        } else {
            format!(
                "error: {} ({}:{}:{})",
                self.message,
                self.file,
                self.line,
                self.col + 1
            )
        }
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{}:{})",
            self.message,
            self.file,
            self.line,
            self.col + 1
        )
    }
}

impl std::error::Error for TransformError {}
