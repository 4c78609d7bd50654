//! Failure taxonomy of a single file transfer and the one-line diagnostic written for it.

use std::path::PathBuf;

/// Upper bound on a diagnostic line, trailing newline included.
pub const MAX_DIAGNOSTIC_LEN: usize = 512;

pub const USAGE: &str = "Usage: copy32 <source> <destination>";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}", USAGE)]
    Usage,
    #[error("failed opening source {path:?}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed reading metadata from source {path:?}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot allocate a {capacity} byte transfer buffer")]
    Allocate {
        capacity: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("failed opening destination {path:?}")]
    OpenDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed reading from {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed writing to {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot set {path:?} permissions to {mode:o}")]
    SetPermissions {
        path: PathBuf,
        mode: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("failed closing source {path:?}")]
    CloseSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed closing destination {path:?}")]
    CloseDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Fixed human-readable prefix naming the failed operation.
    pub fn prefix(&self) -> &'static str {
        match self {
            Error::Usage => USAGE,
            Error::OpenSource { .. } => "Failed to open source file",
            Error::Stat { .. } => "Failed to get source file information",
            Error::Allocate { .. } => "Failed to allocate transfer buffer",
            Error::OpenDestination { .. } => "Failed to open destination file",
            Error::Read { .. } => "Failed to read from source file",
            Error::Write { .. } => "Failed to write to destination file",
            Error::SetPermissions { .. } => "Failed to set destination file permissions",
            Error::CloseSource { .. } => "Failed to close source file",
            Error::CloseDestination { .. } => "Failed to close destination file",
        }
    }

    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            Error::Usage => None,
            Error::OpenSource { source, .. }
            | Error::Stat { source, .. }
            | Error::Allocate { source, .. }
            | Error::OpenDestination { source, .. }
            | Error::Read { source, .. }
            | Error::Write { source, .. }
            | Error::SetPermissions { source, .. }
            | Error::CloseSource { source, .. }
            | Error::CloseDestination { source, .. } => Some(source),
        }
    }

    /// The line written to stderr for this failure, newline included.
    pub fn diagnostic(&self) -> String {
        let detail = self.io_error().map(describe);
        format_diagnostic(self.prefix(), detail.as_deref())
    }
}

/// Describes an I/O error the way `strerror` would, without Rust's "(os error N)" suffix.
pub fn describe(error: &std::io::Error) -> String {
    match error.raw_os_error() {
        Some(errno) => nix::errno::Errno::from_raw(errno).desc().to_string(),
        None => error.to_string(),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Renders `prefix: detail\n`, cutting both parts so the line never exceeds
/// [`MAX_DIAGNOSTIC_LEN`] bytes. An empty or missing detail drops the separator.
pub fn format_diagnostic(prefix: &str, detail: Option<&str>) -> String {
    // room for ": " and "\n"
    let prefix = truncate(prefix, MAX_DIAGNOSTIC_LEN - 3);
    let detail = detail
        .map(|detail| truncate(detail, MAX_DIAGNOSTIC_LEN - 3 - prefix.len()))
        .unwrap_or_default();
    let mut line = String::with_capacity(prefix.len() + detail.len() + 3);
    line.push_str(prefix);
    if !detail.is_empty() {
        line.push_str(": ");
        line.push_str(detail);
    }
    line.push('\n');
    line
}
