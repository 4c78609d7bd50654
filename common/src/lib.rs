//! Internal library for the `copy32` tool
//!
//! Streams one file into another through a small fixed-capacity circular buffer, so memory use
//! never grows with file size, and carries the source's permission bits over to the destination.
//!
//! # Layers
//!
//! - [`ring`]: the circular buffer with explicit occupancy tracking
//! - [`relay`]: the fill/drain loop over any `Read`/`Write` pair
//! - [`copy`]: a transfer session between two paths, including permission reapplication and
//!   checked closing of both handles
//! - [`error`]: failure taxonomy and the one-line diagnostic printed for it
//!
//! # Logging
//!
//! Logs go to stdout and are filtered by verbosity (`-v` INFO, `-vv` DEBUG, `-vvv` TRACE) unless
//! `RUST_LOG` is set. Failures are reported as a single line on stderr.

use std::io::Write;

pub mod config;
pub mod copy;
pub mod error;
pub mod preserve;
pub mod relay;
pub mod ring;

#[cfg(test)]
mod testutils;

pub use config::{DEFAULT_CAPACITY, OutputConfig, RelayConfig};
pub use copy::{Summary, copy_file};
pub use error::Error;

/// Installs the stdout logger. Quiet mode installs nothing.
pub fn init_tracing(output: &OutputConfig) -> anyhow::Result<()> {
    if output.quiet {
        return Ok(());
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(output.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))
}

/// Writes the diagnostic line for `error` to stderr.
pub fn report(error: &Error) {
    // nowhere left to report a failing stderr
    let _ = std::io::stderr().lock().write_all(error.diagnostic().as_bytes());
}

/// Runs `func`, reporting its outcome according to `output`.
///
/// Returns `None` when the transfer failed; the caller maps that to exit status 1.
pub fn run<F>(output: OutputConfig, func: F) -> Option<Summary>
where
    F: FnOnce() -> Result<Summary, Error>,
{
    match func() {
        Ok(summary) => {
            if output.print_summary {
                println!("{summary}");
            }
            Some(summary)
        }
        Err(error) => {
            if !output.quiet {
                report(&error);
            }
            tracing::debug!("{:#}", anyhow::Error::from(error));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_returns_summary_on_success() {
        let summary = run(OutputConfig::default(), || Ok(Summary::default()));
        assert!(summary.is_some());
    }

    #[test]
    fn run_returns_none_on_failure() {
        let output = OutputConfig {
            quiet: true,
            ..Default::default()
        };
        let summary = run(output, || {
            Err(Error::Stat {
                path: "src".into(),
                source: std::io::Error::from(nix::errno::Errno::EIO),
            })
        });
        assert!(summary.is_none());
    }
}
