//! A single transfer session: open both handles, relay the bytes, reapply the source permission
//! bits and close both handles, surfacing close failures.

use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::IntoRawFd;
use tracing::instrument;

use crate::config::RelayConfig;
use crate::error::Error;
use crate::preserve;
use crate::relay;
use crate::ring::RingBuffer;

#[derive(Copy, Clone, Debug, Default)]
pub struct Summary {
    pub relay: relay::Summary,
    /// permission bits applied to the destination
    pub mode: u32,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}\nmode: {:04o}", &self.relay, self.mode)
    }
}

/// Closes `handle`, reporting the error `std::fs::File`'s drop would swallow.
fn close<F: IntoRawFd>(handle: F) -> std::io::Result<()> {
    nix::unistd::close(handle).map_err(std::io::Error::from)
}

fn close_source<F: IntoRawFd>(handle: F, path: &std::path::Path) -> Result<(), Error> {
    close(handle).map_err(|source| Error::CloseSource {
        path: path.to_owned(),
        source,
    })
}

fn close_destination<F: IntoRawFd>(handle: F, path: &std::path::Path) -> Result<(), Error> {
    close(handle).map_err(|source| Error::CloseDestination {
        path: path.to_owned(),
        source,
    })
}

fn open_destination(path: &std::path::Path, mode: u32) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

/// Copies `src` to `dst` through a circular buffer of `config.capacity` bytes.
///
/// On failure the destination is left as is, possibly partially written. Handles still open at
/// that point are dropped without reporting secondary close errors.
#[instrument]
pub fn copy_file(
    src: &std::path::Path,
    dst: &std::path::Path,
    config: &RelayConfig,
) -> Result<Summary, Error> {
    tracing::debug!("opening 'src' for reading");
    let mut reader = std::fs::File::open(src).map_err(|source| Error::OpenSource {
        path: src.to_owned(),
        source,
    })?;
    // captured before any data moves
    let mode = reader
        .metadata()
        .map(|metadata| preserve::source_mode(&metadata))
        .map_err(|source| Error::Stat {
            path: src.to_owned(),
            source,
        })?;
    // allocated before 'dst' is truncated so a failure leaves it untouched
    let ring = RingBuffer::try_new(config.capacity).map_err(|err| Error::Allocate {
        capacity: config.capacity,
        source: std::io::Error::new(std::io::ErrorKind::OutOfMemory, err),
    })?;
    tracing::debug!("opening 'dst' for writing with mode {:04o}", mode);
    let mut writer = open_destination(dst, mode).map_err(|source| Error::OpenDestination {
        path: dst.to_owned(),
        source,
    })?;
    let relay_summary = relay::Relay::with_buffer(ring)
        .run(&mut reader, &mut writer)
        .map_err(|error| {
            tracing::debug!("{:#}", &error);
            match error {
                relay::Error::Read { source, .. } => Error::Read {
                    path: src.to_owned(),
                    source,
                },
                relay::Error::Write { source, .. } => Error::Write {
                    path: dst.to_owned(),
                    source,
                },
            }
        })?;
    preserve::set_file_permissions(&writer, mode).map_err(|source| Error::SetPermissions {
        path: dst.to_owned(),
        mode,
        source,
    })?;
    tracing::debug!("closing 'src' and 'dst'");
    close_source(reader, src)?;
    close_destination(writer, dst)?;
    tracing::info!(
        "copied {} to {:?}",
        bytesize::ByteSize(relay_summary.bytes_copied),
        dst
    );
    Ok(Summary {
        relay: relay_summary,
        mode,
    })
}
