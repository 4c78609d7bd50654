use std::os::unix::fs::PermissionsExt;
use tracing::instrument;

/// Permission bits carried from source to destination: rwx for user/group/other plus setuid,
/// setgid and sticky.
pub const MODE_MASK: u32 = 0o7777;

pub fn source_mode(metadata: &std::fs::Metadata) -> u32 {
    metadata.permissions().mode() & MODE_MASK
}

/// Reapplies `mode` on an open destination.
///
/// The mode requested when the file was created has been filtered through the process umask, so
/// it has to be set again explicitly once the data is in place.
#[instrument(skip(file))]
pub fn set_file_permissions(file: &std::fs::File, mode: u32) -> std::io::Result<()> {
    tracing::debug!("setting permissions");
    file.set_permissions(std::fs::Permissions::from_mode(mode & MODE_MASK))
}
