//! Mount namespace switching for containerized targets.

use std::fs::{self, File};
use std::io;
use std::os::unix::io::AsRawFd;

use tracing::debug;

use super::NamespaceError;

/// Enters the mount namespace of `pid` unless we already share it.
///
/// `setns(CLONE_NEWNS)` only succeeds while the calling process is
/// single-threaded, so switching from inside a worker pool fails with
/// `EINVAL`; callers treat that as non-fatal.
pub(super) fn switch_mount_namespace(proc_path: &str, pid: u32) -> Result<(), NamespaceError> {
    let lookup = |source: io::Error| NamespaceError::Lookup { pid, source };

    let own = fs::read_link(format!("{}/self/ns/mnt", proc_path)).map_err(lookup)?;
    let target_path = format!("{}/{}/ns/mnt", proc_path, pid);
    let target = fs::read_link(&target_path).map_err(lookup)?;

    if own == target {
        return Ok(());
    }

    let ns = File::open(&target_path).map_err(lookup)?;
    // SAFETY: `ns` is an open namespace file descriptor for the call's duration.
    let rc = unsafe { libc::setns(ns.as_raw_fd(), libc::CLONE_NEWNS) };
    if rc != 0 {
        return Err(NamespaceError::Setns {
            pid,
            source: io::Error::last_os_error(),
        });
    }

    debug!(
        pid,
        from = %own.display(),
        to = %target.display(),
        "switched mount namespace"
    );
    Ok(())
}
