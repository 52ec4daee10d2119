//! `mincore(2)`-based residency provider for Linux.

use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::ptr;

use chrono::{DateTime, Utc};

use super::{FileStatus, NamespaceError, PageCacheProvider, SizeGuard, StatusError, namespace};

/// Returns the system page size, falling back to 4 KiB.
fn page_size() -> usize {
    match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
        n if n > 0 => n as usize,
        _ => 4096,
    }
}

/// Reads residency through a `PROT_NONE` shared mapping of each file.
///
/// The mapping never touches file contents, so sampling does not itself
/// pull pages into the cache.
#[derive(Debug, Clone)]
pub struct MincoreProvider {
    proc_path: String,
    page_size: usize,
}

impl MincoreProvider {
    /// Creates a provider; `proc_path` is used to locate namespace links.
    pub fn new(proc_path: impl Into<String>) -> Self {
        Self {
            proc_path: proc_path.into(),
            page_size: page_size(),
        }
    }

    /// Returns one flag per page of `file`, `true` when resident.
    fn residency(&self, file: &File, len: u64) -> Result<Vec<bool>, StatusError> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let len = usize::try_from(len)
            .map_err(|_| StatusError::Mmap(io::Error::from(io::ErrorKind::InvalidInput)))?;
        let pages = len.div_ceil(self.page_size);

        // SAFETY: a PROT_NONE mapping of a file we hold open; the pointer is
        // only passed back to mincore/munmap and never dereferenced.
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_NONE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(StatusError::Mmap(io::Error::last_os_error()));
        }

        let mut vec = vec![0u8; pages];
        // SAFETY: `vec` holds one byte per page of the `len`-byte mapping.
        let rc = unsafe { libc::mincore(addr, len, vec.as_mut_ptr()) };
        let mincore_err = (rc != 0).then(io::Error::last_os_error);

        // SAFETY: unmapping exactly the region mapped above.
        unsafe { libc::munmap(addr, len) };

        if let Some(e) = mincore_err {
            return Err(StatusError::Mincore(e));
        }
        Ok(vec.iter().map(|b| b & 1 == 1).collect())
    }
}

impl PageCacheProvider for MincoreProvider {
    fn page_cache_status(
        &self,
        path: &str,
        guard: SizeGuard<'_>,
    ) -> Result<FileStatus, StatusError> {
        let file = File::open(path)?;
        let meta = file.metadata()?;
        if meta.is_dir() {
            return Err(StatusError::IsDirectory);
        }

        let size = meta.len() as i64;
        guard(size)?;

        let mtime = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::UNIX_EPOCH);
        let page_status = self.residency(&file, meta.len())?;

        Ok(FileStatus::from_pages(
            path,
            size,
            Utc::now(),
            mtime,
            page_status,
        ))
    }

    fn switch_mount_namespace(&self, pid: u32) -> Result<(), NamespaceError> {
        namespace::switch_mount_namespace(&self.proc_path, pid)
    }
}
