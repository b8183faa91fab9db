//! Disk probes: sequential streaming, random 4 KiB access and durable batches
//!
//! Every probe works on an anonymous temporary file inside the configured
//! test directory, removed when the probe returns.

mod batch;
mod random;
mod sequential;

pub use batch::BatchProbe;
pub use random::RandomProbe;
pub use sequential::SequentialProbe;

use crate::error::ProbeError;
use std::fs::File;
use std::path::Path;
use tempfile::NamedTempFile;

fn scratch_file(dir: &Path, prefix: &str) -> Result<NamedTempFile, ProbeError> {
    tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".dat")
        .tempfile_in(dir)
        .map_err(ProbeError::Io)
}

/// Ask the kernel to evict the file's cached pages so reads hit the device
#[cfg(target_os = "linux")]
fn drop_page_cache(file: &File) {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor is owned by `file` and stays open for the call.
    let rc = unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, 0, libc::POSIX_FADV_DONTNEED) };
    if rc != 0 {
        tracing::debug!(errno = rc, "posix_fadvise(DONTNEED) failed, reads may be cached");
    }
}

#[cfg(not(target_os = "linux"))]
fn drop_page_cache(_file: &File) {}
