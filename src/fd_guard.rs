use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};

/// Owns the inotify descriptor
///
/// Closes the descriptor when dropped, unless ownership was handed back to
/// the caller via [`Inotify::close`].
///
/// [`Inotify::close`]: crate::Inotify::close
#[derive(Debug)]
pub(crate) struct FdGuard {
    pub(crate) fd: RawFd,
    close_on_drop: AtomicBool,
}

impl FdGuard {
    pub(crate) fn new(fd: RawFd) -> Self {
        FdGuard {
            fd,
            close_on_drop: AtomicBool::new(true),
        }
    }

    /// Indicate that the descriptor should not be closed on drop
    pub(crate) fn should_not_close(&self) {
        self.close_on_drop.store(false, Ordering::Release);
    }
}

impl AsRawFd for FdGuard {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for FdGuard {
    fn drop(&mut self) {
        if self.close_on_drop.load(Ordering::Acquire) {
            unsafe {
                libc::close(self.fd);
            }
        }
    }
}
