use std::error::Error;
use std::ffi::CString;
use std::fmt;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use std::time::Duration;

use inotify_sys as ffi;
use tokio::io::unix::AsyncFd;
use tokio::io::Interest;
use tokio::time;

use crate::events::{decode_events, DecodeError, Event, EVENT_SIZE};
use crate::fd_guard::FdGuard;
use crate::util;
use crate::watches::{WatchDescriptor, WatchMask};

/// Recommended size for the event read buffer
///
/// [`Inotify::get_events`] reads this many bytes per read call, which leaves
/// room for on the order of a thousand events per buffer. A single call can
/// still return more events than that, as it keeps draining the queue until
/// a zero-wait readiness check reports nothing left.
pub const READ_BUFFER_SIZE: usize = 1024 * (EVENT_SIZE + 16);

/// Idiomatic wrapper around an inotify instance
///
/// `Inotify` wraps the inotify file descriptor and provides batch-oriented
/// event retrieval on top of it: [`get_events`] waits for the descriptor to
/// become readable, then drains everything that is queued and returns it in
/// one batch. Waiting suspends only the calling task, so other tasks on the
/// same runtime keep running.
///
/// Multiple tasks may share one instance (for example through an `Arc`) and
/// call [`get_events`] concurrently. Each queued event is delivered to
/// exactly one of them; which one is unspecified.
///
/// [`get_events`]: Inotify::get_events
#[derive(Debug)]
pub struct Inotify {
    fd: AsyncFd<FdGuard>,
}

impl Inotify {
    /// Creates an [`Inotify`] instance
    ///
    /// Initializes an inotify instance by calling [`inotify_init1`] with
    /// `IN_CLOEXEC | IN_NONBLOCK`, and registers the descriptor with the
    /// current tokio runtime. Must be called from within a runtime context.
    ///
    /// `IN_NONBLOCK` makes sure the drain loop in [`get_events`] can never
    /// stall a runtime thread; `IN_CLOEXEC` prevents leaking the descriptor
    /// to processes executed by this process.
    ///
    /// # Errors
    ///
    /// Directly returns the error from the call to [`inotify_init1`]. The
    /// kernel reports exhausted inotify instance or file descriptor limits
    /// as `EMFILE`/`ENFILE`.
    ///
    /// [`get_events`]: Inotify::get_events
    /// [`inotify_init1`]: inotify_sys::inotify_init1
    pub fn init() -> io::Result<Inotify> {
        let fd = unsafe { ffi::inotify_init1(ffi::IN_CLOEXEC | ffi::IN_NONBLOCK) };
        if fd == -1 {
            return Err(io::Error::last_os_error());
        }

        let fd = AsyncFd::with_interest(FdGuard::new(fd), Interest::READABLE)?;

        Ok(Inotify { fd })
    }

    /// Adds or updates a watch for the given path
    ///
    /// Adds a new watch or updates an existing one for the file referred to
    /// by `path`. Returns a watch descriptor that can be used to correlate
    /// the events this watch produces, and to remove the watch again via
    /// [`rm_watch`].
    ///
    /// The `mask` argument defines what kind of changes the file should be
    /// watched for, and how to do that. See [`WatchMask`] for details.
    ///
    /// # Errors
    ///
    /// Directly returns the error from the call to [`inotify_add_watch`],
    /// without adding any error conditions of its own. A missing path
    /// surfaces as `ErrorKind::NotFound`, an invalid mask as
    /// `ErrorKind::InvalidInput`, and an exhausted watch table as `ENOSPC`.
    ///
    /// [`rm_watch`]: Inotify::rm_watch
    /// [`inotify_add_watch`]: inotify_sys::inotify_add_watch
    pub fn add_watch<P>(&self, path: P, mask: WatchMask) -> io::Result<WatchDescriptor>
    where
        P: AsRef<Path>,
    {
        let path = CString::new(path.as_ref().as_os_str().as_bytes())?;

        let wd = unsafe {
            ffi::inotify_add_watch(self.as_raw_fd(), path.as_ptr() as *const _, mask.bits())
        };

        match wd {
            -1 => Err(io::Error::last_os_error()),
            _ => Ok(WatchDescriptor(wd)),
        }
    }

    /// Stops watching a file
    ///
    /// Removes the watch represented by the provided [`WatchDescriptor`] by
    /// calling [`inotify_rm_watch`]. Removal queues an [`IGNORED`] event for
    /// the watch.
    ///
    /// # Errors
    ///
    /// Directly returns the error from the call to [`inotify_rm_watch`]. An
    /// unknown or already removed descriptor surfaces as
    /// `ErrorKind::InvalidInput`.
    ///
    /// [`IGNORED`]: crate::EventMask::IGNORED
    /// [`inotify_rm_watch`]: inotify_sys::inotify_rm_watch
    pub fn rm_watch(&self, wd: WatchDescriptor) -> io::Result<()> {
        let result = unsafe { ffi::inotify_rm_watch(self.as_raw_fd(), wd.0) };
        match result {
            0 => Ok(()),
            -1 => Err(io::Error::last_os_error()),
            _ => panic!("unexpected return code from inotify_rm_watch ({})", result),
        }
    }

    /// Waits for events and returns them as one batch
    ///
    /// Waits until the inotify descriptor becomes readable, then reads and
    /// decodes everything that is queued and returns it in delivery order.
    /// Only the calling task is suspended while waiting; other tasks on the
    /// runtime continue to run.
    ///
    /// The `timeout` argument controls the wait:
    ///
    /// - `None` waits indefinitely until at least one event arrives.
    /// - `Some(duration)` waits at most that long. If no event arrives in
    ///   time, an empty vector is returned. A timeout is not an error.
    /// - `Some(Duration::ZERO)` never suspends: it performs one zero-wait
    ///   readiness check and returns an empty vector if nothing is queued.
    ///
    /// Once the descriptor is readable, the queue is drained in a loop: read
    /// one buffer, decode it, then re-check readiness with a zero-wait poll.
    /// The kernel may have queued more events than fit in one read buffer,
    /// so a single read could otherwise return a truncated batch while more
    /// data sits ready.
    ///
    /// # Errors
    ///
    /// Read and wait failures are returned as [`EventsError::Io`]. A
    /// malformed kernel buffer is returned as [`EventsError::Decode`]; in
    /// that case events already decoded during this call are discarded.
    pub async fn get_events(
        &self,
        timeout: Option<Duration>,
    ) -> Result<Vec<Event>, EventsError> {
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        let mut num_bytes = match timeout {
            Some(timeout) if timeout.is_zero() => {
                if !util::poll_readable_now(self.as_raw_fd())? {
                    return Ok(Vec::new());
                }
                util::read_available(self.as_raw_fd(), &mut buffer)?
            }
            Some(timeout) => match time::timeout(timeout, self.read_when_readable(&mut buffer))
                .await
            {
                Ok(read) => read?,
                Err(_elapsed) => return Ok(Vec::new()),
            },
            None => self.read_when_readable(&mut buffer).await?,
        };

        let mut events = Vec::new();

        // The kernel returns whole records only, so every read hands the
        // decoder a complete buffer. A zero-byte read should not occur on a
        // readable inotify descriptor; it terminates the loop instead of
        // being treated as an error.
        while num_bytes > 0 {
            events.extend(decode_events(&buffer[..num_bytes])?);

            if !util::poll_readable_now(self.as_raw_fd())? {
                break;
            }
            num_bytes = util::read_available(self.as_raw_fd(), &mut buffer)?;
        }

        Ok(events)
    }

    /// Suspends until the descriptor is readable, then reads one buffer
    ///
    /// This is the only suspension point in event retrieval. A `WouldBlock`
    /// read means the readiness was stale or a concurrent reader emptied the
    /// queue first; `try_io` then clears the readiness state and the wait
    /// starts over.
    async fn read_when_readable(&self, buffer: &mut [u8]) -> io::Result<usize> {
        loop {
            let mut guard = self.fd.readable().await?;

            match guard.try_io(|inner| util::read_into_buffer(inner.as_raw_fd(), &mut *buffer)) {
                Ok(read) => return read,
                Err(_would_block) => continue,
            }
        }
    }

    /// Closes the inotify instance
    ///
    /// Closes the file descriptor referring to the inotify instance. The
    /// user usually doesn't have to call this method, as the descriptor is
    /// also closed when the instance is dropped. Calling it explicitly
    /// reports the result of the `close` call, which dropping cannot.
    ///
    /// All watches are dropped by the kernel together with the instance.
    ///
    /// # Errors
    ///
    /// Directly returns the error from the call to `close`.
    pub fn close(self) -> io::Result<()> {
        let guard = self.fd.into_inner();
        guard.should_not_close();

        match unsafe { libc::close(guard.fd) } {
            0 => Ok(()),
            _ => Err(io::Error::last_os_error()),
        }
    }
}

impl AsRawFd for Inotify {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.get_ref().fd
    }
}

/// An error returned by [`Inotify::get_events`]
#[derive(Debug)]
pub enum EventsError {
    /// Waiting on or reading from the inotify descriptor failed
    Io(io::Error),

    /// A kernel event buffer could not be decoded
    Decode(DecodeError),
}

impl fmt::Display for EventsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventsError::Io(error) => write!(f, "I/O error while retrieving events: {}", error),
            EventsError::Decode(error) => write!(f, "failed to decode event buffer: {}", error),
        }
    }
}

impl Error for EventsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EventsError::Io(error) => Some(error),
            EventsError::Decode(error) => Some(error),
        }
    }
}

impl From<io::Error> for EventsError {
    fn from(error: io::Error) -> Self {
        EventsError::Io(error)
    }
}

impl From<DecodeError> for EventsError {
    fn from(error: DecodeError) -> Self {
        EventsError::Decode(error)
    }
}
