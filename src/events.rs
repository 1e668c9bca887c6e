use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::str;

use inotify_sys as ffi;

use crate::watches::WatchDescriptor;

/// Size of the fixed-length part of an event record
///
/// Every record in the kernel's event buffer starts with an
/// [`inotify_sys::inotify_event`], followed by `len` bytes of file name.
pub(crate) const EVENT_SIZE: usize = mem::size_of::<ffi::inotify_event>();

/// An inotify event
///
/// A file system event that describes a change that the user previously
/// registered interest in. To watch for events, call [`Inotify::add_watch`].
/// To retrieve events, call [`Inotify::get_events`].
///
/// [`Inotify::add_watch`]: crate::Inotify::add_watch
/// [`Inotify::get_events`]: crate::Inotify::get_events
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    /// Identifies the watch this event originates from
    ///
    /// This [`WatchDescriptor`] is equal to the one that
    /// [`Inotify::add_watch`] returned when interest for this event was
    /// registered. It stays valid even if the watch has since been removed.
    ///
    /// [`Inotify::add_watch`]: crate::Inotify::add_watch
    pub wd: WatchDescriptor,

    /// Indicates what kind of event this is
    pub mask: EventMask,

    /// Connects related events to each other
    ///
    /// When a file is renamed, this results in two events: [`MOVED_FROM`]
    /// and [`MOVED_TO`]. The `cookie` field will be the same for both of
    /// them, thereby making it possible to connect the event pair. It is `0`
    /// for all other events.
    ///
    /// [`MOVED_FROM`]: EventMask::MOVED_FROM
    /// [`MOVED_TO`]: EventMask::MOVED_TO
    pub cookie: u32,

    /// The name of the file the event originates from
    ///
    /// This field is set only if the subject of the event is a file or
    /// directory in a watched directory. If the event concerns a file or
    /// directory that is watched directly, `name` is `None`. The name never
    /// contains the NUL terminator or the padding bytes from the kernel
    /// buffer.
    pub name: Option<OsString>,
}

/// Decodes a kernel event buffer into a sequence of events
///
/// `buffer` must contain zero or more complete event records back-to-back,
/// which is what a read from an inotify descriptor returns. Events come back
/// in the same order as the records appear in the buffer. An empty buffer
/// decodes to an empty vector.
///
/// This is a pure function. It does no I/O and holds no state, so the same
/// buffer always decodes to the same events.
///
/// # Errors
///
/// Returns a [`DecodeError`] if a record's fixed-size header or its name
/// would run past the end of the buffer. The kernel never produces such a
/// buffer, so this only happens when the decoder is fed hand-built bytes.
pub fn decode_events(buffer: &[u8]) -> Result<Vec<Event>, DecodeError> {
    let mut events = Vec::new();
    let mut pos = 0;

    while pos < buffer.len() {
        let remaining = &buffer[pos..];

        if remaining.len() < EVENT_SIZE {
            return Err(DecodeError::TruncatedHeader {
                offset: pos,
                available: remaining.len(),
            });
        }

        let raw_ptr = remaining.as_ptr() as *const ffi::inotify_event;

        // The byte buffer has alignment 1 while `inotify_event` has a higher
        // alignment, so the pointer must be read unaligned. Dereferencing it
        // with `*` would be undefined behavior.
        let raw = unsafe { raw_ptr.read_unaligned() };

        let name_len = raw.len as usize;
        if remaining.len() - EVENT_SIZE < name_len {
            return Err(DecodeError::TruncatedName {
                offset: pos,
                expected: name_len,
                available: remaining.len() - EVENT_SIZE,
            });
        }

        let name = &remaining[EVENT_SIZE..EVENT_SIZE + name_len];

        // The name is NUL-terminated and filled up with further '\0' bytes
        // to the alignment boundary. Cutting at the first '\0' removes both.
        // The `unwrap` is safe, because `splitn` always returns at least one
        // result, even if the slice contains no '\0'.
        let name = name.splitn(2, |b| b == &0u8).next().unwrap();

        let name = if name.is_empty() {
            None
        } else {
            Some(OsStr::from_bytes(name).to_os_string())
        };

        events.push(Event {
            wd: WatchDescriptor(raw.wd),
            mask: EventMask::from_bits_retain(raw.mask),
            cookie: raw.cookie,
            name,
        });

        pos += EVENT_SIZE + name_len;
    }

    Ok(events)
}

/// An error encountered while decoding a kernel event buffer
///
/// A malformed buffer means the byte stream itself is suspect, so the call
/// that read it fails as a whole; already-decoded events from the same call
/// are discarded rather than returned as a truncated batch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The buffer ended in the middle of a record's fixed-size header
    TruncatedHeader {
        /// Offset of the record within the buffer
        offset: usize,
        /// Number of bytes left in the buffer at that offset
        available: usize,
    },

    /// The buffer ended in the middle of a record's name
    TruncatedName {
        /// Offset of the record within the buffer
        offset: usize,
        /// Length of the name according to the record header
        expected: usize,
        /// Number of name bytes actually left in the buffer
        available: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TruncatedHeader { offset, available } => write!(
                f,
                "truncated event header at offset {}: {} bytes left, {} required",
                offset, available, EVENT_SIZE,
            ),
            DecodeError::TruncatedName {
                offset,
                expected,
                available,
            } => write!(
                f,
                "truncated event name at offset {}: {} bytes left, {} required",
                offset, available, expected,
            ),
        }
    }
}

impl Error for DecodeError {}

bitflags! {
    /// Indicates the type of an event
    ///
    /// This struct can be retrieved from an [`Event`] via its `mask` field.
    /// You can determine the [`Event`]'s type by comparing the `EventMask` to
    /// its associated constants.
    ///
    /// The `Display` implementation renders a mask as the names of all set
    /// flags, joined by ` | `, and `FromStr` parses that representation back.
    #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
    pub struct EventMask: u32 {
        /// File was accessed
        ///
        /// When watching a directory, this event is only triggered for
        /// objects inside the directory, not the directory itself.
        const ACCESS = ffi::IN_ACCESS;

        /// Metadata (permissions, timestamps, ...) changed
        ///
        /// When watching a directory, this event can be triggered for the
        /// directory itself, as well as objects inside the directory.
        const ATTRIB = ffi::IN_ATTRIB;

        /// File opened for writing was closed
        const CLOSE_WRITE = ffi::IN_CLOSE_WRITE;

        /// File or directory not opened for writing was closed
        const CLOSE_NOWRITE = ffi::IN_CLOSE_NOWRITE;

        /// File/directory created in watched directory
        const CREATE = ffi::IN_CREATE;

        /// File/directory deleted from watched directory
        const DELETE = ffi::IN_DELETE;

        /// Watched file/directory was deleted
        const DELETE_SELF = ffi::IN_DELETE_SELF;

        /// File was modified
        const MODIFY = ffi::IN_MODIFY;

        /// Watched file/directory was moved
        const MOVE_SELF = ffi::IN_MOVE_SELF;

        /// File was renamed/moved; watched directory contained old name
        const MOVED_FROM = ffi::IN_MOVED_FROM;

        /// File was renamed/moved; watched directory contains new name
        const MOVED_TO = ffi::IN_MOVED_TO;

        /// File or directory was opened
        const OPEN = ffi::IN_OPEN;

        /// Watch was removed
        ///
        /// This event will be generated if the watch was removed explicitly
        /// (via [`Inotify::rm_watch`]), or automatically (because the file
        /// was deleted or the file system was unmounted).
        ///
        /// [`Inotify::rm_watch`]: crate::Inotify::rm_watch
        const IGNORED = ffi::IN_IGNORED;

        /// Event related to a directory
        ///
        /// The subject of the event is a directory.
        const ISDIR = ffi::IN_ISDIR;

        /// Event queue overflowed
        ///
        /// The event queue has overflowed and events have presumably been
        /// lost.
        const Q_OVERFLOW = ffi::IN_Q_OVERFLOW;

        /// File system containing watched object was unmounted
        ///
        /// An event with [`EventMask::IGNORED`] will subsequently be
        /// generated for the same watch descriptor.
        const UNMOUNT = ffi::IN_UNMOUNT;
    }
}

impl fmt::Display for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

impl str::FromStr for EventMask {
    type Err = bitflags::parser::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        bitflags::parser::from_str(s)
    }
}
