use std::os::raw::c_int;

use inotify_sys as ffi;

bitflags! {
    /// Describes a file system watch
    ///
    /// Passed to [`Inotify::add_watch`], to describe what file system events
    /// to watch for, and how to do that.
    ///
    /// `WatchMask` constants can be passed as is, or combined. For example,
    /// `WatchMask::CREATE | WatchMask::DELETE` watches a directory for both
    /// created and deleted entries.
    ///
    /// [`Inotify::add_watch`]: crate::Inotify::add_watch
    #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
    pub struct WatchMask: u32 {
        /// File was accessed
        const ACCESS = ffi::IN_ACCESS;

        /// Metadata (permissions, timestamps, ...) changed
        const ATTRIB = ffi::IN_ATTRIB;

        /// File opened for writing was closed
        const CLOSE_WRITE = ffi::IN_CLOSE_WRITE;

        /// File or directory not opened for writing was closed
        const CLOSE_NOWRITE = ffi::IN_CLOSE_NOWRITE;

        /// File/directory created in watched directory
        const CREATE = ffi::IN_CREATE;

        /// File/directory deleted from watched directory
        const DELETE = ffi::IN_DELETE;

        /// Watched file/directory was itself deleted
        const DELETE_SELF = ffi::IN_DELETE_SELF;

        /// File was modified
        const MODIFY = ffi::IN_MODIFY;

        /// Watched file/directory was itself moved
        const MOVE_SELF = ffi::IN_MOVE_SELF;

        /// File was renamed/moved; watched directory contained old name
        const MOVED_FROM = ffi::IN_MOVED_FROM;

        /// File was renamed/moved; watched directory contains new name
        const MOVED_TO = ffi::IN_MOVED_TO;

        /// File or directory was opened
        const OPEN = ffi::IN_OPEN;

        /// Watch for all events
        ///
        /// This constant is simply a convenient combination of all the
        /// event constants above.
        const ALL_EVENTS = ffi::IN_ALL_EVENTS;

        /// Watch for both [`MOVED_FROM`] and [`MOVED_TO`]
        ///
        /// [`MOVED_FROM`]: Self::MOVED_FROM
        /// [`MOVED_TO`]: Self::MOVED_TO
        const MOVE = ffi::IN_MOVE;

        /// Watch for both [`CLOSE_WRITE`] and [`CLOSE_NOWRITE`]
        ///
        /// [`CLOSE_WRITE`]: Self::CLOSE_WRITE
        /// [`CLOSE_NOWRITE`]: Self::CLOSE_NOWRITE
        const CLOSE = ffi::IN_CLOSE;

        /// Don't dereference the path if it is a symbolic link
        const DONT_FOLLOW = ffi::IN_DONT_FOLLOW;

        /// Don't watch events for children that have been unlinked from the
        /// watched directory
        const EXCL_UNLINK = ffi::IN_EXCL_UNLINK;

        /// If a watch for the inode exists, amend it instead of replacing it
        const MASK_ADD = ffi::IN_MASK_ADD;

        /// Only receive one event, then remove the watch
        const ONESHOT = ffi::IN_ONESHOT;

        /// Only watch path, if it is a directory
        const ONLYDIR = ffi::IN_ONLYDIR;
    }
}

/// Represents a watch on an inode
///
/// Can be obtained from [`Inotify::add_watch`] or from an [`Event`]. A watch
/// descriptor can be used to get inotify to stop watching an inode by
/// passing it to [`Inotify::rm_watch`].
///
/// The descriptor is just the kernel's watch id. It stays meaningful for
/// correlating events that were queued before the watch was removed, which
/// is why an [`Event`] may carry a descriptor for a watch that no longer
/// exists.
///
/// [`Event`]: crate::Event
/// [`Inotify::add_watch`]: crate::Inotify::add_watch
/// [`Inotify::rm_watch`]: crate::Inotify::rm_watch
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WatchDescriptor(pub(crate) c_int);

impl WatchDescriptor {
    /// Getter method for a watcher's id.
    ///
    /// Can be used to distinguish events for files with the same name.
    pub fn get_watch_descriptor_id(&self) -> c_int {
        self.0
    }
}
