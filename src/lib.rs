#![warn(missing_docs)]

//! Cooperative, non-blocking access to inotify.
//!
//! [Inotify][wiki] is a linux kernel mechanism for monitoring changes to
//! filesystems' contents.
//!
//! > The inotify API provides a mechanism for monitoring filesystem
//! > events. Inotify can be used to monitor individual files, or to
//! > monitor directories. When a directory is monitored, inotify will
//! > return events for the directory itself, and for files inside the
//! > directory.
//!
//! This crate retrieves events in batches: [`Inotify::get_events`] waits
//! until at least one event is queued (or a timeout expires), drains the
//! queue, and returns everything it found. Waiting suspends only the
//! calling tokio task, never the whole process, so a watcher can run next
//! to other work on the same runtime.
//!
//! See the [man page][inotify7] for usage information of the C version,
//! which this crate follows closely.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use ainotify::{Inotify, WatchMask};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let inotify = Inotify::init()?;
//!
//! inotify.add_watch("/tmp", WatchMask::CREATE | WatchMask::DELETE)?;
//!
//! let events = inotify.get_events(Some(Duration::from_secs(1))).await?;
//! for event in events {
//!     println!("{}: {:?}", event.mask, event.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [wiki]: https://en.wikipedia.org/wiki/Inotify
//! [inotify7]: http://man7.org/linux/man-pages/man7/inotify.7.html

#[macro_use]
extern crate bitflags;

mod events;
mod fd_guard;
mod inotify;
mod util;
mod watches;

pub use crate::events::{decode_events, DecodeError, Event, EventMask};
pub use crate::inotify::{EventsError, Inotify, READ_BUFFER_SIZE};
pub use crate::watches::{WatchDescriptor, WatchMask};
