// These tests run against a real inotify instance and thus only work on
// Linux.

use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use ainotify::{EventMask, Inotify, WatchMask, READ_BUFFER_SIZE};

#[tokio::test]
async fn it_should_report_a_created_file() {
    let testdir = TempDir::new().unwrap();

    let inotify = Inotify::init().unwrap();
    let watch = inotify.add_watch(testdir.path(), WatchMask::CREATE).unwrap();

    File::create(testdir.path().join("foo")).unwrap();

    let events = inotify.get_events(None).await.unwrap();

    assert_eq!(1, events.len());
    assert_eq!(watch, events[0].wd);
    assert_eq!(EventMask::CREATE, events[0].mask);
    assert_eq!(0, events[0].cookie);
    assert_eq!(Some(OsString::from("foo")), events[0].name);
}

#[tokio::test]
async fn it_should_not_block_other_tasks_while_waiting() {
    let testdir = TempDir::new().unwrap();

    let inotify = Arc::new(Inotify::init().unwrap());
    inotify.add_watch(testdir.path(), WatchMask::CREATE).unwrap();

    let reader = tokio::spawn({
        let inotify = Arc::clone(&inotify);
        async move { inotify.get_events(Some(Duration::from_secs(10))).await }
    });

    // Give the reader task a chance to reach its readiness wait. If the
    // wait blocked the whole process, this task could not run at all and
    // the file below would never be created.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let triggered = Instant::now();
    File::create(testdir.path().join("bar")).unwrap();

    let events = reader.await.unwrap().unwrap();

    // Well under the 10 second timeout
    assert!(triggered.elapsed() < Duration::from_secs(5));

    assert_eq!(1, events.len());
    assert_eq!(EventMask::CREATE, events[0].mask);
    assert_eq!(Some(OsString::from("bar")), events[0].name);
}

#[tokio::test]
async fn it_should_return_immediately_with_a_zero_timeout() {
    let inotify = Inotify::init().unwrap();

    let started = Instant::now();
    let events = inotify.get_events(Some(Duration::ZERO)).await.unwrap();

    assert!(events.is_empty());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn it_should_return_an_empty_batch_when_the_timeout_expires() {
    let inotify = Inotify::init().unwrap();

    let started = Instant::now();
    let events = inotify
        .get_events(Some(Duration::from_millis(100)))
        .await
        .unwrap();

    assert!(events.is_empty());
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn it_should_not_return_duplicate_events() {
    let testdir = TempDir::new().unwrap();

    let inotify = Inotify::init().unwrap();
    inotify.add_watch(testdir.path(), WatchMask::CREATE).unwrap();

    File::create(testdir.path().join("foo")).unwrap();

    let events = inotify.get_events(None).await.unwrap();
    assert_eq!(1, events.len());

    let events = inotify.get_events(Some(Duration::ZERO)).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn it_should_drain_more_events_than_fit_into_one_buffer() {
    let testdir = TempDir::new().unwrap();

    let inotify = Inotify::init().unwrap();
    inotify.add_watch(testdir.path(), WatchMask::CREATE).unwrap();

    // Each record takes at least as many bytes as its name, so this many
    // files with 200-byte names cannot fit into a single read buffer.
    let num_files = READ_BUFFER_SIZE / 200 + 10;
    let names: Vec<String> = (0..num_files).map(|i| format!("{:0>200}", i)).collect();

    for name in &names {
        File::create(testdir.path().join(name)).unwrap();
    }

    let events = inotify.get_events(None).await.unwrap();

    assert_eq!(num_files, events.len());

    // Kernel delivery order must survive the multi-buffer drain
    for (name, event) in names.iter().zip(&events) {
        assert_eq!(Some(OsString::from(name)), event.name);
    }
}

#[tokio::test]
async fn it_should_report_watch_removal_without_a_name() {
    let testdir = TempDir::new().unwrap();

    let inotify = Inotify::init().unwrap();
    let watch = inotify.add_watch(testdir.path(), WatchMask::CREATE).unwrap();

    inotify.rm_watch(watch).unwrap();

    let events = inotify.get_events(None).await.unwrap();

    assert_eq!(1, events.len());
    assert_eq!(watch, events[0].wd);
    assert!(events[0].mask.contains(EventMask::IGNORED));
    assert_eq!(None, events[0].name);
}

#[tokio::test]
async fn it_should_report_a_missing_path_when_adding_a_watch() {
    let inotify = Inotify::init().unwrap();

    let error = inotify
        .add_watch("/no/such/path/anywhere", WatchMask::CREATE)
        .unwrap_err();

    assert_eq!(io::ErrorKind::NotFound, error.kind());
}

#[tokio::test]
async fn it_should_report_an_unknown_watch_descriptor_on_removal() {
    let testdir = TempDir::new().unwrap();

    let inotify = Inotify::init().unwrap();
    let watch = inotify.add_watch(testdir.path(), WatchMask::CREATE).unwrap();

    inotify.rm_watch(watch).unwrap();
    let error = inotify.rm_watch(watch).unwrap_err();

    assert_eq!(io::ErrorKind::InvalidInput, error.kind());
}

#[tokio::test]
async fn it_should_close_cleanly() {
    let inotify = Inotify::init().unwrap();
    inotify.close().unwrap();
}
