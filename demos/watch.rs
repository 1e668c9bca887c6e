//! Watches the given paths and prints every event, until interrupted.
//!
//!     cargo run --example watch -- <path> [<path>...]

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use ainotify::{Inotify, WatchMask};

#[tokio::main]
async fn main() -> ExitCode {
    let paths: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("usage: watch <path> [<path>...]");
        return ExitCode::from(1);
    }

    let inotify = match Inotify::init() {
        Ok(inotify) => inotify,
        Err(error) => {
            eprintln!("Failed to initialize inotify: {}", error);
            return ExitCode::FAILURE;
        }
    };

    let mut wd_to_path = HashMap::new();
    for path in paths {
        match inotify.add_watch(&path, WatchMask::ALL_EVENTS) {
            Ok(wd) => {
                wd_to_path.insert(wd, path);
            }
            Err(error) => {
                eprintln!("Failed to watch {}: {}", path.display(), error);
                return ExitCode::FAILURE;
            }
        }
    }

    loop {
        let events = tokio::select! {
            _ = tokio::signal::ctrl_c() => return ExitCode::SUCCESS,
            events = inotify.get_events(None) => events,
        };

        let events = match events {
            Ok(events) => events,
            Err(error) => {
                eprintln!("Failed to retrieve events: {}", error);
                return ExitCode::FAILURE;
            }
        };

        for event in events {
            let path = wd_to_path
                .get(&event.wd)
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| format!("wd:{}", event.wd.get_watch_descriptor_id()));

            match &event.name {
                Some(name) => println!("{}: {} {:?}", path, event.mask, name),
                None => println!("{}: {}", path, event.mask),
            }
        }
    }
}
