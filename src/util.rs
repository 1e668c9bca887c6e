use std::io;
use std::os::unix::io::RawFd;

use libc::{c_void, pollfd, POLLIN};

/// Reads from `fd` into `buffer`, retrying on `EINTR`.
pub(crate) fn read_into_buffer(fd: RawFd, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        let num_bytes = unsafe { libc::read(fd, buffer.as_mut_ptr() as *mut c_void, buffer.len()) };

        if num_bytes >= 0 {
            return Ok(num_bytes as usize);
        }

        let error = io::Error::last_os_error();
        if error.kind() != io::ErrorKind::Interrupted {
            return Err(error);
        }
    }
}

/// Non-blocking read for the drain loop
///
/// The descriptor is opened with `IN_NONBLOCK`, so a read on an empty queue
/// returns `EAGAIN` rather than blocking. That case maps to zero bytes here,
/// which terminates the drain loop.
pub(crate) fn read_available(fd: RawFd, buffer: &mut [u8]) -> io::Result<usize> {
    match read_into_buffer(fd, buffer) {
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(0),
        result => result,
    }
}

/// Zero-timeout poll
///
/// Reports whether `fd` has data queued right now, without suspending the
/// calling task or blocking the thread.
pub(crate) fn poll_readable_now(fd: RawFd) -> io::Result<bool> {
    let mut pollfd = pollfd {
        fd,
        events: POLLIN,
        revents: 0,
    };

    loop {
        match unsafe { libc::poll(&mut pollfd, 1, 0) } {
            -1 => {
                let error = io::Error::last_os_error();
                if error.kind() != io::ErrorKind::Interrupted {
                    return Err(error);
                }
            }
            0 => return Ok(false),
            _ => return Ok(pollfd.revents & POLLIN != 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{poll_readable_now, read_available, read_into_buffer};

    fn pipe(flags: libc::c_int) -> (libc::c_int, libc::c_int) {
        let mut fds = [0; 2];
        assert_eq!(0, unsafe { libc::pipe2(fds.as_mut_ptr(), flags) });
        (fds[0], fds[1])
    }

    fn close(fd: libc::c_int) {
        unsafe {
            libc::close(fd);
        }
    }

    #[test]
    fn poll_should_report_queued_data_without_waiting() {
        let (read_fd, write_fd) = pipe(0);

        assert!(!poll_readable_now(read_fd).unwrap());

        let written = unsafe { libc::write(write_fd, b"x".as_ptr() as *const _, 1) };
        assert_eq!(1, written);

        assert!(poll_readable_now(read_fd).unwrap());

        let mut buffer = [0u8; 16];
        assert_eq!(1, read_into_buffer(read_fd, &mut buffer).unwrap());
        assert!(!poll_readable_now(read_fd).unwrap());

        close(read_fd);
        close(write_fd);
    }

    #[test]
    fn read_available_should_map_would_block_to_zero_bytes() {
        let (read_fd, write_fd) = pipe(libc::O_NONBLOCK);

        let mut buffer = [0u8; 16];
        assert_eq!(0, read_available(read_fd, &mut buffer).unwrap());

        close(read_fd);
        close(write_fd);
    }
}
