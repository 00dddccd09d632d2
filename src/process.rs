//! Process-level controls.

use std::io;

/// Point stderr at `/dev/null` for the rest of the process when `silent`.
///
/// Returns whether stderr was redirected. Failure leaves stderr untouched.
pub fn silence_stderr(silent: bool) -> io::Result<bool> {
    if !silent {
        return Ok(false);
    }
    redirect_to_null(2)?;
    Ok(true)
}

#[cfg(unix)]
fn redirect_to_null(fd: std::os::unix::io::RawFd) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let null = std::fs::OpenOptions::new().write(true).open("/dev/null")?;
    // SAFETY: both descriptors are valid for the duration of the call; dup2
    // atomically replaces `fd` and `null` is closed when dropped.
    let result = unsafe { libc::dup2(null.as_raw_fd(), fd) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn redirect_to_null(_fd: i32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "stderr redirection is only supported on unix",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_silent_is_noop() {
        assert!(!silence_stderr(false).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_redirect_discards_writes() {
        use std::io::{Read, Seek, SeekFrom, Write};
        use std::os::unix::io::AsRawFd;

        let mut file = tempfile::tempfile().unwrap();
        let mut reader = file.try_clone().unwrap();

        // redirect a duplicate so `file` itself keeps pointing at the tempfile
        let writer_fd = unsafe { libc::dup(file.as_raw_fd()) };
        assert!(writer_fd >= 0);
        redirect_to_null(writer_fd).unwrap();

        let written = unsafe { libc::write(writer_fd, b"hidden".as_ptr().cast(), 6) };
        assert_eq!(written, 6);
        unsafe { libc::close(writer_fd) };

        file.write_all(b"shown").unwrap();
        reader.seek(SeekFrom::Start(0)).unwrap();
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "shown");
    }
}
