use std::fs;
use std::io;
use std::path::Path;

/// Counts the entries of `<proc_root>/<pid>/fd`, one per open descriptor.
pub fn count_open_fds(proc_root: &Path, pid: u32) -> io::Result<usize> {
    let dir = proc_root.join(pid.to_string()).join("fd");
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        // descriptors closed while listing vanish mid-iteration
        if entry.is_ok() {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn counts_entries_of_fd_dir() {
        let root = TempDir::new().expect("temp proc root");
        let fd_dir = root.path().join("77").join("fd");
        fs::create_dir_all(&fd_dir).unwrap();
        for fd in ["0", "1", "2", "5"] {
            fs::write(fd_dir.join(fd), b"").unwrap();
        }
        assert_eq!(count_open_fds(root.path(), 77).unwrap(), 4);
    }

    #[test]
    fn missing_dir_is_an_error() {
        let root = TempDir::new().expect("temp proc root");
        assert!(count_open_fds(root.path(), 77).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn own_process_has_descriptors() {
        let count = count_open_fds(Path::new("/proc"), std::process::id()).unwrap();
        assert!(count >= 3, "stdio descriptors missing: {}", count);
    }
}
