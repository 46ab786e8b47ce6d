//! Process umask check
//!
//! Package trees staged under an unusual umask end up with surprising
//! permissions. The check only warns.

use nix::sys::stat::{umask, Mode};

/// Masks that produce the permissions dpkg expects
pub const SUPPORTED_UMASKS: &[u32] = &[0o022, 0o002];

/// Read the umask of the current process
///
/// Linux reports the mask in `/proc/self/status`. Elsewhere it can only be
/// read by setting it, which briefly changes the mask for every thread.
pub fn read_process_umask() -> u32 {
    std::fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| parse_status_umask(&status))
        .unwrap_or_else(swap_umask)
}

/// `Umask:` line of a `/proc/<pid>/status` file
fn parse_status_umask(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Umask:"))
        .and_then(|value| u32::from_str_radix(value.trim(), 8).ok())
}

fn swap_umask() -> u32 {
    let current = umask(Mode::from_bits_truncate(0o022));
    umask(current);
    u32::from(current.bits())
}

/// Warning text for an unsupported mask, `None` when the mask is fine
pub fn check_umask(mask: u32) -> Option<String> {
    if SUPPORTED_UMASKS.contains(&mask) {
        return None;
    }

    Some(format!(
        "The current umask, {mask:04o}, is not supported. You should use 0022 or 0002"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_masks() {
        assert_eq!(check_umask(0o022), None);
        assert_eq!(check_umask(0o002), None);
    }

    #[test]
    fn test_unsupported_mask_message() {
        assert_eq!(
            check_umask(0o077).as_deref(),
            Some("The current umask, 0077, is not supported. You should use 0022 or 0002")
        );
    }

    #[test]
    fn test_parse_status_umask() {
        let status = "Name:\tpkg-deb\nUmask:\t0027\nState:\tR (running)\n";
        assert_eq!(parse_status_umask(status), Some(0o027));
        assert_eq!(parse_status_umask("Name:\tpkg-deb\n"), None);
        assert_eq!(parse_status_umask("Umask:\tnope\n"), None);
    }

    #[test]
    fn test_read_matches_proc_status() {
        let first = read_process_umask();
        assert_eq!(read_process_umask(), first);

        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            if let Some(mask) = parse_status_umask(&status) {
                assert_eq!(first, mask);
            }
        }
    }
}
