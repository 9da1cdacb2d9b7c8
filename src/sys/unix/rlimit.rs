use log::warn;

/// Raises `RLIMIT_NOFILE` towards `hint`, capped at the process's hard
/// limit. Non-fatal on failure: the constructor logs a warning and
/// continues, matching "failure non-fatal; log and continue" from the
/// reactor's construction contract.
pub(crate) fn raise_fd_limit(hint: u64) {
    let mut limits = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limits) } != 0 {
        warn!(
            "failed to read RLIMIT_NOFILE: {}",
            std::io::Error::last_os_error()
        );
        return;
    }

    let target = hint.min(limits.rlim_max);
    if target <= limits.rlim_cur {
        return;
    }

    limits.rlim_cur = target;
    if unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &limits) } != 0 {
        warn!(
            "failed to raise RLIMIT_NOFILE to {}: {}",
            target,
            std::io::Error::last_os_error()
        );
    }
}
