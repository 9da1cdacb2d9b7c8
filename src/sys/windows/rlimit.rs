use log::trace;

/// Windows has no per-process file-descriptor-table cap analogous to
/// POSIX `RLIMIT_NOFILE` (the practical ceiling is a registry-configured
/// handle quota, not something a process raises for itself), so this is
/// a documented no-op rather than a fabricated syscall.
pub(crate) fn raise_fd_limit(_hint: u64) {
    trace!("raise_fd_limit is a no-op on windows");
}
