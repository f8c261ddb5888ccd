/*!
 * Platform Limits
 *
 * Centralized location for launch-time limits and the accounting that
 * checks configurations against them before any process exists.
 */

/// Minimum argument-area size POSIX guarantees (4KB)
/// Floor value used when the real limit cannot be queried
pub const POSIX_ARG_MAX: usize = 4096;

/// Bookkeeping the kernel charges per argv/envp entry:
/// one pointer slot plus the NUL terminator
const PER_STRING_OVERHEAD: usize = std::mem::size_of::<usize>() + 1;

/// Combined argv + environment byte limit for an exec on this system.
///
/// Queried from `sysconf(_SC_ARG_MAX)`; a negative or zero answer means
/// the limit is indeterminate and the POSIX floor is used instead.
pub fn arg_space_limit() -> usize {
    let raw = unsafe { libc::sysconf(libc::_SC_ARG_MAX) };
    if raw <= 0 {
        POSIX_ARG_MAX
    } else {
        raw as usize
    }
}

/// Bytes an exec will charge for the given path, argument vector, and
/// environment, counting NUL terminators and pointer slots the way the
/// kernel does.
pub fn arg_space_required(path: &str, args: &[String], env_len: usize) -> usize {
    let mut total = path.len() + PER_STRING_OVERHEAD;
    for arg in args {
        total += arg.len() + PER_STRING_OVERHEAD;
    }
    // Environment entries are passed as KEY=VALUE strings
    total + env_len
}

/// Byte size of an environment map as KEY=VALUE strings, including
/// per-entry overhead. Split out so the caller can account the map once.
pub fn env_space(env: &std::collections::HashMap<String, String>) -> usize {
    env.iter()
        .map(|(key, value)| key.len() + 1 + value.len() + PER_STRING_OVERHEAD)
        .sum()
}
