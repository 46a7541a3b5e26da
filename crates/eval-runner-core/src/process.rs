//! Child process groups for adapters and report runners.
//!
//! `kill_on_drop` only reaches the direct child. Commands are usually
//! wrappers (`sh -c`, `cargo run`, a Go binary spawning helpers), so each
//! child leads its own process group and a timeout kills the whole group.

use tokio::process::Command;
use tracing::debug;

/// Make the spawned child the leader of a new process group.
pub fn isolate(cmd: &mut Command) {
    #[cfg(unix)]
    cmd.process_group(0);
    #[cfg(not(unix))]
    let _ = cmd;
}

/// Kill every process in the group led by `pid`.
pub fn kill_group(pid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
            debug!(pid, error = %e, "process group already gone");
        }
    }
    #[cfg(not(unix))]
    debug!(?pid, "process groups unsupported, only the direct child is killed");
}
