//! Detection of concurrently running git processes.
//!
//! A live `git` process usually means another tool is mid-operation; pushing
//! or deleting lock files underneath it risks corruption, so the workflow
//! asks before continuing.

use sysinfo::{ProcessesToUpdate, System};

/// List running git processes as `pid name` strings, excluding ourselves and
/// our own child processes.
pub fn running_git_processes() -> Vec<String> {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    let own_pid = sysinfo::get_current_pid().ok();

    let mut processes = Vec::new();
    for (pid, process) in sys.processes() {
        if Some(*pid) == own_pid {
            continue;
        }
        // Skip children we spawned ourselves (status queries etc.)
        if process.parent() == own_pid {
            continue;
        }
        let name = process.name().to_string_lossy();
        if name == "git" || name == "git.exe" {
            processes.push(format!("{pid} {name}"));
        }
    }

    processes
}
