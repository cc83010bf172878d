//! Execution environment detection.
//!
//! Computed once at startup and read-only afterwards. Consumers use it to
//! pick OS-specific command variants (browser opener) and the system-folder
//! prefix list for directory classification.

use std::path::PathBuf;

/// Operating-system family, with WSL distinguished from plain Linux.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
    Wsl,
}

impl OsFamily {
    pub fn is_windows(self) -> bool {
        self == OsFamily::Windows
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OsFamily::Windows => "Windows",
            OsFamily::MacOs => "macOS",
            OsFamily::Linux => "Linux",
            OsFamily::Wsl => "WSL",
        };
        write!(f, "{name}")
    }
}

/// Immutable snapshot of the execution environment.
#[derive(Debug, Clone)]
pub struct PlatformContext {
    pub os: OsFamily,
    pub home_dir: Option<PathBuf>,
    system_prefixes: &'static [&'static str],
}

impl PlatformContext {
    /// Detect the current platform. Called once at program start.
    pub fn detect() -> Self {
        Self::for_os(detect_os())
    }

    fn for_os(os: OsFamily) -> Self {
        let system_prefixes = if os.is_windows() {
            WINDOWS_SYSTEM_PATHS
        } else {
            UNIX_SYSTEM_PATHS
        };
        Self {
            os,
            home_dir: dirs::home_dir(),
            system_prefixes,
        }
    }

    /// Replace the system-folder prefix list. Integration tests run from
    /// scratch directories under the build tree, whose `tmp` path component
    /// the real list flags as a substring match.
    pub fn with_system_prefixes(mut self, prefixes: &'static [&'static str]) -> Self {
        self.system_prefixes = prefixes;
        self
    }

    /// System-folder prefixes where `git init` is discouraged.
    ///
    /// Matched as lowercase substrings against the candidate path, so
    /// `\appdata\` catches per-user system areas anywhere under a profile.
    pub fn system_path_prefixes(&self) -> &'static [&'static str] {
        self.system_prefixes
    }

    /// The command used to open a URL in the default browser.
    pub fn browser_command(&self, url: &str) -> (&'static str, Vec<String>) {
        match self.os {
            OsFamily::Windows => ("cmd", vec!["/C".into(), "start".into(), url.into()]),
            OsFamily::MacOs => ("open", vec![url.into()]),
            // wslview bridges to the Windows-side browser on WSL; xdg-open
            // handles the rest of the Unix world.
            OsFamily::Wsl => ("wslview", vec![url.into()]),
            OsFamily::Linux => ("xdg-open", vec![url.into()]),
        }
    }
}

const WINDOWS_SYSTEM_PATHS: &[&str] = &[
    "c:\\windows",
    "c:\\program files",
    "c:\\program files (x86)",
    "c:\\programdata",
    "c:\\users\\public",
    "c:\\system volume information",
    "\\appdata\\",
    "\\temp\\",
    "\\tmp\\",
];

const UNIX_SYSTEM_PATHS: &[&str] = &[
    "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/etc", "/var", "/tmp", "/sys", "/proc", "/dev",
    "/boot",
];

#[cfg(target_os = "windows")]
fn detect_os() -> OsFamily {
    OsFamily::Windows
}

#[cfg(target_os = "macos")]
fn detect_os() -> OsFamily {
    OsFamily::MacOs
}

#[cfg(all(unix, not(target_os = "macos")))]
fn detect_os() -> OsFamily {
    // WSL kernels advertise themselves in /proc/version
    if let Ok(version) = std::fs::read_to_string("/proc/version") {
        let version = version.to_lowercase();
        if version.contains("microsoft") || version.contains("wsl") {
            return OsFamily::Wsl;
        }
    }
    OsFamily::Linux
}
