//! Heuristic classification of a candidate directory.
//!
//! Used only when no repository exists yet, to judge whether initializing
//! one is advisable. Classification is a total, deterministic function over
//! the directory's current contents and path string; nothing is cached, so
//! callers always see fresh state.

use std::path::{Path, PathBuf};

use crate::platform::PlatformContext;

/// Derived classification tag, in rule-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    ExistingRepository,
    SystemFolder,
    NestedInRepository,
    EmptyFolder,
    SourceProject,
    GeneralFolder,
}

impl std::fmt::Display for FolderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FolderKind::ExistingRepository => "existing_repository",
            FolderKind::SystemFolder => "system_folder",
            FolderKind::NestedInRepository => "nested_in_repository",
            FolderKind::EmptyFolder => "empty_folder",
            FolderKind::SourceProject => "source_project",
            FolderKind::GeneralFolder => "general_folder",
        };
        write!(f, "{label}")
    }
}

/// Snapshot of one classification pass. Built fresh on every call.
#[derive(Debug, Clone)]
pub struct DirectoryAnalysis {
    pub path: PathBuf,
    pub is_repository: bool,
    pub is_empty: bool,
    pub has_source_files: bool,
    pub is_system_folder: bool,
    pub is_nested_in_repository: bool,
    pub kind: FolderKind,
    pub init_recommended: bool,
    pub warning: Option<&'static str>,
    pub recommendation: &'static str,
}

/// The raw facts the rules consume.
struct Facts {
    is_repository: bool,
    is_empty: bool,
    has_source_files: bool,
    is_system_folder: bool,
    is_nested_in_repository: bool,
}

/// One predicate/outcome pair. Evaluated in declaration order; the first
/// matching rule decides the classification, which keeps the priority order
/// auditable in a single table.
struct Rule {
    applies: fn(&Facts) -> bool,
    kind: FolderKind,
    init_recommended: bool,
    warning: Option<&'static str>,
    recommendation: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        applies: |f| f.is_repository,
        kind: FolderKind::ExistingRepository,
        init_recommended: false,
        warning: None,
        recommendation: "This folder is already a git repository",
    },
    Rule {
        applies: |f| f.is_system_folder,
        kind: FolderKind::SystemFolder,
        init_recommended: false,
        warning: Some("Running git init in a system folder is not recommended"),
        recommendation: "Pick a location outside system directories",
    },
    Rule {
        applies: |f| f.is_nested_in_repository,
        kind: FolderKind::NestedInRepository,
        init_recommended: false,
        warning: Some("This folder is nested inside an existing git repository"),
        recommendation: "Consider a submodule or subtree instead of a nested repository",
    },
    Rule {
        applies: |f| f.is_empty,
        kind: FolderKind::EmptyFolder,
        init_recommended: true,
        warning: None,
        recommendation: "Empty folder, well suited for starting a new project",
    },
    Rule {
        applies: |f| f.has_source_files,
        kind: FolderKind::SourceProject,
        init_recommended: true,
        warning: None,
        recommendation: "Source files found; turning this into a repository is recommended",
    },
    Rule {
        applies: |_| true,
        kind: FolderKind::GeneralFolder,
        init_recommended: true,
        warning: None,
        recommendation: "General folder; a repository can be initialized if needed",
    },
];

/// Classify `path` using the platform's system-folder prefix list.
pub fn analyze(path: &Path, platform: &PlatformContext) -> DirectoryAnalysis {
    analyze_with(path, platform.system_path_prefixes())
}

/// Classify `path` against an explicit system-prefix list. The separate
/// entry point keeps the rule table testable independent of the host OS.
pub fn analyze_with(path: &Path, system_prefixes: &[&str]) -> DirectoryAnalysis {
    let is_repository = path.join(".git").exists();
    let facts = Facts {
        is_repository,
        is_empty: is_directory_empty(path),
        has_source_files: has_source_files(path),
        is_system_folder: is_system_path(path, system_prefixes),
        is_nested_in_repository: !is_repository && is_nested_in_repository(path),
    };

    // The catch-all final rule guarantees a match.
    let rule = RULES
        .iter()
        .find(|rule| (rule.applies)(&facts))
        .unwrap_or(&RULES[RULES.len() - 1]);

    DirectoryAnalysis {
        path: path.to_path_buf(),
        is_repository: facts.is_repository,
        is_empty: facts.is_empty,
        has_source_files: facts.has_source_files,
        is_system_folder: facts.is_system_folder,
        is_nested_in_repository: facts.is_nested_in_repository,
        kind: rule.kind,
        init_recommended: rule.init_recommended,
        warning: rule.warning,
        recommendation: rule.recommendation,
    }
}

fn is_directory_empty(path: &Path) -> bool {
    match std::fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => false,
    }
}

const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "java", "cpp", "c", "cs", "php", "rb", "go", "rs", "swift", "kt", "scala",
    "sh", "bat", "html", "css", "vue", "jsx", "tsx", "json", "xml", "yaml", "yml", "md", "txt",
    "sql", "r", "m", "pl",
];

const CONFIG_FILES: &[&str] = &[
    "package.json",
    "requirements.txt",
    "Cargo.toml",
    "pom.xml",
    "build.gradle",
    "Makefile",
    "CMakeLists.txt",
    "setup.py",
    "pyproject.toml",
    "composer.json",
    "Gemfile",
    "go.mod",
];

const SOURCE_DIRS: &[&str] = &["src", "lib", "app", "components", "modules"];

fn has_source_files(path: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(path) else {
        return false;
    };

    for entry in entries.flatten() {
        let entry_path = entry.path();
        let Some(name) = entry_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if entry_path.is_file() {
            if CONFIG_FILES.contains(&name) {
                return true;
            }
            let ext = entry_path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase());
            if ext.is_some_and(|e| SOURCE_EXTENSIONS.contains(&e.as_str())) {
                return true;
            }
        } else if entry_path.is_dir() && SOURCE_DIRS.contains(&name) {
            return true;
        }
    }

    false
}

fn is_system_path(path: &Path, prefixes: &[&str]) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    prefixes.iter().any(|prefix| path_str.contains(prefix))
}

fn is_nested_in_repository(path: &Path) -> bool {
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return true;
        }
        current = dir.parent();
    }
    false
}
