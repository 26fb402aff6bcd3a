// src/worker/listing.rs

//! `ls`: one level of a directory, rendered like `ls -F` without hidden
//! entries.

use std::fmt;
use std::fs::{self, DirEntry};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use nix::unistd::{access, AccessFlags};
use tracing::debug;

/// Everything `ls` can end with. Only `Entries` and `Empty` are successes;
/// the rest are diagnostics, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Entries { dir: PathBuf, names: Vec<String> },
    Empty { dir: PathBuf },
    NotFound(PathBuf),
    NotADirectory(PathBuf),
    PermissionDenied(PathBuf),
    Failed { dir: PathBuf, message: String },
}

impl Listing {
    pub fn is_diagnostic(&self) -> bool {
        !matches!(self, Listing::Entries { .. } | Listing::Empty { .. })
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listing::Entries { dir, names } => {
                writeln!(f, "[*] listing top level of {}", dir.display())?;
                write!(f, "{}", names.join("\n"))
            }
            Listing::Empty { dir } => {
                writeln!(f, "[*] listing top level of {}", dir.display())?;
                write!(f, "[?] directory is empty.")
            }
            Listing::NotFound(dir) => {
                write!(f, "[!] error: path does not exist: {}", dir.display())
            }
            Listing::NotADirectory(dir) => {
                write!(f, "[!] error: not a directory: {}", dir.display())
            }
            Listing::PermissionDenied(dir) => write!(
                f,
                "[!] permission denied, cannot read the contents of {}",
                dir.display()
            ),
            Listing::Failed { dir, message } => {
                write!(f, "[!] error listing {}: {message}", dir.display())
            }
        }
    }
}

/// List the immediate children of `dir`.
///
/// Names starting with `.` are skipped. Each remaining name gets at most one
/// marker, first match wins: `/` directory (symlinks not followed), `@`
/// symlink, `*` regular file executable by the current user.
pub fn list_directory(dir: &Path) -> Listing {
    // Both checks follow symlinks, so a link to a directory is listable.
    if !dir.exists() {
        return Listing::NotFound(dir.to_path_buf());
    }
    if !dir.is_dir() {
        return Listing::NotADirectory(dir.to_path_buf());
    }

    match read_annotated(dir) {
        Ok(names) if names.is_empty() => Listing::Empty {
            dir: dir.to_path_buf(),
        },
        Ok(names) => Listing::Entries {
            dir: dir.to_path_buf(),
            names,
        },
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            Listing::PermissionDenied(dir.to_path_buf())
        }
        Err(e) => Listing::Failed {
            dir: dir.to_path_buf(),
            message: e.to_string(),
        },
    }
}

fn read_annotated(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = annotate(&entry)? {
            names.push(name);
        }
    }
    names.sort();
    debug!(dir = %dir.display(), count = names.len(), "directory listed");
    Ok(names)
}

/// Rendered name for one entry, `None` for hidden entries.
fn annotate(entry: &DirEntry) -> std::io::Result<Option<String>> {
    let name = entry.file_name().to_string_lossy().into_owned();
    if name.starts_with('.') {
        return Ok(None);
    }

    // `DirEntry::file_type` does not traverse symlinks.
    let file_type = entry.file_type()?;
    let marker = if file_type.is_dir() {
        "/"
    } else if file_type.is_symlink() {
        "@"
    } else if file_type.is_file() && is_executable(&entry.path()) {
        "*"
    } else {
        ""
    };

    Ok(Some(format!("{name}{marker}")))
}

/// Executable for the current (real) user, as `access(2)` with `X_OK` reports.
fn is_executable(path: &Path) -> bool {
    access(path, AccessFlags::X_OK).is_ok()
}
