/// Persisted best depth across all runs.
///
/// A single TOML file holding one integer:
///
/// ```toml
/// best_depth = 17
/// ```
///
/// Read once at start-up, rewritten whenever a run beats it. A missing
/// file means no run has finished yet (best depth 0).

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file i/o: {0}")]
    Io(#[from] io::Error),
    #[error("save file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not encode save file: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
struct SaveFile {
    #[serde(default)]
    best_depth: u32,
}

fn save_dir() -> PathBuf {
    // 1. Exe directory, when writable (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let probe = parent.join(".write_test_corridor_descent");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/corridor-descent");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve the configured save file name. Absolute paths are used as is.
pub fn save_path(file_name: &str) -> PathBuf {
    let p = PathBuf::from(file_name);
    if p.is_absolute() { p } else { save_dir().join(p) }
}

pub fn load_best(path: &Path) -> Result<u32, SaveError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let file: SaveFile = toml::from_str(&text)?;
    Ok(file.best_depth)
}

pub fn save_best(path: &Path, best_depth: u32) -> Result<(), SaveError> {
    let text = toml::to_string(&SaveFile { best_depth })?;
    std::fs::write(path, text)?;
    Ok(())
}
