//! Single-file replacement via temp file and same-directory rename

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, UpdateError};

/// Mode forced onto the target after a successful swap
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Suffix of the staging file written next to the target
pub const TEMP_SUFFIX: &str = ".tmp";

/// Replaces the target file with the source in one rename
///
/// The target keeps its previous content until the rename succeeds. Any
/// failure before that point removes the staging file.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryApplier;

impl BinaryApplier {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, source: &Path, target: &Path) -> Result<()> {
        debug!("Replacing binary: {:?} -> {:?}", source, target);

        let mut source_file = File::open(source).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                UpdateError::InvalidSource(source.to_path_buf())
            } else {
                UpdateError::io(format!("Failed to open source {}", source.display()), e)
            }
        })?;
        let metadata = source_file
            .metadata()
            .map_err(|e| UpdateError::io(format!("Failed to stat source {}", source.display()), e))?;
        if !metadata.is_file() {
            return Err(UpdateError::InvalidSource(source.to_path_buf()));
        }

        let temp = temp_path(target);
        if let Err(e) = stage_and_swap(&mut source_file, &metadata, &temp, target) {
            if let Err(remove_err) = fs::remove_file(&temp) {
                if remove_err.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove temp file {:?}: {}", temp, remove_err);
                }
            }
            return Err(e);
        }

        set_executable(target)?;

        info!("Binary replaced: {:?}", target);
        Ok(())
    }
}

/// `target` with ".tmp" appended to the full file name
pub fn temp_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn stage_and_swap(
    source: &mut File,
    metadata: &fs::Metadata,
    temp: &Path,
    target: &Path,
) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(metadata.permissions().mode());
    }
    #[cfg(not(unix))]
    let _ = metadata;

    let mut staged = options
        .open(temp)
        .map_err(|e| UpdateError::io(format!("Failed to create {}", temp.display()), e))?;
    io::copy(source, &mut staged)
        .map_err(|e| UpdateError::io(format!("Failed to copy into {}", temp.display()), e))?;
    staged
        .flush()
        .map_err(|e| UpdateError::io(format!("Failed to flush {}", temp.display()), e))?;
    drop(staged);

    match fs::remove_file(target) {
        Ok(()) => debug!("Removed previous target {:?}", target),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(UpdateError::io(
                format!("Failed to remove old target {}", target.display()),
                e,
            ))
        }
    }

    fs::rename(temp, target).map_err(|e| {
        UpdateError::io(
            format!("Failed to rename {} to {}", temp.display(), target.display()),
            e,
        )
    })
}

fn set_executable(target: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(target, fs::Permissions::from_mode(EXECUTABLE_MODE)).map_err(|e| {
            UpdateError::io(
                format!("Failed to set executable permissions on {}", target.display()),
                e,
            )
        })?;
    }
    #[cfg(not(unix))]
    let _ = target;

    Ok(())
}
