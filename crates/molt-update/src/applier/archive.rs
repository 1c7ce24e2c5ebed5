//! Archive extraction for .zip and .tar.gz/.tgz releases
//!
//! Every entry name goes through [`safe_join`] before anything touches disk,
//! symlink entries are skipped in both formats, and writes never pass through a
//! symlink already present under the root. Extraction is not transactional:
//! when a stream turns out to be malformed part way, files already written stay
//! where they are.

use std::fs::{DirBuilder, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::safe_path::{ensure_no_symlinks, is_root_entry, safe_join};
use crate::error::{Result, UpdateError};

/// Mode used for directories when the archive does not declare one
const DEFAULT_DIR_MODE: u32 = 0o755;

/// Mode used for files when the archive does not declare one
const DEFAULT_FILE_MODE: u32 = 0o644;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Archive formats recognized by file-name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// Detect the format from the source name; `None` for anything else
    pub fn detect(source: &Path) -> Option<Self> {
        let name = source.to_string_lossy();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// Extracts an archive into a root directory
#[derive(Debug, Clone, Default)]
pub struct ArchiveApplier {
    extract_path: Option<PathBuf>,
}

impl ArchiveApplier {
    /// Extract next to the target
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract into `path` instead of the target's directory
    pub fn with_extract_path(path: impl Into<PathBuf>) -> Self {
        Self {
            extract_path: Some(path.into()),
        }
    }

    pub fn extract_path(&self) -> Option<&Path> {
        self.extract_path.as_deref()
    }

    /// Directory that entry names are resolved against
    pub fn extraction_root(&self, target: &Path) -> PathBuf {
        match &self.extract_path {
            Some(path) => path.clone(),
            None => match target.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }

    pub fn apply(&self, source: &Path, target: &Path) -> Result<()> {
        let root = self.extraction_root(target);
        let format = ArchiveFormat::detect(source)
            .ok_or_else(|| UpdateError::UnsupportedArchive(source.to_path_buf()))?;

        info!("Extracting {:?} archive {:?} into {:?}", format, source, root);

        match format {
            ArchiveFormat::Zip => extract_zip(source, &root),
            ArchiveFormat::TarGz => extract_tar_gz(source, &root),
        }
    }
}

fn open_archive(source: &Path) -> Result<File> {
    File::open(source)
        .map_err(|e| UpdateError::io(format!("Failed to open archive {}", source.display()), e))
}

fn extract_zip(source: &Path, root: &Path) -> Result<()> {
    let mut archive = ZipArchive::new(open_archive(source)?)
        .map_err(|e| UpdateError::decode(format!("zip archive {}", source.display()), e))?;

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| UpdateError::decode(format!("zip entry #{}", index), e))?;
        let name = file.name().to_string();
        let mode = file.unix_mode();

        // "./" names the extraction root itself
        if file.is_dir() && is_root_entry(&name) {
            continue;
        }

        let path = safe_join(root, &name)?;

        if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
            warn!("Skipping symlink entry: {}", name);
            continue;
        }

        ensure_no_symlinks(root, &path, &name)?;

        if file.is_dir() {
            create_dir(&path, mode.unwrap_or(DEFAULT_DIR_MODE))?;
            continue;
        }

        create_parent(&path)?;
        copy_entry(&mut file, &path, mode.unwrap_or(DEFAULT_FILE_MODE), &name)?;
    }

    Ok(())
}

fn extract_tar_gz(source: &Path, root: &Path) -> Result<()> {
    let decoder = GzDecoder::new(open_archive(source)?);
    let mut archive = Archive::new(decoder);
    let context = format!("tar.gz archive {}", source.display());

    let entries = archive
        .entries()
        .map_err(|e| UpdateError::decode(context.as_str(), e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| UpdateError::decode(context.as_str(), e))?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

        let entry_type = entry.header().entry_type();
        if entry_type.is_dir() && is_root_entry(&name) {
            continue;
        }

        let path = safe_join(root, &name)?;

        if entry_type.is_dir() {
            ensure_no_symlinks(root, &path, &name)?;
            let mode = entry.header().mode().unwrap_or(DEFAULT_DIR_MODE);
            create_dir(&path, mode)?;
        } else if entry_type.is_file() {
            ensure_no_symlinks(root, &path, &name)?;
            let mode = entry.header().mode().unwrap_or(DEFAULT_FILE_MODE);
            create_parent(&path)?;
            copy_entry(&mut entry, &path, mode, &name)?;
        } else {
            debug!("Skipping {:?} entry: {}", entry_type, name);
        }
    }

    Ok(())
}

fn create_dir(path: &Path, mode: u32) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode & 0o7777);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder
        .create(path)
        .map_err(|e| UpdateError::io(format!("Failed to create directory {}", path.display()), e))
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => create_dir(parent, DEFAULT_DIR_MODE),
        None => Ok(()),
    }
}

/// Stream one entry into a fresh file created with `mode`
fn copy_entry<R: Read>(reader: &mut R, path: &Path, mode: u32, name: &str) -> Result<u64> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode & 0o7777);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut out = options
        .open(path)
        .map_err(|e| UpdateError::io(format!("Failed to create {}", path.display()), e))?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(UpdateError::decode(format!("archive entry {}", name), e)),
        };
        out.write_all(&buffer[..read])
            .map_err(|e| UpdateError::io(format!("Failed to write {}", path.display()), e))?;
        written += read as u64;
    }

    out.flush()
        .map_err(|e| UpdateError::io(format!("Failed to flush {}", path.display()), e))?;
    debug!("Extracted {} ({} bytes)", name, written);
    Ok(written)
}
