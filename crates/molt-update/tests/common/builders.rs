//! Builders for API bodies and in-memory archives
//!
//! Archive builders write entry names straight into the header bytes so
//! hostile names like `../../../etc/passwd` survive the writer's own
//! validation.

use std::io::{Cursor, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use tar::{EntryType, Header};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::constants::*;

/// Builder for GitHub release JSON bodies
#[derive(Debug, Clone)]
pub struct GitHubReleaseBuilder {
    tag_name: String,
    published_at: Option<String>,
    assets: Vec<Value>,
}

impl GitHubReleaseBuilder {
    pub fn new(tag: &str) -> Self {
        Self {
            tag_name: tag.to_string(),
            published_at: Some("2025-01-15T10:00:00Z".to_string()),
            assets: Vec::new(),
        }
    }

    /// Add an asset whose browser URL points at `{base}/download/{name}`
    pub fn asset(mut self, id: u64, name: &str, base: &str, digest: Option<&str>) -> Self {
        let mut asset = json!({
            "id": id,
            "name": name,
            "browser_download_url": format!("{}/download/{}", base, name),
        });
        if let Some(digest) = digest {
            asset["digest"] = json!(digest);
        }
        self.assets.push(asset);
        self
    }

    pub fn build(self) -> Value {
        json!({
            "tag_name": self.tag_name,
            "published_at": self.published_at,
            "assets": self.assets,
        })
    }
}

/// One manifest entry
pub fn manifest_entry(version: &str, url: &str) -> Value {
    json!({ "version": version, "url": url })
}

/// One manifest entry with a single checksum field
pub fn manifest_entry_with(version: &str, url: &str, algorithm: &str, digest: &str) -> Value {
    let mut entry = manifest_entry(version, url);
    entry[algorithm] = json!(digest);
    entry
}

/// A tar entry description for [`tar_gz`]
#[derive(Debug, Clone)]
pub struct TarEntry {
    pub name: String,
    pub kind: EntryType,
    pub mode: u32,
    pub data: Vec<u8>,
    pub link: Option<String>,
}

impl TarEntry {
    pub fn file(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryType::Regular,
            mode: 0o644,
            data: data.to_vec(),
            link: None,
        }
    }

    pub fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryType::Directory,
            mode: 0o755,
            data: Vec::new(),
            link: None,
        }
    }

    pub fn symlink(name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryType::Symlink,
            mode: 0o777,
            data: Vec::new(),
            link: Some(target.to_string()),
        }
    }

    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }
}

/// Build a gzip-compressed tar archive in memory
pub fn tar_gz(entries: &[TarEntry]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in entries {
        let mut header = Header::new_old();
        write_raw(&mut header.as_old_mut().name, &entry.name);
        if let Some(link) = &entry.link {
            write_raw(&mut header.as_old_mut().linkname, link);
        }
        header.set_entry_type(entry.kind);
        header.set_mode(entry.mode);
        header.set_size(entry.data.len() as u64);
        header.set_mtime(0);
        header.set_cksum();
        builder.append(&header, entry.data.as_slice()).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

fn write_raw(field: &mut [u8], value: &str) {
    let bytes = value.as_bytes();
    assert!(bytes.len() < field.len(), "tar name too long: {}", value);
    field.fill(0);
    field[..bytes.len()].copy_from_slice(bytes);
}

/// A zip entry description for [`zip_archive`]
#[derive(Debug, Clone)]
pub enum ZipEntry {
    File { name: String, data: Vec<u8>, mode: u32 },
    Dir(String),
    Symlink { name: String, target: String },
}

impl ZipEntry {
    pub fn file(name: &str, data: &[u8]) -> Self {
        Self::File {
            name: name.to_string(),
            data: data.to_vec(),
            mode: 0o644,
        }
    }

    pub fn executable(name: &str, data: &[u8]) -> Self {
        Self::File {
            name: name.to_string(),
            data: data.to_vec(),
            mode: 0o755,
        }
    }

    pub fn dir(name: &str) -> Self {
        Self::Dir(name.to_string())
    }

    pub fn symlink(name: &str, target: &str) -> Self {
        Self::Symlink {
            name: name.to_string(),
            target: target.to_string(),
        }
    }
}

/// Build a zip archive in memory
pub fn zip_archive(entries: &[ZipEntry]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in entries {
        match entry {
            ZipEntry::File { name, data, mode } => {
                let options = SimpleFileOptions::default()
                    .compression_method(zip::CompressionMethod::Deflated)
                    .unix_permissions(*mode);
                zip.start_file(name.as_str(), options).unwrap();
                zip.write_all(data).unwrap();
            }
            ZipEntry::Dir(name) => {
                let options = SimpleFileOptions::default().unix_permissions(0o755);
                zip.add_directory(name.as_str(), options).unwrap();
            }
            ZipEntry::Symlink { name, target } => {
                zip.add_symlink(name.as_str(), target.as_str(), SimpleFileOptions::default())
                    .unwrap();
            }
        }
    }

    zip.finish().unwrap().into_inner()
}

/// Deterministic incompressible bytes
pub fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}

/// A tar.gz whose second entry is cut off half way through the stream
pub fn truncated_tar_gz(first: &str, first_data: &[u8], second: &str) -> Vec<u8> {
    let full = tar_gz(&[
        TarEntry::file(first, first_data),
        TarEntry::file(second, &noise(32 * 1024)),
    ]);
    full[..full.len() / 2].to_vec()
}

/// Release JSON for the default owner/repo with one linux asset
pub fn simple_release(tag: &str, base: &str, digest: Option<&str>) -> Value {
    GitHubReleaseBuilder::new(tag)
        .asset(1001, ASSET_LINUX, base, digest)
        .build()
}
