//! OpenStack config drive metadata, printed as `key=value` lines so shell
//! scripts can `eval` them.

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, warn};
use serde_json::{error::Category, Map, Value};
use tempfile::TempDir;

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

/// Pinned config drive API revision
pub const META_NAME: &str = "openstack/2013-10-17/meta_data.json";
pub const CONFIG_DRIVE: &str = "/dev/disk/by-label/config-2";
/// User-provided metadata (tags)
pub const DEFAULT_KEY: &str = "meta";

pub type Metadata = Map<String, Value>;

/// The config drive, mounted read-only on a temporary directory for as long
/// as this lives
struct MountedDrive {
    dir: Option<TempDir>,
}

impl MountedDrive {
    fn mount(device: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("confdrv.")
            .tempdir()
            .context("creating mount point")?;

        let output = Command::new("mount")
            .arg("-r")
            .arg(device)
            .arg(dir.path())
            .output()
            .context("running mount")?;
        if !output.status.success() {
            let mut message = output.stderr;
            message.extend_from_slice(&output.stdout);
            bail!("{}", String::from_utf8_lossy(&message).trim_end());
        }

        debug!("mounted {} on {}", device, dir.path().display());
        Ok(Self { dir: Some(dir) })
    }

    fn path(&self) -> &Path {
        self.dir.as_ref().map_or_else(|| Path::new(""), TempDir::path)
    }
}

impl Drop for MountedDrive {
    fn drop(&mut self) {
        let dir = match self.dir.take() {
            Some(dir) => dir,
            None => return,
        };

        match Command::new("umount").arg(dir.path()).status() {
            Ok(status) if status.success() => {}
            other => {
                // Still mounted, so leave the directory where it is
                warn!("could not unmount {}: {:?}", dir.path().display(), other);
                std::mem::forget(dir);
            }
        }
    }
}

pub fn parse_metadata(text: &str) -> Result<Metadata> {
    serde_json::from_str(text).map_err(|e| match e.classify() {
        Category::Syntax | Category::Eof => anyhow!("Unknown format in metadata file"),
        Category::Data | Category::Io => anyhow!("Unknown structure in metadata file"),
    })
}

pub fn read_metadata(path: &Path) -> Result<Metadata> {
    let text = fs::read_to_string(path).with_context(|| path.display().to_string())?;
    parse_metadata(&text)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `subkey=value` for every entry when `key` holds an object, otherwise the
/// single `key=value`
pub fn format_entries(metadata: &Metadata, key: &str) -> Result<Vec<String>> {
    let value = metadata
        .get(key)
        .ok_or_else(|| anyhow!("Key '{}' not found in metadata", key))?;

    Ok(match value {
        Value::Object(entries) => entries
            .iter()
            .map(|(subkey, value)| format!("{}={}", subkey, display_value(value)))
            .collect(),
        other => vec![format!("{}={}", key, display_value(other))],
    })
}

pub fn run(args: &[String]) -> Result<i32> {
    let (file, key) = match args {
        [] => (None, DEFAULT_KEY),
        [key] => (None, key.as_str()),
        [file, key] => (Some(PathBuf::from(file)), key.as_str()),
        _ => bail!("usage: cloudutil getconfig [[FILE] KEY]"),
    };

    let metadata = match file {
        Some(path) => read_metadata(&path)?,
        None => {
            let drive = MountedDrive::mount(CONFIG_DRIVE)?;
            read_metadata(&drive.path().join(META_NAME))?
        }
    };

    for line in format_entries(&metadata, key)? {
        println!("{}", line);
    }

    Ok(0)
}
