//! Atlas remote name (`user-org/env`) from a Terraform remote state file

use anyhow::anyhow;
use serde::Deserialize;
use serde_json::Value;

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

pub const TF_STATE: &str = ".terraform/terraform.tfstate";

const EXIT_LOCAL: i32 = 2;

#[derive(Deserialize)]
struct State {
    #[serde(default)]
    remote: Option<Remote>,
}

#[derive(Deserialize)]
struct Remote {
    config: RemoteConfig,
}

#[derive(Deserialize)]
struct RemoteConfig {
    name: String,
}

#[derive(Debug)]
pub enum StateError {
    /// Not JSON at all
    Format,
    /// JSON, but not shaped like a remote state
    Structure,
    Io(io::Error),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Format => write!(f, "Unknown format in Terraform state"),
            Self::Structure => write!(f, "Unknown structure in Terraform state"),
            Self::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StateError {}

/// `None` when the state is local
pub fn parse_state(text: &str) -> Result<Option<String>, StateError> {
    let value: Value = serde_json::from_str(text).map_err(|_| StateError::Format)?;
    if !value.is_object() {
        return Err(StateError::Structure);
    }
    let state: State = serde_json::from_value(value).map_err(|_| StateError::Structure)?;

    match state.remote {
        None => Ok(None),
        Some(remote) if remote.config.name.matches('/').count() == 1 => {
            Ok(Some(remote.config.name))
        }
        Some(_) => Err(StateError::Structure),
    }
}

/// With `default_location`, a missing state file inside an existing
/// `.terraform` directory means the state is local
pub fn remote_name(path: &Path, default_location: bool) -> Result<Option<String>, StateError> {
    match fs::read_to_string(path) {
        Ok(text) => parse_state(&text),
        Err(e)
            if default_location
                && e.kind() == io::ErrorKind::NotFound
                && path.parent().map_or(false, Path::is_dir) =>
        {
            Ok(None)
        }
        Err(e) => Err(StateError::Io(e)),
    }
}

pub fn run(state: Option<PathBuf>) -> anyhow::Result<i32> {
    let default_location = state.is_none();
    let path = state.unwrap_or_else(|| PathBuf::from(TF_STATE));

    match remote_name(&path, default_location) {
        Ok(Some(name)) => {
            println!("{}", name);
            Ok(0)
        }
        Ok(None) => {
            eprintln!("State is local");
            Ok(EXIT_LOCAL)
        }
        Err(StateError::Io(e)) => Err(anyhow::Error::new(e).context(path.display().to_string())),
        Err(e) => Err(anyhow!("{}: '{}'", e, path.display())),
    }
}
