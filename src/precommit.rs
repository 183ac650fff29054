//! Installs pre-commit and its hooks into the active virtualenv, and
//! registers `cloudutil decode` as the git diff filter for userdata.

use anyhow::{Context, Result};
use log::{debug, info, warn};

use std::{
    env,
    ffi::OsString,
    path::PathBuf,
    process::Command,
};

const VENV_VAR: &str = "VIRTUAL_ENV";

const EXIT_HOOK_INSTALL: i32 = 4;
const EXIT_HOOK_RUN: i32 = 5;

#[derive(Debug, PartialEq, Eq)]
pub enum VenvProblem {
    Unset,
    Empty,
    Missing(PathBuf),
}

impl VenvProblem {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unset => 1,
            Self::Missing(_) => 2,
            Self::Empty => 3,
        }
    }

    pub fn hint(&self) -> [String; 2] {
        match self {
            Self::Unset => [
                "No virtualenv defined".to_owned(),
                "Please activate a virtualenv (with mkvirtualenv, workon, or pyenv)".to_owned(),
            ],
            Self::Empty => [
                format!("Environment variable '{}' is empty", VENV_VAR),
                "Please activate your virtualenv first".to_owned(),
            ],
            Self::Missing(path) => [
                format!("Virtual environment '{}' does not exist", path.display()),
                "Please activate a valid virtualenv first".to_owned(),
            ],
        }
    }
}

/// The virtualenv named by `value` (the `VIRTUAL_ENV` variable)
pub fn check_virtualenv(value: Option<OsString>) -> std::result::Result<PathBuf, VenvProblem> {
    let venv = match value {
        None => return Err(VenvProblem::Unset),
        Some(value) if value.is_empty() => return Err(VenvProblem::Empty),
        Some(value) => PathBuf::from(value),
    };

    if venv.is_dir() {
        Ok(venv)
    } else {
        Err(VenvProblem::Missing(venv))
    }
}

fn succeeds(command: &mut Command) -> bool {
    debug!("running {:?}", command);
    match command.status() {
        Ok(status) => status.success(),
        Err(e) => {
            warn!("{:?}: {}", command, e);
            false
        }
    }
}

pub fn run() -> Result<i32> {
    let venv = match check_virtualenv(env::var_os(VENV_VAR)) {
        Ok(venv) => venv,
        Err(problem) => {
            for line in problem.hint().iter() {
                println!("{}", line);
            }
            return Ok(problem.exit_code());
        }
    };
    info!("using virtualenv {}", venv.display());

    let exe = env::current_exe().context("locating cloudutil")?;
    let textconv = format!("{} decode", exe.display());
    if !succeeds(
        Command::new("git")
            .args(&["config", "diff.userdata.textconv"])
            .arg(&textconv),
    ) {
        println!("Problem configuring Git diff filter for userdata");
    }

    if !succeeds(Command::new("pre-commit").arg("--version")) {
        succeeds(Command::new("pip").args(&["install", "pre-commit"]));
    }

    if !succeeds(Command::new("pre-commit").arg("install")) {
        println!("Error setting up pre-commit hooks, try updating with pip install -U pre-commit");
        return Ok(EXIT_HOOK_INSTALL);
    }

    if !succeeds(Command::new("pre-commit").args(&["run", "--all-files"])) {
        println!("Problem running pre-commit hooks, check .pre-commit-config.yaml");
        return Ok(EXIT_HOOK_RUN);
    }

    Ok(0)
}
