//! Producer side: assemble a job context from a local config tree.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::context::JobContext;
use crate::error::{JobContextError, Result};

/// Timeout handed to the job when the caller gives none.
pub const DEFAULT_COMMAND_TIMEOUT: &str = "30m";

// Duration syntax accepted by coreutils `timeout`.
static TIMEOUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)?[smhd]?$").expect("timeout pattern compiles")
});

static ENV_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("env name pattern compiles"));

/// Read every readable regular file under `dir`, keyed by file name.
///
/// Symlinks to regular files count as regular files. Files that cannot be
/// opened for reading are skipped. Nested files are flattened; when two
/// files share a name the first one in walk order (sorted by file name)
/// is kept.
#[instrument]
pub fn collect_config_map(dir: &Path) -> Result<BTreeMap<String, String>> {
    if !dir.is_dir() {
        return Err(JobContextError::io(
            dir,
            std::io::Error::new(ErrorKind::NotFound, "config source is not a directory"),
        ));
    }

    let mut config_map = BTreeMap::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            JobContextError::io(path, e.into())
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                warn!("skipping unreadable {:?}", path);
                continue;
            }
            Err(e) => return Err(JobContextError::io(path, e)),
        };
        let contents = String::from_utf8(bytes).map_err(|_| JobContextError::NonUtf8Config {
            path: path.to_path_buf(),
        })?;

        let name = entry.file_name().to_string_lossy().to_string();
        match config_map.entry(name) {
            Entry::Vacant(slot) => {
                debug!("collected {:?}", path);
                slot.insert(contents);
            }
            Entry::Occupied(slot) => {
                warn!("skipping {:?}: '{}' already collected", path, slot.key());
            }
        }
    }
    Ok(config_map)
}

pub fn validate_timeout(timeout: &str) -> Result<()> {
    if TIMEOUT_RE.is_match(timeout) {
        Ok(())
    } else {
        Err(JobContextError::InvalidInput {
            what: "command timeout",
            value: timeout.to_string(),
        })
    }
}

/// Parse a `NAME=VALUE` credential argument.
pub fn parse_credential(raw: &str) -> Result<(String, String)> {
    let invalid = || JobContextError::InvalidInput {
        what: "credential (expected NAME=VALUE)",
        value: raw.split('=').next().unwrap_or_default().to_string(),
    };
    let (name, value) = raw.split_once('=').ok_or_else(invalid)?;
    if !ENV_NAME_RE.is_match(name) {
        return Err(invalid());
    }
    Ok((name.to_string(), value.to_string()))
}

/// Builder for the context a job executor hands to a remote container.
#[derive(Debug, Clone)]
pub struct JobContextBuilder {
    config_map: BTreeMap<String, String>,
    config_dir: String,
    job_command: String,
    command_timeout: String,
    aws_credentials: BTreeMap<String, String>,
}

impl JobContextBuilder {
    pub fn new(config_dir: impl Into<String>, job_command: impl Into<String>) -> Self {
        Self {
            config_map: BTreeMap::new(),
            config_dir: config_dir.into(),
            job_command: job_command.into(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT.to_string(),
            aws_credentials: BTreeMap::new(),
        }
    }

    pub fn config_map(mut self, config_map: BTreeMap<String, String>) -> Self {
        self.config_map = config_map;
        self
    }

    pub fn command_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.command_timeout = timeout.into();
        self
    }

    pub fn credential(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.aws_credentials.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Result<JobContext> {
        validate_timeout(&self.command_timeout)?;
        if self.job_command.trim().is_empty() {
            return Err(JobContextError::InvalidInput {
                what: "job command",
                value: self.job_command,
            });
        }
        for name in self.aws_credentials.keys() {
            if !ENV_NAME_RE.is_match(name) {
                return Err(JobContextError::InvalidInput {
                    what: "credential name",
                    value: name.clone(),
                });
            }
        }
        Ok(JobContext {
            config_map: self.config_map,
            config_dir: self.config_dir,
            job_command: self.job_command,
            command_timeout: self.command_timeout,
            aws_credentials: self.aws_credentials,
        })
    }
}
