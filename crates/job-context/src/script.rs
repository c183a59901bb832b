use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{debug, instrument};

use crate::context::JobContext;
use crate::error::{JobContextError, Result};

/// Default name of the generated wrapper, relative to the working dir.
pub const DEFAULT_SCRIPT_PATH: &str = "execute-rosco-job.sh";

const SCRIPT_MODE: u32 = 0o755;

/// Render the wrapper that exports credentials and runs the job under `timeout`.
pub fn render_job_script(context: &JobContext) -> String {
    let exports = context
        .aws_credentials
        .iter()
        .map(|(name, value)| format!("export {}={}", name, shell_value(value)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"#!/usr/bin/env bash

{exports}

timeout "{timeout}" {command}  || {{
  exitCode=$?
  echo "The Rosco Job exited with code: ${{exitCode}}"
  exit ${{exitCode}}
}}
"#,
        exports = exports,
        timeout = context.command_timeout,
        command = context.job_command,
    )
}

fn shell_value(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=+,@%".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

#[instrument(skip(contents))]
pub fn write_job_script(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| JobContextError::io(path, e))?;

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(SCRIPT_MODE))
        .map_err(|e| JobContextError::io(path, e))?;

    debug!("wrote job script with mode {:o}", SCRIPT_MODE);
    Ok(())
}
