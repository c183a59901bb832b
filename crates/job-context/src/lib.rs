use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub mod collect;
pub mod context;
pub mod error;
pub mod materialize;
pub mod script;

pub use collect::{collect_config_map, JobContextBuilder, DEFAULT_COMMAND_TIMEOUT};
pub use context::{load_job_context, write_job_context, ContextEnvelope, JobContext, PAYLOAD_FIELD};
pub use error::{JobContextError, Result};
pub use materialize::{ensure_config_dir, materialize_config, resolve_path};
pub use script::{render_job_script, write_job_script, DEFAULT_SCRIPT_PATH};

/// Envelope file read when the caller does not name one.
pub const DEFAULT_CONTEXT_FILE: &str = "job-context.json";

/// Where `unpack` reads from and writes to.
///
/// Relative paths, including the context's own config dir, resolve
/// against `working_dir`.
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    pub context_file: PathBuf,
    pub script_path: PathBuf,
    pub working_dir: PathBuf,
}

impl UnpackOptions {
    pub fn in_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            context_file: PathBuf::from(DEFAULT_CONTEXT_FILE),
            script_path: PathBuf::from(DEFAULT_SCRIPT_PATH),
            working_dir: working_dir.into(),
        }
    }

    pub fn context_path(&self) -> PathBuf {
        resolve_path(&self.working_dir, &self.context_file)
    }

    pub fn script_path(&self) -> PathBuf {
        resolve_path(&self.working_dir, &self.script_path)
    }
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackReport {
    pub config_files: Vec<PathBuf>,
    pub script_path: PathBuf,
}

/// Decode the job context, write its config files and generate the job script.
///
/// Steps run in order and the first failure aborts the rest.
#[instrument(skip(options), fields(working_dir = %options.working_dir.display()))]
pub fn unpack(options: &UnpackOptions) -> Result<UnpackReport> {
    let context = load_job_context(&options.context_path())?;
    unpack_context(&context, &options.working_dir, &options.script_path())
}

/// Same as [`unpack`] for a context that is already decoded.
pub fn unpack_context(
    context: &JobContext,
    working_dir: &Path,
    script_path: &Path,
) -> Result<UnpackReport> {
    let config_files = materialize_config(context, working_dir)?;
    let script = render_job_script(context);
    write_job_script(script_path, &script)?;
    info!(
        script = %script_path.display(),
        config_files = config_files.len(),
        "job context unpacked"
    );
    Ok(UnpackReport {
        config_files,
        script_path: script_path.to_path_buf(),
    })
}
