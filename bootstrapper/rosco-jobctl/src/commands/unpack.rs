use anyhow::{Context, Result};
use clap::Args;
use job_context::{UnpackOptions, DEFAULT_CONTEXT_FILE, DEFAULT_SCRIPT_PATH};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Job context envelope to read
    #[arg(long, env = "ROSCO_JOB_CONTEXT_FILE", default_value = DEFAULT_CONTEXT_FILE)]
    pub context_file: PathBuf,

    /// Where to write the generated job script
    #[arg(long, env = "ROSCO_JOB_SCRIPT_PATH", default_value = DEFAULT_SCRIPT_PATH)]
    pub script_path: PathBuf,

    /// Directory relative paths resolve against
    #[arg(long, env = "ROSCO_JOB_WORKING_DIR", default_value = ".")]
    pub working_dir: PathBuf,
}

pub fn run(args: UnpackArgs) -> Result<()> {
    let options = UnpackOptions {
        context_file: args.context_file,
        script_path: args.script_path,
        working_dir: args.working_dir,
    };
    let report = job_context::unpack(&options).with_context(|| {
        format!(
            "failed to unpack job context {}",
            options.context_path().display()
        )
    })?;

    for path in &report.config_files {
        println!("wrote {}", path.display());
    }
    println!("wrote {}", report.script_path.display());
    Ok(())
}
