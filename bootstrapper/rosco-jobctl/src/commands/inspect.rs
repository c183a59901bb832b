//! Inspect command - show what a job context would unpack to

use anyhow::{Context, Result};
use clap::Args;
use job_context::DEFAULT_CONTEXT_FILE;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Job context envelope to read
    #[arg(long, env = "ROSCO_JOB_CONTEXT_FILE", default_value = DEFAULT_CONTEXT_FILE)]
    pub context_file: PathBuf,

    /// Print credential values instead of masking them
    #[arg(long)]
    pub raw: bool,

    /// Print the job script that unpack would generate
    #[arg(long)]
    pub script: bool,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let context = job_context::load_job_context(&args.context_file)
        .with_context(|| format!("failed to load {}", args.context_file.display()))?;

    if args.script {
        let shown = if args.raw {
            context
        } else {
            context.without_secrets()
        };
        print!("{}", job_context::render_job_script(&shown));
        return Ok(());
    }

    let value = if args.raw {
        serde_json::to_value(&context)?
    } else {
        context.redacted()?
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
