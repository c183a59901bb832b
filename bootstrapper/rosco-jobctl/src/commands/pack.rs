use anyhow::{bail, Context, Result};
use clap::Args;
use job_context::collect::parse_credential;
use job_context::{JobContextBuilder, DEFAULT_COMMAND_TIMEOUT};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct PackArgs {
    /// Envelope file to write
    #[arg(long, short)]
    pub output: PathBuf,

    /// Local directory whose files become the config map
    #[arg(long)]
    pub config_source: Option<PathBuf>,

    /// Directory the job container writes the config files to
    #[arg(long)]
    pub config_dir: String,

    /// Duration passed to `timeout` in the job script
    #[arg(long, default_value = DEFAULT_COMMAND_TIMEOUT)]
    pub timeout: String,

    /// Credential exported by the job script, as NAME=VALUE (repeatable)
    #[arg(long = "credential", value_name = "NAME=VALUE")]
    pub credentials: Vec<String>,

    /// Job command words, joined with single spaces
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

pub fn run(args: PackArgs) -> Result<()> {
    let command = args.command.join(" ");
    if command.trim().is_empty() {
        bail!("job command cannot be empty");
    }

    let mut builder =
        JobContextBuilder::new(args.config_dir, command).command_timeout(args.timeout);

    if let Some(source) = &args.config_source {
        let config_map = job_context::collect_config_map(source)
            .with_context(|| format!("failed to collect config from {}", source.display()))?;
        builder = builder.config_map(config_map);
    }

    for raw in &args.credentials {
        let (name, value) = parse_credential(raw)?;
        builder = builder.credential(name, value);
    }

    let context = builder.build()?;
    job_context::write_job_context(&args.output, &context)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        config_files = context.config_map.len(),
        credentials = context.aws_credentials.len(),
        "packed job context"
    );
    println!("wrote {}", args.output.display());
    Ok(())
}
