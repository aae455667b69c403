use clap::Parser;
use log::{error, info};
use quire::{FilesystemResourceProvider, OutputFormat, PipelineBuilder, PipelineError, RenderConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Formats an XSL-FO document as AFP or PDF.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about)]
struct Cli {
    /// Formatting-object document to read.
    input: PathBuf,

    /// File to write.
    output: PathBuf,

    /// Output format. Defaults to the output file extension, then the
    /// configuration.
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// TOML configuration file. `QUIRE_*` environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory graphic sources are resolved against. Defaults to the
    /// input file's directory.
    #[arg(long)]
    resources: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    let config = RenderConfig::load(cli.config.as_deref())?;
    let format = cli
        .format
        .or_else(|| OutputFormat::from_extension(&cli.output))
        .unwrap_or(config.output.format);
    let base = cli.resources.clone().unwrap_or_else(|| {
        cli.input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default()
    });

    let pipeline = PipelineBuilder::new()
        .with_config(config)
        .with_format(format)
        .with_resources(Arc::new(FilesystemResourceProvider::new(base)))
        .build()?;

    info!("Formatting {} as {}", cli.input.display(), format);
    let stats = pipeline.render_file(&cli.input, &cli.output)?;
    info!(
        "Wrote {} pages to {} in {:.1} ms",
        stats.pages,
        cli.output.display(),
        stats.elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
