use anyhow::{Context, Result};
use clap::Parser;
use img_press::cli::{Args, Commands};
use img_press::{
    logger, CompressionError, CompressionRequest, CompressorService, ImageRecord, OutputEnvelope,
    OutputMode, ServiceConfig,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CompressionError>() {
                Some(inner) if inner.is_bad_request() => log::error!("Bad request: {}", inner),
                _ => log::error!("{:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = ServiceConfig::load(args.config.as_deref())
        .map_err(CompressionError::from)
        .context("Failed to load configuration")?;

    if let Commands::Config = args.command {
        print!("{}", config.to_toml().map_err(CompressionError::from)?);
        return Ok(());
    }

    let service = CompressorService::from_config(config)?;

    let envelope = match args.command {
        Commands::Compress {
            url,
            id,
            quality,
            output,
        } => {
            let request = CompressionRequest::new(ImageRecord::new(id, url))
                .with_quality(quality)
                .with_output(parse_output(&output)?);
            service.compress_image(&request)?
        }
        Commands::Batch {
            urls,
            quality,
            output,
            progress,
        } => {
            let records = urls
                .into_iter()
                .zip(1..)
                .map(|(url, id)| ImageRecord::new(id, url))
                .collect();
            service
                .with_progress(progress)
                .compress_images(Some(records), quality, parse_output(&output)?)?
        }
        Commands::Manifest {
            file,
            quality,
            output,
            progress,
        } => service.with_progress(progress).compress_from_manifest(
            &file,
            quality,
            parse_output(&output)?,
        )?,
        Commands::Raw {
            input,
            quality,
            output,
        } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("Failed to read image file {}", input.display()))?;
            service.compress_raw_image(&bytes, quality, parse_output(&output)?)?
        }
        Commands::Config => unreachable!("handled above"),
    };

    print_envelope(&envelope)
}

fn parse_output(raw: &str) -> std::result::Result<OutputMode, CompressionError> {
    raw.parse::<OutputMode>().map_err(CompressionError::from)
}

fn print_envelope(envelope: &OutputEnvelope) -> Result<()> {
    match envelope {
        OutputEnvelope::Inline(result) => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputEnvelope::Manifest { location, .. } => println!("{}", location),
    }
    Ok(())
}
