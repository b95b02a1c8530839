extern crate env_logger;
#[macro_use]
extern crate log;
use std::{
    fs::File,
    io::{prelude::*, stdout, BufWriter},
    path::Path,
};

use anyhow::{bail, Context, Result};
use clap::Parser;

mod cli;
mod decode;
mod encode;
mod error;
mod format;
mod id;
mod io;
mod mapfile;
mod record;
mod rename;

use cli::{Cli, Commands, InputArgs};
use decode::DecodeOptions;
use encode::EncodeOptions;
use error::RenameError;
use format::Format;
use mapfile::MapTable;

/// Creates a `BufWriter` for the given output option. This allows for an output file to be passed
/// or otherwise will default to using standard output.
///
/// # Arguments
///
/// * `output` - An `Option` containing the path to the output file as a `String`.
fn get_writer(output: &Option<String>) -> Result<impl Write> {
    // get output as a BufWriter - equal to stdout if None
    let writer = BufWriter::new(match output {
        Some(ref x) => {
            let file = File::create(Path::new(x))
                .with_context(|| format!("Unable to create output file {x}"))?;
            Box::new(file) as Box<dyn Write + Send>
        }
        None => Box::new(stdout()) as Box<dyn Write + Send>,
    });
    Ok(writer)
}

/// The resolved format, field and comment marker of the shared input options.
fn resolve_input(input: &InputArgs) -> Result<(Format, record::Field, String)> {
    if input.chunk_size == 0 {
        bail!(RenameError::InvalidConfiguration(
            "--chunk-size must be at least 1".to_string()
        ));
    }

    let format = Format::resolve(input.format, input.infiles.first().map(String::as_str))?;
    let field = format.field(input.column.as_deref())?;
    let comment = input
        .comment
        .clone()
        .unwrap_or_else(|| format.default_comment().to_string());

    Ok((format, field, comment))
}

fn try_main(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Encode {
            input,
            length,
            prefix,
            deduplicate,
            strip,
            upper,
            map,
        } => {
            let (format, field, comment) = resolve_input(input)?;
            let opts = EncodeOptions {
                format,
                field,
                prefix: prefix.clone(),
                length: *length,
                deduplicate: *deduplicate,
                header: input.header,
                comment,
                upper: *upper,
                strip: strip.clone(),
                chunk_size: input.chunk_size,
            };

            let writer = get_writer(&input.output)?;
            let map_writer = BufWriter::new(
                File::create(Path::new(map))
                    .with_context(|| format!("Unable to create map file {map}"))?,
            );

            encode::encode(&input.infiles, writer, map_writer, &opts)?;
            info!("Wrote the id map to {map}");
        }
        Commands::Decode { input, map } => {
            let (format, field, comment) = resolve_input(input)?;
            let opts = DecodeOptions {
                format,
                field,
                header: input.header,
                comment,
                chunk_size: input.chunk_size,
            };

            let table = MapTable::from_path(map)?;
            info!("Loaded {} keys from {map}", table.len());

            let writer = get_writer(&input.output)?;
            decode::decode(&input.infiles, writer, &table, &opts)?;
        }
    };

    info!("Completed successfully.");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(err) = try_main(cli) {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(error::exit_code(&err));
    }
}
