use crate::encode::PROGRESS_INTERVAL;
use crate::error::RenameError;
use crate::format::Format;
use crate::io::until_err;
use crate::mapfile::MapTable;
use crate::record::fasta::{self, FastaWriter, SequenceRecord};
use crate::record::gff::{self, GffWriter};
use crate::record::xsv::{self, XsvWriter};
use crate::record::{Field, Fields, RecordSink};
use anyhow::{bail, Result};
use std::io::Write;

pub struct DecodeOptions {
    pub format: Format,
    pub field: Field,
    pub header: bool,
    pub comment: String,
    /// records between flushes of the output
    pub chunk_size: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    pub records: usize,
    pub written: usize,
}

/// Restores the original ids of previously encoded `inputs` using `table`.
///
/// FASTA records whose id stands for several originals (deduplicated input) are written
/// once per original. Delimited and GFF3 values must map to exactly one original.
pub fn decode(
    inputs: &[String],
    writer: impl Write,
    table: &MapTable,
    opts: &DecodeOptions,
) -> Result<DecodeStats> {
    info!(
        "Decoding the {} of {} input(s) as {:?} using {} map keys",
        opts.field,
        inputs.len(),
        opts.format,
        table.len()
    );

    let stats = match opts.format {
        Format::Fasta => decode_sequences(
            fasta::read_many(inputs, &opts.comment),
            FastaWriter::new(writer),
            table,
            opts.field,
            opts.chunk_size,
        )?,
        Format::Csv | Format::Tsv => {
            let delimiter = opts.format.delimiter().unwrap_or(b',');
            decode_records(
                xsv::read_many(inputs, delimiter, &opts.comment, opts.header),
                XsvWriter::new(writer, delimiter),
                table,
                opts.field,
                opts.chunk_size,
            )?
        }
        Format::Gff3 => decode_records(
            gff::read_many(inputs),
            GffWriter::new(writer),
            table,
            opts.field,
            opts.chunk_size,
        )?,
    };

    info!(
        "Stats: {} records read, {} records written",
        stats.records, stats.written
    );

    Ok(stats)
}

/// Decodes FASTA records, fanning each one out into one record per original value.
fn decode_sequences<I, S>(
    records: I,
    mut sink: S,
    table: &MapTable,
    field: Field,
    chunk_size: usize,
) -> Result<DecodeStats>
where
    I: Iterator<Item = Result<SequenceRecord>>,
    S: RecordSink<SequenceRecord>,
{
    let mut stats = DecodeStats::default();
    let mut err = Ok(());

    records
        .scan(&mut err, until_err)
        .try_for_each(|record| -> Result<()> {
            let key = match field {
                Field::Id => record.id.as_str(),
                Field::Description => record.description.as_deref().unwrap_or(""),
                other => bail!(RenameError::InvalidConfiguration(format!(
                    "FASTA records have no {other} field"
                ))),
            };

            for original in table.lookup(key)? {
                let mut decoded = record.clone();
                decoded.substitute(field, |_| Ok(original.clone()))?;
                sink.write(&decoded)?;
                stats.written += 1;
            }

            stats.records += 1;
            if stats.records % chunk_size == 0 {
                sink.flush()?;
            }
            if stats.records % PROGRESS_INTERVAL == 0 {
                info!("Processed: {}", stats.records);
            }
            Ok(())
        })?;

    err?;

    sink.flush()?;
    Ok(stats)
}

/// Decodes records whose values must each map back to a single original.
fn decode_records<R, I, S>(
    records: I,
    mut sink: S,
    table: &MapTable,
    field: Field,
    chunk_size: usize,
) -> Result<DecodeStats>
where
    R: Fields,
    I: Iterator<Item = Result<R>>,
    S: RecordSink<R>,
{
    let mut stats = DecodeStats::default();
    let mut err = Ok(());

    records
        .scan(&mut err, until_err)
        .try_for_each(|mut record| -> Result<()> {
            if !record.is_passthrough() {
                record.substitute(field, |key| table.lookup_one(key).map(str::to_string))?;
                stats.records += 1;
            }

            sink.write(&record)?;
            stats.written += 1;

            if stats.written % chunk_size == 0 {
                sink.flush()?;
            }
            if stats.written % PROGRESS_INTERVAL == 0 {
                info!("Processed: {}", stats.written);
            }
            Ok(())
        })?;

    err?;

    sink.flush()?;
    Ok(stats)
}
