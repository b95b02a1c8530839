use crate::format::Format;
use crate::id::IdGenerator;
use crate::io::until_err;
use crate::record::fasta::{self, FastaWriter, SequenceRecord};
use crate::record::gff::{self, GffWriter};
use crate::record::xsv::{self, XsvWriter};
use crate::record::{Field, Fields, RecordSink};
use crate::rename::{Mode, RenameStats, RenameTransform};
use anyhow::Result;
use std::io::Write;

/// Records between progress messages.
pub const PROGRESS_INTERVAL: usize = 50000;

pub struct EncodeOptions {
    pub format: Format,
    pub field: Field,
    pub prefix: String,
    pub length: usize,
    pub deduplicate: bool,
    pub header: bool,
    pub comment: String,
    pub upper: bool,
    pub strip: Option<String>,
    /// records between flushes of the output and the map file
    pub chunk_size: usize,
}

impl EncodeOptions {
    /// Deduplication only applies to sequences; other formats always replace.
    fn mode(&self) -> Mode {
        match (self.deduplicate, self.format) {
            (true, Format::Fasta) => Mode::Deduplicate,
            (true, _) => {
                warn!("--deduplicate is only used for fasta input, ignoring it");
                Mode::Replace
            }
            (false, _) => Mode::Replace,
        }
    }

    fn warn_unused(&self) {
        if self.format == Format::Fasta {
            return;
        }
        if self.upper {
            warn!("--upper is only used for fasta input, ignoring it");
        }
        if self.strip.is_some() {
            warn!("--strip is only used for fasta input, ignoring it");
        }
    }
}

/// Renames the ids in `inputs`, writing the renamed records to `writer` and the id
/// mapping to `map`.
///
/// # Arguments
///
/// * `inputs` - Input paths, read in order as one stream. `-` is standard input.
/// * `writer` - Where renamed records are written.
/// * `map` - Where the map file lines are written.
/// * `opts` - Format, field and id generation settings.
///
/// # Errors
///
/// Stops at the first unreadable input, malformed record, or record without the
/// selected column. Output written before the failure is not removed.
pub fn encode(
    inputs: &[String],
    writer: impl Write,
    mut map: impl Write,
    opts: &EncodeOptions,
) -> Result<RenameStats> {
    let generator = IdGenerator::new(opts.prefix.as_str(), opts.length)?;
    let mut transform = RenameTransform::new(opts.field, opts.mode(), generator)?;
    opts.warn_unused();

    info!(
        "Encoding the {} of {} input(s) as {:?}",
        opts.field,
        inputs.len(),
        opts.format
    );

    match opts.format {
        Format::Fasta => {
            let upper = opts.upper;
            let strip = opts.strip.clone().map(String::into_bytes);
            let records = fasta::read_many(inputs, &opts.comment).map(move |record| {
                record.map(|mut record: SequenceRecord| {
                    if let Some(chars) = &strip {
                        record.strip_end(chars);
                    }
                    if upper {
                        record.make_uppercase();
                    }
                    record
                })
            });

            encode_records(
                records,
                FastaWriter::new(writer),
                &mut transform,
                &mut map,
                opts.chunk_size,
            )?
        }
        Format::Csv | Format::Tsv => {
            let delimiter = opts.format.delimiter().unwrap_or(b',');
            let records = xsv::read_many(inputs, delimiter, &opts.comment, opts.header);

            encode_records(
                records,
                XsvWriter::new(writer, delimiter),
                &mut transform,
                &mut map,
                opts.chunk_size,
            )?
        }
        Format::Gff3 => encode_records(
            gff::read_many(inputs),
            GffWriter::new(writer),
            &mut transform,
            &mut map,
            opts.chunk_size,
        )?,
    }

    let stats = transform.stats;
    info!(
        "Stats: {} records, {} written, {} duplicates removed, {} ids generated",
        stats.records,
        stats.emitted,
        stats.duplicates,
        transform.generated()
    );

    Ok(stats)
}

/// Pulls records one at a time through `transform` into `sink`. The output chunk and the
/// map entries are flushed every `chunk_size` records and once more at the end.
fn encode_records<R, I, S, M>(
    records: I,
    mut sink: S,
    transform: &mut RenameTransform,
    map: &mut M,
    chunk_size: usize,
) -> Result<()>
where
    R: Fields,
    I: Iterator<Item = Result<R>>,
    S: RecordSink<R>,
    M: Write,
{
    // Start with a placeholder error object. This will be mutated if there are errors
    // while reading records.
    let mut err = Ok(());

    records
        .scan(&mut err, until_err)
        .enumerate()
        .try_for_each(|(i, record)| -> Result<()> {
            if let Some(record) = transform.rename(record)? {
                sink.write(&record)?;
            }

            let processed = i + 1;
            if processed % chunk_size == 0 {
                sink.flush()?;
                transform.flush_ids(map)?;
            }
            if processed % PROGRESS_INTERVAL == 0 {
                info!("Processed: {processed}");
            }

            Ok(())
        })?;

    err?;

    sink.flush()?;
    transform.flush_ids(map)
}
