use crate::error::RenameError;
use crate::io::{concat_inputs, read_trimmed_line};
use crate::record::{Field, Fields, RecordSink};
use anyhow::{bail, Context, Result};
use std::fmt;
use std::io::{BufRead, Write};

const ID: &str = "ID";
const NAME: &str = "Name";
const PARENT: &str = "Parent";

/// One `tag=value` entry of the attribute column. `tag` keeps any surrounding spaces
/// so the column is written back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Attribute {
    tag: String,
    value: Option<String>,
}

impl Attribute {
    fn parse(text: &str) -> Self {
        match text.split_once('=') {
            Some((tag, value)) => Attribute {
                tag: tag.to_string(),
                value: Some(value.to_string()),
            },
            None => Attribute {
                tag: text.to_string(),
                value: None,
            },
        }
    }

    fn is(&self, tag: &str) -> bool {
        self.tag.trim() == tag
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.tag, value),
            None => f.write_str(&self.tag),
        }
    }
}

/// A GFF3 feature line.
///
/// Only `seqid` and the attribute column are interpreted; columns 2 to 8 are kept as
/// they were read. Attributes keep their order, spacing and repeats, and values stay
/// percent-encoded exactly as in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    pub seqid: String,
    columns: String,
    attributes: Vec<Attribute>,
}

impl FeatureRecord {
    pub fn from_line(line: &str) -> std::result::Result<Self, String> {
        let parts: Vec<&str> = line.splitn(9, '\t').collect();
        if parts.len() != 9 {
            return Err(format!(
                "expected 9 tab-separated columns, found {}",
                parts.len()
            ));
        }

        Ok(FeatureRecord {
            seqid: parts[0].to_string(),
            columns: parts[1..8].join("\t"),
            attributes: parts[8].split(';').map(Attribute::parse).collect(),
        })
    }

    /// Renames the value of every `tag` entry. Repeated tags are all renamed.
    fn rename_attribute<F>(&mut self, tag: &str, rename: &mut F) -> Result<()>
    where
        F: FnMut(&str) -> Result<String>,
    {
        for attribute in self.attributes.iter_mut().filter(|a| a.is(tag)) {
            if let Some(value) = &mut attribute.value {
                let new = rename(value.as_str())?;
                *value = new;
            }
        }
        Ok(())
    }

    fn rename_parents<F>(&mut self, rename: &mut F) -> Result<()>
    where
        F: FnMut(&str) -> Result<String>,
    {
        for attribute in self.attributes.iter_mut().filter(|a| a.is(PARENT)) {
            if let Some(value) = &mut attribute.value {
                let renamed: Vec<String> =
                    value.split(',').map(&mut *rename).collect::<Result<_>>()?;
                *value = renamed.join(",");
            }
        }
        Ok(())
    }
}

impl fmt::Display for FeatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t", self.seqid, self.columns)?;

        for (i, attribute) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{attribute}")?;
        }
        Ok(())
    }
}

/// A line of a GFF3 file: either a feature, or text echoed verbatim (comments, directives,
/// blank lines, and anything inside a `##FASTA` section).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureLine {
    Comment(String),
    Feature(FeatureRecord),
}

impl fmt::Display for FeatureLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureLine::Comment(text) => f.write_str(text),
            FeatureLine::Feature(record) => write!(f, "{record}"),
        }
    }
}

impl Fields for FeatureLine {
    fn is_passthrough(&self) -> bool {
        matches!(self, FeatureLine::Comment(_))
    }

    /// Renaming `Field::Id` also renames every `Parent` value with the same function.
    /// A parent which never appeared as an `ID` is simply renamed on its own.
    fn substitute<F>(&mut self, field: Field, mut rename: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let record = match self {
            FeatureLine::Comment(_) => return Ok(()),
            FeatureLine::Feature(record) => record,
        };

        match field {
            Field::Seqid => {
                let new = rename(record.seqid.as_str())?;
                record.seqid = new;
            }
            Field::Id => {
                record.rename_attribute(ID, &mut rename)?;
                record.rename_parents(&mut rename)?;
            }
            Field::Name => record.rename_attribute(NAME, &mut rename)?,
            Field::Parent => record.rename_parents(&mut rename)?,
            other => bail!(RenameError::InvalidConfiguration(format!(
                "GFF3 records have no {other} field"
            ))),
        }

        Ok(())
    }
}

pub struct GffReader<R> {
    reader: R,
    source_name: String,
    line: usize,
    buf: String,
    in_fasta: bool,
}

impl<R: BufRead> GffReader<R> {
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        GffReader {
            reader,
            source_name: source_name.into(),
            line: 0,
            buf: String::new(),
            in_fasta: false,
        }
    }
}

impl<R: BufRead> Iterator for GffReader<R> {
    type Item = Result<FeatureLine>;

    fn next(&mut self) -> Option<Self::Item> {
        match read_trimmed_line(&mut self.reader, &mut self.buf) {
            Ok(true) => self.line += 1,
            Ok(false) => return None,
            Err(e) => {
                let context = format!("Unable to read {}", self.source_name);
                return Some(Err(e).context(context));
            }
        }

        if self.buf.trim_end() == "##FASTA" {
            self.in_fasta = true;
        }

        if self.in_fasta || self.buf.starts_with('#') || self.buf.trim().is_empty() {
            return Some(Ok(FeatureLine::Comment(self.buf.clone())));
        }

        Some(
            FeatureRecord::from_line(&self.buf)
                .map(FeatureLine::Feature)
                .map_err(|reason| {
                    RenameError::Parse {
                        source_name: self.source_name.clone(),
                        line: self.line,
                        content: self.buf.clone(),
                        reason,
                    }
                    .into()
                }),
        )
    }
}

/// Reads every line of every GFF3 file in `paths`, in order.
pub fn read_many(paths: &[String]) -> impl Iterator<Item = Result<FeatureLine>> + '_ {
    concat_inputs(paths, |_, path, reader| GffReader::new(reader, path))
}

/// Writes GFF3 lines into an in-memory chunk which is handed to `inner` on `flush`.
pub struct GffWriter<W: Write> {
    inner: W,
    chunk: Vec<u8>,
}

impl<W: Write> GffWriter<W> {
    pub fn new(inner: W) -> Self {
        GffWriter {
            inner,
            chunk: Vec::new(),
        }
    }
}

impl<W: Write> RecordSink<FeatureLine> for GffWriter<W> {
    fn write(&mut self, record: &FeatureLine) -> Result<()> {
        writeln!(self.chunk, "{record}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.write_all(&self.chunk)?;
        self.chunk.clear();
        self.inner.flush()?;
        Ok(())
    }
}
