use crate::error::RenameError;
use crate::io::concat_inputs;
use crate::record::{Field, Fields, RecordSink};
use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecordsIntoIter, Terminator, Writer, WriterBuilder};
use itertools::Itertools;
use std::io::{BufRead, Read, Write};

/// One row of a CSV/TSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedRow {
    pub fields: Vec<String>,
    /// header rows are written back untouched
    pub header: bool,
    delimiter: u8,
}

impl DelimitedRow {
    pub fn new(fields: Vec<String>, delimiter: u8) -> Self {
        DelimitedRow {
            fields,
            header: false,
            delimiter,
        }
    }

    /// The row as it would appear in the file, without quoting.
    fn joined(&self) -> String {
        let sep = char::from(self.delimiter).to_string();
        self.fields.iter().join(&sep)
    }
}

impl Fields for DelimitedRow {
    fn is_passthrough(&self) -> bool {
        self.header
    }

    fn substitute<F>(&mut self, field: Field, mut rename: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let Field::Column(column) = field else {
            bail!(RenameError::InvalidConfiguration(format!(
                "delimited rows have no {field} field, use a column index"
            )));
        };

        if column >= self.fields.len() {
            bail!(RenameError::ColumnOutOfRange {
                column,
                width: self.fields.len(),
                row: self.joined(),
            });
        }

        let new = rename(self.fields[column].as_str())?;
        self.fields[column] = new;
        Ok(())
    }
}

/// Drops every line starting with `prefix` before the text reaches the csv parser.
pub struct CommentFilter<R> {
    inner: R,
    prefix: Vec<u8>,
    line: Vec<u8>,
    pos: usize,
}

impl<R: BufRead> CommentFilter<R> {
    /// An empty `prefix` keeps every line.
    pub fn new(inner: R, prefix: &str) -> Self {
        CommentFilter {
            inner,
            prefix: prefix.as_bytes().to_vec(),
            line: Vec::new(),
            pos: 0,
        }
    }
}

impl<R: BufRead> Read for CommentFilter<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        while self.pos >= self.line.len() {
            self.line.clear();
            self.pos = 0;

            if self.inner.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(0);
            }

            if !self.prefix.is_empty() && self.line.starts_with(&self.prefix) {
                self.line.clear();
            }
        }

        let n = buf.len().min(self.line.len() - self.pos);
        buf[..n].copy_from_slice(&self.line[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// What happens to the first row of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstRow {
    Data,
    Header,
    Skip,
}

pub struct XsvReader<R: BufRead> {
    records: StringRecordsIntoIter<CommentFilter<R>>,
    source_name: String,
    delimiter: u8,
    first: Option<FirstRow>,
}

impl<R: BufRead> XsvReader<R> {
    pub fn new(
        reader: R,
        source_name: impl Into<String>,
        delimiter: u8,
        comment: &str,
        first: FirstRow,
    ) -> Self {
        let records = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(CommentFilter::new(reader, comment))
            .into_records();

        XsvReader {
            records,
            source_name: source_name.into(),
            delimiter,
            first: Some(first),
        }
    }
}

impl<R: BufRead> Iterator for XsvReader<R> {
    type Item = Result<DelimitedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => {
                    let context = format!("Unable to read row of {}", self.source_name);
                    return Some(Err(e).context(context));
                }
            };

            let fields = record.iter().map(str::to_string).collect();
            let mut row = DelimitedRow::new(fields, self.delimiter);

            match self.first.take() {
                Some(FirstRow::Skip) => continue,
                Some(FirstRow::Header) => row.header = true,
                Some(FirstRow::Data) | None => (),
            }

            return Some(Ok(row));
        }
    }
}

/// Reads every row of every delimited file in `paths`, in order.
///
/// With `header` set, the first row of the first file is a header and the first row of
/// every later file is dropped.
pub fn read_many<'a>(
    paths: &'a [String],
    delimiter: u8,
    comment: &str,
    header: bool,
) -> impl Iterator<Item = Result<DelimitedRow>> + 'a {
    let comment = comment.to_string();
    concat_inputs(paths, move |index, path, reader| {
        let first = match (header, index) {
            (false, _) => FirstRow::Data,
            (true, 0) => FirstRow::Header,
            (true, _) => FirstRow::Skip,
        };
        XsvReader::new(reader, path, delimiter, &comment, first)
    })
}

pub struct XsvWriter<W: Write> {
    wtr: Writer<W>,
}

impl<W: Write> XsvWriter<W> {
    pub fn new(inner: W, delimiter: u8) -> Self {
        let wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(inner);

        XsvWriter { wtr }
    }
}

impl<W: Write> RecordSink<DelimitedRow> for XsvWriter<W> {
    fn write(&mut self, record: &DelimitedRow) -> Result<()> {
        self.wtr.write_record(&record.fields)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }
}
