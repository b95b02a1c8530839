use crate::error::RenameError;
use crate::io::{concat_inputs, read_trimmed_line};
use crate::record::{Field, Fields, RecordSink};
use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use sha1::{Digest, Sha1};
use std::fmt;
use std::io::{BufRead, Write};

/// Width of the sequence lines written out.
const LINE_LENGTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub description: Option<String>,
    pub seq: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, description: Option<&str>, seq: impl Into<Vec<u8>>) -> Self {
        SequenceRecord {
            id: id.into(),
            description: description.map(str::to_string),
            seq: seq.into(),
        }
    }

    /// Splits a `>id description` header line at the first space.
    fn from_header(line: &str) -> Self {
        let header = &line[1..];
        let (id, description) = match header.split_once(' ') {
            Some((id, description)) => (id, Some(description)),
            None => (header, None),
        };

        SequenceRecord::new(id, description, Vec::new())
    }

    /// The SEGUID of the sequence: an unpadded base64 SHA-1 digest of the raw bytes.
    pub fn seguid(&self) -> String {
        STANDARD_NO_PAD.encode(Sha1::digest(&self.seq))
    }

    pub fn make_uppercase(&mut self) {
        self.seq.make_ascii_uppercase();
    }

    /// Removes any of `chars` from the end of the sequence.
    pub fn strip_end(&mut self, chars: &[u8]) {
        while self.seq.last().is_some_and(|b| chars.contains(b)) {
            self.seq.pop();
        }
    }
}

impl fmt::Display for SequenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => writeln!(f, ">{} {}", self.id, description)?,
            None => writeln!(f, ">{}", self.id)?,
        }

        for line in self.seq.chunks(LINE_LENGTH) {
            writeln!(f, "{}", String::from_utf8_lossy(line))?;
        }

        Ok(())
    }
}

impl Fields for SequenceRecord {
    fn companion(&self, field: Field) -> Option<String> {
        match field {
            Field::Description => Some(self.id.clone()),
            _ => Some(self.description.clone().unwrap_or_else(|| ".".to_string())),
        }
    }

    fn checksum(&self) -> Option<String> {
        Some(self.seguid())
    }

    fn substitute<F>(&mut self, field: Field, mut rename: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<String>,
    {
        match field {
            Field::Id => {
                self.id = rename(self.id.as_str())?;
            }
            Field::Description => {
                // a missing description is renamed like an empty one
                let new = rename(self.description.as_deref().unwrap_or(""))?;
                self.description = if new.is_empty() { None } else { Some(new) };
            }
            other => bail!(RenameError::InvalidConfiguration(format!(
                "FASTA records have no {other} field"
            ))),
        }

        Ok(())
    }
}

/// Streams records out of one FASTA input.
pub struct FastaReader<R> {
    reader: R,
    source_name: String,
    comment: String,
    line: usize,
    buf: String,
    current: Option<SequenceRecord>,
    seq: Vec<u8>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    /// Lines starting with `comment` are dropped; an empty `comment` keeps every line.
    pub fn new(reader: R, source_name: impl Into<String>, comment: impl Into<String>) -> Self {
        FastaReader {
            reader,
            source_name: source_name.into(),
            comment: comment.into(),
            line: 0,
            buf: String::new(),
            current: None,
            seq: Vec::new(),
            done: false,
        }
    }

    fn finish_current(&mut self) -> Option<SequenceRecord> {
        let mut record = self.current.take()?;
        record.seq = std::mem::take(&mut self.seq);
        Some(record)
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let more = read_trimmed_line(&mut self.reader, &mut self.buf);
            match more {
                Ok(true) => self.line += 1,
                Ok(false) => {
                    self.done = true;
                    return self.finish_current().map(Ok);
                }
                Err(e) => {
                    self.done = true;
                    let context = format!("Unable to read {}", self.source_name);
                    return Some(Err(e).context(context));
                }
            }

            if self.buf.starts_with('>') {
                let header = SequenceRecord::from_header(self.buf.trim_end());
                let previous = self.finish_current();
                self.current = Some(header);

                if previous.is_some() {
                    return previous.map(Ok);
                }
                continue;
            }

            if !self.comment.is_empty() && self.buf.starts_with(&self.comment) {
                continue;
            }

            let body = self.buf.trim();
            if body.is_empty() {
                continue;
            }

            if self.current.is_none() {
                self.done = true;
                return Some(Err(RenameError::Parse {
                    source_name: self.source_name.clone(),
                    line: self.line,
                    content: self.buf.clone(),
                    reason: "sequence data found before the first '>' header".to_string(),
                }
                .into()));
            }

            // sequences are wrapped by byte count when written
            if !body.is_ascii() {
                self.done = true;
                return Some(Err(RenameError::Parse {
                    source_name: self.source_name.clone(),
                    line: self.line,
                    content: self.buf.clone(),
                    reason: "sequence data must be ASCII".to_string(),
                }
                .into()));
            }

            self.seq.extend_from_slice(body.as_bytes());
        }
    }
}

/// Reads every record of every FASTA file in `paths`, in order.
pub fn read_many<'a>(
    paths: &'a [String],
    comment: &str,
) -> impl Iterator<Item = Result<SequenceRecord>> + 'a {
    let comment = comment.to_string();
    concat_inputs(paths, move |_, path, reader| {
        FastaReader::new(reader, path, comment.as_str())
    })
}

/// Writes FASTA text into an in-memory chunk which is handed to `inner` on `flush`.
pub struct FastaWriter<W: Write> {
    inner: W,
    chunk: Vec<u8>,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(inner: W) -> Self {
        FastaWriter {
            inner,
            chunk: Vec::new(),
        }
    }
}

impl<W: Write> RecordSink<SequenceRecord> for FastaWriter<W> {
    fn write(&mut self, record: &SequenceRecord) -> Result<()> {
        write!(self.chunk, "{record}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.write_all(&self.chunk)?;
        self.chunk.clear();
        self.inner.flush()?;
        Ok(())
    }
}
