pub mod fasta;
pub mod gff;
pub mod xsv;

use anyhow::Result;
use std::fmt;

/// Which part of a record holds the identifier being renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// FASTA id, or the GFF3 `ID` attribute (which also updates `Parent`)
    Id,
    /// FASTA description
    Description,
    /// 0-based column of a delimited row
    Column(usize),
    /// GFF3 column 1
    Seqid,
    /// GFF3 `Name` attribute
    Name,
    /// GFF3 `Parent` attribute values
    Parent,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Id => f.write_str("id"),
            Field::Description => f.write_str("description"),
            Field::Column(n) => write!(f, "column {n}"),
            Field::Seqid => f.write_str("seqid"),
            Field::Name => f.write_str("name"),
            Field::Parent => f.write_str("parent"),
        }
    }
}

/// Field access shared by every record format, so that one rename algorithm and one
/// decode algorithm serve all of them.
pub trait Fields {
    /// Records which are written out untouched and never logged, such as comments
    /// and header rows.
    fn is_passthrough(&self) -> bool {
        false
    }

    /// The companion value logged next to the renamed one in the map file, if this format
    /// has a companion column.
    fn companion(&self, _field: Field) -> Option<String> {
        None
    }

    /// Content checksum used as the deduplication key. Only sequence records have one.
    fn checksum(&self) -> Option<String> {
        None
    }

    /// Passes every value of `field` through `rename`, storing the results in place.
    /// Records without the field are left as they are.
    fn substitute<F>(&mut self, field: Field, rename: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<String>;
}

/// An output for records which is flushed in chunks.
pub trait RecordSink<R> {
    fn write(&mut self, record: &R) -> Result<()>;

    /// Pushes everything written so far to the underlying writer.
    fn flush(&mut self) -> Result<()>;
}
