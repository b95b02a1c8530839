use crate::error::RenameError;
use crate::record::Field;
use anyhow::{bail, Result};
use std::path::Path;

/// Input formats, with `auto` picking one from the first file's extension.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Auto,
    Fasta,
    Csv,
    Tsv,
    Gff3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Fasta,
    Csv,
    Tsv,
    Gff3,
}

impl Format {
    /// Resolves `auto` using the extension of `first_input`.
    pub fn resolve(arg: FormatArg, first_input: Option<&str>) -> Result<Self> {
        let format = match arg {
            FormatArg::Fasta => Format::Fasta,
            FormatArg::Csv => Format::Csv,
            FormatArg::Tsv => Format::Tsv,
            FormatArg::Gff3 => Format::Gff3,
            FormatArg::Auto => {
                let detected = first_input.and_then(Self::from_extension);
                match detected {
                    Some(format) => format,
                    None => bail!(RenameError::InvalidConfiguration(
                        "could not automatically determine the format, please specify --format"
                            .to_string()
                    )),
                }
            }
        };

        Ok(format)
    }

    pub fn from_extension(path: &str) -> Option<Self> {
        let extension = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();

        match extension.as_str() {
            "fasta" | "fa" | "fas" | "faa" | "fna" => Some(Format::Fasta),
            "csv" => Some(Format::Csv),
            "tsv" | "tab" => Some(Format::Tsv),
            "gff3" | "gff" => Some(Format::Gff3),
            _ => None,
        }
    }

    pub fn delimiter(&self) -> Option<u8> {
        match self {
            Format::Csv => Some(b','),
            Format::Tsv => Some(b'\t'),
            Format::Fasta | Format::Gff3 => None,
        }
    }

    /// The comment marker used when none is given on the command line.
    pub fn default_comment(&self) -> &'static str {
        match self {
            Format::Fasta => ";",
            Format::Csv | Format::Tsv | Format::Gff3 => "#",
        }
    }

    /// Interprets the `--column` option for this format, falling back to the format's
    /// default field.
    pub fn field(&self, column: Option<&str>) -> Result<Field> {
        let field = match (self, column) {
            (Format::Fasta, None) | (Format::Gff3, None) => Field::Id,
            (Format::Csv | Format::Tsv, None) => Field::Column(0),

            (Format::Fasta, Some("id")) => Field::Id,
            (Format::Fasta, Some("description" | "desc")) => Field::Description,
            (Format::Fasta, Some(_)) => bail!(RenameError::InvalidConfiguration(
                "for fasta format the column must be 'id' or 'description'".to_string()
            )),

            (Format::Gff3, Some("id")) => Field::Id,
            (Format::Gff3, Some("name")) => Field::Name,
            (Format::Gff3, Some("seqid")) => Field::Seqid,
            (Format::Gff3, Some("parent")) => Field::Parent,
            (Format::Gff3, Some(_)) => bail!(RenameError::InvalidConfiguration(
                "for gff3 format the column must be 'seqid', 'id', 'name' or 'parent'"
                    .to_string()
            )),

            (Format::Csv | Format::Tsv, Some(column)) => Field::Column(parse_column(column)?),
        };

        Ok(field)
    }
}

fn parse_column(column: &str) -> Result<usize> {
    let index = column.strip_prefix("column:").unwrap_or(column);

    match index.parse::<i64>() {
        Ok(n) if n < 0 => bail!(RenameError::InvalidConfiguration(
            "column indices must be >= 0".to_string()
        )),
        Ok(n) => Ok(n as usize),
        Err(_) => bail!(RenameError::InvalidConfiguration(format!(
            "for tsv and csv formats a 0 based index must be used, could not parse \
             '{column}' as an integer"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension() {
        assert_eq!(Format::from_extension("a/b/genome.FNA"), Some(Format::Fasta));
        assert_eq!(Format::from_extension("table.tab"), Some(Format::Tsv));
        assert_eq!(Format::from_extension("genes.gff"), Some(Format::Gff3));
        assert_eq!(Format::from_extension("noextension"), None);
        assert_eq!(Format::from_extension("reads.bam"), None);
    }

    #[test]
    fn auto_without_known_extension_fails() {
        assert!(Format::resolve(FormatArg::Auto, Some("reads.bam")).is_err());
        assert!(Format::resolve(FormatArg::Auto, Some("-")).is_err());
        assert_eq!(
            Format::resolve(FormatArg::Auto, Some("x.csv")).unwrap(),
            Format::Csv
        );
        assert_eq!(
            Format::resolve(FormatArg::Gff3, Some("x.csv")).unwrap(),
            Format::Gff3
        );
    }

    #[test]
    fn default_fields() {
        assert_eq!(Format::Fasta.field(None).unwrap(), Field::Id);
        assert_eq!(Format::Tsv.field(None).unwrap(), Field::Column(0));
        assert_eq!(Format::Gff3.field(None).unwrap(), Field::Id);
    }

    #[test]
    fn column_selectors() {
        assert_eq!(Format::Csv.field(Some("3")).unwrap(), Field::Column(3));
        assert_eq!(Format::Csv.field(Some("column:2")).unwrap(), Field::Column(2));
        assert_eq!(Format::Fasta.field(Some("description")).unwrap(), Field::Description);
        assert_eq!(Format::Gff3.field(Some("parent")).unwrap(), Field::Parent);
    }

    #[test]
    fn invalid_selectors() {
        for (format, column) in [
            (Format::Csv, "-1"),
            (Format::Csv, "first"),
            (Format::Fasta, "seqid"),
            (Format::Gff3, "description"),
        ] {
            let err = format.field(Some(column)).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<RenameError>(),
                Some(RenameError::InvalidConfiguration(_))
            ));
        }
    }
}
