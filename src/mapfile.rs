use crate::error::RenameError;
use crate::io::{open_input, read_trimmed_line};
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use std::io::BufRead;

/// The lookup table of a map file: each encoded id and the original values it stands for.
///
/// Deduplicated encodes map one id to several originals, so values are kept as an ordered
/// list. A pair which appears more than once (replace mode logs every occurrence) is only
/// stored once.
#[derive(Debug, Default)]
pub struct MapTable {
    entries: IndexMap<String, Vec<String>>,
}

impl MapTable {
    pub fn from_path(path: &str) -> Result<Self> {
        let reader = open_input(path)?;
        Self::from_reader(reader, path).with_context(|| format!("Unable to load map file {path}"))
    }

    /// Parses map file lines of the form `new<TAB>old[<TAB>...]`. Columns after the
    /// second (checksum, companion) are not needed for decoding.
    pub fn from_reader(mut reader: impl BufRead, source_name: &str) -> Result<Self> {
        let mut table = MapTable::default();
        let mut buf = String::new();
        let mut line = 0;

        while read_trimmed_line(&mut reader, &mut buf)? {
            line += 1;

            let mut columns = buf.split('\t');
            let (Some(new), Some(old)) = (columns.next(), columns.next()) else {
                bail!(RenameError::Parse {
                    source_name: source_name.to_string(),
                    line,
                    content: buf.clone(),
                    reason: "expected at least two tab-separated columns".to_string(),
                });
            };

            table.insert(new, old);
        }

        Ok(table)
    }

    fn insert(&mut self, new: &str, old: &str) {
        let values = self.entries.entry(new.to_string()).or_default();
        if !values.iter().any(|v| v == old) {
            values.push(old.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Every original value recorded for `key`.
    pub fn lookup(&self, key: &str) -> Result<&[String]> {
        match self.entries.get(key) {
            Some(values) => Ok(values.as_slice()),
            None => bail!(RenameError::KeyNotFound {
                key: key.to_string()
            }),
        }
    }

    /// The single original value recorded for `key`.
    pub fn lookup_one(&self, key: &str) -> Result<&str> {
        match self.lookup(key)? {
            [value] => Ok(value.as_str()),
            values => bail!(RenameError::AmbiguousMapping {
                key: key.to_string(),
                candidates: values.iter().join(", "),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table(text: &str) -> Result<MapTable> {
        MapTable::from_reader(Cursor::new(text.to_string()), "map.tsv")
    }

    #[test]
    fn reads_every_layout() {
        let t = table("A\ta\nB\tb\tdesc\nC\tc\tCHECKSUM\t.\n").unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.lookup_one("A").unwrap(), "a");
        assert_eq!(t.lookup_one("B").unwrap(), "b");
        assert_eq!(t.lookup_one("C").unwrap(), "c");
    }

    #[test]
    fn fan_out_keeps_order() {
        let t = table("SR0\ts1\tX\td1\nSR0\ts2\tX\td2\n").unwrap();
        assert_eq!(t.lookup("SR0").unwrap(), ["s1", "s2"]);
    }

    #[test]
    fn repeated_pairs_collapse() {
        let t = table("SR0\tgene\nSR0\tgene\n").unwrap();
        assert_eq!(t.lookup_one("SR0").unwrap(), "gene");
    }

    #[test]
    fn empty_original_is_kept() {
        let t = table("SR0\t\tX\ts1\n").unwrap();
        assert_eq!(t.lookup_one("SR0").unwrap(), "");
    }

    #[test]
    fn missing_key() {
        let err = table("A\ta\n").unwrap().lookup("B").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenameError>(),
            Some(RenameError::KeyNotFound { key }) if key == "B"
        ));
    }

    #[test]
    fn ambiguous_key() {
        let err = table("A\ta\nA\tb\n").unwrap().lookup_one("A").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenameError>(),
            Some(RenameError::AmbiguousMapping { .. })
        ));
    }

    #[test]
    fn malformed_line_reports_position() {
        let err = table("A\ta\nbroken\n").unwrap_err();
        match err.downcast_ref::<RenameError>() {
            Some(RenameError::Parse { line, content, .. }) => {
                assert_eq!(*line, 2);
                assert_eq!(content, "broken");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
