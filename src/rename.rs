use crate::error::RenameError;
use crate::id::IdGenerator;
use crate::record::{Field, Fields};
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;

/// How new ids are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// one new id per distinct original value; every record is kept
    Replace,
    /// one new id per distinct sequence checksum; later duplicates are dropped
    Deduplicate,
}

/// One line of the map file.
///
/// # Fields
///
/// * `new_id` - The id written to the output.
/// * `old_id` - The value it replaced.
/// * `checksum` - The sequence checksum, in deduplicate mode only.
/// * `companion` - The other FASTA header field (description or id), `.` when missing.
///   Formats without a companion leave this as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdMapEntry {
    pub new_id: String,
    pub old_id: String,
    pub checksum: Option<String>,
    pub companion: Option<String>,
}

impl fmt::Display for IdMapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.new_id, self.old_id)?;
        if let Some(checksum) = &self.checksum {
            write!(f, "\t{checksum}")?;
        }
        if let Some(companion) = &self.companion {
            write!(f, "\t{companion}")?;
        }
        Ok(())
    }
}

/// Running totals for the log.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenameStats {
    pub records: usize,
    pub emitted: usize,
    pub duplicates: usize,
}

/// Replaces one field of every record with generated ids, remembering what each id
/// stood for.
///
/// Entries for the map file accumulate in memory until [`RenameTransform::flush_ids`]
/// is called, so callers should flush regularly on large inputs.
pub struct RenameTransform {
    field: Field,
    mode: Mode,
    generator: IdGenerator,
    /// original value (replace) or checksum (deduplicate) to new id
    seen: HashMap<String, String>,
    id_map: Vec<IdMapEntry>,
    pub stats: RenameStats,
}

impl RenameTransform {
    pub fn new(field: Field, mode: Mode, generator: IdGenerator) -> Result<Self> {
        if mode == Mode::Deduplicate && !matches!(field, Field::Id | Field::Description) {
            bail!(RenameError::InvalidConfiguration(format!(
                "deduplication works on the FASTA id or description, not the {field}"
            )));
        }

        Ok(RenameTransform {
            field,
            mode,
            generator,
            seen: HashMap::new(),
            id_map: Vec::new(),
            stats: RenameStats::default(),
        })
    }

    /// Renames `record`, returning `None` when it is a duplicate which should not be
    /// written out.
    pub fn rename<R: Fields>(&mut self, mut record: R) -> Result<Option<R>> {
        if record.is_passthrough() {
            return Ok(Some(record));
        }

        self.stats.records += 1;

        let kept = match self.mode {
            Mode::Replace => {
                self.replace(&mut record)?;
                true
            }
            Mode::Deduplicate => self.deduplicate(&mut record)?,
        };

        if kept {
            self.stats.emitted += 1;
            Ok(Some(record))
        } else {
            self.stats.duplicates += 1;
            Ok(None)
        }
    }

    fn replace<R: Fields>(&mut self, record: &mut R) -> Result<()> {
        let field = self.field;
        let companion = record.companion(field);
        let Self {
            seen,
            generator,
            id_map,
            ..
        } = self;

        record.substitute(field, |old| {
            let new = match seen.get(old) {
                Some(new) => new.clone(),
                None => {
                    let new = next_id(generator)?;
                    seen.insert(old.to_string(), new.clone());
                    new
                }
            };

            id_map.push(IdMapEntry {
                new_id: new.clone(),
                old_id: old.to_string(),
                checksum: None,
                companion: companion.clone(),
            });

            Ok(new)
        })
    }

    /// Returns whether the record is the first with its checksum.
    fn deduplicate<R: Fields>(&mut self, record: &mut R) -> Result<bool> {
        let Some(checksum) = record.checksum() else {
            bail!(RenameError::InvalidConfiguration(
                "deduplication is only possible for sequence records".to_string()
            ));
        };
        let companion = record.companion(self.field);

        let (new, first) = match self.seen.get(&checksum) {
            Some(new) => (new.clone(), false),
            None => {
                let new = next_id(&mut self.generator)?;
                self.seen.insert(checksum.clone(), new.clone());
                (new, true)
            }
        };

        let id_map = &mut self.id_map;
        record.substitute(self.field, |old| {
            id_map.push(IdMapEntry {
                new_id: new.clone(),
                old_id: old.to_string(),
                checksum: Some(checksum.clone()),
                companion: companion.clone(),
            });
            Ok(new.clone())
        })?;

        Ok(first)
    }

    /// Writes every buffered map entry to `writer` and clears the buffer.
    pub fn flush_ids(&mut self, writer: &mut impl Write) -> Result<()> {
        for entry in self.id_map.drain(..) {
            writeln!(writer, "{entry}")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn generated(&self) -> u64 {
        self.generator.generated()
    }
}

fn next_id(generator: &mut IdGenerator) -> Result<String> {
    match generator.next() {
        Some(id) => Ok(id),
        None => bail!(RenameError::InvalidConfiguration(
            "the id generator ran out of ids".to_string()
        )),
    }
}
