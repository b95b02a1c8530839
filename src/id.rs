use crate::error::RenameError;
use anyhow::{bail, Result};

/// Digits used for the generated ids. These are in ASCII order, so ids of the same width
/// sort in the order they were generated.
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Produces `prefix + counter` with the counter written in base 36 and padded to at least
/// `length` digits. Widths grow past `length` once the padded space is used up, so ids are
/// never reused within one generator.
///
/// # Example
///
/// ```
/// let mut ids = IdGenerator::new("SR", 3)?;
/// assert_eq!(ids.next().unwrap(), "SR000");
/// assert_eq!(ids.next().unwrap(), "SR001");
/// ```
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    length: usize,
    counter: u64,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>, length: usize) -> Result<Self> {
        if length < 1 {
            bail!(RenameError::InvalidConfiguration(
                "the id length must be at least 1".to_string()
            ));
        }

        Ok(IdGenerator {
            prefix: prefix.into(),
            length,
            counter: 0,
        })
    }

    /// Number of ids handed out so far.
    pub fn generated(&self) -> u64 {
        self.counter
    }

    fn encode(&self, mut value: u64) -> String {
        let radix = ALPHABET.len() as u64;
        let mut digits = Vec::with_capacity(self.length);

        loop {
            digits.push(ALPHABET[(value % radix) as usize]);
            value /= radix;
            if value == 0 {
                break;
            }
        }

        while digits.len() < self.length {
            digits.push(ALPHABET[0]);
        }

        digits.reverse();

        let mut id = String::with_capacity(self.prefix.len() + digits.len());
        id.push_str(&self.prefix);
        // the alphabet is ASCII
        id.extend(digits.into_iter().map(char::from));
        id
    }
}

impl Iterator for IdGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let id = self.encode(self.counter);
        self.counter = self.counter.checked_add(1)?;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn zero_length_is_rejected() {
        let err = IdGenerator::new("SR", 0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenameError>(),
            Some(RenameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn first_ids() {
        let ids: Vec<String> = IdGenerator::new("SR", 3).unwrap().take(3).collect();
        assert_eq!(ids, vec!["SR000", "SR001", "SR002"]);
    }

    #[test]
    fn digits_roll_over_into_letters() {
        let ids: Vec<String> = IdGenerator::new("", 2).unwrap().skip(9).take(3).collect();
        assert_eq!(ids, vec!["09", "0A", "0B"]);
    }

    #[test]
    fn width_extends_on_overflow() {
        let mut ids = IdGenerator::new("x", 1).unwrap().skip(35);
        assert_eq!(ids.next().unwrap(), "xZ");
        assert_eq!(ids.next().unwrap(), "x10");
        assert_eq!(ids.next().unwrap(), "x11");
    }

    #[test]
    fn unique_and_prefixed() {
        let ids: Vec<String> = IdGenerator::new("SR", 1).unwrap().take(5000).collect();
        let distinct: HashSet<&String> = ids.iter().collect();

        assert_eq!(distinct.len(), ids.len());
        assert!(ids.iter().all(|id| id.starts_with("SR") && id.len() >= 3));
    }

    #[test]
    fn same_width_ids_sort_in_generation_order() {
        let ids: Vec<String> = IdGenerator::new("", 4).unwrap().take(2000).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn deterministic() {
        let a = IdGenerator::new("P", 5).unwrap().take(100);
        let b = IdGenerator::new("P", 5).unwrap().take(100);
        assert!(a.eq(b));
    }

    #[test]
    fn counts_generated() {
        let mut ids = IdGenerator::new("P", 5).unwrap();
        ids.next();
        ids.next();
        assert_eq!(ids.generated(), 2);
    }
}
