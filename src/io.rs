use anyhow::{Context, Result};
use itertools::Either;
use std::fs::File;
use std::io::{stdin, BufRead, BufReader, Read};

pub type GenericBufReader = BufReader<Box<dyn Read>>;

/// Opens an input path for buffered reading. The path `-` is standard input.
pub fn open_input(path: &str) -> Result<GenericBufReader> {
    let inner = if path == "-" {
        Box::new(stdin()) as Box<dyn Read>
    } else {
        let file = File::open(path).with_context(|| format!("Unable to open file {path}"))?;
        Box::new(file) as Box<dyn Read>
    };

    Ok(BufReader::new(inner))
}

/// Reads several inputs in argument order as one stream of items.
///
/// Each file is only opened once the previous one is exhausted. `parse` receives the
/// 0-based position of the file in `paths`, the path itself, and the opened reader.
pub fn concat_inputs<'a, T, I, F>(
    paths: &'a [String],
    mut parse: F,
) -> impl Iterator<Item = Result<T>> + 'a
where
    T: 'a,
    I: Iterator<Item = Result<T>> + 'a,
    F: FnMut(usize, &'a str, GenericBufReader) -> I + 'a,
{
    paths
        .iter()
        .enumerate()
        .flat_map(move |(index, path)| match open_input(path) {
            Ok(reader) => Either::Left(parse(index, path, reader)),
            Err(e) => Either::Right(std::iter::once(Err(e))),
        })
}

/// Reads one line into `buf`, dropping the trailing `\n` or `\r\n`.
///
/// Returns `false` at end of input.
pub fn read_trimmed_line(reader: &mut impl BufRead, buf: &mut String) -> std::io::Result<bool> {
    buf.clear();
    if reader.read_line(buf)? == 0 {
        return Ok(false);
    }

    let trimmed_len = buf.trim_end_matches(['\n', '\r']).len();
    buf.truncate(trimmed_len);
    Ok(true)
}

/// Utility function to extract the error from an iterator and stop iteration immediately. Useful
/// for iterators which yield a Result<T>.
///
/// # Returns
///
/// This function returns an `Option<T>`. If the item is `Ok`, it returns `Some(T)`.
/// If the item is `Err`, it updates `err` with the error and returns `None`.
///
/// # Example
/// ```
/// let mut err = Ok(());
/// let items = vec![Ok(1), Ok(2), Err(anyhow!("error")), Ok(3)];
/// let results: Vec<_> = items
///   .into_iter()
///   .scan(&mut err, until_err)
///   .collect();
/// assert_eq!(results, vec![1, 2]);
/// assert!(err.is_err());
/// ```
pub fn until_err<T>(err: &mut &mut Result<()>, item: Result<T>) -> Option<T> {
    match item {
        Ok(item) => Some(item),
        Err(e) => {
            **err = Err(e);
            None
        }
    }
}
