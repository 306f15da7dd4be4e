//! Plain-text snapshots of a [`SkipList`].
//!
//! A snapshot holds one record per line, `<key>:<value>`, in ascending key
//! order as produced by walking level 0. There is no header, footer or record
//! count, and no escaping: keys must not render with the delimiter, and
//! neither keys nor values may contain a newline. Values may contain the
//! delimiter since a record is split on its first occurrence.
//!
//! Loading feeds each record through [`SkipList::insert`], so when a snapshot
//! holds the same key more than once the first record wins.

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
    str::{self, FromStr},
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    level_generator::LevelGenerator,
    skiplist::{InsertError, SkipList},
};

/// Separates the key from the value within a record.
pub const DELIMITER: char = ':';

#[derive(Error, Debug)]
/// Errors that can occur when dumping or loading a snapshot.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum SnapshotError {
    /// The snapshot could not be read or written.
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Summary of a completed load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Records inserted into the list.
    pub inserted: usize,
    /// Well-formed records whose key was already present.
    pub duplicates: usize,
    /// Non-empty lines that were not a valid record and were skipped.
    pub malformed: usize,
}

/// Split a line into its key and value.
///
/// Returns `None` unless the line contains the [`DELIMITER`] with a non-empty
/// key before it and a non-empty value after it.
///
/// # Examples
///
/// ```
/// use skipkv::snapshot::parse_record;
///
/// assert_eq!(parse_record("7:c"), Some(("7", "c")));
/// assert_eq!(parse_record("url:http://x"), Some(("url", "http://x")));
/// assert_eq!(parse_record("7:"), None);
/// assert_eq!(parse_record("no delimiter"), None);
/// ```
#[must_use]
pub fn parse_record(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(DELIMITER)?;
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Write every entry as one record per line, returning the number of records
/// written.
pub(crate) fn write_records<'a, K, V, W>(
    entries: impl IntoIterator<Item = (&'a K, &'a V)>,
    mut writer: W,
) -> Result<usize, SnapshotError>
where
    K: fmt::Display + 'a,
    V: fmt::Display + 'a,
    W: Write,
{
    let mut written = 0;
    for (key, value) in entries {
        writeln!(writer, "{key}{DELIMITER}{value}")?;
        written += 1;
    }
    writer.flush()?;
    debug!(records = written, "dumped snapshot");
    Ok(written)
}

/// Parse records from `reader`, handing each valid one to `insert`.
///
/// Lines are split on `\n` with an optional trailing `\r`. A line which is
/// not valid UTF-8 is malformed like any other bad record.
///
/// Records already handed over stay inserted if reading fails part way.
pub(crate) fn read_records<K, V, R, F>(
    reader: R,
    mut insert: F,
) -> Result<LoadReport, SnapshotError>
where
    K: FromStr,
    V: FromStr,
    R: BufRead,
    F: FnMut(K, V) -> Result<(), InsertError>,
{
    let mut report = LoadReport::default();
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line);
        if line.is_empty() {
            continue;
        }
        let record = str::from_utf8(line)
            .ok()
            .and_then(parse_record)
            .and_then(|(key, value)| Some((key.parse::<K>().ok()?, value.parse::<V>().ok()?)));
        let Some((key, value)) = record else {
            warn!(line = index + 1, "skipping malformed snapshot record");
            report.malformed += 1;
            continue;
        };
        match insert(key, value) {
            Ok(()) => report.inserted += 1,
            Err(InsertError::KeyExists) => {
                debug!(line = index + 1, "skipping duplicate snapshot key");
                report.duplicates += 1;
            }
        }
    }
    debug!(
        inserted = report.inserted,
        duplicates = report.duplicates,
        malformed = report.malformed,
        "loaded snapshot"
    );
    Ok(report)
}

// ///////////////////////////////////////////////
// SkipList persistence
// ///////////////////////////////////////////////

impl<K, V, G> SkipList<K, V, G>
where
    K: fmt::Display,
    V: fmt::Display,
{
    /// Write a snapshot of the skiplist to `writer`, returning the number of
    /// records written.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if writing fails. The skiplist itself is
    /// never modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let skiplist: SkipList<_, _> = [(3, "b"), (1, "a")].into_iter().collect();
    /// let mut buffer = Vec::new();
    /// assert_eq!(skiplist.dump_to(&mut buffer).unwrap(), 2);
    /// assert_eq!(String::from_utf8(buffer).unwrap(), "1:a\n3:b\n");
    /// ```
    #[inline]
    pub fn dump_to<W: Write>(&self, writer: W) -> Result<usize, SnapshotError> {
        write_records(self.iter(), writer)
    }

    /// Write a snapshot of the skiplist to the file at `path`, creating it or
    /// truncating it as needed.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the file cannot be created or
    /// written.
    #[inline]
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<usize, SnapshotError> {
        let file = File::create(path)?;
        self.dump_to(BufWriter::new(file))
    }
}

impl<K, V, G> SkipList<K, V, G>
where
    K: Ord + FromStr,
    V: FromStr,
    G: LevelGenerator,
{
    /// Read a snapshot from `reader`, inserting every valid record.
    ///
    /// Blank lines are ignored. Lines which are not UTF-8, lack the delimiter,
    /// have an empty key or value, or whose key or value fails to parse are
    /// skipped and counted as malformed. Records whose key is already present are skipped and
    /// counted as duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if reading fails. Records read before the
    /// failure remain inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let mut skiplist: SkipList<u32, String> = SkipList::new();
    /// let report = skiplist.load_from("1:a\n2:b\nbad\n1:c\n".as_bytes()).unwrap();
    /// assert_eq!((report.inserted, report.duplicates, report.malformed), (2, 1, 1));
    /// assert_eq!(skiplist.get(&1).map(String::as_str), Some("a"));
    /// ```
    #[inline]
    pub fn load_from<R: BufRead>(&mut self, reader: R) -> Result<LoadReport, SnapshotError> {
        read_records(reader, |key, value| self.insert(key, value))
    }

    /// Read a snapshot from the file at `path`, inserting every valid record.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the file cannot be opened or read.
    #[inline]
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport, SnapshotError> {
        let file = File::open(path)?;
        self.load_from(BufReader::new(file))
    }
}
