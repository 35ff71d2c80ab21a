use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;
use std::str;

use bstr::{BString, ByteSlice};

use crate::error::{Error, Result};
use crate::util::open_file;

/// The byte separating a label from its key on every key file line.
pub const FIELD_SEPARATOR: u8 = b'|';

/// The default maximum length of a key file line, in bytes.
///
/// Longer lines are truncated when read, and queries longer than this never
/// match anything.
pub const MAX_RECORD_LEN: usize = 1023;

/// A single record of a key file, borrowed from the line it was parsed from.
///
/// A line has the form `label|key`, where `key` is a hexadecimal number
/// without any prefix. The label may itself contain the separator; only the
/// last one on the line splits the two fields.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecordRef<'a> {
    /// The label exactly as it appears in the key file.
    pub label: &'a [u8],
    /// The identifier of this record.
    pub key: u64,
}

impl<'a> RecordRef<'a> {
    /// Parse a single key file line, without its line terminator.
    ///
    /// This returns a `MalformedRecord` error if the line has no separator or
    /// if its key is not a hexadecimal number.
    pub fn parse(line: &'a [u8]) -> Result<RecordRef<'a>> {
        let sep = match line.rfind_byte(FIELD_SEPARATOR) {
            None => {
                return Err(Error::malformed(format!(
                    "missing field separator in '{}'",
                    line.as_bstr()
                )))
            }
            Some(sep) => sep,
        };
        let (label, rawkey) = (&line[..sep], trim_ascii(&line[sep + 1..]));
        let key = str::from_utf8(rawkey)
            .ok()
            .filter(|k| !k.is_empty())
            .and_then(|k| u64::from_str_radix(k, 16).ok())
            .ok_or_else(|| {
                Error::malformed(format!(
                    "invalid hexadecimal key '{}'",
                    rawkey.as_bstr()
                ))
            })?;
        Ok(RecordRef { label, key })
    }

    /// Returns true if and only if the label of this record names a TV
    /// episode, which is always wrapped in braces at the end.
    pub fn is_episode(&self) -> bool {
        self.label.last() == Some(&b'}')
    }

    /// Copy this record into an owned `Record`.
    pub fn to_record(&self) -> Record {
        Record { key: self.key, label: BString::from(self.label) }
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// An owned key file record.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Record {
    /// The identifier of this record.
    pub key: u64,
    /// The label exactly as it appears in the key file.
    pub label: BString,
}

/// Open the key file at the given path for buffered reading.
///
/// The reader returned is seekable, which is what episode and label lookups
/// need.
pub fn open_key_file<P: AsRef<Path>>(path: P) -> Result<io::BufReader<File>> {
    Ok(io::BufReader::new(open_file(path)?))
}

/// A line oriented reader of key files.
///
/// Lines longer than the configured maximum record length are truncated and
/// the rest of the line is discarded.
#[derive(Debug)]
pub struct KeyFileReader<R> {
    rdr: R,
    max_len: usize,
    line: u64,
}

impl<R: BufRead> KeyFileReader<R> {
    /// Create a key file reader that uses the default maximum record length.
    pub fn new(rdr: R) -> KeyFileReader<R> {
        KeyFileReader { rdr, max_len: MAX_RECORD_LEN, line: 0 }
    }

    /// Set the maximum length, in bytes, of a line returned by this reader.
    pub fn max_len(mut self, max_len: usize) -> KeyFileReader<R> {
        self.max_len = max_len;
        self
    }

    /// Return the number of lines read so far.
    pub fn line_number(&self) -> u64 {
        self.line
    }

    /// Read the next line into `buf`, without its line terminator.
    ///
    /// The contents of `buf` are replaced. This returns `false` when there
    /// are no more lines.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<bool> {
        buf.clear();
        let n = self.rdr.read_until(b'\n', buf).map_err(Error::io)?;
        if n == 0 {
            return Ok(false);
        }
        self.line += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        buf.truncate(self.max_len);
        Ok(true)
    }

    /// Return a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.rdr
    }
}
