use std::fmt;
use std::fs::File;
use std::path::Path;
use std::time;

use memmap::Mmap;

use crate::error::{Error, Result};

/// The key file of titles. Each line has a title label (like
/// `Matrix, The (1999)`) and a hexadecimal movie identifier. TV series are
/// immediately followed by their episodes.
pub const TITLES_KEY: &str = "titles.key";

/// The offset index of the titles key file. The 4 byte entry at position
/// `4 * id` is the offset of the record for movie identifier `id`.
pub const TITLES_INDEX: &str = "titles.index";

/// The key file of people, labeled `Surname, Name (index)`.
pub const NAMES_KEY: &str = "names.key";

/// The key file of characters.
pub const CHARACTERS_KEY: &str = "characters.key";

/// The key file of companies, whose labels may end with a country code like
/// `[us]`.
pub const COMPANIES_KEY: &str = "companies.key";

/// A type that provides a Display impl for std::time::Duration.
#[derive(Debug)]
pub struct NiceDuration(pub time::Duration);

impl fmt::Display for NiceDuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:0.4} secs", self.fractional_seconds())
    }
}

impl NiceDuration {
    /// Create a duration corresponding to the amount of time since the
    /// instant given.
    pub fn since(t: time::Instant) -> NiceDuration {
        NiceDuration(time::Instant::now().duration_since(t))
    }

    /// Returns the number of seconds in this duration in fraction form.
    /// The number to the left of the decimal point is the number of seconds,
    /// and the number to the right is the number of milliseconds.
    pub fn fractional_seconds(&self) -> f64 {
        let fractional = (self.0.subsec_nanos() as f64) / 1_000_000_000.0;
        self.0.as_secs() as f64 + fractional
    }
}

/// The bytes of a memory mapped file.
///
/// Empty files cannot be memory mapped, so they are represented without a
/// map.
#[derive(Debug)]
pub struct MappedFile(Option<Mmap>);

impl AsRef<[u8]> for MappedFile {
    fn as_ref(&self) -> &[u8] {
        match self.0 {
            None => &[],
            Some(ref mmap) => &mmap[..],
        }
    }
}

/// Builds a file-backed memory map.
pub unsafe fn mmap_file<P: AsRef<Path>>(path: P) -> Result<MappedFile> {
    let path = path.as_ref();
    let file = open_file(path)?;
    let len = file.metadata().map_err(|e| Error::io_path(e, path))?.len();
    if len == 0 {
        return Ok(MappedFile(None));
    }
    let mmap = Mmap::map(&file).map_err(|e| Error::io_path(e, path))?;
    Ok(MappedFile(Some(mmap)))
}

/// Opens a file for reading.
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<File> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io_path(e, path))?;
    Ok(file)
}
