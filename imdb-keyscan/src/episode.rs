use std::convert::TryFrom;
use std::io::{BufRead, Seek, SeekFrom};
use std::path::Path;

use bstr::{BString, ByteSlice};
use byteorder::{ByteOrder, LE};

use crate::error::{Error, Result};
use crate::record::{KeyFileReader, Record, RecordRef, FIELD_SEPARATOR};
use crate::util::{mmap_file, MappedFile};

/// The size, in bytes, of each entry in an offset index.
const ENTRY_SIZE: u64 = 4;

/// A dense array of offsets into a key file, addressed by identifier.
///
/// The entry for identifier `id` is a 4 byte little endian unsigned integer
/// at byte `4 * id`, holding the offset of that identifier's record in the
/// corresponding key file.
#[derive(Debug)]
pub struct OffsetIndex<B> {
    bytes: B,
}

impl OffsetIndex<MappedFile> {
    /// Open an offset index file as a memory map.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<OffsetIndex<MappedFile>> {
        // We claim it is safe to open the following memory map because we
        // don't mutate it and no other process (should) either.
        let bytes = unsafe { mmap_file(path)? };
        Ok(OffsetIndex::new(bytes))
    }
}

impl<B: AsRef<[u8]>> OffsetIndex<B> {
    /// Create an offset index from its raw bytes.
    pub fn new(bytes: B) -> OffsetIndex<B> {
        OffsetIndex { bytes }
    }

    /// Return the number of complete entries in this index.
    pub fn len(&self) -> u64 {
        self.bytes.as_ref().len() as u64 / ENTRY_SIZE
    }

    /// Returns true if and only if this index has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the largest identifier in this index, if it has any entries.
    pub fn last_id(&self) -> Option<u32> {
        self.len().checked_sub(1).and_then(|id| u32::try_from(id).ok())
    }

    /// Return the key file offset for the given identifier.
    ///
    /// If the entry for `id` lies (even partially) beyond the end of the
    /// index, then an `IndexOutOfRange` error is returned.
    pub fn offset(&self, id: u32) -> Result<u64> {
        let start = id as u64 * ENTRY_SIZE;
        let bytes = self.bytes.as_ref();
        if start + ENTRY_SIZE > bytes.len() as u64 {
            return Err(Error::out_of_range(id as i64));
        }
        let start = start as usize;
        Ok(LE::read_u32(&bytes[start..start + ENTRY_SIZE as usize]) as u64)
    }
}

/// Parse a decimal identifier as given by a user.
///
/// Negative identifiers, and identifiers too big to address an offset index,
/// produce an `IndexOutOfRange` error.
pub fn parse_id(id: &str) -> Result<u32> {
    let id: i64 = id.trim().parse().map_err(Error::number)?;
    u32::try_from(id).map_err(|_| Error::out_of_range(id))
}

/// Return every episode of the TV series with the given identifier.
///
/// The offset index gives the position of the series' own record in the key
/// file. That record must be a series label, which starts with `"` and ends
/// with `)`. Otherwise the identifier does not name a series and no episodes
/// are returned. Episodes are the records immediately following the series
/// whose labels are the series label followed by ` {...}`, in file order.
/// The first record that is not such an episode ends the list.
///
/// If the identifier is beyond the end of the offset index, then an
/// `IndexOutOfRange` error is returned.
pub fn episodes_of<B, R>(
    series_id: u32,
    index: &OffsetIndex<B>,
    keys: R,
) -> Result<Vec<Record>>
where
    B: AsRef<[u8]>,
    R: BufRead + Seek,
{
    let offset = index.offset(series_id)?;
    let mut rdr = KeyFileReader::new(keys);
    rdr.get_mut().seek(SeekFrom::Start(offset)).map_err(Error::io)?;

    let mut line = vec![];
    if !rdr.read_line(&mut line)? {
        return Ok(vec![]);
    }
    let series = match line.rfind_byte(FIELD_SEPARATOR) {
        None => return Ok(vec![]),
        Some(i) => line[..i].to_vec(),
    };
    if series.first() != Some(&b'"') || series.last() != Some(&b')') {
        log::debug!(
            "identifier {} does not name a series: '{}'",
            series_id,
            series.as_bstr()
        );
        return Ok(vec![]);
    }

    let mut episodes = vec![];
    while rdr.read_line(&mut line)? {
        if !line.starts_with(&series) {
            break;
        }
        let rec = match RecordRef::parse(&line) {
            Ok(rec) => rec,
            Err(_) => continue,
        };
        if rec.label.get(series.len() + 1) != Some(&b'{') || !rec.is_episode()
        {
            break;
        }
        episodes.push(rec.to_record());
    }
    log::debug!(
        "found {} episodes for series '{}'",
        episodes.len(),
        series.as_bstr()
    );
    Ok(episodes)
}

/// Return the label of the record with the given identifier.
///
/// If the identifier is beyond the end of the offset index, or if there is
/// no line at its offset, then `None` is returned.
pub fn label_of<B, R>(
    id: u32,
    index: &OffsetIndex<B>,
    keys: R,
) -> Result<Option<BString>>
where
    B: AsRef<[u8]>,
    R: BufRead + Seek,
{
    let offset = match index.offset(id) {
        Ok(offset) => offset,
        Err(ref err) if err.is_out_of_range() => return Ok(None),
        Err(err) => return Err(err),
    };
    let mut rdr = KeyFileReader::new(keys);
    rdr.get_mut().seek(SeekFrom::Start(offset)).map_err(Error::io)?;
    let mut line = vec![];
    if !rdr.read_line(&mut line)? {
        return Ok(None);
    }
    let label = match line.rfind_byte(FIELD_SEPARATOR) {
        None => &line[..],
        Some(i) => &line[..i],
    };
    Ok(Some(BString::from(label)))
}
