/*!
This crate provides fuzzy searching of IMDb key files.

A key file is a sorted, line oriented text file where each line maps a label
(a title like `Matrix, The (1999)` or a name like `Smith, John (I)`) to a
hexadecimal identifier: `label|hexKey`. Searching scans a key file from start
to end, scoring every label against a query with the Ratcliff-Obershelp
similarity metric, and returns the records that score at least `0.6`.

Labels and queries are normalized before they are compared: case is folded,
years and imdb indexes are dropped, articles are moved around and names are
rearranged between `Surname, Name` and `Name Surname`. Each record is
compared in several of these forms and keeps its best score.

Episodes of a TV series are found without scoring, by using an offset index
to jump straight to the series in the titles key file.

# Example

```
use imdb_keyscan::{name_variations, NameKind, Searcher};

let keys = &b"Doe, Jane|2\nSmith, John (I)|1a2b\n"[..];
let query = name_variations("John Smith");
let results =
    Searcher::default().search_name(keys, &query, NameKind::Person, 10)?;
assert_eq!(results.len(), 1);
assert_eq!(results.as_slice()[0].value().key, 0x1a2b);
# Ok::<(), imdb_keyscan::Error>(())
```
*/

#![deny(missing_docs)]

pub use crate::articles::ArticleTable;
pub use crate::config::SearchConfig;
pub use crate::episode::{episodes_of, label_of, parse_id, OffsetIndex};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::record::{
    open_key_file, KeyFileReader, Record, RecordRef, FIELD_SEPARATOR,
    MAX_RECORD_LEN,
};
pub use crate::scored::{Scored, SearchResults};
pub use crate::search::{NameKind, Query, Searcher};
pub use crate::similarity::{similarity, Similarity, DEFAULT_LENGTH_THRESHOLD};
pub use crate::soundex::soundex;
pub use crate::util::{
    MappedFile, NiceDuration, CHARACTERS_KEY, COMPANIES_KEY, NAMES_KEY,
    TITLES_INDEX, TITLES_KEY,
};
pub use crate::variations::{
    canonical_name, canonical_title, character_variations, name_variations,
    normalize_name, normalize_title, title_variations,
};

pub mod normalize;

mod articles;
mod config;
mod episode;
mod error;
mod record;
mod scored;
mod search;
mod similarity;
mod soundex;
#[cfg(test)]
mod tests;
mod util;
mod variations;
