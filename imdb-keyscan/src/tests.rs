use std::fs;
use std::path::{Path, PathBuf};

use bstr::BString;
use byteorder::{ByteOrder, LE};
use tempdir::TempDir;

use crate::config::SearchConfig;
use crate::episode::{episodes_of, label_of, OffsetIndex};
use crate::error::ErrorKind;
use crate::record::open_key_file;
use crate::search::{NameKind, Query, Searcher};
use crate::util::{NAMES_KEY, TITLES_INDEX, TITLES_KEY};
use crate::variations::{name_variations, title_variations};

/// A simple test context that makes it convenient to write key files, offset
/// indexes and configuration files to a temporary data directory.
#[derive(Debug)]
struct TestContext {
    tmpdir: TempDir,
}

impl TestContext {
    fn new() -> TestContext {
        let tmpdir = TempDir::new("imdb-keyscan-test").unwrap();
        TestContext { tmpdir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.tmpdir.path().join(name)
    }

    /// Write the given lines as a key file, along with an offset index that
    /// addresses each line by its position.
    fn write_keys(&self, key_name: &str, index_name: &str, lines: &[&str]) {
        let (mut keys, mut index) = (vec![], vec![]);
        for line in lines {
            let mut entry = [0; 4];
            LE::write_u32(&mut entry, keys.len() as u32);
            index.extend_from_slice(&entry);
            keys.extend_from_slice(line.as_bytes());
            keys.push(b'\n');
        }
        fs::write(self.path(key_name), keys).unwrap();
        fs::write(self.path(index_name), index).unwrap();
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

fn labels<P: AsRef<Path>>(path: P, query: &Query) -> Vec<String> {
    let keys = open_key_file(path).unwrap();
    Searcher::default()
        .search_title(keys, query, 0)
        .unwrap()
        .into_iter()
        .map(|s| s.into_value().label.to_string())
        .collect()
}

const TITLES: &[&str] = &[
    "\"Friends\" (1994)|10",
    "\"Friends\" (1994) {The One Where It All Began (#1.1)}|11",
    "\"Friends\" (1994) {The One with the Sonogram at the End (#1.2)}|12",
    "Friends (2011)|13",
    "Matrix, The (1999)|2f",
    "Matrix Reloaded, The (2003)|30",
];

#[test]
fn search_title_file() {
    let ctx = TestContext::new();
    ctx.write_keys(TITLES_KEY, TITLES_INDEX, TITLES);

    let query = title_variations(&Default::default(), "The Matrix (1999)");
    let found = labels(ctx.path(TITLES_KEY), &query);
    assert_eq!(found[0], "Matrix, The (1999)");
    assert!(!found.iter().any(|l| l.ends_with('}')));
}

#[test]
fn search_episode_file() {
    let ctx = TestContext::new();
    ctx.write_keys(TITLES_KEY, TITLES_INDEX, TITLES);

    let query = title_variations(
        &Default::default(),
        "\"Friends\" (1994) {The One Where It All Began (#1.1)}",
    );
    let found = labels(ctx.path(TITLES_KEY), &query);
    assert_eq!(
        found[0],
        "\"Friends\" (1994) {The One Where It All Began (#1.1)}"
    );
    assert!(found.iter().all(|l| l.ends_with('}')));
}

#[test]
fn search_name_file() {
    let ctx = TestContext::new();
    let path = ctx.write(
        NAMES_KEY,
        "Doe, Jane|1\nSmith, John (I)|2\nSmith, John (II)|3\n",
    );

    let keys = open_key_file(&path).unwrap();
    let query = name_variations("John Smith");
    let results = Searcher::default()
        .search_name(keys, &query, NameKind::Person, 1)
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results.as_slice()[0].value().key, 2);
}

#[test]
fn episodes_from_files() {
    let ctx = TestContext::new();
    ctx.write_keys(TITLES_KEY, TITLES_INDEX, TITLES);

    let index = OffsetIndex::open(ctx.path(TITLES_INDEX)).unwrap();
    assert_eq!(index.last_id(), Some(5));

    let keys = open_key_file(ctx.path(TITLES_KEY)).unwrap();
    let episodes = episodes_of(0, &index, keys).unwrap();
    let keys: Vec<u64> = episodes.iter().map(|e| e.key).collect();
    assert_eq!(keys, vec![0x11, 0x12]);

    let keys = open_key_file(ctx.path(TITLES_KEY)).unwrap();
    assert!(episodes_of(4, &index, keys).unwrap().is_empty());

    let keys = open_key_file(ctx.path(TITLES_KEY)).unwrap();
    assert!(episodes_of(6, &index, keys).unwrap_err().is_out_of_range());
}

#[test]
fn label_from_files() {
    let ctx = TestContext::new();
    ctx.write_keys(TITLES_KEY, TITLES_INDEX, TITLES);

    let index = OffsetIndex::open(ctx.path(TITLES_INDEX)).unwrap();
    let mut keys = open_key_file(ctx.path(TITLES_KEY)).unwrap();
    assert_eq!(
        label_of(4, &index, &mut keys).unwrap(),
        Some(BString::from("Matrix, The (1999)"))
    );
    assert_eq!(label_of(100, &index, &mut keys).unwrap(), None);
}

#[test]
fn empty_offset_index() {
    let ctx = TestContext::new();
    let path = ctx.write(TITLES_INDEX, "");

    let index = OffsetIndex::open(path).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.last_id(), None);
    assert!(index.offset(0).unwrap_err().is_out_of_range());
}

#[test]
fn missing_key_file() {
    let ctx = TestContext::new();
    let err = open_key_file(ctx.path(TITLES_KEY)).unwrap_err();
    match *err.kind() {
        ErrorKind::Io { ref path, .. } => {
            assert_eq!(path.as_ref(), Some(&ctx.path(TITLES_KEY)));
        }
        ref kind => panic!("unexpected error kind: {:?}", kind),
    }
}

#[test]
fn config_from_file() {
    let ctx = TestContext::new();
    let path = ctx.write(
        "config.json",
        r#"{"length_threshold": 0.75, "articles": "legacy"}"#,
    );

    let config = SearchConfig::from_path(path).unwrap();
    assert_eq!(config.length_threshold, 0.75);
    assert_eq!(config.articles.name(), "legacy");
    assert_eq!(config.acceptance_threshold, 0.6);
    assert_eq!(config.max_record_len, 1023);
}

#[test]
fn invalid_config_file() {
    let ctx = TestContext::new();
    let path = ctx.write("config.json", r#"{"articles": "klingon"}"#);

    let err = SearchConfig::from_path(path).unwrap_err();
    match *err.kind() {
        ErrorKind::Config(_) => {}
        ref kind => panic!("unexpected error kind: {:?}", kind),
    }
}
