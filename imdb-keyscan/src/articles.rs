use std::fmt;
use std::result;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Leading articles recognized in the flagship configuration.
///
/// The last four entries are Greek articles encoded as ISO-8859-7, which is
/// how they appear in the plain text data files.
const IMDB: &[&[u8]] = &[
    b"the", b"la", b"a", b"die", b"der", b"le", b"el", b"l'", b"il", b"das",
    b"les", b"i", b"o", b"ein", b"un", b"de", b"los", b"an", b"una", b"las",
    b"eine", b"den", b"het", b"gli", b"lo", b"os", b"ang", b"oi", b"az",
    b"een", b"ha-", b"det", b"ta", b"al-", b"mga", b"un'", b"uno", b"ett",
    b"dem", b"egy", b"els", b"eines", b"\xcf", b"\xc7", b"\xd4\xef",
    b"\xcf\xe9",
];

/// Leading articles recognized in the legacy configuration.
///
/// The Greek entries in this table are UTF-8.
const LEGACY: &[&[u8]] = &[
    b"the", b"la", b"a", b"die", b"der", b"le", b"el", b"l'", b"il", b"das",
    b"les", b"i", b"o", b"ein", b"un", b"los", b"de", b"an", b"una", b"eine",
    b"las", b"den", b"gli", b"het", b"lo", b"os", b"az", b"ha-", b"een",
    b"det", b"oi", b"ang", b"ta", b"al-", b"dem", b"uno", b"un'", b"ett",
    b"mga", "\u{39f}".as_bytes(), "\u{397}".as_bytes(), b"eines", b"els",
    "\u{3a4}\u{3bf}".as_bytes(), "\u{39f}\u{3b9}".as_bytes(),
];

/// An ordered, immutable table of leading articles.
///
/// Each article has a bare form (`the`) and a spaced form (`the `). The spaced
/// form is what precedes the rest of a title in its natural reading order.
/// Articles that end in an apostrophe or a hyphen (`l'`, `al-`) attach
/// directly to the following word, so their spaced form is the same as their
/// bare form.
///
/// The order of a table is significant: when more than one article could
/// match, the first one in the table wins.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ArticleTable {
    name: &'static str,
    articles: &'static [&'static [u8]],
}

impl ArticleTable {
    /// The article table used by the flagship key file format.
    pub fn imdb() -> ArticleTable {
        ArticleTable { name: "imdb", articles: IMDB }
    }

    /// The article table used by the older, legacy key file format.
    pub fn legacy() -> ArticleTable {
        ArticleTable { name: "legacy", articles: LEGACY }
    }

    /// Returns a list of strings representing the possible table names.
    pub fn possible_names() -> &'static [&'static str] {
        &["imdb", "legacy"]
    }

    /// Return the name of this table.
    ///
    /// The name returned can be parsed back into an `ArticleTable`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of articles in this table.
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// Return an iterator over the bare form of every article, in table
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = &'static [u8]> {
        self.articles.iter().copied()
    }

    /// Returns true if and only if `word` is exactly the bare form of an
    /// article in this table.
    pub fn is_article(&self, word: &[u8]) -> bool {
        self.articles.iter().any(|&art| art == word)
    }

    /// If `text` ends with `", "` followed by an article, return the index at
    /// which the `", "` begins.
    ///
    /// Matching is exact, so callers wanting a case insensitive match need to
    /// lowercase `text` first.
    pub fn trailing(&self, text: &[u8]) -> Option<usize> {
        for art in self.iter() {
            if text.len() < art.len() + 2 {
                continue;
            }
            let start = text.len() - art.len() - 2;
            if text.ends_with(art) && &text[start..start + 2] == b", " {
                return Some(start);
            }
        }
        None
    }

    /// If `text` begins with the spaced form of an article (ignoring ASCII
    /// case), return the length of that spaced form.
    pub fn leading(&self, text: &[u8]) -> Option<usize> {
        for art in self.iter() {
            let spaced = spaced(art);
            if text.len() >= spaced.len()
                && text[..spaced.len()].eq_ignore_ascii_case(&spaced)
            {
                return Some(spaced.len());
            }
        }
        None
    }
}

/// Return the spaced form of the given bare article.
pub(crate) fn spaced(article: &[u8]) -> Vec<u8> {
    let mut spaced = article.to_vec();
    if !attaches(article) {
        spaced.push(b' ');
    }
    spaced
}

/// Returns true when the article joins the following word without a space.
pub(crate) fn attaches(article: &[u8]) -> bool {
    match article.last() {
        Some(&b'\'') | Some(&b'-') => true,
        _ => false,
    }
}

impl Default for ArticleTable {
    fn default() -> ArticleTable {
        ArticleTable::imdb()
    }
}

impl fmt::Display for ArticleTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ArticleTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<ArticleTable> {
        match s {
            "imdb" => Ok(ArticleTable::imdb()),
            "legacy" => Ok(ArticleTable::legacy()),
            unk => {
                Err(Error::config(format!("unknown article table: '{}'", unk)))
            }
        }
    }
}

impl Serialize for ArticleTable {
    fn serialize<S>(&self, s: S) -> result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(self.name())
    }
}

impl<'a> Deserialize<'a> for ArticleTable {
    fn deserialize<D>(d: D) -> result::Result<ArticleTable, D::Error>
    where
        D: Deserializer<'a>,
    {
        use serde::de::Error;

        let name = String::deserialize(d)?;
        name.parse().map_err(|e: self::Error| D::Error::custom(e.to_string()))
    }
}
