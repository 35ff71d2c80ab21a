/*!
Pure transforms applied to key file labels before they are scored.

Each function takes a byte string and returns a new (or narrowed) byte
string, so a scan can chain them explicitly for each record.
*/

use bstr::ByteSlice;

use crate::articles::ArticleTable;

/// Lowercase all ASCII bytes, leaving every other byte as is.
pub fn lowercase(text: &[u8]) -> Vec<u8> {
    text.to_ascii_lowercase()
}

/// Truncate `text` just before the last occurrence of `open`.
///
/// The byte immediately preceding `open` is dropped too, since it is
/// normally the space separating a suffix like ` (I)` or ` [us]` from the
/// rest of the label. Returns `None` when `open` does not occur.
pub fn strip_suffix_group(text: &[u8], open: u8) -> Option<&[u8]> {
    text.rfind_byte(open).map(|i| &text[..i.saturating_sub(1)])
}

/// Strip a trailing imdb index like ` (II)` from a name label.
pub fn strip_name_index(label: &[u8]) -> &[u8] {
    strip_suffix_group(label, b'(').unwrap_or(label)
}

/// Strip a trailing country code like ` [us]` from a company label.
pub fn strip_country_code(label: &[u8]) -> Option<&[u8]> {
    strip_suffix_group(label, b'[')
}

/// Strip trailing parenthetical groups from a title label, up to and
/// including the group holding the year.
///
/// Groups such as `(TV)` or `(V)` that follow the year are removed first.
/// Stripping stops at the first group (from the right) that begins with
/// `1`, `2` or `?`, which is how years (including unknown ones) start.
pub fn strip_title_suffixes(label: &[u8]) -> &[u8] {
    let mut title = label;
    while let Some(i) = title.rfind_byte(b'(') {
        let next = title.get(i + 1).copied();
        title = &title[..i.saturating_sub(1)];
        match next {
            Some(b'1') | Some(b'2') | Some(b'?') => break,
            _ => {}
        }
    }
    title
}

/// Strip the double quotes that enclose the title of a TV series.
///
/// The leading quote is always removed if present. The trailing quote is
/// removed only if what remains is longer than two bytes.
pub fn strip_series_quotes(title: &[u8]) -> &[u8] {
    if title.first() != Some(&b'"') {
        return title;
    }
    let title = &title[1..];
    if title.len() > 2 && title.last() == Some(&b'"') {
        &title[..title.len() - 1]
    } else {
        title
    }
}

/// If `title` ends with `", "` followed by an article, return the title
/// without that trailing article.
pub fn strip_trailing_article<'a>(
    articles: &ArticleTable,
    title: &'a [u8],
) -> Option<&'a [u8]> {
    if title.find_byte(b',').is_none() {
        return None;
    }
    articles.trailing(title).map(|i| &title[..i])
}

/// Alternate forms of a normalized name label used as extra comparison
/// candidates.
///
/// For a person, `surname` is the part before the comma and `name_surname`
/// is the name in its natural reading order. For a character, `surname` is
/// the last word and `name_surname` is the whole label.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NameForms {
    /// The surname only.
    pub surname: Vec<u8>,
    /// The name followed by the surname.
    pub name_surname: Vec<u8>,
}

/// Decompose a `"surname, name"` label.
///
/// Only the last comma is considered, and it must be followed by a space.
pub fn person_forms(name: &[u8]) -> Option<NameForms> {
    let i = name.rfind_byte(b',')?;
    if name.get(i + 1) != Some(&b' ') {
        return None;
    }
    let surname = name[..i].to_vec();
    let mut name_surname = name[i + 2..].to_vec();
    name_surname.push(b' ');
    name_surname.extend_from_slice(&surname);
    Some(NameForms { surname, name_surname })
}

/// Decompose a character label on its last space.
pub fn character_forms(name: &[u8]) -> Option<NameForms> {
    let i = name.rfind_byte(b' ')?;
    Some(NameForms {
        surname: name[i + 1..].to_vec(),
        name_surname: name.to_vec(),
    })
}
