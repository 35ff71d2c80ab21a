/*!
Builders for the query variants of a free text name or title.

Key files label people as `Surname, Name` and titles with their leading
article moved to the end (`Matrix, The`). Users tend to write the opposite,
so these routines derive a canonical primary variant along with alternate
secondary and tertiary variants that a scan can compare with.
*/

use lazy_static::lazy_static;
use regex::Regex;

use crate::articles::{attaches, ArticleTable};
use crate::search::Query;

/// Words that begin a compound surname, such as `van` in `Ludwig van
/// Beethoven`.
const SURNAME_PREFIXES: &[&str] = &[
    "de", "la", "der", "den", "del", "y", "da", "van", "e", "von", "the", "di",
    "du", "el", "al",
];

lazy_static! {
    // A year, possibly unknown, with an optional roman numeral index for
    // distinct titles released in the same year: `(1998)` or `(1986/II)`.
    static ref YEAR_INDEX: Regex =
        Regex::new(r"\(([0-9?]{4}(/[IVXLCDM]+)?)\)").unwrap();
    static ref NAME_INDEX: Regex = Regex::new(r"\(([IVXLCDM]+)\)").unwrap();
    static ref ONLY_NAME_INDEX: Regex =
        Regex::new(r"^\(([IVXLCDM]+)\)$").unwrap();
    static ref KIND: Regex = Regex::new(r"\s*\((TV|V|mini|VG)\)$").unwrap();
}

/// Return a name in the canonical `Surname, Name` format.
///
/// The name is assumed to be in the `Name Surname` format. Names that
/// already contain `", "` are returned unchanged. When the first word, or
/// one of the two words before the last, is a common surname prefix, the
/// prefix and the word after it make up the surname, along with a following
/// `Jr.` if there is one.
pub fn canonical_name(name: &str) -> String {
    if name.contains(", ") {
        return name.to_string();
    }
    let mut words: Vec<&str> = name.split(' ').collect();
    let n = words.len();
    if n < 2 {
        return name.to_string();
    }
    if n == 2 {
        return format!("{}, {}", words[1], words[0]);
    }

    let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let indexes = if n == 3 { vec![0, n - 2] } else { vec![0, n - 2, n - 3] };
    for i in indexes {
        if !SURNAME_PREFIXES.contains(&lower[i].as_str()) {
            continue;
        }
        let mut surname = format!("{} {}", words[i], words[i + 1]);
        words.drain(i..i + 2);
        if lower.get(i + 2).map_or(false, |w| w.starts_with("jr")) {
            surname.push(' ');
            surname.push_str(words.remove(i));
        }
        return format!("{}, {}", surname, words.join(" "));
    }
    let last = words[n - 1];
    format!("{}, {}", last, words[..n - 1].join(" "))
}

/// Return a name in the normal `Name Surname` format.
///
/// Only names with exactly one `", "` are rearranged.
pub fn normalize_name(name: &str) -> String {
    let parts: Vec<&str> = name.split(", ").collect();
    if parts.len() == 2 {
        format!("{} {}", parts[1], parts[0])
    } else {
        name.to_string()
    }
}

/// Return a title in the canonical format, with its leading article moved
/// to the end: `The Matrix` becomes `Matrix, The`.
///
/// Titles that already end with an article are returned unchanged.
pub fn canonical_title(articles: &ArticleTable, title: &str) -> String {
    let last = title.rsplit(", ").next().unwrap_or(title);
    if articles.is_article(last.to_lowercase().as_bytes()) {
        return title.to_string();
    }
    let len = match articles.leading(title.as_bytes()) {
        None => return title.to_string(),
        Some(len) => len,
    };
    match (title.get(..len), title.get(len..)) {
        (Some(article), Some(rest)) => {
            format!("{}, {}", rest, article.trim_end_matches(' '))
        }
        _ => title.to_string(),
    }
}

/// Return a title in the normal format, with its trailing article moved to
/// the front: `Matrix, The` becomes `The Matrix`.
pub fn normalize_title(articles: &ArticleTable, title: &str) -> String {
    let parts: Vec<&str> = title.split(", ").collect();
    let last = parts[parts.len() - 1];
    if parts.len() < 2 || !articles.is_article(last.to_lowercase().as_bytes())
    {
        return title.to_string();
    }
    let sep = if attaches(last.as_bytes()) { "" } else { " " };
    format!("{}{}{}", last, sep, parts[..parts.len() - 1].join(", "))
}

/// Build the query variants for searching a title key file.
///
/// * The primary variant is the canonical bare title, without quotes, year
///   or kind markers like `(TV)`.
/// * The secondary variant is the primary one without its trailing article.
/// * The tertiary variant is the long canonical title when the title
///   carries a year. For an episode title in the key file format (ending
///   with `}`), it is the title as given, which makes the search consider
///   episodes only.
pub fn title_variations(articles: &ArticleTable, title: &str) -> Query {
    let title = title.trim();
    let (first, third) = if title.ends_with('}') && title.contains('{') {
        let series = title[..title.rfind('{').unwrap_or(0)].trim_end();
        let first = canonical_title(articles, &bare_title(series).title);
        (first, title.to_string())
    } else if YEAR_INDEX.is_match(title) {
        let bare = bare_title(title);
        let first = canonical_title(articles, &bare.title);
        let third = bare.long_form(&first);
        (first, third)
    } else {
        (canonical_title(articles, title), String::new())
    };

    let mut query = Query::new(first.as_str()).third(third);
    let lower = first.to_ascii_lowercase();
    let without_article =
        articles.trailing(lower.as_bytes()).and_then(|i| first.get(..i));
    if let Some(bare) = without_article {
        query = query.second(bare);
    }
    query
}

/// Build the query variants for searching a name key file.
///
/// * The primary variant is the canonical name, without any trailing imdb
///   index like `(II)`.
/// * The secondary variant is the name in its normal format, if that
///   differs from the canonical one.
/// * The tertiary variant is the canonical name with the imdb index, if the
///   name had one.
pub fn name_variations(name: &str) -> Query {
    let name = name.trim();
    let (bare, index) = if NAME_INDEX.is_match(name) {
        split_name_index(name)
    } else {
        (name, None)
    };
    let first = canonical_name(bare);
    let second = normalize_name(&first);
    let third = index.map(|i| format!("{} ({})", first, i));

    let mut query = Query::new(first.as_str());
    if second != first {
        query = query.second(second);
    }
    if let Some(third) = third {
        query = query.third(third);
    }
    query
}

/// Build the query variants for searching a character key file.
///
/// The primary variant is the name in its normal format, without any imdb
/// index. The secondary variant moves the last word to the front, if that
/// changes anything.
pub fn character_variations(name: &str) -> Query {
    let (bare, _) = split_name_index(name.trim());
    let first = normalize_name(bare);
    let words: Vec<&str> = first.split_whitespace().collect();
    let mut query = Query::new(first.as_str());
    if words.len() > 1 {
        let second = format!(
            "{} {}",
            words[words.len() - 1],
            words[..words.len() - 1].join(" ")
        );
        if second != first {
            query = query.second(second);
        }
    }
    query
}

/// Split a trailing imdb index like `(II)` from a name.
///
/// Only the last parenthetical group is considered, and it must contain
/// nothing but a roman numeral.
fn split_name_index(name: &str) -> (&str, Option<&str>) {
    let (open, close) = match (name.rfind('('), name.rfind(')')) {
        (Some(open), Some(close)) if close > open => (open, close),
        _ => return (name, None),
    };
    if !ONLY_NAME_INDEX.is_match(&name[open..=close]) {
        return (name, None);
    }
    let bare = name[..open].trim_end();
    if bare.is_empty() {
        return (name, None);
    }
    (bare, Some(&name[open + 1..close]))
}

/// A title split into its bare text and the parts of its long form.
#[derive(Debug, Default)]
struct BareTitle {
    title: String,
    year_index: Option<String>,
    kind: Option<String>,
    series: bool,
}

impl BareTitle {
    /// Rebuild the long form of a title around the given (canonical) bare
    /// title.
    fn long_form(&self, title: &str) -> String {
        let mut long = if self.series {
            format!("\"{}\"", title)
        } else {
            title.to_string()
        };
        if let Some(ref year_index) = self.year_index {
            long.push_str(&format!(" ({})", year_index));
        }
        if let Some(ref kind) = self.kind {
            long.push_str(&format!(" ({})", kind));
        }
        long
    }
}

/// Strip the kind marker, year and series quotes from a long title.
fn bare_title(title: &str) -> BareTitle {
    let mut bare = BareTitle::default();
    let mut rest = title.trim();
    if let Some(caps) = KIND.captures(rest) {
        bare.kind = Some(caps[1].to_string());
        rest = &rest[..caps.get(0).map_or(rest.len(), |m| m.start())];
    }
    if let Some(caps) = YEAR_INDEX.captures_iter(rest).last() {
        bare.year_index = Some(caps[1].to_string());
        let end = caps.get(0).map_or(rest.len(), |m| m.start());
        rest = rest[..end].trim_end();
    }
    if rest.len() >= 2 && rest.starts_with('"') && rest.ends_with('"') {
        bare.series = true;
        rest = &rest[1..rest.len() - 1];
    }
    bare.title = rest.to_string();
    bare
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants(q: &Query) -> (String, Option<String>, Option<String>) {
        let s = |b: &[u8]| String::from_utf8(b.to_vec()).unwrap();
        (
            s(q.first_variant()),
            q.second_variant().map(s),
            q.third_variant().map(s),
        )
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_name("John Smith"), "Smith, John");
        assert_eq!(canonical_name("Smith, John"), "Smith, John");
        assert_eq!(canonical_name("Cher"), "Cher");
        assert_eq!(
            canonical_name("Ludwig van Beethoven"),
            "van Beethoven, Ludwig"
        );
        assert_eq!(canonical_name("Diego de la Vega"), "la Vega, Diego de");
        assert_eq!(
            canonical_name("Martin Luther King"),
            "King, Martin Luther"
        );
        assert_eq!(
            canonical_name("John van Dyke jr."),
            "van Dyke jr., John"
        );
    }

    #[test]
    fn normalize_names() {
        assert_eq!(normalize_name("Smith, John"), "John Smith");
        assert_eq!(normalize_name("John Smith"), "John Smith");
        assert_eq!(normalize_name("a, b, c"), "a, b, c");
    }

    #[test]
    fn canonical_titles() {
        let arts = ArticleTable::imdb();
        assert_eq!(canonical_title(&arts, "The Matrix"), "Matrix, The");
        assert_eq!(canonical_title(&arts, "Matrix, The"), "Matrix, The");
        assert_eq!(canonical_title(&arts, "L'Avventura"), "Avventura, L'");
        assert_eq!(canonical_title(&arts, "Theory"), "Theory");
        assert_eq!(canonical_title(&arts, "The"), "The");
    }

    #[test]
    fn normalize_titles() {
        let arts = ArticleTable::imdb();
        assert_eq!(normalize_title(&arts, "Matrix, The"), "The Matrix");
        assert_eq!(normalize_title(&arts, "Avventura, L'"), "L'Avventura");
        assert_eq!(normalize_title(&arts, "Good, Bad"), "Good, Bad");
        assert_eq!(normalize_title(&arts, "Matrix"), "Matrix");
    }

    #[test]
    fn title_variants_plain() {
        let q = title_variations(&ArticleTable::imdb(), "The Matrix");
        assert_eq!(variants(&q), ("Matrix, The".into(), some("Matrix"), None));

        let q = title_variations(&ArticleTable::imdb(), "Matrix");
        assert_eq!(variants(&q), ("Matrix".into(), None, None));
    }

    #[test]
    fn title_variants_with_year() {
        let q = title_variations(&ArticleTable::imdb(), "The Matrix (1999)");
        assert_eq!(
            variants(&q),
            ("Matrix, The".into(), some("Matrix"), some("Matrix, The (1999)"))
        );

        let q = title_variations(&ArticleTable::imdb(), "\"Foo\" (1990/II)");
        assert_eq!(
            variants(&q),
            ("Foo".into(), None, some("\"Foo\" (1990/II)"))
        );

        let q = title_variations(&ArticleTable::imdb(), "Bar (2001) (TV)");
        assert_eq!(
            variants(&q),
            ("Bar".into(), None, some("Bar (2001) (TV)"))
        );
    }

    #[test]
    fn title_variants_episode() {
        let title = "\"The Foo\" (1990) {Pilot}";
        let q = title_variations(&ArticleTable::imdb(), title);
        assert_eq!(
            variants(&q),
            ("Foo, The".into(), some("Foo"), some(title))
        );
    }

    #[test]
    fn name_variants() {
        let q = name_variations("Doe, Jane");
        assert_eq!(variants(&q), ("Doe, Jane".into(), some("Jane Doe"), None));

        let q = name_variations("John Smith");
        assert_eq!(
            variants(&q),
            ("Smith, John".into(), some("John Smith"), None)
        );

        let q = name_variations("John Smith (II)");
        assert_eq!(
            variants(&q),
            (
                "Smith, John".into(),
                some("John Smith"),
                some("Smith, John (II)")
            )
        );

        let q = name_variations("Cher");
        assert_eq!(variants(&q), ("Cher".into(), None, None));
    }

    #[test]
    fn character_variants() {
        let q = character_variations("Jack Sparrow");
        assert_eq!(
            variants(&q),
            ("Jack Sparrow".into(), some("Sparrow Jack"), None)
        );

        let q = character_variations("Sparrow, Jack (I)");
        assert_eq!(
            variants(&q),
            ("Jack Sparrow".into(), some("Sparrow Jack"), None)
        );

        let q = character_variations("Gandalf");
        assert_eq!(variants(&q), ("Gandalf".into(), None, None));
    }
}
