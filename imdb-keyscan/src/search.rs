use std::io::BufRead;
use std::time::Instant;

use bstr::ByteSlice;

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::normalize::{
    character_forms, lowercase, person_forms, strip_country_code,
    strip_name_index, strip_series_quotes, strip_title_suffixes,
    strip_trailing_article,
};
use crate::record::{KeyFileReader, Record, RecordRef};
use crate::scored::{Scored, SearchResults};
use crate::similarity::Similarity;
use crate::util::NiceDuration;

/// A search query made of up to three alternate phrasings of the same name
/// or title.
///
/// The primary variant is always compared with every record. The secondary
/// variant is an alternate form of the primary one, such as a name in its
/// natural reading order or a title without its article. The tertiary
/// variant is the long form of the query, including disambiguating
/// parentheticals like a year, an imdb index or an episode title.
///
/// Empty secondary or tertiary variants are treated as absent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Query {
    first: Vec<u8>,
    second: Option<Vec<u8>>,
    third: Option<Vec<u8>>,
}

impl Query {
    /// Create a query with the given primary variant.
    pub fn new<T: Into<Vec<u8>>>(first: T) -> Query {
        Query { first: first.into(), second: None, third: None }
    }

    /// Set the secondary variant.
    pub fn second<T: Into<Vec<u8>>>(mut self, second: T) -> Query {
        self.second = Some(second.into()).filter(|s| !s.is_empty());
        self
    }

    /// Set the tertiary variant.
    pub fn third<T: Into<Vec<u8>>>(mut self, third: T) -> Query {
        self.third = Some(third.into()).filter(|s| !s.is_empty());
        self
    }

    /// Return the primary variant.
    pub fn first_variant(&self) -> &[u8] {
        &self.first
    }

    /// Return the secondary variant, if present.
    pub fn second_variant(&self) -> Option<&[u8]> {
        self.second.as_ref().map(|s| s.as_slice())
    }

    /// Return the tertiary variant, if present.
    pub fn third_variant(&self) -> Option<&[u8]> {
        self.third.as_ref().map(|s| s.as_slice())
    }

    /// Returns an error if any variant of this query is longer than
    /// `max_len` bytes.
    pub fn validate(&self, max_len: usize) -> Result<()> {
        let variants = Some(self.first_variant())
            .into_iter()
            .chain(self.second_variant())
            .chain(self.third_variant());
        for variant in variants {
            if variant.len() > max_len {
                return Err(Error::query_too_long(variant.len(), max_len));
            }
        }
        Ok(())
    }

    fn lowercased(&self) -> (Vec<u8>, Option<Vec<u8>>, Option<Vec<u8>>) {
        (
            lowercase(&self.first),
            self.second_variant().map(lowercase),
            self.third_variant().map(lowercase),
        )
    }
}

/// The kind of labels held by a name key file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NameKind {
    /// People, labeled `Surname, Name (index)`.
    Person,
    /// Characters, labeled by the name as it is read.
    Character,
}

/// A handle for scanning key files for records similar to a query.
///
/// Every search reads its key file from start to end exactly once. Each
/// record is scored by comparing one or more normalized forms of its label
/// with the variants of the query, and the maximum of those comparisons
/// becomes its score. Records scoring at least the acceptance threshold are
/// returned in descending order of score, with ties listed in file order.
///
/// A searcher holds only its configuration, so it can be shared freely.
#[derive(Clone, Debug, Default)]
pub struct Searcher {
    config: SearchConfig,
    sim: Similarity,
}

impl Searcher {
    /// Create a new searcher with the given configuration.
    pub fn new(config: SearchConfig) -> Searcher {
        let sim = config.similarity();
        Searcher { config, sim }
    }

    /// Return the configuration of this searcher.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search a key file of people or characters.
    ///
    /// Besides the label itself, a person label is compared as a surname
    /// alone and in `Name Surname` order. A character label is compared with
    /// its last word alone. The secondary variant is only compared with those
    /// derived forms, and the tertiary variant only with labels that carry a
    /// parenthetical.
    ///
    /// At most `limit` results are returned, unless `limit` is `0`.
    pub fn search_name<R: BufRead>(
        &self,
        keys: R,
        query: &Query,
        kind: NameKind,
        limit: usize,
    ) -> Result<SearchResults<Record>> {
        if !self.accepts(query) {
            return Ok(SearchResults::new());
        }
        let (name1, name2, name3) = query.lowercased();
        let (sim, config) = (&self.sim, &self.config);
        self.scan("name", keys, limit, |rec| {
            let line = lowercase(strip_name_index(rec.label));
            let forms = match kind {
                NameKind::Person => person_forms(&line),
                NameKind::Character => character_forms(&line),
            };

            let mut ratio = sim.ratio(&name1, &line) + config.direct_bonus;
            if let Some(ref forms) = forms {
                ratio = ratio.max(sim.ratio(&name1, &forms.surname));
                if kind == NameKind::Person {
                    ratio = ratio.max(sim.ratio(&name1, &forms.name_surname));
                }
                if let Some(ref name2) = name2 {
                    ratio = ratio.max(sim.ratio(name2, &forms.surname));
                    if !forms.name_surname.is_empty() {
                        ratio =
                            ratio.max(sim.ratio(name2, &forms.name_surname));
                    }
                }
            }
            if let Some(ref name3) = name3 {
                if rec.label.find_byte(b')').is_some() {
                    let long = sim.ratio(name3, &lowercase(rec.label));
                    ratio = ratio.max(long + config.long_form_bonus);
                }
            }
            Some(ratio)
        })
    }

    /// Search a key file of titles.
    ///
    /// Labels are compared without their year and any trailing markers like
    /// `(TV)`, and without the quotes around TV series titles. When only one
    /// side of the comparison ends with an article, the article-less form of
    /// the other is compared too.
    ///
    /// If the tertiary variant ends with `}`, the query names an episode.
    /// Then only episode labels are considered, and only the tertiary variant
    /// is compared with them. Otherwise episode labels are skipped.
    ///
    /// At most `limit` results are returned, unless `limit` is `0`.
    pub fn search_title<R: BufRead>(
        &self,
        keys: R,
        query: &Query,
        limit: usize,
    ) -> Result<SearchResults<Record>> {
        if !self.accepts(query) {
            return Ok(SearchResults::new());
        }
        let (title1, title2, title3) = query.lowercased();
        let (sim, config) = (&self.sim, &self.config);
        let has_article = config.articles.trailing(&title1).is_some();
        let episode = title3
            .as_ref()
            .map_or(false, |t| t.last() == Some(&b'}'));
        self.scan("title", keys, limit, |rec| {
            if rec.is_episode() != episode {
                return None;
            }

            let mut ratio = 0.0;
            if !episode {
                let line = lowercase(strip_series_quotes(
                    strip_title_suffixes(rec.label),
                ));
                let no_article =
                    strip_trailing_article(&config.articles, &line);

                ratio = sim.ratio(&title1, &line) + config.direct_bonus;
                match (no_article, &title2) {
                    (Some(no_article), _) if !has_article => {
                        ratio = ratio.max(sim.ratio(&title1, no_article));
                    }
                    (None, &Some(ref title2)) if has_article => {
                        ratio = ratio.max(sim.ratio(title2, &line));
                    }
                    _ => {}
                }
            }
            if let Some(ref title3) = title3 {
                let long = sim.ratio(title3, &lowercase(rec.label));
                ratio = ratio.max(long + config.long_form_bonus);
            }
            Some(ratio)
        })
    }

    /// Search a key file of companies.
    ///
    /// A trailing country code like ` [us]` is stripped from each label
    /// before comparison, and a small penalty is subtracted from the score of
    /// every label that had one. When the configuration asks for it, labels
    /// are compared whole if `name` carries a country code itself.
    ///
    /// At most `limit` results are returned, unless `limit` is `0`.
    pub fn search_company_name<R: BufRead>(
        &self,
        keys: R,
        name: &[u8],
        limit: usize,
    ) -> Result<SearchResults<Record>> {
        if !self.accepts(&Query::new(name)) {
            return Ok(SearchResults::new());
        }
        let name1 = lowercase(name);
        let (sim, config) = (&self.sim, &self.config);
        let without_country =
            !config.company_country_from_query || name1.last() != Some(&b']');
        self.scan("company", keys, limit, |rec| {
            let mut var = 0.0;
            let mut label = rec.label;
            if without_country {
                if let Some(stripped) = strip_country_code(label) {
                    label = stripped;
                    var = -config.country_code_penalty;
                }
            }
            Some(sim.ratio(&name1, &lowercase(label)) + var)
        })
    }

    /// Returns false, after logging why, when no record could match the
    /// query.
    fn accepts(&self, query: &Query) -> bool {
        match query.validate(self.config.max_record_len) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("returning no results: {}", err);
                false
            }
        }
    }

    /// Scan every record of a key file, keeping those whose score is at
    /// least the acceptance threshold. A score of `None` skips the record.
    fn scan<R, F>(
        &self,
        what: &str,
        keys: R,
        limit: usize,
        mut score: F,
    ) -> Result<SearchResults<Record>>
    where
        R: BufRead,
        F: FnMut(&RecordRef) -> Option<f64>,
    {
        let start = Instant::now();
        let mut rdr =
            KeyFileReader::new(keys).max_len(self.config.max_record_len);
        let mut line = vec![];
        let mut matches = vec![];
        let (mut scanned, mut malformed) = (0u64, 0u64);
        while rdr.read_line(&mut line)? {
            let rec = match RecordRef::parse(&line) {
                Ok(rec) => rec,
                Err(err) => {
                    malformed += 1;
                    log::debug!(
                        "skipping line {}: {}",
                        rdr.line_number(),
                        err
                    );
                    continue;
                }
            };
            scanned += 1;
            let ratio = match score(&rec) {
                None => continue,
                Some(ratio) => ratio,
            };
            if ratio >= self.config.acceptance_threshold {
                matches.push(Scored::new(rec.to_record()).with_score(ratio));
            }
        }

        let mut results = SearchResults::from_unsorted(matches);
        log::debug!(
            "{} search scanned {} records ({} malformed), {} matched, \
             took {}",
            what,
            scanned,
            malformed,
            results.len(),
            NiceDuration::since(start),
        );
        results.truncate(limit);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn searcher() -> Searcher {
        Searcher::default()
    }

    fn labels(results: &SearchResults<Record>) -> Vec<String> {
        results.iter().map(|r| r.value().label.to_string()).collect()
    }

    fn approx(x: f64, y: f64) -> bool {
        (x - y).abs() < 1e-9
    }

    #[test]
    fn query_ignores_empty_variants() {
        let q = Query::new("a").second("").third("");
        assert_eq!(q.second_variant(), None);
        assert_eq!(q.third_variant(), None);
    }

    #[test]
    fn query_validate() {
        let q = Query::new("abc").second("abcdef");
        assert!(q.validate(6).is_ok());
        let err = q.validate(5).unwrap_err();
        match *err.kind() {
            crate::ErrorKind::QueryTooLong { len, max } => {
                assert_eq!((len, max), (6, 5));
            }
            ref kind => panic!("unexpected error: {:?}", kind),
        }
    }

    #[test]
    fn person_by_decomposition() {
        let keys = &b"Smith, John (I)|1a2b\nDoe, Jane|3\n"[..];
        let query = Query::new("Smith, John").second("John Smith");
        let results =
            searcher().search_name(keys, &query, NameKind::Person, 0).unwrap();
        assert_eq!(labels(&results), vec!["Smith, John (I)"]);
        let (score, rec) = results.into_vec().remove(0).into_pair();
        assert!(approx(score, 1.05));
        assert_eq!(rec.key, 0x1a2b);
    }

    #[test]
    fn person_surname_only_query() {
        let keys = &b"Smith, John (I)|1\nSmyth, Mary|2\nJones, Tom|3\n"[..];
        let query = Query::new("smith");
        let results =
            searcher().search_name(keys, &query, NameKind::Person, 0).unwrap();
        assert_eq!(labels(&results), vec!["Smith, John (I)", "Smyth, Mary"]);
        assert!(approx(results.as_slice()[0].score(), 1.0));
        assert!(approx(results.as_slice()[1].score(), 0.8));
    }

    #[test]
    fn person_long_form_bonus() {
        let keys = &b"Smith, John (I)|1\nSmith, John (II)|2\n"[..];
        let query = Query::new("Smith, John").third("Smith, John (II)");
        let results =
            searcher().search_name(keys, &query, NameKind::Person, 0).unwrap();
        assert_eq!(
            labels(&results),
            vec!["Smith, John (II)", "Smith, John (I)"]
        );
        assert!(approx(results.as_slice()[0].score(), 1.1));
    }

    #[test]
    fn character_last_word() {
        let keys = &b"Captain Jack Sparrow|1\nWill Turner|2\n"[..];
        let query = Query::new("Sparrow");
        let results = searcher()
            .search_name(keys, &query, NameKind::Character, 0)
            .unwrap();
        assert_eq!(labels(&results), vec!["Captain Jack Sparrow"]);
        assert!(approx(results.as_slice()[0].score(), 1.0));
    }

    #[test]
    fn title_with_candidate_article() {
        let keys =
            &b"Matrix, The (1999)|2f\nMatrix Reloaded, The (2003)|30\n"[..];
        let results = searcher()
            .search_title(keys, &Query::new("Matrix"), 0)
            .unwrap();
        assert_eq!(labels(&results), vec!["Matrix, The (1999)"]);
        assert!(approx(results.as_slice()[0].score(), 1.0));
        assert_eq!(results.as_slice()[0].value().key, 0x2f);
    }

    #[test]
    fn title_with_query_article() {
        let keys = &b"Matrix (1999)|1\n"[..];
        let query = Query::new("Matrix, The").second("Matrix");
        let results = searcher().search_title(keys, &query, 0).unwrap();
        assert_eq!(labels(&results), vec!["Matrix (1999)"]);
        assert!(approx(results.as_slice()[0].score(), 1.0));
    }

    #[test]
    fn title_raw_query_against_article() {
        // Without canonicalization, "the matrix" still clears the
        // threshold against the article-less label.
        let keys = &b"Matrix, The (1999)|2f\n"[..];
        let results = searcher()
            .search_title(keys, &Query::new("The Matrix"), 0)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.as_slice()[0].score() >= 0.6);
    }

    #[test]
    fn title_skips_episodes() {
        let keys = &b"\"Foo\" (1990)|1\n\"Foo\" (1990) {Ep1}|2\n"[..];
        let results =
            searcher().search_title(keys, &Query::new("Foo"), 0).unwrap();
        assert_eq!(labels(&results), vec!["\"Foo\" (1990)"]);
        assert!(approx(results.as_slice()[0].score(), 1.05));
    }

    #[test]
    fn title_episode_query() {
        let keys = &b"\"Foo\" (1990)|1\n\
                      \"Foo\" (1990) {Ep1}|2\n\
                      \"Foo\" (1990) {Ep2}|3\n"[..];
        let query = Query::new("Foo").third("\"Foo\" (1990) {Ep2}");
        let results = searcher().search_title(keys, &query, 0).unwrap();
        assert_eq!(
            labels(&results),
            vec!["\"Foo\" (1990) {Ep2}", "\"Foo\" (1990) {Ep1}"]
        );
        assert!(approx(results.as_slice()[0].score(), 1.1));
    }

    #[test]
    fn company_country_code() {
        let keys = &b"Acme Corp. [us]|1\nAcme Corp.|2\n"[..];
        let results = searcher()
            .search_company_name(keys, b"Acme Corp.", 0)
            .unwrap();
        assert_eq!(labels(&results), vec!["Acme Corp.", "Acme Corp. [us]"]);
        assert!(approx(results.as_slice()[0].score(), 1.0));
        assert!(approx(results.as_slice()[1].score(), 0.95));
    }

    #[test]
    fn company_country_from_query() {
        let keys = &b"Acme Corp. [us]|1\n"[..];
        let config = SearchConfig::default().company_country_from_query(true);
        let results = Searcher::new(config)
            .search_company_name(keys, b"Acme Corp. [us]", 0)
            .unwrap();
        assert!(approx(results.as_slice()[0].score(), 1.0));

        // The default always strips the label, which leaves it too short
        // to be compared with this query.
        let results = searcher()
            .search_company_name(keys, b"Acme Corp. [us]", 0)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn limit_and_order() {
        let keys = &b"Smith, A|1\nSmith, B|2\nSmith, C|3\nSmyth, D|4\n"[..];
        let query = Query::new("smith");
        let s = searcher();
        let all = s.search_name(keys, &query, NameKind::Person, 0).unwrap();
        assert_eq!(all.len(), 4);
        // Ties keep file order.
        assert_eq!(
            labels(&all),
            vec!["Smith, A", "Smith, B", "Smith, C", "Smyth, D"]
        );
        let scores: Vec<f64> = all.iter().map(|s| s.score()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let two = s.search_name(keys, &query, NameKind::Person, 2).unwrap();
        assert_eq!(labels(&two), vec!["Smith, A", "Smith, B"]);
    }

    #[test]
    fn malformed_lines_skipped() {
        let keys =
            &b"garbage without separator\nSmith, John|zz\nSmith, John|5\n"[..];
        let results = searcher()
            .search_name(keys, &Query::new("smith, john"), NameKind::Person, 0)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.as_slice()[0].value().key, 5);
    }

    #[test]
    fn too_long_query_matches_nothing() {
        let keys = &b"aaaa|1\n"[..];
        let config = SearchConfig::default().max_record_len(3);
        let results = Searcher::new(config)
            .search_title(keys, &Query::new("aaaa"), 0)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn no_match_is_empty() {
        let keys = &b"Smith, John|1\n"[..];
        let results = searcher()
            .search_name(keys, &Query::new("zzzzzzzzz"), NameKind::Person, 0)
            .unwrap();
        assert!(results.is_empty());
    }
}
