use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::articles::ArticleTable;
use crate::error::{Error, Result};
use crate::record::MAX_RECORD_LEN;
use crate::similarity::{Similarity, DEFAULT_LENGTH_THRESHOLD};
use crate::util::open_file;

/// The parameters that control how key files are scanned and scored.
///
/// The default configuration matches the flagship key file format. The
/// `legacy` configuration matches the older format, which uses a stricter
/// length disparity threshold, shorter lines and a slightly different
/// article table.
///
/// A configuration can be read from a JSON file, where each field may be
/// omitted to use its default value.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// The minimum score a record needs to be kept in the results.
    pub acceptance_threshold: f64,
    /// Strings whose length ratio falls below this are never compared.
    pub length_threshold: f64,
    /// The maximum length of a key file line or query, in bytes.
    pub max_record_len: usize,
    /// The articles recognized when comparing titles.
    pub articles: ArticleTable,
    /// Added to the score of the direct comparison of a query with a label.
    pub direct_bonus: f64,
    /// Added to the score of the comparison with the tertiary query variant.
    pub long_form_bonus: f64,
    /// Subtracted from the score of a company whose country code was
    /// stripped.
    pub country_code_penalty: f64,
    /// When enabled, country codes are stripped from company labels only
    /// when the query does not carry one itself. When disabled (the
    /// default), they are always stripped.
    pub company_country_from_query: bool,
}

impl Default for SearchConfig {
    fn default() -> SearchConfig {
        SearchConfig {
            acceptance_threshold: 0.6,
            length_threshold: DEFAULT_LENGTH_THRESHOLD,
            max_record_len: MAX_RECORD_LEN,
            articles: ArticleTable::imdb(),
            direct_bonus: 0.05,
            long_form_bonus: 0.1,
            country_code_penalty: 0.05,
            company_country_from_query: false,
        }
    }
}

impl SearchConfig {
    /// The configuration for legacy key files.
    pub fn legacy() -> SearchConfig {
        SearchConfig {
            length_threshold: 0.75,
            max_record_len: 699,
            articles: ArticleTable::legacy(),
            ..SearchConfig::default()
        }
    }

    /// Read a configuration from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<SearchConfig> {
        let path = path.as_ref();
        let rdr = io::BufReader::new(open_file(path)?);
        serde_json::from_reader(rdr).map_err(|e| {
            Error::config(format!("{}: {}", path.display(), e))
        })
    }

    /// Set the acceptance threshold.
    pub fn acceptance_threshold(mut self, threshold: f64) -> SearchConfig {
        self.acceptance_threshold = threshold;
        self
    }

    /// Set the length disparity threshold.
    pub fn length_threshold(mut self, threshold: f64) -> SearchConfig {
        self.length_threshold = threshold;
        self
    }

    /// Set the maximum record length.
    pub fn max_record_len(mut self, len: usize) -> SearchConfig {
        self.max_record_len = len;
        self
    }

    /// Set the article table.
    pub fn articles(mut self, articles: ArticleTable) -> SearchConfig {
        self.articles = articles;
        self
    }

    /// Enable or disable deciding on country code stripping from the query.
    pub fn company_country_from_query(mut self, yes: bool) -> SearchConfig {
        self.company_country_from_query = yes;
        self
    }

    /// Return the similarity metric described by this configuration.
    pub fn similarity(&self) -> Similarity {
        Similarity::new(self.length_threshold)
    }
}
