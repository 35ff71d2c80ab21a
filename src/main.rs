use std::env;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use imdb_keyscan::{
    character_variations, episodes_of, label_of, name_variations,
    open_key_file, parse_id, similarity, soundex, title_variations, NameKind,
    OffsetIndex, Query, SearchConfig, Searcher, CHARACTERS_KEY,
    COMPANIES_KEY, NAMES_KEY, TITLES_INDEX, TITLES_KEY,
};
use lazy_static::lazy_static;

use crate::util::{write_episodes, write_tsv};

mod logger;
mod util;

fn main() {
    if let Err(err) = try_main() {
        // A pipe error occurs when the consumer of this process's output has
        // hung up. This is a normal event, and we should quit gracefully.
        if is_pipe_error(&err) {
            process::exit(0);
        }
        eprintln!("{:?}", err);
        process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    logger::init()?;
    log::set_max_level(log::LevelFilter::Info);

    let args = Args::from_matches(&app().get_matches())?;
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    }

    if let Some(ref id) = args.episodes {
        return args.print_episodes(id);
    }
    if let Some(ref id) = args.label {
        return args.print_label(id);
    }
    let query = match args.query {
        None => anyhow::bail!("a query is required"),
        Some(ref query) => query,
    };
    if let Some(ref other) = args.compare {
        println!("{:0.4}", similarity(query, other));
        return Ok(());
    }
    if args.soundex {
        match soundex(query) {
            None => anyhow::bail!("query '{}' has no letters to code", query),
            Some(code) => println!("{}", code),
        }
        return Ok(());
    }
    args.search(query)
}

#[derive(Debug)]
struct Args {
    compare: Option<String>,
    config: SearchConfig,
    data_dir: PathBuf,
    debug: bool,
    episodes: Option<String>,
    kind: Kind,
    label: Option<String>,
    limit: usize,
    query: Option<String>,
    second: Option<String>,
    soundex: bool,
    third: Option<String>,
}

impl Args {
    fn from_matches(matches: &clap::ArgMatches) -> anyhow::Result<Args> {
        let lossy = |name: &str| {
            matches.value_of_lossy(name).map(|v| v.into_owned())
        };
        let data_dir = match matches.value_of_os("data-dir") {
            None => anyhow::bail!("missing data directory"),
            Some(dir) => PathBuf::from(dir),
        };
        let config = if let Some(path) = matches.value_of_os("config") {
            SearchConfig::from_path(path)?
        } else if matches.is_present("legacy") {
            SearchConfig::legacy()
        } else {
            SearchConfig::default()
        };
        let kind = match matches.value_of_lossy("kind") {
            None => Kind::Title,
            Some(kind) => kind.parse()?,
        };
        let limit = match matches.value_of_lossy("limit") {
            None => 0,
            Some(limit) => limit.parse()?,
        };
        Ok(Args {
            compare: lossy("compare"),
            config,
            data_dir,
            debug: matches.is_present("debug"),
            episodes: lossy("episodes"),
            kind,
            label: lossy("label"),
            limit,
            query: lossy("query"),
            second: lossy("second"),
            soundex: matches.is_present("soundex"),
            third: lossy("third"),
        })
    }

    fn search(&self, query: &str) -> anyhow::Result<()> {
        log::debug!("searching {} key file for '{}'", self.kind, query);
        let searcher = Searcher::new(self.config.clone());
        let keys = open_key_file(self.data_dir.join(self.kind.key_file()))?;
        let results = match self.kind {
            Kind::Title => {
                let query = title_variations(&self.config.articles, query);
                searcher.search_title(keys, &self.variants(query), self.limit)?
            }
            Kind::Name => searcher.search_name(
                keys,
                &self.variants(name_variations(query)),
                NameKind::Person,
                self.limit,
            )?,
            Kind::Character => searcher.search_name(
                keys,
                &self.variants(character_variations(query)),
                NameKind::Character,
                self.limit,
            )?,
            Kind::Company => searcher.search_company_name(
                keys,
                query.as_bytes(),
                self.limit,
            )?,
        };
        write_tsv(io::stdout(), &results)
    }

    /// Override derived query variants with the ones given explicitly.
    fn variants(&self, mut query: Query) -> Query {
        if let Some(ref second) = self.second {
            query = query.second(second.as_str());
        }
        if let Some(ref third) = self.third {
            query = query.third(third.as_str());
        }
        query
    }

    fn print_episodes(&self, id: &str) -> anyhow::Result<()> {
        let index = OffsetIndex::open(self.data_dir.join(TITLES_INDEX))?;
        let keys = open_key_file(self.data_dir.join(TITLES_KEY))?;
        let episodes = episodes_of(parse_id(id)?, &index, keys)?;
        if episodes.is_empty() {
            log::info!("no episodes found for series {}", id);
        }
        write_episodes(io::stdout(), &episodes)
    }

    fn print_label(&self, id: &str) -> anyhow::Result<()> {
        let index = OffsetIndex::open(self.data_dir.join(TITLES_INDEX))?;
        let keys = open_key_file(self.data_dir.join(TITLES_KEY))?;
        match label_of(parse_id(id)?, &index, keys)? {
            None => anyhow::bail!("no title with identifier {}", id),
            Some(label) => println!("{}", label),
        }
        Ok(())
    }
}

/// The kind of key file to search.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Kind {
    Title,
    Name,
    Character,
    Company,
}

impl Kind {
    fn possible_names() -> &'static [&'static str] {
        &["title", "name", "character", "company"]
    }

    fn as_str(&self) -> &'static str {
        match *self {
            Kind::Title => "title",
            Kind::Name => "name",
            Kind::Character => "character",
            Kind::Company => "company",
        }
    }

    fn key_file(&self) -> &'static str {
        match *self {
            Kind::Title => TITLES_KEY,
            Kind::Name => NAMES_KEY,
            Kind::Character => CHARACTERS_KEY,
            Kind::Company => COMPANIES_KEY,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Kind> {
        match s {
            "title" => Ok(Kind::Title),
            "name" => Ok(Kind::Name),
            "character" => Ok(Kind::Character),
            "company" => Ok(Kind::Company),
            unk => anyhow::bail!("unrecognized search kind '{}'", unk),
        }
    }
}

fn app() -> clap::App<'static, 'static> {
    use clap::{App, AppSettings, Arg};

    lazy_static! {
        // clap wants all of its strings tied to a particular lifetime, so
        // the default data directory, which is computed at runtime, is given
        // a static lifetime here.
        static ref DATA_DIR: PathBuf = env::temp_dir().join("imdb-lookup");
    }

    App::new("imdb-lookup")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .max_term_width(100)
        .setting(AppSettings::UnifiedHelpMessage)
        .arg(Arg::with_name("query")
             .required_unless_one(&["episodes", "label"])
             .help("The title, name, character or company to search for."))
        .arg(Arg::with_name("compare")
             .long("compare")
             .takes_value(true)
             .help("Print the similarity of the query with the string given \
                    instead of searching."))
        .arg(Arg::with_name("config")
             .long("config")
             .takes_value(true)
             .conflicts_with("legacy")
             .help("A JSON file of search settings. Settings that are \
                    absent keep their default value."))
        .arg(Arg::with_name("data-dir")
             .long("data-dir")
             .env("IMDB_LOOKUP_DATA_DIR")
             .takes_value(true)
             .default_value_os(DATA_DIR.as_os_str())
             .help("The location of the IMDb key files."))
        .arg(Arg::with_name("debug")
             .long("debug")
             .help("Show debug messages. Use this when filing bugs."))
        .arg(Arg::with_name("episodes")
             .long("episodes")
             .takes_value(true)
             .conflicts_with("label")
             .help("List the episodes of the TV series with the given \
                    identifier."))
        .arg(Arg::with_name("kind")
             .long("kind")
             .short("k")
             .default_value("title")
             .possible_values(Kind::possible_names())
             .help("The kind of key file to search."))
        .arg(Arg::with_name("label")
             .long("label")
             .takes_value(true)
             .help("Print the label of the title with the given \
                    identifier."))
        .arg(Arg::with_name("legacy")
             .long("legacy")
             .help("Use the settings of the legacy key file format."))
        .arg(Arg::with_name("limit")
             .long("limit")
             .short("n")
             .default_value("20")
             .help("The maximum number of results to show. \
                    Use 0 to show every result."))
        .arg(Arg::with_name("second")
             .long("second")
             .takes_value(true)
             .help("Use the given secondary query variant instead of \
                    deriving one from the query."))
        .arg(Arg::with_name("soundex")
             .long("soundex")
             .help("Print the soundex code of the query instead of \
                    searching."))
        .arg(Arg::with_name("third")
             .long("third")
             .takes_value(true)
             .help("Use the given tertiary query variant instead of \
                    deriving one from the query. A tertiary variant ending \
                    with '}' searches episodes only."))
}

/// Return true if and only if an I/O broken pipe error exists in the causal
/// chain of the given error.
fn is_pipe_error(err: &anyhow::Error) -> bool {
    for cause in err.chain() {
        if let Some(ioerr) = cause.downcast_ref::<io::Error>() {
            if ioerr.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
    }
    false
}
