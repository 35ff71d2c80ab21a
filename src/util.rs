use std::io::{self, Write};

use bstr::ByteSlice;
use imdb_keyscan::{Record, SearchResults};
use tabwriter::TabWriter;

/// Write the given result set to the given writer as a table.
///
/// Labels that are not valid UTF-8 (like the Greek articles of some titles)
/// are written lossily.
pub fn write_tsv<W: io::Write>(
    wtr: W,
    results: &SearchResults<Record>,
) -> anyhow::Result<()> {
    let mut wtr = TabWriter::new(wtr).minwidth(4);
    writeln!(wtr, "#\tscore\tkey\tlabel")?;
    for (i, sr) in results.iter().enumerate() {
        let (score, rec) = (sr.score(), sr.value());
        writeln!(
            wtr,
            "{}\t{:0.3}\t{}\t{}",
            i + 1,
            score,
            rec.key,
            rec.label.to_str_lossy(),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the given episodes, in the order given, to the given writer as a
/// table.
pub fn write_episodes<W: io::Write>(
    wtr: W,
    episodes: &[Record],
) -> anyhow::Result<()> {
    let mut wtr = TabWriter::new(wtr).minwidth(4);
    writeln!(wtr, "#\tkey\tlabel")?;
    for (i, ep) in episodes.iter().enumerate() {
        writeln!(wtr, "{}\t{}\t{}", i + 1, ep.key, ep.label.to_str_lossy())?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use imdb_keyscan::Scored;

    use super::*;

    fn record(key: u64, label: &str) -> Record {
        Record { key, label: label.into() }
    }

    #[test]
    fn results_table() {
        let results = SearchResults::from_unsorted(vec![
            Scored::new(record(1, "Smith, John (I)")).with_score(1.05),
            Scored::new(record(42, "Smyth, Jon")).with_score(0.8),
        ]);
        let mut out = vec![];
        write_tsv(&mut out, &results).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("#"));
        assert!(lines[1].contains("1.050"));
        assert!(lines[1].ends_with("Smith, John (I)"));
        assert!(lines[2].contains("42"));
    }

    #[test]
    fn episodes_table() {
        let episodes = vec![
            record(2, "\"Foo\" (1990) {Ep1}"),
            record(3, "\"Foo\" (1990) {Ep2}"),
        ];
        let mut out = vec![];
        write_episodes(&mut out, &episodes).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with("\"Foo\" (1990) {Ep2}"));
    }
}
