use csv::ReaderBuilder;
use tracing::debug;

use crate::error::LoadError;

/// Pick the field delimiter by parsing the first `sniff_lines` non-blank
/// records with each candidate.
///
/// A candidate qualifies when the header splits into more than one field and
/// a strict majority of the sampled records share the header's field count
/// (a short file may already show its footer inside the sample). Among
/// qualifying candidates the one matching the most records wins, then the one
/// with the most fields, then the earlier candidate.
pub fn detect(text: &str, candidates: &[u8], sniff_lines: usize) -> Result<u8, LoadError> {
    let mut best: Option<(u8, usize, usize)> = None;

    for &delim in candidates {
        let Some(counts) = sample_field_counts(text, delim, sniff_lines) else {
            continue;
        };
        let Some(&header_len) = counts.first() else {
            continue;
        };
        if header_len < 2 {
            continue;
        }
        let matching = counts.iter().filter(|&&n| n == header_len).count();
        debug!(
            delimiter = %(delim as char).escape_default(),
            header_len,
            matching,
            sampled = counts.len(),
            "delimiter candidate"
        );
        if matching * 2 <= counts.len() {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, m, n)) => matching > m || (matching == m && header_len > n),
        };
        if better {
            best = Some((delim, matching, header_len));
        }
    }

    best.map(|(d, _, _)| d).ok_or_else(|| {
        LoadError::Format(format!(
            "no consistent field count for any delimiter among {:?}",
            candidates
                .iter()
                .map(|&d| (d as char).escape_default().to_string())
                .collect::<Vec<_>>()
        ))
    })
}

/// Field counts of the first `limit` non-blank records, or `None` if the
/// sample does not even parse with `delim`.
fn sample_field_counts(text: &str, delim: u8, limit: usize) -> Option<Vec<usize>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delim)
        .from_reader(text.as_bytes());

    let mut counts = Vec::with_capacity(limit);
    for result in rdr.records() {
        let record = result.ok()?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        counts.push(record.len());
        if counts.len() >= limit {
            break;
        }
    }
    Some(counts)
}
