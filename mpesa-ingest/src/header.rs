//! Header cleanup for extracted tables.
//!
//! The extraction engine splits long headers across lines ("Completion\rTime")
//! and leaves the index column unnamed. Blank headers become
//! `Unnamed: <position>` so the index column can be recognized.

/// Normalize one header cell at `position`.
pub fn normalize_header(raw: &str, position: usize) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        format!("Unnamed: {position}")
    } else {
        collapsed
    }
}

pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    raw.iter()
        .enumerate()
        .map(|(i, h)| normalize_header(h, i))
        .collect()
}
