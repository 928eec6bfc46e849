//! Change report parser.
//!
//! The comparison step ends with a block of count lines:
//!
//! ```text
//!   120145 equal
//!       12 added
//!        3 removed
//!        4 updated
//!        1 moved
//!        0 copied
//!        0 restored
//! ```
//!
//! A line matches when it is optional leading spaces, an integer, one space
//! and the keyword. The first match per keyword wins. All five keywords are
//! required; anything missing fails the whole parse.

use std::sync::OnceLock;

use regex::Regex;

use raidkeeper_core::ChangeSummary;

use crate::error::ParseError;

const FIELDS: [&str; 5] = ["added", "removed", "updated", "moved", "copied"];

fn count_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^ *([0-9]+) (added|removed|updated|moved|copied)\b")
            .expect("count line pattern is valid")
    })
}

/// Extract a [`ChangeSummary`] from the full comparison output.
pub fn parse_change_summary(output: &str) -> Result<ChangeSummary, ParseError> {
    let mut found: [Option<u64>; 5] = [None; 5];

    for caps in count_line().captures_iter(output) {
        let keyword = &caps[2];
        let Some(idx) = FIELDS.iter().position(|f| *f == keyword) else {
            continue;
        };
        if found[idx].is_some() {
            continue;
        }
        let value = caps[1].parse::<u64>().map_err(|_| ParseError::InvalidCount {
            field: FIELDS[idx],
            value: caps[1].to_string(),
        })?;
        found[idx] = Some(value);
    }

    let missing: Vec<&'static str> = FIELDS
        .iter()
        .zip(found.iter())
        .filter(|(_, v)| v.is_none())
        .map(|(f, _)| *f)
        .collect();
    if !missing.is_empty() {
        return Err(ParseError::MissingField { fields: missing });
    }

    let [added, removed, updated, moved, copied] = found.map(|v| v.unwrap_or_default());
    Ok(ChangeSummary {
        added,
        removed,
        updated,
        moved,
        copied,
    })
}
