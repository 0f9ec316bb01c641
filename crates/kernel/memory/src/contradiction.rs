use serde::{Deserialize, Serialize};

use crate::entry::MemoryEntry;

/// Lexical polarity pairs checked bidirectionally by substring
/// containment. Best-effort heuristic, not a semantic parser.
pub const POLARITY_PAIRS: [(&str, &str); 4] = [
    ("must", "never"),
    ("always", "never"),
    ("require", "forbid"),
    ("enable", "disable"),
];

/// One advisory conflict between a new value and an existing entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    /// Key of the existing entry that conflicts.
    pub existing_key: String,
    pub term: String,
    pub opposite: String,
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

/// Scan existing entries for polarity conflicts with `value`. Each match
/// yields one record naming the conflicting key; a pair matches when one
/// side appears in the new value and the other in the stored one, in
/// either direction.
pub fn detect_contradictions(
    value: &serde_json::Value,
    existing: &[MemoryEntry],
) -> Vec<Contradiction> {
    let new_text = value_text(value);
    let mut found = Vec::new();
    for entry in existing {
        let old_text = value_text(&entry.value);
        for (a, b) in POLARITY_PAIRS {
            let forward = new_text.contains(a) && old_text.contains(b);
            let reverse = new_text.contains(b) && old_text.contains(a);
            if forward || reverse {
                found.push(Contradiction {
                    existing_key: entry.key.clone(),
                    term: a.to_string(),
                    opposite: b.to_string(),
                });
            }
        }
    }
    found
}
