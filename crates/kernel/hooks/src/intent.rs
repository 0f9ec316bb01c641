/// Keyword table, checked in order. First category with a hit wins, so
/// security outranks the broader buckets.
const INTENT_KEYWORDS: [(&str, &[&str]); 7] = [
    (
        "security",
        &["security", "vulnerab", "exploit", "cve", "auth", "credential", "sanitize"],
    ),
    (
        "bug-fix",
        &["fix", "bug", "crash", "regression", "broken", "error", "defect"],
    ),
    (
        "test",
        &["test", "coverage", "assert", "flaky"],
    ),
    (
        "performance",
        &["performance", "optimiz", "slow", "latency", "speed up", "profil"],
    ),
    (
        "refactor",
        &["refactor", "cleanup", "clean up", "restructure", "rename", "simplify"],
    ),
    (
        "docs",
        &["document", "docs", "readme", "changelog", "comment"],
    ),
    (
        "feature",
        &["feature", "implement", "add ", "support for", "introduce"],
    ),
];

/// Classify a free-text task description into a coarse intent label.
/// Unrecognized text maps to "general".
pub fn classify_intent(description: &str) -> &'static str {
    let text = description.to_lowercase();
    for (intent, keywords) in INTENT_KEYWORDS {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return intent;
        }
    }
    "general"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_descriptions() {
        assert_eq!(classify_intent("Fix the login crash"), "bug-fix");
        assert_eq!(classify_intent("Patch the XSS vulnerability"), "security");
        assert_eq!(classify_intent("Add support for dark mode"), "feature");
        assert_eq!(classify_intent("Refactor the parser module"), "refactor");
        assert_eq!(classify_intent("Update the README"), "docs");
        assert_eq!(classify_intent("Improve test coverage"), "test");
        assert_eq!(classify_intent("Optimize the hot loop"), "performance");
    }

    #[test]
    fn security_outranks_bug_fix() {
        assert_eq!(classify_intent("fix the auth bypass bug"), "security");
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify_intent("FIX THE BUILD"), "bug-fix");
    }

    #[test]
    fn unknown_text_is_general() {
        assert_eq!(classify_intent("ponder the roadmap"), "general");
        assert_eq!(classify_intent(""), "general");
    }
}
