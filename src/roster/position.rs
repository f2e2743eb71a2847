//! Position matching for roster filters.
//!
//! Registration data entry is inconsistent ("OH", "Outside", "Outside Hitter
//! (OH)" all occur), so matching is deliberately fuzzy: bidirectional
//! case-insensitive substring plus a fixed abbreviation table. Kept behind a
//! single pure function so a stricter matcher can replace it without touching
//! the workflow.

/// Canonical volleyball positions and the spellings that map to them.
const ABBREVIATIONS: &[(&str, &[&str])] = &[
    ("outside hitter", &["oh", "outside"]),
    ("middle blocker", &["mb", "middle"]),
    ("right side", &["rs", "right", "right side hitter"]),
    ("opposite", &["opp", "opposite hitter"]),
    ("setter", &["s", "set"]),
    ("libero", &["lib", "l"]),
    ("defensive specialist", &["ds", "defensive"]),
];

/// Whether a candidate's free-text position satisfies the requested one.
/// An empty candidate position never matches anything.
pub fn position_matches(requested: &str, candidate: &str) -> bool {
    let requested = requested.trim().to_lowercase();
    let candidate = candidate.trim().to_lowercase();
    if requested.is_empty() || candidate.is_empty() {
        return false;
    }
    if candidate == requested || candidate.contains(&requested) || requested.contains(&candidate) {
        return true;
    }
    abbreviation_match(&requested, &candidate)
}

fn abbreviation_match(requested: &str, candidate: &str) -> bool {
    for (full, spellings) in ABBREVIATIONS {
        let requested_in_category = requested == *full || spellings.contains(&requested);
        if !requested_in_category {
            continue;
        }
        if candidate == *full
            || spellings.contains(&candidate)
            || full.contains(candidate)
            || candidate.contains(full)
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviation_table_bridges_spellings() {
        assert!(position_matches("OH", "Outside Hitter (OH)"));
        assert!(position_matches("Outside Hitter", "OH"));
        assert!(position_matches("MB", "middle"));
        assert!(position_matches("Libero", "L"));
        assert!(position_matches("DS", "Defensive Specialist"));
    }

    #[test]
    fn substring_match_is_bidirectional_and_case_insensitive() {
        assert!(position_matches("setter", "Setter/RS"));
        assert!(position_matches("Setter/RS", "setter"));
    }

    #[test]
    fn empty_candidate_never_matches() {
        assert!(!position_matches("OH", ""));
        assert!(!position_matches("OH", "   "));
        assert!(!position_matches("", "Setter"));
    }

    #[test]
    fn unrelated_positions_do_not_match() {
        assert!(!position_matches("Setter", "Middle Blocker"));
        assert!(!position_matches("OH", "MB"));
    }
}
