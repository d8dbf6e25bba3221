//! Semantic admissibility and commonality predicates.
//!
//! All matching is on lower-cased tag text. The keyword tables come from the
//! schema (see [`crate::config`]).

#[derive(Debug, Clone)]
pub struct SemanticFilter {
    required_pos: String,
    disallowed_pos: Vec<String>,
    disallowed_misc: Vec<String>,
    common_prefixes: Vec<String>,
}

fn lowered(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn any_contains(tags: &[String], keywords: &[String]) -> bool {
    tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        keywords.iter().any(|keyword| tag.contains(keyword.as_str()))
    })
}

impl SemanticFilter {
    pub fn new(
        required_pos: &str,
        disallowed_pos: &[String],
        disallowed_misc: &[String],
        common_prefixes: &[String],
    ) -> Self {
        SemanticFilter {
            required_pos: required_pos.trim().to_lowercase(),
            disallowed_pos: lowered(disallowed_pos),
            disallowed_misc: lowered(disallowed_misc),
            common_prefixes: lowered(common_prefixes),
        }
    }

    /// At least one tag names a noun and none names a numeric, counter,
    /// pronoun or affix usage.
    pub fn is_admissible_pos(&self, pos: &[String]) -> bool {
        let has_noun = pos
            .iter()
            .any(|tag| tag.to_lowercase().contains(self.required_pos.as_str()));
        has_noun && !any_contains(pos, &self.disallowed_pos)
    }

    /// No proper-noun/archaism/rarity marker, and no domain field at all.
    pub fn is_admissible_misc(&self, misc: &[String], field: &[String]) -> bool {
        field.is_empty() && !any_contains(misc, &self.disallowed_misc)
    }

    /// Commonality is opt-in: an entry without priority tags is not common.
    pub fn is_common(&self, priorities: &[String]) -> bool {
        priorities.iter().any(|tag| {
            let tag = tag.to_lowercase();
            self.common_prefixes
                .iter()
                .any(|prefix| tag.starts_with(prefix.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn filter() -> SemanticFilter {
        Config::builtin().unwrap().compile().unwrap().filter
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    // ─────────────────────────────────────────────────────────────
    // Part of speech
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn common_noun_is_admissible() {
        assert!(filter().is_admissible_pos(&tags(&["noun (common) (futsuumeishi)"])));
        assert!(filter().is_admissible_pos(&tags(&["Godan verb", "Noun"])));
    }

    #[test]
    fn non_noun_is_rejected() {
        assert!(!filter().is_admissible_pos(&tags(&["Ichidan verb"])));
        assert!(!filter().is_admissible_pos(&[]));
    }

    #[test]
    fn noun_with_disallowed_usage_is_rejected() {
        assert!(!filter().is_admissible_pos(&tags(&["noun (common) (futsuumeishi)", "suffix"])));
        assert!(!filter().is_admissible_pos(&tags(&["noun, used as a prefix"])));
        assert!(!filter().is_admissible_pos(&tags(&["pronoun"])));
        assert!(!filter().is_admissible_pos(&tags(&["numeric", "noun"])));
        assert!(!filter().is_admissible_pos(&tags(&["noun", "Counter"])));
    }

    // ─────────────────────────────────────────────────────────────
    // Misc and field
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn plain_sense_is_admissible() {
        assert!(filter().is_admissible_misc(&[], &[]));
        assert!(filter().is_admissible_misc(&tags(&["usually written using kana alone"]), &[]));
    }

    #[test]
    fn proper_noun_and_archaic_markers_are_rejected() {
        assert!(!filter().is_admissible_misc(&tags(&["family or surname"]), &[]));
        assert!(!filter().is_admissible_misc(&tags(&["Place Name"]), &[]));
        assert!(!filter().is_admissible_misc(&tags(&["archaic"]), &[]));
        assert!(!filter().is_admissible_misc(&tags(&["rare term"]), &[]));
    }

    #[test]
    fn any_field_tag_is_rejected() {
        assert!(!filter().is_admissible_misc(&[], &tags(&["medicine"])));
    }

    // ─────────────────────────────────────────────────────────────
    // Commonality
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn empty_priorities_are_not_common() {
        assert!(!filter().is_common(&[]));
    }

    #[test]
    fn known_priority_sources_are_common() {
        assert!(filter().is_common(&tags(&["ichi1"])));
        assert!(filter().is_common(&tags(&["nf24"])));
        assert!(filter().is_common(&tags(&["SPEC2"])));
        assert!(filter().is_common(&tags(&["unknown", "gai1"])));
    }

    #[test]
    fn other_priority_tags_are_not_common() {
        assert!(!filter().is_common(&tags(&["xnews1"])));
    }

    #[test]
    fn keywords_are_lowercased_on_construction() {
        let filter = SemanticFilter::new("NOUN", &tags(&["Suffix"]), &tags(&["Deity"]), &tags(&["ICHI"]));
        assert!(filter.is_admissible_pos(&tags(&["noun"])));
        assert!(!filter.is_admissible_pos(&tags(&["noun", "suffix"])));
        assert!(!filter.is_admissible_misc(&tags(&["deity"]), &[]));
        assert!(filter.is_common(&tags(&["ichi2"])));
    }
}
