//! Picks the English meaning shown to players.

use std::ops::ControlFlow;

use crate::entry::{DictionaryEntry, Sense};
use crate::filter::SemanticFilter;

pub const MAX_GLOSSES: usize = 3;
pub const GLOSS_SEPARATOR: &str = " / ";

/// POS carried across senses. JMdict omits `<pos>` on a sense whose POS
/// equals the previous one.
#[derive(Debug, Clone, Copy)]
enum PosState<'a> {
    Unknown,
    Known(&'a [String]),
}

impl<'a> PosState<'a> {
    fn advance(self, sense: &'a Sense) -> Self {
        if sense.pos.is_empty() {
            self
        } else {
            PosState::Known(&sense.pos)
        }
    }
}

fn english_glosses(sense: &Sense) -> Vec<&str> {
    let mut unique: Vec<&str> = Vec::new();
    for gloss in sense.glosses.iter().filter(|g| g.is_english()) {
        let text = gloss.text.trim();
        if !text.is_empty() && !unique.contains(&text) {
            unique.push(text);
        }
    }
    unique
}

fn sense_meaning(pos: &[String], sense: &Sense, filter: &SemanticFilter) -> Option<String> {
    if !filter.is_admissible_pos(pos) || !filter.is_admissible_misc(&sense.misc, &sense.field) {
        return None;
    }
    let glosses = english_glosses(sense);
    if glosses.is_empty() {
        return None;
    }
    Some(
        glosses
            .into_iter()
            .take(MAX_GLOSSES)
            .collect::<Vec<_>>()
            .join(GLOSS_SEPARATOR),
    )
}

/// Up to three distinct English glosses of the first admissible sense,
/// joined by `" / "`. Empty when no sense qualifies.
pub fn select_meaning(entry: &DictionaryEntry, filter: &SemanticFilter) -> String {
    let scan = entry
        .senses
        .iter()
        .try_fold(PosState::Unknown, |state, sense| {
            let state = state.advance(sense);
            let meaning = match state {
                PosState::Unknown => None,
                PosState::Known(pos) => sense_meaning(pos, sense, filter),
            };
            match meaning {
                Some(meaning) => ControlFlow::Break(meaning),
                None => ControlFlow::Continue(state),
            }
        });

    match scan {
        ControlFlow::Break(meaning) => meaning,
        ControlFlow::Continue(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::entry::Gloss;

    fn filter() -> SemanticFilter {
        Config::builtin().unwrap().compile().unwrap().filter
    }

    fn sense(pos: &[&str], glosses: &[&str]) -> Sense {
        Sense {
            pos: pos.iter().map(|p| p.to_string()).collect(),
            glosses: glosses.iter().map(|g| Gloss::new(*g)).collect(),
            ..Default::default()
        }
    }

    fn entry(senses: Vec<Sense>) -> DictionaryEntry {
        DictionaryEntry {
            senses,
            ..Default::default()
        }
    }

    #[test]
    fn joins_three_distinct_glosses() {
        let e = entry(vec![sense(
            &["noun"],
            &["to eat", "to eat", "to consume", "to devour"],
        )]);
        assert_eq!(select_meaning(&e, &filter()), "to eat / to consume / to devour");
    }

    #[test]
    fn fewer_glosses_are_joined_as_is() {
        let e = entry(vec![sense(&["noun"], &["cat"])]);
        assert_eq!(select_meaning(&e, &filter()), "cat");
    }

    #[test]
    fn non_english_glosses_are_ignored() {
        let mut s = sense(&["noun"], &[]);
        s.glosses = vec![
            Gloss::with_lang("ger", "Katze"),
            Gloss::with_lang("eng", "cat"),
            Gloss::new("puss"),
        ];
        assert_eq!(select_meaning(&entry(vec![s]), &filter()), "cat / puss");
    }

    #[test]
    fn pos_carries_forward_to_later_senses() {
        let mut first = sense(&["noun"], &["pet"]);
        first.misc = vec!["archaic".to_string()];
        let second = sense(&[], &["cat"]);
        assert_eq!(select_meaning(&entry(vec![first, second]), &filter()), "cat");
    }

    #[test]
    fn later_pos_replaces_carried_pos() {
        let first = sense(&["noun"], &[]);
        let second = sense(&["Godan verb"], &["to run"]);
        let third = sense(&[], &["to flow"]);
        assert_eq!(select_meaning(&entry(vec![first, second, third]), &filter()), "");
    }

    #[test]
    fn senses_before_any_pos_are_skipped() {
        let first = sense(&[], &["orphan"]);
        let second = sense(&["noun"], &["dog"]);
        assert_eq!(select_meaning(&entry(vec![first, second]), &filter()), "dog");
    }

    #[test]
    fn field_tagged_sense_is_skipped() {
        let mut first = sense(&["noun"], &["lesion"]);
        first.field = vec!["medicine".to_string()];
        let second = sense(&[], &["wound"]);
        assert_eq!(select_meaning(&entry(vec![first, second]), &filter()), "wound");
    }

    #[test]
    fn surname_only_entry_has_no_meaning() {
        let mut only = sense(&["noun"], &["Yamada"]);
        only.misc = vec!["family or surname".to_string()];
        assert_eq!(select_meaning(&entry(vec![only]), &filter()), "");
    }

    #[test]
    fn empty_entry_has_no_meaning() {
        assert_eq!(select_meaning(&entry(vec![]), &filter()), "");
    }
}
