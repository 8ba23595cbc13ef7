//! Name every country that speaks the announced language, one language at a time.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use serde_json::json;

use super::{Action, Feedback, ModeContext, ModeController, Prompt, RunResult};
use crate::catalog::{Catalog, Lookup};
use crate::error::GameError;
use crate::session::{GameSession, RegionTracker};

#[derive(Default)]
pub struct LanguageGroups {
    /// (language, speaking countries) in play order.
    groups: Vec<(String, Vec<String>)>,
    index: usize,
    found_here: HashSet<String>,
    /// Language/country pairs named so far.
    pairs_found: u32,
    total: u32,
}

impl LanguageGroups {
    fn current(&self) -> Option<&(String, Vec<String>)> {
        self.groups.get(self.index)
    }

    fn remaining_here(&self) -> Vec<String> {
        self.current()
            .map(|(_, ids)| ids.iter().filter(|id| !self.found_here.contains(*id)).cloned().collect())
            .unwrap_or_default()
    }

    fn next_language(&mut self, cx: &mut ModeContext<'_>) {
        self.index += 1;
        self.found_here.clear();
        if self.index >= self.groups.len() {
            cx.session.finish();
        }
    }
}

impl ModeController for LanguageGroups {
    fn start(&mut self, cx: &mut ModeContext<'_>) -> Result<(), GameError> {
        if !cx.map.is_ready() {
            return Err(GameError::MapUnavailable("world map is not loaded".into()));
        }
        let mut groups: Vec<(String, Vec<String>)> = cx
            .catalog
            .languages()
            .iter()
            .map(|(lang, ids)| (lang.clone(), ids.iter().filter(|id| cx.map.has_shape(id)).cloned().collect()))
            .filter(|(_, ids): &(String, Vec<String>)| !ids.is_empty())
            .collect();
        if groups.is_empty() {
            return Err(GameError::EmptyCatalog("languages"));
        }
        groups.shuffle(cx.rng);
        self.groups = groups;
        self.total = self.groups.iter().map(|(_, ids)| ids.len() as u32).sum();
        let everyone: HashSet<&String> = self.groups.iter().flat_map(|(_, ids)| ids).collect();
        cx.session.regions = RegionTracker::for_pool(cx.catalog, cx.map.kind, everyone);
        Ok(())
    }

    fn handle(&mut self, cx: &mut ModeContext<'_>, action: Action) -> Feedback {
        if cx.session.game_over {
            return Feedback::Ignored;
        }
        let Some((language, ids)) = self.current().cloned() else {
            return Feedback::Ignored;
        };
        match action {
            Action::Guess { text } if text.trim().is_empty() => Feedback::Ignored,
            Action::Guess { text } => {
                let Some(id) = cx.catalog.resolve(Lookup::CountryNames, &text).map(str::to_string) else {
                    return Feedback::NotFound;
                };
                if self.found_here.contains(&id) {
                    return Feedback::Duplicate { name: cx.name_of(&id) };
                }
                if !ids.contains(&id) {
                    cx.session.incorrect += 1;
                    return Feedback::Wrong { name: cx.name_of(&id), errors_left: None };
                }
                self.found_here.insert(id.clone());
                self.pairs_found += 1;
                cx.session.correct += 1;
                let region_completed = cx.credit(&id);
                if self.found_here.len() >= ids.len() {
                    tracing::debug!(target: "game", %language, "Language complete");
                    self.next_language(cx);
                }
                Feedback::Correct { name: cx.name_of(&id), id, region_completed }
            }
            Action::Skip => {
                for id in self.remaining_here() {
                    cx.show(&id);
                }
                cx.session.skipped += 1;
                self.next_language(cx);
                Feedback::Skipped { answer: language }
            }
            Action::GiveUp => {
                let mut pool = self.remaining_here();
                for (_, later) in self.groups.iter().skip(self.index + 1) {
                    pool.extend(later.iter().cloned());
                }
                let mut seen = HashSet::new();
                pool.retain(|id| seen.insert(id.clone()));
                cx.give_up(pool)
            }
            _ => Feedback::Ignored,
        }
    }

    fn prompt(&self, _catalog: &Catalog, session: &GameSession) -> Prompt {
        match self.current() {
            Some((language, ids)) if !session.game_over => Prompt::Language {
                language: language.clone(),
                index: self.index + 1,
                count: self.groups.len(),
                remaining: ids.len() - self.found_here.len(),
                found: self.pairs_found as usize,
                total: self.total as usize,
            },
            _ => Prompt::Finished,
        }
    }

    fn result(&self, session: &GameSession) -> RunResult {
        RunResult {
            score: self.pairs_found,
            total: self.total,
            extra: Some(json!({ "languages_skipped": session.skipped })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::Rig;
    use super::*;
    use crate::domain::ModeId;

    fn current_language(ctl: &dyn ModeController, rig: &Rig) -> (String, usize) {
        match ctl.prompt(&rig.catalog, &rig.session) {
            Prompt::Language { language, remaining, .. } => (language, remaining),
            other => panic!("unexpected prompt {other:?}"),
        }
    }

    #[test]
    fn completing_a_language_moves_to_the_next() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldLanguages, None);
        let (lang, remaining) = current_language(ctl.as_ref(), &rig);
        let speakers = rig.catalog.languages()[&lang].clone();
        assert_eq!(remaining, speakers.len());
        for id in &speakers {
            let name = rig.catalog.country(id).unwrap().name.clone();
            assert!(matches!(rig.act(&mut ctl, Action::Guess { text: name }), Feedback::Correct { .. }));
        }
        if !rig.session.game_over {
            assert_ne!(current_language(ctl.as_ref(), &rig).0, lang);
        }
    }

    #[test]
    fn wrong_speaker_and_repeat_are_rejected() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldLanguages, None);
        let (lang, _) = current_language(ctl.as_ref(), &rig);
        let speakers = rig.catalog.languages()[&lang].clone();
        let outsider = rig.catalog.countries().find(|c| !speakers.contains(&c.id)).unwrap().name.clone();
        assert!(matches!(rig.act(&mut ctl, Action::Guess { text: outsider }), Feedback::Wrong { .. }));
        if speakers.len() > 1 {
            let name = rig.catalog.country(&speakers[0]).unwrap().name.clone();
            rig.act(&mut ctl, Action::Guess { text: name.clone() });
            assert!(matches!(rig.act(&mut ctl, Action::Guess { text: name }), Feedback::Duplicate { .. }));
        }
    }

    #[test]
    fn skip_reveals_without_credit() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldLanguages, None);
        let (lang, _) = current_language(ctl.as_ref(), &rig);
        assert_eq!(rig.act(&mut ctl, Action::Skip), Feedback::Skipped { answer: lang.clone() });
        for id in &rig.catalog.languages()[&lang] {
            assert!(rig.map.is_revealed(id));
        }
        assert_eq!(ctl.result(&rig.session).score, 0);
        assert_eq!(rig.session.skipped, 1);
    }

    #[test]
    fn skipping_everything_ends_the_run() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldLanguages, None);
        let groups = rig.catalog.languages().len();
        for _ in 0..groups {
            rig.act(&mut ctl, Action::Skip);
        }
        assert!(rig.session.game_over);
        assert_eq!(ctl.prompt(&rig.catalog, &rig.session), Prompt::Finished);
        let r = ctl.result(&rig.session);
        assert_eq!(r.score, 0);
        assert!(r.total as usize >= rig.catalog.country_count());
    }
}
