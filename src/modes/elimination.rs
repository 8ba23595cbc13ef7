//! Multiple-choice streak modes: flags, capitals, languages, silhouettes and landmarks.
//!
//! Every question offers one right option among `Tunables::distractors` wrong ones. How a
//! wrong pick is handled depends on difficulty, see [`miss_outcome`].

use serde_json::json;
use tracing::debug;

use super::{
    choice_set, miss_outcome, shuffled, Action, ChoiceOption, Feedback, MissOutcome, ModeContext, ModeController,
    Prompt, RunResult,
};
use crate::catalog::Catalog;
use crate::domain::ModeId;
use crate::error::GameError;
use crate::session::GameSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ask {
    /// Flag shown, pick the country.
    Flag,
    /// Country shown, pick its capital.
    Capital,
    /// Country shown, pick its main language.
    Language,
    /// Outline shown, pick the country.
    Silhouette,
    /// Landmark photo shown, pick the country.
    Landmark,
}

#[derive(Clone, Debug, Default)]
struct Question {
    /// Country or landmark id being asked about.
    subject: String,
    question: Option<String>,
    image: Option<String>,
    outline: Option<Vec<Vec<[f64; 2]>>>,
    labels: Vec<String>,
    disabled: Vec<bool>,
    correct: usize,
    forgiven: bool,
}

pub struct Elimination {
    ask: Ask,
    question: Option<Question>,
}

impl Elimination {
    pub fn new(mode: ModeId) -> Self {
        let ask = match mode {
            ModeId::WorldCapitalsGame => Ask::Capital,
            ModeId::WorldLanguagesGame => Ask::Language,
            ModeId::WorldSilhouettes => Ask::Silhouette,
            ModeId::LandmarksGame => Ask::Landmark,
            _ => Ask::Flag,
        };
        Self { ask, question: None }
    }

    fn pool(&self, cx: &ModeContext<'_>) -> Vec<String> {
        match self.ask {
            Ask::Landmark => cx.catalog.landmarks().iter().map(|l| l.id.clone()).collect(),
            Ask::Silhouette => cx.catalog.countries().map(|c| c.id.clone()).filter(|id| cx.map.has_shape(id)).collect(),
            Ask::Language => cx.catalog.countries().filter(|c| !c.languages.is_empty()).map(|c| c.id.clone()).collect(),
            Ask::Flag | Ask::Capital => cx.catalog.countries().map(|c| c.id.clone()).collect(),
        }
    }

    fn build(&self, cx: &mut ModeContext<'_>, subject: String) -> Option<Question> {
        let catalog = cx.catalog;
        let n = cx.tunables.distractors;
        let all_countries: Vec<String> = catalog.countries().map(|c| c.id.clone()).collect();
        let name = |id: &str| catalog.country(id).map(|c| c.name.clone()).unwrap_or_else(|| id.to_string());
        let mut q = Question { subject: subject.clone(), ..Question::default() };
        match self.ask {
            Ask::Flag | Ask::Silhouette => {
                let (ids, at) = choice_set(cx.rng, &subject, &all_countries, n);
                q.labels = ids.iter().map(|id| name(id)).collect();
                q.correct = at;
                if self.ask == Ask::Flag {
                    q.image = catalog.flag_url(&subject);
                } else {
                    let shape = cx.map.shape(&subject)?;
                    q.outline = Some(shape.feature.polygons.iter().flat_map(|p| p.rings.iter().cloned()).collect());
                }
            }
            Ask::Capital => {
                let (ids, at) = choice_set(cx.rng, &subject, &all_countries, n);
                q.labels = ids.iter().filter_map(|id| catalog.country(id)).map(|c| c.capital.clone()).collect();
                q.correct = at;
                q.question = Some(name(&subject));
                q.image = catalog.flag_url(&subject);
            }
            Ask::Language => {
                let country = catalog.country(&subject)?;
                let main = country.languages.first()?.clone();
                let others: Vec<String> =
                    catalog.languages().keys().filter(|l| !country.languages.contains(l)).cloned().collect();
                let (labels, at) = choice_set(cx.rng, &main, &others, n);
                q.labels = labels;
                q.correct = at;
                q.question = Some(country.name.clone());
                q.image = catalog.flag_url(&subject);
            }
            Ask::Landmark => {
                let landmark = catalog.landmarks().iter().find(|l| l.id == subject)?;
                let (ids, at) = choice_set(cx.rng, &landmark.country_id, &all_countries, n);
                q.labels = ids.iter().map(|id| name(id)).collect();
                q.correct = at;
                q.question = Some(landmark.name.clone());
                q.image = Some(landmark.image.clone());
            }
        }
        q.disabled = vec![false; q.labels.len()];
        Some(q)
    }

    /// Pop subjects until one yields a question; the run ends when the queue runs dry.
    fn advance(&mut self, cx: &mut ModeContext<'_>) {
        self.question = None;
        while let Some(subject) = cx.session.queue.pop_front() {
            if let Some(q) = self.build(cx, subject) {
                self.question = Some(q);
                return;
            }
        }
        cx.session.finish();
    }
}

impl ModeController for Elimination {
    fn start(&mut self, cx: &mut ModeContext<'_>) -> Result<(), GameError> {
        if self.ask == Ask::Silhouette && !cx.map.is_ready() {
            return Err(GameError::MapUnavailable("world map is not loaded".into()));
        }
        let pool = self.pool(cx);
        if pool.is_empty() {
            return Err(GameError::EmptyCatalog("choice pool"));
        }
        cx.session.queue = shuffled(cx.rng, pool).into();
        self.advance(cx);
        Ok(())
    }

    fn handle(&mut self, cx: &mut ModeContext<'_>, action: Action) -> Feedback {
        if cx.session.game_over {
            return Feedback::Ignored;
        }
        match action {
            Action::Pick { index } => {
                let Some(q) = self.question.as_mut() else {
                    return Feedback::Ignored;
                };
                if index >= q.labels.len() || q.disabled[index] {
                    return Feedback::Ignored;
                }
                let answer = q.labels[q.correct].clone();
                if index == q.correct {
                    let subject = q.subject.clone();
                    cx.session.hit_streak();
                    cx.session.found.insert(subject.clone());
                    self.advance(cx);
                    return Feedback::Correct { id: subject, name: answer, region_completed: None };
                }
                match miss_outcome(cx.session.difficulty, q.forgiven) {
                    MissOutcome::Forgiven => {
                        q.forgiven = true;
                        q.disabled[index] = true;
                        Feedback::Forgiven { disabled: index }
                    }
                    MissOutcome::Missed => {
                        cx.session.break_streak();
                        cx.session.shown.insert(q.subject.clone());
                        self.advance(cx);
                        Feedback::Missed { answer }
                    }
                    MissOutcome::RunOver => {
                        cx.session.break_streak();
                        cx.session.finish();
                        debug!(target: "game", best = cx.session.best_streak, "Streak run over");
                        Feedback::RunOver { answer }
                    }
                }
            }
            Action::GiveUp => {
                self.question = None;
                cx.session.finish();
                Feedback::GaveUp { revealed: Vec::new() }
            }
            _ => Feedback::Ignored,
        }
    }

    fn prompt(&self, _catalog: &Catalog, session: &GameSession) -> Prompt {
        match &self.question {
            Some(q) if !session.game_over => Prompt::Choice {
                question: q.question.clone(),
                image: q.image.clone(),
                outline: q.outline.clone(),
                options: q
                    .labels
                    .iter()
                    .zip(&q.disabled)
                    .map(|(label, disabled)| ChoiceOption { label: label.clone(), image: None, disabled: *disabled })
                    .collect(),
                streak: session.streak,
                best_streak: session.best_streak,
            },
            _ => Prompt::Finished,
        }
    }

    fn result(&self, session: &GameSession) -> RunResult {
        RunResult {
            score: session.best_streak,
            total: session.correct + session.incorrect,
            extra: Some(json!({ "correct": session.correct, "incorrect": session.incorrect })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::Rig;
    use super::*;
    use crate::domain::Difficulty;

    fn started(mode: ModeId, d: Difficulty) -> (Rig, Elimination) {
        let mut rig = Rig::new(mode, Some(d));
        let mut ctl = Elimination::new(mode);
        ctl.start(&mut rig.cx()).unwrap();
        (rig, ctl)
    }

    fn pick_right(rig: &mut Rig, ctl: &mut Elimination) -> Feedback {
        let at = ctl.question.as_ref().unwrap().correct;
        ctl.handle(&mut rig.cx(), Action::Pick { index: at })
    }

    fn pick_wrong(rig: &mut Rig, ctl: &mut Elimination) -> Feedback {
        let q = ctl.question.as_ref().unwrap();
        let at = (0..q.labels.len()).find(|i| *i != q.correct && !q.disabled[*i]).unwrap();
        ctl.handle(&mut rig.cx(), Action::Pick { index: at })
    }

    #[test]
    fn six_distinct_options_with_one_answer() {
        for mode in [ModeId::WorldFlagsGame, ModeId::WorldCapitalsGame, ModeId::WorldLanguagesGame, ModeId::LandmarksGame] {
            let (rig, ctl) = started(mode, Difficulty::Easy);
            let q = ctl.question.as_ref().unwrap();
            assert_eq!(q.labels.len(), 6, "{mode}");
            let mut uniq = q.labels.clone();
            uniq.sort();
            uniq.dedup();
            assert_eq!(uniq.len(), 6, "{mode}");
            assert!(matches!(ctl.prompt(&rig.catalog, &rig.session), Prompt::Choice { .. }));
        }
    }

    #[test]
    fn silhouette_carries_an_outline() {
        let (rig, ctl) = started(ModeId::WorldSilhouettes, Difficulty::Easy);
        let Prompt::Choice { outline, image, .. } = ctl.prompt(&rig.catalog, &rig.session) else {
            panic!("expected a choice");
        };
        assert!(outline.map_or(false, |rings| !rings.is_empty()));
        assert!(image.is_none());
    }

    #[test]
    fn easy_forgives_one_miss_per_question() {
        let (mut rig, mut ctl) = started(ModeId::WorldFlagsGame, Difficulty::Easy);
        pick_right(&mut rig, &mut ctl);
        pick_right(&mut rig, &mut ctl);
        assert!(matches!(pick_wrong(&mut rig, &mut ctl), Feedback::Forgiven { .. }));
        // Disabled options can't be picked again.
        let disabled = ctl.question.as_ref().unwrap().disabled.iter().position(|d| *d).unwrap();
        assert_eq!(ctl.handle(&mut rig.cx(), Action::Pick { index: disabled }), Feedback::Ignored);
        assert!(matches!(pick_right(&mut rig, &mut ctl), Feedback::Correct { .. }));
        for _ in 0..5 {
            pick_right(&mut rig, &mut ctl);
        }
        assert!(!rig.session.game_over);
        assert_eq!(rig.session.streak, 8);

        pick_wrong(&mut rig, &mut ctl);
        assert!(matches!(pick_wrong(&mut rig, &mut ctl), Feedback::RunOver { .. }));
        assert!(rig.session.game_over);
        assert_eq!(ctl.result(&rig.session).score, 8);
    }

    #[test]
    fn hard_ends_on_first_miss() {
        let (mut rig, mut ctl) = started(ModeId::WorldCapitalsGame, Difficulty::Hard);
        pick_right(&mut rig, &mut ctl);
        pick_right(&mut rig, &mut ctl);
        assert!(matches!(pick_wrong(&mut rig, &mut ctl), Feedback::RunOver { .. }));
        let r = ctl.result(&rig.session);
        assert_eq!((r.score, r.total), (2, 3));
        assert_eq!(ctl.handle(&mut rig.cx(), Action::Pick { index: 0 }), Feedback::Ignored);
    }

    #[test]
    fn learning_reveals_and_keeps_going() {
        let (mut rig, mut ctl) = started(ModeId::LandmarksGame, Difficulty::Learning);
        pick_right(&mut rig, &mut ctl);
        pick_wrong(&mut rig, &mut ctl);
        assert!(matches!(pick_wrong(&mut rig, &mut ctl), Feedback::Missed { .. }));
        assert_eq!(rig.session.streak, 0);
        assert_eq!(rig.session.best_streak, 1);
        assert!(!rig.session.game_over);
    }

    #[test]
    fn exhausting_the_queue_finishes() {
        let (mut rig, mut ctl) = started(ModeId::LandmarksGame, Difficulty::Easy);
        let n = rig.catalog.landmarks().len();
        for _ in 0..n {
            pick_right(&mut rig, &mut ctl);
        }
        assert!(rig.session.game_over);
        assert_eq!(ctl.result(&rig.session).score, n as u32);
    }
}
