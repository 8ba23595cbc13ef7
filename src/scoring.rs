//! XP, levels, achievements and the play-day streak.
//!
//! Everything here is pure: the same inputs always give the same output, so the figures a
//! client shows can be re-derived server-side.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, ModeId, ScoringFamily};

/// Point budget of a full world-where run.
pub const WHERE_BUDGET: f64 = 7000.0;
const STREAK_XP_PER_HIT: f64 = 10.0;
const STREAK_XP_CAP: f64 = 200.0;
const WALK_GAVE_UP_XP: f64 = 50.0;

/// XP for one finished attempt. `time_seconds` is part of the record but not of the formula.
pub fn xp(mode: ModeId, score: u32, total: u32, _time_seconds: u64, difficulty: Option<Difficulty>) -> u32 {
    let (s, t) = (score as f64, total as f64);
    let base = match mode.scoring() {
        ScoringFamily::Ratio if t > 0.0 => (s / t * 100.0).round().clamp(0.0, 100.0),
        ScoringFamily::Ratio => 0.0,
        ScoringFamily::Streak => (s * STREAK_XP_PER_HIT).min(STREAK_XP_CAP),
        ScoringFamily::WorldWhere => (s / WHERE_BUDGET * 100.0).clamp(0.0, 100.0),
        ScoringFamily::WorldWalk if score == 0 => WALK_GAVE_UP_XP,
        ScoringFamily::WorldWalk => ((t / s).min(1.0) * 100.0).round(),
    };
    let mult = difficulty.map_or(1, Difficulty::xp_multiplier) as f64;
    (base * mult).round() as u32
}

pub const LEVEL_THRESHOLDS: [u64; 50] = [
    0, 100, 250, 450, 700, 1000, 1400, 1900, 2500, 3200, 4000, 5000, 6200, 7600, 9200, 11000, 13000, 15500, 18500,
    22000, 26000, 30500, 35500, 41000, 47500, 55000, 63500, 73000, 84000, 96000, 110000, 126000, 144000, 165000,
    189000, 216000, 247000, 282000, 322000, 368000, 420000, 479000, 546000, 622000, 709000, 808000, 920000, 1048000,
    1194000, 1360000,
];

const LEVEL_TITLES: [(u32, &str); 8] = [
    (1, "Beginner"),
    (6, "Student"),
    (11, "Explorer"),
    (16, "Geographer"),
    (21, "Specialist"),
    (26, "Master"),
    (31, "Grandmaster"),
    (41, "Legend"),
];

/// 1-based level reached with `xp`.
pub fn level(xp: u64) -> u32 {
    LEVEL_THRESHOLDS.iter().skip(1).take_while(|t| xp >= **t).count() as u32 + 1
}

pub fn level_title(level: u32) -> &'static str {
    LEVEL_TITLES
        .iter()
        .rev()
        .find(|(from, _)| level >= *from)
        .map_or(LEVEL_TITLES[0].1, |(_, title)| title)
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LevelProgress {
    pub xp: u64,
    pub level: u32,
    pub title: &'static str,
    /// Threshold of the current level.
    pub current: u64,
    /// Threshold of the next level; past the table it is `current + 1000`.
    pub next: u64,
    pub pct: f64,
}

pub fn level_progress(xp: u64) -> LevelProgress {
    let lvl = level(xp);
    let current = LEVEL_THRESHOLDS[(lvl - 1) as usize];
    let next = LEVEL_THRESHOLDS.get(lvl as usize).copied().unwrap_or(current + 1000);
    let pct = ((xp - current) as f64 / (next - current) as f64 * 100.0).min(100.0);
    LevelProgress { xp, level: lvl, title: level_title(lvl), current, next, pct }
}

/// Consecutive play days in a newest-first list of `YYYY-MM-DD` dates. The run must start
/// today or yesterday; unparseable entries break it.
pub fn play_streak(dates: &[String], today: NaiveDate) -> u32 {
    let parsed = |s: &String| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    let Some(first) = dates.first().and_then(parsed) else {
        return 0;
    };
    if first != today && first != today - Duration::days(1) {
        return 0;
    }
    let mut expected = first;
    let mut streak = 1;
    for d in dates.iter().skip(1) {
        expected = expected - Duration::days(1);
        if parsed(d) != Some(expected) {
            break;
        }
        streak += 1;
    }
    streak
}

/// Per-mode aggregate as returned by the records API.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ModeStat {
    pub game_mode: String,
    #[serde(default)]
    pub best_score: u32,
    #[serde(default)]
    pub best_total: u32,
    #[serde(default)]
    pub best_time: Option<u64>,
    #[serde(default)]
    pub games: u32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Overall {
    #[serde(default)]
    pub total_games: u32,
    #[serde(default)]
    pub total_time: u64,
    #[serde(default)]
    pub modes_played: u32,
}

/// Body of `GET /api/records/stats`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RecordStats {
    #[serde(rename = "totalXP", default)]
    pub total_xp: u64,
    #[serde(rename = "modeStats", default)]
    pub mode_stats: Vec<ModeStat>,
    #[serde(default)]
    pub overall: Overall,
    #[serde(rename = "playDates", default)]
    pub play_dates: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub hint: &'static str,
    pub category: &'static str,
    pub unlocked: bool,
    pub progress: u64,
    pub total: u64,
}

/// What an achievement measures.
#[derive(Clone, Copy)]
enum Goal {
    Games(u64),
    ModesPlayed(u64),
    Categories(u64),
    BestScore(ModeId, u64),
    /// Every country of the mode's pool in one run.
    EveryCountry(ModeId),
    BestStreak(u64),
    /// Any mode finished at 80%+ in under ten minutes.
    Quick,
    /// Every country typed in under fifteen minutes.
    SpeedRun,
    /// A full language group named.
    FullLanguage,
    PlayDays(u64),
    Xp(u64),
}

struct Def {
    id: &'static str,
    name: &'static str,
    icon: &'static str,
    hint: &'static str,
    category: &'static str,
    goal: Goal,
}

const fn def(id: &'static str, name: &'static str, icon: &'static str, hint: &'static str, category: &'static str, goal: Goal) -> Def {
    Def { id, name, icon, hint, category, goal }
}

const ACHIEVEMENTS: &[Def] = &[
    def("first-step", "First Step", "👣", "Finish your first game", "general", Goal::Games(1)),
    def("curious", "Curious", "🔍", "Play 3 different modes", "general", Goal::ModesPlayed(3)),
    def("explorer", "Explorer", "🧭", "Play a mode of every category", "general", Goal::Categories(6)),
    def("cartographer-jr", "Junior Cartographer", "🗺️", "Type 50 countries", "maps", Goal::BestScore(ModeId::WorldType, 50)),
    def("cartographer", "Cartographer", "🌐", "Type 100 countries", "maps", Goal::BestScore(ModeId::WorldType, 100)),
    def("map-master", "Map Master", "🏆", "Type every country", "maps", Goal::EveryCountry(ModeId::WorldType)),
    def("sharp-eye", "Sharp Eye", "👁️", "Name 50 flags", "flags", Goal::BestScore(ModeId::WorldFlags, 50)),
    def("vexillologist", "Vexillologist", "🎌", "Name every flag", "flags", Goal::EveryCountry(ModeId::WorldFlags)),
    def("capital-jr", "Junior Diplomat", "🏛️", "Name 50 capitals", "capitals", Goal::BestScore(ModeId::WorldCapitals, 50)),
    def("diplomat", "Diplomat", "🎩", "Name every capital", "capitals", Goal::EveryCountry(ModeId::WorldCapitals)),
    def("polyglot", "Polyglot", "💬", "Complete every country of a language", "languages", Goal::FullLanguage),
    def("good-streak", "Good Streak", "🔥", "Reach a streak of 10", "streak", Goal::BestStreak(10)),
    def("on-fire", "On Fire", "💥", "Reach a streak of 25", "streak", Goal::BestStreak(25)),
    def("unstoppable", "Unstoppable", "⚡", "Reach a streak of 50", "streak", Goal::BestStreak(50)),
    def("legendary", "Legendary", "👑", "Reach a streak of 100", "streak", Goal::BestStreak(100)),
    def("lightning", "Lightning", "⏱️", "Finish a mode with 80%+ in under 10 minutes", "speed", Goal::Quick),
    def("speed-runner", "Speed Runner", "🏎️", "Type every country in under 15 minutes", "speed", Goal::SpeedRun),
    def("consistent", "Consistent", "📅", "Play 5 days in a row", "dedication", Goal::PlayDays(5)),
    def("dedicated", "Dedicated", "💪", "Play 10 days in a row", "dedication", Goal::PlayDays(10)),
    def("unshakable", "Unshakable", "🏔️", "Play 30 days in a row", "dedication", Goal::PlayDays(30)),
    def("marathoner", "Marathoner", "🏃", "Finish 100 games", "general", Goal::Games(100)),
    def("veteran", "Veteran", "🎖️", "Finish 500 games", "general", Goal::Games(500)),
    def("brazilian", "Brazilian", "🇧🇷", "Find all 27 Brazilian states", "regional", Goal::BestScore(ModeId::BrStates, 27)),
    def("americanist", "Americanist", "🇺🇸", "Find all 51 US states", "regional", Goal::BestScore(ModeId::UsStates, 51)),
    def("eagle-eye", "Eagle Eye", "🦅", "Score 5000+ in Where Is It?", "challenges", Goal::BestScore(ModeId::WorldWhere, 5000)),
    def("silhouette-master", "Silhouette Master", "🎭", "Streak of 20 in Silhouettes", "challenges", Goal::BestScore(ModeId::WorldSilhouettes, 20)),
    def("demographer", "Demographer", "📊", "Streak of 20 in Population", "challenges", Goal::BestScore(ModeId::WorldPopulation, 20)),
    def("xp-beginner", "XP Beginner", "⭐", "Collect 500 XP", "xp", Goal::Xp(500)),
    def("xp-advanced", "XP Advanced", "🌟", "Collect 5,000 XP", "xp", Goal::Xp(5000)),
    def("xp-master", "XP Master", "✨", "Collect 20,000 XP", "xp", Goal::Xp(20000)),
];

const COLLECTOR_AT: u64 = 15;

/// Evaluate every achievement against the aggregates. Two meta achievements close the list:
/// `collector` (15 unlocked) and `geography-legend` (everything else unlocked).
///
/// "Every country" goals count against the best run's own total, which is the number of
/// countries the map could draw; `countries` stands in until the mode has been played.
pub fn achievements(stats: &RecordStats, countries: u64, today: NaiveDate) -> Vec<Achievement> {
    let by_mode: HashMap<&str, &ModeStat> = stats.mode_stats.iter().map(|m| (m.game_mode.as_str(), m)).collect();
    let best = |m: ModeId| by_mode.get(m.as_str()).map_or(0, |s| s.best_score as u64);
    let pool = |m: ModeId| {
        by_mode.get(m.as_str()).map(|s| s.best_total as u64).filter(|t| *t > 0).unwrap_or(countries)
    };
    let days = play_streak(&stats.play_dates, today) as u64;
    let best_streak = ModeId::ALL.iter().filter(|m| m.is_streak()).map(|m| best(*m)).max().unwrap_or(0);
    let categories = stats
        .mode_stats
        .iter()
        .filter_map(|m| m.game_mode.parse::<ModeId>().ok()?.category())
        .collect::<std::collections::BTreeSet<_>>()
        .len() as u64;

    let mut out: Vec<Achievement> = ACHIEVEMENTS
        .iter()
        .map(|d| {
            let (progress, total) = match d.goal {
                Goal::Games(n) => (stats.overall.total_games as u64, n),
                Goal::ModesPlayed(n) => (stats.overall.modes_played as u64, n),
                Goal::Categories(n) => (categories, n),
                Goal::BestScore(m, n) => (best(m), n),
                Goal::EveryCountry(m) => (best(m), pool(m)),
                Goal::BestStreak(n) => (best_streak, n),
                Goal::PlayDays(n) => (days, n),
                Goal::Xp(n) => (stats.total_xp, n),
                Goal::Quick => {
                    let hit = stats.mode_stats.iter().any(|m| {
                        m.best_total > 0
                            && m.best_score as f64 / m.best_total as f64 >= 0.8
                            && m.best_time.map_or(false, |t| t > 0 && t < 600)
                    });
                    (hit as u64, 1)
                }
                Goal::SpeedRun => {
                    let hit = by_mode
                        .get(ModeId::WorldType.as_str())
                        .map_or(false, |m| {
                            m.best_score as u64 >= pool(ModeId::WorldType) && m.best_time.map_or(false, |t| t < 900)
                        });
                    (hit as u64, 1)
                }
                Goal::FullLanguage => {
                    let m = by_mode.get(ModeId::WorldLanguages.as_str());
                    let (s, t) = m.map_or((0, 1), |m| (m.best_score as u64, (m.best_total as u64).max(1)));
                    (if s > 0 && s >= t { t } else { s }, t)
                }
            };
            Achievement {
                id: d.id,
                name: d.name,
                icon: d.icon,
                hint: d.hint,
                category: d.category,
                unlocked: progress >= total,
                progress: progress.min(total),
                total,
            }
        })
        .collect();

    let mut unlocked = out.iter().filter(|a| a.unlocked).count() as u64;
    let collector = unlocked >= COLLECTOR_AT;
    out.push(Achievement {
        id: "collector",
        name: "Collector",
        icon: "🏅",
        hint: "Unlock 15 achievements",
        category: "meta",
        unlocked: collector,
        progress: unlocked.min(COLLECTOR_AT),
        total: COLLECTOR_AT,
    });
    unlocked += collector as u64;
    let all = out.len() as u64;
    out.push(Achievement {
        id: "geography-legend",
        name: "Geography Legend",
        icon: "🌍",
        hint: "Unlock every achievement",
        category: "meta",
        unlocked: unlocked >= all,
        progress: unlocked,
        total: all,
    });
    out
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Skill {
    pub pct: u32,
    pub played: bool,
}

/// Average best-score ratio per mode category.
pub fn skills(stats: &RecordStats) -> BTreeMap<&'static str, Skill> {
    let mut sums: BTreeMap<&'static str, (f64, u32)> = BTreeMap::new();
    for m in ModeId::ALL {
        if let Some(cat) = m.category() {
            sums.entry(cat).or_default();
        }
    }
    for ms in &stats.mode_stats {
        let Some(cat) = ms.game_mode.parse::<ModeId>().ok().and_then(|m| m.category()) else {
            continue;
        };
        if ms.best_total > 0 {
            let e = sums.entry(cat).or_default();
            e.0 += ms.best_score as f64 / ms.best_total as f64;
            e.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(cat, (sum, n))| {
            let pct = if n > 0 { (sum / n as f64 * 100.0).round() as u32 } else { 0 };
            (cat, Skill { pct, played: n > 0 })
        })
        .collect()
}
