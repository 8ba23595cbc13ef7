//! Domain vocabulary: difficulty tiers, mode identifiers and their families, continents,
//! screens and the per-mode info record shown in mode pickers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Difficulty tier chosen before a run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Learning,
    Easy,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Learning => "learning",
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        }
    }

    /// XP multiplier applied after the per-family base score.
    pub fn xp_multiplier(self) -> u32 {
        match self {
            Difficulty::Learning => 1,
            Difficulty::Easy => 2,
            Difficulty::Hard => 4,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learning" => Ok(Difficulty::Learning),
            "easy" => Ok(Difficulty::Easy),
            "hard" => Ok(Difficulty::Hard),
            other => Err(GameError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// Every quiz variant. Serialized as the kebab-case identifiers stored in records.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum ModeId {
    WorldType,
    WorldClick,
    WorldFlags,
    WorldCapitals,
    WorldLanguages,
    WorldWalk,
    WorldWhere,
    BrStates,
    BrCapitals,
    UsStates,
    UsCapitals,
    WorldSilhouettes,
    WorldPopulation,
    WorldAreaGame,
    WorldFlagsGame,
    WorldCapitalsGame,
    WorldLanguagesGame,
    LandmarksGame,
    FlagClickGame,
    TopPopulationMap,
    TopAreaMap,
}

/// Which controller implementation drives a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerKind {
    FreeText,
    LanguageGroup,
    Elimination,
    Comparison,
    Click,
    ClickNearest,
    Walk,
}

/// XP scoring family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoringFamily {
    Ratio,
    Streak,
    WorldWhere,
    WorldWalk,
}

/// Which polygon set a mode draws on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    World,
    Brazil,
    UnitedStates,
}

impl ModeId {
    pub const ALL: [ModeId; 21] = [
        ModeId::WorldType,
        ModeId::WorldClick,
        ModeId::WorldFlags,
        ModeId::WorldCapitals,
        ModeId::WorldLanguages,
        ModeId::WorldWalk,
        ModeId::WorldWhere,
        ModeId::BrStates,
        ModeId::BrCapitals,
        ModeId::UsStates,
        ModeId::UsCapitals,
        ModeId::WorldSilhouettes,
        ModeId::WorldPopulation,
        ModeId::WorldAreaGame,
        ModeId::WorldFlagsGame,
        ModeId::WorldCapitalsGame,
        ModeId::WorldLanguagesGame,
        ModeId::LandmarksGame,
        ModeId::FlagClickGame,
        ModeId::TopPopulationMap,
        ModeId::TopAreaMap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModeId::WorldType => "world-type",
            ModeId::WorldClick => "world-click",
            ModeId::WorldFlags => "world-flags",
            ModeId::WorldCapitals => "world-capitals",
            ModeId::WorldLanguages => "world-languages",
            ModeId::WorldWalk => "world-walk",
            ModeId::WorldWhere => "world-where",
            ModeId::BrStates => "br-states",
            ModeId::BrCapitals => "br-capitals",
            ModeId::UsStates => "us-states",
            ModeId::UsCapitals => "us-capitals",
            ModeId::WorldSilhouettes => "world-silhouettes",
            ModeId::WorldPopulation => "world-population",
            ModeId::WorldAreaGame => "world-area-game",
            ModeId::WorldFlagsGame => "world-flags-game",
            ModeId::WorldCapitalsGame => "world-capitals-game",
            ModeId::WorldLanguagesGame => "world-languages-game",
            ModeId::LandmarksGame => "landmarks-game",
            ModeId::FlagClickGame => "flag-click-game",
            ModeId::TopPopulationMap => "top-population-map",
            ModeId::TopAreaMap => "top-area-map",
        }
    }

    pub fn controller(self) -> ControllerKind {
        use ModeId::*;
        match self {
            WorldType | WorldFlags | WorldCapitals | BrStates | BrCapitals | UsStates | UsCapitals
            | TopPopulationMap | TopAreaMap => ControllerKind::FreeText,
            WorldLanguages => ControllerKind::LanguageGroup,
            WorldSilhouettes | WorldFlagsGame | WorldCapitalsGame | WorldLanguagesGame | LandmarksGame => {
                ControllerKind::Elimination
            }
            WorldPopulation | WorldAreaGame => ControllerKind::Comparison,
            WorldClick | FlagClickGame => ControllerKind::Click,
            WorldWhere => ControllerKind::ClickNearest,
            WorldWalk => ControllerKind::Walk,
        }
    }

    pub fn scoring(self) -> ScoringFamily {
        match self {
            ModeId::WorldWhere => ScoringFamily::WorldWhere,
            ModeId::WorldWalk => ScoringFamily::WorldWalk,
            m if m.is_streak() => ScoringFamily::Streak,
            _ => ScoringFamily::Ratio,
        }
    }

    /// Streak (elimination/comparison) modes.
    pub fn is_streak(self) -> bool {
        matches!(
            self.controller(),
            ControllerKind::Elimination | ControllerKind::Comparison
        )
    }

    pub fn map_kind(self) -> Option<MapKind> {
        use ModeId::*;
        match self {
            BrStates | BrCapitals => Some(MapKind::Brazil),
            UsStates | UsCapitals => Some(MapKind::UnitedStates),
            WorldType | WorldClick | WorldFlags | WorldCapitals | WorldLanguages | WorldWalk
            | WorldWhere | TopPopulationMap | TopAreaMap => Some(MapKind::World),
            _ => None,
        }
    }

    /// Whether entering the mode prompts for a difficulty first.
    pub fn uses_difficulty(self) -> bool {
        !matches!(
            self,
            ModeId::WorldWalk
                | ModeId::WorldWhere
                | ModeId::WorldLanguages
                | ModeId::TopPopulationMap
                | ModeId::TopAreaMap
        )
    }

    /// Skill category used by achievements; `None` for uncategorised modes.
    pub fn category(self) -> Option<&'static str> {
        use ModeId::*;
        match self {
            WorldType | WorldClick => Some("maps"),
            WorldFlags | WorldFlagsGame | FlagClickGame => Some("flags"),
            WorldCapitals | WorldCapitalsGame => Some("capitals"),
            WorldLanguages | WorldLanguagesGame => Some("languages"),
            WorldSilhouettes | WorldPopulation | WorldAreaGame | WorldWhere => Some("challenges"),
            BrStates | BrCapitals | UsStates | UsCapitals => Some("regional"),
            _ => None,
        }
    }

    pub fn info(self) -> ModeInfo {
        use ModeId::*;
        let (title, icon, desc) = match self {
            WorldType => ("Name the Countries", Some("🌍"), Some("Type every country you can remember.")),
            WorldClick => ("Find on the Map", Some("🖱️"), Some("Click the country that is named.")),
            WorldFlags => ("Flags (Map)", Some("🏳️"), Some("Name the country for each flag.")),
            WorldCapitals => ("Capitals (Map)", Some("🏛️"), Some("Type the capital of the highlighted country.")),
            WorldLanguages => ("Languages (Map)", Some("🗣️"), Some("Name every country that speaks a language.")),
            WorldWalk => ("Border Walk", Some("🚶"), Some("Connect two countries through their neighbours.")),
            WorldWhere => ("Where Is It?", Some("📍"), Some("Click as close as you can to the named country.")),
            BrStates => ("Brazilian States", None, None),
            BrCapitals => ("Brazilian Capitals", None, None),
            UsStates => ("US States", None, None),
            UsCapitals => ("US Capitals", None, None),
            WorldSilhouettes => ("Silhouettes", Some("🎭"), Some("Recognise a country by its outline.")),
            WorldPopulation => ("Population", Some("📊"), Some("Pick the more populous country.")),
            WorldAreaGame => ("Area", Some("📐"), Some("Pick the larger country.")),
            WorldFlagsGame => ("Flags (Game)", Some("🎌"), None),
            WorldCapitalsGame => ("Capitals (Game)", Some("🏛️"), None),
            WorldLanguagesGame => ("Languages (Game)", Some("💬"), None),
            LandmarksGame => ("Landmarks", Some("🗼"), Some("Which country is this landmark in?")),
            FlagClickGame => ("Click the Flag", Some("🚩"), None),
            TopPopulationMap => ("Top Population", None, Some("Name the most populous countries.")),
            TopAreaMap => ("Top Area", None, Some("Name the largest countries.")),
        };
        let tooltip = self
            .uses_difficulty()
            .then_some("Difficulty changes how many mistakes you may make.");
        // Static table above is non-empty for every mode.
        ModeInfo::new(self, title, icon, desc, tooltip).unwrap_or_else(|_| ModeInfo {
            id: self,
            title: self.as_str().to_string(),
            icon: None,
            description: None,
            tooltip: None,
            uses_difficulty: self.uses_difficulty(),
        })
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeId {
    type Err = GameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModeId::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| GameError::UnknownMode(s.to_string()))
    }
}

/// Mode picker entry. Optional members are explicit; construction validates them.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ModeInfo {
    pub id: ModeId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub uses_difficulty: bool,
}

impl ModeInfo {
    pub fn new(
        id: ModeId,
        title: &str,
        icon: Option<&str>,
        description: Option<&str>,
        tooltip: Option<&str>,
    ) -> Result<Self, GameError> {
        let invalid = |reason| GameError::InvalidModeInfo { mode: id.to_string(), reason };
        if title.trim().is_empty() {
            return Err(invalid("title is empty"));
        }
        let clean = |o: Option<&str>, what: &'static str| -> Result<Option<String>, GameError> {
            match o {
                Some(s) if s.trim().is_empty() => Err(invalid(what)),
                Some(s) => Ok(Some(s.to_string())),
                None => Ok(None),
            }
        };
        Ok(Self {
            id,
            title: title.to_string(),
            icon: clean(icon, "icon is blank")?,
            description: clean(description, "description is blank")?,
            tooltip: clean(tooltip, "tooltip is blank")?,
            uses_difficulty: id.uses_difficulty(),
        })
    }
}

/// Continent tag on every country.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Continent {
    #[serde(rename = "AF")]
    Africa,
    #[serde(rename = "NA")]
    NorthAmerica,
    #[serde(rename = "CA")]
    CentralAmerica,
    #[serde(rename = "SA")]
    SouthAmerica,
    #[serde(rename = "AS")]
    Asia,
    #[serde(rename = "EU")]
    Europe,
    #[serde(rename = "OC")]
    Oceania,
}

impl Continent {
    pub fn name(self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::NorthAmerica => "North America",
            Continent::CentralAmerica => "Central America",
            Continent::SouthAmerica => "South America",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::Oceania => "Oceania",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Continent::Africa => "#f59e0b",
            Continent::NorthAmerica => "#3b82f6",
            Continent::CentralAmerica => "#06b6d4",
            Continent::SouthAmerica => "#22c55e",
            Continent::Asia => "#ef4444",
            Continent::Europe => "#8b5cf6",
            Continent::Oceania => "#ec4899",
        }
    }
}

/// Top-level screens owned by the orchestrator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Home,
    Select,
    Game,
    Results,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_ids_round_trip_through_strings_and_serde() {
        for m in ModeId::ALL {
            assert_eq!(m.as_str().parse::<ModeId>().unwrap(), m);
            let json = serde_json::to_string(&m).unwrap();
            assert_eq!(json, format!("\"{}\"", m.as_str()));
        }
        assert!("world-nope".parse::<ModeId>().is_err());
    }

    #[test]
    fn streak_family_covers_elimination_and_comparison() {
        assert_eq!(ModeId::WorldFlagsGame.scoring(), ScoringFamily::Streak);
        assert_eq!(ModeId::WorldPopulation.scoring(), ScoringFamily::Streak);
        assert_eq!(ModeId::WorldType.scoring(), ScoringFamily::Ratio);
        assert_eq!(ModeId::WorldWhere.scoring(), ScoringFamily::WorldWhere);
    }

    #[test]
    fn mode_info_rejects_blank_fields() {
        assert!(ModeInfo::new(ModeId::WorldType, " ", None, None, None).is_err());
        assert!(ModeInfo::new(ModeId::WorldType, "T", Some(""), None, None).is_err());
        let info = ModeInfo::new(ModeId::WorldType, "T", None, Some("d"), None).unwrap();
        assert_eq!(info.description.as_deref(), Some("d"));
        for m in ModeId::ALL {
            assert!(!m.info().title.is_empty());
        }
    }
}
