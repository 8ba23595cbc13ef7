//! Read-only entity catalogs built once at startup: countries, subdivisions, languages,
//! landmarks, the border graph and the alias indices that resolve free-text answers.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::alias::AliasIndex;
use crate::domain::{Continent, MapKind};
use crate::seeds::{self, SubdivisionDef};
use crate::util::{parse_population, population_label};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
    pub alpha2: String,
    pub continent: Continent,
    pub capital: String,
    pub population: u64,
    pub area_km2: u64,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub borders: Vec<String>,
    /// [lon, lat]; used when the map has no polygon for this country.
    #[serde(default)]
    pub centroid: Option<[f64; 2]>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub capital_aliases: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Subdivision {
    pub id: String,
    pub name: String,
    pub abbr: String,
    pub capital: String,
    pub region: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Landmark {
    pub id: String,
    pub name: String,
    pub country_id: String,
    pub image: String,
}

/// Extra catalog content merged over the built-in seeds.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogExtras {
    #[serde(default)]
    pub countries: Vec<Country>,
    /// alias -> country id
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// alias -> country id (capital answers)
    #[serde(default)]
    pub capital_aliases: HashMap<String, String>,
}

/// Which alias table a free-text answer is resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    CountryNames,
    CountryCapitals,
    SubdivisionNames(MapKind),
    SubdivisionCapitals(MapKind),
}

/// Numeric ranking used by the comparison and top-N modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Population,
    Area,
}

/// Borrowed view of one playable entity on a given map.
#[derive(Clone, Copy, Debug)]
pub struct Entity<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub capital: &'a str,
    pub region: &'a str,
    pub color: &'a str,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TooltipRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, Default)]
struct SubdivisionSet {
    items: BTreeMap<String, Subdivision>,
    region_colors: HashMap<String, String>,
    names: AliasIndex,
    capitals: AliasIndex,
}

impl SubdivisionSet {
    fn build(
        defs: &[SubdivisionDef],
        colors: &[(&str, &str)],
        aliases: &[(&str, &str)],
        capital_aliases: &[(&str, &str)],
    ) -> Self {
        let mut set = SubdivisionSet::default();
        for d in defs {
            set.names.insert_all([d.name, d.abbr], d.id);
            set.capitals.insert(d.capital, d.id);
            set.items.insert(
                d.id.to_string(),
                Subdivision {
                    id: d.id.into(),
                    name: d.name.into(),
                    abbr: d.abbr.into(),
                    capital: d.capital.into(),
                    region: d.region.into(),
                },
            );
        }
        for (alias, id) in aliases {
            set.names.insert(alias, id);
        }
        for (alias, id) in capital_aliases {
            set.capitals.insert(alias, id);
        }
        set.region_colors = colors.iter().map(|(r, c)| (r.to_string(), c.to_string())).collect();
        set
    }
}

const FALLBACK_COLOR: &str = "#64748b";

#[derive(Clone, Debug)]
pub struct Catalog {
    countries: BTreeMap<String, Country>,
    names: AliasIndex,
    capitals: AliasIndex,
    /// language -> country ids, countries in catalog order
    languages: BTreeMap<String, Vec<String>>,
    adjacency: HashMap<String, Vec<String>>,
    brazil: SubdivisionSet,
    united_states: SubdivisionSet,
    landmarks: Vec<Landmark>,
}

impl Catalog {
    /// Catalog built from the built-in seeds only.
    pub fn builtin() -> Self {
        Self::build(&CatalogExtras::default())
    }

    /// Built-in seeds plus configured extras. Extra countries replace seeds with the same id.
    pub fn build(extras: &CatalogExtras) -> Self {
        let mut countries: BTreeMap<String, Country> = seeds::COUNTRIES
            .iter()
            .map(|d| {
                let c = Country {
                    id: d.id.into(),
                    name: d.name.into(),
                    alpha2: d.alpha2.into(),
                    continent: continent_from_code(d.continent),
                    capital: d.capital.into(),
                    population: parse_population(d.population),
                    area_km2: d.area_km2,
                    languages: d.languages.iter().map(|s| s.to_string()).collect(),
                    currency: d.currency.into(),
                    borders: d.borders.iter().map(|s| s.to_string()).collect(),
                    centroid: Some(d.centroid),
                    aliases: d.aliases.iter().map(|s| s.to_string()).collect(),
                    capital_aliases: d.capital_aliases.iter().map(|s| s.to_string()).collect(),
                };
                (c.id.clone(), c)
            })
            .collect();
        for extra in &extras.countries {
            countries.insert(extra.id.clone(), extra.clone());
        }

        let mut names = AliasIndex::new();
        let mut capitals = AliasIndex::new();
        for c in countries.values() {
            names.insert_all([c.name.as_str(), c.alpha2.as_str()], &c.id);
            names.insert_all(c.aliases.iter().map(String::as_str), &c.id);
            capitals.insert(&c.capital, &c.id);
            capitals.insert_all(c.capital_aliases.iter().map(String::as_str), &c.id);
        }
        for (alias, id) in &extras.aliases {
            if countries.contains_key(id) {
                names.insert(alias, id);
            } else {
                warn!(target: "game", %alias, %id, "Configured alias points at unknown country; skipped");
            }
        }
        for (alias, id) in &extras.capital_aliases {
            if countries.contains_key(id) {
                capitals.insert(alias, id);
            } else {
                warn!(target: "game", %alias, %id, "Configured capital alias points at unknown country; skipped");
            }
        }

        let mut languages: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for c in countries.values() {
            for lang in &c.languages {
                languages.entry(lang.clone()).or_default().push(c.id.clone());
            }
        }

        let adjacency = build_adjacency(&countries, seeds::BRIDGES);

        let landmarks = seeds::LANDMARKS
            .iter()
            .filter(|l| countries.contains_key(l.country_id))
            .map(|l| Landmark {
                id: l.id.into(),
                name: l.name.into(),
                country_id: l.country_id.into(),
                image: format!("/landmarks/{}.jpg", l.id),
            })
            .collect();

        let cat = Catalog {
            brazil: SubdivisionSet::build(
                seeds::BR_STATES,
                seeds::BR_REGION_COLORS,
                seeds::BR_ALIASES,
                seeds::BR_CAPITAL_ALIASES,
            ),
            united_states: SubdivisionSet::build(
                seeds::US_STATES,
                seeds::US_REGION_COLORS,
                seeds::US_ALIASES,
                seeds::US_CAPITAL_ALIASES,
            ),
            countries,
            names,
            capitals,
            languages,
            adjacency,
            landmarks,
        };
        info!(
            target: "game",
            countries = cat.countries.len(),
            aliases = cat.names.len(),
            languages = cat.languages.len(),
            landmarks = cat.landmarks.len(),
            "Catalog built"
        );
        cat
    }

    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    pub fn country(&self, id: &str) -> Option<&Country> {
        self.countries.get(id)
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn aliases(&self, lookup: Lookup) -> &AliasIndex {
        match lookup {
            Lookup::CountryNames => &self.names,
            Lookup::CountryCapitals => &self.capitals,
            Lookup::SubdivisionNames(kind) => &self.subdivisions(kind).names,
            Lookup::SubdivisionCapitals(kind) => &self.subdivisions(kind).capitals,
        }
    }

    /// Resolve free text against `lookup`, accepting only identifiers present on `kind`.
    pub fn resolve(&self, lookup: Lookup, input: &str) -> Option<&str> {
        self.aliases(lookup).resolve(input)
    }

    fn subdivisions(&self, kind: MapKind) -> &SubdivisionSet {
        match kind {
            MapKind::Brazil => &self.brazil,
            // World has no subdivision table; US is the only other set.
            MapKind::UnitedStates | MapKind::World => &self.united_states,
        }
    }

    pub fn entity(&self, kind: MapKind, id: &str) -> Option<Entity<'_>> {
        match kind {
            MapKind::World => self.countries.get(id).map(|c| Entity {
                id: &c.id,
                name: &c.name,
                capital: &c.capital,
                region: c.continent.name(),
                color: c.continent.color(),
            }),
            _ => {
                let set = self.subdivisions(kind);
                set.items.get(id).map(|s| Entity {
                    id: &s.id,
                    name: &s.name,
                    capital: &s.capital,
                    region: &s.region,
                    color: set.region_colors.get(&s.region).map(String::as_str).unwrap_or(FALLBACK_COLOR),
                })
            }
        }
    }

    /// Every playable identifier on a map, in stable order.
    pub fn entity_ids(&self, kind: MapKind) -> Vec<String> {
        match kind {
            MapKind::World => self.countries.keys().cloned().collect(),
            _ => self.subdivisions(kind).items.keys().cloned().collect(),
        }
    }

    pub fn languages(&self) -> &BTreeMap<String, Vec<String>> {
        &self.languages
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn neighbours(&self, id: &str) -> &[String] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn metric(&self, id: &str, metric: Metric) -> u64 {
        self.countries
            .get(id)
            .map(|c| match metric {
                Metric::Population => c.population,
                Metric::Area => c.area_km2,
            })
            .unwrap_or(0)
    }

    /// The `n` highest-ranked countries for `metric`; countries with no figure are excluded.
    pub fn top_by(&self, metric: Metric, n: usize) -> Vec<String> {
        let mut ids: Vec<&Country> = self.countries.values().filter(|c| self.metric(&c.id, metric) > 0).collect();
        ids.sort_by(|a, b| self.metric(&b.id, metric).cmp(&self.metric(&a.id, metric)));
        ids.into_iter().take(n).map(|c| c.id.clone()).collect()
    }

    pub fn flag_url(&self, id: &str) -> Option<String> {
        self.countries
            .get(id)
            .map(|c| format!("/flags/{}.png", c.alpha2.to_lowercase()))
    }

    /// Details shown when hovering a revealed shape.
    pub fn tooltip_rows(&self, kind: MapKind, id: &str) -> Vec<TooltipRow> {
        let row = |label, value: String| TooltipRow { label, value };
        match kind {
            MapKind::World => match self.countries.get(id) {
                Some(c) => vec![
                    row("Capital", c.capital.clone()),
                    row("Continent", c.continent.name().to_string()),
                    row("Population", population_label(c.population)),
                    row("Area", format!("{} km²", c.area_km2)),
                    row("Languages", c.languages.join(", ")),
                    row("Currency", c.currency.clone()),
                ],
                None => Vec::new(),
            },
            _ => match self.subdivisions(kind).items.get(id) {
                Some(s) => vec![
                    row("Abbreviation", s.abbr.clone()),
                    row("Capital", s.capital.clone()),
                    row("Region", s.region.clone()),
                ],
                None => Vec::new(),
            },
        }
    }
}

fn continent_from_code(code: &str) -> Continent {
    match code {
        "AF" => Continent::Africa,
        "CA" => Continent::CentralAmerica,
        "SA" => Continent::SouthAmerica,
        "AS" => Continent::Asia,
        "EU" => Continent::Europe,
        "OC" => Continent::Oceania,
        _ => Continent::NorthAmerica,
    }
}

/// Undirected border graph over catalog members, including the curated sea bridges.
fn build_adjacency(countries: &BTreeMap<String, Country>, bridges: &[(&str, &str)]) -> HashMap<String, Vec<String>> {
    let mut adj: HashMap<String, Vec<String>> = HashMap::new();
    let mut link = |a: &str, b: &str| {
        if a == b || !countries.contains_key(a) || !countries.contains_key(b) {
            return;
        }
        for (x, y) in [(a, b), (b, a)] {
            let list = adj.entry(x.to_string()).or_default();
            if !list.iter().any(|n| n == y) {
                list.push(y.to_string());
            }
        }
    };
    for c in countries.values() {
        for b in &c.borders {
            link(&c.id, b);
        }
    }
    for (a, b) in bridges {
        link(a, b);
    }
    adj
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_round_trips_to_its_country() {
        let cat = Catalog::builtin();
        for c in cat.countries() {
            for alias in std::iter::once(&c.name).chain(c.aliases.iter()) {
                assert_eq!(cat.resolve(Lookup::CountryNames, alias), Some(c.id.as_str()), "alias {alias}");
            }
            assert_eq!(cat.resolve(Lookup::CountryCapitals, &c.capital), Some(c.id.as_str()));
        }
        for (key, id) in cat.aliases(Lookup::CountryNames).entries() {
            assert_eq!(cat.resolve(Lookup::CountryNames, key), Some(id));
        }
    }

    #[test]
    fn brasil_and_brazil_resolve_to_the_same_id() {
        let cat = Catalog::builtin();
        let pt = cat.resolve(Lookup::CountryNames, "brasil");
        assert!(pt.is_some());
        assert_eq!(pt, cat.resolve(Lookup::CountryNames, "Brazil"));
    }

    #[test]
    fn subdivision_aliases_include_abbreviations_and_capitals() {
        let cat = Catalog::builtin();
        assert_eq!(cat.resolve(Lookup::SubdivisionNames(MapKind::Brazil), "sp"), Some("35"));
        assert_eq!(cat.resolve(Lookup::SubdivisionNames(MapKind::Brazil), "Sao Paulo"), Some("35"));
        assert_eq!(cat.resolve(Lookup::SubdivisionCapitals(MapKind::Brazil), "bh"), Some("31"));
        assert_eq!(cat.resolve(Lookup::SubdivisionNames(MapKind::UnitedStates), "Nova York"), Some("36"));
        let e = cat.entity(MapKind::Brazil, "35").unwrap();
        assert_eq!(e.region, "Sudeste");
        assert_eq!(e.color, "#3b82f6");
    }

    #[test]
    fn adjacency_is_symmetric_and_includes_bridges() {
        let cat = Catalog::builtin();
        assert!(cat.neighbours("76").iter().any(|n| n == "266"));
        assert!(cat.neighbours("266").iter().any(|n| n == "76"));
        for c in cat.countries() {
            for n in cat.neighbours(&c.id) {
                assert!(cat.neighbours(n).contains(&c.id));
            }
        }
        assert!(cat.neighbours("392").is_empty());
    }

    #[test]
    fn top_by_orders_descending() {
        let cat = Catalog::builtin();
        let top = cat.top_by(Metric::Area, 3);
        assert_eq!(top.len(), 3);
        assert!(cat.metric(&top[0], Metric::Area) >= cat.metric(&top[1], Metric::Area));
        assert_eq!(top[0], "124");
    }

    #[test]
    fn extras_add_countries_and_skip_dangling_aliases() {
        let mut extras = CatalogExtras::default();
        extras.aliases.insert("Pindorama".into(), "76".into());
        extras.aliases.insert("Atlantis".into(), "9999".into());
        let cat = Catalog::build(&extras);
        assert_eq!(cat.resolve(Lookup::CountryNames, "pindorama"), Some("76"));
        assert_eq!(cat.resolve(Lookup::CountryNames, "atlantis"), None);
    }

    #[test]
    fn tooltips_hold_country_details() {
        let cat = Catalog::builtin();
        let rows = cat.tooltip_rows(MapKind::World, "76");
        assert!(rows.iter().any(|r| r.label == "Capital" && r.value == "Brasília"));
        assert!(cat.tooltip_rows(MapKind::World, "nope").is_empty());
    }
}
