//! Map view model: one shape per catalog entity, paint/overlay state, pan/zoom viewport
//! and hit testing. Drawing is left to the client; this holds everything it needs.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{Catalog, TooltipRow};
use crate::domain::MapKind;
use crate::geo::{self, BBox, Feature, IdRule, Point, Polygon};

pub const ZOOM_STEP: f64 = 1.15;
pub const MAX_ZOOM: f64 = 12.0;
const DEFAULT_WIDTH: f64 = 960.0;
const DEFAULT_HEIGHT: f64 = 500.0;

/// Dataset coordinates for a map kind.
pub struct MapSource {
    pub object: &'static str,
    pub fallback_first: bool,
    pub rule: IdRule,
}

impl MapSource {
    pub fn for_kind(kind: MapKind) -> Self {
        match kind {
            MapKind::World => MapSource { object: "countries", fallback_first: false, rule: IdRule::StripZeros },
            MapKind::Brazil => MapSource { object: "estados", fallback_first: true, rule: IdRule::FirstTwo },
            MapKind::UnitedStates => MapSource { object: "states", fallback_first: false, rule: IdRule::PadTwo },
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MapStatus {
    Loading,
    Ready,
    Failed { message: String },
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Paint {
    Hidden,
    /// Brief highlight before `color` is applied by `settle`.
    Flash { color: String },
    Filled { color: String },
}

/// Per-shape emphasis independent of fill.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Target,
    Wrong,
    Missed,
    Start,
    End,
    Frontier,
}

/// Clipped texture drawn over a shape (flag image).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Overlay {
    pub image: String,
}

#[derive(Clone, Debug)]
pub struct Shape {
    pub feature: Feature,
    pub bbox: Option<BBox>,
    pub centroid: Option<Point>,
    pub paint: Paint,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub base_scale: f64,
    pub scale: f64,
    pub translate: [f64; 2],
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        let base = width / 360.0;
        Self { width, height, base_scale: base, scale: base, translate: [width / 2.0, height / 2.0] }
    }

    /// Equirectangular projection of [lon, lat] to screen pixels.
    pub fn project(&self, p: Point) -> [f64; 2] {
        [self.translate[0] + p[0] * self.scale, self.translate[1] - p[1] * self.scale]
    }

    pub fn invert(&self, s: [f64; 2]) -> Point {
        [(s[0] - self.translate[0]) / self.scale, (self.translate[1] - s[1]) / self.scale]
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.translate[0] += dx;
        self.translate[1] += dy;
    }

    /// Multiply the scale by `factor`, clamped to [base, base * MAX_ZOOM], keeping the
    /// geographic point under `cursor` fixed on screen.
    pub fn zoom(&mut self, factor: f64, cursor: [f64; 2]) {
        let anchor = self.invert(cursor);
        self.scale = (self.scale * factor).clamp(self.base_scale, self.base_scale * MAX_ZOOM);
        let moved = self.project(anchor);
        self.translate[0] += cursor[0] - moved[0];
        self.translate[1] += cursor[1] - moved[1];
    }

    pub fn reset(&mut self) {
        *self = Viewport::new(self.width, self.height);
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tooltip {
    Unknown,
    Known { title: String, rows: Vec<TooltipRow> },
}

#[derive(Clone, Debug, Serialize)]
pub struct ShapeView {
    pub id: String,
    pub paint: Paint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<Mark>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MapSnapshot {
    pub kind: MapKind,
    pub status: MapStatus,
    pub viewport: Viewport,
    /// Shapes that are painted, overlaid or marked; everything else is plain.
    pub shapes: Vec<ShapeView>,
}

#[derive(Clone, Debug)]
pub struct MapView {
    pub kind: MapKind,
    status: MapStatus,
    shapes: BTreeMap<String, Shape>,
    overlays: HashMap<String, Overlay>,
    marks: HashMap<String, Mark>,
    pub viewport: Viewport,
}

impl MapView {
    pub fn loading(kind: MapKind) -> Self {
        Self {
            kind,
            status: MapStatus::Loading,
            shapes: BTreeMap::new(),
            overlays: HashMap::new(),
            marks: HashMap::new(),
            viewport: Viewport::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
        }
    }

    pub fn failed(kind: MapKind, message: impl Into<String>) -> Self {
        let mut m = Self::loading(kind);
        m.status = MapStatus::Failed { message: message.into() };
        m
    }

    /// Keep only features that name a catalog entity on this map.
    pub fn from_features(kind: MapKind, features: Vec<Feature>, catalog: &Catalog) -> Self {
        let mut m = Self::loading(kind);
        let mut skipped = 0usize;
        for f in features {
            if catalog.entity(kind, &f.id).is_none() {
                skipped += 1;
                continue;
            }
            let shape = Shape { bbox: geo::bbox(&f), centroid: geo::centroid(&f), feature: f, paint: Paint::Hidden };
            m.shapes.insert(shape.feature.id.clone(), shape);
        }
        debug!(target: "map", ?kind, shapes = m.shapes.len(), skipped, "Map shapes built");
        m.status = MapStatus::Ready;
        m
    }

    /// Offline map: a small square around each country centroid, or a grid for subdivisions.
    pub fn schematic(kind: MapKind, catalog: &Catalog) -> Self {
        let square = |c: Point, half: f64| Polygon {
            rings: vec![vec![
                [c[0] - half, c[1] - half],
                [c[0] + half, c[1] - half],
                [c[0] + half, c[1] + half],
                [c[0] - half, c[1] + half],
                [c[0] - half, c[1] - half],
            ]],
        };
        let features = catalog
            .entity_ids(kind)
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let centre = match kind {
                    MapKind::World => catalog.country(&id).and_then(|c| c.centroid).unwrap_or([0.0, 0.0]),
                    _ => [-170.0 + (i % 10) as f64 * 20.0, 60.0 - (i / 10) as f64 * 20.0],
                };
                Feature { id, name: None, polygons: vec![square(centre, 0.4)] }
            })
            .collect();
        Self::from_features(kind, features, catalog)
    }

    pub fn status(&self) -> &MapStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == MapStatus::Ready
    }

    pub fn has_shape(&self, id: &str) -> bool {
        self.shapes.contains_key(id)
    }

    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.shapes.get(id).map_or(false, |s| s.paint != Paint::Hidden)
    }

    /// Paint a shape. Repeated reveals repaint in place; a missing shape is a no-op.
    /// Returns whether the shape exists.
    pub fn reveal(&mut self, id: &str, color: &str, flag: Option<String>, flash: bool) -> bool {
        let Some(shape) = self.shapes.get_mut(id) else {
            debug!(target: "map", %id, "Reveal of unknown shape ignored");
            return false;
        };
        shape.paint = if flash {
            Paint::Flash { color: color.to_string() }
        } else {
            Paint::Filled { color: color.to_string() }
        };
        if let Some(image) = flag {
            self.overlays.insert(id.to_string(), Overlay { image });
        }
        true
    }

    /// Apply the final color to every flashing shape. Returns how many settled.
    pub fn settle(&mut self) -> usize {
        let mut n = 0;
        for shape in self.shapes.values_mut() {
            if let Paint::Flash { color } = &shape.paint {
                shape.paint = Paint::Filled { color: color.clone() };
                n += 1;
            }
        }
        n
    }

    pub fn has_pending_flash(&self) -> bool {
        self.shapes.values().any(|s| matches!(s.paint, Paint::Flash { .. }))
    }

    pub fn mark(&mut self, id: &str, mark: Mark) {
        if self.shapes.contains_key(id) {
            self.marks.insert(id.to_string(), mark);
        }
    }

    pub fn unmark(&mut self, id: &str) {
        self.marks.remove(id);
    }

    pub fn clear_marks(&mut self, which: Mark) {
        self.marks.retain(|_, m| *m != which);
    }

    pub fn mark_of(&self, id: &str) -> Option<Mark> {
        self.marks.get(id).copied()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Drop every paint, overlay and mark, and reset the viewport.
    pub fn reset(&mut self) {
        for shape in self.shapes.values_mut() {
            shape.paint = Paint::Hidden;
        }
        self.overlays.clear();
        self.marks.clear();
        self.viewport.reset();
    }

    /// Shape under a screen position, after the current pan/zoom.
    pub fn shape_at(&self, screen: [f64; 2]) -> Option<&str> {
        let p = self.viewport.invert(screen);
        self.shape_containing(p)
    }

    pub fn shape_containing(&self, p: Point) -> Option<&str> {
        self.shapes
            .values()
            .find(|s| s.bbox.map_or(true, |b| inside_bbox(&b, p)) && geo::contains(&s.feature, p))
            .map(|s| s.feature.id.as_str())
    }

    /// Hover details. Only shapes already found or shown, or any shape once the game is
    /// over, reveal their identity.
    pub fn tooltip(&self, catalog: &Catalog, id: &str, game_over: bool) -> Tooltip {
        if !(game_over || self.is_revealed(id)) {
            return Tooltip::Unknown;
        }
        match catalog.entity(self.kind, id) {
            Some(e) => Tooltip::Known { title: e.name.to_string(), rows: catalog.tooltip_rows(self.kind, id) },
            None => {
                warn!(target: "map", %id, "Tooltip for shape without catalog entry");
                Tooltip::Unknown
            }
        }
    }

    /// Identifiers in `ids` ordered west to east by bounding-box centre.
    pub fn order_west_to_east(&self, ids: &mut [String]) {
        let x = |id: &String| {
            self.shapes
                .get(id)
                .and_then(|s| s.bbox)
                .map(|b| b.centre()[0])
                .unwrap_or(f64::MAX)
        };
        ids.sort_by(|a, b| x(a).total_cmp(&x(b)));
    }

    pub fn snapshot(&self) -> MapSnapshot {
        let shapes = self
            .shapes
            .iter()
            .filter(|(id, s)| s.paint != Paint::Hidden || self.overlays.contains_key(*id) || self.marks.contains_key(*id))
            .map(|(id, s)| ShapeView {
                id: id.clone(),
                paint: s.paint.clone(),
                overlay: self.overlays.get(id).cloned(),
                mark: self.marks.get(id).copied(),
            })
            .collect();
        MapSnapshot { kind: self.kind, status: self.status.clone(), viewport: self.viewport.clone(), shapes }
    }
}

fn inside_bbox(b: &BBox, p: Point) -> bool {
    p[0] >= b.min[0] && p[0] <= b.max[0] && p[1] >= b.min[1] && p[1] <= b.max[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> (Catalog, MapView) {
        let cat = Catalog::builtin();
        let map = MapView::schematic(MapKind::World, &cat);
        (cat, map)
    }

    #[test]
    fn revealing_twice_keeps_one_overlay() {
        let (_cat, mut map) = world();
        assert!(map.reveal("76", "#22c55e", Some("/flags/br.png".into()), true));
        assert!(map.reveal("76", "#22c55e", Some("/flags/br.png".into()), true));
        assert_eq!(map.overlay_count(), 1);
        assert_eq!(map.settle(), 1);
        assert_eq!(map.settle(), 0);
        assert!(!map.reveal("nowhere", "#000", None, false));
    }

    #[test]
    fn tooltip_hides_identity_until_found_or_game_over() {
        let (cat, mut map) = world();
        assert_eq!(map.tooltip(&cat, "76", false), Tooltip::Unknown);
        match map.tooltip(&cat, "76", true) {
            Tooltip::Known { title, .. } => assert_eq!(title, "Brazil"),
            other => panic!("unexpected {other:?}"),
        }
        map.reveal("76", "#fff", None, false);
        assert!(matches!(map.tooltip(&cat, "76", false), Tooltip::Known { .. }));
    }

    #[test]
    fn reset_clears_paint_overlays_and_marks() {
        let (_cat, mut map) = world();
        map.reveal("250", "#fff", Some("x".into()), false);
        map.mark("250", Mark::Target);
        map.viewport.pan(10.0, 5.0);
        map.reset();
        assert!(!map.is_revealed("250"));
        assert_eq!(map.overlay_count(), 0);
        assert_eq!(map.mark_of("250"), None);
        assert_eq!(map.viewport, Viewport::new(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert!(map.snapshot().shapes.is_empty());
    }

    #[test]
    fn zoom_is_clamped_and_keeps_cursor_anchored() {
        let mut vp = Viewport::new(960.0, 500.0);
        let cursor = [700.0, 120.0];
        let before = vp.invert(cursor);
        vp.zoom(ZOOM_STEP, cursor);
        let after = vp.invert(cursor);
        assert!((before[0] - after[0]).abs() < 1e-9 && (before[1] - after[1]).abs() < 1e-9);
        for _ in 0..100 {
            vp.zoom(ZOOM_STEP, cursor);
        }
        assert!((vp.scale - vp.base_scale * MAX_ZOOM).abs() < 1e-9);
        for _ in 0..100 {
            vp.zoom(1.0 / ZOOM_STEP, cursor);
        }
        assert!((vp.scale - vp.base_scale).abs() < 1e-9);
    }

    #[test]
    fn hit_testing_follows_pan_and_zoom() {
        let (cat, mut map) = world();
        let brazil = cat.country("76").and_then(|c| c.centroid).unwrap();
        let screen = map.viewport.project(brazil);
        assert_eq!(map.shape_at(screen), Some("76"));
        map.viewport.zoom(3.0, [100.0, 100.0]);
        map.viewport.pan(-40.0, 25.0);
        let screen = map.viewport.project(brazil);
        assert_eq!(map.shape_at(screen), Some("76"));
        assert_eq!(map.shape_at([-5000.0, -5000.0]), None);
    }

    #[test]
    fn west_to_east_ordering() {
        let (_cat, map) = world();
        let mut ids = vec!["392".to_string(), "76".to_string(), "250".to_string()];
        map.order_west_to_east(&mut ids);
        assert_eq!(ids, vec!["76", "250", "392"]);
    }
}
