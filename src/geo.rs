//! Geographic primitives: TopoJSON decoding into polygons, planar centroid and bounding
//! box, point containment, great-circle distance and the remote dataset loader.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::GeoError;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// [lon, lat] in degrees.
pub type Point = [f64; 2];

/// Exterior ring first, holes after.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Vec<Point>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub id: String,
    pub name: Option<String>,
    pub polygons: Vec<Polygon>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn centre(&self) -> Point {
        [(self.min[0] + self.max[0]) / 2.0, (self.min[1] + self.max[1]) / 2.0]
    }
}

/// How raw feature identifiers map onto catalog identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdRule {
    /// ISO numeric: "076" -> "76".
    StripZeros,
    /// FIPS state codes: 6 -> "06".
    PadTwo,
    /// IBGE area codes: the first two digits name the state.
    FirstTwo,
}

impl IdRule {
    fn apply(self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match self {
            IdRule::StripZeros => match raw.parse::<u64>() {
                Ok(n) => Some(n.to_string()),
                Err(_) => Some(raw.to_string()),
            },
            IdRule::PadTwo => Some(format!("{:0>2}", raw)),
            IdRule::FirstTwo => Some(raw.chars().take(2).collect()),
        }
    }
}

#[derive(Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    arcs: Vec<Vec<Vec<f64>>>,
    objects: HashMap<String, GeometryCollection>,
}

#[derive(Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Deserialize)]
struct GeometryCollection {
    /// Kept raw so null or unsupported geometry types can be skipped one by one.
    #[serde(default)]
    geometries: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        #[serde(default)]
        id: Option<Value>,
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Option<Value>,
    },
    MultiPolygon {
        #[serde(default)]
        id: Option<Value>,
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Option<Value>,
    },
    #[serde(other)]
    Other,
}

/// Decode one named object of a TopoJSON topology into features. When `object` is absent
/// from the topology and `fallback_first` is set, the first object is used instead.
/// Geometries sharing an identifier are merged into a single multipolygon.
pub fn decode_topology(text: &str, object: &str, fallback_first: bool, rule: IdRule) -> Result<Vec<Feature>, GeoError> {
    let mut topo: Topology = serde_json::from_str(text)?;
    let arcs = absolute_arcs(&topo.arcs, topo.transform.as_ref());

    let collection = match topo.objects.remove(object) {
        Some(c) => c,
        None if fallback_first => {
            let first = topo.objects.keys().min().cloned();
            first
                .and_then(|k| topo.objects.remove(&k))
                .ok_or_else(|| GeoError::MissingObject(object.to_string()))?
        }
        None => return Err(GeoError::MissingObject(object.to_string())),
    };

    let mut merged: BTreeMap<String, Feature> = BTreeMap::new();
    for raw in collection.geometries {
        let Ok(geom) = serde_json::from_value::<Geometry>(raw) else {
            continue;
        };
        let (raw_id, props, polygons) = match geom {
            Geometry::Polygon { id, arcs: rings, properties } => (id, properties, vec![polygon(&arcs, &rings)?]),
            Geometry::MultiPolygon { id, arcs: polys, properties } => {
                let ps = polys.iter().map(|rings| polygon(&arcs, rings)).collect::<Result<Vec<_>, _>>()?;
                (id, properties, ps)
            }
            Geometry::Other => continue,
        };
        let Some(id) = feature_id(raw_id.as_ref(), props.as_ref()).and_then(|raw| rule.apply(&raw)) else {
            continue;
        };
        let name = props
            .as_ref()
            .and_then(|p| p.get("name").or_else(|| p.get("nome")))
            .and_then(Value::as_str)
            .map(str::to_string);
        let entry = merged.entry(id.clone()).or_insert_with(|| Feature { id, name: None, polygons: Vec::new() });
        if entry.name.is_none() {
            entry.name = name;
        }
        entry.polygons.extend(polygons);
    }
    Ok(merged.into_values().collect())
}

fn feature_id(id: Option<&Value>, props: Option<&Value>) -> Option<String> {
    let from_value = |v: &Value| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    id.and_then(from_value).or_else(|| {
        let p = props?;
        ["codarea", "coduf", "id"].iter().find_map(|k| p.get(*k).and_then(from_value))
    })
}

/// Undo quantization and delta encoding.
fn absolute_arcs(raw: &[Vec<Vec<f64>>], transform: Option<&Transform>) -> Vec<Vec<Point>> {
    raw.iter()
        .map(|arc| {
            let (mut x, mut y) = (0.0, 0.0);
            arc.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| match transform {
                    Some(t) => {
                        x += p[0];
                        y += p[1];
                        [x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1]]
                    }
                    None => [p[0], p[1]],
                })
                .collect()
        })
        .collect()
}

fn polygon(arcs: &[Vec<Point>], rings: &[Vec<i64>]) -> Result<Polygon, GeoError> {
    let rings = rings.iter().map(|r| ring(arcs, r)).collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon { rings })
}

/// Stitch arcs into a ring; negative indices (`~i`) walk arc `i` backwards.
fn ring(arcs: &[Vec<Point>], indices: &[i64]) -> Result<Vec<Point>, GeoError> {
    let mut points: Vec<Point> = Vec::new();
    for &i in indices {
        let idx = if i < 0 { !i } else { i };
        let arc = usize::try_from(idx).ok().and_then(|u| arcs.get(u)).ok_or(GeoError::BadArc(i))?;
        // Consecutive arcs share an endpoint.
        points.pop();
        if i < 0 {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
    }
    Ok(points)
}

/// Even-odd ray casting over every ring, so holes exclude their interior.
pub fn contains(feature: &Feature, p: Point) -> bool {
    feature.polygons.iter().any(|poly| {
        let mut inside = false;
        for ring in &poly.rings {
            if ring_crossings(ring, p) {
                inside = !inside;
            }
        }
        inside
    })
}

fn ring_crossings(ring: &[Point], p: Point) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i][0], ring[i][1]);
        let (xj, yj) = (ring[j][0], ring[j][1]);
        if (yi > p[1]) != (yj > p[1]) && p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn ring_area_and_centroid(ring: &[Point]) -> (f64, Point) {
    let mut a = 0.0;
    let (mut cx, mut cy) = (0.0, 0.0);
    for w in ring.windows(2) {
        let cross = w[0][0] * w[1][1] - w[1][0] * w[0][1];
        a += cross;
        cx += (w[0][0] + w[1][0]) * cross;
        cy += (w[0][1] + w[1][1]) * cross;
    }
    a /= 2.0;
    if a.abs() < f64::EPSILON {
        return (0.0, ring.first().copied().unwrap_or([0.0, 0.0]));
    }
    (a, [cx / (6.0 * a), cy / (6.0 * a)])
}

/// Area-weighted planar centroid of the exterior rings.
pub fn centroid(feature: &Feature) -> Option<Point> {
    let mut total = 0.0;
    let (mut x, mut y) = (0.0, 0.0);
    let mut fallback = None;
    for poly in &feature.polygons {
        let Some(outer) = poly.rings.first() else { continue };
        let (a, c) = ring_area_and_centroid(outer);
        fallback.get_or_insert(c);
        let w = a.abs();
        total += w;
        x += c[0] * w;
        y += c[1] * w;
    }
    if total > 0.0 {
        Some([x / total, y / total])
    } else {
        fallback
    }
}

pub fn bbox(feature: &Feature) -> Option<BBox> {
    let mut pts = feature.polygons.iter().flat_map(|p| p.rings.iter().flatten());
    let first = *pts.next()?;
    let mut b = BBox { min: first, max: first };
    for p in pts {
        b.min[0] = b.min[0].min(p[0]);
        b.min[1] = b.min[1].min(p[1]);
        b.max[0] = b.max[0].max(p[0]);
        b.max[1] = b.max[1].max(p[1]);
    }
    Some(b)
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Point, b: Point) -> f64 {
    let (lat1, lat2) = (a[1].to_radians(), b[1].to_radians());
    let dlat = (b[1] - a[1]).to_radians();
    let dlon = (b[0] - a[0]).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Fetch a TopoJSON dataset and decode one object from it.
#[instrument(level = "info", skip(client), fields(url = %url))]
pub async fn fetch_features(
    client: &reqwest::Client,
    url: &str,
    object: &str,
    fallback_first: bool,
    rule: IdRule,
) -> Result<Vec<Feature>, GeoError> {
    let text = client.get(url).send().await?.error_for_status()?.text().await?;
    let features = decode_topology(&text, object, fallback_first, rule)?;
    info!(target: "map", count = features.len(), "Dataset decoded");
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPO: &str = r#"{
      "type": "Topology",
      "transform": { "scale": [1, 1], "translate": [0, 0] },
      "arcs": [
        [[0, 0], [10, 0], [0, 10], [-10, 0], [0, -10]],
        [[2, 2], [0, 2], [2, 0], [0, -2], [-2, 0]],
        [[20, 0], [5, 0], [0, 5], [-5, -5]]
      ],
      "objects": {
        "countries": {
          "type": "GeometryCollection",
          "geometries": [
            { "type": "Polygon", "id": "004", "arcs": [[0], [1]], "properties": { "name": "Squareland" } },
            { "type": "Polygon", "id": "076", "arcs": [[-3]] },
            { "type": "MultiPolygon", "id": 76, "arcs": [[[2]]] },
            { "type": null, "id": "010" }
          ]
        }
      }
    }"#;

    fn decoded() -> Vec<Feature> {
        decode_topology(TOPO, "countries", false, IdRule::StripZeros).unwrap()
    }

    #[test]
    fn decodes_delta_arcs_and_merges_duplicate_ids() {
        let f = decoded();
        assert_eq!(f.len(), 2);
        let square = f.iter().find(|x| x.id == "4").unwrap();
        assert_eq!(square.name.as_deref(), Some("Squareland"));
        assert_eq!(square.polygons[0].rings[0], vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]);
        let tri = f.iter().find(|x| x.id == "76").unwrap();
        assert_eq!(tri.polygons.len(), 2);
        assert_eq!(tri.polygons[0].rings[0], vec![[20.0, 0.0], [25.0, 5.0], [25.0, 0.0], [20.0, 0.0]]);
    }

    #[test]
    fn containment_respects_holes() {
        let f = decoded();
        let square = f.iter().find(|x| x.id == "4").unwrap();
        assert!(contains(square, [5.0, 5.0]));
        assert!(!contains(square, [3.0, 3.0]));
        assert!(!contains(square, [11.0, 11.0]));
    }

    #[test]
    fn centroid_and_bbox_of_square() {
        let f = decoded();
        let square = f.iter().find(|x| x.id == "4").unwrap();
        let c = centroid(square).unwrap();
        assert!((c[0] - 5.0).abs() < 1e-9 && (c[1] - 5.0).abs() < 1e-9);
        let b = bbox(square).unwrap();
        assert_eq!(b.centre(), [5.0, 5.0]);
    }

    #[test]
    fn missing_object_and_bad_arcs_are_errors() {
        assert!(matches!(
            decode_topology(TOPO, "states", false, IdRule::StripZeros),
            Err(GeoError::MissingObject(_))
        ));
        assert!(decode_topology(TOPO, "states", true, IdRule::StripZeros).is_ok());
        let bad = r#"{"arcs":[],"objects":{"x":{"geometries":[{"type":"Polygon","id":"1","arcs":[[5]]}]}}}"#;
        assert!(matches!(decode_topology(bad, "x", false, IdRule::StripZeros), Err(GeoError::BadArc(5))));
    }

    #[test]
    fn id_rules() {
        assert_eq!(IdRule::StripZeros.apply("076").as_deref(), Some("76"));
        assert_eq!(IdRule::PadTwo.apply("6").as_deref(), Some("06"));
        assert_eq!(IdRule::FirstTwo.apply("3550308").as_deref(), Some("35"));
        assert_eq!(IdRule::StripZeros.apply(" "), None);
    }

    #[test]
    fn haversine_paris_london() {
        let d = haversine_km([2.3522, 48.8566], [-0.1276, 51.5072]);
        assert!((d - 344.0).abs() < 5.0, "{d}");
        assert_eq!(haversine_km([10.0, 10.0], [10.0, 10.0]), 0.0);
    }
}
