use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::registry::UnitRegistry;

/// `(longitude, latitude)` in degrees.
pub type Position = (f64, f64);
pub type Ring = Vec<Position>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    /// Points, lines and collections carry no fillable area and are skipped.
    Unsupported,
}

impl Geometry {
    pub fn polygons(&self) -> impl Iterator<Item = &[Ring]> {
        let (single, multi): (Option<&[Ring]>, &[Vec<Ring>]) = match self {
            Geometry::Polygon(rings) => (Some(rings.as_slice()), &[]),
            Geometry::MultiPolygon(polys) => (None, polys.as_slice()),
            Geometry::Unsupported => (None, &[]),
        };
        single.into_iter().chain(multi.iter().map(Vec::as_slice))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

/// Typed accessor for the feature property naming the unit (e.g. `county`).
pub fn resolve_unit_identifier<'a>(feature: &'a Feature, unit_type: &str) -> Option<&'a str> {
    feature
        .properties
        .get(unit_type)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// Boundary dataset: every polygon feature of the configured region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub features: Vec<Feature>,
}

impl Dataset {
    /// Parse a GeoJSON `FeatureCollection`/`Feature` or a TopoJSON `Topology`.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let doc: RawDocument =
            serde_json::from_str(text).map_err(|e| format!("invalid boundary dataset: {e}"))?;
        let features = match doc {
            RawDocument::FeatureCollection { features } => {
                features.into_iter().map(RawFeature::into_feature).collect()
            }
            RawDocument::Feature(feature) => vec![feature.into_feature()],
            RawDocument::Topology(topology) => crate::topojson::to_features(topology)?,
        };
        Ok(Self { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawDocument {
    FeatureCollection { features: Vec<RawFeature> },
    Feature(RawFeature),
    Topology(crate::topojson::Topology),
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

impl RawFeature {
    fn into_feature(self) -> Feature {
        Feature {
            properties: self.properties.unwrap_or_default(),
            geometry: self
                .geometry
                .map(RawGeometry::into_geometry)
                .unwrap_or(Geometry::Unsupported),
        }
    }
}

type RawRing = Vec<Vec<f64>>;

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon { coordinates: Vec<RawRing> },
    MultiPolygon { coordinates: Vec<Vec<RawRing>> },
    #[serde(other)]
    Other,
}

impl RawGeometry {
    fn into_geometry(self) -> Geometry {
        match self {
            RawGeometry::Polygon { coordinates } => {
                Geometry::Polygon(coordinates.into_iter().map(ring_from_raw).collect())
            }
            RawGeometry::MultiPolygon { coordinates } => Geometry::MultiPolygon(
                coordinates
                    .into_iter()
                    .map(|poly| poly.into_iter().map(ring_from_raw).collect())
                    .collect(),
            ),
            RawGeometry::Other => Geometry::Unsupported,
        }
    }
}

fn ring_from_raw(raw: RawRing) -> Ring {
    raw.into_iter()
        .filter_map(|pos| match pos.as_slice() {
            [lon, lat, ..] => Some((*lon, *lat)),
            _ => None,
        })
        .collect()
}

/// Load-time check of how the dataset's features bind to registry units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingReport {
    /// Indices of features with no usable identifier property.
    pub unbound_features: Vec<usize>,
    /// Identifiers found on features but absent from the registry.
    pub unknown_units: Vec<String>,
    /// Registry units that no feature draws.
    pub missing_units: Vec<String>,
    /// Identifiers drawn by more than one feature, with their feature count.
    pub repeated_units: BTreeMap<String, usize>,
}

impl BindingReport {
    pub fn is_clean(&self) -> bool {
        self.unbound_features.is_empty()
            && self.unknown_units.is_empty()
            && self.missing_units.is_empty()
    }

    /// One human-readable line per problem, for the log.
    pub fn warnings(&self, unit_type: &str) -> Vec<String> {
        let mut out = Vec::new();
        if !self.unbound_features.is_empty() {
            out.push(format!(
                "{} feature(s) have no `{unit_type}` property and cannot be selected",
                self.unbound_features.len()
            ));
        }
        for unit in &self.unknown_units {
            out.push(format!("feature {unit_type} `{unit}` is not in the unit registry"));
        }
        for unit in &self.missing_units {
            out.push(format!("registry {unit_type} `{unit}` has no boundary feature"));
        }
        out
    }
}

pub fn validate_bindings(
    dataset: &Dataset,
    unit_type: &str,
    registry: &UnitRegistry,
) -> BindingReport {
    let mut report = BindingReport::default();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, feature) in dataset.features.iter().enumerate() {
        match resolve_unit_identifier(feature, unit_type) {
            Some(id) => *counts.entry(id).or_default() += 1,
            None => report.unbound_features.push(idx),
        }
    }

    let drawn: BTreeSet<&str> = counts.keys().copied().collect();
    report.unknown_units = drawn
        .iter()
        .filter(|id| !registry.contains(id))
        .map(|id| (*id).to_owned())
        .collect();
    report.missing_units = registry
        .ids()
        .filter(|id| !drawn.contains(id))
        .map(str::to_owned)
        .collect();
    report.repeated_units = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, n)| (id.to_owned(), n))
        .collect();
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"county": "Kent"},
                "geometry": {"type": "Polygon", "coordinates": [[[0.5, 51.0], [1.4, 51.2], [1.0, 51.5, 12.0], [0.5, 51.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"county": "Isle of Wight"},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[-1.5, 50.6], [-1.1, 50.7], [-1.3, 50.8], [-1.5, 50.6]]]]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Lundy"},
                "geometry": {"type": "Point", "coordinates": [-4.67, 51.18]}
            },
            {
                "type": "Feature",
                "properties": null,
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn parses_feature_collection() {
        let dataset = Dataset::from_json(COUNTIES).expect("valid geojson");
        assert_eq!(dataset.len(), 4);

        let Geometry::Polygon(rings) = &dataset.features[0].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0][2], (1.0, 51.5));

        assert!(matches!(dataset.features[1].geometry, Geometry::MultiPolygon(_)));
        assert_eq!(dataset.features[2].geometry, Geometry::Unsupported);
        assert!(dataset.features[3].properties.is_empty());
    }

    #[test]
    fn polygons_iterates_both_shapes() {
        let dataset = Dataset::from_json(COUNTIES).expect("valid geojson");
        assert_eq!(dataset.features[0].geometry.polygons().count(), 1);
        assert_eq!(dataset.features[1].geometry.polygons().count(), 1);
        assert_eq!(dataset.features[2].geometry.polygons().count(), 0);
    }

    #[test]
    fn resolves_identifier_from_configured_property() {
        let dataset = Dataset::from_json(COUNTIES).expect("valid geojson");
        assert_eq!(
            resolve_unit_identifier(&dataset.features[0], "county"),
            Some("Kent")
        );
        assert_eq!(resolve_unit_identifier(&dataset.features[2], "county"), None);
        assert_eq!(resolve_unit_identifier(&dataset.features[3], "county"), None);
        assert_eq!(
            resolve_unit_identifier(&dataset.features[2], "name"),
            Some("Lundy")
        );
    }

    #[test]
    fn non_string_and_blank_properties_do_not_resolve() {
        let mut props = Map::new();
        props.insert("county".into(), Value::from(7));
        let numeric = Feature {
            properties: props,
            geometry: Geometry::Unsupported,
        };
        assert_eq!(resolve_unit_identifier(&numeric, "county"), None);

        let mut props = Map::new();
        props.insert("county".into(), Value::from("   "));
        let blank = Feature {
            properties: props,
            geometry: Geometry::Unsupported,
        };
        assert_eq!(resolve_unit_identifier(&blank, "county"), None);
    }

    #[test]
    fn binding_report_lists_every_mismatch() {
        let dataset = Dataset::from_json(COUNTIES).expect("valid geojson");
        let registry = UnitRegistry::from_ids(["Kent", "Devon"]);

        let report = validate_bindings(&dataset, "county", &registry);
        assert_eq!(report.unbound_features, vec![2, 3]);
        assert_eq!(report.unknown_units, vec!["Isle of Wight".to_owned()]);
        assert_eq!(report.missing_units, vec!["Devon".to_owned()]);
        assert!(report.repeated_units.is_empty());
        assert!(!report.is_clean());
        assert_eq!(report.warnings("county").len(), 3);
    }

    #[test]
    fn clean_binding_has_no_warnings() {
        let dataset = Dataset::from_json(COUNTIES).expect("valid geojson");
        let dataset = Dataset {
            features: dataset.features.into_iter().take(2).collect(),
        };
        let registry = UnitRegistry::from_ids(["Kent", "Isle of Wight"]);

        let report = validate_bindings(&dataset, "county", &registry);
        assert!(report.is_clean());
        assert!(report.warnings("county").is_empty());
    }

    #[test]
    fn repeated_units_are_counted() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"county": "Kent"}, "geometry": null},
            {"type": "Feature", "properties": {"county": "Kent"}, "geometry": null}
        ]}"#;
        let dataset = Dataset::from_json(text).expect("valid geojson");
        let report = validate_bindings(&dataset, "county", &UnitRegistry::from_ids(["Kent"]));
        assert_eq!(report.repeated_units.get("Kent"), Some(&2));
        assert!(report.is_clean());
    }

    #[test]
    fn rejects_unknown_document_type() {
        let err = Dataset::from_json(r#"{"type": "Point", "coordinates": [0, 0]}"#).unwrap_err();
        assert!(err.contains("invalid boundary dataset"), "unexpected: {err}");
    }
}
