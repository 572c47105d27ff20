//! TopoJSON topologies: shared, optionally quantized arcs stitched back into
//! polygon rings.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::geo::{Feature, Geometry, Position, Ring};

#[derive(Debug, Deserialize)]
pub(crate) struct Topology {
    #[serde(default)]
    transform: Option<Quantization>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: BTreeMap<String, TopoObject>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Quantization {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TopoObject {
    GeometryCollection {
        #[serde(default)]
        geometries: Vec<TopoObject>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    #[serde(other)]
    Other,
}

/// Flatten every object of the topology into features, in object-name order.
pub(crate) fn to_features(topology: Topology) -> Result<Vec<Feature>, String> {
    let arcs = decode_arcs(&topology.arcs, topology.transform);
    let mut features = Vec::new();
    for object in topology.objects.into_values() {
        collect(object, &arcs, &mut features)?;
    }
    Ok(features)
}

fn collect(object: TopoObject, arcs: &[Vec<Position>], out: &mut Vec<Feature>) -> Result<(), String> {
    match object {
        TopoObject::GeometryCollection { geometries } => {
            for geometry in geometries {
                collect(geometry, arcs, out)?;
            }
        }
        TopoObject::Polygon {
            arcs: rings,
            properties,
        } => out.push(Feature {
            properties: properties.unwrap_or_default(),
            geometry: Geometry::Polygon(stitch_polygon(&rings, arcs)?),
        }),
        TopoObject::MultiPolygon {
            arcs: polygons,
            properties,
        } => {
            let polygons = polygons
                .iter()
                .map(|rings| stitch_polygon(rings, arcs))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(Feature {
                properties: properties.unwrap_or_default(),
                geometry: Geometry::MultiPolygon(polygons),
            });
        }
        TopoObject::Other => out.push(Feature {
            properties: Map::new(),
            geometry: Geometry::Unsupported,
        }),
    }
    Ok(())
}

fn decode_arcs(raw: &[Vec<Vec<f64>>], transform: Option<Quantization>) -> Vec<Vec<Position>> {
    raw.iter()
        .map(|arc| {
            let mut x = 0.0;
            let mut y = 0.0;
            arc.iter()
                .filter_map(|pos| match pos.as_slice() {
                    [a, b, ..] => Some((*a, *b)),
                    _ => None,
                })
                .map(|(a, b)| match transform {
                    // Quantized arcs are delta-encoded.
                    Some(q) => {
                        x += a;
                        y += b;
                        (x * q.scale[0] + q.translate[0], y * q.scale[1] + q.translate[1])
                    }
                    None => (a, b),
                })
                .collect()
        })
        .collect()
}

fn stitch_polygon(rings: &[Vec<i64>], arcs: &[Vec<Position>]) -> Result<Vec<Ring>, String> {
    rings.iter().map(|ring| stitch_ring(ring, arcs)).collect()
}

/// Join arcs end to end; a negative index `i` means arc `!i` reversed.
fn stitch_ring(indices: &[i64], arcs: &[Vec<Position>]) -> Result<Ring, String> {
    let mut ring: Ring = Vec::new();
    for &index in indices {
        let (slot, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(slot)
            .ok()
            .and_then(|slot| arcs.get(slot))
            .ok_or_else(|| format!("topology references missing arc {index}"))?;
        // Consecutive arcs share an endpoint.
        ring.pop();
        if reversed {
            ring.extend(arc.iter().rev().copied());
        } else {
            ring.extend(arc.iter().copied());
        }
    }
    Ok(ring)
}
