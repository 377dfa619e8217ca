// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! GeoJSON reading and writing over a [serde_json::Value] tree
//!
//! The shape follows RFC 7946: positions carry 2 or 3 numbers, the M
//! dimension does not exist and is dropped on write, and a
//! `GeometryCollection` uses a `geometries` member. RFC 7946 implies
//! WGS-84, but a document without a `crs` member is read as having no
//! SRID; an explicit constructor SRID always wins over a `crs` member.

use std::str::FromStr;

use serde_json::{json, Map, Number, Value};

use crate::error::GeometryError;
use crate::geometry::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};
use crate::types::GeometryType;

/// Render a geometry as a GeoJSON tree
pub(crate) fn to_value(geometry: &Geometry) -> Result<Value, GeometryError> {
    match geometry {
        Geometry::GeometryCollection(gc) => {
            let members = gc
                .geometries()?
                .iter()
                .map(to_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(json!({ "type": "GeometryCollection", "geometries": members }))
        }
        other => Ok(json!({
            "type": other.geometry_type().geojson_id(),
            "coordinates": coordinates(other)?,
        })),
    }
}

fn coordinates(geometry: &Geometry) -> Result<Value, GeometryError> {
    match geometry {
        Geometry::Point(p) => position(p),
        Geometry::LineString(ls) => positions(ls.vertices()?),
        Geometry::Polygon(pg) => ring_positions(pg.rings()?),
        Geometry::MultiPoint(mp) => positions(mp.points()?),
        Geometry::MultiLineString(ml) => {
            let members = ml
                .linestrings()?
                .iter()
                .map(|ls| positions(ls.vertices()?))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(members))
        }
        Geometry::MultiPolygon(mp) => {
            let members = mp
                .polygons()?
                .iter()
                .map(|pg| ring_positions(pg.rings()?))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(members))
        }
        Geometry::GeometryCollection(_) => Err(GeometryError::Geojson(
            "a GeometryCollection has no coordinates member".to_string(),
        )),
    }
}

fn position(point: &Point) -> Result<Value, GeometryError> {
    let mut values = vec![number(point.x()?)?, number(point.y()?)?];
    if let Some(z) = point.z()? {
        values.push(number(z)?);
    }
    Ok(Value::Array(values))
}

fn positions(points: &[Point]) -> Result<Value, GeometryError> {
    Ok(Value::Array(
        points.iter().map(position).collect::<Result<Vec<_>, _>>()?,
    ))
}

fn ring_positions(rings: &[LineString]) -> Result<Value, GeometryError> {
    Ok(Value::Array(
        rings
            .iter()
            .map(|ring| positions(ring.vertices()?))
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

fn number(value: f64) -> Result<Value, GeometryError> {
    Number::from_f64(value).map(Value::Number).ok_or_else(|| {
        GeometryError::Geojson(format!("cannot encode non-finite coordinate {value}"))
    })
}

/// Build a geometry from a GeoJSON tree
///
/// `srid` overrides anything a `crs` member declares; with neither, the
/// geometry has no SRID.
pub(crate) fn from_value(value: &Value, srid: Option<i32>) -> Result<Geometry, GeometryError> {
    let object = value
        .as_object()
        .ok_or_else(|| GeometryError::Geojson("expected a JSON object".to_string()))?;
    let type_name = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeometryError::Geojson("missing \"type\" member".to_string()))?;
    let geometry_type = GeometryType::from_str(type_name)?;
    let srid = match srid {
        Some(s) => Some(s),
        None => crs_srid(object)?,
    };

    if geometry_type == GeometryType::GeometryCollection {
        let members = object
            .get("geometries")
            .ok_or_else(|| GeometryError::Geojson("missing \"geometries\" member".to_string()))?
            .as_array()
            .ok_or_else(|| {
                GeometryError::Geojson("\"geometries\" must be an array".to_string())
            })?
            .iter()
            .map(|member| from_value(member, None))
            .collect::<Result<Vec<_>, _>>()?;
        return GeometryCollection::new(members, srid).map(Geometry::GeometryCollection);
    }

    let coordinates = object
        .get("coordinates")
        .ok_or_else(|| GeometryError::Geojson("missing \"coordinates\" member".to_string()))?;
    let mut arity = None;
    match geometry_type {
        GeometryType::Point => {
            let values = position_values(coordinates, &mut arity)?;
            Point::with_dims(&values, srid, false, false).map(Geometry::Point)
        }
        GeometryType::LineString => {
            let vertices = position_list(coordinates, &mut arity)?;
            LineString::new(vertices, srid).map(Geometry::LineString)
        }
        GeometryType::Polygon => {
            let rings = ring_list(coordinates, &mut arity)?;
            Polygon::new(rings, srid).map(Geometry::Polygon)
        }
        GeometryType::MultiPoint => {
            let members = position_list(coordinates, &mut arity)?;
            MultiPoint::new(members, srid).map(Geometry::MultiPoint)
        }
        GeometryType::MultiLineString => {
            let members = array_of(coordinates)?
                .iter()
                .map(|member| {
                    position_list(member, &mut arity).and_then(|v| LineString::new(v, None))
                })
                .collect::<Result<Vec<_>, _>>()?;
            MultiLineString::new(members, srid).map(Geometry::MultiLineString)
        }
        GeometryType::MultiPolygon => {
            let members = array_of(coordinates)?
                .iter()
                .map(|member| ring_list(member, &mut arity).and_then(|r| Polygon::new(r, None)))
                .collect::<Result<Vec<_>, _>>()?;
            MultiPolygon::new(members, srid).map(Geometry::MultiPolygon)
        }
        GeometryType::GeometryCollection => unreachable!("handled above"),
    }
}

fn array_of(value: &Value) -> Result<&Vec<Value>, GeometryError> {
    value
        .as_array()
        .ok_or_else(|| GeometryError::Geojson("expected a coordinate array".to_string()))
}

/// One position: 2 or 3 numbers, holding the whole document to a single
/// arity
fn position_values(
    value: &Value,
    arity: &mut Option<usize>,
) -> Result<Vec<f64>, GeometryError> {
    let values = array_of(value)?
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| GeometryError::Geojson("coordinate is not a number".to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() < 2 || values.len() > 3 {
        return Err(GeometryError::Geojson(format!(
            "a position needs 2 or 3 values, got {}",
            values.len()
        )));
    }
    match *arity {
        Some(expected) if expected != values.len() => Err(GeometryError::Geojson(
            "mixed coordinate dimensions".to_string(),
        )),
        _ => {
            *arity = Some(values.len());
            Ok(values)
        }
    }
}

fn position_list(
    value: &Value,
    arity: &mut Option<usize>,
) -> Result<Vec<Point>, GeometryError> {
    array_of(value)?
        .iter()
        .map(|v| {
            position_values(v, arity).and_then(|values| Point::with_dims(&values, None, false, false))
        })
        .collect()
}

fn ring_list(
    value: &Value,
    arity: &mut Option<usize>,
) -> Result<Vec<LineString>, GeometryError> {
    array_of(value)?
        .iter()
        .map(|v| position_list(v, arity).and_then(|vertices| LineString::new(vertices, None)))
        .collect()
}

/// Read an SRID from a legacy `crs` member, e.g.
/// `{"type":"name","properties":{"name":"EPSG:4326"}}` or the OGC URN form
fn crs_srid(object: &Map<String, Value>) -> Result<Option<i32>, GeometryError> {
    let crs = match object.get("crs") {
        None | Some(Value::Null) => return Ok(None),
        Some(crs) => crs,
    };
    let name = crs
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| GeometryError::Geojson("crs member without a name".to_string()))?;
    let code = name.rsplit(':').next().unwrap_or(name);
    code.parse::<i32>().map(Some).map_err(|_| {
        GeometryError::Geojson(format!("cannot read an SRID from crs name '{name}'"))
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn point_roundtrip() {
        let doc = json!({"type": "Point", "coordinates": [0.0, 0.0]});
        let geom = from_value(&doc, None).unwrap();
        assert_eq!(geom.geometry_type(), GeometryType::Point);
        // no crs member, no override: no SRID
        assert_eq!(geom.srid(), None);
        assert_eq!(geom.geojson().unwrap(), doc);
    }

    #[test]
    fn linestring_roundtrip() {
        let doc = json!({"type": "LineString", "coordinates": [[107.0, 60.0], [102.0, 59.0]]});
        let geom = from_value(&doc, None).unwrap();
        assert_eq!(geom.geometry_type(), GeometryType::LineString);
        assert_eq!(geom.geojson().unwrap(), doc);
    }

    #[test]
    fn polygon_roundtrip() {
        let doc = json!({
            "type": "Polygon",
            "coordinates": [[[100.0, 0.0], [101.0, 0.0], [101.0, 1.0], [100.0, 1.0], [100.0, 0.0]]]
        });
        let geom = from_value(&doc, None).unwrap();
        assert_eq!(geom.geometry_type(), GeometryType::Polygon);
        assert_eq!(geom.geojson().unwrap(), doc);
    }

    #[test]
    fn polygon_with_hole() {
        let geom = Geometry::from_wkt(
            "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (4 4, 6 4, 6 6, 4 6, 4 4))",
        )
        .unwrap();
        let coords = geom.geojson().unwrap()["coordinates"].clone();
        assert_eq!(
            coords,
            json!([
                [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
            ])
        );
    }

    #[test]
    fn multi_roundtrips() {
        let docs = [
            json!({"type": "MultiPoint", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}),
            json!({"type": "MultiLineString", "coordinates": [
                [[0.1, 0.2, 0.3], [1.1, 1.2, 1.3]],
                [[2.1, 2.2, 2.3], [3.1, 3.2, 3.3]]
            ]}),
            json!({"type": "MultiPolygon", "coordinates": [
                [[[1.0, 0.0], [111.0, 0.0], [101.0, 1.0], [100.0, 1.0], [1.0, 0.0]]],
                [[[100.0, 0.0], [101.0, 0.0], [101.0, 1.0], [100.0, 1.0], [100.0, 0.0]]]
            ]}),
        ];
        for doc in docs {
            let geom = from_value(&doc, None).unwrap();
            assert_eq!(geom.geojson().unwrap(), doc, "{doc}");
        }
    }

    #[test]
    fn collection_roundtrip() {
        let doc = json!({"type": "GeometryCollection", "geometries": [
            {"type": "Point", "coordinates": [10.0, 0.0]},
            {"type": "LineString", "coordinates": [[11.0, 0.0], [12.0, 1.0]]}
        ]});
        let geom = from_value(&doc, None).unwrap();
        assert_eq!(geom.geometry_type(), GeometryType::GeometryCollection);
        assert_eq!(geom.geojson().unwrap(), doc);
    }

    #[test]
    fn z_kept_m_dropped() {
        let p = Point::new(&[0.0, 1.0, 2.0, 3.0], None).unwrap();
        let doc = Geometry::Point(p).geojson().unwrap();
        assert_eq!(doc, json!({"type": "Point", "coordinates": [0.0, 1.0, 2.0]}));

        let p = Point::with_dims(&[0.0, 1.0, 9.0], None, false, true).unwrap();
        let doc = Geometry::Point(p).geojson().unwrap();
        assert_eq!(doc, json!({"type": "Point", "coordinates": [0.0, 1.0]}));
    }

    #[test]
    fn srid_override_and_crs() {
        let doc = json!({"type": "Point", "coordinates": [0.0, 0.0]});
        let geom = from_value(&doc, Some(3857)).unwrap();
        assert_eq!(geom.srid(), Some(3857));

        let doc = json!({
            "type": "Point",
            "coordinates": [0.0, 0.0],
            "crs": {"type": "name", "properties": {"name": "EPSG:4326"}}
        });
        let geom = from_value(&doc, None).unwrap();
        assert_eq!(geom.srid(), Some(4326));
        // the explicit argument wins over the crs member
        let geom = from_value(&doc, Some(3857)).unwrap();
        assert_eq!(geom.srid(), Some(3857));

        let doc = json!({
            "type": "Point",
            "coordinates": [0.0, 0.0],
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::4326"}}
        });
        let geom = from_value(&doc, None).unwrap();
        assert_eq!(geom.srid(), Some(4326));
    }

    #[test]
    fn unsupported_type() {
        let doc = json!({"type": "Hello", "coordinates": [0.0, 0.0]});
        assert!(matches!(
            from_value(&doc, None),
            Err(GeometryError::Geojson(_))
        ));
    }

    #[test]
    fn missing_members() {
        assert!(matches!(
            from_value(&json!({"coordinates": [0.0, 0.0]}), None),
            Err(GeometryError::Geojson(_))
        ));
        assert!(matches!(
            from_value(&json!({"type": "Point"}), None),
            Err(GeometryError::Geojson(_))
        ));
        assert!(matches!(
            from_value(&json!({"type": "GeometryCollection"}), None),
            Err(GeometryError::Geojson(_))
        ));
        assert!(matches!(
            from_value(&json!([1, 2]), None),
            Err(GeometryError::Geojson(_))
        ));
    }

    #[test]
    fn bad_positions() {
        // arity outside 2..=3
        let doc = json!({"type": "Point", "coordinates": [0.0]});
        assert!(from_value(&doc, None).is_err());
        let doc = json!({"type": "Point", "coordinates": [0.0, 1.0, 2.0, 3.0]});
        assert!(from_value(&doc, None).is_err());

        // mixed arities within one geometry
        let doc = json!({"type": "LineString", "coordinates": [[0.0, 1.0], [1.0, 2.0, 3.0]]});
        assert!(matches!(
            from_value(&doc, None),
            Err(GeometryError::Geojson(_))
        ));

        // non-numeric coordinate
        let doc = json!({"type": "Point", "coordinates": [0.0, "east"]});
        assert!(from_value(&doc, None).is_err());
    }

    #[test]
    fn mixed_arity_across_multi_members() {
        let doc = json!({"type": "MultiLineString", "coordinates": [
            [[0.0, 1.0], [1.0, 2.0]],
            [[0.0, 1.0, 2.0], [1.0, 2.0, 3.0]]
        ]});
        assert!(matches!(
            from_value(&doc, None),
            Err(GeometryError::Geojson(_))
        ));
    }
}
