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

//! Bridges to foreign shape objects
//!
//! [GeoShape] mirrors the `__geo_interface__` convention: anything that
//! can describe itself as a GeoJSON-shaped map (`type` plus `coordinates`
//! or `geometries`) can become a [Geometry], and a [Geometry] produces
//! that same map shape. Conversions to and from the `geo-types` model are
//! available behind the `geo` cargo feature; `geo-types` is 2-D, so Z and
//! M are dropped on the way out.

use serde_json::Value;

use crate::error::GeometryError;
use crate::geometry::Geometry;

/// A foreign object that can describe itself as a GeoJSON-shaped map
pub trait GeoShape {
    /// The GeoJSON-shaped map for this object
    fn geo_interface(&self) -> Result<Value, GeometryError>;
}

impl GeoShape for Geometry {
    fn geo_interface(&self) -> Result<Value, GeometryError> {
        self.geojson()
    }
}

impl GeoShape for Value {
    fn geo_interface(&self) -> Result<Value, GeometryError> {
        Ok(self.clone())
    }
}

impl Geometry {
    /// Build a geometry from anything exposing a GeoJSON-shaped map
    ///
    /// `srid` overrides any SRID the map itself declares.
    pub fn from_shape(shape: &impl GeoShape, srid: Option<i32>) -> Result<Self, GeometryError> {
        Self::from_geojson_with_srid(&shape.geo_interface()?, srid)
    }
}

#[cfg(feature = "geo")]
mod geo_interop {
    use super::*;
    use crate::geometry::{
        GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
    };

    fn point_from_geo(point: &geo_types::Point<f64>) -> Result<Point, GeometryError> {
        Point::new(&[point.x(), point.y()], None)
    }

    fn linestring_from_geo(
        line: &geo_types::LineString<f64>,
    ) -> Result<LineString, GeometryError> {
        let vertices = line
            .coords()
            .map(|c| Point::new(&[c.x, c.y], None))
            .collect::<Result<Vec<_>, _>>()?;
        LineString::new(vertices, None)
    }

    fn polygon_from_geo(polygon: &geo_types::Polygon<f64>) -> Result<Polygon, GeometryError> {
        let mut rings = vec![linestring_from_geo(polygon.exterior())?];
        for interior in polygon.interiors() {
            rings.push(linestring_from_geo(interior)?);
        }
        Polygon::new(rings, None)
    }

    impl TryFrom<&geo_types::Geometry<f64>> for Geometry {
        type Error = GeometryError;

        fn try_from(value: &geo_types::Geometry<f64>) -> Result<Self, Self::Error> {
            Ok(match value {
                geo_types::Geometry::Point(p) => Geometry::Point(point_from_geo(p)?),
                geo_types::Geometry::Line(line) => {
                    let vertices = vec![
                        Point::new(&[line.start.x, line.start.y], None)?,
                        Point::new(&[line.end.x, line.end.y], None)?,
                    ];
                    Geometry::LineString(LineString::new(vertices, None)?)
                }
                geo_types::Geometry::LineString(ls) => {
                    Geometry::LineString(linestring_from_geo(ls)?)
                }
                geo_types::Geometry::Polygon(pg) => Geometry::Polygon(polygon_from_geo(pg)?),
                geo_types::Geometry::Rect(rect) => {
                    Geometry::Polygon(polygon_from_geo(&rect.to_polygon())?)
                }
                geo_types::Geometry::Triangle(tri) => {
                    Geometry::Polygon(polygon_from_geo(&tri.to_polygon())?)
                }
                geo_types::Geometry::MultiPoint(mp) => {
                    let members = mp
                        .iter()
                        .map(point_from_geo)
                        .collect::<Result<Vec<_>, _>>()?;
                    Geometry::MultiPoint(MultiPoint::new(members, None)?)
                }
                geo_types::Geometry::MultiLineString(ml) => {
                    let members = ml
                        .iter()
                        .map(linestring_from_geo)
                        .collect::<Result<Vec<_>, _>>()?;
                    Geometry::MultiLineString(MultiLineString::new(members, None)?)
                }
                geo_types::Geometry::MultiPolygon(mpg) => {
                    let members = mpg
                        .iter()
                        .map(polygon_from_geo)
                        .collect::<Result<Vec<_>, _>>()?;
                    Geometry::MultiPolygon(MultiPolygon::new(members, None)?)
                }
                geo_types::Geometry::GeometryCollection(gc) => {
                    let members = gc
                        .iter()
                        .map(Geometry::try_from)
                        .collect::<Result<Vec<_>, _>>()?;
                    Geometry::GeometryCollection(GeometryCollection::new(members, None)?)
                }
            })
        }
    }

    fn point_to_geo(point: &Point) -> Result<geo_types::Point<f64>, GeometryError> {
        Ok(geo_types::Point::new(point.x()?, point.y()?))
    }

    fn linestring_to_geo(
        line: &LineString,
    ) -> Result<geo_types::LineString<f64>, GeometryError> {
        let coords = line
            .vertices()?
            .iter()
            .map(|v| Ok(geo_types::Coord { x: v.x()?, y: v.y()? }))
            .collect::<Result<Vec<_>, GeometryError>>()?;
        Ok(geo_types::LineString::new(coords))
    }

    fn polygon_to_geo(polygon: &Polygon) -> Result<geo_types::Polygon<f64>, GeometryError> {
        let exterior = linestring_to_geo(polygon.exterior()?)?;
        let interiors = polygon
            .interiors()?
            .iter()
            .map(linestring_to_geo)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(geo_types::Polygon::new(exterior, interiors))
    }

    impl TryFrom<&Geometry> for geo_types::Geometry<f64> {
        type Error = GeometryError;

        fn try_from(value: &Geometry) -> Result<Self, Self::Error> {
            Ok(match value {
                Geometry::Point(p) => geo_types::Geometry::Point(point_to_geo(p)?),
                Geometry::LineString(ls) => {
                    geo_types::Geometry::LineString(linestring_to_geo(ls)?)
                }
                Geometry::Polygon(pg) => geo_types::Geometry::Polygon(polygon_to_geo(pg)?),
                Geometry::MultiPoint(mp) => {
                    let members = mp
                        .points()?
                        .iter()
                        .map(point_to_geo)
                        .collect::<Result<Vec<_>, _>>()?;
                    geo_types::Geometry::MultiPoint(geo_types::MultiPoint(members))
                }
                Geometry::MultiLineString(ml) => {
                    let members = ml
                        .linestrings()?
                        .iter()
                        .map(linestring_to_geo)
                        .collect::<Result<Vec<_>, _>>()?;
                    geo_types::Geometry::MultiLineString(geo_types::MultiLineString(members))
                }
                Geometry::MultiPolygon(mpg) => {
                    let members = mpg
                        .polygons()?
                        .iter()
                        .map(polygon_to_geo)
                        .collect::<Result<Vec<_>, _>>()?;
                    geo_types::Geometry::MultiPolygon(geo_types::MultiPolygon(members))
                }
                Geometry::GeometryCollection(gc) => {
                    let members = gc
                        .geometries()?
                        .iter()
                        .map(geo_types::Geometry::try_from)
                        .collect::<Result<Vec<_>, _>>()?;
                    geo_types::Geometry::GeometryCollection(geo_types::GeometryCollection(
                        members,
                    ))
                }
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn geometry_exposes_its_own_interface() {
        let geom = Geometry::from_wkt("POINT (1 2)").unwrap();
        let map = geom.geo_interface().unwrap();
        assert_eq!(map, json!({"type": "Point", "coordinates": [1.0, 2.0]}));
    }

    #[test]
    fn shape_roundtrip() {
        let geom = Geometry::from_wkt("MULTIPOINT (0 0, 1 1)").unwrap();
        let again = Geometry::from_shape(&geom, None).unwrap();
        assert_eq!(geom, again);
    }

    #[test]
    fn shape_from_raw_map_with_srid() {
        let map = json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]});
        let geom = Geometry::from_shape(&map, Some(3857)).unwrap();
        assert_eq!(geom.srid(), Some(3857));
        assert_eq!(geom.geometry_type(), crate::types::GeometryType::LineString);
    }

    #[cfg(feature = "geo")]
    #[test]
    fn geo_types_roundtrip() {
        let geo_geom = geo_types::Geometry::Point(geo_types::Point::new(99.0, -99.0));
        let geom = Geometry::try_from(&geo_geom).unwrap();
        match &geom {
            Geometry::Point(p) => {
                assert_eq!(p.x().unwrap(), 99.0);
                assert_eq!(p.y().unwrap(), -99.0);
            }
            other => panic!("expected a point, got {other:?}"),
        }
        let back = geo_types::Geometry::try_from(&geom).unwrap();
        assert_eq!(back, geo_geom);
    }

    #[cfg(feature = "geo")]
    #[test]
    fn geo_types_drops_z() {
        let geom = Geometry::from_wkt("POINT Z (1 2 3)").unwrap();
        let geo_geom = geo_types::Geometry::try_from(&geom).unwrap();
        assert_eq!(
            geo_geom,
            geo_types::Geometry::Point(geo_types::Point::new(1.0, 2.0))
        );
    }
}
