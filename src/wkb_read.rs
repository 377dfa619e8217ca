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

//! (E)WKB decoding
//!
//! Two entry points: [read_geometry] consumes at most the outer endian
//! byte, type word and optional SRID (9 bytes) and leaves the rest of the
//! buffer attached to the returned geometry; the `*_body` functions decode
//! that remainder when a structural read first needs it. Every nested
//! record picks its own endianness, must match its container's Z/M flags
//! and must not carry an SRID of its own.

use crate::cursor::ByteCursor;
use crate::error::GeometryError;
use crate::geometry::{
    GeomMeta, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, PointCoords, Polygon, RawWkb,
};
use crate::types::{GeometryType, TypeCode};

/// Decoded outer header of a WKB record
pub(crate) struct WkbHeader {
    pub(crate) type_code: TypeCode,
    pub(crate) srid: Option<i32>,
    pub(crate) body_offset: usize,
    pub(crate) order: crate::cursor::ByteOrder,
}

/// Read just the header of the outermost record
pub(crate) fn read_header(buf: &[u8]) -> Result<WkbHeader, GeometryError> {
    let mut cur = ByteCursor::new(buf);
    cur.read_byte_order()?;
    let type_code = TypeCode::decode(cur.read_u32()?)?;
    let srid = if type_code.has_srid {
        Some(cur.read_i32()?)
    } else {
        None
    };
    Ok(WkbHeader {
        type_code,
        srid,
        body_offset: cur.offset(),
        order: cur.order(),
    })
}

/// Build a geometry from a WKB record, decoding only its header
///
/// The buffer is retained by the geometry: it serves byte-for-byte WKB
/// emission until the first structural read or mutation.
pub(crate) fn read_geometry(buf: Vec<u8>) -> Result<Geometry, GeometryError> {
    let header = read_header(&buf)?;
    let meta = GeomMeta {
        srid: header.srid,
        dimz: header.type_code.dimz,
        dimm: header.type_code.dimm,
    };
    let raw = RawWkb {
        buf,
        body_offset: header.body_offset,
        order: header.order,
        has_srid_flag: header.type_code.has_srid,
    };
    Ok(match header.type_code.geometry_type {
        GeometryType::Point => Geometry::Point(Point::lazy(meta, raw)),
        GeometryType::LineString => Geometry::LineString(LineString::lazy(meta, raw)),
        GeometryType::Polygon => Geometry::Polygon(Polygon::lazy(meta, raw)),
        GeometryType::MultiPoint => Geometry::MultiPoint(MultiPoint::lazy(meta, raw)),
        GeometryType::MultiLineString => {
            Geometry::MultiLineString(MultiLineString::lazy(meta, raw))
        }
        GeometryType::MultiPolygon => Geometry::MultiPolygon(MultiPolygon::lazy(meta, raw)),
        GeometryType::GeometryCollection => {
            Geometry::GeometryCollection(GeometryCollection::lazy(meta, raw))
        }
    })
}

fn body_cursor(raw: &RawWkb) -> ByteCursor<'_> {
    ByteCursor::resume(&raw.buf, raw.body_offset, raw.order)
}

pub(crate) fn point_body(raw: &RawWkb, meta: &GeomMeta) -> Result<PointCoords, GeometryError> {
    read_coords(&mut body_cursor(raw), meta)
}

pub(crate) fn linestring_body(
    raw: &RawWkb,
    meta: &GeomMeta,
) -> Result<Vec<Point>, GeometryError> {
    read_vertices(&mut body_cursor(raw), meta)
}

pub(crate) fn polygon_body(
    raw: &RawWkb,
    meta: &GeomMeta,
) -> Result<Vec<LineString>, GeometryError> {
    read_rings(&mut body_cursor(raw), meta)
}

pub(crate) fn multipoint_body(raw: &RawWkb, meta: &GeomMeta) -> Result<Vec<Point>, GeometryError> {
    let mut cur = body_cursor(raw);
    let count = cur.read_u32()?;
    let mut members = Vec::new();
    for _ in 0..count {
        let child = read_child_header(&mut cur, meta)?;
        expect_child_type(child, GeometryType::Point, GeometryType::MultiPoint)?;
        let coords = read_coords(&mut cur, meta)?;
        members.push(Point::ready(member_meta(meta), coords));
    }
    Ok(members)
}

pub(crate) fn multilinestring_body(
    raw: &RawWkb,
    meta: &GeomMeta,
) -> Result<Vec<LineString>, GeometryError> {
    let mut cur = body_cursor(raw);
    let count = cur.read_u32()?;
    let mut members = Vec::new();
    for _ in 0..count {
        let child = read_child_header(&mut cur, meta)?;
        expect_child_type(child, GeometryType::LineString, GeometryType::MultiLineString)?;
        let vertices = read_vertices(&mut cur, meta)?;
        members.push(LineString::ready(member_meta(meta), vertices));
    }
    Ok(members)
}

pub(crate) fn multipolygon_body(
    raw: &RawWkb,
    meta: &GeomMeta,
) -> Result<Vec<Polygon>, GeometryError> {
    let mut cur = body_cursor(raw);
    let count = cur.read_u32()?;
    let mut members = Vec::new();
    for _ in 0..count {
        let child = read_child_header(&mut cur, meta)?;
        expect_child_type(child, GeometryType::Polygon, GeometryType::MultiPolygon)?;
        let rings = read_rings(&mut cur, meta)?;
        members.push(Polygon::ready(member_meta(meta), rings));
    }
    Ok(members)
}

pub(crate) fn collection_body(
    raw: &RawWkb,
    meta: &GeomMeta,
) -> Result<Vec<Geometry>, GeometryError> {
    read_collection_members(&mut body_cursor(raw), meta)
}

fn read_collection_members(
    cur: &mut ByteCursor<'_>,
    meta: &GeomMeta,
) -> Result<Vec<Geometry>, GeometryError> {
    let count = cur.read_u32()?;
    let mut members = Vec::new();
    for _ in 0..count {
        let child = read_child_header(cur, meta)?;
        let child_meta = member_meta(meta);
        members.push(match child.geometry_type {
            GeometryType::Point => {
                Geometry::Point(Point::ready(child_meta, read_coords(cur, meta)?))
            }
            GeometryType::LineString => {
                Geometry::LineString(LineString::ready(child_meta, read_vertices(cur, meta)?))
            }
            GeometryType::Polygon => {
                Geometry::Polygon(Polygon::ready(child_meta, read_rings(cur, meta)?))
            }
            GeometryType::MultiPoint => {
                let raw_members = read_multi_members(cur, meta, GeometryType::Point)?;
                Geometry::MultiPoint(MultiPoint::ready(child_meta, raw_members))
            }
            GeometryType::MultiLineString => {
                let raw_members = read_multi_linestrings(cur, meta)?;
                Geometry::MultiLineString(MultiLineString::ready(child_meta, raw_members))
            }
            GeometryType::MultiPolygon => {
                let raw_members = read_multi_polygons(cur, meta)?;
                Geometry::MultiPolygon(MultiPolygon::ready(child_meta, raw_members))
            }
            GeometryType::GeometryCollection => Geometry::GeometryCollection(
                GeometryCollection::ready(child_meta, read_collection_members(cur, meta)?),
            ),
        });
    }
    Ok(members)
}

fn read_multi_members(
    cur: &mut ByteCursor<'_>,
    meta: &GeomMeta,
    expected: GeometryType,
) -> Result<Vec<Point>, GeometryError> {
    let count = cur.read_u32()?;
    let mut members = Vec::new();
    for _ in 0..count {
        let child = read_child_header(cur, meta)?;
        expect_child_type(child, expected, GeometryType::MultiPoint)?;
        members.push(Point::ready(member_meta(meta), read_coords(cur, meta)?));
    }
    Ok(members)
}

fn read_multi_linestrings(
    cur: &mut ByteCursor<'_>,
    meta: &GeomMeta,
) -> Result<Vec<LineString>, GeometryError> {
    let count = cur.read_u32()?;
    let mut members = Vec::new();
    for _ in 0..count {
        let child = read_child_header(cur, meta)?;
        expect_child_type(child, GeometryType::LineString, GeometryType::MultiLineString)?;
        members.push(LineString::ready(member_meta(meta), read_vertices(cur, meta)?));
    }
    Ok(members)
}

fn read_multi_polygons(
    cur: &mut ByteCursor<'_>,
    meta: &GeomMeta,
) -> Result<Vec<Polygon>, GeometryError> {
    let count = cur.read_u32()?;
    let mut members = Vec::new();
    for _ in 0..count {
        let child = read_child_header(cur, meta)?;
        expect_child_type(child, GeometryType::Polygon, GeometryType::MultiPolygon)?;
        members.push(Polygon::ready(member_meta(meta), read_rings(cur, meta)?));
    }
    Ok(members)
}

fn member_meta(container: &GeomMeta) -> GeomMeta {
    GeomMeta {
        srid: None,
        dimz: container.dimz,
        dimm: container.dimm,
    }
}

/// Read a nested record's endian byte and type word, holding it to the
/// container's dimensionality and forbidding a nested SRID
fn read_child_header(
    cur: &mut ByteCursor<'_>,
    container: &GeomMeta,
) -> Result<TypeCode, GeometryError> {
    let offset = cur.offset();
    cur.read_byte_order()?;
    let code = TypeCode::decode(cur.read_u32()?)?;
    if code.has_srid {
        return Err(GeometryError::Wkb(format!(
            "nested geometry at offset {offset} must not carry an SRID"
        )));
    }
    if code.dimz != container.dimz || code.dimm != container.dimm {
        return Err(GeometryError::Wkb(format!(
            "nested geometry at offset {offset} does not match its container's dimensions"
        )));
    }
    Ok(code)
}

fn expect_child_type(
    child: TypeCode,
    expected: GeometryType,
    container: GeometryType,
) -> Result<(), GeometryError> {
    if child.geometry_type != expected {
        return Err(GeometryError::Wkb(format!(
            "expected a {expected} inside a {container}, got a {}",
            child.geometry_type
        )));
    }
    Ok(())
}

fn read_coords(cur: &mut ByteCursor<'_>, meta: &GeomMeta) -> Result<PointCoords, GeometryError> {
    let x = cur.read_f64()?;
    let y = cur.read_f64()?;
    let z = if meta.dimz { cur.read_f64()? } else { 0.0 };
    let m = if meta.dimm { cur.read_f64()? } else { 0.0 };
    Ok(PointCoords { x, y, z, m })
}

fn read_vertices(cur: &mut ByteCursor<'_>, meta: &GeomMeta) -> Result<Vec<Point>, GeometryError> {
    let count = cur.read_u32()?;
    let mut vertices = Vec::new();
    for _ in 0..count {
        vertices.push(Point::ready(member_meta(meta), read_coords(cur, meta)?));
    }
    Ok(vertices)
}

fn read_rings(cur: &mut ByteCursor<'_>, meta: &GeomMeta) -> Result<Vec<LineString>, GeometryError> {
    let count = cur.read_u32()?;
    let mut rings = Vec::new();
    for _ in 0..count {
        rings.push(LineString::ready(member_meta(meta), read_vertices(cur, meta)?));
    }
    Ok(rings)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Geometry;
    use crate::hex;

    // Fixtures shared with the original PostGIS test data
    const WKB_LN: &str = "0102000000050000000000000040BE40409D640199EB373F400000000080AC3E40BF244710FD1939400000000000503940D2A6484BEB41374000000000801D3740248729C89C832A400000000000833340940338EFAFBB2C40";
    const WKB_PG: &str = "010300000002000000060000000000000000003440000000000080414000000000000024400000000000003E40000000000000244000000000000024400000000000003E4000000000000014400000000000804640000000000000344000000000000034400000000000804140040000000000000000003E40000000000000344000000000000034400000000000002E40000000000000344000000000000039400000000000003E400000000000003440";
    const WKB_MPT: &str = "010400008002000000010100008000000000000059400000000000006940000000000000000001010000800000000000000000000000000000F03F0000000000000000";
    const WKB_MLN: &str = "010500004002000000010200004002000000000000000000000000000000000000000000000000004940000000000000F03F000000000000F03F0000000000003940010200004002000000000000000000F0BF000000000000F0BF000000000000F03F2DB29DEFA7C60140ED0DBE3099AA0A400000000000388F40";
    const WKB_MPG: &str = "01060000000200000001030000000100000004000000000000000000444000000000000044400000000000003440000000000080464000000000008046400000000000003E4000000000000044400000000000004440010300000002000000060000000000000000003440000000000080414000000000000024400000000000003E40000000000000244000000000000024400000000000003E4000000000000014400000000000804640000000000000344000000000000034400000000000804140040000000000000000003E40000000000000344000000000000034400000000000002E40000000000000344000000000000039400000000000003E400000000000003440";
    const WKB_GC: &str = "0107000000020000000101000000000000000000000000000000000000000102000000020000000000000000000000000000000000F03F000000000000F03F000000000000F03F";
    const WKB_MPT_SRID: &str = "0104000020e8030000020000000101000000000000000000000000000000000000000101000000000000000000f03f000000000000f03f";

    fn parse(hexstr: &str) -> Geometry {
        read_geometry(hex::decode(hexstr).unwrap()).unwrap()
    }

    #[test]
    fn point_header_only() {
        let geom = parse("010100000000000000000000000000000000000000");
        assert_eq!(geom.geometry_type(), GeometryType::Point);
        assert_eq!(geom.srid(), None);
        assert!(!geom.has_z() && !geom.has_m());
        assert_eq!(geom.postgis_type(), "geometry(Point)");
        // header reads leave the source bytes in place
        assert!(geom.cached_wkb().is_some());
    }

    #[test]
    fn point_big_endian() {
        let geom = parse("000000000140000000000000004010000000000000");
        match &geom {
            Geometry::Point(p) => {
                assert_eq!(p.x().unwrap(), 2.0);
                assert_eq!(p.y().unwrap(), 4.0);
                assert_eq!(p.z().unwrap(), None);
            }
            other => panic!("expected a point, got {other:?}"),
        }
        // the structural read consumed the retained buffer
        assert!(geom.cached_wkb().is_none());
    }

    #[test]
    fn point_with_srid() {
        let geom = parse("0101000020E610000000000000000000000000000000000000");
        assert_eq!(geom.srid(), Some(4326));
        assert!(!geom.has_z() && !geom.has_m());
        assert_eq!(geom.postgis_type(), "geometry(Point,4326)");
    }

    #[test]
    fn point_dimension_flags() {
        let geom = parse("01010000A0E6100000000000000000000000000000000000000000000000000000");
        assert!(geom.has_z() && !geom.has_m());
        assert_eq!(geom.postgis_type(), "geometry(PointZ,4326)");

        let geom = parse("0101000060E6100000000000000000000000000000000000000000000000000000");
        assert!(!geom.has_z() && geom.has_m());
        assert_eq!(geom.postgis_type(), "geometry(PointM,4326)");

        let geom = parse(
            "01010000E0E61000000000000000000000000000000000000000000000000000000000000000000000",
        );
        assert!(geom.has_z() && geom.has_m());
        assert_eq!(geom.postgis_type(), "geometry(PointZM,4326)");
    }

    #[test]
    fn good_header_bad_body() {
        // valid point header over a truncated payload
        let geom = parse("0000000001000000000000");
        assert_eq!(geom.geometry_type(), GeometryType::Point);
        match &geom {
            Geometry::Point(p) => {
                let err = p.x().unwrap_err();
                assert!(matches!(err, GeometryError::Wkb(_)));
                // the buffer survives a failed decode, so the error repeats
                assert!(p.x().is_err());
            }
            other => panic!("expected a point, got {other:?}"),
        }
    }

    #[test]
    fn linestring() {
        let geom = parse(WKB_LN);
        assert_eq!(geom.geometry_type(), GeometryType::LineString);
        match &geom {
            Geometry::LineString(ls) => {
                let vertices = ls.vertices().unwrap();
                assert_eq!(vertices.len(), 5);
                assert_eq!(vertices[0].x().unwrap(), 33.486328125);
            }
            other => panic!("expected a linestring, got {other:?}"),
        }
    }

    #[test]
    fn polygon() {
        let geom = parse(WKB_PG);
        match &geom {
            Geometry::Polygon(pg) => {
                assert_eq!(pg.rings().unwrap().len(), 2);
                assert_eq!(pg.exterior().unwrap().vertices().unwrap().len(), 6);
                assert_eq!(pg.interiors().unwrap().len(), 1);
            }
            other => panic!("expected a polygon, got {other:?}"),
        }
    }

    #[test]
    fn multipoint_with_z_members() {
        let geom = parse(WKB_MPT);
        assert!(geom.has_z() && !geom.has_m());
        match &geom {
            Geometry::MultiPoint(mp) => {
                let points = mp.points().unwrap();
                assert_eq!(points.len(), 2);
                for p in points {
                    assert!(p.has_z());
                    assert_eq!(p.srid(), None);
                }
                assert_eq!(points[0].x().unwrap(), 100.0);
                assert_eq!(points[0].y().unwrap(), 200.0);
                assert_eq!(points[0].z().unwrap(), Some(0.0));
            }
            other => panic!("expected a multipoint, got {other:?}"),
        }
    }

    #[test]
    fn multilinestring_with_m_members() {
        let geom = parse(WKB_MLN);
        assert!(!geom.has_z() && geom.has_m());
        match &geom {
            Geometry::MultiLineString(ml) => {
                let members = ml.linestrings().unwrap();
                assert_eq!(members.len(), 2);
                for ls in members {
                    assert!(ls.has_m());
                }
            }
            other => panic!("expected a multilinestring, got {other:?}"),
        }
    }

    #[test]
    fn multipolygon() {
        let geom = parse(WKB_MPG);
        match &geom {
            Geometry::MultiPolygon(mp) => {
                assert_eq!(mp.polygons().unwrap().len(), 2);
            }
            other => panic!("expected a multipolygon, got {other:?}"),
        }
    }

    #[test]
    fn geometry_collection() {
        let geom = parse(WKB_GC);
        match &geom {
            Geometry::GeometryCollection(gc) => {
                let members = gc.geometries().unwrap();
                assert_eq!(members.len(), 2);
                assert_eq!(members[0].geometry_type(), GeometryType::Point);
                assert_eq!(members[1].geometry_type(), GeometryType::LineString);
            }
            other => panic!("expected a collection, got {other:?}"),
        }
    }

    #[test]
    fn multipoint_with_srid() {
        let geom = parse(WKB_MPT_SRID);
        assert_eq!(geom.srid(), Some(1000));
        match &geom {
            Geometry::MultiPoint(mp) => {
                let points = mp.points().unwrap();
                assert_eq!(points.len(), 2);
                assert_eq!(points[1].x().unwrap(), 1.0);
                // nested records never carry an SRID of their own
                assert_eq!(points[0].srid(), None);
            }
            other => panic!("expected a multipoint, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_type() {
        let err = read_geometry(hex::decode("010800000000000000000000000000000000000000").unwrap())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid WKB: unsupported geometry type 8");
    }

    #[test]
    fn bad_first_byte() {
        let err = read_geometry(hex::decode("5101000000").unwrap()).unwrap_err();
        assert!(matches!(err, GeometryError::Wkb(_)));
    }

    #[test]
    fn empty_buffer() {
        assert!(read_geometry(Vec::new()).is_err());
    }

    #[test]
    fn truncated_header() {
        assert!(read_geometry(hex::decode("0101").unwrap()).is_err());
    }

    #[test]
    fn truncated_payloads() {
        let full = hex::decode("0101000000000000000000F03F0000000000000040").unwrap();
        for end in 5..full.len() - 1 {
            let geom = read_geometry(full[..end].to_vec()).unwrap();
            match &geom {
                Geometry::Point(p) => assert!(p.x().is_err(), "0..{end} unexpectedly decoded"),
                other => panic!("expected a point, got {other:?}"),
            }
        }
    }

    #[test]
    fn nested_srid_flag_rejected() {
        // MULTIPOINT whose child record wrongly claims an SRID
        let mut buf = vec![0x01, 0x04, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&[0x01]);
        buf.extend_from_slice(&0x2000_0001u32.to_le_bytes());
        buf.extend_from_slice(&4326u32.to_le_bytes());
        buf.extend_from_slice(&1.0f64.to_le_bytes());
        buf.extend_from_slice(&2.0f64.to_le_bytes());
        let geom = read_geometry(buf).unwrap();
        match &geom {
            Geometry::MultiPoint(mp) => {
                let err = mp.points().unwrap_err();
                assert!(err.to_string().contains("must not carry an SRID"));
            }
            other => panic!("expected a multipoint, got {other:?}"),
        }
    }

    #[test]
    fn nested_dimension_mismatch_rejected() {
        // 2D MULTIPOINT holding a Z child record
        let mut buf = vec![0x01, 0x04, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&[0x01]);
        buf.extend_from_slice(&0x8000_0001u32.to_le_bytes());
        buf.extend_from_slice(&1.0f64.to_le_bytes());
        buf.extend_from_slice(&2.0f64.to_le_bytes());
        buf.extend_from_slice(&3.0f64.to_le_bytes());
        let geom = read_geometry(buf).unwrap();
        match &geom {
            Geometry::MultiPoint(mp) => {
                let err = mp.points().unwrap_err();
                assert!(err.to_string().contains("container's dimensions"));
            }
            other => panic!("expected a multipoint, got {other:?}"),
        }
    }

    #[test]
    fn wrong_member_class_rejected() {
        // MULTIPOINT holding a LINESTRING record
        let mut buf = vec![0x01, 0x04, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&[0x01, 0x02, 0x00, 0x00, 0x00]);
        buf.extend_from_slice(&0u32.to_le_bytes());
        let geom = read_geometry(buf).unwrap();
        match &geom {
            Geometry::MultiPoint(mp) => {
                let err = mp.points().unwrap_err();
                assert!(err.to_string().contains("expected a Point"));
            }
            other => panic!("expected a multipoint, got {other:?}"),
        }
    }

    #[test]
    fn mixed_endian_members() {
        // little-endian container with one big-endian member
        let mut buf = vec![0x01, 0x04, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0x00]);
        buf.extend_from_slice(&1u32.to_be_bytes());
        buf.extend_from_slice(&7.0f64.to_be_bytes());
        buf.extend_from_slice(&8.0f64.to_be_bytes());
        buf.extend_from_slice(&[0x01]);
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&9.0f64.to_le_bytes());
        buf.extend_from_slice(&10.0f64.to_le_bytes());
        let geom = read_geometry(buf).unwrap();
        match &geom {
            Geometry::MultiPoint(mp) => {
                let points = mp.points().unwrap();
                assert_eq!(points[0].x().unwrap(), 7.0);
                assert_eq!(points[1].x().unwrap(), 9.0);
            }
            other => panic!("expected a multipoint, got {other:?}"),
        }
    }

    #[test]
    fn nested_collections() {
        // GEOMETRYCOLLECTION (GEOMETRYCOLLECTION (POINT (1 2)))
        let mut buf = vec![0x01, 0x07, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&[0x01, 0x07, 0x00, 0x00, 0x00]);
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x00]);
        buf.extend_from_slice(&1.0f64.to_le_bytes());
        buf.extend_from_slice(&2.0f64.to_le_bytes());
        let geom = read_geometry(buf).unwrap();
        match &geom {
            Geometry::GeometryCollection(gc) => {
                let inner = &gc.geometries().unwrap()[0];
                match inner {
                    Geometry::GeometryCollection(inner_gc) => {
                        assert_eq!(inner_gc.geometries().unwrap().len(), 1);
                    }
                    other => panic!("expected a nested collection, got {other:?}"),
                }
            }
            other => panic!("expected a collection, got {other:?}"),
        }
    }
}
