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

//! (E)WKB encoding
//!
//! Output is always little endian. In EWKB mode only the outermost type
//! word carries the SRID flag and value; nested records re-emit a
//! self-sufficient endian byte and type word, never an SRID.

use std::io::Write;

use crate::error::GeometryError;
use crate::geometry::{Geometry, LineString, Point};
use crate::types::{M_FLAG, SRID_FLAG, Z_FLAG};

/// Encode a geometry as WKB, with the SRID included in EWKB mode
pub(crate) fn geometry_wkb(
    geometry: &Geometry,
    include_srid: bool,
) -> Result<Vec<u8>, GeometryError> {
    let mut buf = Vec::new();
    write_geometry(&mut buf, geometry, include_srid)?;
    Ok(buf)
}

fn write_geometry(
    buf: &mut impl Write,
    geometry: &Geometry,
    include_srid: bool,
) -> Result<(), GeometryError> {
    write_header(buf, geometry, include_srid)?;
    match geometry {
        Geometry::Point(p) => write_coords(buf, p),
        Geometry::LineString(ls) => write_vertices(buf, ls.vertices()?),
        Geometry::Polygon(pg) => write_rings(buf, pg.rings()?),
        Geometry::MultiPoint(mp) => {
            let members = mp.points()?;
            write_count(buf, members.len())?;
            for point in members {
                write_member_header(buf, point.geometry_type().wkb_id(), point.has_z(), point.has_m())?;
                write_coords(buf, point)?;
            }
            Ok(())
        }
        Geometry::MultiLineString(ml) => {
            let members = ml.linestrings()?;
            write_count(buf, members.len())?;
            for ls in members {
                write_member_header(buf, ls.geometry_type().wkb_id(), ls.has_z(), ls.has_m())?;
                write_vertices(buf, ls.vertices()?)?;
            }
            Ok(())
        }
        Geometry::MultiPolygon(mp) => {
            let members = mp.polygons()?;
            write_count(buf, members.len())?;
            for pg in members {
                write_member_header(buf, pg.geometry_type().wkb_id(), pg.has_z(), pg.has_m())?;
                write_rings(buf, pg.rings()?)?;
            }
            Ok(())
        }
        Geometry::GeometryCollection(gc) => {
            let members = gc.geometries()?;
            write_count(buf, members.len())?;
            for member in members {
                write_geometry(buf, member, false)?;
            }
            Ok(())
        }
    }
}

fn write_header(
    buf: &mut impl Write,
    geometry: &Geometry,
    include_srid: bool,
) -> Result<(), GeometryError> {
    let srid = geometry.srid();
    let mut word = geometry.geometry_type().wkb_id();
    if geometry.has_z() {
        word |= Z_FLAG;
    }
    if geometry.has_m() {
        word |= M_FLAG;
    }
    if include_srid && srid.is_some() {
        word |= SRID_FLAG;
    }
    buf.write_all(&[0x01])?;
    buf.write_all(&word.to_le_bytes())?;
    if include_srid {
        if let Some(srid) = srid {
            buf.write_all(&srid.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Nested records keep their Z/M flags but never an SRID
fn write_member_header(
    buf: &mut impl Write,
    base: u32,
    dimz: bool,
    dimm: bool,
) -> Result<(), GeometryError> {
    let mut word = base;
    if dimz {
        word |= Z_FLAG;
    }
    if dimm {
        word |= M_FLAG;
    }
    buf.write_all(&[0x01])?;
    buf.write_all(&word.to_le_bytes())?;
    Ok(())
}

fn write_count(buf: &mut impl Write, count: usize) -> Result<(), GeometryError> {
    let count: u32 = count.try_into().map_err(|_| {
        GeometryError::Wkb(format!("too many members for a WKB record: {count}"))
    })?;
    buf.write_all(&count.to_le_bytes())?;
    Ok(())
}

fn write_coords(buf: &mut impl Write, point: &Point) -> Result<(), GeometryError> {
    let coords = point.coords()?;
    buf.write_all(&coords.x.to_le_bytes())?;
    buf.write_all(&coords.y.to_le_bytes())?;
    if point.has_z() {
        buf.write_all(&coords.z.to_le_bytes())?;
    }
    if point.has_m() {
        buf.write_all(&coords.m.to_le_bytes())?;
    }
    Ok(())
}

fn write_vertices(buf: &mut impl Write, vertices: &[Point]) -> Result<(), GeometryError> {
    write_count(buf, vertices.len())?;
    for vertex in vertices {
        write_coords(buf, vertex)?;
    }
    Ok(())
}

fn write_rings(buf: &mut impl Write, rings: &[LineString]) -> Result<(), GeometryError> {
    write_count(buf, rings.len())?;
    for ring in rings {
        write_vertices(buf, ring.vertices()?)?;
    }
    Ok(())
}
