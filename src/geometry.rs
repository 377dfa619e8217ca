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
use std::cell::{Ref, RefCell};

use geo_traits::Dimensions;
use once_cell::unsync::OnceCell;
use serde_json::Value;

use crate::cursor::ByteOrder;
use crate::error::GeometryError;
use crate::types::{dimensions_from_flags, GeometryType};
use crate::{geojson, hex, wkb_factory, wkb_read, wkt};

/// Header shared by every geometry variant
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GeomMeta {
    pub(crate) srid: Option<i32>,
    pub(crate) dimz: bool,
    pub(crate) dimm: bool,
}

/// Source bytes retained from (E)WKB construction
///
/// The buffer is the whole input record; `body_offset` points just past
/// the outer endian byte, type word and optional SRID. While present it
/// both answers WKB emission byte-for-byte and feeds the first structural
/// read.
#[derive(Debug, Clone)]
pub(crate) struct RawWkb {
    pub(crate) buf: Vec<u8>,
    pub(crate) body_offset: usize,
    pub(crate) order: ByteOrder,
    pub(crate) has_srid_flag: bool,
}

/// Lazily materialized geometry body
///
/// Construction from WKB leaves the child structure undecoded here; the
/// first structural read decodes it and consumes the retained buffer,
/// which also ends byte-for-byte cache service. A failed decode puts the
/// buffer back so the error is reproducible. A mutation that changes the
/// emitted bytes ends cache service without decoding anything: the buffer
/// stays behind as the decode source only.
#[derive(Debug)]
pub(crate) struct Body<T> {
    raw: RefCell<Option<RawWkb>>,
    // retained bytes serve emission only while true; they remain the
    // decode source either way
    cache_valid: bool,
    decoded: OnceCell<T>,
}

impl<T> Body<T> {
    fn ready(value: T) -> Self {
        Self {
            raw: RefCell::new(None),
            cache_valid: false,
            decoded: OnceCell::with_value(value),
        }
    }

    fn pending(raw: RawWkb) -> Self {
        Self {
            raw: RefCell::new(Some(raw)),
            cache_valid: true,
            decoded: OnceCell::new(),
        }
    }

    fn raw_ref(&self) -> Option<Ref<'_, RawWkb>> {
        if !self.cache_valid {
            return None;
        }
        Ref::filter_map(self.raw.borrow(), Option::as_ref).ok()
    }

    fn invalidate_cache(&mut self) {
        self.cache_valid = false;
    }

    fn get_with(
        &self,
        decode: impl FnOnce(&RawWkb) -> Result<T, GeometryError>,
    ) -> Result<&T, GeometryError> {
        self.decoded.get_or_try_init(|| {
            let taken = self.raw.borrow_mut().take();
            let raw = taken.ok_or_else(|| {
                GeometryError::Wkb("geometry body has no source to decode".to_string())
            })?;
            match decode(&raw) {
                Ok(value) => Ok(value),
                Err(err) => {
                    *self.raw.borrow_mut() = Some(raw);
                    Err(err)
                }
            }
        })
    }

    fn get_mut_with(
        &mut self,
        decode: impl FnOnce(&RawWkb) -> Result<T, GeometryError>,
    ) -> Result<&mut T, GeometryError> {
        if self.decoded.get().is_none() {
            let raw = self.raw.get_mut().take().ok_or_else(|| {
                GeometryError::Wkb("geometry body has no source to decode".to_string())
            })?;
            match decode(&raw) {
                Ok(value) => {
                    let _ = self.decoded.set(value);
                }
                Err(err) => {
                    *self.raw.get_mut() = Some(raw);
                    return Err(err);
                }
            }
        }
        self.decoded
            .get_mut()
            .ok_or_else(|| GeometryError::Wkb("geometry body failed to materialize".to_string()))
    }
}

impl<T: Clone> Clone for Body<T> {
    fn clone(&self) -> Self {
        Self {
            raw: RefCell::new(self.raw.borrow().clone()),
            cache_valid: self.cache_valid,
            decoded: self.decoded.clone(),
        }
    }
}

/// Decoded coordinates of a point; undeclared dimensions hold 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PointCoords {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) z: f64,
    pub(crate) m: f64,
}

macro_rules! impl_geometry_common {
    ($name:ident) => {
        impl $name {
            /// The geometry class of this value
            pub fn geometry_type(&self) -> GeometryType {
                GeometryType::$name
            }

            /// The SRID, if one is set
            pub fn srid(&self) -> Option<i32> {
                self.meta.srid
            }

            /// Whether the geometry declares a Z dimension
            pub fn has_z(&self) -> bool {
                self.meta.dimz
            }

            /// Whether the geometry declares an M dimension
            pub fn has_m(&self) -> bool {
                self.meta.dimm
            }

            /// The declared dimensionality
            pub fn dimensions(&self) -> Dimensions {
                dimensions_from_flags(self.meta.dimz, self.meta.dimm)
            }

            /// Replace the SRID
            ///
            /// Any retained WKB stops serving emission, since the bytes no
            /// longer describe the geometry. Child structure is not
            /// decoded by this write.
            pub fn set_srid(&mut self, srid: Option<i32>) {
                self.body.invalidate_cache();
                self.meta.srid = srid;
            }

            /// The PostGIS column type, e.g. `geometry(PointZM,4326)`
            pub fn postgis_type(&self) -> String {
                let dimz = if self.meta.dimz { "Z" } else { "" };
                let dimm = if self.meta.dimm { "M" } else { "" };
                match self.meta.srid {
                    Some(srid) => {
                        format!("geometry({}{dimz}{dimm},{srid})", self.geometry_type())
                    }
                    None => format!("geometry({}{dimz}{dimm})", self.geometry_type()),
                }
            }

            pub(crate) fn lazy(meta: GeomMeta, raw: RawWkb) -> Self {
                Self {
                    meta,
                    body: Body::pending(raw),
                }
            }

            pub(crate) fn meta(&self) -> &GeomMeta {
                &self.meta
            }

            pub(crate) fn meta_mut(&mut self) -> &mut GeomMeta {
                &mut self.meta
            }

            pub(crate) fn cached_wkb(&self) -> Option<Ref<'_, RawWkb>> {
                self.body.raw_ref()
            }
        }
    };
}

/// A PostGIS Point
///
/// The third coordinate of a bare coordinate slice is read as Z unless
/// only the M dimension is declared; see [Point::with_dims].
#[derive(Debug, Clone)]
pub struct Point {
    meta: GeomMeta,
    body: Body<PointCoords>,
}

impl_geometry_common!(Point);

impl Point {
    /// Build a point from 2 to 4 coordinates
    pub fn new(coordinates: &[f64], srid: Option<i32>) -> Result<Self, GeometryError> {
        Self::with_dims(coordinates, srid, false, false)
    }

    /// Build a point, declaring how missing or ambiguous coordinates are
    /// read
    ///
    /// Two coordinates fill any declared dimension with 0. A third
    /// coordinate is M when only `dimm` is declared and Z otherwise. Four
    /// coordinates always mean ZM.
    pub fn with_dims(
        coordinates: &[f64],
        srid: Option<i32>,
        dimz: bool,
        dimm: bool,
    ) -> Result<Self, GeometryError> {
        if coordinates.len() < 2 {
            return Err(GeometryError::Coordinate(format!(
                "a point needs at least x and y, got {} coordinates",
                coordinates.len()
            )));
        }
        if coordinates.len() > 4 {
            return Err(GeometryError::Dimensionality(format!(
                "at most 4 coordinates are supported per vertex, got {}",
                coordinates.len()
            )));
        }
        let x = coordinates[0];
        let y = coordinates[1];
        let (z, m, dimz, dimm) = match coordinates.len() {
            2 => (0.0, 0.0, dimz, dimm),
            3 => {
                if dimz && dimm {
                    (coordinates[2], 0.0, true, true)
                } else if dimm {
                    (0.0, coordinates[2], false, true)
                } else {
                    (coordinates[2], 0.0, true, false)
                }
            }
            _ => (coordinates[2], coordinates[3], true, true),
        };
        Ok(Self {
            meta: GeomMeta { srid, dimz, dimm },
            body: Body::ready(PointCoords { x, y, z, m }),
        })
    }

    pub(crate) fn ready(meta: GeomMeta, coords: PointCoords) -> Self {
        Self {
            meta,
            body: Body::ready(coords),
        }
    }

    pub(crate) fn coords(&self) -> Result<&PointCoords, GeometryError> {
        let meta = &self.meta;
        self.body.get_with(|raw| wkb_read::point_body(raw, meta))
    }

    fn coords_mut(&mut self) -> Result<&mut PointCoords, GeometryError> {
        let meta = self.meta.clone();
        self.body
            .get_mut_with(move |raw| wkb_read::point_body(raw, &meta))
    }

    /// X coordinate
    pub fn x(&self) -> Result<f64, GeometryError> {
        Ok(self.coords()?.x)
    }

    /// Y coordinate
    pub fn y(&self) -> Result<f64, GeometryError> {
        Ok(self.coords()?.y)
    }

    /// Z coordinate, if the dimension is declared
    pub fn z(&self) -> Result<Option<f64>, GeometryError> {
        if !self.meta.dimz {
            return Ok(None);
        }
        Ok(Some(self.coords()?.z))
    }

    /// M coordinate, if the dimension is declared
    pub fn m(&self) -> Result<Option<f64>, GeometryError> {
        if !self.meta.dimm {
            return Ok(None);
        }
        Ok(Some(self.coords()?.m))
    }

    pub fn set_x(&mut self, value: f64) -> Result<(), GeometryError> {
        self.coords_mut()?.x = value;
        Ok(())
    }

    pub fn set_y(&mut self, value: f64) -> Result<(), GeometryError> {
        self.coords_mut()?.y = value;
        Ok(())
    }

    /// Set the Z coordinate, declaring the dimension if it was absent
    pub fn set_z(&mut self, value: f64) -> Result<(), GeometryError> {
        self.coords_mut()?.z = value;
        self.meta.dimz = true;
        Ok(())
    }

    /// Set the M coordinate, declaring the dimension if it was absent
    pub fn set_m(&mut self, value: f64) -> Result<(), GeometryError> {
        self.coords_mut()?.m = value;
        self.meta.dimm = true;
        Ok(())
    }

    /// Declare the Z dimension, initializing it to 0
    ///
    /// A declared dimension cannot be removed.
    pub fn set_has_z(&mut self, value: bool) -> Result<(), GeometryError> {
        if value == self.meta.dimz {
            return Ok(());
        }
        if !value {
            return Err(GeometryError::Dimensionality(
                "cannot remove the Z dimension of a Point".to_string(),
            ));
        }
        self.coords_mut()?.z = 0.0;
        self.meta.dimz = true;
        Ok(())
    }

    /// Declare the M dimension, initializing it to 0
    ///
    /// A declared dimension cannot be removed.
    pub fn set_has_m(&mut self, value: bool) -> Result<(), GeometryError> {
        if value == self.meta.dimm {
            return Ok(());
        }
        if !value {
            return Err(GeometryError::Dimensionality(
                "cannot remove the M dimension of a Point".to_string(),
            ));
        }
        self.coords_mut()?.m = 0.0;
        self.meta.dimm = true;
        Ok(())
    }

    /// The (minx, miny, maxx, maxy) extent
    pub fn bounds(&self) -> Result<(f64, f64, f64, f64), GeometryError> {
        let c = self.coords()?;
        Ok((c.x, c.y, c.x, c.y))
    }

    pub(crate) fn ensure_loaded(&self) -> Result<(), GeometryError> {
        self.coords().map(|_| ())
    }

    pub(crate) fn detached(&self) -> Result<Point, GeometryError> {
        self.ensure_loaded()?;
        let mut copy = self.clone();
        copy.meta.srid = None;
        Ok(copy)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta
            && match (self.coords(), other.coords()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
    }
}

/// A PostGIS LineString
#[derive(Debug, Clone)]
pub struct LineString {
    meta: GeomMeta,
    body: Body<Vec<Point>>,
}

impl_geometry_common!(LineString);

impl LineString {
    /// Build a line from its vertices
    ///
    /// Vertices must agree on dimensionality. Their SRIDs are not
    /// authoritative and are cleared.
    pub fn new(vertices: Vec<Point>, srid: Option<i32>) -> Result<Self, GeometryError> {
        let (dimz, dimm) = member_dimensions(vertices.iter().map(|v| (v.meta.dimz, v.meta.dimm)))?;
        let vertices = clear_member_srids(vertices)?;
        Ok(Self {
            meta: GeomMeta { srid, dimz, dimm },
            body: Body::ready(vertices),
        })
    }

    pub(crate) fn ready(meta: GeomMeta, vertices: Vec<Point>) -> Self {
        Self {
            meta,
            body: Body::ready(vertices),
        }
    }

    /// The vertices of the line
    pub fn vertices(&self) -> Result<&[Point], GeometryError> {
        let meta = &self.meta;
        self.body
            .get_with(|raw| wkb_read::linestring_body(raw, meta))
            .map(Vec::as_slice)
    }

    /// Mutable access to the vertices
    pub fn vertices_mut(&mut self) -> Result<&mut [Point], GeometryError> {
        let meta = self.meta.clone();
        self.body
            .get_mut_with(move |raw| wkb_read::linestring_body(raw, &meta))
            .map(Vec::as_mut_slice)
    }

    /// Declare the Z dimension on the line and every vertex
    pub fn set_has_z(&mut self, value: bool) -> Result<(), GeometryError> {
        if value == self.meta.dimz {
            return Ok(());
        }
        if !value {
            return Err(GeometryError::Dimensionality(
                "cannot remove the Z dimension of a LineString".to_string(),
            ));
        }
        for vertex in self.vertices_mut()?.iter_mut() {
            vertex.set_has_z(true)?;
        }
        self.meta.dimz = true;
        Ok(())
    }

    /// Declare the M dimension on the line and every vertex
    pub fn set_has_m(&mut self, value: bool) -> Result<(), GeometryError> {
        if value == self.meta.dimm {
            return Ok(());
        }
        if !value {
            return Err(GeometryError::Dimensionality(
                "cannot remove the M dimension of a LineString".to_string(),
            ));
        }
        for vertex in self.vertices_mut()?.iter_mut() {
            vertex.set_has_m(true)?;
        }
        self.meta.dimm = true;
        Ok(())
    }

    /// The (minx, miny, maxx, maxy) extent
    pub fn bounds(&self) -> Result<(f64, f64, f64, f64), GeometryError> {
        fold_bounds(self.vertices()?.iter().map(Point::bounds))
    }

    pub(crate) fn ensure_loaded(&self) -> Result<(), GeometryError> {
        self.vertices().map(|_| ())
    }

    pub(crate) fn detached(&self) -> Result<LineString, GeometryError> {
        self.ensure_loaded()?;
        let mut copy = self.clone();
        copy.meta.srid = None;
        Ok(copy)
    }
}

impl PartialEq for LineString {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta
            && match (self.vertices(), other.vertices()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
    }
}

/// A PostGIS Polygon
///
/// The first ring is the exterior by convention; ring closure and
/// orientation are not validated.
#[derive(Debug, Clone)]
pub struct Polygon {
    meta: GeomMeta,
    body: Body<Vec<LineString>>,
}

impl_geometry_common!(Polygon);

impl Polygon {
    /// Build a polygon from its linear rings
    ///
    /// Rings must agree on dimensionality. Their SRIDs are not
    /// authoritative and are cleared.
    pub fn new(rings: Vec<LineString>, srid: Option<i32>) -> Result<Self, GeometryError> {
        let (dimz, dimm) = member_dimensions(rings.iter().map(|r| (r.meta.dimz, r.meta.dimm)))?;
        let rings = clear_member_srids(rings)?;
        Ok(Self {
            meta: GeomMeta { srid, dimz, dimm },
            body: Body::ready(rings),
        })
    }

    pub(crate) fn ready(meta: GeomMeta, rings: Vec<LineString>) -> Self {
        Self {
            meta,
            body: Body::ready(rings),
        }
    }

    /// The linear rings of the polygon
    pub fn rings(&self) -> Result<&[LineString], GeometryError> {
        let meta = &self.meta;
        self.body
            .get_with(|raw| wkb_read::polygon_body(raw, meta))
            .map(Vec::as_slice)
    }

    /// Mutable access to the rings
    pub fn rings_mut(&mut self) -> Result<&mut [LineString], GeometryError> {
        let meta = self.meta.clone();
        self.body
            .get_mut_with(move |raw| wkb_read::polygon_body(raw, &meta))
            .map(Vec::as_mut_slice)
    }

    /// The exterior ring
    pub fn exterior(&self) -> Result<&LineString, GeometryError> {
        self.rings()?.first().ok_or_else(|| {
            GeometryError::Coordinate("polygon has no exterior ring".to_string())
        })
    }

    /// The interior rings, if any
    pub fn interiors(&self) -> Result<&[LineString], GeometryError> {
        let rings = self.rings()?;
        Ok(rings.get(1..).unwrap_or(&[]))
    }

    /// Declare the Z dimension on the polygon and every ring
    pub fn set_has_z(&mut self, value: bool) -> Result<(), GeometryError> {
        if value == self.meta.dimz {
            return Ok(());
        }
        if !value {
            return Err(GeometryError::Dimensionality(
                "cannot remove the Z dimension of a Polygon".to_string(),
            ));
        }
        for ring in self.rings_mut()?.iter_mut() {
            ring.set_has_z(true)?;
        }
        self.meta.dimz = true;
        Ok(())
    }

    /// Declare the M dimension on the polygon and every ring
    pub fn set_has_m(&mut self, value: bool) -> Result<(), GeometryError> {
        if value == self.meta.dimm {
            return Ok(());
        }
        if !value {
            return Err(GeometryError::Dimensionality(
                "cannot remove the M dimension of a Polygon".to_string(),
            ));
        }
        for ring in self.rings_mut()?.iter_mut() {
            ring.set_has_m(true)?;
        }
        self.meta.dimm = true;
        Ok(())
    }

    /// The (minx, miny, maxx, maxy) extent of the exterior ring
    pub fn bounds(&self) -> Result<(f64, f64, f64, f64), GeometryError> {
        self.exterior()?.bounds()
    }

    pub(crate) fn ensure_loaded(&self) -> Result<(), GeometryError> {
        self.rings().map(|_| ())
    }

    pub(crate) fn detached(&self) -> Result<Polygon, GeometryError> {
        self.ensure_loaded()?;
        let mut copy = self.clone();
        copy.meta.srid = None;
        Ok(copy)
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta
            && match (self.rings(), other.rings()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
    }
}

macro_rules! impl_multi_geometry {
    ($name:ident, $member:ident, $accessor:ident, $accessor_mut:ident, $read_body:ident, $what:literal) => {
        impl_geometry_common!($name);

        impl $name {
            /// Build the multigeometry from its members
            ///
            /// Members must agree on dimensionality, and may carry an SRID
            /// only when it equals the container's. The check is shallow:
            /// geometries nested deeper than one level are not revisited.
            pub fn new(members: Vec<$member>, srid: Option<i32>) -> Result<Self, GeometryError> {
                let (dimz, dimm) =
                    member_dimensions(members.iter().map(|g| (g.meta().dimz, g.meta().dimm)))?;
                check_member_srids(srid, members.iter().map(|g| g.meta().srid))?;
                let members = clear_member_srids(members)?;
                Ok(Self {
                    meta: GeomMeta { srid, dimz, dimm },
                    body: Body::ready(members),
                })
            }

            pub(crate) fn ready(meta: GeomMeta, members: Vec<$member>) -> Self {
                Self {
                    meta,
                    body: Body::ready(members),
                }
            }

            #[doc = concat!("The ", $what, " of the collection")]
            pub fn $accessor(&self) -> Result<&[$member], GeometryError> {
                let meta = &self.meta;
                self.body
                    .get_with(|raw| wkb_read::$read_body(raw, meta))
                    .map(Vec::as_slice)
            }

            #[doc = concat!("Mutable access to the ", $what)]
            pub fn $accessor_mut(&mut self) -> Result<&mut [$member], GeometryError> {
                let meta = self.meta.clone();
                self.body
                    .get_mut_with(move |raw| wkb_read::$read_body(raw, &meta))
                    .map(Vec::as_mut_slice)
            }

            pub(crate) fn members_vec_mut(&mut self) -> Result<&mut Vec<$member>, GeometryError> {
                let meta = self.meta.clone();
                self.body
                    .get_mut_with(move |raw| wkb_read::$read_body(raw, &meta))
            }

            /// Declare the Z dimension on the container and every member,
            /// initializing new coordinates to 0
            pub fn set_has_z(&mut self, value: bool) -> Result<(), GeometryError> {
                if value == self.meta.dimz {
                    return Ok(());
                }
                if !value {
                    return Err(GeometryError::Dimensionality(concat!(
                        "cannot remove the Z dimension of a ",
                        stringify!($name)
                    )
                    .to_string()));
                }
                for member in self.$accessor_mut()?.iter_mut() {
                    member.set_has_z(true)?;
                }
                self.meta.dimz = true;
                Ok(())
            }

            /// Declare the M dimension on the container and every member,
            /// initializing new coordinates to 0
            pub fn set_has_m(&mut self, value: bool) -> Result<(), GeometryError> {
                if value == self.meta.dimm {
                    return Ok(());
                }
                if !value {
                    return Err(GeometryError::Dimensionality(concat!(
                        "cannot remove the M dimension of a ",
                        stringify!($name)
                    )
                    .to_string()));
                }
                for member in self.$accessor_mut()?.iter_mut() {
                    member.set_has_m(true)?;
                }
                self.meta.dimm = true;
                Ok(())
            }

            /// The (minx, miny, maxx, maxy) extent over all members
            pub fn bounds(&self) -> Result<(f64, f64, f64, f64), GeometryError> {
                fold_bounds(self.$accessor()?.iter().map(|m| m.bounds()))
            }

            pub(crate) fn ensure_loaded(&self) -> Result<(), GeometryError> {
                self.$accessor().map(|_| ())
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.meta == other.meta
                    && match (self.$accessor(), other.$accessor()) {
                        (Ok(a), Ok(b)) => a == b,
                        _ => false,
                    }
            }
        }
    };
}

/// A PostGIS MultiPoint
#[derive(Debug, Clone)]
pub struct MultiPoint {
    meta: GeomMeta,
    body: Body<Vec<Point>>,
}

impl_multi_geometry!(MultiPoint, Point, points, points_mut, multipoint_body, "points");

/// A PostGIS MultiLineString
#[derive(Debug, Clone)]
pub struct MultiLineString {
    meta: GeomMeta,
    body: Body<Vec<LineString>>,
}

impl_multi_geometry!(
    MultiLineString,
    LineString,
    linestrings,
    linestrings_mut,
    multilinestring_body,
    "lines"
);

/// A PostGIS MultiPolygon
#[derive(Debug, Clone)]
pub struct MultiPolygon {
    meta: GeomMeta,
    body: Body<Vec<Polygon>>,
}

impl_multi_geometry!(
    MultiPolygon,
    Polygon,
    polygons,
    polygons_mut,
    multipolygon_body,
    "polygons"
);

/// A PostGIS GeometryCollection
#[derive(Debug, Clone)]
pub struct GeometryCollection {
    meta: GeomMeta,
    body: Body<Vec<Geometry>>,
}

impl_multi_geometry!(
    GeometryCollection,
    Geometry,
    geometries,
    geometries_mut,
    collection_body,
    "member geometries"
);

fn member_dimensions(
    mut dims: impl Iterator<Item = (bool, bool)>,
) -> Result<(bool, bool), GeometryError> {
    let first = match dims.next() {
        Some(d) => d,
        None => return Ok((false, false)),
    };
    for d in dims {
        if d != first {
            return Err(GeometryError::Dimensionality(
                "mixed dimensionality in a multigeometry".to_string(),
            ));
        }
    }
    Ok(first)
}

fn check_member_srids(
    container: Option<i32>,
    srids: impl Iterator<Item = Option<i32>>,
) -> Result<(), GeometryError> {
    for srid in srids {
        match srid {
            None => {}
            Some(s) if container == Some(s) => {}
            Some(s) => {
                return Err(GeometryError::Srid(format!(
                    "mixed SRIDs in a multigeometry: member has {s}, container has {}",
                    match container {
                        Some(c) => c.to_string(),
                        None => "none".to_string(),
                    }
                )))
            }
        }
    }
    Ok(())
}

/// Strip redundant member SRIDs after validation so composites always hold
/// SRID-less members and round trips compare equal
fn clear_member_srids<T: GeometryLike>(mut members: Vec<T>) -> Result<Vec<T>, GeometryError> {
    for member in &mut members {
        if member.meta().srid.is_some() {
            member.ensure_loaded()?;
            member.meta_mut().srid = None;
        }
    }
    Ok(members)
}

/// Internal access shared by the seven variants and the [Geometry] sum
pub(crate) trait GeometryLike {
    fn meta(&self) -> &GeomMeta;
    fn meta_mut(&mut self) -> &mut GeomMeta;
    fn ensure_loaded(&self) -> Result<(), GeometryError>;
}

macro_rules! impl_geometry_like {
    ($name:ident) => {
        impl GeometryLike for $name {
            fn meta(&self) -> &GeomMeta {
                $name::meta(self)
            }
            fn meta_mut(&mut self) -> &mut GeomMeta {
                $name::meta_mut(self)
            }
            fn ensure_loaded(&self) -> Result<(), GeometryError> {
                $name::ensure_loaded(self)
            }
        }
    };
}

impl_geometry_like!(Point);
impl_geometry_like!(LineString);
impl_geometry_like!(Polygon);
impl_geometry_like!(MultiPoint);
impl_geometry_like!(MultiLineString);
impl_geometry_like!(MultiPolygon);
impl_geometry_like!(GeometryCollection);

fn fold_bounds(
    bounds: impl Iterator<Item = Result<(f64, f64, f64, f64), GeometryError>>,
) -> Result<(f64, f64, f64, f64), GeometryError> {
    let mut merged: Option<(f64, f64, f64, f64)> = None;
    for item in bounds {
        let (minx, miny, maxx, maxy) = item?;
        merged = Some(match merged {
            None => (minx, miny, maxx, maxy),
            Some((x0, y0, x1, y1)) => (
                x0.min(minx),
                y0.min(miny),
                x1.max(maxx),
                y1.max(maxy),
            ),
        });
    }
    merged.ok_or_else(|| {
        GeometryError::Coordinate("cannot compute the bounds of an empty geometry".to_string())
    })
}

macro_rules! dispatch {
    ($geom:expr, $inner:ident => $body:expr) => {
        match $geom {
            Geometry::Point($inner) => $body,
            Geometry::LineString($inner) => $body,
            Geometry::Polygon($inner) => $body,
            Geometry::MultiPoint($inner) => $body,
            Geometry::MultiLineString($inner) => $body,
            Geometry::MultiPolygon($inner) => $body,
            Geometry::GeometryCollection($inner) => $body,
        }
    };
}

/// A PostGIS geometry in any of the seven supported classes
///
/// This is the facade type: it parses hex EWKB, raw WKB, WKT/EWKT and
/// GeoJSON, and emits all of them back. Reading the class, SRID or
/// dimension flags of a WKB-built geometry is answered from the decoded
/// header alone; the first read that needs coordinates decodes the rest.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    GeometryCollection(GeometryCollection),
}

impl Geometry {
    /// Parse a geometry from its string form
    ///
    /// An even-length string of hex digits is read as hex-encoded (E)WKB;
    /// anything else goes to the WKT parser.
    pub fn parse(input: &str) -> Result<Self, GeometryError> {
        Self::parse_with_srid(input, None)
    }

    /// Like [Geometry::parse], with an SRID override
    ///
    /// The override wins over any SRID the input itself declares.
    pub fn parse_with_srid(input: &str, srid: Option<i32>) -> Result<Self, GeometryError> {
        if input.is_empty() {
            return Err(GeometryError::Wkb("no geometry input provided".to_string()));
        }
        if hex::is_hex(input) {
            Self::from_hex_with_srid(input, srid)
        } else {
            Self::from_wkt_with_srid(input, srid)
        }
    }

    /// Read a geometry from hex-encoded (E)WKB
    pub fn from_hex(input: &str) -> Result<Self, GeometryError> {
        Self::from_hex_with_srid(input, None)
    }

    /// Read a geometry from hex-encoded (E)WKB with an SRID override
    pub fn from_hex_with_srid(input: &str, srid: Option<i32>) -> Result<Self, GeometryError> {
        Self::from_wkb_with_srid(&hex::decode(input)?, srid)
    }

    /// Read a geometry from raw (E)WKB bytes
    ///
    /// Only the leading endian byte, type word and optional SRID are
    /// decoded up front; the bytes are retained and the rest is decoded on
    /// the first structural read.
    pub fn from_wkb(bytes: &[u8]) -> Result<Self, GeometryError> {
        Self::from_wkb_with_srid(bytes, None)
    }

    /// Read a geometry from raw (E)WKB bytes with an SRID override
    pub fn from_wkb_with_srid(bytes: &[u8], srid: Option<i32>) -> Result<Self, GeometryError> {
        wkb_read::read_geometry(bytes.to_vec())?.override_srid(srid)
    }

    /// Read a geometry from WKT or EWKT
    pub fn from_wkt(input: &str) -> Result<Self, GeometryError> {
        Self::from_wkt_with_srid(input, None)
    }

    /// Read a geometry from WKT or EWKT with an SRID override
    pub fn from_wkt_with_srid(input: &str, srid: Option<i32>) -> Result<Self, GeometryError> {
        wkt::parse(input)?.override_srid(srid)
    }

    /// Read a geometry from a GeoJSON tree
    ///
    /// A document without a `crs` member is treated as having no SRID.
    pub fn from_geojson(value: &Value) -> Result<Self, GeometryError> {
        geojson::from_value(value, None)
    }

    /// Read a geometry from a GeoJSON tree with an SRID override
    pub fn from_geojson_with_srid(
        value: &Value,
        srid: Option<i32>,
    ) -> Result<Self, GeometryError> {
        geojson::from_value(value, srid)
    }

    fn override_srid(mut self, srid: Option<i32>) -> Result<Self, GeometryError> {
        if let Some(srid) = srid {
            if self.srid() != Some(srid) {
                self.ensure_loaded()?;
                self.set_srid(Some(srid));
            }
        }
        Ok(self)
    }

    /// The geometry class of this value
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }

    /// The SRID, if one is set
    pub fn srid(&self) -> Option<i32> {
        dispatch!(self, g => g.srid())
    }

    /// Whether the geometry declares a Z dimension
    pub fn has_z(&self) -> bool {
        dispatch!(self, g => g.has_z())
    }

    /// Whether the geometry declares an M dimension
    pub fn has_m(&self) -> bool {
        dispatch!(self, g => g.has_m())
    }

    /// The declared dimensionality
    pub fn dimensions(&self) -> Dimensions {
        dispatch!(self, g => g.dimensions())
    }

    /// The PostGIS column type, e.g. `geometry(PointZM,4326)`
    pub fn postgis_type(&self) -> String {
        dispatch!(self, g => g.postgis_type())
    }

    /// Replace the SRID
    ///
    /// Invalidates any retained WKB without decoding child structure.
    pub fn set_srid(&mut self, srid: Option<i32>) {
        dispatch!(self, g => g.set_srid(srid))
    }

    /// Declare or reject removal of the Z dimension; declaring descends to
    /// every reachable point
    pub fn set_has_z(&mut self, value: bool) -> Result<(), GeometryError> {
        dispatch!(self, g => g.set_has_z(value))
    }

    /// Declare or reject removal of the M dimension; declaring descends to
    /// every reachable point
    pub fn set_has_m(&mut self, value: bool) -> Result<(), GeometryError> {
        dispatch!(self, g => g.set_has_m(value))
    }

    /// The (minx, miny, maxx, maxy) extent of the geometry
    pub fn bounds(&self) -> Result<(f64, f64, f64, f64), GeometryError> {
        dispatch!(self, g => g.bounds())
    }

    /// The geometry as little-endian WKB, without an SRID
    ///
    /// Bytes retained from construction are returned as-is when they carry
    /// no SRID; otherwise the geometry is re-encoded.
    pub fn wkb(&self) -> Result<Vec<u8>, GeometryError> {
        if let Some(raw) = self.cached_wkb() {
            if !raw.has_srid_flag {
                return Ok(raw.buf.clone());
            }
        }
        wkb_factory::geometry_wkb(self, false)
    }

    /// The geometry as EWKB: little-endian WKB carrying the SRID if set
    ///
    /// Bytes retained from construction are returned as-is.
    pub fn ewkb(&self) -> Result<Vec<u8>, GeometryError> {
        if let Some(raw) = self.cached_wkb() {
            return Ok(raw.buf.clone());
        }
        wkb_factory::geometry_wkb(self, true)
    }

    /// [Geometry::wkb] as lowercase hex
    pub fn wkb_hex(&self) -> Result<String, GeometryError> {
        Ok(hex::encode(&self.wkb()?))
    }

    /// [Geometry::ewkb] as lowercase hex
    pub fn ewkb_hex(&self) -> Result<String, GeometryError> {
        Ok(hex::encode(&self.ewkb()?))
    }

    /// The geometry as WKT
    pub fn wkt(&self) -> Result<String, GeometryError> {
        wkt::write(self, false)
    }

    /// The geometry as EWKT, prefixed with `SRID=n;` when an SRID is set
    pub fn ewkt(&self) -> Result<String, GeometryError> {
        wkt::write(self, true)
    }

    /// The geometry as a GeoJSON tree
    ///
    /// The M dimension is dropped; the SRID is not encoded.
    pub fn geojson(&self) -> Result<Value, GeometryError> {
        geojson::to_value(self)
    }

    pub(crate) fn cached_wkb(&self) -> Option<Ref<'_, RawWkb>> {
        dispatch!(self, g => g.cached_wkb())
    }

    pub(crate) fn detached(&self) -> Result<Geometry, GeometryError> {
        Ok(match self {
            Geometry::Point(g) => Geometry::Point(g.detached()?),
            Geometry::LineString(g) => Geometry::LineString(g.detached()?),
            Geometry::Polygon(g) => Geometry::Polygon(g.detached()?),
            other => {
                other.ensure_loaded()?;
                let mut copy = other.clone();
                copy.meta_mut().srid = None;
                copy
            }
        })
    }
}

impl GeometryLike for Geometry {
    fn meta(&self) -> &GeomMeta {
        dispatch!(self, g => g.meta())
    }

    fn meta_mut(&mut self) -> &mut GeomMeta {
        dispatch!(self, g => g.meta_mut())
    }

    fn ensure_loaded(&self) -> Result<(), GeometryError> {
        dispatch!(self, g => g.ensure_loaded())
    }
}

macro_rules! impl_from_variant {
    ($name:ident) => {
        impl From<$name> for Geometry {
            fn from(value: $name) -> Self {
                Geometry::$name(value)
            }
        }
    };
}

impl_from_variant!(Point);
impl_from_variant!(LineString);
impl_from_variant!(Polygon);
impl_from_variant!(MultiPoint);
impl_from_variant!(MultiLineString);
impl_from_variant!(MultiPolygon);
impl_from_variant!(GeometryCollection);
