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
use std::{fmt::Display, str::FromStr};

use geo_traits::Dimensions;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// EWKB flag bit for a Z dimension
pub(crate) const Z_FLAG: u32 = 0x8000_0000;
/// EWKB flag bit for an M dimension
pub(crate) const M_FLAG: u32 = 0x4000_0000;
/// EWKB flag bit announcing a trailing 4-byte SRID
pub(crate) const SRID_FLAG: u32 = 0x2000_0000;
/// Low byte of the type word, holding the base geometry class
const BASE_MASK: u32 = 0xff;

/// Geometry classes supported by the codec
///
/// These are the seven OGC Simple Features classes PostGIS stores with
/// base type codes 1 through 7. Curved types, surfaces and TINs are not
/// supported.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Hash, Clone, Copy)]
pub enum GeometryType {
    /// Point geometry type
    Point,
    /// LineString geometry type
    LineString,
    /// Polygon geometry type
    Polygon,
    /// MultiPoint geometry type
    MultiPoint,
    /// MultiLineString geometry type
    MultiLineString,
    /// MultiPolygon geometry type
    MultiPolygon,
    /// GeometryCollection geometry type
    GeometryCollection,
}

impl GeometryType {
    /// Construct a geometry type from the base component of a WKB type word
    pub fn try_from_wkb_id(wkb_id: u32) -> Result<Self, GeometryError> {
        match wkb_id {
            1 => Ok(Self::Point),
            2 => Ok(Self::LineString),
            3 => Ok(Self::Polygon),
            4 => Ok(Self::MultiPoint),
            5 => Ok(Self::MultiLineString),
            6 => Ok(Self::MultiPolygon),
            7 => Ok(Self::GeometryCollection),
            _ => Err(GeometryError::Wkb(format!(
                "unsupported geometry type {wkb_id}"
            ))),
        }
    }

    /// The base component of the WKB type word (1 for Point...7 for
    /// GeometryCollection)
    pub fn wkb_id(&self) -> u32 {
        match self {
            Self::Point => 1,
            Self::LineString => 2,
            Self::Polygon => 3,
            Self::MultiPoint => 4,
            Self::MultiLineString => 5,
            Self::MultiPolygon => 6,
            Self::GeometryCollection => 7,
        }
    }

    /// The identifier GeoJSON uses for this geometry type
    ///
    /// Use [FromStr] to parse such a string back into a GeometryType.
    pub fn geojson_id(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::LineString => "LineString",
            Self::Polygon => "Polygon",
            Self::MultiPoint => "MultiPoint",
            Self::MultiLineString => "MultiLineString",
            Self::MultiPolygon => "MultiPolygon",
            Self::GeometryCollection => "GeometryCollection",
        }
    }

    /// The uppercase keyword WKT uses for this geometry type
    pub fn wkt_id(&self) -> &'static str {
        match self {
            Self::Point => "POINT",
            Self::LineString => "LINESTRING",
            Self::Polygon => "POLYGON",
            Self::MultiPoint => "MULTIPOINT",
            Self::MultiLineString => "MULTILINESTRING",
            Self::MultiPolygon => "MULTIPOLYGON",
            Self::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }
}

impl FromStr for GeometryType {
    type Err = GeometryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value_lower = value.to_ascii_lowercase();
        match value_lower.as_str() {
            "point" => Ok(Self::Point),
            "linestring" => Ok(Self::LineString),
            "polygon" => Ok(Self::Polygon),
            "multipoint" => Ok(Self::MultiPoint),
            "multilinestring" => Ok(Self::MultiLineString),
            "multipolygon" => Ok(Self::MultiPolygon),
            "geometrycollection" => Ok(Self::GeometryCollection),
            _ => Err(GeometryError::Geojson(format!(
                "unsupported geometry type '{value}'"
            ))),
        }
    }
}

impl Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.geojson_id())
    }
}

/// Decoded 32-bit (E)WKB type word
///
/// PostGIS layers Z, M and SRID flags on top of the OGC base code; the
/// flags announce the per-vertex double count and whether a 4-byte SRID
/// follows the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeCode {
    pub geometry_type: GeometryType,
    pub dimz: bool,
    pub dimm: bool,
    pub has_srid: bool,
}

impl TypeCode {
    /// Decode a type word read from a WKB stream
    ///
    /// The base geometry class is the low byte of the word, so ISO-WKB
    /// style codes (1001 and friends) do not land on a supported class
    /// and are rejected.
    pub fn decode(word: u32) -> Result<Self, GeometryError> {
        let geometry_type = GeometryType::try_from_wkb_id(word & BASE_MASK)?;
        Ok(Self {
            geometry_type,
            dimz: word & Z_FLAG != 0,
            dimm: word & M_FLAG != 0,
            has_srid: word & SRID_FLAG != 0,
        })
    }

    /// Encode the word for emission
    pub fn encode(&self) -> u32 {
        let mut word = self.geometry_type.wkb_id();
        if self.dimz {
            word |= Z_FLAG;
        }
        if self.dimm {
            word |= M_FLAG;
        }
        if self.has_srid {
            word |= SRID_FLAG;
        }
        word
    }

    /// The dimensionality the flags declare
    pub fn dimensions(&self) -> Dimensions {
        dimensions_from_flags(self.dimz, self.dimm)
    }
}

/// Map Z/M flags onto the [Dimensions] vocabulary
pub(crate) fn dimensions_from_flags(dimz: bool, dimm: bool) -> Dimensions {
    match (dimz, dimm) {
        (false, false) => Dimensions::Xy,
        (true, false) => Dimensions::Xyz,
        (false, true) => Dimensions::Xym,
        (true, true) => Dimensions::Xyzm,
    }
}
