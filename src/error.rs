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
use std::io;

use thiserror::Error;

/// Errors raised by the geometry codec
///
/// Every decoder fails on the first structural violation; no partial
/// geometry is ever handed back. Messages carry a short reason and, where
/// it helps, the byte or character offset of the failure.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// Malformed hex or (E)WKB input, or a failure while emitting WKB
    #[error("Invalid WKB: {0}")]
    Wkb(String),
    /// Lex or parse failure in WKT/EWKT, or a non-finite number at emission
    #[error("Invalid WKT: {0}")]
    Wkt(String),
    /// Malformed or unsupported GeoJSON
    #[error("Invalid GeoJSON: {0}")]
    Geojson(String),
    /// Mismatched SRIDs between a composite and its members
    #[error("Invalid SRID: {0}")]
    Srid(String),
    /// Wrong member class for a typed multigeometry, or an incompatible
    /// concatenation
    #[error("Invalid collection: {0}")]
    Collection(String),
    /// Coordinate sequence inconsistent with the declared dimensionality
    #[error("Invalid coordinates: {0}")]
    Coordinate(String),
    /// Mixed Z/M flags between a composite and its members, or an attempt
    /// to remove a declared dimension
    #[error("Invalid dimensionality: {0}")]
    Dimensionality(String),
}

impl From<io::Error> for GeometryError {
    fn from(value: io::Error) -> Self {
        GeometryError::Wkb(format!("write failed: {value}"))
    }
}
