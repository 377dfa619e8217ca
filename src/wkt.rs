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

//! WKT/EWKT reading and writing
//!
//! The reader is a small tokenizer plus a recursive-descent parser over
//! the grammar of the seven supported geometry classes, with an optional
//! `SRID=n;` prefix and `Z`/`M`/`ZM` modifiers. Keywords are matched
//! case-insensitively. Without a modifier the dimensionality is inferred
//! from the first coordinate's arity, reading a third value as Z.
//! `EMPTY` bodies are rejected on input; the writer still renders a
//! memberless multigeometry as `<TAG> EMPTY`.

use std::str::FromStr;

use crate::error::GeometryError;
use crate::geometry::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};
use crate::number;
use crate::types::GeometryType;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    LParen,
    RParen,
    Comma,
    Semicolon,
    Equals,
}

fn lex(input: &str) -> Result<Vec<(Token, usize)>, GeometryError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'(' => {
                tokens.push((Token::LParen, i));
                i += 1;
            }
            b')' => {
                tokens.push((Token::RParen, i));
                i += 1;
            }
            b',' => {
                tokens.push((Token::Comma, i));
                i += 1;
            }
            b';' => {
                tokens.push((Token::Semicolon, i));
                i += 1;
            }
            b'=' => {
                tokens.push((Token::Equals, i));
                i += 1;
            }
            b'A'..=b'Z' | b'a'..=b'z' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                tokens.push((Token::Ident(input[start..i].to_string()), start));
            }
            b'-' | b'0'..=b'9' => {
                let start = i;
                if bytes[i] == b'-' {
                    i += 1;
                }
                let digits = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if i == digits {
                    return Err(GeometryError::Wkt(format!(
                        "expected number at offset {start}"
                    )));
                }
                if i < bytes.len() && bytes[i] == b'.' {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let value = input[start..i].parse::<f64>().map_err(|_| {
                    GeometryError::Wkt(format!("bad number at offset {start}"))
                })?;
                tokens.push((Token::Number(value), start));
            }
            other => {
                return Err(GeometryError::Wkt(format!(
                    "unexpected character '{}' at offset {i}",
                    other as char
                )))
            }
        }
    }
    Ok(tokens)
}

/// Parse WKT or EWKT into a geometry
pub(crate) fn parse(input: &str) -> Result<Geometry, GeometryError> {
    let mut parser = Parser {
        tokens: lex(input)?,
        pos: 0,
        end: input.len(),
    };
    let srid = parser.srid_prefix()?;
    let geometry = parser.geometry(srid)?;
    if let Some(offset) = parser.peek_offset() {
        return Err(GeometryError::Wkt(format!(
            "unexpected trailing input at offset {offset}"
        )));
    }
    Ok(geometry)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_offset(&self) -> Option<usize> {
        self.tokens.get(self.pos).map(|(_, o)| *o)
    }

    fn offset(&self) -> usize {
        self.peek_offset().unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), GeometryError> {
        let offset = self.offset();
        if !self.eat(&token) {
            return Err(GeometryError::Wkt(format!(
                "expected {what} at offset {offset}"
            )));
        }
        Ok(())
    }

    fn srid_prefix(&mut self) -> Result<Option<i32>, GeometryError> {
        match self.peek() {
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("srid") => {}
            _ => return Ok(None),
        }
        self.pos += 1;
        self.expect(Token::Equals, "'=' after SRID")?;
        let offset = self.offset();
        let value = match self.next() {
            Some((Token::Number(value), _)) => value,
            _ => {
                return Err(GeometryError::Wkt(format!(
                    "expected an integer SRID at offset {offset}"
                )))
            }
        };
        if value < 0.0 || value.fract() != 0.0 || value > i32::MAX as f64 {
            return Err(GeometryError::Wkt(format!(
                "expected an integer SRID at offset {offset}"
            )));
        }
        self.expect(Token::Semicolon, "';' after the SRID prefix")?;
        Ok(Some(value as i32))
    }

    fn geometry(&mut self, srid: Option<i32>) -> Result<Geometry, GeometryError> {
        let offset = self.offset();
        let name = match self.next() {
            Some((Token::Ident(name), _)) => name,
            _ => {
                return Err(GeometryError::Wkt(format!(
                    "expected a geometry type at offset {offset}"
                )))
            }
        };
        let geometry_type = GeometryType::from_str(&name).map_err(|_| {
            GeometryError::Wkt(format!(
                "unknown geometry type '{name}' at offset {offset}"
            ))
        })?;
        let mut dims = self.modifier();
        self.reject_empty()?;
        match geometry_type {
            GeometryType::Point => self.point(srid, &mut dims).map(Geometry::Point),
            GeometryType::LineString => {
                self.expect(Token::LParen, "opening parenthesis")?;
                let vertices = self.coord_sequence(&mut dims, 2, "a linestring")?;
                self.expect(Token::RParen, "closing parenthesis")?;
                LineString::new(vertices, srid).map(Geometry::LineString)
            }
            GeometryType::Polygon => {
                let rings = self.rings(&mut dims)?;
                Polygon::new(rings, srid).map(Geometry::Polygon)
            }
            GeometryType::MultiPoint => {
                self.expect(Token::LParen, "opening parenthesis")?;
                let mut members = vec![self.multipoint_member(&mut dims)?];
                while self.eat(&Token::Comma) {
                    members.push(self.multipoint_member(&mut dims)?);
                }
                self.expect(Token::RParen, "closing parenthesis")?;
                MultiPoint::new(members, srid).map(Geometry::MultiPoint)
            }
            GeometryType::MultiLineString => {
                self.expect(Token::LParen, "opening parenthesis")?;
                let mut members = vec![self.linestring_member(&mut dims)?];
                while self.eat(&Token::Comma) {
                    members.push(self.linestring_member(&mut dims)?);
                }
                self.expect(Token::RParen, "closing parenthesis")?;
                MultiLineString::new(members, srid).map(Geometry::MultiLineString)
            }
            GeometryType::MultiPolygon => {
                self.expect(Token::LParen, "opening parenthesis")?;
                let mut members = vec![Polygon::new(self.rings(&mut dims)?, None)?];
                while self.eat(&Token::Comma) {
                    members.push(Polygon::new(self.rings(&mut dims)?, None)?);
                }
                self.expect(Token::RParen, "closing parenthesis")?;
                MultiPolygon::new(members, srid).map(Geometry::MultiPolygon)
            }
            GeometryType::GeometryCollection => self.collection(srid, dims),
        }
    }

    fn modifier(&mut self) -> Option<(bool, bool)> {
        let dims = match self.peek() {
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("z") => (true, false),
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("m") => (false, true),
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("zm") => (true, true),
            _ => return None,
        };
        self.pos += 1;
        Some(dims)
    }

    fn reject_empty(&mut self) -> Result<(), GeometryError> {
        if let Some(Token::Ident(word)) = self.peek() {
            if word.eq_ignore_ascii_case("empty") {
                return Err(GeometryError::Wkt(format!(
                    "geometries without coordinates are not supported at offset {}",
                    self.offset()
                )));
            }
        }
        Ok(())
    }

    /// One coordinate: consecutive numbers resolved against the declared
    /// or inferred dimensionality
    fn vertex(&mut self, dims: &mut Option<(bool, bool)>) -> Result<Point, GeometryError> {
        let offset = self.offset();
        let mut values = Vec::new();
        while let Some(Token::Number(value)) = self.peek() {
            values.push(*value);
            self.pos += 1;
        }
        if values.len() < 2 {
            return Err(GeometryError::Wkt(format!(
                "expected number at offset {}",
                self.offset()
            )));
        }
        let (dimz, dimm) = match *dims {
            Some((dimz, dimm)) => {
                let expected = 2 + usize::from(dimz) + usize::from(dimm);
                if values.len() != expected {
                    return Err(GeometryError::Wkt(format!(
                        "expected {expected} coordinates per vertex, got {} at offset {offset}",
                        values.len()
                    )));
                }
                (dimz, dimm)
            }
            None => {
                let inferred = match values.len() {
                    2 => (false, false),
                    3 => (true, false),
                    4 => (true, true),
                    n => {
                        return Err(GeometryError::Wkt(format!(
                            "expected 2 to 4 coordinates per vertex, got {n} at offset {offset}"
                        )))
                    }
                };
                *dims = Some(inferred);
                inferred
            }
        };
        Point::with_dims(&values, None, dimz, dimm)
    }

    fn point(
        &mut self,
        srid: Option<i32>,
        dims: &mut Option<(bool, bool)>,
    ) -> Result<Point, GeometryError> {
        self.expect(Token::LParen, "opening parenthesis")?;
        let vertex = self.vertex(dims)?;
        self.expect(Token::RParen, "closing parenthesis")?;
        let mut point = vertex;
        point.meta_mut().srid = srid;
        Ok(point)
    }

    fn coord_sequence(
        &mut self,
        dims: &mut Option<(bool, bool)>,
        min: usize,
        what: &str,
    ) -> Result<Vec<Point>, GeometryError> {
        let offset = self.offset();
        let mut vertices = vec![self.vertex(dims)?];
        while self.eat(&Token::Comma) {
            vertices.push(self.vertex(dims)?);
        }
        if vertices.len() < min {
            return Err(GeometryError::Wkt(format!(
                "{what} needs at least {min} vertices, got {} at offset {offset}",
                vertices.len()
            )));
        }
        Ok(vertices)
    }

    fn linestring_member(
        &mut self,
        dims: &mut Option<(bool, bool)>,
    ) -> Result<LineString, GeometryError> {
        self.expect(Token::LParen, "opening parenthesis")?;
        let vertices = self.coord_sequence(dims, 2, "a linestring")?;
        self.expect(Token::RParen, "closing parenthesis")?;
        LineString::new(vertices, None)
    }

    fn rings(&mut self, dims: &mut Option<(bool, bool)>) -> Result<Vec<LineString>, GeometryError> {
        self.expect(Token::LParen, "opening parenthesis")?;
        let mut rings = vec![self.ring(dims)?];
        while self.eat(&Token::Comma) {
            rings.push(self.ring(dims)?);
        }
        self.expect(Token::RParen, "closing parenthesis")?;
        Ok(rings)
    }

    fn ring(&mut self, dims: &mut Option<(bool, bool)>) -> Result<LineString, GeometryError> {
        self.expect(Token::LParen, "opening parenthesis")?;
        let vertices = self.coord_sequence(dims, 4, "a polygon ring")?;
        self.expect(Token::RParen, "closing parenthesis")?;
        LineString::new(vertices, None)
    }

    fn multipoint_member(
        &mut self,
        dims: &mut Option<(bool, bool)>,
    ) -> Result<Point, GeometryError> {
        if self.eat(&Token::LParen) {
            let vertex = self.vertex(dims)?;
            self.expect(Token::RParen, "closing parenthesis")?;
            Ok(vertex)
        } else {
            self.vertex(dims)
        }
    }

    fn collection(
        &mut self,
        srid: Option<i32>,
        dims: Option<(bool, bool)>,
    ) -> Result<Geometry, GeometryError> {
        self.expect(Token::LParen, "opening parenthesis")?;
        let mut members = vec![self.geometry(None)?];
        while self.eat(&Token::Comma) {
            members.push(self.geometry(None)?);
        }
        self.expect(Token::RParen, "closing parenthesis")?;
        let collection = GeometryCollection::new(members, srid)?;
        if let Some((dimz, dimm)) = dims {
            if (collection.has_z(), collection.has_m()) != (dimz, dimm) {
                return Err(GeometryError::Wkt(
                    "collection modifier does not match its members' dimensions".to_string(),
                ));
            }
        }
        Ok(Geometry::GeometryCollection(collection))
    }
}

/// Write a geometry as WKT, with the `SRID=n;` prefix in EWKT mode
pub(crate) fn write(geometry: &Geometry, include_srid: bool) -> Result<String, GeometryError> {
    let mut out = String::new();
    if include_srid {
        if let Some(srid) = geometry.srid() {
            out.push_str(&format!("SRID={srid};"));
        }
    }
    write_geometry(&mut out, geometry, true)?;
    Ok(out)
}

fn write_geometry(
    out: &mut String,
    geometry: &Geometry,
    outermost: bool,
) -> Result<(), GeometryError> {
    out.push_str(geometry.geometry_type().wkt_id());
    // the modifier appears once, on the outermost tag
    if outermost {
        match (geometry.has_z(), geometry.has_m()) {
            (true, true) => out.push_str(" ZM"),
            (true, false) => out.push_str(" Z"),
            (false, true) => out.push_str(" M"),
            (false, false) => {}
        }
    }
    match geometry {
        Geometry::Point(p) => {
            out.push_str(" (");
            write_vertex(out, p)?;
            out.push(')');
        }
        Geometry::LineString(ls) => write_vertex_list(out, ls.vertices()?)?,
        Geometry::Polygon(pg) => write_ring_list(out, pg.rings()?)?,
        Geometry::MultiPoint(mp) => write_vertex_list(out, mp.points()?)?,
        Geometry::MultiLineString(ml) => {
            let members = ml.linestrings()?;
            if members.is_empty() {
                out.push_str(" EMPTY");
                return Ok(());
            }
            out.push_str(" (");
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_vertices_wrapped(out, member.vertices()?)?;
            }
            out.push(')');
        }
        Geometry::MultiPolygon(mp) => {
            let members = mp.polygons()?;
            if members.is_empty() {
                out.push_str(" EMPTY");
                return Ok(());
            }
            out.push_str(" (");
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_rings_wrapped(out, member.rings()?)?;
            }
            out.push(')');
        }
        Geometry::GeometryCollection(gc) => {
            let members = gc.geometries()?;
            if members.is_empty() {
                out.push_str(" EMPTY");
                return Ok(());
            }
            out.push_str(" (");
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_geometry(out, member, false)?;
            }
            out.push(')');
        }
    }
    Ok(())
}

fn write_vertex(out: &mut String, point: &Point) -> Result<(), GeometryError> {
    out.push_str(&number::format_double(point.x()?)?);
    out.push(' ');
    out.push_str(&number::format_double(point.y()?)?);
    if let Some(z) = point.z()? {
        out.push(' ');
        out.push_str(&number::format_double(z)?);
    }
    if let Some(m) = point.m()? {
        out.push(' ');
        out.push_str(&number::format_double(m)?);
    }
    Ok(())
}

fn write_vertex_list(out: &mut String, vertices: &[Point]) -> Result<(), GeometryError> {
    if vertices.is_empty() {
        out.push_str(" EMPTY");
        return Ok(());
    }
    out.push(' ');
    write_vertices_wrapped(out, vertices)
}

fn write_vertices_wrapped(out: &mut String, vertices: &[Point]) -> Result<(), GeometryError> {
    out.push('(');
    for (i, vertex) in vertices.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_vertex(out, vertex)?;
    }
    out.push(')');
    Ok(())
}

fn write_ring_list(out: &mut String, rings: &[LineString]) -> Result<(), GeometryError> {
    if rings.is_empty() {
        out.push_str(" EMPTY");
        return Ok(());
    }
    out.push(' ');
    write_rings_wrapped(out, rings)
}

fn write_rings_wrapped(out: &mut String, rings: &[LineString]) -> Result<(), GeometryError> {
    out.push('(');
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_vertices_wrapped(out, ring.vertices()?)?;
    }
    out.push(')');
    Ok(())
}
