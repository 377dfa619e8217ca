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

//! Multigeometry operators: membership, indexing, iteration and
//! concatenation
//!
//! Concatenation promotes by family: operands of one family produce the
//! typed multigeometry of that family, anything else flattens into a
//! GeometryCollection. Operand SRIDs must agree; the members of the
//! result never carry their own.

use std::ops::{Add, Index, IndexMut};
use std::slice;

use crate::error::GeometryError;
use crate::geometry::{
    Geometry, GeometryCollection, GeometryLike, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use crate::types::GeometryType;

macro_rules! impl_multi_ops {
    ($name:ident, $member:ident, $accessor:ident, $accessor_mut:ident) => {
        impl $name {
            /// Number of members
            ///
            /// Panics when a retained WKB body cannot be decoded; use the
            /// member accessor for fallible access.
            pub fn len(&self) -> usize {
                self.$accessor()
                    .expect("undecodable multigeometry body")
                    .len()
            }

            /// True if the multigeometry has no members
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Append a member
            ///
            /// The member's dimensionality must equal the container's, and
            /// its SRID must be absent or equal to the container's.
            pub fn push(&mut self, mut member: $member) -> Result<(), GeometryError> {
                let container = self.meta().clone();
                match member.meta().srid {
                    None => {}
                    Some(s) if container.srid == Some(s) => {
                        member.ensure_loaded()?;
                        member.meta_mut().srid = None;
                    }
                    Some(s) => {
                        return Err(GeometryError::Srid(format!(
                            "cannot insert a member with SRID {s} into a container with {}",
                            match container.srid {
                                Some(c) => c.to_string(),
                                None => "no SRID".to_string(),
                            }
                        )))
                    }
                }
                if member.meta().dimz != container.dimz || member.meta().dimm != container.dimm {
                    return Err(GeometryError::Dimensionality(
                        "member dimensionality does not match the container".to_string(),
                    ));
                }
                self.members_vec_mut()?.push(member);
                Ok(())
            }

            /// Remove and return the last member
            pub fn pop(&mut self) -> Result<$member, GeometryError> {
                self.members_vec_mut()?.pop().ok_or_else(|| {
                    GeometryError::Collection(
                        concat!("cannot pop from an empty ", stringify!($name)).to_string(),
                    )
                })
            }

            /// Remove and return the member at `index`
            pub fn remove(&mut self, index: usize) -> Result<$member, GeometryError> {
                let members = self.members_vec_mut()?;
                if index >= members.len() {
                    return Err(GeometryError::Collection(format!(
                        "no member at index {index}"
                    )));
                }
                Ok(members.remove(index))
            }
        }

        impl Index<usize> for $name {
            type Output = $member;

            fn index(&self, index: usize) -> &$member {
                &self
                    .$accessor()
                    .expect("undecodable multigeometry body")[index]
            }
        }

        impl IndexMut<usize> for $name {
            fn index_mut(&mut self, index: usize) -> &mut $member {
                &mut self
                    .$accessor_mut()
                    .expect("undecodable multigeometry body")[index]
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $member;
            type IntoIter = slice::Iter<'a, $member>;

            fn into_iter(self) -> Self::IntoIter {
                self.$accessor()
                    .expect("undecodable multigeometry body")
                    .iter()
            }
        }
    };
}

impl_multi_ops!(MultiPoint, Point, points, points_mut);
impl_multi_ops!(MultiLineString, LineString, linestrings, linestrings_mut);
impl_multi_ops!(MultiPolygon, Polygon, polygons, polygons_mut);
impl_multi_ops!(GeometryCollection, Geometry, geometries, geometries_mut);

impl Geometry {
    /// Append a member to a multigeometry
    ///
    /// Typed multigeometries only accept their own member class; a
    /// GeometryCollection accepts any geometry.
    pub fn append(&mut self, child: Geometry) -> Result<(), GeometryError> {
        match (self, child) {
            (Geometry::MultiPoint(mp), Geometry::Point(p)) => mp.push(p),
            (Geometry::MultiLineString(ml), Geometry::LineString(ls)) => ml.push(ls),
            (Geometry::MultiPolygon(mpg), Geometry::Polygon(pg)) => mpg.push(pg),
            (Geometry::GeometryCollection(gc), child) => gc.push(child),
            (target, child) => Err(GeometryError::Collection(format!(
                "cannot append a {} to a {}",
                child.geometry_type(),
                target.geometry_type()
            ))),
        }
    }

    /// Remove and return the last member of a multigeometry
    pub fn pop(&mut self) -> Result<Geometry, GeometryError> {
        match self {
            Geometry::MultiPoint(mp) => mp.pop().map(Geometry::Point),
            Geometry::MultiLineString(ml) => ml.pop().map(Geometry::LineString),
            Geometry::MultiPolygon(mpg) => mpg.pop().map(Geometry::Polygon),
            Geometry::GeometryCollection(gc) => gc.pop(),
            other => Err(GeometryError::Collection(format!(
                "cannot pop from a {}",
                other.geometry_type()
            ))),
        }
    }

    /// Remove and return the member at `index` of a multigeometry
    pub fn remove(&mut self, index: usize) -> Result<Geometry, GeometryError> {
        match self {
            Geometry::MultiPoint(mp) => mp.remove(index).map(Geometry::Point),
            Geometry::MultiLineString(ml) => ml.remove(index).map(Geometry::LineString),
            Geometry::MultiPolygon(mpg) => mpg.remove(index).map(Geometry::Polygon),
            Geometry::GeometryCollection(gc) => gc.remove(index),
            other => Err(GeometryError::Collection(format!(
                "cannot remove members from a {}",
                other.geometry_type()
            ))),
        }
    }

    /// Concatenate two geometries into a multigeometry
    ///
    /// Operands of the same family produce that family's multigeometry;
    /// any GeometryCollection operand or a cross-family mix produces a
    /// GeometryCollection, with multigeometry operands contributing their
    /// members rather than themselves. Operand SRIDs must agree.
    pub fn concat(&self, other: &Geometry) -> Result<Geometry, GeometryError> {
        check_operand_srids(self, other)?;
        let srid = self.srid();
        match (family(self), family(other)) {
            (Some(GeometryType::Point), Some(GeometryType::Point)) => {
                let mut members = self.point_members()?;
                members.extend(other.point_members()?);
                MultiPoint::new(members, srid).map(Geometry::MultiPoint)
            }
            (Some(GeometryType::LineString), Some(GeometryType::LineString)) => {
                let mut members = self.linestring_members()?;
                members.extend(other.linestring_members()?);
                MultiLineString::new(members, srid).map(Geometry::MultiLineString)
            }
            (Some(GeometryType::Polygon), Some(GeometryType::Polygon)) => {
                let mut members = self.polygon_members()?;
                members.extend(other.polygon_members()?);
                MultiPolygon::new(members, srid).map(Geometry::MultiPolygon)
            }
            _ => {
                let mut members = self.collection_members()?;
                members.extend(other.collection_members()?);
                GeometryCollection::new(members, srid).map(Geometry::GeometryCollection)
            }
        }
    }

    /// In-place concatenation
    ///
    /// A typed multigeometry only accepts members of its own family; a
    /// GeometryCollection accepts anything; a primitive receiver is
    /// replaced by the promoted result of [Geometry::concat].
    pub fn extend(&mut self, other: &Geometry) -> Result<(), GeometryError> {
        check_operand_srids(self, other)?;
        match self {
            Geometry::MultiPoint(mp) => {
                for member in other.point_members()? {
                    mp.push(member)?;
                }
                Ok(())
            }
            Geometry::MultiLineString(ml) => {
                for member in other.linestring_members()? {
                    ml.push(member)?;
                }
                Ok(())
            }
            Geometry::MultiPolygon(mpg) => {
                for member in other.polygon_members()? {
                    mpg.push(member)?;
                }
                Ok(())
            }
            Geometry::GeometryCollection(gc) => {
                for member in other.collection_members()? {
                    gc.push(member)?;
                }
                Ok(())
            }
            _ => {
                *self = self.concat(other)?;
                Ok(())
            }
        }
    }

    fn point_members(&self) -> Result<Vec<Point>, GeometryError> {
        match self {
            Geometry::Point(p) => Ok(vec![p.detached()?]),
            Geometry::MultiPoint(mp) => mp.points()?.iter().map(Point::detached).collect(),
            other => Err(GeometryError::Collection(format!(
                "cannot combine a {} with points",
                other.geometry_type()
            ))),
        }
    }

    fn linestring_members(&self) -> Result<Vec<LineString>, GeometryError> {
        match self {
            Geometry::LineString(ls) => Ok(vec![ls.detached()?]),
            Geometry::MultiLineString(ml) => {
                ml.linestrings()?.iter().map(LineString::detached).collect()
            }
            other => Err(GeometryError::Collection(format!(
                "cannot combine a {} with linestrings",
                other.geometry_type()
            ))),
        }
    }

    fn polygon_members(&self) -> Result<Vec<Polygon>, GeometryError> {
        match self {
            Geometry::Polygon(pg) => Ok(vec![pg.detached()?]),
            Geometry::MultiPolygon(mpg) => mpg.polygons()?.iter().map(Polygon::detached).collect(),
            other => Err(GeometryError::Collection(format!(
                "cannot combine a {} with polygons",
                other.geometry_type()
            ))),
        }
    }

    /// Members contributed to a GeometryCollection: multigeometries
    /// flatten one level, primitives contribute themselves
    fn collection_members(&self) -> Result<Vec<Geometry>, GeometryError> {
        match self {
            Geometry::MultiPoint(mp) => mp
                .points()?
                .iter()
                .map(|p| p.detached().map(Geometry::Point))
                .collect(),
            Geometry::MultiLineString(ml) => ml
                .linestrings()?
                .iter()
                .map(|ls| ls.detached().map(Geometry::LineString))
                .collect(),
            Geometry::MultiPolygon(mpg) => mpg
                .polygons()?
                .iter()
                .map(|pg| pg.detached().map(Geometry::Polygon))
                .collect(),
            Geometry::GeometryCollection(gc) => {
                gc.geometries()?.iter().map(Geometry::detached).collect()
            }
            primitive => Ok(vec![primitive.detached()?]),
        }
    }
}

fn family(geometry: &Geometry) -> Option<GeometryType> {
    match geometry.geometry_type() {
        GeometryType::Point | GeometryType::MultiPoint => Some(GeometryType::Point),
        GeometryType::LineString | GeometryType::MultiLineString => Some(GeometryType::LineString),
        GeometryType::Polygon | GeometryType::MultiPolygon => Some(GeometryType::Polygon),
        GeometryType::GeometryCollection => None,
    }
}

fn check_operand_srids(left: &Geometry, right: &Geometry) -> Result<(), GeometryError> {
    if left.srid() != right.srid() {
        return Err(GeometryError::Collection(format!(
            "cannot concatenate geometries with different SRIDs ({} and {})",
            fmt_srid(left.srid()),
            fmt_srid(right.srid())
        )));
    }
    Ok(())
}

fn fmt_srid(srid: Option<i32>) -> String {
    match srid {
        Some(s) => s.to_string(),
        None => "none".to_string(),
    }
}

impl Add<&Geometry> for &Geometry {
    type Output = Result<Geometry, GeometryError>;

    fn add(self, rhs: &Geometry) -> Self::Output {
        self.concat(rhs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pt(coords: &[f64]) -> Geometry {
        Geometry::Point(Point::new(coords, None).unwrap())
    }

    fn pt_srid(coords: &[f64], srid: i32) -> Geometry {
        Geometry::Point(Point::new(coords, Some(srid)).unwrap())
    }

    fn ls(coords: &[[f64; 3]]) -> Geometry {
        let vertices = coords
            .iter()
            .map(|c| Point::new(c, None).unwrap())
            .collect();
        Geometry::LineString(LineString::new(vertices, None).unwrap())
    }

    #[test]
    fn add_points() {
        let p1 = pt(&[1.0, 1.0, 1.0]);
        let p2 = pt(&[2.0, 2.0, 2.0]);

        let mp = (&p1 + &p2).unwrap();
        assert_eq!(mp.geometry_type(), GeometryType::MultiPoint);
        match &mp {
            Geometry::MultiPoint(mp) => {
                assert_eq!(mp.len(), 2);
                assert_eq!(mp[0].x().unwrap(), 1.0);
                assert_eq!(mp[1].z().unwrap(), Some(2.0));
            }
            other => panic!("expected a multipoint, got {other:?}"),
        }

        // point + multipoint and multipoint + point both extend
        let p3 = pt(&[3.0, 3.0, 3.0]);
        let bigger = (&p3 + &mp).unwrap();
        match &bigger {
            Geometry::MultiPoint(mp) => assert_eq!(mp.len(), 3),
            other => panic!("expected a multipoint, got {other:?}"),
        }
        let bigger = (&mp + &p3).unwrap();
        match &bigger {
            Geometry::MultiPoint(mp) => assert_eq!(mp.len(), 3),
            other => panic!("expected a multipoint, got {other:?}"),
        }
    }

    #[test]
    fn add_lines_and_polygons() {
        let l1 = ls(&[[3.0, 4.0, 5.0], [9.0, 10.0, 11.0]]);
        let l2 = ls(&[[9.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        let mls = (&l1 + &l2).unwrap();
        assert_eq!(mls.geometry_type(), GeometryType::MultiLineString);

        let pg1 = Geometry::from_wkt("POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0))").unwrap();
        let pg2 = Geometry::from_wkt("POLYGON ((1 1, 2 1, 2 2, 1 2, 1 1))").unwrap();
        let mpg = (&pg1 + &pg2).unwrap();
        assert_eq!(mpg.geometry_type(), GeometryType::MultiPolygon);
        match &mpg {
            Geometry::MultiPolygon(mpg) => assert_eq!(mpg.len(), 2),
            other => panic!("expected a multipolygon, got {other:?}"),
        }
    }

    #[test]
    fn add_mixed_families_flattens_into_collection() {
        let p1 = pt(&[1.0, 1.0, 1.0]);
        let p2 = pt(&[2.0, 2.0, 2.0]);
        let line = ls(&[[3.0, 4.0, 5.0], [9.0, 10.0, 11.0]]);

        let gc = (&p1 + &line).unwrap();
        assert_eq!(gc.geometry_type(), GeometryType::GeometryCollection);
        match &gc {
            Geometry::GeometryCollection(gc) => assert_eq!(gc.len(), 2),
            other => panic!("expected a collection, got {other:?}"),
        }

        // a multipoint operand contributes its members, not itself
        let mp = (&p1 + &p2).unwrap();
        let gc = (&mp + &line).unwrap();
        match &gc {
            Geometry::GeometryCollection(gc) => assert_eq!(gc.len(), 3),
            other => panic!("expected a collection, got {other:?}"),
        }

        // and a collection operand keeps flattening
        let gc2 = (&gc + &p2).unwrap();
        match &gc2 {
            Geometry::GeometryCollection(gc) => assert_eq!(gc.len(), 4),
            other => panic!("expected a collection, got {other:?}"),
        }
        let gc3 = (&p2 + &gc).unwrap();
        match &gc3 {
            Geometry::GeometryCollection(gc) => assert_eq!(gc.len(), 4),
            other => panic!("expected a collection, got {other:?}"),
        }
    }

    #[test]
    fn add_srid_rules() {
        let p1 = pt_srid(&[1.0, 1.0, 1.0], 4326);
        let p2 = pt_srid(&[2.0, 2.0, 2.0], 1234);
        assert!(matches!(&p1 + &p2, Err(GeometryError::Collection(_))));

        let mut p2 = p2;
        p2.set_srid(Some(4326));
        let mp = (&p1 + &p2).unwrap();
        assert_eq!(mp.srid(), Some(4326));
        match &mp {
            Geometry::MultiPoint(mp) => {
                assert_eq!(mp.len(), 2);
                // members of a concatenation never carry their own SRID
                assert_eq!(mp[0].srid(), None);
            }
            other => panic!("expected a multipoint, got {other:?}"),
        }

        // containers re-tagged to a common SRID concatenate again
        let mut mp1 = (&pt_srid(&[0.0, 0.0], 4326) + &pt_srid(&[1.0, 1.0], 4326)).unwrap();
        let mut mp2 = (&pt_srid(&[2.0, 2.0], 1234) + &pt_srid(&[3.0, 3.0], 1234)).unwrap();
        assert!(matches!(&mp1 + &mp2, Err(GeometryError::Collection(_))));
        mp1.set_srid(Some(3857));
        mp2.set_srid(Some(3857));
        let mp3 = (&mp1 + &mp2).unwrap();
        assert_eq!(mp3.srid(), Some(3857));
        match &mp3 {
            Geometry::MultiPoint(mp) => assert_eq!(mp.len(), 4),
            other => panic!("expected a multipoint, got {other:?}"),
        }
    }

    #[test]
    fn extend_typed_multigeometry() {
        let mut mp = (&pt(&[1.0, 1.0, 1.0]) + &pt(&[2.0, 2.0, 2.0])).unwrap();
        mp.extend(&pt(&[3.0, 3.0, 3.0])).unwrap();
        match &mp {
            Geometry::MultiPoint(inner) => assert_eq!(inner.len(), 3),
            other => panic!("expected a multipoint, got {other:?}"),
        }

        let more = (&pt(&[4.0, 4.0, 4.0]) + &pt(&[5.0, 5.0, 5.0])).unwrap();
        mp.extend(&more).unwrap();
        match &mp {
            Geometry::MultiPoint(inner) => assert_eq!(inner.len(), 5),
            other => panic!("expected a multipoint, got {other:?}"),
        }

        // wrong family does not promote in place
        let line = ls(&[[3.0, 4.0, 5.0], [9.0, 10.0, 11.0]]);
        assert!(matches!(
            mp.extend(&line),
            Err(GeometryError::Collection(_))
        ));
    }

    #[test]
    fn extend_collection_accepts_anything() {
        let line = ls(&[[3.0, 4.0, 5.0], [9.0, 10.0, 11.0]]);
        let mut gc = (&pt(&[1.0, 1.0, 1.0]) + &line).unwrap();
        gc.extend(&pt(&[2.0, 2.0, 2.0])).unwrap();
        match &gc {
            Geometry::GeometryCollection(inner) => assert_eq!(inner.len(), 3),
            other => panic!("expected a collection, got {other:?}"),
        }

        let mp = (&pt(&[4.0, 4.0, 4.0]) + &pt(&[5.0, 5.0, 5.0])).unwrap();
        gc.extend(&mp).unwrap();
        match &gc {
            Geometry::GeometryCollection(inner) => assert_eq!(inner.len(), 5),
            other => panic!("expected a collection, got {other:?}"),
        }
    }

    #[test]
    fn extend_primitive_promotes() {
        let mut g = pt(&[1.0, 1.0]);
        g.extend(&pt(&[2.0, 2.0])).unwrap();
        assert_eq!(g.geometry_type(), GeometryType::MultiPoint);
    }

    #[test]
    fn extend_srid_mismatch() {
        let mut mp = (&pt_srid(&[0.0, 0.0], 4326) + &pt_srid(&[1.0, 1.0], 4326)).unwrap();
        let foreign = pt_srid(&[3.0, 3.0], 1234);
        assert!(matches!(
            mp.extend(&foreign),
            Err(GeometryError::Collection(_))
        ));
    }

    #[test]
    fn append_and_pop() {
        let mut mp = (&pt(&[0.0, 0.0]) + &pt(&[1.0, 1.0])).unwrap();
        mp.append(pt(&[2.0, 2.0])).unwrap();
        match &mp {
            Geometry::MultiPoint(inner) => assert_eq!(inner.len(), 3),
            other => panic!("expected a multipoint, got {other:?}"),
        }

        // wrong member class
        let line = ls(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        assert!(matches!(
            mp.append(line.clone()),
            Err(GeometryError::Collection(_))
        ));

        // wrong dimensionality
        assert!(matches!(
            mp.append(pt(&[2.0, 2.0, 2.0])),
            Err(GeometryError::Dimensionality(_))
        ));

        // wrong member SRID
        assert!(matches!(
            mp.append(pt_srid(&[2.0, 2.0], 999)),
            Err(GeometryError::Srid(_))
        ));

        let last = mp.pop().unwrap();
        match &last {
            Geometry::Point(p) => assert_eq!(p.x().unwrap(), 2.0),
            other => panic!("expected a point, got {other:?}"),
        }
        mp.pop().unwrap();
        mp.pop().unwrap();
        assert!(matches!(mp.pop(), Err(GeometryError::Collection(_))));

        // primitives have no members to pop
        let mut p = pt(&[0.0, 0.0]);
        assert!(matches!(p.pop(), Err(GeometryError::Collection(_))));
    }

    #[test]
    fn indexing_and_iteration() {
        let mp = MultiPoint::new(
            vec![
                Point::new(&[0.0, 0.0], None).unwrap(),
                Point::new(&[1.0, 1.0], None).unwrap(),
            ],
            None,
        )
        .unwrap();
        assert_eq!(mp.len(), 2);
        assert!(!mp.is_empty());
        assert_eq!(mp[0].x().unwrap(), 0.0);
        assert_eq!(mp[1].y().unwrap(), 1.0);

        let xs: Vec<f64> = (&mp).into_iter().map(|p| p.x().unwrap()).collect();
        assert_eq!(xs, vec![0.0, 1.0]);
    }

    #[test]
    fn index_mut_replaces_members() {
        let mut mp = MultiPoint::new(
            vec![
                Point::new(&[0.0, 0.0], None).unwrap(),
                Point::new(&[1.0, 1.0], None).unwrap(),
            ],
            None,
        )
        .unwrap();
        mp[0] = Point::new(&[2.0, 2.0], None).unwrap();
        assert_eq!(mp[0].x().unwrap(), 2.0);
        assert_eq!(mp[1].x().unwrap(), 1.0);
    }

    #[test]
    fn remove_by_index() {
        let mut gc = GeometryCollection::new(
            vec![pt(&[0.0, 0.0]), pt(&[1.0, 1.0]), pt(&[2.0, 2.0])],
            None,
        )
        .unwrap();
        let taken = gc.remove(1).unwrap();
        match &taken {
            Geometry::Point(p) => assert_eq!(p.x().unwrap(), 1.0),
            other => panic!("expected a point, got {other:?}"),
        }
        assert_eq!(gc.len(), 2);
        assert!(matches!(gc.remove(5), Err(GeometryError::Collection(_))));
    }

    #[test]
    fn concat_mixed_dimensionality() {
        let p2d = pt(&[0.0, 0.0]);
        let p3d = pt(&[1.0, 1.0, 1.0]);
        assert!(matches!(
            &p2d + &p3d,
            Err(GeometryError::Dimensionality(_))
        ));
    }
}
