//! Node kind declarations and their resolution
//!
//! A [`KindDef`] is a static, declarative description of one operation: its
//! argument shape and up to four generation rules. Each rule carries the GLSL
//! helper source (with `{fn}` standing in for the helper's name) and a Rust
//! implementation used by [`Program::eval`](crate::Program::eval).
//!
//! [`NodeKind::resolve`] checks a declaration once and derives the flags the
//! tree builder needs.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::value::{Value, ValueType};
use crate::{Error, Result};

/// Dimensionality of a scene or a spatial rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dim {
    Two,
    Three,
}

impl Dim {
    /// 2 or 3
    pub fn n(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// GLSL type of a position in this space
    pub fn glsl(self) -> &'static str {
        match self {
            Self::Two => "vec2",
            Self::Three => "vec3",
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.n())
    }
}

/// A position in 2D or 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Point {
    D2(Vec2),
    D3(Vec3),
}

impl Point {
    pub fn dim(&self) -> Dim {
        match self {
            Self::D2(_) => Dim::Two,
            Self::D3(_) => Dim::Three,
        }
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self::D2(v)
    }
}

impl From<Vec3> for Point {
    fn from(v: Vec3) -> Self {
        Self::D3(v)
    }
}

/// CPU side of a point-transform rule
#[derive(Clone, Copy)]
pub enum PointEval {
    D2(fn(Vec2, &[Value]) -> Vec2),
    D3(fn(Vec3, &[Value]) -> Vec3),
    /// Projects 3D space onto a 2D profile plane; children are 2D
    D3To2(fn(Vec3, &[Value]) -> Vec2),
}

impl PointEval {
    /// Dimensionality of the incoming position
    pub fn dim(&self) -> Dim {
        match self {
            Self::D2(_) => Dim::Two,
            Self::D3(_) | Self::D3To2(_) => Dim::Three,
        }
    }

    /// Dimensionality of the position handed to children
    pub fn output_dim(&self) -> Dim {
        match self {
            Self::D2(_) | Self::D3To2(_) => Dim::Two,
            Self::D3(_) => Dim::Three,
        }
    }

    /// Apply the transform; a point of the wrong dimensionality passes through
    pub fn apply(&self, p: Point, args: &[Value]) -> Point {
        match (self, p) {
            (Self::D2(f), Point::D2(v)) => Point::D2(f(v, args)),
            (Self::D3(f), Point::D3(v)) => Point::D3(f(v, args)),
            (Self::D3To2(f), Point::D3(v)) => Point::D2(f(v, args)),
            (_, p) => p,
        }
    }
}

/// CPU side of a primitive-distance rule
#[derive(Clone, Copy)]
pub enum DistanceEval {
    D2(fn(Vec2, &[Value]) -> f32),
    D3(fn(Vec3, &[Value]) -> f32),
}

impl DistanceEval {
    pub fn dim(&self) -> Dim {
        match self {
            Self::D2(_) => Dim::Two,
            Self::D3(_) => Dim::Three,
        }
    }

    /// Distance at `p`; `None` when `p` has the wrong dimensionality
    pub fn apply(&self, p: Point, args: &[Value]) -> Option<f32> {
        match (self, p) {
            (Self::D2(f), Point::D2(v)) => Some(f(v, args)),
            (Self::D3(f), Point::D3(v)) => Some(f(v, args)),
            _ => None,
        }
    }
}

/// Maps an incoming position to a new one (translate, scale, rotate)
#[derive(Clone, Copy)]
pub struct PointRule {
    pub glsl: &'static str,
    pub eval: PointEval,
}

/// Maps a position to a signed distance; marks a kind as a leaf
#[derive(Clone, Copy)]
pub struct DistanceRule {
    pub glsl: &'static str,
    pub eval: DistanceEval,
}

/// Combines the accumulated distance with an incoming one
#[derive(Clone, Copy)]
pub struct JoinRule {
    pub glsl: &'static str,
    pub eval: fn(f32, f32, &[Value]) -> f32,
}

/// Rewrites a single accumulated distance when a scope closes
#[derive(Clone, Copy)]
pub struct PostRule {
    pub glsl: &'static str,
    pub eval: fn(f32, &[Value]) -> f32,
}

/// Static declaration of a node kind
///
/// Argument shapes are strings with one character per argument: `1` for a
/// number, `2`/`3`/`4` for vectors.
pub struct KindDef {
    pub name: &'static str,
    pub args: &'static str,
    pub point: Option<PointRule>,
    pub distance: Option<DistanceRule>,
    pub join: Option<JoinRule>,
    pub post: Option<PostRule>,
    /// Binds a material for its subtree (see [`Tree::paint`](crate::Tree::paint))
    pub material: bool,
}

impl fmt::Debug for KindDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindDef")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Generation rule slots, used to derive helper names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Point,
    Distance,
    Join,
    Post,
}

impl Rule {
    /// Suffix of the helper function name
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Point => "tx",
            Self::Distance => "sd",
            Self::Join => "join",
            Self::Post => "post",
        }
    }
}

/// A validated node kind
#[derive(Debug)]
pub struct NodeKind {
    def: &'static KindDef,
    shape: Vec<ValueType>,
    dim: Option<Dim>,
}

impl NodeKind {
    /// Validate a declaration.
    ///
    /// Fails if the argument shape has an unknown character or the spatial
    /// rules disagree on dimensionality.
    pub fn resolve(def: &'static KindDef) -> Result<Self> {
        let shape = def
            .args
            .chars()
            .map(|ch| {
                ValueType::from_shape_char(ch).ok_or_else(|| Error::InvalidArgShape {
                    kind: def.name.to_string(),
                    ch,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let point_dim = def.point.map(|r| r.eval.dim());
        let distance_dim = def.distance.map(|r| r.eval.dim());
        let dim = match (point_dim, distance_dim) {
            (Some(a), Some(b)) if a != b => {
                return Err(Error::MixedDimensions(def.name.to_string()));
            }
            (a, b) => a.or(b),
        };

        Ok(Self { def, shape, dim })
    }

    pub fn def(&self) -> &'static KindDef {
        self.def
    }

    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn shape(&self) -> &[ValueType] {
        &self.shape
    }

    /// Fixed dimensionality, or `None` for kinds that inherit it
    pub fn dim(&self) -> Option<Dim> {
        self.dim
    }

    /// Dimensionality seen by children, or `None` when inherited unchanged
    pub fn output_dim(&self) -> Option<Dim> {
        self.def.point.map_or(self.dim, |r| Some(r.eval.output_dim()))
    }

    /// Leaves produce a distance directly and cannot hold children
    pub fn is_leaf(&self) -> bool {
        self.def.distance.is_some()
    }

    pub fn has_point_transform(&self) -> bool {
        self.def.point.is_some()
    }

    pub fn has_distance_post_transform(&self) -> bool {
        self.def.post.is_some()
    }

    pub fn defines_material(&self) -> bool {
        self.def.material
    }

    pub fn point(&self) -> Option<&PointRule> {
        self.def.point.as_ref()
    }

    pub fn distance(&self) -> Option<&DistanceRule> {
        self.def.distance.as_ref()
    }

    pub fn join(&self) -> Option<&JoinRule> {
        self.def.join.as_ref()
    }

    pub fn post(&self) -> Option<&PostRule> {
        self.def.post.as_ref()
    }

    /// Name of the helper function generated for `rule`
    pub fn helper(&self, rule: Rule) -> String {
        format!("{}_{}", self.def.name, rule.suffix())
    }

    /// Helper sources this kind contributes, with `{fn}` substituted
    pub fn helpers(&self) -> Vec<(String, String)> {
        [
            (Rule::Point, self.def.point.map(|r| r.glsl)),
            (Rule::Distance, self.def.distance.map(|r| r.glsl)),
            (Rule::Join, self.def.join.map(|r| r.glsl)),
            (Rule::Post, self.def.post.map(|r| r.glsl)),
        ]
        .into_iter()
        .filter_map(|(rule, src)| {
            let name = self.helper(rule);
            src.map(|s| (name.clone(), s.replace("{fn}", &name)))
        })
        .collect()
    }

    /// Short rule listing, e.g. `tx+post`
    pub fn rule_summary(&self) -> String {
        let rules: Vec<&str> = [
            (self.def.point.is_some(), Rule::Point),
            (self.def.distance.is_some(), Rule::Distance),
            (self.def.join.is_some(), Rule::Join),
            (self.def.post.is_some(), Rule::Post),
        ]
        .into_iter()
        .filter(|(present, _)| *present)
        .map(|(_, rule)| rule.suffix())
        .collect();
        if rules.is_empty() {
            "-".to_string()
        } else {
            rules.join("+")
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::kinds::{CIRCLE2, REVOLVE3, SCALE2, UNION};

    static MIXED: KindDef = KindDef {
        name: "mixed",
        args: "1",
        point: Some(PointRule {
            glsl: "",
            eval: PointEval::D2(|p, _| p),
        }),
        distance: Some(DistanceRule {
            glsl: "",
            eval: DistanceEval::D3(|p, _| p.length()),
        }),
        join: None,
        post: None,
        material: false,
    };

    static BAD_SHAPE: KindDef = KindDef {
        name: "bad_shape",
        args: "1x",
        point: None,
        distance: None,
        join: None,
        post: None,
        material: false,
    };

    #[test]
    fn test_resolve_flags() {
        let circle = NodeKind::resolve(&CIRCLE2).unwrap();
        assert!(circle.is_leaf());
        assert_eq!(circle.dim(), Some(Dim::Two));
        assert_eq!(circle.shape(), &[ValueType::Scalar]);

        let scale = NodeKind::resolve(&SCALE2).unwrap();
        assert!(!scale.is_leaf());
        assert!(scale.has_point_transform());
        assert!(scale.has_distance_post_transform());

        let union = NodeKind::resolve(&UNION).unwrap();
        assert_eq!(union.dim(), None);
        assert!(union.shape().is_empty());
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let err = NodeKind::resolve(&MIXED).unwrap_err();
        assert_eq!(err, Error::MixedDimensions("mixed".into()));
    }

    #[test]
    fn test_bad_shape_rejected() {
        let err = NodeKind::resolve(&BAD_SHAPE).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgShape {
                kind: "bad_shape".into(),
                ch: 'x'
            }
        );
    }

    #[test]
    fn test_helper_names() {
        let scale = NodeKind::resolve(&SCALE2).unwrap();
        let helpers = scale.helpers();
        let names: Vec<&str> = helpers.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["scale2_tx", "scale2_post"]);
        assert!(helpers[0].1.contains("vec2 scale2_tx(vec2 p, float s)"));
        assert_eq!(scale.rule_summary(), "tx+post");
    }

    #[test]
    fn test_profile_transform_changes_dimension() {
        let revolve = NodeKind::resolve(&REVOLVE3).unwrap();
        assert_eq!(revolve.dim(), Some(Dim::Three));
        assert_eq!(revolve.output_dim(), Some(Dim::Two));

        let scale = NodeKind::resolve(&SCALE2).unwrap();
        assert_eq!(scale.output_dim(), Some(Dim::Two));
        let union = NodeKind::resolve(&UNION).unwrap();
        assert_eq!(union.output_dim(), None);
    }
}
