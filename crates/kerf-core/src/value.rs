//! Argument values, literal formatting and argument binding
//!
//! Callers hand node kinds loosely-typed [`Arg`]s. Binding checks them
//! against the kind's declared shape and turns them into typed [`Value`]s
//! whose GLSL literal text feeds the constant table.

use std::fmt;

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::kind::NodeKind;
use crate::{Error, Result};

/// Shape of an argument or material field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
}

impl ValueType {
    /// Parse one character of an argument shape string (`1`..`4`)
    pub fn from_shape_char(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Scalar),
            '2' => Some(Self::Vec2),
            '3' => Some(Self::Vec3),
            '4' => Some(Self::Vec4),
            _ => None,
        }
    }

    /// Number of components
    pub fn arity(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
        }
    }

    /// GLSL type name
    pub fn glsl(self) -> &'static str {
        match self {
            Self::Scalar => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
        }
    }

    /// The zero value of this type
    pub fn zero(self) -> Value {
        match self {
            Self::Scalar => Value::Scalar(0.0),
            Self::Vec2 => Value::Vec2(Vec2::ZERO),
            Self::Vec3 => Value::Vec3(Vec3::ZERO),
            Self::Vec4 => Value::Vec4(Vec4::ZERO),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("number"),
            other => f.write_str(other.glsl()),
        }
    }
}

/// A typed argument or material field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Scalar(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl Value {
    /// The type of this value
    pub fn ty(&self) -> ValueType {
        match self {
            Self::Scalar(_) => ValueType::Scalar,
            Self::Vec2(_) => ValueType::Vec2,
            Self::Vec3(_) => ValueType::Vec3,
            Self::Vec4(_) => ValueType::Vec4,
        }
    }

    /// Components in order
    pub fn components(&self) -> Vec<f32> {
        match self {
            Self::Scalar(x) => vec![*x],
            Self::Vec2(v) => v.to_array().to_vec(),
            Self::Vec3(v) => v.to_array().to_vec(),
            Self::Vec4(v) => v.to_array().to_vec(),
        }
    }

    /// Every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|x| x.is_finite())
    }

    /// GLSL literal text, six fractional digits per component
    pub fn literal(&self) -> String {
        match self {
            Self::Scalar(x) => format!("{:.6}", x),
            other => {
                let parts: Vec<String> = other
                    .components()
                    .iter()
                    .map(|x| format!("{:.6}", x))
                    .collect();
                format!("{}({})", other.ty().glsl(), parts.join(","))
            }
        }
    }

    /// First component
    pub fn scalar(&self) -> f32 {
        self.components().first().copied().unwrap_or(0.0)
    }

    /// Leading components as a `Vec2`, zero-filled
    pub fn vec2(&self) -> Vec2 {
        let c = self.padded::<2>();
        Vec2::from_array(c)
    }

    /// Leading components as a `Vec3`, zero-filled
    pub fn vec3(&self) -> Vec3 {
        Vec3::from_array(self.padded::<3>())
    }

    fn padded<const N: usize>(&self) -> [f32; N] {
        let mut out = [0.0; N];
        for (slot, x) in out.iter_mut().zip(self.components()) {
            *slot = x;
        }
        out
    }
}

/// Positional argument `i`, or zero when absent
pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).copied().unwrap_or(Value::Scalar(0.0))
}

/// A caller-supplied argument before validation
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Num(f64),
    Seq(Vec<f64>),
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Self::Num(v)
    }
}

impl From<f32> for Arg {
    fn from(v: f32) -> Self {
        Self::Num(f64::from(v))
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Self::Num(f64::from(v))
    }
}

impl From<Vec<f64>> for Arg {
    fn from(v: Vec<f64>) -> Self {
        Self::Seq(v)
    }
}

impl<const N: usize> From<[f64; N]> for Arg {
    fn from(v: [f64; N]) -> Self {
        Self::Seq(v.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for Arg {
    fn from(v: [f32; N]) -> Self {
        Self::Seq(v.iter().map(|x| f64::from(*x)).collect())
    }
}

/// Build a `Vec<Arg>` from mixed numbers and arrays
///
/// ```
/// use kerf_core::{Arg, args};
///
/// let a = args![1.5, [2.0, 3.0]];
/// assert_eq!(a, vec![Arg::Num(1.5), Arg::Seq(vec![2.0, 3.0])]);
/// ```
#[macro_export]
macro_rules! args {
    ($($a:expr),* $(,)?) => {
        vec![$($crate::Arg::from($a)),*]
    };
}

/// Validate `args` against `kind`'s argument shape.
///
/// A kind that takes exactly one vector argument also accepts that many bare
/// numbers in its place.
pub fn bind(kind: &NodeKind, args: &[Arg]) -> Result<Vec<Value>> {
    let shape = kind.shape();

    let collapsed;
    let args = match shape {
        [only] if only.arity() > 1
            && args.len() == only.arity()
            && args.iter().all(|a| matches!(a, Arg::Num(_))) =>
        {
            collapsed = [Arg::Seq(
                args.iter()
                    .filter_map(|a| match a {
                        Arg::Num(x) => Some(*x),
                        Arg::Seq(_) => None,
                    })
                    .collect(),
            )];
            &collapsed[..]
        }
        _ => args,
    };

    if args.len() != shape.len() {
        return Err(Error::ArgumentCount {
            kind: kind.name().to_string(),
            expected: shape.len(),
            got: args.len(),
        });
    }

    shape
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (ty, a))| {
            coerce(*ty, a).ok_or_else(|| Error::ArgumentType {
                kind: kind.name().to_string(),
                index,
                expected: *ty,
            })
        })
        .collect()
}

/// Convert one argument to `ty`, or `None` if it does not fit.
///
/// NaN, infinities and values that overflow `f32` do not fit any type.
pub(crate) fn coerce(ty: ValueType, a: &Arg) -> Option<Value> {
    let value = match (ty, a) {
        (ValueType::Scalar, Arg::Num(x)) => Some(Value::Scalar(*x as f32)),
        (ValueType::Scalar, Arg::Seq(_)) => None,
        (_, Arg::Num(_)) => None,
        (ty, Arg::Seq(xs)) if xs.len() == ty.arity() => {
            let f: Vec<f32> = xs.iter().map(|x| *x as f32).collect();
            Some(match ty {
                ValueType::Vec2 => Value::Vec2(Vec2::new(f[0], f[1])),
                ValueType::Vec3 => Value::Vec3(Vec3::new(f[0], f[1], f[2])),
                ValueType::Vec4 => Value::Vec4(Vec4::new(f[0], f[1], f[2], f[3])),
                ValueType::Scalar => Value::Scalar(f[0]),
            })
        }
        _ => None,
    }?;
    value.is_finite().then_some(value)
}
