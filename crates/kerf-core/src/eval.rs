//! CPU evaluation of compiled map procedures
//!
//! A [`Program`] is the statement list of one compiled view. Interpreting it
//! with each rule's Rust implementation gives the same distance and material
//! the emitted GLSL computes, which lets scenes be probed without a GPU.

use std::collections::HashMap;

use crate::codegen::{Constant, FAR, Stmt, Symbol};
use crate::kind::{Dim, Point};
use crate::value::Value;
use crate::{Error, Result};

/// Result of evaluating a program at one point
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub distance: f32,
    /// Field values written to the material output, for material-aware views
    pub material: Option<Vec<Value>>,
}

#[derive(Debug, Clone)]
enum Slot {
    Value(Value),
    Point(Point),
    Distance(f32),
    Material(Vec<Value>),
}

/// IR of one compiled map procedure
#[derive(Debug, Clone)]
pub struct Program {
    dim: Dim,
    position: Symbol,
    stmts: Vec<Stmt>,
    distance: Option<Symbol>,
    material: Option<Symbol>,
    /// Written when a material-aware procedure tracked no material
    fallback: Option<Vec<Value>>,
}

impl Program {
    pub(crate) fn new(
        dim: Dim,
        position: Symbol,
        stmts: Vec<Stmt>,
        distance: Option<Symbol>,
        material: Option<Symbol>,
        fallback: Option<Vec<Value>>,
    ) -> Self {
        Self {
            dim,
            position,
            stmts,
            distance,
            material,
            fallback,
        }
    }

    pub fn dim(&self) -> Dim {
        self.dim
    }

    pub fn statements(&self) -> &[Stmt] {
        &self.stmts
    }

    /// Evaluate the distance (and material) at `p`
    pub fn eval(&self, p: impl Into<Point>) -> Result<Sample> {
        let p = p.into();
        if p.dim() != self.dim {
            return Err(Error::DimensionMismatch {
                kind: "map".to_string(),
                expected: self.dim,
                got: p.dim(),
            });
        }

        let mut env: HashMap<&str, Slot> = HashMap::new();
        env.insert(self.position.as_str(), Slot::Point(p));

        for stmt in &self.stmts {
            match stmt {
                Stmt::Const { sym, value, .. } => {
                    let slot = match value {
                        Constant::Value(v) => Slot::Value(*v),
                        Constant::Material(m) => Slot::Material(m.clone()),
                    };
                    env.insert(sym.as_str(), slot);
                }
                Stmt::Transform {
                    out,
                    kind,
                    pos,
                    args,
                } => {
                    let p = point(&env, pos)?;
                    let args = values(&env, args)?;
                    let moved = kind.point().map_or(p, |r| r.eval.apply(p, &args));
                    env.insert(out.as_str(), Slot::Point(moved));
                }
                Stmt::Distance {
                    out,
                    kind,
                    pos,
                    args,
                } => {
                    let p = point(&env, pos)?;
                    let args = values(&env, args)?;
                    let d = kind
                        .distance()
                        .and_then(|r| r.eval.apply(p, &args))
                        .ok_or_else(|| Error::DimensionMismatch {
                            kind: kind.name().to_string(),
                            expected: kind.dim().unwrap_or(self.dim),
                            got: p.dim(),
                        })?;
                    env.insert(out.as_str(), Slot::Distance(d));
                }
                Stmt::Join {
                    out,
                    kind,
                    a,
                    b,
                    args,
                } => {
                    let (da, db) = (distance(&env, a)?, distance(&env, b)?);
                    let args = values(&env, args)?;
                    let d = kind.join().map_or(da.min(db), |r| (r.eval)(da, db, &args));
                    env.insert(out.as_str(), Slot::Distance(d));
                }
                Stmt::Post { out, kind, d, args } => {
                    let d = distance(&env, d)?;
                    let args = values(&env, args)?;
                    let d = kind.post().map_or(d, |r| (r.eval)(d, &args));
                    env.insert(out.as_str(), Slot::Distance(d));
                }
                Stmt::Select {
                    out,
                    child_d,
                    parent_d,
                    child_m,
                    parent_m,
                } => {
                    let pick = if distance(&env, child_d)? < distance(&env, parent_d)? {
                        child_m
                    } else {
                        parent_m
                    };
                    let m = material(&env, pick)?;
                    env.insert(out.as_str(), Slot::Material(m));
                }
            }
        }

        let distance = match &self.distance {
            Some(d) => distance(&env, d)?,
            None => FAR,
        };
        let material = match &self.material {
            Some(m) => Some(material(&env, m)?),
            None => self.fallback.clone(),
        };
        Ok(Sample { distance, material })
    }
}

fn lookup<'a>(env: &'a HashMap<&str, Slot>, sym: &Symbol) -> Result<&'a Slot> {
    env.get(sym.as_str())
        .ok_or_else(|| Error::UnboundSymbol(sym.to_string()))
}

fn point(env: &HashMap<&str, Slot>, sym: &Symbol) -> Result<Point> {
    match lookup(env, sym)? {
        Slot::Point(p) => Ok(*p),
        _ => Err(Error::UnboundSymbol(sym.to_string())),
    }
}

fn distance(env: &HashMap<&str, Slot>, sym: &Symbol) -> Result<f32> {
    match lookup(env, sym)? {
        Slot::Distance(d) => Ok(*d),
        _ => Err(Error::UnboundSymbol(sym.to_string())),
    }
}

fn material(env: &HashMap<&str, Slot>, sym: &Symbol) -> Result<Vec<Value>> {
    match lookup(env, sym)? {
        Slot::Material(m) => Ok(m.clone()),
        _ => Err(Error::UnboundSymbol(sym.to_string())),
    }
}

fn values(env: &HashMap<&str, Slot>, syms: &[Symbol]) -> Result<Vec<Value>> {
    syms.iter()
        .map(|s| match lookup(env, s)? {
            Slot::Value(v) => Ok(*v),
            _ => Err(Error::UnboundSymbol(s.to_string())),
        })
        .collect()
}
