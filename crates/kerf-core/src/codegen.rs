//! GLSL emission context
//!
//! [`Codegen`] owns everything one compilation run produces: the
//! deduplicated helper definitions, the statements of the procedure being
//! built, the symbol allocator and the literal constant table.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write};
use std::sync::Arc;

use crate::eval::Program;
use crate::kind::{Dim, NodeKind, Rule};
use crate::material::{MATERIAL_TYPE, MaterialSet};
use crate::text::untab;
use crate::value::Value;
use crate::{Error, Result};

/// Distance returned by a procedure whose scene is empty
pub const FAR: f32 = 1e30;

/// Name of the material output parameter of a map procedure
pub const MATERIAL_OUT: &str = "mat";

/// A generated identifier naming one intermediate value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value of a declared constant
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Value(Value),
    Material(Vec<Value>),
}

/// One statement of a map procedure body
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `ty sym = literal;`
    Const {
        sym: Symbol,
        ty: String,
        literal: String,
        value: Constant,
    },
    /// New position from a point-transform rule
    Transform {
        out: Symbol,
        kind: Arc<NodeKind>,
        pos: Symbol,
        args: Vec<Symbol>,
    },
    /// Leaf distance from a primitive-distance rule
    Distance {
        out: Symbol,
        kind: Arc<NodeKind>,
        pos: Symbol,
        args: Vec<Symbol>,
    },
    /// Accumulated distance `a` joined with incoming distance `b`
    Join {
        out: Symbol,
        kind: Arc<NodeKind>,
        a: Symbol,
        b: Symbol,
        args: Vec<Symbol>,
    },
    /// Distance rewritten by a post-transform rule
    Post {
        out: Symbol,
        kind: Arc<NodeKind>,
        d: Symbol,
        args: Vec<Symbol>,
    },
    /// Material of whichever side is closer
    Select {
        out: Symbol,
        child_d: Symbol,
        parent_d: Symbol,
        child_m: Symbol,
        parent_m: Symbol,
    },
}

fn arg_list(args: &[Symbol]) -> String {
    args.iter().fold(String::new(), |mut s, a| {
        let _ = write!(s, ", {}", a);
        s
    })
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const {
                sym, ty, literal, ..
            } => write!(f, "    {} {} = {};", ty, sym, literal),
            Self::Transform {
                out,
                kind,
                pos,
                args,
            } => {
                let ty = kind.output_dim().map_or("vec3", Dim::glsl);
                write!(
                    f,
                    "    {} {} = {}({}{});",
                    ty,
                    out,
                    kind.helper(Rule::Point),
                    pos,
                    arg_list(args)
                )
            }
            Self::Distance {
                out,
                kind,
                pos,
                args,
            } => write!(
                f,
                "    float {} = {}({}{});",
                out,
                kind.helper(Rule::Distance),
                pos,
                arg_list(args)
            ),
            Self::Join {
                out,
                kind,
                a,
                b,
                args,
            } => write!(
                f,
                "    float {} = {}({}, {}{});",
                out,
                kind.helper(Rule::Join),
                a,
                b,
                arg_list(args)
            ),
            Self::Post { out, kind, d, args } => write!(
                f,
                "    float {} = {}({}{});",
                out,
                kind.helper(Rule::Post),
                d,
                arg_list(args)
            ),
            Self::Select {
                out,
                child_d,
                parent_d,
                child_m,
                parent_m,
            } => write!(
                f,
                "    {} {} = {} < {} ? {} : {};",
                MATERIAL_TYPE, out, child_d, parent_d, child_m, parent_m
            ),
        }
    }
}

/// The procedure currently being built
#[derive(Debug)]
struct Body {
    name: String,
    dim: Dim,
    position: Symbol,
    material: bool,
    stmts: Vec<Stmt>,
    constants: HashMap<String, Symbol>,
}

/// Emission state of one compilation run
#[derive(Debug, Default)]
pub struct Codegen {
    defined: HashSet<String>,
    defines: Vec<String>,
    procedures: Vec<String>,
    serials: HashMap<String, usize>,
    body: Option<Body>,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    /// Register a helper definition once.
    ///
    /// Returns `false` if `name` was already defined in this run; the second
    /// source is ignored.
    pub fn define(&mut self, name: &str, src: &str) -> Result<bool> {
        if self.is_defined(name) {
            return Ok(false);
        }
        let text = untab(src)?;
        tracing::debug!(helper = name, "defining helper");
        self.defined.insert(name.to_string());
        self.defines.push(text);
        Ok(true)
    }

    /// Fresh symbol `{prefix}{n}`, numbered per prefix
    pub fn ident(&mut self, prefix: &str) -> Symbol {
        let serial = self.serials.entry(prefix.to_string()).or_insert(0);
        let sym = Symbol(format!("{}{}", prefix, serial));
        *serial += 1;
        sym
    }

    /// Symbol for a literal, declaring it on first use
    pub fn constant(&mut self, ty: &str, literal: String, value: Constant) -> Result<Symbol> {
        let known = self
            .body
            .as_ref()
            .ok_or(Error::NoActiveProcedure)?
            .constants
            .get(&literal)
            .cloned();
        if let Some(sym) = known {
            return Ok(sym);
        }

        let sym = self.ident("c");
        self.emit(Stmt::Const {
            sym: sym.clone(),
            ty: ty.to_string(),
            literal: literal.clone(),
            value,
        })?;
        if let Some(body) = self.body.as_mut() {
            body.constants.insert(literal, sym.clone());
        }
        Ok(sym)
    }

    /// Append a statement to the open procedure
    pub fn emit(&mut self, stmt: Stmt) -> Result<()> {
        let body = self.body.as_mut().ok_or(Error::NoActiveProcedure)?;
        tracing::trace!(procedure = %body.name, "{}", stmt);
        body.stmts.push(stmt);
        Ok(())
    }

    /// Open a map procedure; returns the symbol of its position parameter
    pub fn enter_map(&mut self, name: &str, dim: Dim, material: bool) -> Result<Symbol> {
        if let Some(body) = &self.body {
            return Err(Error::ProcedureOpen(body.name.clone()));
        }
        let position = self.ident("p");
        self.body = Some(Body {
            name: name.to_string(),
            dim,
            position: position.clone(),
            material,
            stmts: Vec::new(),
            constants: HashMap::new(),
        });
        Ok(position)
    }

    /// Close the map procedure, returning `distance` and writing `material`
    /// to the output parameter when the procedure has one.
    pub fn leave(
        &mut self,
        distance: Option<Symbol>,
        material: Option<Symbol>,
        zero_material: &[Value],
    ) -> Result<Program> {
        let body = self.body.take().ok_or(Error::NoActiveProcedure)?;

        let mut src = String::new();
        if body.material {
            let _ = writeln!(
                src,
                "float {}({} {}, out {} {})",
                body.name,
                body.dim.glsl(),
                body.position,
                MATERIAL_TYPE,
                MATERIAL_OUT
            );
        } else {
            let _ = writeln!(
                src,
                "float {}({} {})",
                body.name,
                body.dim.glsl(),
                body.position
            );
        }
        src.push_str("{\n");
        for stmt in &body.stmts {
            let _ = writeln!(src, "{}", stmt);
        }
        if body.material {
            match &material {
                Some(m) => {
                    let _ = writeln!(src, "    {} = {};", MATERIAL_OUT, m);
                }
                None => {
                    let _ = writeln!(
                        src,
                        "    {} = {};",
                        MATERIAL_OUT,
                        MaterialSet::literal(zero_material)
                    );
                }
            }
        }
        match &distance {
            Some(d) => {
                let _ = writeln!(src, "    return {};", d);
            }
            None => {
                let _ = writeln!(src, "    return {:e};", FAR);
            }
        }
        src.push_str("}\n");
        self.procedures.push(src);

        let (material, fallback) = if body.material {
            (material, Some(zero_material.to_vec()))
        } else {
            (None, None)
        };
        Ok(Program::new(
            body.dim,
            body.position,
            body.stmts,
            distance,
            material,
            fallback,
        ))
    }

    /// Append a fixed procedure (render boilerplate) after the generated ones
    pub fn append_procedure(&mut self, src: &str) -> Result<()> {
        self.procedures.push(untab(src)?);
        Ok(())
    }

    /// Helper definitions followed by procedure bodies
    pub fn source(&self) -> String {
        let mut out = String::new();
        for text in self.defines.iter().chain(&self.procedures) {
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_define_is_idempotent() {
        let mut cg = Codegen::new();
        assert!(cg.define("f", "float f() { return 1.0; }").unwrap());
        assert!(!cg.define("f", "float f() { return 2.0; }").unwrap());
        assert!(cg.is_defined("f"));
        assert_eq!(cg.source().matches("float f()").count(), 1);
        assert!(cg.source().contains("return 1.0"));
    }

    #[test]
    fn test_ident_numbering_per_prefix() {
        let mut cg = Codegen::new();
        assert_eq!(cg.ident("d").as_str(), "d0");
        assert_eq!(cg.ident("d").as_str(), "d1");
        assert_eq!(cg.ident("p").as_str(), "p0");
        assert_eq!(cg.ident("d").as_str(), "d2");
    }

    #[test]
    fn test_constants_are_memoized() {
        let mut cg = Codegen::new();
        cg.enter_map("map", Dim::Two, false).unwrap();
        let v = Value::Scalar(1.0);
        let a = cg
            .constant("float", v.literal(), Constant::Value(v))
            .unwrap();
        let b = cg
            .constant("float", v.literal(), Constant::Value(v))
            .unwrap();
        assert_eq!(a, b);
        cg.leave(None, None, &[]).unwrap();
        assert_eq!(cg.source().matches("float c0 = 1.000000;").count(), 1);
    }

    #[test]
    fn test_emission_requires_open_procedure() {
        let mut cg = Codegen::new();
        let v = Value::Scalar(1.0);
        assert_eq!(
            cg.constant("float", v.literal(), Constant::Value(v))
                .unwrap_err(),
            Error::NoActiveProcedure
        );
        assert!(matches!(
            cg.leave(None, None, &[]),
            Err(Error::NoActiveProcedure)
        ));
    }

    #[test]
    fn test_nested_procedure_rejected() {
        let mut cg = Codegen::new();
        cg.enter_map("map", Dim::Two, false).unwrap();
        assert_eq!(
            cg.enter_map("other", Dim::Two, false).unwrap_err(),
            Error::ProcedureOpen("map".into())
        );
    }

    #[test]
    fn test_empty_procedure_returns_far() {
        let mut cg = Codegen::new();
        cg.enter_map("map", Dim::Three, true).unwrap();
        cg.leave(None, None, &[Value::Scalar(0.0), Value::Scalar(0.0)])
            .unwrap();
        let src = cg.source();
        assert!(src.contains("float map(vec3 p0, out Material mat)"));
        assert!(src.contains("    mat = Material(0.000000, 0.000000);"));
        assert!(src.contains("    return 1e30;"));
    }
}
