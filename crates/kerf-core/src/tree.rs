//! Scope-stack tree builder
//!
//! Scenes are described by opening and closing scopes on a [`Tree`]. Every
//! event emits code right away: transforms introduce new position symbols,
//! leaves compute distances, and closing a scope folds its result into the
//! parent (see [`join`](crate::join)).
//!
//! ```
//! use kerf_core::kinds::{circle2, translate2, union};
//! use kerf_core::{CompileOptions, Dim, Tree};
//!
//! # fn main() -> kerf_core::Result<()> {
//! let mut tree = Tree::new(Dim::Two, &CompileOptions::default())?;
//! tree.with(union(), |t| {
//!     t.with(translate2(-1.0, 0.0), |t| t.leaf(circle2(0.5)))?;
//!     t.leaf(circle2(0.25))
//! })?;
//! let (codegen, _program) = tree.finish()?;
//! assert!(codegen.source().contains("union_join"));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::codegen::{Codegen, Constant, Stmt, Symbol};
use crate::eval::Program;
use crate::kind::{Dim, KindDef, NodeKind};
use crate::kinds::PAINT;
use crate::material::{MATERIAL_TYPE, Material, MaterialSet};
use crate::value::{Arg, bind};
use crate::view::CompileOptions;
use crate::{Error, Result};

/// A node kind together with the arguments to instantiate it with
#[derive(Debug, Clone)]
pub struct Step {
    def: &'static KindDef,
    args: Vec<Arg>,
}

impl Step {
    pub fn new(def: &'static KindDef, args: Vec<Arg>) -> Self {
        Self { def, args }
    }

    pub fn def(&self) -> &'static KindDef {
        self.def
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

/// Handle for an open scope; pass it back to [`Tree::close`]
#[derive(Debug, Clone)]
#[must_use = "an opened scope must be closed"]
pub struct Scope {
    id: usize,
    kind: &'static str,
}

/// An instantiated node
#[derive(Debug)]
pub(crate) struct Node {
    /// `None` for the root
    pub(crate) kind: Option<Arc<NodeKind>>,
    pub(crate) id: usize,
    pub(crate) args: Vec<Symbol>,
    pub(crate) pos: Symbol,
    pub(crate) dim: Dim,
    pub(crate) distance: Option<Symbol>,
    pub(crate) material: Option<Symbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Use {
    Scope,
    Leaf,
}

/// Construction context of one compilation run
#[derive(Debug)]
pub struct Tree {
    dim: Dim,
    pub(crate) cg: Codegen,
    materials: MaterialSet,
    kinds: HashMap<&'static str, Arc<NodeKind>>,
    pub(crate) stack: Vec<Node>,
    next_id: usize,
}

impl Tree {
    /// Start a run: declare the material struct (if any), open the map
    /// procedure and push the root node.
    pub fn new(dim: Dim, options: &CompileOptions) -> Result<Self> {
        let materials = MaterialSet::for_dim(dim);
        let mut cg = Codegen::new();
        if !materials.is_empty() {
            cg.define(MATERIAL_TYPE, &materials.struct_source())?;
        }
        let pos = cg.enter_map(&options.map_name, dim, !materials.is_empty())?;

        Ok(Self {
            dim,
            cg,
            materials,
            kinds: HashMap::new(),
            stack: vec![Node {
                kind: None,
                id: 0,
                args: Vec::new(),
                pos,
                dim,
                distance: None,
                material: None,
            }],
            next_id: 1,
        })
    }

    /// Dimensionality of the scene
    pub fn dim(&self) -> Dim {
        self.dim
    }

    /// Number of open scopes, not counting the root
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Open a scope node
    pub fn open(&mut self, step: Step) -> Result<Scope> {
        self.open_node(&step, None)
    }

    /// Close the innermost open scope, folding its result into its parent
    pub fn close(&mut self, scope: Scope) -> Result<()> {
        match self.stack.last() {
            Some(top) if top.id == scope.id && self.stack.len() > 1 => {}
            _ => return Err(Error::ScopeMismatch(scope.kind.to_string())),
        }
        let Some(mut node) = self.stack.pop() else {
            return Err(Error::ScopeMismatch(scope.kind.to_string()));
        };

        if let (Some(kind), Some(d)) = (&node.kind, &node.distance) {
            if kind.has_distance_post_transform() {
                let out = self.cg.ident("d");
                self.cg.emit(Stmt::Post {
                    out: out.clone(),
                    kind: Arc::clone(kind),
                    d: d.clone(),
                    args: node.args.clone(),
                })?;
                node.distance = Some(out);
            }
        }

        if let Some(d) = node.distance {
            self.rjoin(d, node.material)?;
        }
        Ok(())
    }

    /// Open `step`, run `body`, then close the scope.
    ///
    /// The scope is closed exactly once even if `body` fails; the body's error
    /// wins over a close error.
    pub fn with<F>(&mut self, step: Step, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let scope = self.open(step)?;
        let result = body(self);
        let closed = self.close(scope);
        result.and(closed)
    }

    /// Open several scopes nested in order, run `body` inside the innermost,
    /// then close them in reverse.
    pub fn chain<I, F>(&mut self, steps: I, body: F) -> Result<()>
    where
        I: IntoIterator<Item = Step>,
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut opened = Vec::new();
        let mut result = Ok(());
        for step in steps {
            match self.open(step) {
                Ok(scope) => opened.push(scope),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        if result.is_ok() {
            result = body(self);
        }
        for scope in opened.into_iter().rev() {
            let closed = self.close(scope);
            result = result.and(closed);
        }
        result
    }

    /// Place a leaf (primitive) node
    pub fn leaf(&mut self, step: Step) -> Result<()> {
        let node = self.instantiate(&step, None, Use::Leaf)?;
        if let Some(d) = node.distance {
            self.rjoin(d, node.material)?;
        }
        Ok(())
    }

    /// Give everything built in `body` the material `material`.
    ///
    /// In views without a material set this is a plain grouping scope.
    pub fn paint<F>(&mut self, material: &dyn Material, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let scope = self.open_node(&Step::new(&PAINT, Vec::new()), Some(material))?;
        let result = body(self);
        let closed = self.close(scope);
        result.and(closed)
    }

    /// Close the map procedure. Fails unless only the root is left.
    pub fn finish(mut self) -> Result<(Codegen, Program)> {
        if self.stack.len() != 1 {
            return Err(Error::UnbalancedScopes {
                open: self.depth(),
            });
        }
        let Some(root) = self.stack.pop() else {
            return Err(Error::UnbalancedScopes { open: 0 });
        };
        let zero = self.materials.zero();
        let program = self.cg.leave(root.distance, root.material, &zero)?;
        Ok((self.cg, program))
    }

    /// Resolve `def` for this run, defining its helpers the first time
    pub(crate) fn resolve(&mut self, def: &'static KindDef) -> Result<Arc<NodeKind>> {
        if let Some(kind) = self.kinds.get(def.name) {
            if !std::ptr::eq(kind.def(), def) {
                return Err(Error::DuplicateKind(def.name.to_string()));
            }
            return Ok(Arc::clone(kind));
        }

        let kind = Arc::new(NodeKind::resolve(def)?);
        for (name, src) in kind.helpers() {
            self.cg.define(&name, &src)?;
        }
        self.kinds.insert(def.name, Arc::clone(&kind));
        Ok(kind)
    }

    pub(crate) fn top(&self) -> Result<&Node> {
        self.stack
            .last()
            .ok_or(Error::UnbalancedScopes { open: 0 })
    }

    pub(crate) fn top_mut(&mut self) -> Result<&mut Node> {
        self.stack
            .last_mut()
            .ok_or(Error::UnbalancedScopes { open: 0 })
    }

    fn open_node(&mut self, step: &Step, material: Option<&dyn Material>) -> Result<Scope> {
        let node = self.instantiate(step, material, Use::Scope)?;
        let scope = Scope {
            id: node.id,
            kind: step.def.name,
        };
        self.stack.push(node);
        Ok(scope)
    }

    fn instantiate(
        &mut self,
        step: &Step,
        material: Option<&dyn Material>,
        usage: Use,
    ) -> Result<Node> {
        let kind = self.resolve(step.def)?;
        match usage {
            Use::Scope if kind.is_leaf() => return Err(Error::NotAScope(kind.name().into())),
            Use::Leaf if !kind.is_leaf() => return Err(Error::NotALeaf(kind.name().into())),
            _ => {}
        }

        let values = bind(&kind, &step.args)?;
        let mut args = Vec::with_capacity(values.len());
        for v in values {
            args.push(
                self.cg
                    .constant(v.ty().glsl(), v.literal(), Constant::Value(v))?,
            );
        }

        let (pos, dim) = {
            let top = self.top()?;
            (top.pos.clone(), top.dim)
        };
        if let Some(expected) = kind.dim() {
            if expected != dim {
                return Err(Error::DimensionMismatch {
                    kind: kind.name().to_string(),
                    expected,
                    got: dim,
                });
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        let mut node = Node {
            kind: Some(Arc::clone(&kind)),
            id,
            args,
            pos,
            dim,
            distance: None,
            material: None,
        };

        if kind.defines_material() && !self.materials.is_empty() {
            if let Some(m) = material {
                let values = self.materials.values(m)?;
                let sym = self.cg.constant(
                    MATERIAL_TYPE,
                    MaterialSet::literal(&values),
                    Constant::Material(values),
                )?;
                node.material = Some(sym);
            }
        }

        if kind.has_point_transform() {
            let out = self.cg.ident("p");
            self.cg.emit(Stmt::Transform {
                out: out.clone(),
                kind: Arc::clone(&kind),
                pos: node.pos.clone(),
                args: node.args.clone(),
            })?;
            node.pos = out;
        }
        if let Some(out_dim) = kind.output_dim() {
            node.dim = out_dim;
        }

        if kind.is_leaf() {
            let out = self.cg.ident("d");
            self.cg.emit(Stmt::Distance {
                out: out.clone(),
                kind: Arc::clone(&kind),
                pos: node.pos.clone(),
                args: node.args.clone(),
            })?;
            node.distance = Some(out);
        }

        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::args;
    use crate::kinds::{
        CIRCLE2, UNION, circle2, round, scale2, sphere3, subtract, translate2, union,
    };

    fn tree2() -> Tree {
        Tree::new(Dim::Two, &CompileOptions::default()).unwrap()
    }

    #[test]
    fn test_single_leaf_becomes_root_distance() {
        let mut t = tree2();
        t.leaf(circle2(1.0)).unwrap();
        let (cg, _) = t.finish().unwrap();
        let src = cg.source();
        assert!(src.contains("    float c0 = 1.000000;\n    float d0 = circle2_sd(p0, c0);\n    return d0;"));
        assert!(!src.contains("Material"));
    }

    #[test]
    fn test_transform_introduces_position() {
        let mut t = tree2();
        t.with(translate2(1.0, 2.0), |t| t.leaf(circle2(1.0)))
            .unwrap();
        let (cg, _) = t.finish().unwrap();
        let src = cg.source();
        assert!(src.contains("    vec2 p1 = translate2_tx(p0, c0);"));
        assert!(src.contains("    float d0 = circle2_sd(p1, c1);"));
    }

    #[test]
    fn test_post_transform_on_close() {
        let mut t = tree2();
        t.with(scale2(2.0), |t| t.leaf(circle2(1.0))).unwrap();
        let (cg, _) = t.finish().unwrap();
        let src = cg.source();
        assert!(src.contains("    vec2 p1 = scale2_tx(p0, c0);"));
        assert!(src.contains("    float d1 = scale2_post(d0, c0);"));
        assert!(src.contains("    return d1;"));
    }

    #[test]
    fn test_post_transform_skipped_without_distance() {
        let mut t = tree2();
        t.with(round(0.5), |_| Ok(())).unwrap();
        let (cg, program) = t.finish().unwrap();
        assert!(!cg.source().contains("round_post(d"));
        assert!(program.statements().len() == 1);
    }

    #[test]
    fn test_join_uses_parent_rule() {
        let mut t = tree2();
        t.with(subtract(), |t| {
            t.leaf(circle2(1.0))?;
            t.leaf(circle2(2.0))
        })
        .unwrap();
        let (cg, _) = t.finish().unwrap();
        assert!(cg.source().contains("    float d2 = subtract_join(d0, d1);"));
    }

    #[test]
    fn test_root_falls_back_to_union() {
        let mut t = tree2();
        t.leaf(circle2(1.0)).unwrap();
        t.leaf(circle2(2.0)).unwrap();
        let (cg, _) = t.finish().unwrap();
        let src = cg.source();
        assert!(src.contains("float union_join(float d0, float d1)"));
        assert!(src.contains("    float d2 = union_join(d0, d1);"));
    }

    #[test]
    fn test_unbalanced_finish() {
        let mut t = tree2();
        let _scope = t.open(union()).unwrap();
        assert_eq!(
            t.finish().unwrap_err(),
            Error::UnbalancedScopes { open: 1 }
        );
    }

    #[test]
    fn test_close_twice_is_a_nesting_error() {
        let mut t = tree2();
        let scope = t.open(union()).unwrap();
        t.close(scope.clone()).unwrap();
        assert_eq!(
            t.close(scope).unwrap_err(),
            Error::ScopeMismatch("union".into())
        );
    }

    #[test]
    fn test_close_out_of_order() {
        let mut t = tree2();
        let outer = t.open(union()).unwrap();
        let _inner = t.open(subtract()).unwrap();
        assert!(matches!(t.close(outer), Err(Error::ScopeMismatch(_))));
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut t = tree2();
        let first = t.open(union()).unwrap();
        t.close(first.clone()).unwrap();
        let _second = t.open(union()).unwrap();
        assert!(matches!(t.close(first), Err(Error::ScopeMismatch(_))));
    }

    #[test]
    fn test_leaf_and_scope_misuse() {
        let mut t = tree2();
        assert_eq!(
            t.open(circle2(1.0)).unwrap_err(),
            Error::NotAScope("circle2".into())
        );
        assert_eq!(
            t.leaf(union()).unwrap_err(),
            Error::NotALeaf("union".into())
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut t = tree2();
        assert_eq!(
            t.leaf(sphere3(1.0)).unwrap_err(),
            Error::DimensionMismatch {
                kind: "sphere3".into(),
                expected: Dim::Three,
                got: Dim::Two
            }
        );
    }

    #[test]
    fn test_with_closes_on_error() {
        let mut t = tree2();
        let err = t
            .with(union(), |t| t.leaf(Step::new(&CIRCLE2, args![])))
            .unwrap_err();
        assert!(matches!(err, Error::ArgumentCount { .. }));
        assert_eq!(t.depth(), 0);
    }

    #[test]
    fn test_chain_closes_in_reverse() {
        let mut t = tree2();
        t.chain([union(), subtract(), translate2(-1.0, -1.0)], |t| {
            assert_eq!(t.depth(), 3);
            t.leaf(circle2(1.0))
        })
        .unwrap();
        assert_eq!(t.depth(), 0);
        t.finish().unwrap();
    }

    #[test]
    fn test_chain_failure_unwinds_opened_scopes() {
        let mut t = tree2();
        let err = t
            .chain([union(), Step::new(&UNION, args![1.0])], |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, Error::ArgumentCount { .. }));
        assert_eq!(t.depth(), 0);
    }

    #[test]
    fn test_duplicate_kind_name_rejected() {
        static FAKE_UNION: KindDef = KindDef {
            name: "union",
            args: "",
            point: None,
            distance: None,
            join: None,
            post: None,
            material: false,
        };
        let mut t = tree2();
        t.with(union(), |_| Ok(())).unwrap();
        assert_eq!(
            t.open(Step::new(&FAKE_UNION, Vec::new())).unwrap_err(),
            Error::DuplicateKind("union".into())
        );
    }
}
