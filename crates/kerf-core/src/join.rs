//! Join algebra: folding a child's result into its parent
//!
//! The first distance a scope receives is adopted as-is. Every later one is
//! combined with the scope's own join rule, or with plain union when the
//! scope has none. Materials follow the nearer surface: when both sides carry
//! different materials, a select statement picks the child's material where
//! the child is closer.

use std::sync::Arc;

use crate::codegen::{Stmt, Symbol};
use crate::kinds::UNION;
use crate::tree::Tree;
use crate::Result;

impl Tree {
    /// Join a child's distance and material into the innermost open node
    pub(crate) fn rjoin(&mut self, child_d: Symbol, child_m: Option<Symbol>) -> Result<()> {
        let (parent_kind, parent_d, parent_args) = {
            let top = self.top()?;
            (top.kind.clone(), top.distance.clone(), top.args.clone())
        };

        let Some(parent_d) = parent_d else {
            let parent = self.top_mut()?;
            parent.distance = Some(child_d);
            if child_m.is_some() {
                parent.material = child_m;
            }
            return Ok(());
        };

        let (join_kind, args) = match parent_kind.filter(|k| k.join().is_some()) {
            Some(kind) => (kind, parent_args),
            None => (self.resolve(&UNION)?, Vec::new()),
        };
        let out = self.cg.ident("d");
        self.cg.emit(Stmt::Join {
            out: out.clone(),
            kind: Arc::clone(&join_kind),
            a: parent_d.clone(),
            b: child_d.clone(),
            args,
        })?;

        let parent_m = self.top()?.material.clone();
        let material = match (parent_m, child_m) {
            (Some(pm), Some(cm)) if pm != cm => {
                let out = self.cg.ident("m");
                self.cg.emit(Stmt::Select {
                    out: out.clone(),
                    child_d,
                    parent_d,
                    child_m: cm,
                    parent_m: pm,
                })?;
                Some(out)
            }
            (pm, cm) => pm.or(cm),
        };

        let parent = self.top_mut()?;
        parent.distance = Some(out);
        parent.material = material;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::kind::Dim;
    use crate::kinds::{circle2, smooth_union, sphere3, translate3, union};
    use crate::material::Surface;
    use crate::view::CompileOptions;

    #[test]
    fn test_first_contribution_is_adopted() {
        let mut t = Tree::new(Dim::Two, &CompileOptions::default()).unwrap();
        t.with(union(), |t| t.leaf(circle2(1.0))).unwrap();
        let (cg, _) = t.finish().unwrap();
        assert!(!cg.source().contains("= union_join("));
    }

    #[test]
    fn test_join_passes_parent_arguments() {
        let mut t = Tree::new(Dim::Two, &CompileOptions::default()).unwrap();
        t.with(smooth_union(0.25), |t| {
            t.leaf(circle2(1.0))?;
            t.leaf(circle2(2.0))
        })
        .unwrap();
        let (cg, _) = t.finish().unwrap();
        assert!(cg
            .source()
            .contains("    float d2 = smooth_union_join(d0, d1, c0);"));
    }

    #[test]
    fn test_distinct_materials_select() {
        let red = Surface::color(1.0, 0.0, 0.0);
        let blue = Surface::color(0.0, 0.0, 1.0);
        let mut t = Tree::new(Dim::Three, &CompileOptions::default()).unwrap();
        t.with(union(), |t| {
            t.paint(&red, |t| t.leaf(sphere3(1.0)))?;
            t.paint(&blue, |t| {
                t.with(translate3(3.0, 0.0, 0.0), |t| t.leaf(sphere3(1.0)))
            })
        })
        .unwrap();
        let (cg, _) = t.finish().unwrap();
        let src = cg.source();
        assert_eq!(src.matches(" ? ").count(), 1);
        assert!(src.contains("    Material m0 = d1 < d0 ? c2 : c0;"));
        assert!(src.contains("    mat = m0;"));
    }

    #[test]
    fn test_identical_materials_never_select() {
        let red = Surface::color(1.0, 0.0, 0.0);
        let mut t = Tree::new(Dim::Three, &CompileOptions::default()).unwrap();
        t.with(union(), |t| {
            t.paint(&red, |t| t.leaf(sphere3(1.0)))?;
            t.paint(&red, |t| t.leaf(sphere3(2.0)))
        })
        .unwrap();
        let (cg, _) = t.finish().unwrap();
        let src = cg.source();
        assert!(!src.contains(" ? "));
        assert_eq!(src.matches("Material c").count(), 1);
    }

    #[test]
    fn test_material_survives_unpainted_sibling() {
        let red = Surface::color(1.0, 0.0, 0.0);
        let mut t = Tree::new(Dim::Three, &CompileOptions::default()).unwrap();
        t.with(union(), |t| {
            t.paint(&red, |t| t.leaf(sphere3(1.0)))?;
            t.leaf(sphere3(2.0))
        })
        .unwrap();
        let (cg, _) = t.finish().unwrap();
        let src = cg.source();
        assert!(!src.contains(" ? "));
        assert!(src.contains("    mat = c0;"));
    }
}
