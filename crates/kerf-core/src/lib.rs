//! # kerf
//!
//! Compiles constructive-solid-geometry scenes into a single GLSL distance
//! function.
//!
//! Scenes are written as ordinary Rust code that opens and closes scopes on a
//! [`Tree`]. Each event emits GLSL immediately: transforms introduce new
//! position symbols, primitives compute distances, and closing a scope folds
//! its distance (and material) into the parent with the scope's join rule.
//!
//! ## Example
//!
//! ```rust
//! use kerf_core::kinds::{circle2, subtract, translate2, union};
//! use kerf_core::{CompileOptions, ViewRegistry};
//!
//! let mut views = ViewRegistry::new();
//! views
//!     .view2d("crescent", |t| {
//!         t.chain([union(), subtract()], |t| {
//!             t.with(translate2(0.5, 0.0), |t| t.leaf(circle2(1.0)))?;
//!             t.leaf(circle2(1.0))
//!         })
//!     })
//!     .unwrap();
//!
//! let out = views.compile("crescent", &CompileOptions::default()).unwrap();
//! assert!(out.source.contains("subtract_join"));
//! ```
//!
//! ## Output layout
//!
//! Helper definitions come first (the `Material` struct, then one helper per
//! rule of every kind used), followed by the map procedure and the fixed
//! render procedures for the view's dimensionality.

pub mod boilerplate;
pub mod codegen;
pub mod eval;
pub mod join;
pub mod kind;
pub mod kinds;
pub mod material;
pub mod text;
pub mod tree;
pub mod value;
pub mod view;

mod error;

pub use codegen::{Codegen, Stmt, Symbol};
pub use error::{Error, Result};
pub use eval::{Program, Sample};
pub use kind::{Dim, KindDef, NodeKind, Point};
pub use material::{Material, MaterialSet, Surface};
pub use tree::{Scope, Step, Tree};
pub use value::{Arg, Value, ValueType};
pub use view::{CompileOptions, Output, View, ViewRegistry};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::kinds::*;
    pub use crate::{
        CompileOptions, Dim, Material, Result, Surface, Tree, ViewRegistry, view2d, view3d,
    };
    pub use glam::{Vec2, Vec3};
}
