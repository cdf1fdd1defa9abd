//! Named top-level scenes and their compilation
//!
//! A [`View`] pairs a dimensionality with a scene-construction routine.
//! Compiling it runs the routine against a fresh [`Tree`], so views never
//! share symbols or constants.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::boilerplate;
use crate::eval::Program;
use crate::kind::Dim;
use crate::tree::Tree;
use crate::{Error, Result};

/// Options for one compilation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Name of the generated distance procedure
    pub map_name: String,
    /// Append the fixed render procedures for the view's dimensionality
    pub boilerplate: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            map_name: "map".to_string(),
            boilerplate: true,
        }
    }
}

/// Scene-construction routine
pub type BuildFn = Box<dyn Fn(&mut Tree) -> Result<()> + Send + Sync>;

/// A named scene constructor
pub struct View {
    dim: Dim,
    name: String,
    build: BuildFn,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("dim", &self.dim)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Generated source of one view, plus its IR for CPU evaluation
#[derive(Debug, Clone)]
pub struct Output {
    pub name: String,
    pub dim: Dim,
    pub source: String,
    pub program: Program,
}

impl View {
    pub fn dim(&self) -> Dim {
        self.dim
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the scene routine and produce the final source text
    pub fn compile(&self, options: &CompileOptions) -> Result<Output> {
        tracing::debug!(view = %self.name, dim = %self.dim, "compiling view");

        let mut tree = Tree::new(self.dim, options)?;
        (self.build)(&mut tree)?;
        let (mut cg, program) = tree.finish()?;
        if options.boilerplate {
            cg.append_procedure(&boilerplate::template(self.dim, &options.map_name))?;
        }

        let source = cg.source();
        tracing::debug!(
            view = %self.name,
            statements = program.statements().len(),
            bytes = source.len(),
            "compiled view"
        );
        Ok(Output {
            name: self.name.clone(),
            dim: self.dim,
            source,
            program,
        })
    }
}

/// Registered views, in registration order
#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: Vec<View>,
    names: HashSet<String>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view; names must be unique
    pub fn register<F>(&mut self, dim: Dim, name: &str, build: F) -> Result<&View>
    where
        F: Fn(&mut Tree) -> Result<()> + Send + Sync + 'static,
    {
        if !self.names.insert(name.to_string()) {
            return Err(Error::DuplicateView(name.to_string()));
        }
        self.views.push(View {
            dim,
            name: name.to_string(),
            build: Box::new(build),
        });
        self.views
            .last()
            .ok_or_else(|| Error::UnknownView(name.to_string()))
    }

    pub fn view2d<F>(&mut self, name: &str, build: F) -> Result<&View>
    where
        F: Fn(&mut Tree) -> Result<()> + Send + Sync + 'static,
    {
        self.register(Dim::Two, name, build)
    }

    pub fn view3d<F>(&mut self, name: &str, build: F) -> Result<&View>
    where
        F: Fn(&mut Tree) -> Result<()> + Send + Sync + 'static,
    {
        self.register(Dim::Three, name, build)
    }

    pub fn get(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Compile the view registered as `name`
    pub fn compile(&self, name: &str, options: &CompileOptions) -> Result<Output> {
        self.get(name)
            .ok_or_else(|| Error::UnknownView(name.to_string()))?
            .compile(options)
    }
}

/// Register a 2D view named after the function
///
/// ```
/// use kerf_core::kinds::circle2;
/// use kerf_core::{Result, Tree, ViewRegistry, view2d};
///
/// fn dot(t: &mut Tree) -> Result<()> {
///     t.leaf(circle2(1.0))
/// }
///
/// let mut views = ViewRegistry::new();
/// view2d!(views, dot).unwrap();
/// assert_eq!(views.get("dot").map(|v| v.name()), Some("dot"));
/// ```
#[macro_export]
macro_rules! view2d {
    ($registry:expr, $build:ident) => {
        $registry.view2d(stringify!($build), $build)
    };
}

/// Register a 3D view named after the function
#[macro_export]
macro_rules! view3d {
    ($registry:expr, $build:ident) => {
        $registry.view3d(stringify!($build), $build)
    };
}
