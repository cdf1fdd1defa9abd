//! kerf - compile CSG scenes into GLSL distance functions

mod scenes;
mod settings;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use kerf_core::kinds::CATALOGUE;
use kerf_core::prelude::{Vec2, Vec3};
use kerf_core::{CompileOptions, Dim, MaterialSet, NodeKind, Point, ViewRegistry};

use crate::settings::load_settings;

#[derive(Parser)]
#[command(name = "kerf")]
#[command(about = "Compile CSG scenes into GLSL distance functions", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to {config_dir}/kerf/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log compilation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered views
    List,

    /// Show the node kind catalogue
    Kinds,

    /// Compile a view and print or write its source
    Build {
        /// View to compile
        view: Option<String>,

        /// Compile every view into `<name>.glsl` files
        #[arg(long, conflicts_with = "view")]
        all: bool,

        /// Output file, or output directory with --all
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate a view's distance at a point on the CPU
    Eval {
        /// View to evaluate
        view: String,

        /// Point as comma-separated coordinates, e.g. 1,2 or 1,2,3
        #[arg(long, allow_hyphen_values = true)]
        at: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    // stdout carries generated source, logs go to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let views = scenes::registry().context("Failed to register scenes")?;
    tracing::debug!(views = views.len(), map = %settings.compile.map_name, "registered scenes");

    match cli.command {
        Commands::List => {
            for view in views.iter() {
                println!("{:<12} {}", view.name(), view.dim());
            }
        }

        Commands::Kinds => print_kinds()?,

        Commands::Build { view, all, output } => {
            if all {
                let dir = output
                    .or_else(|| settings.output_dir.clone())
                    .unwrap_or_else(|| PathBuf::from("."));
                build_all(&views, &settings.compile, &dir)?;
            } else {
                let Some(name) = view else {
                    bail!("No view given; pass a view name or --all");
                };
                let out = views
                    .compile(&name, &settings.compile)
                    .with_context(|| format!("Failed to compile view '{}'", name))?;
                match output {
                    Some(path) => {
                        fs::write(&path, &out.source)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        eprintln!("Wrote {} to {}", name, path.display());
                    }
                    None => print!("{}", out.source),
                }
            }
        }

        Commands::Eval { view, at } => {
            let coords = parse_point(&at)?;
            let out = views
                .compile(&view, &settings.compile)
                .with_context(|| format!("Failed to compile view '{}'", view))?;
            let point = match (out.dim, coords.as_slice()) {
                (Dim::Two, &[x, y]) => Point::from(Vec2::new(x, y)),
                (Dim::Three, &[x, y, z]) => Point::from(Vec3::new(x, y, z)),
                (dim, _) => bail!(
                    "View '{}' is {} but the point has {} coordinates",
                    view,
                    dim,
                    coords.len()
                ),
            };

            let sample = out.program.eval(point)?;
            println!("distance {:.6}", sample.distance);
            if let Some(values) = sample.material {
                let set = MaterialSet::for_dim(out.dim);
                for ((field, _), value) in set.fields().iter().zip(&values) {
                    println!("{} {}", field, value.literal());
                }
            }
        }
    }

    Ok(())
}

fn print_kinds() -> Result<()> {
    for &def in CATALOGUE {
        let kind = NodeKind::resolve(def)?;
        let args = if kind.shape().is_empty() {
            "-".to_string()
        } else {
            kind.shape()
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        let dim = kind.dim().map_or_else(|| "any".to_string(), |d| d.to_string());
        let rules = if kind.defines_material() {
            "material".to_string()
        } else {
            kind.rule_summary()
        };
        println!("{:<18} {:<8} {:<4} {}", kind.name(), args, dim, rules);
    }
    Ok(())
}

fn build_all(views: &ViewRegistry, options: &CompileOptions, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    for view in views.iter() {
        let out = view
            .compile(options)
            .with_context(|| format!("Failed to compile view '{}'", view.name()))?;
        let path = dir.join(format!("{}.glsl", view.name()));
        fs::write(&path, &out.source)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote {} to {}", view.name(), path.display());
    }
    Ok(())
}

/// Parse `x,y` or `x,y,z`
fn parse_point(text: &str) -> Result<Vec<f32>> {
    text.split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .with_context(|| format!("Invalid coordinate '{}' in '{}'", part, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("1,2").unwrap(), vec![1.0, 2.0]);
        assert_eq!(parse_point("-1.5, 0, 2").unwrap(), vec![-1.5, 0.0, 2.0]);
        assert!(parse_point("1,x").is_err());
    }

    #[test]
    fn test_cli_parses_build_all() {
        let cli = Cli::try_parse_from(["kerf", "build", "--all", "-o", "out"]).unwrap();
        match cli.command {
            Commands::Build { view, all, output } => {
                assert_eq!(view, None);
                assert!(all);
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_cli_parses_negative_point() {
        let cli = Cli::try_parse_from(["kerf", "eval", "test1", "--at", "-3,4"]).unwrap();
        assert!(matches!(cli.command, Commands::Eval { ref at, .. } if at == "-3,4"));
    }
}
