//! Reader and resolver for XMI class diagrams with embedded state machines,
//! producing the [`gamlgen_core`] representation of a GAML model.

pub mod bodies;
mod builder;
pub mod parser;

pub use bodies::{Bodies, BodyLookup, skeleton};
pub use builder::{BuildError, ClassDiagram, ModelBuilder, Scopes};
pub use gamlgen_core;
use gamlgen_core::GamlModel;
pub use parser::{Document, ElementId, ParserError};
use std::path::Path;

/// Loads and resolves the XMI model at the given path,
/// naming the model after the file stem.
pub fn load(path: &Path, bodies: &dyn BodyLookup, scopes: Scopes) -> anyhow::Result<GamlModel> {
    let doc = Document::load(path)?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("model");
    ModelBuilder::new(&doc, bodies).with_scopes(scopes).build(name)
}
