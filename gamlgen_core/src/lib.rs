//! Intermediate representation of GAML models resolved from UML class and state diagrams,
//! and the renderer turning it into GAML source text.
//!
//! The IR is produced by a format crate (e.g. `gamlgen_fmt_xmi`)
//! and is fully resolved: no class id is left to be looked up
//! once a [`GamlModel`] has been handed over to [`render`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod class;
mod controller;
mod instance;
mod model;
pub mod render;

pub use class::*;
pub use controller::*;
pub use instance::*;
pub use model::*;
pub use render::render;
