//! gamlgen turns UML class diagrams and state machines, exchanged as XMI documents,
//! into GAML agent-based simulation models.
//!
//! The resolution of the XMI document is done by [`gamlgen_fmt_xmi`],
//! which produces the intermediate representation defined in `gamlgen_core`
//! and renders it as GAML source text.

mod cli;

pub use cli::Cli;
pub use gamlgen_fmt_xmi;
