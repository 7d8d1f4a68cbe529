//! Store of operation bodies, written by hand next to the model.
//!
//! Bodies are GAML statements kept as opaque text,
//! looked up by owner class name and operation name.

use anyhow::Context;
use gamlgen_core::{ClassModel, GamlModel};
use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, str::FromStr};

/// Source of the bodies of operations.
pub trait BodyLookup {
    /// Body of the operation `member` of class `owner`.
    fn body_for(&self, owner: &str, member: &str) -> Option<&str>;

    /// Whether the source provides no body at all.
    fn is_empty(&self) -> bool;
}

/// Bodies read from a JSON object of the form `{ "Owner": { "member": "body" } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bodies(IndexMap<String, IndexMap<String, String>>);

impl Bodies {
    /// Reads the bodies from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        info!(target: "parser", "parsing bodies file '{}'", path.display());
        let reader = File::open(path)
            .with_context(|| format!("failed to create reader from file '{}'", path.display()))?;
        serde_json::de::from_reader(BufReader::new(reader))
            .with_context(|| format!("failed to parse bodies in '{}'", path.display()))
    }

    /// Sets the body of an operation, replacing any previous one.
    pub fn insert(&mut self, owner: &str, member: &str, body: impl Into<String>) {
        self.0
            .entry(owner.to_string())
            .or_default()
            .insert(member.to_string(), body.into());
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize bodies")
    }
}

impl FromStr for Bodies {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).context("failed to parse bodies")
    }
}

impl BodyLookup for Bodies {
    fn body_for(&self, owner: &str, member: &str) -> Option<&str> {
        self.0
            .get(owner)
            .and_then(|members| members.get(member))
            .map(String::as_str)
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Builds the skeleton of the bodies of a model:
/// every operation of every class mapped to an empty body,
/// classes first, then the global and experiment classes.
pub fn skeleton(model: &GamlModel) -> Bodies {
    let mut bodies = Bodies::default();
    let classes = model
        .classes
        .iter()
        .chain(model.global.as_ref().map(|global| &global.class))
        .chain(model.experiment.as_ref().map(|experiment| &experiment.class));
    for class in classes {
        add_class(&mut bodies, class);
    }
    bodies
}

fn add_class(bodies: &mut Bodies, class: &ClassModel) {
    let members = bodies.0.entry(class.name.clone()).or_default();
    for operation in &class.operations {
        members.insert(operation.name.clone(), String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() -> anyhow::Result<()> {
        let bodies: Bodies = r#"{ "Prey": { "eat": "energy <- energy + 1;" } }"#.parse()?;
        assert!(!bodies.is_empty());
        assert_eq!(bodies.body_for("Prey", "eat"), Some("energy <- energy + 1;"));
        assert_eq!(bodies.body_for("Prey", "flee"), None);
        assert_eq!(bodies.body_for("Predator", "eat"), None);
        assert!(Bodies::default().is_empty());
        Ok(())
    }

    #[test]
    fn malformed() {
        assert!(r#"{ "Prey": "eat" }"#.parse::<Bodies>().is_err());
    }

    #[test]
    fn serialization_keeps_order() -> anyhow::Result<()> {
        let mut bodies = Bodies::default();
        bodies.insert("Zebra", "run", "");
        bodies.insert("Ant", "dig", "");
        let json = bodies.to_json()?;
        assert!(json.find("Zebra") < json.find("Ant"));
        assert_eq!(json.parse::<Bodies>()?, bodies);
        Ok(())
    }
}
