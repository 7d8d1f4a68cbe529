//! Model builder resolving an XMI [`Document`] into a [`GamlModel`].
//!
//! Resolution is fail-fast: the first structural violation aborts the build
//! with a [`BuildError`] naming the offending element,
//! while recoverable oddities are only logged as warnings.

mod class_diagram;
mod fsm;
mod inheritance;
mod instance;
mod scope;
mod types;

use crate::bodies::BodyLookup;
use crate::parser::*;
use anyhow::bail;
pub use class_diagram::ClassDiagram;
use gamlgen_core::GamlModel;
use log::{error, info, warn};
use thiserror::Error;

/// The error type for structural violations found while resolving a model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A class declares more than one generalization.
    #[error("multiple inheritances detected to `{0}`")]
    MultipleInheritance(String),
    /// The parent of a class is not a class of the same scope.
    #[error("parent `{parent}` of `{class}` not found")]
    UnresolvedParent { class: String, parent: String },
    /// The type of a member is neither an enumeration, a class nor a known primitive.
    #[error("type `{type_name}` unknown to `{member}` of `{owner}`")]
    UnknownType {
        type_name: String,
        member: String,
        owner: String,
    },
    /// A member carries no usable type information.
    #[error("missing type to `{member}` of `{owner}`")]
    MissingType { member: String, owner: String },
    /// A transition has no guard condition.
    #[error("missing condition to transition `{0}`")]
    MissingCondition(String),
    /// An endpoint of a transition is not a state of its machine.
    #[error("state `{state}` of transition `{transition}` not found in its state machine")]
    UnknownState { transition: String, state: String },
    /// A behavior package holds no state machine.
    #[error("behavior package `{0}` has no state machine")]
    MissingStateMachine(String),
    /// The global or experiment scope holds more than one class.
    #[error("{scope} block must have only one class, found {count}")]
    SingletonScope { scope: String, count: usize },
    /// Many packages share the name of a scope.
    #[error("package `{0}` declared multiple times")]
    DuplicateScope(String),
    /// An instance has no classifier.
    #[error("instance `{0}` must have a classifier attribute")]
    MissingClassifier(String),
    /// The classifier of an instance is not a (concrete) class.
    #[error("missing class id `{0}`")]
    UnknownClassifier(String),
    /// A slot of an instance has no value.
    #[error("missing value to slot `{0}`")]
    MissingSlotValue(String),
    /// A slot of an instance refers to no attribute of the instantiated class.
    #[error("missing attribute `{0}` during instantiation")]
    UnknownFeature(String),
    /// The priority of an instance is not a number.
    #[error("invalid priority `{priority}` to instance `{instance}`")]
    InvalidPriority { instance: String, priority: String },
    /// No class has the given name.
    #[error("class `{0}` not found")]
    UnknownClass(String),
}

/// Names of the packages holding the three parts of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scopes {
    pub meta_model: String,
    pub global: String,
    pub experiment: String,
}

impl Default for Scopes {
    fn default() -> Self {
        Self {
            meta_model: String::from("meta_model"),
            global: String::from("global"),
            experiment: String::from("experiment"),
        }
    }
}

/// Builder turning a [`Document`] into a [`GamlModel`].
pub struct ModelBuilder<'a> {
    doc: &'a Document,
    bodies: &'a dyn BodyLookup,
    scopes: Scopes,
    root: Option<String>,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(doc: &'a Document, bodies: &'a dyn BodyLookup) -> Self {
        Self {
            doc,
            bodies,
            scopes: Scopes::default(),
            root: None,
        }
    }

    pub fn with_scopes(mut self, scopes: Scopes) -> Self {
        self.scopes = scopes;
        self
    }

    /// Only emit the classes reachable from the named class (see [`ClassDiagram::rooted`]).
    pub fn with_root(mut self, root: Option<String>) -> Self {
        self.root = root;
        self
    }

    /// Resolves the whole document.
    ///
    /// Fails on the first structural violation found.
    pub fn build(&self, name: &str) -> anyhow::Result<GamlModel> {
        info!(target: "builder", "building meta-model scope '{}'", self.scopes.meta_model);
        let meta_model = match self.scope(&self.scopes.meta_model)? {
            Some(package) => ClassDiagram::build(self.doc, package, self.bodies)?,
            None => {
                warn!(target: "builder", "missing '{}' package", self.scopes.meta_model);
                ClassDiagram::default()
            }
        };

        info!(target: "builder", "building global scope '{}'", self.scopes.global);
        let global = scope::global(
            self.doc,
            self.scope(&self.scopes.global)?,
            &self.scopes.global,
            &meta_model,
            self.bodies,
        )?;

        info!(target: "builder", "building experiment scope '{}'", self.scopes.experiment);
        let experiment = scope::experiment(
            self.doc,
            self.scope(&self.scopes.experiment)?,
            &self.scopes.experiment,
            self.bodies,
        )?;

        let classes = match &self.root {
            Some(root) => meta_model.rooted(root)?.into_iter().cloned().collect(),
            None => meta_model.into_emitted(),
        };
        info!(target: "builder", "model '{name}' resolved with {} classes", classes.len());

        Ok(GamlModel {
            name: name.to_string(),
            global,
            experiment,
            classes,
        })
    }

    // The package holding the given scope, if any.
    fn scope(&self, name: &str) -> anyhow::Result<Option<ElementId>> {
        let packages = self.doc.find_all(
            self.doc.root(),
            TAG_PACKAGED_ELEMENT,
            &[(ATTR_XSI_TYPE, UML_PACKAGE), (ATTR_NAME, name)],
        );
        match packages.as_slice() {
            [] => Ok(None),
            [package] => Ok(Some(*package)),
            _ => {
                error!(target: "builder", "package '{name}' declared {} times", packages.len());
                bail!(BuildError::DuplicateScope(name.to_string()));
            }
        }
    }
}
