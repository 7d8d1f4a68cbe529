use crate::{ClassModel, InitEntry};

/// The unique class of the global scope, with its initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalModel {
    /// The global class.
    pub class: ClassModel,
    /// Instance creations, in priority order, then the body of the `init` operation.
    pub init: Vec<InitEntry>,
}

/// The unique class of the experiment scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentModel {
    /// The experiment class.
    pub class: ClassModel,
}

/// A complete, resolved GAML model.
#[derive(Debug, Clone, PartialEq)]
pub struct GamlModel {
    /// Name of the model.
    pub name: String,
    /// Global block, if the model has one.
    pub global: Option<GlobalModel>,
    /// Experiment block, if the model has one.
    pub experiment: Option<ExperimentModel>,
    /// Emitted (non-abstract) classes of the meta-model.
    pub classes: Vec<ClassModel>,
}
