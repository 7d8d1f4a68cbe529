use crate::ControllerState;
use std::fmt;

/// Reference to the type of an attribute, a parameter or an operation's return value.
///
/// [`TypeRef::Custom`] carries the id of the referenced class rather than its name,
/// since the name is only known once the whole scope has been indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// An enumeration of the same scope.
    Enum,
    /// A class of the same scope, identified by its id.
    Custom(String),
    /// A primitive type, already converted to its GAML name.
    Primitive(String),
}

impl TypeRef {
    /// GAML type used for every enumeration.
    pub const ENUM_TYPE: &'static str = "int";

    /// Fixed conversion table from UML primitive type names to GAML type names.
    pub const PRIMITIVES: [(&'static str, &'static str); 4] = [
        ("String", "string"),
        ("Real", "float"),
        ("Boolean", "bool"),
        ("Integer", "int"),
    ];

    /// Converts a UML primitive type name into a [`TypeRef::Primitive`],
    /// if the name belongs to the conversion table.
    ///
    /// ```
    /// # use gamlgen_core::TypeRef;
    /// assert_eq!(TypeRef::primitive("Real"), Some(TypeRef::Primitive("float".to_string())));
    /// assert_eq!(TypeRef::primitive("Date"), None);
    /// ```
    pub fn primitive(uml_name: &str) -> Option<TypeRef> {
        Self::PRIMITIVES
            .iter()
            .find(|(uml, _)| *uml == uml_name)
            .map(|(_, gaml)| TypeRef::Primitive(gaml.to_string()))
    }
}

/// A [`TypeRef`] together with its GAML type name.
///
/// The name of a [`TypeRef::Custom`] is empty until [`ResolvedType::substitute`] is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    reference: TypeRef,
    name: String,
}

impl ResolvedType {
    /// Wraps a [`TypeRef`], naming enumerations and primitives right away.
    pub fn new(reference: TypeRef) -> Self {
        let name = match &reference {
            TypeRef::Enum => TypeRef::ENUM_TYPE.to_string(),
            TypeRef::Primitive(name) => name.clone(),
            TypeRef::Custom(_) => String::new(),
        };
        Self { reference, name }
    }

    /// The underlying reference.
    pub fn reference(&self) -> &TypeRef {
        &self.reference
    }

    /// The GAML type name (empty for a custom type not yet substituted).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the referenced class, if the type is custom.
    pub fn class_id(&self) -> Option<&str> {
        match &self.reference {
            TypeRef::Custom(id) => Some(id),
            _ => None,
        }
    }

    /// Whether the GAML name is known.
    pub fn is_resolved(&self) -> bool {
        !self.name.is_empty()
    }

    /// Sets the name of a custom type to that of the referenced class.
    pub fn substitute(&mut self, class_name: &str) {
        if matches!(self.reference, TypeRef::Custom(_)) {
            self.name = class_name.to_string();
        }
    }
}

/// Ordered `key: value` modifiers attached to a class, an attribute, an operation or an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets(Vec<(String, String)>);

impl Facets {
    /// Creates an empty set of facets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a facet, keeping insertion order.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Value of the first facet with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the facets in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of facets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there is no facet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Facets {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Facets(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Facets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}

/// Default value of an attribute, already converted to GAML literal syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DefaultValue {
    /// No default value.
    #[default]
    Absent,
    /// Default value of a scalar attribute.
    Scalar(String),
    /// Default values of a list attribute (possibly empty).
    List(Vec<String>),
}

/// An attribute of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeModel {
    /// Scope-unique id.
    pub id: String,
    /// Attribute name.
    pub name: String,
    /// Declared visibility, if any.
    pub visibility: Option<String>,
    /// Static attributes are kept in the IR but not rendered.
    pub is_static: bool,
    /// Type of the attribute (of its elements, for lists).
    pub r#type: ResolvedType,
    /// Whether the attribute holds a list of values.
    pub is_list: bool,
    /// Converted default value.
    pub default_value: DefaultValue,
    /// Free-form facets from the attribute's extension properties.
    pub heading: Facets,
}

/// Return type of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    /// The `init` operation returns nothing.
    NoReturn,
    /// Generic GAML action.
    Action,
    /// A value of the given type.
    Value(ResolvedType),
}

impl ReturnType {
    /// GAML keyword used for operations without a typed return value.
    pub const ACTION: &'static str = "action";

    /// GAML name of the return type, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            ReturnType::NoReturn => None,
            ReturnType::Action => Some(Self::ACTION),
            ReturnType::Value(resolved) => Some(resolved.name()),
        }
    }
}

/// A parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Type of the parameter (of its elements, for lists).
    pub r#type: ResolvedType,
    /// Whether the parameter is a list.
    pub is_list: bool,
}

impl Parameter {
    /// GAML type of the parameter, e.g. `list<int>`.
    pub fn type_string(&self) -> String {
        if self.is_list {
            format!("list<{}>", self.r#type.name())
        } else {
            self.r#type.name().to_string()
        }
    }
}

/// An operation of a class, rendered as a GAML action or reflex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationModel {
    /// Scope-unique id.
    pub id: String,
    /// Operation name.
    pub name: String,
    /// Return type.
    pub return_type: ReturnType,
    /// Whether the operation returns a list.
    pub is_list: bool,
    /// Ordinary parameters, in declaration order.
    pub parameters: Vec<Parameter>,
    /// Opaque body, copied verbatim from the body lookup source.
    pub body: Option<String>,
    /// `when` guard promoted from the operation's properties.
    pub guard: Option<String>,
}

impl OperationModel {
    /// Name of the operation initializing its owner.
    pub const INIT: &'static str = "init";

    /// Whether this is the `init` operation.
    pub fn is_init(&self) -> bool {
        self.name == Self::INIT
    }
}

/// GAML category of a generated class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClassKind {
    /// A plain species.
    #[default]
    Species,
    /// A spatial grid.
    Grid,
    /// Any other GAML category, kept verbatim.
    Other(String),
}

impl ClassKind {
    /// Derives the kind from the value of the `object_type` property.
    pub fn from_object_type(object_type: Option<&str>) -> Self {
        match object_type {
            None | Some("species") => ClassKind::Species,
            Some("grid") => ClassKind::Grid,
            Some(other) => ClassKind::Other(other.to_string()),
        }
    }

    /// GAML keyword opening the class definition.
    pub fn keyword(&self) -> &str {
        match self {
            ClassKind::Species => "species",
            ClassKind::Grid => "grid",
            ClassKind::Other(keyword) => keyword,
        }
    }
}

/// Resolved parent of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    /// Id of the parent class.
    pub id: String,
    /// Name of the parent class.
    pub name: String,
}

/// A class of the model, with its controller state machine if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassModel {
    /// Scope-unique id.
    pub id: String,
    /// Class name.
    pub name: String,
    /// Abstract classes take part in resolution but are never emitted.
    pub is_abstract: bool,
    /// Single parent, if any.
    pub parent: Option<ParentRef>,
    /// GAML category.
    pub kind: ClassKind,
    /// Value of the `skills` property.
    pub skills: Option<String>,
    /// Free-form facets, followed by `control: fsm` for controlled classes.
    pub heading: Facets,
    /// Own attributes (inherited ones are not repeated).
    pub attributes: Vec<AttributeModel>,
    /// Own operations.
    pub operations: Vec<OperationModel>,
    /// States of the controller state machine (empty if the class has none).
    pub controller: Vec<ControllerState>,
}

impl ClassModel {
    /// Looks up an operation by name.
    pub fn operation(&self, name: &str) -> Option<&OperationModel> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Looks up an own attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeModel> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Whether the class is driven by a state machine.
    pub fn has_controller(&self) -> bool {
        !self.controller.is_empty()
    }
}
