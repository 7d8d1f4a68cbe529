// Tags
pub const TAG_PACKAGED_ELEMENT: &str = "packagedElement";
pub const TAG_OWNED_ATTRIBUTE: &str = "ownedAttribute";
pub const TAG_OWNED_OPERATION: &str = "ownedOperation";
pub const TAG_OWNED_PARAMETER: &str = "ownedParameter";
pub const TAG_GENERALIZATION: &str = "generalization";
pub const TAG_TYPE: &str = "type";
pub const TAG_LOWER_VALUE: &str = "lowerValue";
pub const TAG_UPPER_VALUE: &str = "upperValue";
pub const TAG_DEFAULT_VALUE: &str = "defaultValue";
pub const TAG_EXTENSION: &str = "xmi:Extension";
pub const TAG_DETAILS: &str = "details";
pub const TAG_SUBVERTEX: &str = "subvertex";
pub const TAG_TRANSITION: &str = "transition";
pub const TAG_OWNED_RULE: &str = "ownedRule";
pub const TAG_SPECIFICATION: &str = "specification";
pub const TAG_SLOT: &str = "slot";
pub const TAG_VALUE: &str = "value";

// Attributes
pub const ATTR_ID: &str = "xmi:id";
pub const ATTR_XSI_TYPE: &str = "xsi:type";
pub const ATTR_NAME: &str = "name";
pub const ATTR_TYPE: &str = "type";
pub const ATTR_HREF: &str = "href";
pub const ATTR_GENERAL: &str = "general";
pub const ATTR_KEY: &str = "key";
pub const ATTR_VALUE: &str = "value";
pub const ATTR_SYMBOL: &str = "symbol";
pub const ATTR_VISIBILITY: &str = "visibility";
pub const ATTR_IS_ABSTRACT: &str = "isAbstract";
pub const ATTR_IS_STATIC: &str = "isStatic";
pub const ATTR_DIRECTION: &str = "direction";
pub const ATTR_CLIENT: &str = "client";
pub const ATTR_SUPPLIER: &str = "supplier";
pub const ATTR_SOURCE: &str = "source";
pub const ATTR_TARGET: &str = "target";
pub const ATTR_GUARD: &str = "guard";
pub const ATTR_CLASSIFIER: &str = "classifier";
pub const ATTR_DEFINING_FEATURE: &str = "definingFeature";

// Values of `xsi:type`
pub const UML_PACKAGE: &str = "uml:Package";
pub const UML_CLASS: &str = "uml:Class";
pub const UML_ENUMERATION: &str = "uml:Enumeration";
pub const UML_DEPENDENCY: &str = "uml:Dependency";
pub const UML_STATE_MACHINE: &str = "uml:StateMachine";
pub const UML_INSTANCE_SPECIFICATION: &str = "uml:InstanceSpecification";

pub const DIRECTION_RETURN: &str = "return";
pub const VALUE_TRUE: &str = "true";
// Separator between the library path and the primitive type name in a type `href`.
pub const HREF_TYPE_SEPARATOR: &str = "#//";

// Reserved extension property keys
pub const PROP_UUID: &str = "uuid";
pub const PROP_OBJECT_TYPE: &str = "object_type";
pub const PROP_SKILLS: &str = "skills";
pub const PROP_WHEN: &str = "when";
pub const PROP_PRIORITY: &str = "priority";
pub const PROP_BEHAVIOR: &str = "behavior";
