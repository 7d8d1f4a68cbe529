//! Type, cardinality and default value resolution of class members.

use super::BuildError;
use crate::parser::*;
use anyhow::bail;
use gamlgen_core::{DefaultValue, ResolvedType, TypeRef};
use indexmap::IndexMap;
use log::{debug, error, warn};
use std::collections::HashSet;

/// Classes and enumerations of a scope, by id.
#[derive(Debug, Default)]
pub(super) struct TypeIndex<'a> {
    pub(super) classes: IndexMap<&'a str, ElementId>,
    enums: HashSet<&'a str>,
}

impl<'a> TypeIndex<'a> {
    pub(super) fn new(doc: &'a Document, scope: ElementId) -> Self {
        let mut index = TypeIndex::default();
        for class in doc.find_all(scope, TAG_PACKAGED_ELEMENT, &[(ATTR_XSI_TYPE, UML_CLASS)]) {
            if let Some(id) = doc.attr_or_warn(class, ATTR_ID) {
                if index.classes.insert(id, class).is_some() {
                    warn!(target: "builder", "class id '{id}' declared multiple times");
                }
            }
        }
        for enumeration in
            doc.find_all(scope, TAG_PACKAGED_ELEMENT, &[(ATTR_XSI_TYPE, UML_ENUMERATION)])
        {
            if let Some(id) = doc.attr_or_warn(enumeration, ATTR_ID) {
                index.enums.insert(id);
            }
        }
        index
    }

    fn classify(&self, id: &str) -> Option<TypeRef> {
        if self.enums.contains(id) {
            Some(TypeRef::Enum)
        } else if self.classes.contains_key(id) {
            Some(TypeRef::Custom(id.to_string()))
        } else {
            None
        }
    }
}

/// Resolves the type of an attribute, a parameter or a return parameter.
///
/// Returns `None` if the member carries no type information at all.
pub(super) fn resolve_type(
    doc: &Document,
    index: &TypeIndex<'_>,
    member: ElementId,
    owner: &str,
) -> anyhow::Result<Option<ResolvedType>> {
    let type_child = doc.find_child(member, TAG_TYPE, &[]);
    if let Some(type_id) = doc.attr(member, ATTR_TYPE) {
        if let Some(reference) = index.classify(type_id) {
            return Ok(Some(ResolvedType::new(reference)));
        }
        if type_child.is_none() {
            return unknown_type(doc, member, owner, type_id);
        }
    }
    let Some(type_child) = type_child else {
        return Ok(None);
    };
    let Some((_, type_name)) = doc
        .attr(type_child, ATTR_HREF)
        .and_then(|href| href.rsplit_once(HREF_TYPE_SEPARATOR))
    else {
        error!(target: "builder", "malformed type to '{}' of '{owner}'", doc.label(member));
        bail!(BuildError::MissingType {
            member: doc.label(member).to_string(),
            owner: owner.to_string(),
        });
    };
    match TypeRef::primitive(type_name) {
        Some(reference) => Ok(Some(ResolvedType::new(reference))),
        None => unknown_type(doc, member, owner, type_name),
    }
}

fn unknown_type(
    doc: &Document,
    member: ElementId,
    owner: &str,
    type_name: &str,
) -> anyhow::Result<Option<ResolvedType>> {
    error!(target: "builder", "unknown type '{type_name}' to '{}' of '{owner}'", doc.label(member));
    bail!(BuildError::UnknownType {
        type_name: type_name.to_string(),
        member: doc.label(member).to_string(),
        owner: owner.to_string(),
    });
}

/// Like [`resolve_type`], but a member without type is an error.
pub(super) fn require_type(
    doc: &Document,
    index: &TypeIndex<'_>,
    member: ElementId,
    owner: &str,
) -> anyhow::Result<ResolvedType> {
    match resolve_type(doc, index, member, owner)? {
        Some(resolved) => Ok(resolved),
        None => {
            error!(target: "builder", "missing type to '{}' of '{owner}'", doc.label(member));
            bail!(BuildError::MissingType {
                member: doc.label(member).to_string(),
                owner: owner.to_string(),
            });
        }
    }
}

/// A member is a list as soon as any multiplicity bound is declared,
/// whatever its value.
pub(super) fn is_list(doc: &Document, member: ElementId) -> bool {
    doc.find_child(member, TAG_LOWER_VALUE, &[]).is_some()
        || doc.find_child(member, TAG_UPPER_VALUE, &[]).is_some()
}

/// Literal default value of an attribute (a `defaultValue` without value counts as absent).
pub(super) fn default_literal(doc: &Document, attribute: ElementId) -> Option<&str> {
    doc.find_child(attribute, TAG_DEFAULT_VALUE, &[])
        .and_then(|default| doc.attr(default, ATTR_VALUE))
}

/// Converts a literal to GAML syntax according to the GAML name of its type.
pub(super) fn convert_default(literal: &str, type_name: &str) -> String {
    match type_name {
        "int" => match literal.trim().parse::<i64>() {
            Ok(value) => value.to_string(),
            Err(err) => {
                debug!(target: "builder", "keeping int default '{literal}' verbatim: {err}");
                literal.to_string()
            }
        },
        "float" => match literal.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value.fract() == 0.0 => format!("{value:.1}"),
            Ok(value) => value.to_string(),
            Err(err) => {
                debug!(target: "builder", "keeping float default '{literal}' verbatim: {err}");
                literal.to_string()
            }
        },
        "string" => format!("\"{literal}\""),
        _ => literal.to_string(),
    }
}

/// Default value of an attribute of the given type.
///
/// A list attribute always has a default, empty if none is declared.
pub(super) fn default_value(
    doc: &Document,
    attribute: ElementId,
    resolved: &ResolvedType,
    is_list: bool,
) -> DefaultValue {
    let literal = default_literal(doc, attribute).map(|lit| convert_default(lit, resolved.name()));
    match (literal, is_list) {
        (Some(literal), true) => DefaultValue::List(vec![literal]),
        (None, true) => DefaultValue::List(Vec::new()),
        (Some(literal), false) => DefaultValue::Scalar(literal),
        (None, false) => DefaultValue::Absent,
    }
}
