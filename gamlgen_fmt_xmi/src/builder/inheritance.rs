use super::BuildError;
use crate::parser::*;
use anyhow::bail;
use log::error;

/// Id of the parent of a class, if it has one.
///
/// A class can have at most one generalization.
pub(super) fn parent_id(doc: &Document, class: ElementId) -> anyhow::Result<Option<&str>> {
    match doc.find_children(class, TAG_GENERALIZATION, &[]).as_slice() {
        [] => Ok(None),
        [generalization] => Ok(doc.attr_or_warn(*generalization, ATTR_GENERAL)),
        _ => {
            error!(target: "builder", "multiple generalizations to class '{}'", doc.label(class));
            bail!(BuildError::MultipleInheritance(doc.label(class).to_string()));
        }
    }
}
