use super::{BuildError, ClassDiagram};
use crate::parser::*;
use anyhow::bail;
use gamlgen_core::{Facets, InstanceRecord, sort_by_priority};
use indexmap::IndexMap;
use log::{error, info, trace};

/// Resolves all the instance specifications of the document against the given classes,
/// sorted by ascending priority.
pub(super) fn instances(
    doc: &Document,
    diagram: &ClassDiagram,
) -> anyhow::Result<Vec<InstanceRecord>> {
    let mut records = doc
        .find_all(
            doc.root(),
            TAG_PACKAGED_ELEMENT,
            &[(ATTR_XSI_TYPE, UML_INSTANCE_SPECIFICATION)],
        )
        .into_iter()
        .map(|instance| record(doc, diagram, instance))
        .collect::<anyhow::Result<Vec<_>>>()?;
    sort_by_priority(&mut records);
    info!(target: "builder", "{} instances resolved", records.len());
    Ok(records)
}

fn record(
    doc: &Document,
    diagram: &ClassDiagram,
    instance: ElementId,
) -> anyhow::Result<InstanceRecord> {
    let label = doc.label(instance);
    let Some(classifier) = doc.attr(instance, ATTR_CLASSIFIER) else {
        error!(target: "builder", "missing classifier to instance '{label}'");
        bail!(BuildError::MissingClassifier(label.to_string()));
    };
    let classes: Vec<_> = diagram
        .emitted()
        .filter(|class| class.id == classifier)
        .collect();
    let [class] = classes.as_slice() else {
        error!(target: "builder", "classifier '{classifier}' of instance '{label}' not found");
        bail!(BuildError::UnknownClassifier(classifier.to_string()));
    };
    trace!(target: "builder", "instance '{label}' of class '{}'", class.name);

    let features = diagram.flattened_attributes(&class.id);
    let mut attributes = IndexMap::new();
    for slot in doc.find_children(instance, TAG_SLOT, &[]) {
        let Some(value) = doc
            .find_child(slot, TAG_VALUE, &[])
            .and_then(|value| doc.attr(value, ATTR_SYMBOL).or_else(|| doc.attr(value, ATTR_VALUE)))
        else {
            error!(target: "builder", "missing value to slot '{}'", doc.label(slot));
            bail!(BuildError::MissingSlotValue(doc.label(slot).to_string()));
        };
        let feature = doc.attr_or_warn(slot, ATTR_DEFINING_FEATURE).unwrap_or_default();
        let matches: Vec<_> = features.iter().filter(|attr| attr.id == feature).collect();
        let [attribute] = matches.as_slice() else {
            error!(target: "builder", "attribute '{feature}' not found to instance '{label}'");
            bail!(BuildError::UnknownFeature(feature.to_string()));
        };
        attributes.insert(attribute.name.clone(), value.to_string());
    }

    let mut properties = doc.extension_properties(instance);
    let priority = match properties.shift_remove(PROP_PRIORITY) {
        Some(priority) => match priority.trim().parse::<f64>() {
            Ok(priority) => Some(priority),
            Err(err) => {
                error!(
                    target: "builder",
                    "invalid priority '{priority}' to instance '{label}': {err}"
                );
                bail!(BuildError::InvalidPriority {
                    instance: label.to_string(),
                    priority,
                });
            }
        },
        None => None,
    };
    let heading: Facets = properties.into_iter().collect();

    Ok(InstanceRecord {
        class_name: class.name.clone(),
        attributes,
        priority,
        heading,
    })
}
