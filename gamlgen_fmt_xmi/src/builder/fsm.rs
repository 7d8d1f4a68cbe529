//! Extraction of the controller state machines of a scope.

use super::BuildError;
use crate::parser::*;
use anyhow::bail;
use gamlgen_core::{ControllerState, StateTransition};
use indexmap::IndexMap;
use log::{error, trace, warn};

/// State machines of the behavior packages of a scope, by package id.
pub(super) fn controllers(
    doc: &Document,
    scope: ElementId,
) -> anyhow::Result<IndexMap<String, Vec<ControllerState>>> {
    let mut controllers = IndexMap::new();
    for package in doc.find_all(scope, TAG_PACKAGED_ELEMENT, &[(ATTR_XSI_TYPE, UML_PACKAGE)]) {
        if !doc.extension_properties(package).contains_key(PROP_BEHAVIOR) {
            continue;
        }
        let Some(id) = doc.attr_or_warn(package, ATTR_ID) else {
            continue;
        };
        trace!(target: "builder", "behavior package '{}'", doc.label(package));
        controllers.insert(id.to_string(), states(doc, package)?);
    }
    Ok(controllers)
}

fn states(doc: &Document, package: ElementId) -> anyhow::Result<Vec<ControllerState>> {
    let machines = doc.find_all(
        package,
        TAG_PACKAGED_ELEMENT,
        &[(ATTR_XSI_TYPE, UML_STATE_MACHINE)],
    );
    let Some(&machine) = machines.first() else {
        error!(target: "builder", "no state machine in behavior package '{}'", doc.label(package));
        bail!(BuildError::MissingStateMachine(doc.label(package).to_string()));
    };
    if machines.len() > 1 {
        warn!(
            target: "builder",
            "{} state machines in behavior package '{}', only the first is used",
            machines.len(),
            doc.label(package)
        );
    }

    let mut states = IndexMap::new();
    for vertex in doc.find_all(machine, TAG_SUBVERTEX, &[]) {
        let Some(id) = doc.attr_or_warn(vertex, ATTR_ID) else {
            continue;
        };
        let name = doc.attr_or_warn(vertex, ATTR_NAME).unwrap_or_default();
        let mut state = ControllerState::new(id.to_string(), name.to_string());
        state.actions = doc.extension_properties(vertex).into_keys().collect();
        states.insert(id, state);
    }

    for transition in doc.find_all(machine, TAG_TRANSITION, &[]) {
        let label = doc.label(transition);
        let source = doc.attr_or_warn(transition, ATTR_SOURCE).unwrap_or_default();
        let target = doc.attr_or_warn(transition, ATTR_TARGET).unwrap_or_default();
        for endpoint in [source, target] {
            if !states.contains_key(endpoint) {
                error!(target: "builder", "state '{endpoint}' of transition '{label}' not found");
                bail!(BuildError::UnknownState {
                    transition: label.to_string(),
                    state: endpoint.to_string(),
                });
            }
        }
        let Some(condition) = condition(doc, transition) else {
            error!(target: "builder", "missing condition to transition '{label}'");
            bail!(BuildError::MissingCondition(label.to_string()));
        };
        let target_name = states
            .get(target)
            .map(|state| state.name.clone())
            .unwrap_or_default();
        if let Some(state) = states.get_mut(source) {
            state.transitions.push(StateTransition {
                id: doc.attr(transition, ATTR_ID).unwrap_or(label).to_string(),
                target: target_name,
                condition: condition.to_string(),
                actions: doc.extension_properties(transition).into_keys().collect(),
            });
        }
    }

    Ok(states.into_values().collect())
}

// Guard of a transition: the specification of the owned rule it refers to.
fn condition(doc: &Document, transition: ElementId) -> Option<&str> {
    let guard = doc.attr(transition, ATTR_GUARD)?;
    let rule = doc.find_one(transition, TAG_OWNED_RULE, &[(ATTR_ID, guard)])?;
    let specification = doc.find_one(rule, TAG_SPECIFICATION, &[])?;
    doc.attr(specification, ATTR_VALUE)
}
