//! Resolution of the classes of a scope.

use super::types::{self, TypeIndex};
use super::{BuildError, fsm, inheritance};
use crate::bodies::BodyLookup;
use crate::parser::*;
use anyhow::bail;
use gamlgen_core::*;
use indexmap::IndexMap;
use log::{error, info, trace, warn};
use std::collections::{HashMap, HashSet, VecDeque};

/// The resolved classes of a scope, abstract ones included, by id in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDiagram {
    classes: IndexMap<String, ClassModel>,
}

impl ClassDiagram {
    /// Resolves every class of the given scope.
    pub fn build(
        doc: &Document,
        scope: ElementId,
        bodies: &dyn BodyLookup,
    ) -> anyhow::Result<Self> {
        let index = TypeIndex::new(doc, scope);
        let controllers = fsm::controllers(doc, scope)?;
        let dependencies = doc.find_all(
            scope,
            TAG_PACKAGED_ELEMENT,
            &[(ATTR_XSI_TYPE, UML_DEPENDENCY)],
        );
        let builder = ClassBuilder {
            doc,
            index: &index,
            controllers: &controllers,
            dependencies: &dependencies,
            bodies,
        };

        let mut classes = IndexMap::new();
        for (&id, &element) in index.classes.iter() {
            trace!(target: "builder", "building class '{}'", doc.label(element));
            classes.insert(id.to_string(), builder.class(id, element)?);
        }

        // Custom types are named once every class of the scope is known.
        let names: HashMap<String, String> = classes
            .iter()
            .map(|(id, class)| (id.clone(), class.name.clone()))
            .collect();
        for class in classes.values_mut() {
            substitute(class, &names);
        }

        info!(
            target: "builder",
            "{} classes resolved in scope '{}'",
            classes.len(),
            doc.label(scope)
        );
        Ok(ClassDiagram { classes })
    }

    /// Class with the given id.
    pub fn get(&self, id: &str) -> Option<&ClassModel> {
        self.classes.get(id)
    }

    /// All the classes, abstract ones included.
    pub fn all(&self) -> impl Iterator<Item = &ClassModel> {
        self.classes.values()
    }

    /// The non-abstract classes.
    pub fn emitted(&self) -> impl Iterator<Item = &ClassModel> {
        self.all().filter(|class| !class.is_abstract)
    }

    pub fn into_emitted(self) -> Vec<ClassModel> {
        self.classes
            .into_values()
            .filter(|class| !class.is_abstract)
            .collect()
    }

    /// Own and inherited attributes of a class, own ones first, then each ancestor's.
    pub fn flattened_attributes(&self, id: &str) -> Vec<&AttributeModel> {
        let mut attributes = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(id);
        while let Some(id) = next.take() {
            if !seen.insert(id) {
                warn!(target: "builder", "inheritance cycle through class '{id}'");
                break;
            }
            let Some(class) = self.get(id) else {
                break;
            };
            attributes.extend(class.attributes.iter());
            next = class.parent.as_ref().map(|parent| parent.id.as_str());
        }
        attributes
    }

    /// The non-abstract classes reachable from the named class, in breadth-first order.
    ///
    /// Ancestors of the root come first, following parents and attribute types.
    /// Then come the root and the classes reachable from it,
    /// following subclasses and attribute types.
    /// Each class is visited at most once.
    pub fn rooted(&self, root: &str) -> anyhow::Result<Vec<&ClassModel>> {
        let Some(root) = self.all().find(|class| class.name == root) else {
            error!(target: "builder", "root class '{root}' not found");
            bail!(BuildError::UnknownClass(root.to_string()));
        };
        let mut reached = Vec::new();
        let mut seen = HashSet::from([root.id.as_str()]);

        let mut ancestors = VecDeque::new();
        if let Some(parent) = self.parent_of(root) {
            seen.insert(parent.id.as_str());
            ancestors.push_back(parent);
        }
        self.walk(ancestors, &mut seen, &mut reached, |class| {
            self.parent_of(class).into_iter().collect()
        });
        self.walk(VecDeque::from([root]), &mut seen, &mut reached, |class| {
            self.subclasses(class).collect()
        });
        Ok(reached)
    }

    fn parent_of(&self, class: &ClassModel) -> Option<&ClassModel> {
        class.parent.as_ref().and_then(|parent| self.get(&parent.id))
    }

    fn subclasses<'a>(&'a self, class: &'a ClassModel) -> impl Iterator<Item = &'a ClassModel> {
        self.all()
            .filter(move |sub| sub.parent.as_ref().is_some_and(|parent| parent.id == class.id))
    }

    // Breadth-first expansion of the queue along `hierarchy` and attribute types.
    fn walk<'a>(
        &'a self,
        mut queue: VecDeque<&'a ClassModel>,
        seen: &mut HashSet<&'a str>,
        reached: &mut Vec<&'a ClassModel>,
        hierarchy: impl Fn(&'a ClassModel) -> Vec<&'a ClassModel>,
    ) {
        while let Some(class) = queue.pop_front() {
            trace!(target: "builder", "reached class '{}'", class.name);
            if !class.is_abstract {
                reached.push(class);
            }
            let referenced = class
                .attributes
                .iter()
                .filter_map(|attribute| attribute.r#type.class_id())
                .filter_map(|id| self.get(id));
            for next in hierarchy(class).into_iter().chain(referenced) {
                if seen.insert(next.id.as_str()) {
                    queue.push_back(next);
                }
            }
        }
    }
}

fn substitute(class: &mut ClassModel, names: &HashMap<String, String>) {
    let name_of = |resolved: &ResolvedType| {
        resolved
            .class_id()
            .and_then(|id| names.get(id))
            .cloned()
    };
    for attribute in class.attributes.iter_mut() {
        if let Some(name) = name_of(&attribute.r#type) {
            attribute.r#type.substitute(&name);
        }
    }
    for operation in class.operations.iter_mut() {
        if let ReturnType::Value(resolved) = &mut operation.return_type {
            if let Some(name) = name_of(&*resolved) {
                resolved.substitute(&name);
            }
        }
        for parameter in operation.parameters.iter_mut() {
            if let Some(name) = name_of(&parameter.r#type) {
                parameter.r#type.substitute(&name);
            }
        }
    }
}

struct ClassBuilder<'a> {
    doc: &'a Document,
    index: &'a TypeIndex<'a>,
    controllers: &'a IndexMap<String, Vec<ControllerState>>,
    dependencies: &'a [ElementId],
    bodies: &'a dyn BodyLookup,
}

impl ClassBuilder<'_> {
    fn class(&self, id: &str, element: ElementId) -> anyhow::Result<ClassModel> {
        let doc = self.doc;
        let name = doc.attr_or_warn(element, ATTR_NAME).unwrap_or_default();

        let parent = match inheritance::parent_id(doc, element)? {
            Some(parent_id) => {
                let Some(&parent) = self.index.classes.get(parent_id) else {
                    error!(target: "builder", "parent '{parent_id}' of class '{name}' not found");
                    bail!(BuildError::UnresolvedParent {
                        class: name.to_string(),
                        parent: parent_id.to_string(),
                    });
                };
                Some(ParentRef {
                    id: parent_id.to_string(),
                    name: doc.attr(parent, ATTR_NAME).unwrap_or_default().to_string(),
                })
            }
            None => None,
        };

        let mut properties = doc.extension_properties(element);
        let kind = ClassKind::from_object_type(
            properties.shift_remove(PROP_OBJECT_TYPE).as_deref(),
        );
        let skills = properties.shift_remove(PROP_SKILLS);
        let mut heading: Facets = properties.into_iter().collect();

        let attributes = doc
            .find_children(element, TAG_OWNED_ATTRIBUTE, &[])
            .into_iter()
            .map(|attribute| self.attribute(attribute, name))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let operations = doc
            .find_children(element, TAG_OWNED_OPERATION, &[])
            .into_iter()
            .map(|operation| self.operation(operation, name))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let controller = self.controller(id, name);
        if !controller.is_empty() {
            heading.push("control", "fsm");
        }

        Ok(ClassModel {
            id: id.to_string(),
            name: name.to_string(),
            is_abstract: doc.flag(element, ATTR_IS_ABSTRACT),
            parent,
            kind,
            skills,
            heading,
            attributes,
            operations,
            controller,
        })
    }

    fn attribute(&self, element: ElementId, owner: &str) -> anyhow::Result<AttributeModel> {
        let doc = self.doc;
        let r#type = types::require_type(doc, self.index, element, owner)?;
        let is_list = types::is_list(doc, element);
        let default_value = types::default_value(doc, element, &r#type, is_list);
        Ok(AttributeModel {
            id: doc.attr(element, ATTR_ID).unwrap_or_default().to_string(),
            name: doc.attr_or_warn(element, ATTR_NAME).unwrap_or_default().to_string(),
            visibility: doc.attr(element, ATTR_VISIBILITY).map(str::to_string),
            is_static: doc.flag(element, ATTR_IS_STATIC),
            r#type,
            is_list,
            default_value,
            heading: doc.extension_properties(element).into_iter().collect(),
        })
    }

    fn operation(&self, element: ElementId, owner: &str) -> anyhow::Result<OperationModel> {
        let doc = self.doc;
        let name = doc.attr_or_warn(element, ATTR_NAME).unwrap_or_default();
        let (returns, parameters): (Vec<_>, Vec<_>) = doc
            .find_children(element, TAG_OWNED_PARAMETER, &[])
            .into_iter()
            .partition(|param| doc.attr(*param, ATTR_DIRECTION) == Some(DIRECTION_RETURN));

        if returns.len() > 1 {
            warn!(
                target: "builder",
                "{} return parameters to operation '{name}' of '{owner}', only the first is used",
                returns.len()
            );
        }
        let (return_type, is_list) = match returns.first() {
            Some(&ret) => {
                let return_type = match types::resolve_type(doc, self.index, ret, owner)? {
                    Some(resolved) => ReturnType::Value(resolved),
                    None => ReturnType::Action,
                };
                (return_type, types::is_list(doc, ret))
            }
            None if name == OperationModel::INIT => (ReturnType::NoReturn, false),
            None => (ReturnType::Action, false),
        };

        let parameters = parameters
            .into_iter()
            .filter_map(|param| doc.attr(param, ATTR_NAME).map(|param_name| (param, param_name)))
            .map(|(param, param_name)| {
                Ok(Parameter {
                    name: param_name.to_string(),
                    r#type: types::require_type(doc, self.index, param, owner)?,
                    is_list: types::is_list(doc, param),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let body = self.bodies.body_for(owner, name).map(str::to_string);
        if body.is_none() && !self.bodies.is_empty() {
            warn!(target: "builder", "missing body to operation '{name}' of '{owner}'");
        }

        Ok(OperationModel {
            id: doc.attr(element, ATTR_ID).unwrap_or_default().to_string(),
            name: name.to_string(),
            return_type,
            is_list,
            parameters,
            body,
            guard: doc.extension_properties(element).shift_remove(PROP_WHEN),
        })
    }

    // States of the behavior package the class depends on, if any.
    fn controller(&self, id: &str, name: &str) -> Vec<ControllerState> {
        let doc = self.doc;
        let mut suppliers = self.dependencies.iter().filter_map(|&dependency| {
            let is_client = doc
                .attr(dependency, ATTR_CLIENT)
                .is_some_and(|clients| clients.split_whitespace().any(|client| client == id));
            let supplier = doc.attr(dependency, ATTR_SUPPLIER)?;
            is_client
                .then(|| self.controllers.get(supplier))
                .flatten()
        });
        let Some(states) = suppliers.next() else {
            return Vec::new();
        };
        if suppliers.next().is_some() {
            warn!(
                target: "builder",
                "class '{name}' depends on many behaviors, only the first is used"
            );
        }
        states.clone()
    }
}
