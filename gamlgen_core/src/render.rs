//! Rendering of a [`GamlModel`] into GAML source text.
//!
//! The output only depends on the order of the IR,
//! so rendering the same model twice yields the same text.

use crate::*;
use log::trace;

const INDENT: &str = "    ";

/// Renders a complete model.
///
/// ```
/// # use gamlgen_core::{GamlModel, render};
/// let model = GamlModel {
///     name: "empty".to_string(),
///     global: None,
///     experiment: None,
///     classes: Vec::new(),
/// };
/// assert_eq!(render(&model), "model empty\n");
/// ```
pub fn render(model: &GamlModel) -> String {
    let mut printer = Printer::default();
    printer.line(format!("model {}", model.name));
    if let Some(global) = &model.global {
        trace!(target: "render", "rendering global block");
        printer.blank();
        printer.global(global);
    }
    if let Some(experiment) = &model.experiment {
        trace!(target: "render", "rendering experiment '{}'", experiment.class.name);
        printer.blank();
        printer.experiment(experiment);
    }
    for class in &model.classes {
        trace!(target: "render", "rendering class '{}'", class.name);
        printer.blank();
        printer.class(class);
    }
    printer.out
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, header: impl AsRef<str>) {
        self.line(format!("{} {{", header.as_ref()));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    // Bodies are opaque: only the first line is indented, the text is copied as is.
    fn body(&mut self, body: Option<&str>) {
        if let Some(body) = body
            .map(|body| body.trim_end_matches(['\n', '\r']))
            .filter(|body| !body.is_empty())
        {
            self.line(body);
        }
    }

    fn global(&mut self, global: &GlobalModel) {
        self.open("global");
        self.attributes(&global.class.attributes);
        if !global.init.is_empty() {
            self.open("init");
            for entry in &global.init {
                match entry {
                    InitEntry::Create(instance) => self.instance(instance),
                    InitEntry::Body(body) => self.body(Some(body)),
                }
            }
            self.close();
        }
        for operation in global.class.operations.iter().filter(|op| !op.is_init()) {
            self.operation(operation);
        }
        self.close();
    }

    fn experiment(&mut self, experiment: &ExperimentModel) {
        let class = &experiment.class;
        // Only the `type` facet is carried on the experiment header.
        let header = match class.heading.get("type") {
            Some(kind) => format!("experiment {} type: {kind}", class.name),
            None => format!("experiment {}", class.name),
        };
        self.open(header);
        self.attributes(&class.attributes);
        if !class.operations.is_empty() {
            self.open("output");
            for operation in &class.operations {
                let header = match operation.return_type.name() {
                    Some(ret) => format!("{ret} {}", operation.name),
                    None => operation.name.clone(),
                };
                self.open(header);
                self.body(operation.body.as_deref());
                self.close();
            }
            self.close();
        }
        self.close();
    }

    fn class(&mut self, class: &ClassModel) {
        let mut header = format!("{} {}", class.kind.keyword(), class.name);
        if let Some(parent) = &class.parent {
            header.push_str(&format!(" parent: {}", parent.name));
        }
        if !class.heading.is_empty() {
            header.push(' ');
            header.push_str(&class.heading.to_string());
        }
        if let Some(skills) = &class.skills {
            header.push_str(&format!(" skills: [{skills}]"));
        }
        self.open(header);
        self.attributes(&class.attributes);
        for operation in &class.operations {
            self.operation(operation);
        }
        for state in &class.controller {
            self.state(state);
        }
        self.close();
    }

    fn attributes(&mut self, attributes: &[AttributeModel]) {
        for attribute in attributes.iter().filter(|attr| !attr.is_static) {
            self.attribute(attribute);
        }
    }

    fn attribute(&mut self, attribute: &AttributeModel) {
        let mut text = if attribute.is_list {
            format!("list<{}> {}", attribute.r#type.name(), attribute.name)
        } else {
            format!("{} {}", attribute.r#type.name(), attribute.name)
        };
        match &attribute.default_value {
            DefaultValue::Absent => {}
            DefaultValue::Scalar(value) => text.push_str(&format!(" <- {value}")),
            DefaultValue::List(values) if values.is_empty() => {}
            DefaultValue::List(values) => {
                text.push_str(&format!(" <- [{}]", values.join(", ")))
            }
        }
        if !attribute.heading.is_empty() {
            text.push(' ');
            text.push_str(&attribute.heading.to_string());
        }
        text.push(';');
        self.line(text);
    }

    fn operation(&mut self, operation: &OperationModel) {
        if operation.is_init() {
            self.open(OperationModel::INIT);
        } else {
            let ret = operation.return_type.name().unwrap_or(ReturnType::ACTION);
            let mut header = if operation.is_list {
                format!("list<{ret}> {}", operation.name)
            } else {
                format!("{ret} {}", operation.name)
            };
            if !operation.parameters.is_empty() {
                let params = operation
                    .parameters
                    .iter()
                    .map(|param| format!("{} {}", param.type_string(), param.name))
                    .collect::<Vec<_>>()
                    .join(", ");
                header.push_str(&format!("({params})"));
            }
            if let Some(guard) = &operation.guard {
                header.push_str(&format!(" when: {guard}"));
            }
            self.open(header);
        }
        self.body(operation.body.as_deref());
        self.close();
    }

    fn state(&mut self, state: &ControllerState) {
        let mut header = format!("state {}", state.name);
        if state.initial {
            header.push_str(" initial: true");
        } else if state.r#final {
            header.push_str(" final: true");
        }
        self.open(header);
        for action in &state.actions {
            self.line(format!("do {action}();"));
        }
        for transition in &state.transitions {
            let header = format!(
                "transition to: {} when: {}",
                transition.target, transition.condition
            );
            if transition.actions.is_empty() {
                self.line(format!("{header};"));
            } else {
                self.open(header);
                for action in &transition.actions {
                    self.line(format!("do {action}();"));
                }
                self.close();
            }
        }
        self.close();
    }

    fn instance(&mut self, instance: &InstanceRecord) {
        let mut header = format!("create {}", instance.class_name);
        if !instance.heading.is_empty() {
            header.push(' ');
            header.push_str(&instance.heading.to_string());
        }
        if instance.attributes.is_empty() {
            self.line(format!("{header};"));
        } else {
            self.open(header);
            for (name, value) in &instance.attributes {
                self.line(format!("{name} <- {value};"));
            }
            self.close();
        }
    }
}
