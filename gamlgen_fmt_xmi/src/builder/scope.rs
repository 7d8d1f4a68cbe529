//! Assembly of the global and experiment blocks.

use super::{BuildError, ClassDiagram, instance};
use crate::bodies::BodyLookup;
use crate::parser::*;
use anyhow::bail;
use gamlgen_core::{ClassModel, ExperimentModel, GlobalModel, InitEntry, OperationModel};
use log::{error, info};

/// Builds the global block from its package, creating the instances of the meta-model classes.
pub(super) fn global(
    doc: &Document,
    package: Option<ElementId>,
    scope: &str,
    meta_model: &ClassDiagram,
    bodies: &dyn BodyLookup,
) -> anyhow::Result<Option<GlobalModel>> {
    let Some(class) = singleton(doc, package, scope, bodies)? else {
        return Ok(None);
    };
    let mut init: Vec<_> = instance::instances(doc, meta_model)?
        .into_iter()
        .map(InitEntry::Create)
        .collect();
    // The global's own init body comes after the creations.
    if let Some(body) = class
        .operation(OperationModel::INIT)
        .and_then(|operation| operation.body.clone())
    {
        init.push(InitEntry::Body(body));
    }
    Ok(Some(GlobalModel { class, init }))
}

/// Builds the experiment block from its package.
pub(super) fn experiment(
    doc: &Document,
    package: Option<ElementId>,
    scope: &str,
    bodies: &dyn BodyLookup,
) -> anyhow::Result<Option<ExperimentModel>> {
    Ok(singleton(doc, package, scope, bodies)?.map(|class| ExperimentModel { class }))
}

// The only emitted class of a scope package, if any.
fn singleton(
    doc: &Document,
    package: Option<ElementId>,
    scope: &str,
    bodies: &dyn BodyLookup,
) -> anyhow::Result<Option<ClassModel>> {
    let Some(package) = package else {
        info!(target: "builder", "no '{scope}' package");
        return Ok(None);
    };
    let mut classes = ClassDiagram::build(doc, package, bodies)?.into_emitted();
    if classes.len() > 1 {
        error!(target: "builder", "{} classes in '{scope}' package", classes.len());
        bail!(BuildError::SingletonScope {
            scope: scope.to_string(),
            count: classes.len(),
        });
    }
    Ok(classes.pop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::Bodies;

    const MODEL: &str = r#"<xmi:XMI xmlns:xmi="http://www.omg.org/XMI" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <packagedElement xsi:type="uml:Package" xmi:id="meta" name="meta_model">
    <packagedElement xsi:type="uml:Class" xmi:id="prey" name="Prey"/>
  </packagedElement>
  <packagedElement xsi:type="uml:Package" xmi:id="glob" name="global">
    <packagedElement xsi:type="uml:Class" xmi:id="world" name="World">
      <ownedOperation xmi:id="o1" name="init"/>
      <ownedOperation xmi:id="o2" name="tick"/>
    </packagedElement>
  </packagedElement>
  <packagedElement xsi:type="uml:Package" xmi:id="exp" name="experiment">
    <packagedElement xsi:type="uml:Class" xmi:id="sim" name="Simulation"/>
    <packagedElement xsi:type="uml:Class" xmi:id="base" name="Base" isAbstract="true"/>
  </packagedElement>
  <packagedElement xsi:type="uml:InstanceSpecification" xmi:id="i1" classifier="prey"/>
  <packagedElement xsi:type="uml:InstanceSpecification" xmi:id="i2" classifier="prey">
    <xmi:Extension><details key="priority" value="1"/></xmi:Extension>
  </packagedElement>
</xmi:XMI>"#;

    fn package(doc: &Document, name: &str) -> Option<ElementId> {
        doc.find_one(doc.root(), TAG_PACKAGED_ELEMENT, &[(ATTR_NAME, name)])
    }

    #[test]
    fn global_init_order() -> anyhow::Result<()> {
        let doc: Document = MODEL.parse()?;
        let mut bodies = Bodies::default();
        bodies.insert("World", "init", "write \"ready\";");
        let meta_model =
            ClassDiagram::build(&doc, package(&doc, "meta_model").expect("meta"), &bodies)?;
        let block = global(&doc, package(&doc, "global"), "global", &meta_model, &bodies)?
            .expect("global block");
        assert_eq!(block.class.name, "World");
        assert!(matches!(
            block.init.as_slice(),
            [
                InitEntry::Create(first),
                InitEntry::Create(second),
                InitEntry::Body(body),
            ] if first.priority == Some(1.0)
                && second.priority.is_none()
                && body == "write \"ready\";"
        ));
        Ok(())
    }

    #[test]
    fn optional_scopes() -> anyhow::Result<()> {
        let doc: Document = MODEL.parse()?;
        let bodies = Bodies::default();
        let block = experiment(&doc, package(&doc, "experiment"), "experiment", &bodies)?
            .expect("abstract classes do not count");
        assert_eq!(block.class.name, "Simulation");
        assert_eq!(experiment(&doc, None, "experiment", &bodies)?, None);
        let meta_model = ClassDiagram::default();
        assert_eq!(global(&doc, None, "global", &meta_model, &bodies)?, None);
        Ok(())
    }

    #[test]
    fn singleton_scope() -> anyhow::Result<()> {
        let doc: Document = MODEL.replace(r#"isAbstract="true""#, "").parse()?;
        let err = experiment(&doc, package(&doc, "experiment"), "experiment", &Bodies::default())
            .expect_err("two classes");
        assert_eq!(
            err.downcast_ref::<BuildError>(),
            Some(&BuildError::SingletonScope {
                scope: "experiment".to_string(),
                count: 2,
            })
        );
        Ok(())
    }
}
