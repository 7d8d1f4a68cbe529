use gamlgen_fmt_xmi::gamlgen_core::*;
use gamlgen_fmt_xmi::*;
use std::path::{Path, PathBuf};

const PREY_PREDATOR: &str = "./tests/assets/prey_predator.xmi";
const PREY_PREDATOR_BODIES: &str = "./tests/assets/prey_predator.json";

fn prey_predator() -> anyhow::Result<GamlModel> {
    let bodies = Bodies::load(Path::new(PREY_PREDATOR_BODIES))?;
    load(Path::new(PREY_PREDATOR), &bodies, Scopes::default())
}

fn build_error(file: &str) -> BuildError {
    load(&PathBuf::from(file), &Bodies::default(), Scopes::default())
        .expect_err("model must be rejected")
        .downcast::<BuildError>()
        .expect("build error")
}

fn class<'a>(model: &'a GamlModel, name: &str) -> &'a ClassModel {
    model
        .classes
        .iter()
        .find(|class| class.name == name)
        .expect("class exists")
}

#[test]
fn classes() -> anyhow::Result<()> {
    let model = prey_predator()?;
    assert_eq!(model.name, "prey_predator");
    let names: Vec<_> = model.classes.iter().map(|class| class.name.as_str()).collect();
    assert_eq!(names, ["Animal", "Prey", "Predator", "VegetationCell"]);

    let animal = class(&model, "Animal");
    assert_eq!(animal.parent.as_ref().map(|parent| parent.name.as_str()), Some("Living"));
    assert_eq!(animal.skills.as_deref(), Some("moving"));
    assert!(animal.heading.is_empty());
    let cell = animal.attribute("my_cell").expect("my_cell");
    assert_eq!(cell.r#type.name(), "VegetationCell");
    assert_eq!(animal.attribute("gender").map(|attr| attr.r#type.name()), Some("int"));

    let grid = class(&model, "VegetationCell");
    assert_eq!(grid.kind, ClassKind::Grid);
    assert_eq!(grid.heading.to_string(), "width: 50 height: 50");
    let neighbors = grid.attribute("neighbors").expect("neighbors");
    assert!(neighbors.is_list);
    assert_eq!(neighbors.default_value, DefaultValue::List(Vec::new()));
    assert_eq!(
        grid.attribute("food").map(|attr| &attr.default_value),
        Some(&DefaultValue::Scalar("1.5".to_string()))
    );
    Ok(())
}

#[test]
fn inherited_attributes_stay_with_their_owner() -> anyhow::Result<()> {
    let model = prey_predator()?;
    let prey = class(&model, "Prey");
    let own: Vec<_> = prey.attributes.iter().map(|attr| attr.name.as_str()).collect();
    assert_eq!(own, ["speed"]);
    assert_eq!(prey.parent.as_ref().map(|parent| parent.name.as_str()), Some("Animal"));

    let doc = Document::load(Path::new(PREY_PREDATOR))?;
    let meta_model = doc
        .find_one(doc.root(), parser::TAG_PACKAGED_ELEMENT, &[(parser::ATTR_NAME, "meta_model")])
        .expect("meta_model package");
    let diagram = ClassDiagram::build(&doc, meta_model, &Bodies::default())?;
    let flattened: Vec<_> = diagram
        .flattened_attributes("prey")
        .into_iter()
        .map(|attr| attr.name.as_str())
        .collect();
    assert_eq!(flattened, ["speed", "age", "gender", "my_cell", "population", "energy"]);
    Ok(())
}

#[test]
fn operations() -> anyhow::Result<()> {
    let model = prey_predator()?;
    let animal = class(&model, "Animal");
    let basic_move = animal.operation("basic_move").expect("basic_move");
    assert_eq!(basic_move.return_type, ReturnType::Action);
    assert_eq!(basic_move.guard.as_deref(), Some("energy > 0"));
    assert_eq!(basic_move.body.as_deref(), Some("do wander;"));
    assert_eq!(animal.operation("init").map(|op| &op.return_type), Some(&ReturnType::NoReturn));

    let hunt = class(&model, "Predator").operation("hunt").expect("hunt");
    assert_eq!(hunt.return_type.name(), Some("Prey"));
    let params: Vec<_> = hunt.parameters.iter().map(Parameter::type_string).collect();
    assert_eq!(params, ["list<Prey>"]);

    let experiment = model.experiment.as_ref().expect("experiment");
    let display = experiment.class.operation("main_display").expect("main_display");
    assert_eq!(display.return_type, ReturnType::Action);
    Ok(())
}

#[test]
fn controller() -> anyhow::Result<()> {
    let model = prey_predator()?;
    let prey = class(&model, "Prey");
    assert_eq!(prey.heading.get("control"), Some("fsm"));
    let states: Vec<_> = prey.controller.iter().map(|state| state.name.as_str()).collect();
    assert_eq!(states, ["EntryPoint", "grazing", "fleeing", "FinalPoint"]);
    let grazing = &prey.controller[1];
    assert_eq!(grazing.actions, ["eat"]);
    let targets: Vec<_> = grazing
        .transitions
        .iter()
        .map(|transition| (transition.target.as_str(), transition.condition.as_str()))
        .collect();
    assert_eq!(
        targets,
        [
            ("fleeing", "!empty(Predator at_distance 5)"),
            ("FinalPoint", "energy <= 0"),
        ]
    );
    assert_eq!(grazing.transitions[0].actions, ["basic_move"]);
    assert!(!class(&model, "Predator").has_controller());
    Ok(())
}

#[test]
fn global_and_instances() -> anyhow::Result<()> {
    let model = prey_predator()?;
    let global = model.global.as_ref().expect("global");
    assert_eq!(global.class.name, "World");
    let [
        InitEntry::Create(rabbits),
        InitEntry::Create(wolves),
        InitEntry::Body(body),
    ] = global.init.as_slice()
    else {
        panic!("unexpected init entries: {:?}", global.init);
    };
    assert_eq!(rabbits.class_name, "Prey");
    assert_eq!(rabbits.priority, Some(1.0));
    assert_eq!(rabbits.attributes.get("speed").map(String::as_str), Some("2.5"));
    assert_eq!(rabbits.attributes.get("age").map(String::as_str), Some("rnd(3)"));
    assert_eq!(rabbits.heading.to_string(), "number: 50");
    assert_eq!(wolves.class_name, "Predator");
    assert_eq!(wolves.priority, None);
    // Attribute declared on an abstract grandparent.
    assert_eq!(wolves.attributes.get("energy").map(String::as_str), Some("20.0"));
    assert_eq!(body, "write \"start\";");
    Ok(())
}

#[test]
fn idempotence() -> anyhow::Result<()> {
    let first = prey_predator()?;
    let second = prey_predator()?;
    assert_eq!(first, second);
    assert_eq!(render(&first), render(&second));
    Ok(())
}

#[test]
fn rendering() -> anyhow::Result<()> {
    let text = render(&prey_predator()?);
    assert!(text.starts_with("model prey_predator\n\nglobal {\n    int steps <- 100;\n"));
    assert!(text.contains(
        "    init {\n        create Prey number: 50 {\n            speed <- 2.5;\n"
    ));
    assert!(text.contains("        create Predator number: 5 {\n"));
    assert!(text.contains("    action stop_simulation when: cycle = steps {\n        do pause;\n"));
    assert!(text.contains(
        "experiment Simulation type: gui {\n    output {\n        action main_display {\n"
    ));
    assert!(text.contains("species Animal parent: Living skills: [moving] {\n"));
    assert!(!text.contains("float energy"));
    assert!(!text.contains("population"));
    assert!(text.contains(
        "species Prey parent: Animal control: fsm {\n    float speed min: 0.0;\n"
    ));
    assert!(text.contains("    Prey hunt(list<Prey> targets) {\n"));
    assert!(text.contains("grid VegetationCell width: 50 height: 50 {\n"));
    assert!(text.contains("    list<VegetationCell> neighbors;\n"));
    assert!(text.contains(concat!(
        "        transition to: fleeing when: !empty(Predator at_distance 5) {\n",
        "            do basic_move();\n"
    )));
    Ok(())
}

#[test]
fn skeleton_lists_every_operation() -> anyhow::Result<()> {
    let model = load(Path::new(PREY_PREDATOR), &Bodies::default(), Scopes::default())?;
    assert!(model.classes.iter().flat_map(|class| &class.operations).all(|op| op.body.is_none()));
    let skeleton = skeleton(&model);
    assert_eq!(skeleton.body_for("Predator", "hunt"), Some(""));
    assert_eq!(skeleton.body_for("World", "stop_simulation"), Some(""));
    assert_eq!(skeleton.body_for("Simulation", "main_display"), Some(""));
    assert_eq!(skeleton.body_for("Living", "init"), None);
    let json = skeleton.to_json()?;
    assert!(json.find("\"Animal\"") < json.find("\"World\""));
    Ok(())
}

#[test]
fn rooted() -> anyhow::Result<()> {
    let doc = Document::load(Path::new(PREY_PREDATOR))?;
    let model = ModelBuilder::new(&doc, &Bodies::default())
        .with_root(Some("Prey".to_string()))
        .build("rooted")?;
    let names: Vec<_> = model.classes.iter().map(|class| class.name.as_str()).collect();
    // The parent and the grid type of an inherited attribute come along.
    assert_eq!(names, ["Animal", "VegetationCell", "Prey"]);
    let text = render(&model);
    assert!(text.contains("species Prey parent: Animal"));
    assert!(text.contains("species Animal parent: Living"));
    assert!(text.contains("grid VegetationCell"));
    assert!(!text.contains("species Predator"));
    let model = ModelBuilder::new(&doc, &Bodies::default())
        .with_root(Some("Predator".to_string()))
        .build("rooted")?;
    let names: Vec<_> = model.classes.iter().map(|class| class.name.as_str()).collect();
    assert_eq!(names, ["Animal", "VegetationCell", "Predator"]);
    let err = ModelBuilder::new(&doc, &Bodies::default())
        .with_root(Some("Unicorn".to_string()))
        .build("rooted")
        .expect_err("unknown root");
    assert_eq!(
        err.downcast_ref::<BuildError>(),
        Some(&BuildError::UnknownClass("Unicorn".to_string()))
    );
    Ok(())
}

#[test]
fn custom_scopes() -> anyhow::Result<()> {
    let scopes = Scopes {
        meta_model: "population".to_string(),
        global: "nowhere".to_string(),
        experiment: "experiment".to_string(),
    };
    let model = load(Path::new(PREY_PREDATOR), &Bodies::default(), scopes)?;
    assert!(model.classes.is_empty());
    assert!(model.global.is_none());
    assert!(model.experiment.is_some());
    Ok(())
}

#[test]
fn duplicate_global() {
    assert_eq!(
        build_error("./tests/assets/duplicate_global.xmi"),
        BuildError::DuplicateScope("global".to_string())
    );
}

#[test]
fn multiple_inheritance() {
    assert_eq!(
        build_error("./tests/assets/multiple_inheritance.xmi"),
        BuildError::MultipleInheritance("Pegasus".to_string())
    );
}

#[test]
fn unknown_primitive() {
    assert_eq!(
        build_error("./tests/assets/unknown_type.xmi"),
        BuildError::UnknownType {
            type_name: "Date".to_string(),
            member: "birth".to_string(),
            owner: "Person".to_string(),
        }
    );
}

#[test]
fn unbalanced_document() {
    let err = load(
        Path::new("./tests/assets/unbalanced.xmi"),
        &Bodies::default(),
        Scopes::default(),
    )
    .expect_err("malformed document");
    assert!(matches!(
        err.downcast_ref::<ParserError>(),
        Some(ParserError::UnexpectedEndTag(tag)) if tag == "xmi:XMI"
    ));
}
