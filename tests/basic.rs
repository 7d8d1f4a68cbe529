use clap::Parser;
use gamlgen::Cli;
use gamlgen::gamlgen_fmt_xmi::{Bodies, BodyLookup, BuildError};
use std::fs;

const MODEL: &str = "./gamlgen_fmt_xmi/tests/assets/prey_predator.xmi";
const BODIES: &str = "./gamlgen_fmt_xmi/tests/assets/prey_predator.json";

fn run(args: &[&str]) -> anyhow::Result<()> {
    let cli = Cli::try_parse_from(["gamlgen"].iter().chain(args))?;
    cli.run()
}

#[test]
fn generate_model() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("prey_predator.gaml");
    let output_arg = output.to_str().expect("utf-8 path");
    run(&[MODEL, "--bodies", BODIES, "--output", output_arg])?;
    let text = fs::read_to_string(&output)?;
    assert!(text.starts_with("model prey_predator\n"));
    assert!(text.contains("species Prey parent: Animal control: fsm {"));
    assert!(text.contains("energy <- energy + amount;"));
    Ok(())
}

#[test]
fn model_name_and_root() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("out.gaml");
    let output_arg = output.to_str().expect("utf-8 path");
    run(&[MODEL, "-o", output_arg, "--name", "wolves", "--root", "Predator"])?;
    let text = fs::read_to_string(&output)?;
    assert!(text.starts_with("model wolves\n"));
    assert!(text.contains("species Animal parent: Living"));
    assert!(text.contains("species Predator parent: Animal"));
    assert!(!text.contains("species Prey"));
    Ok(())
}

#[test]
fn generate_skeleton() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("bodies.json");
    let output_arg = output.to_str().expect("utf-8 path");
    run(&[MODEL, "--skeleton", "-b", BODIES, "-o", output_arg])?;
    let skeleton = Bodies::load(&output)?;
    assert_eq!(skeleton.body_for("Prey", "eat"), Some(""));
    assert_eq!(skeleton.body_for("World", "init"), Some(""));
    Ok(())
}

#[test]
fn rejected_model_writes_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("out.gaml");
    let output_arg = output.to_str().expect("utf-8 path");
    let err = run(&[
        "./gamlgen_fmt_xmi/tests/assets/duplicate_global.xmi",
        "-o",
        output_arg,
    ])
    .expect_err("duplicate global");
    assert_eq!(
        err.downcast_ref::<BuildError>(),
        Some(&BuildError::DuplicateScope("global".to_string()))
    );
    assert!(!output.exists());
    Ok(())
}

#[test]
fn missing_model() {
    assert!(run(&["./no/such/model.xmi"]).is_err());
}
