use anyhow::Context;
use clap::Parser;
use gamlgen_fmt_xmi::gamlgen_core::render;
use gamlgen_fmt_xmi::{Bodies, Document, ModelBuilder, Scopes, skeleton};
use log::{info, warn};
use std::{io::Write, path::PathBuf, time::Instant};

/// A generator of GAML agent-based simulation models from UML class and state diagrams
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path of the model's XMI file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    model: PathBuf,
    /// JSON file holding the bodies of the operations
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    bodies: Option<PathBuf>,
    /// Output file (standard output if missing)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    output: Option<PathBuf>,
    /// Name of the generated model (defaults to the model's file stem)
    #[arg(long)]
    name: Option<String>,
    /// Only generate the classes reachable from the given class
    #[arg(long)]
    root: Option<String>,
    /// Generate the skeleton of the bodies file instead of the GAML model
    #[arg(long, default_value = "false")]
    skeleton: bool,
    /// Package holding the classes of the meta-model
    #[arg(long, default_value = "meta_model")]
    meta_model: String,
    /// Package holding the global class
    #[arg(long, default_value = "global")]
    global: String,
    /// Package holding the experiment class
    #[arg(long, default_value = "experiment")]
    experiment: String,
}

impl Cli {
    pub fn run(&self) -> anyhow::Result<()> {
        let time = Instant::now();
        let doc = Document::load(&self.model)?;
        let bodies = match &self.bodies {
            Some(path) if self.skeleton => {
                warn!("bodies file '{}' ignored when generating a skeleton", path.display());
                Bodies::default()
            }
            Some(path) => Bodies::load(path)?,
            None => Bodies::default(),
        };
        let name = self.model_name();
        let model = ModelBuilder::new(&doc, &bodies)
            .with_scopes(self.scopes())
            .with_root(self.root.clone())
            .build(&name)?;

        let text = if self.skeleton {
            skeleton(&model).to_json()?
        } else {
            render(&model)
        };
        self.write(&text)?;
        info!("model '{name}' generated in {:?}", time.elapsed());
        Ok(())
    }

    fn model_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.model
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("model")
                .to_string()
        })
    }

    fn scopes(&self) -> Scopes {
        Scopes {
            meta_model: self.meta_model.clone(),
            global: self.global.clone(),
            experiment: self.experiment.clone(),
        }
    }

    fn write(&self, text: &str) -> anyhow::Result<()> {
        match &self.output {
            Some(path) => std::fs::write(path, text)
                .with_context(|| format!("failed to write output file '{}'", path.display())),
            None => std::io::stdout()
                .write_all(text.as_bytes())
                .context("failed to write to standard output"),
        }
    }
}
