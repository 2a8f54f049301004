//! Models command - inspect the document model catalog.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use brdoc_core::catalog::PeriodPolicy;
use brdoc_core::{DocumentProcessor, ModelRegistry};

use super::{load_config, process_file};

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// List available document models
    List {
        /// Only models of this category, e.g. "Contracheque"
        #[arg(long)]
        category: Option<String>,
    },

    /// Show details of one model
    Show {
        /// Model name
        name: String,
    },

    /// Score every model against a document
    Detect {
        /// Input file (.pdf or .txt)
        input: PathBuf,
    },
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::List { category } => list_models(category.as_deref()),
        ModelsCommand::Show { name } => show_model(&name),
        ModelsCommand::Detect { input } => detect_models(&input, config_path),
    }
}

fn list_models(category: Option<&str>) -> anyhow::Result<()> {
    let registry = ModelRegistry::builtin();
    let mut shown = 0;

    for (name, models) in registry.categories() {
        if category.is_some_and(|c| !c.eq_ignore_ascii_case(name)) {
            continue;
        }

        println!("{}", style(name).bold().cyan());
        for model in models {
            println!(
                "  {}  {}",
                model.name(),
                style(model.descriptor().description).dim()
            );
            shown += 1;
        }
        println!();
    }

    if shown == 0 {
        anyhow::bail!("No models in category: {}", category.unwrap_or_default());
    }
    Ok(())
}

fn show_model(name: &str) -> anyhow::Result<()> {
    let registry = ModelRegistry::builtin();
    let model = registry.resolve(name)?;
    let descriptor = model.descriptor();

    let period = match descriptor.period {
        PeriodPolicy::DocumentField(field) => format!("por documento (campo {})", field),
        PeriodPolicy::PerRow(field) => format!("por linha (campo {})", field),
        PeriodPolicy::PerPage => "por página".to_string(),
    };

    println!("{}", style(descriptor.name).bold());
    println!("  Categoria:  {}", descriptor.category);
    println!("  Variante:   {}", descriptor.variant);
    println!("  Descrição:  {}", descriptor.description);
    println!("  Ícone:      {}", descriptor.icon);
    println!("  Período:    {}", period);
    println!(
        "  Limpeza:    {}",
        if descriptor.requires_cleaning { "sim" } else { "não" }
    );

    Ok(())
}

fn detect_models(input: &std::path::Path, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let min_score = config.detection.min_score;
    let processor = DocumentProcessor::new(config);

    let result = process_file(&processor, input, None, None)?;
    let mut scores = processor.registry().scores(&result.text);
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (name, score) in scores.iter().filter(|(_, s)| *s > 0.0) {
        let line = format!("{:>5.1}%  {}", score * 100.0, name);
        if *score > min_score {
            println!("{}", style(line).green());
        } else {
            println!("{}", line);
        }
    }

    match result.model {
        Some(model) => println!("\n{} Selected: {}", style("✓").green(), model),
        None => println!(
            "\n{} No model above {:.0}%; a generic table would be inferred",
            style("ℹ").blue(),
            min_score * 100.0
        ),
    }
    Ok(())
}
