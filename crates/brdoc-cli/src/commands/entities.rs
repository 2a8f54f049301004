//! Entities command - list generic entities found in a document.

use std::path::PathBuf;

use clap::Args;

use brdoc_core::DocumentProcessor;

use super::{load_config, process_file};

/// Arguments for the entities command.
#[derive(Args)]
pub struct EntitiesArgs {
    /// Input file (.pdf or .txt)
    #[arg(required = true)]
    input: PathBuf,
}

pub async fn run(args: EntitiesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let processor = DocumentProcessor::new(load_config(config_path)?);
    let result = process_file(&processor, &args.input, None, None)?;

    println!("{}", serde_json::to_string_pretty(&result.entities)?);
    Ok(())
}
