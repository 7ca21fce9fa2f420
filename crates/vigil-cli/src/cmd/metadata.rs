use super::{block_on, chat_client, load_config, open_store};
use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use std::path::Path;
use vigil_core::metadata::MetadataGenerator;

#[derive(Args)]
pub struct MetadataArgs {
    /// Generate and print the record without overwriting the slot
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,
}

pub fn run(root: &Path, args: MetadataArgs, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let chat = chat_client(&config, args.openai_api_key)?;
    let store = open_store(root);

    let generator =
        MetadataGenerator::new(&store, &chat, &config.stages.metadata, &config.metadata);
    let record = block_on(generator.generate(args.dry_run))?
        .context("metadata generation failed")?;

    print_json(&record)?;
    if !json {
        if args.dry_run {
            eprintln!("Dry run: {} metadata not saved.", record.time_of_day);
        } else {
            eprintln!("Metadata saved to the {} slot.", record.time_of_day);
        }
    }
    Ok(())
}
