use super::open_store;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use vigil_core::record::{MetadataRecord, PrayerRecord, TimeOfDay};

#[derive(Subcommand)]
pub enum ShowSubcommand {
    /// Print the current prayer record
    Prayer,

    /// Print the metadata record for one slot
    Metadata {
        /// Slot: morning or evening
        #[arg(long)]
        slot: TimeOfDay,
    },
}

pub fn run(root: &Path, subcmd: ShowSubcommand, json: bool) -> anyhow::Result<()> {
    let store = open_store(root);
    match subcmd {
        ShowSubcommand::Prayer => {
            let record =
                PrayerRecord::load_required(&store).context("failed to load prayer record")?;
            if json {
                print_json(&record)?;
            } else {
                println!("Time of day: {}", record.time_of_day);
                println!("Headlines:");
                for h in &record.headlines_used {
                    println!("  - {h}");
                }
                println!();
                println!("{}", record.prayer_text);
            }
        }
        ShowSubcommand::Metadata { slot } => {
            let record = MetadataRecord::load(&store, slot)
                .context("failed to load metadata record")?
                .ok_or_else(|| anyhow::anyhow!("no {slot} metadata record yet"))?;
            if json {
                print_json(&record)?;
            } else {
                println!("Title: {}", record.title);
                println!("Slot:  {}", record.time_of_day);
                println!();
                println!("{}", record.description);
            }
        }
    }
    Ok(())
}
