use super::open_store;
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{Days, Local, NaiveDate};
use clap::Subcommand;
use std::path::Path;
use vigil_core::cache;
use vigil_core::store::Store;

#[derive(Subcommand)]
pub enum CacheSubcommand {
    /// List cached headline payloads
    List {
        /// Only entries for this day (YYYY-MM-DD)
        #[arg(long)]
        day: Option<NaiveDate>,
    },

    /// Delete cached payloads older than N days
    Prune {
        #[arg(long, default_value = "7")]
        keep_days: u32,
    },
}

pub fn run(root: &Path, subcmd: CacheSubcommand, json: bool) -> anyhow::Result<()> {
    let store = open_store(root);
    match subcmd {
        CacheSubcommand::List { day } => list(&store, day, json),
        CacheSubcommand::Prune { keep_days } => prune(&store, keep_days, json),
    }
}

fn list(store: &dyn Store, day: Option<NaiveDate>, json: bool) -> anyhow::Result<()> {
    let keys = cache::list_entries(store, day).context("failed to list cache")?;
    if json {
        return print_json(&serde_json::json!({ "entries": keys }));
    }
    if keys.is_empty() {
        println!("No cached payloads.");
        return Ok(());
    }
    let rows = keys
        .iter()
        .map(|k| {
            let mut parts = k.splitn(4, '/').skip(1);
            let day = parts.next().unwrap_or_default().to_string();
            let endpoint = parts.next().unwrap_or_default().to_string();
            let file = parts.next().unwrap_or_default().to_string();
            vec![day, endpoint, file]
        })
        .collect();
    print_table(&["DAY", "ENDPOINT", "ENTRY"], rows);
    Ok(())
}

fn prune(store: &dyn Store, keep_days: u32, json: bool) -> anyhow::Result<()> {
    let cutoff = prune_cutoff(Local::now().date_naive(), keep_days)?;
    let removed = cache::prune_before(store, cutoff).context("failed to prune cache")?;
    if json {
        print_json(&serde_json::json!({ "removed": removed, "cutoff": cutoff }))?;
    } else {
        println!("Removed {removed} cached payload(s) older than {cutoff}.");
    }
    Ok(())
}

fn prune_cutoff(today: NaiveDate, keep_days: u32) -> anyhow::Result<NaiveDate> {
    today
        .checked_sub_days(Days::new(keep_days.into()))
        .ok_or_else(|| anyhow::anyhow!("--keep-days {keep_days} reaches before the earliest date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_counts_back_from_today() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(
            prune_cutoff(today, 7).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
        );
        assert_eq!(prune_cutoff(today, 0).unwrap(), today);
    }

    #[test]
    fn oversized_keep_days_is_an_error() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let err = prune_cutoff(today, u32::MAX).unwrap_err();
        assert!(err.to_string().contains("--keep-days"));
    }
}
