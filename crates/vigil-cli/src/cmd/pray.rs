use super::{block_on, chat_client, load_config, news_client, open_store};
use crate::output::print_json;
use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use std::path::{Path, PathBuf};
use vigil_core::pipeline::{PipelineRunner, RunOptions};

#[derive(Args)]
pub struct PrayArgs {
    /// Run as if on this day (YYYY-MM-DD); selects the cache day
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Run as if at this local hour (0-23); selects morning or evening
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
    pub hour: Option<u32>,

    /// Run every stage but do not overwrite the prayer record
    #[arg(long)]
    pub dry_run: bool,

    /// Print the enhanced speech markup after the record
    #[arg(long)]
    pub show_markup: bool,

    /// Write the enhanced speech markup to this file
    #[arg(long, value_name = "PATH")]
    pub markup_out: Option<PathBuf>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,
}

pub fn run(root: &Path, args: PrayArgs, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let chat = chat_client(&config, args.openai_api_key)?;
    let news = news_client(&config, args.news_api_key)?;
    let store = open_store(root);

    let opts = RunOptions {
        now: resolve_now(Local::now().naive_local(), args.date, args.hour),
        dry_run: args.dry_run,
    };
    let runner = PipelineRunner::new(&store, &news, &chat, &config);
    let out = block_on(runner.run(&opts))?.context("prayer pipeline failed")?;

    if let Some(path) = &args.markup_out {
        std::fs::write(path, &out.markup.enhanced)
            .with_context(|| format!("failed to write markup to {}", path.display()))?;
    }

    if json {
        if args.show_markup {
            print_json(&out)?;
        } else {
            print_json(&out.record)?;
        }
        return Ok(());
    }

    print_json(&out.record)?;
    if args.show_markup {
        println!();
        println!("--- speech markup ---");
        println!("{}", out.markup.enhanced);
    }
    if out.persisted {
        eprintln!("Prayer record saved ({}).", out.record.time_of_day);
    } else {
        eprintln!("Dry run: prayer record not saved.");
    }
    Ok(())
}

fn resolve_now(now: NaiveDateTime, date: Option<NaiveDate>, hour: Option<u32>) -> NaiveDateTime {
    let day = date.unwrap_or(now.date());
    let time = hour
        .and_then(|h| NaiveTime::from_hms_opt(h, 0, 0))
        .unwrap_or(now.time());
    NaiveDateTime::new(day, time)
}
