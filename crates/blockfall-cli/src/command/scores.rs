use std::{
    io::{self, Write},
    path::PathBuf,
};

use blockfall_engine::{KeyValueScoreStore, ScoreStore};
use log::debug;
use serde::Serialize;

use crate::{command::DEFAULT_SCORES_FILE, logging, storage::JsonFileStorage};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ScoresArg {
    /// File the high score and top scores are kept in
    #[clap(long, default_value = DEFAULT_SCORES_FILE)]
    scores_file: PathBuf,
    /// Print as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ScoresReport {
    high_score: u64,
    top_scores: Vec<u64>,
}

impl ScoresReport {
    fn load(store: &impl ScoreStore) -> Self {
        Self {
            high_score: store.high_score(),
            top_scores: store.top_scores(),
        }
    }

    fn write_text(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "HIGH SCORE {:>8}", self.high_score)?;
        if self.top_scores.is_empty() {
            writeln!(out, "no scores yet")?;
            return Ok(());
        }
        for (rank, score) in self.top_scores.iter().enumerate() {
            writeln!(out, "{:>2}. {score:>14}", rank + 1)?;
        }
        Ok(())
    }
}

pub(crate) fn run(arg: &ScoresArg) -> anyhow::Result<()> {
    let ScoresArg { scores_file, json } = arg;

    logging::init_to_stderr()?;
    let storage = JsonFileStorage::new(scores_file);
    debug!("reading scores from {}", storage.path().display());
    let report = ScoresReport::load(&KeyValueScoreStore::new(storage));

    let mut out = io::stdout().lock();
    if *json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        report.write_text(&mut out)?;
    }
    Ok(())
}
