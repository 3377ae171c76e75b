use std::path::PathBuf;

use blockfall_engine::{GameController, KeyValueScoreStore, PieceGenerator};
use log::info;

use crate::{command::DEFAULT_SCORES_FILE, logging, storage::JsonFileStorage, tui::Tui};

use self::app::PlayApp;

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// File the high score and top scores are kept in
    #[clap(long, default_value = DEFAULT_SCORES_FILE)]
    scores_file: PathBuf,
    /// Seed for the piece sequence (random when omitted)
    #[clap(long)]
    seed: Option<u64>,
    /// Write log records to this file while playing
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            scores_file: PathBuf::from(DEFAULT_SCORES_FILE),
            seed: None,
            log_file: None,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        scores_file,
        seed,
        log_file,
    } = arg;

    if let Some(log_file) = log_file {
        logging::init_to_file(log_file)?;
    }

    let storage = JsonFileStorage::new(scores_file);
    info!("scores file: {}", storage.path().display());
    let generator = seed.map_or_else(PieceGenerator::new, PieceGenerator::from_seed);
    let controller = GameController::with_generator(KeyValueScoreStore::new(storage), generator);
    controller.load_scores();

    let mut app = PlayApp::new(controller);
    let result = Tui::new().run(&mut app);

    let controller = app.into_controller();
    let final_stats = controller.stats();
    info!(
        "session ended in phase {}: score {}, level {}",
        controller.phase(),
        final_stats.score(),
        final_stats.level()
    );
    controller.wait_for_persistence();
    result
}
