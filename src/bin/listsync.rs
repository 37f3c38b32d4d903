#[path = "listsync/args.rs"]
mod args;
#[path = "listsync/fixture.rs"]
mod fixture;
#[path = "listsync/logging.rs"]
mod logging;
#[path = "listsync/replay.rs"]
mod replay;

use clap::Parser;
use listsync::{
    entities::{Status, User},
    Pagination, SyncConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = args::CliArgs::parse();
    let _logger = logging::init_logging(&args.log_level, args.log_file.as_deref())?;
    let config = SyncConfig::load(args.config.as_deref())?;
    let fixture = fixture::Fixture::read(&args.fixture)?;
    log::debug!("Replaying {:?} fixture from {}", fixture.kind, args.fixture.display());

    match fixture.kind.pagination() {
        Pagination::Bound => replay::run::<Status>(fixture, &config, &args).await,
        Pagination::Cursor => replay::run::<User>(fixture, &config, &args).await,
    }
}
