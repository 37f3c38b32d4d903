use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "listsync",
    about = "Replays a list fixture through the pagination engine"
)]
pub struct CliArgs {
    /// JSON or YAML fixture with `kind` and `items`
    #[arg(long, short = 'f')]
    pub fixture: PathBuf,
    /// Pages to load when the fixture has no event script
    #[arg(long, short = 'n', default_value_t = 3)]
    pub pages: usize,
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    /// Simulated latency per fetch
    #[arg(long, default_value_t = 0)]
    pub latency_ms: u64,
    #[arg(long, default_value = "warn")]
    pub log_level: String,
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
