use std::path::Path;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};

const ROTATE_SIZE: u64 = 5 * 1024 * 1024;
const ROTATE_KEEP: usize = 3;

/// Logs to stderr, or to a rotating file when `log_file` is set. `RUST_LOG` wins over
/// `level`.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> anyhow::Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(level)?;
    let Some(log_file) = log_file else {
        return Ok(logger.log_to_stderr().start()?);
    };
    let directory = log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let basename = log_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("listsync");
    let handle = logger
        .log_to_file(FileSpec::default().directory(directory).basename(basename))
        .rotate(
            Criterion::Size(ROTATE_SIZE),
            Naming::Numbers,
            Cleanup::KeepLogFiles(ROTATE_KEEP),
        )
        .start()?;
    Ok(handle)
}
