//! Logger setup shared by the pipeline stages.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Initializes the global logger wrapped in `indicatif-log-bridge` so
/// that `log::info!` and friends are suspended while progress bars
/// redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added
/// to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    // Build the pretty-env-logger logger manually so we can wrap it.
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}

/// Creates a stage-level progress bar; total is known up front.
#[must_use]
pub fn steps_bar(multi: &MultiProgress, message: &str, total: u64) -> ProgressBar {
    let bar = multi.add(ProgressBar::new(total));
    bar.set_style(
        ProgressStyle::with_template(
            "{msg} {wide_bar:.green/dim} {pos}/{len} [{elapsed_precise}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );
    bar.set_message(message.to_string());
    bar
}
