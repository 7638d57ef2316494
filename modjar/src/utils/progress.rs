//! Progress bar utilities

use indicatif::{ProgressBar, ProgressStyle};

/// Create a standard progress bar, hidden when `quiet` is set
pub fn create_progress_bar(total: u64, message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("##-"));
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
