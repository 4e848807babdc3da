use std::path::{
    Path,
    PathBuf,
};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use log::LevelFilter;

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    #[arg(
        long,
        global = true,
        default_value_t = 1,
        help = "Number of threads used by parallel scans."
    )]
    pub threads:  usize,
    #[arg(
        short,
        long,
        global = true,
        default_value_t = false,
        help = "Verbose output."
    )]
    pub verbose:  bool,
    #[arg(
        long,
        global = true,
        default_value_t = false,
        help = "Display progress bar."
    )]
    pub progress: bool,
}

impl UtilsArgs {
    /// Initializes logging and sizes the scan thread pool. Must run before
    /// the first scan.
    pub fn setup(&self) -> anyhow::Result<()> {
        let level = if self.verbose {
            LevelFilter::Debug
        }
        else {
            LevelFilter::Warn
        };
        pretty_env_logger::formatted_builder()
            .filter_level(level)
            .parse_default_env()
            .try_init()?;

        if self.threads == 0 {
            anyhow::bail!("--threads must be positive");
        }
        std::env::set_var("DISCREP_NUM_THREADS", self.threads.to_string());
        Ok(())
    }
}

pub fn init_pbar(total: usize) -> anyhow::Result<ProgressBar> {
    let progress_bar = ProgressBar::new(total as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}, ETA: {eta}] [{bar:40.cyan/blue}] {pos:>5.green}/{len:5} {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message("Scanning...");
    Ok(progress_bar)
}

pub(crate) fn expand_wildcards(paths: &[String]) -> Vec<PathBuf> {
    let mut expanded_paths = Vec::new();

    for path in paths {
        if path.contains('*') || path.contains('?') {
            match glob(path) {
                Ok(matches) => expanded_paths.extend(matches.filter_map(Result::ok)),
                Err(e) => eprintln!("Error processing wildcard '{}': {}", path, e),
            }
        }
        else {
            expanded_paths.push(PathBuf::from(path));
        }
    }

    expanded_paths
}

pub(crate) fn validate_input(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Path {} does not exist.", style(path.display()).red());
    }
    if !path.is_file() {
        anyhow::bail!("Path {} is not a file.", style(path.display()).red());
    }
    Ok(())
}

pub(crate) fn validate_output(path: &Path) -> anyhow::Result<()> {
    if path.is_dir() {
        anyhow::bail!("Output {} is a directory.", style(path.display()).red());
    }
    Ok(())
}
