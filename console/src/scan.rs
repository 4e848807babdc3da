use std::fs::File;
use std::io::{
    BufWriter,
    Write,
};
use std::path::PathBuf;

use anyhow::Context;
use clap::{
    Args,
    ValueEnum,
};
use console::style;
use discrep::engine::UnavailableLookup;
use discrep::io::read_tree;
use discrep::prelude::*;
use discrep::report::write_json;
use itertools::Itertools;
use log::info;

use crate::utils::{
    expand_wildcards,
    init_pbar,
    validate_input,
    validate_output,
    UtilsArgs,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum CliReportKind {
    Discrepancy,
    Oncaller,
}

impl From<CliReportKind> for ReportKind {
    fn from(value: CliReportKind) -> Self {
        match value {
            CliReportKind::Discrepancy => ReportKind::Discrepancy,
            CliReportKind::Oncaller => ReportKind::Oncaller,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ScanArgs {
    #[arg(
        value_parser,
        num_args = 1..,
        required = true,
        help = "Input trees (.json) or annotations (.gff, .gff3). Wildcards are expanded."
    )]
    files: Vec<String>,

    #[arg(short, long, help = "Write the report here instead of stdout.")]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, help = "Report format.")]
    format: OutputFormat,

    #[arg(short = 'k', long, value_enum, help = "Report kind selecting the default rules.")]
    kind: Option<CliReportKind>,

    #[arg(short, long, help = "JSON scan configuration.")]
    config: Option<PathBuf>,

    #[arg(short, long, num_args = 1.., help = "Run exactly these rules instead of the defaults.")]
    rules: Option<Vec<String>>,

    #[arg(short = 'e', long, num_args = 1.., help = "Rules to enable in addition to the defaults.")]
    enable: Vec<String>,

    #[arg(short = 'd', long, num_args = 1.., help = "Rules to disable.")]
    disable: Vec<String>,

    #[arg(long, help = "JSON array of known organisms used for taxonomy checks.")]
    taxonomy: Option<PathBuf>,

    #[arg(short = 's', long, default_value_t = false, help = "Print only the summary section.")]
    summary_only: bool,

    #[arg(long, default_value_t = false, help = "Scan records in parallel.")]
    parallel: bool,

    #[arg(long, help = "Stop each scan after this many milliseconds.")]
    deadline_ms: Option<u64>,
}

impl ScanArgs {
    fn scan_config(&self) -> anyhow::Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => {
                validate_input(path)?;
                ScanConfig::from_reader(File::open(path)?)
                    .with_context(|| format!("Failed to read config {}", path.display()))?
            },
            None => ScanConfig::default(),
        };
        if let Some(kind) = self.kind {
            config.kind = kind.into();
        }
        if self.rules.is_some() {
            config.rules = self.rules.clone();
        }
        config.enable.extend(self.enable.iter().cloned());
        config.disable.extend(self.disable.iter().cloned());
        config.parallel |= self.parallel;
        if self.deadline_ms.is_some() {
            config.deadline_ms = self.deadline_ms;
        }
        config.validate()?;
        Ok(config)
    }

    fn scanner(&self) -> anyhow::Result<Scanner> {
        let scanner = Scanner::new(standard_registry()?, self.scan_config()?)?;
        let scanner = match &self.taxonomy {
            Some(path) => {
                validate_input(path)?;
                let lookup = StaticLookup::from_reader(File::open(path)?)
                    .with_context(|| format!("Failed to read taxonomy {}", path.display()))?;
                info!("Loaded {} taxonomy records", lookup.len());
                scanner.with_lookup(lookup)
            },
            None => scanner.with_lookup(UnavailableLookup),
        };
        Ok(scanner)
    }

    fn writer(&self) -> anyhow::Result<Box<dyn Write>> {
        match &self.output {
            Some(path) => {
                validate_output(path)?;
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            },
            None => Ok(Box::new(std::io::stdout().lock())),
        }
    }

    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let paths = expand_wildcards(&self.files);
        if paths.is_empty() {
            anyhow::bail!("No input files matched.");
        }
        for path in paths.iter() {
            validate_input(path)?;
        }

        let mut scanner = self.scanner()?;
        let mut out = self.writer()?;
        let renderer = TextRenderer::new().with_summary_only(self.summary_only);
        let mut json_reports = Vec::with_capacity(paths.len());
        let mut fatal_total = 0usize;

        for path in paths.iter() {
            let tree = read_tree(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let n_records = tree.records().len();

            let progress_bar = if utils.progress {
                let bar = init_pbar(n_records)?;
                bar.set_message(path.display().to_string());
                Some(bar)
            }
            else {
                None
            };
            if let Some(bar) = progress_bar.clone() {
                scanner = scanner.with_progress(move |done| bar.set_position(done as u64));
            }

            let (summary, report) = scanner.scan(&tree);
            if let Some(bar) = progress_bar {
                bar.finish_and_clear();
            }

            if summary.cancelled {
                eprintln!(
                    "{} scan of {} stopped after {} of {} records",
                    style("Warning:").yellow(),
                    path.display(),
                    summary.visited,
                    summary.records
                );
            }
            for rule in summary.failed_rules.iter() {
                eprintln!("{} rule {} did not complete", style("Warning:").yellow(), rule);
            }
            fatal_total += report.iter().filter(|item| item.any_fatal()).count();

            match self.format {
                OutputFormat::Text => {
                    if paths.len() > 1 {
                        writeln!(out, "==> {} <==", path.display())?;
                    }
                    renderer.render(&report, &mut out)?;
                },
                OutputFormat::Json => json_reports.push((path.display().to_string(), report)),
            }
        }

        if let OutputFormat::Json = self.format {
            match json_reports.len() {
                1 => write_json(&json_reports[0].1, &mut out)?,
                _ => {
                    let by_file = json_reports
                        .into_iter()
                        .map(|(path, report)| Ok((path, serde_json::to_value(report)?)))
                        .collect::<serde_json::Result<serde_json::Map<_, _>>>()?;
                    serde_json::to_writer_pretty(&mut out, &by_file)?;
                },
            }
            writeln!(out)?;
        }
        out.flush()?;

        if fatal_total > 0 {
            eprintln!(
                "{}",
                style(format!(
                    "Found {} fatal discrepanc{}.",
                    fatal_total,
                    if fatal_total == 1 { "y" } else { "ies" }
                ))
                .red()
                .bold()
            );
        }
        else {
            eprintln!("{}", style("No fatal discrepancies found.").green().bold());
        }
        info!(
            "Scanned {}",
            paths.iter().map(|p| p.display().to_string()).join(", ")
        );
        Ok(())
    }
}
