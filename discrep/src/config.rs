use std::fmt::Display;
use std::io::Read;
use std::str::FromStr;
use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::typedef::PosType;
use crate::with_field_fn;

/// Which catalogue of rules runs by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Submitter-facing discrepancy report.
    #[default]
    Discrepancy,
    /// Extended checks run by curators.
    Oncaller,
}

impl FromStr for ReportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "discrepancy" | "disc" => Ok(ReportKind::Discrepancy),
            "oncaller" => Ok(ReportKind::Oncaller),
            other => anyhow::bail!("Unknown report kind: {}", other),
        }
    }
}

impl Display for ReportKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ReportKind::Discrepancy => write!(f, "discrepancy"),
            ReportKind::Oncaller => write!(f, "oncaller"),
        }
    }
}

/// Settings for one scan.
///
/// The enabled rule set is every rule tagged for `kind`, plus `enable`,
/// minus `disable`. When `rules` is given it replaces the tagged defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub kind:               ReportKind,
    pub rules:              Option<Vec<String>>,
    pub enable:             Vec<String>,
    pub disable:            Vec<String>,
    pub short_sequence_len: PosType,
    pub n_run_len:          usize,
    pub short_intron_len:   PosType,
    pub parallel:           bool,
    pub deadline_ms:        Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            kind:               ReportKind::Discrepancy,
            rules:              None,
            enable:             Vec::new(),
            disable:            Vec::new(),
            short_sequence_len: 50,
            n_run_len:          10,
            short_intron_len:   11,
            parallel:           false,
            deadline_ms:        None,
        }
    }
}

impl ScanConfig {
    with_field_fn!(kind, ReportKind);

    with_field_fn!(rules, Option<Vec<String>>);

    with_field_fn!(enable, Vec<String>);

    with_field_fn!(disable, Vec<String>);

    with_field_fn!(short_sequence_len, PosType);

    with_field_fn!(n_run_len, usize);

    with_field_fn!(short_intron_len, PosType);

    with_field_fn!(parallel, bool);

    with_field_fn!(deadline_ms, Option<u64>);

    /// Restricts the scan to exactly these rules.
    pub fn only<I, S>(
        self,
        rules: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>, {
        self.with_rules(Some(rules.into_iter().map(Into::into).collect()))
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.n_run_len == 0 {
            anyhow::bail!("n_run_len must be positive");
        }
        if self.short_sequence_len == 0 {
            anyhow::bail!("short_sequence_len must be positive");
        }
        if let Some(name) = self
            .enable
            .iter()
            .find(|name| self.disable.contains(name))
        {
            anyhow::bail!("Rule {} is both enabled and disabled", name);
        }
        Ok(())
    }

    /// Reads a JSON configuration.
    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let config: ScanConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}
