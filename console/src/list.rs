use clap::Args;
use console::style;
use discrep::prelude::*;
use itertools::Itertools;

use crate::scan::CliReportKind;
use crate::utils::UtilsArgs;

#[derive(Args, Debug, Clone)]
pub(crate) struct ListArgs {
    #[arg(short = 'k', long, value_enum, help = "Only list rules enabled by default for this report kind.")]
    kind: Option<CliReportKind>,

    #[arg(long, default_value_t = false, help = "Print the catalogue as JSON.")]
    json: bool,
}

impl ListArgs {
    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let registry = standard_registry()?;
        let kind = self.kind.map(ReportKind::from);
        let rules = registry
            .catalogue()
            .filter(|info| kind.map_or(true, |k| info.enabled_for(k)))
            .collect_vec();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rules)?);
            return Ok(());
        }

        for info in rules {
            let kinds = info.kinds.iter().join(",");
            let family = info
                .family
                .map(|f| format!(" [{:?}]", f))
                .unwrap_or_default();
            println!(
                "{:<40} {:<12} {}{}",
                style(info.name).bold(),
                kinds,
                info.title,
                style(family).dim()
            );
        }
        Ok(())
    }
}
