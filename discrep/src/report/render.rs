use std::io::Write;

use hashbrown::HashSet;

use super::{
    ItemStatus,
    ReportItem,
};

/// Plain text report.
///
/// A `Summary` section lists every non-clean item with its subcategories
/// indented below it. The `Detailed Report` repeats each item prefixed with
/// `DiscRep_ALL:` (top level) or `DiscRep_SUB:` (subcategory), followed by
/// the locators that none of its subcategories lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer {
    summary_only: bool,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary_only(
        mut self,
        summary_only: bool,
    ) -> Self {
        self.summary_only = summary_only;
        self
    }

    pub fn render<W: Write>(
        &self,
        items: &[ReportItem],
        out: &mut W,
    ) -> std::io::Result<()> {
        let shown = items.iter().filter(|item| !item.is_clean());

        writeln!(out, "Discrepancy Report Results")?;
        writeln!(out)?;
        writeln!(out, "Summary")?;
        for item in shown.clone() {
            self.summary_line(item, 0, out)?;
        }
        if self.summary_only {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out)?;
        writeln!(out, "Detailed Report")?;
        writeln!(out)?;
        for item in shown {
            self.detail(item, true, out)?;
        }
        Ok(())
    }

    pub fn render_to_string(
        &self,
        items: &[ReportItem],
    ) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.render(items, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn summary_line<W: Write>(
        &self,
        item: &ReportItem,
        depth: usize,
        out: &mut W,
    ) -> std::io::Result<()> {
        writeln!(
            out,
            "{}{}: {}",
            "\t".repeat(depth),
            item.setting_name,
            item.description
        )?;
        for child in item.subcategories.iter() {
            self.summary_line(child, depth + 1, out)?;
        }
        Ok(())
    }

    fn detail<W: Write>(
        &self,
        item: &ReportItem,
        top: bool,
        out: &mut W,
    ) -> std::io::Result<()> {
        let prefix = if top { "DiscRep_ALL" } else { "DiscRep_SUB" };
        writeln!(out, "{}:{}: {}", prefix, item.setting_name, item.description)?;
        if item.status == ItemStatus::Failed {
            for error in item.errors.iter() {
                writeln!(out, "ERROR: {}", error)?;
            }
        }
        // Objects whose findings stop at this level are listed here; the
        // rest are listed under their subcategory.
        let grouped: HashSet<&str> = item
            .subcategories
            .iter()
            .flat_map(|child| child.locators.iter().map(String::as_str))
            .collect();
        for locator in item.locators.iter() {
            if !grouped.contains(locator.as_str()) {
                writeln!(out, "{}", locator)?;
            }
        }
        writeln!(out)?;
        for child in item.subcategories.iter() {
            self.detail(child, false, out)?;
        }
        Ok(())
    }
}

/// Writes the report trees as pretty-printed JSON.
pub fn write_json<W: Write>(
    items: &[ReportItem],
    out: W,
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(out, items)
}
