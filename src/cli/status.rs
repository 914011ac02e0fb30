use std::{collections::BTreeMap, path::Path};

use basevisit::{RequestStatus, domain::filter::status_counts};
use clap::Parser;
use tracing::instrument;

use super::{
    open_store,
    terminal::{Colorize, is_narrow, status_badge},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show soldier and request counts")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = open_store(root)?;

        let soldiers = store.soldiers().len();
        let counts = status_counts(store.requests());
        let total: usize = counts.values().sum();

        match self.output {
            OutputFormat::Json => Self::output_json(soldiers, &counts, total)?,
            OutputFormat::Table => {
                if self.quiet {
                    Self::output_quiet(soldiers, &counts, total);
                } else {
                    Self::output_table(soldiers, &counts, total);
                }
            }
        }

        Ok(())
    }

    fn output_json(
        soldiers: usize,
        counts: &BTreeMap<RequestStatus, usize>,
        total: usize,
    ) -> anyhow::Result<()> {
        use serde_json::json;

        let statuses: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(status, count)| (status.as_str().to_string(), json!(count)))
            .collect();

        let output = json!({
            "soldiers": soldiers,
            "requests": {
                "total": total,
                "by_status": statuses,
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(soldiers: usize, counts: &BTreeMap<RequestStatus, usize>, total: usize) {
        let by_status = counts
            .iter()
            .map(|(status, count)| format!("{status}={count}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("soldiers={soldiers} requests={total} {by_status}");
    }

    fn output_table(soldiers: usize, counts: &BTreeMap<RequestStatus, usize>, total: usize) {
        println!("Soldiers: {soldiers}");

        if total == 0 {
            println!(
                "{}",
                "No requests yet. Create one with 'visit request new'.".dim()
            );
            return;
        }

        println!("Requests: {total}");
        if is_narrow() {
            for (status, count) in counts {
                println!("  {} {count}", status_badge(*status));
            }
            return;
        }

        let width = counts
            .keys()
            .map(|status| status.label().chars().count())
            .max()
            .unwrap_or(0);
        for (status, count) in counts {
            let pad = width - status.label().chars().count();
            println!("  {}{}  {count:>5}", status_badge(*status), " ".repeat(pad));
        }
    }
}
