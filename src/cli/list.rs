use std::{fmt, path::Path};

use anyhow::Context;
use basevisit::{
    RequestFilter, RequestView,
    domain::{DepartmentFilter, StatusFilter, message::format_date},
};
use chrono::Local;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::instrument;

use super::{
    open_store,
    terminal::{Colorize, is_narrow, status_badge},
};

/// Command arguments for `visit request list`.
#[derive(Debug, Parser)]
#[command(about = "List requests, filtered by soldier name, status and department")]
pub struct List {
    /// Case-insensitive substring of the soldier's full name.
    #[arg(long, short, default_value = "")]
    search: String,

    /// Status to show ('all', pending, approved, rejected).
    #[arg(long, default_value = "all")]
    status: StatusFilter,

    /// Department to show ('all' or an exact department name).
    #[arg(long, default_value = "all")]
    department: DepartmentFilter,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize)]
struct SerializableRow<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    soldier_id: &'a str,
    soldier: &'a str,
    personal_number: &'a str,
    department: &'a str,
    created: String,
    commander: &'a str,
    status: &'static str,
    base: &'a str,
}

const HEADERS: [&str; 8] = [
    "ID",
    "Soldier",
    "Personal No.",
    "Type",
    "Department",
    "Created",
    "Commander",
    "Status",
];

const STATUS_COLUMN: usize = 7;

impl List {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = open_store(root)?;

        let filter = RequestFilter {
            search_term: self.search,
            status: self.status,
            department: self.department,
        };
        let views = store.filter_requests(&filter);
        tracing::debug!(
            "{} of {} requests match {filter:?}",
            views.len(),
            store.requests().len()
        );

        match self.output {
            OutputFormat::Json => render_json(&views)?,
            OutputFormat::Csv => render_csv(&views, self.quiet),
            OutputFormat::Table => {
                if views.is_empty() {
                    if !self.quiet {
                        println!("{}", "No requests match the given filters.".dim());
                    }
                } else if self.quiet {
                    for view in &views {
                        println!("{}", row_values(view).join("\t"));
                    }
                } else if is_narrow() {
                    render_compact(&views);
                } else {
                    let rows: Vec<_> = views.iter().map(row_values).collect();
                    render_table(&HEADERS, &rows, |column, value| {
                        if column == STATUS_COLUMN {
                            value
                                .parse()
                                .map_or_else(|_| value.to_string(), status_badge)
                        } else {
                            value.to_string()
                        }
                    });
                }
            }
        }

        Ok(())
    }
}

fn row_values(view: &RequestView<'_>) -> Vec<String> {
    let request = view.request;
    vec![
        request.id.to_string(),
        view.soldier_name().to_string(),
        view.soldier.personal_number.to_string(),
        request.kind.label().to_string(),
        view.department().to_string(),
        format_date(request.created_date.with_timezone(&Local).date_naive()),
        request.commander_name.clone(),
        request.status.label().to_string(),
    ]
}

fn render_compact(views: &[RequestView<'_>]) {
    for view in views {
        println!(
            "{} {} · {} · {}",
            view.request.id.to_string().dim(),
            view.soldier_name(),
            view.request.kind.label(),
            status_badge(view.request.status)
        );
    }
}

/// Prints an aligned table.
///
/// Column widths are computed from the plain values; `style` may decorate a
/// value (for example with colors) after the width is known.
pub(super) fn render_table(
    headers: &[&str],
    rows: &[Vec<String>],
    style: impl Fn(usize, &str) -> String,
) {
    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        })
        .collect::<Vec<_>>();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();

    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in rows {
        for (idx, value) in row.iter().enumerate() {
            let pad = widths[idx] - value.chars().count();
            print!("{}{}  ", style(idx, value), " ".repeat(pad));
        }
        println!();
    }
}

fn render_json(views: &[RequestView<'_>]) -> anyhow::Result<()> {
    let rows: Vec<_> = views
        .iter()
        .map(|view| SerializableRow {
            id: view.request.id.as_str(),
            kind: view.request.kind.type_name(),
            soldier_id: view.soldier.id.as_str(),
            soldier: view.soldier_name(),
            personal_number: view.soldier.personal_number.as_str(),
            department: view.department(),
            created: view.request.created_date.to_rfc3339(),
            commander: &view.request.commander_name,
            status: view.request.status.as_str(),
            base: view.request.kind.base_name(),
        })
        .collect();

    serde_json::to_writer_pretty(std::io::stdout(), &rows)
        .context("failed to render json output")?;
    println!();
    Ok(())
}

fn render_csv(views: &[RequestView<'_>], quiet: bool) {
    if !quiet {
        let header_line = HEADERS
            .iter()
            .map(|header| csv_escape(header))
            .collect::<Vec<_>>()
            .join(",");
        println!("{header_line}");
    }

    for view in views {
        let values = row_values(view)
            .iter()
            .map(|value| csv_escape(value))
            .collect::<Vec<_>>();
        println!("{}", values.join(","));
    }
}

pub(super) fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_escape_quotes_special_values() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("רס\"ר"), "\"רס\"\"ר\"");
    }
}
