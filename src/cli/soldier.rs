use std::path::Path;

use anyhow::Context;
use basevisit::{
    NewSoldier, Soldier, SoldierId,
    domain::{Gender, ServiceType},
};
use clap::{Parser, ValueEnum};
use tracing::instrument;

use super::{
    list::{csv_escape, render_table},
    open_store,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, clap::Subcommand)]
pub enum SoldierCommand {
    /// Add a soldier
    Add(Add),

    /// List soldiers
    List(List),

    /// Show every field of a soldier
    Show(Show),
}

impl SoldierCommand {
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::Add(command) => command.run(root),
            Self::List(command) => command.run(root),
            Self::Show(command) => command.run(root),
        }
    }
}

#[derive(Debug, Parser)]
pub struct Add {
    /// Full name (required)
    #[arg(long)]
    full_name: String,

    /// Personal number, "מ.א." (required)
    #[arg(long)]
    personal_number: String,

    /// National ID number (required)
    #[arg(long)]
    id_number: String,

    /// Mobile phone number
    #[arg(long, default_value = "")]
    phone: String,

    /// Gender (male/ז, female/נ)
    #[arg(long, default_value = "male")]
    gender: Gender,

    /// Rank
    #[arg(long, default_value = "")]
    rank: String,

    /// Service type (regular/סדיר, reserve/מיל, advisor/יועץ)
    #[arg(long, default_value = "regular")]
    service_type: ServiceType,

    /// Center
    #[arg(long, default_value = "")]
    center: String,

    /// Branch
    #[arg(long, default_value = "")]
    branch: String,

    /// Department
    #[arg(long, default_value = "")]
    department: String,

    /// Team
    #[arg(long)]
    team: Option<String>,

    /// Position
    #[arg(long, default_value = "")]
    position: String,

    /// Visits by this soldier require approval
    #[arg(long)]
    requires_approval: bool,

    /// The soldier is under an intelligence watch
    #[arg(long)]
    intelligence_watch: bool,

    /// Security clearance level
    #[arg(long, default_value = "")]
    security_clearance: String,

    /// The soldier has a known allergy
    #[arg(long)]
    allergy: bool,
}

impl Add {
    #[instrument(level = "debug", skip_all)]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut store = open_store(root)?;

        let new_soldier = NewSoldier {
            full_name: self.full_name,
            personal_number: self.personal_number,
            id_number: self.id_number,
            phone: self.phone,
            gender: self.gender,
            rank: self.rank,
            service_type: self.service_type,
            center: self.center,
            branch: self.branch,
            department: self.department,
            team: self.team,
            position: self.position,
            requires_approval: self.requires_approval,
            has_intelligence_watch: self.intelligence_watch,
            security_clearance: self.security_clearance,
            has_allergy: self.allergy,
        };

        let soldier = store
            .add_soldier(new_soldier)
            .context("Failed to add soldier")?;

        println!(
            "{}",
            format!("Added {} with id {}", soldier.full_name, soldier.id).success()
        );
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct List {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
        })
    }
}

const HEADERS: [&str; 6] = [
    "ID",
    "Name",
    "Personal No.",
    "Rank",
    "Department",
    "Position",
];

fn row_values(soldier: &Soldier) -> Vec<String> {
    vec![
        soldier.id.to_string(),
        soldier.full_name.to_string(),
        soldier.personal_number.to_string(),
        soldier.rank.clone(),
        soldier.department.clone(),
        soldier.position.clone(),
    ]
}

impl List {
    #[instrument(level = "debug", skip_all)]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = open_store(root)?;
        let soldiers = store.soldiers();

        match self.output {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), soldiers)
                    .context("failed to render json output")?;
                println!();
            }
            OutputFormat::Csv => {
                if !self.quiet {
                    println!("{}", HEADERS.join(","));
                }
                for soldier in soldiers {
                    let values: Vec<_> = row_values(soldier)
                        .iter()
                        .map(|value| csv_escape(value))
                        .collect();
                    println!("{}", values.join(","));
                }
            }
            OutputFormat::Table => {
                if self.quiet {
                    for soldier in soldiers {
                        println!("{}", row_values(soldier).join("\t"));
                    }
                } else if soldiers.is_empty() {
                    println!("{}", "No soldiers yet. Add one with 'visit soldier add'.".dim());
                } else if is_narrow() {
                    for soldier in soldiers {
                        println!("{} {}", soldier.id.to_string().dim(), soldier.identity());
                    }
                } else {
                    let rows: Vec<_> = soldiers.iter().map(row_values).collect();
                    render_table(&HEADERS, &rows, |_, value| value.to_string());
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Show {
    /// The soldier's id
    id: SoldierId,
}

impl Show {
    #[instrument(level = "debug", skip_all)]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = open_store(root)?;
        let Some(soldier) = store.soldier(&self.id) else {
            anyhow::bail!("No soldier with id {}", self.id);
        };

        let yes_no = |value: bool| if value { "כן" } else { "לא" };

        println!("{}", soldier.identity());
        println!("{}", "─".repeat(40).dim());
        let fields = [
            ("ID", soldier.id.to_string()),
            ("ID number", soldier.id_number.to_string()),
            ("Phone", soldier.phone.clone()),
            ("Gender", soldier.gender.label().to_string()),
            ("Service type", soldier.service_type.label().to_string()),
            ("Center", soldier.center.clone()),
            ("Branch", soldier.branch.clone()),
            ("Department", soldier.department.clone()),
            ("Team", soldier.team().unwrap_or_default().to_string()),
            ("Position", soldier.position.clone()),
            ("Security clearance", soldier.security_clearance.clone()),
            ("Requires approval", yes_no(soldier.requires_approval).to_string()),
            (
                "Intelligence watch",
                yes_no(soldier.has_intelligence_watch).to_string(),
            ),
            ("Allergy", yes_no(soldier.has_allergy).to_string()),
        ];
        for (label, value) in fields {
            println!("{:<20}{value}", format!("{label}:"));
        }

        Ok(())
    }
}
