use std::path::Path;

use anyhow::Context;
use basevisit::{
    Config, FileStore, RequestDraft, RequestKind, RequestStatus, SoldierId, Store,
    ValidationError,
    domain::{ReplacedSoldier, RequestId},
};
use chrono::NaiveDate;
use clap::{Args, Parser};
use tracing::instrument;

use super::{
    list::List,
    load_config, open_store,
    terminal::{Colorize, status_badge},
};

#[derive(Debug, clap::Subcommand)]
pub enum RequestCommand {
    /// Draft a request, preview its message and save it
    #[command(subcommand)]
    New(New),

    /// List requests
    List(List),

    /// Print the stored message of a request
    Show(Show),

    /// Set the review status of a request
    Status(SetStatus),

    /// Edit the stored message of a request in $EDITOR
    Edit(Edit),

    /// List the departments that requests can be filtered by
    Departments,
}

impl RequestCommand {
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::New(command) => command.run(root),
            Self::List(command) => command.run(root),
            Self::Show(command) => command.run(root),
            Self::Status(command) => command.run(root),
            Self::Edit(command) => command.run(root),
            Self::Departments => departments(root),
        }
    }
}

/// Arguments shared by every kind of request.
#[derive(Debug, Args)]
pub struct Common {
    /// The id of the soldier the request is about
    #[arg(long, short)]
    soldier: SoldierId,

    /// The requesting commander (defaults to `default_commander` in config.toml)
    #[arg(long, short)]
    commander: Option<String>,

    /// The base (defaults to `default_base` in config.toml)
    #[arg(long, short)]
    base: Option<String>,

    /// Save without asking for confirmation
    #[arg(long, short)]
    yes: bool,

    /// Edit the generated message in $EDITOR before saving
    #[arg(long)]
    edit: bool,

    /// Print the message without saving the request
    #[arg(long)]
    dry_run: bool,
}

/// Arguments shared by the visit kinds.
#[derive(Debug, Args)]
pub struct Visit {
    /// Day of arrival (YYYY-MM-DD)
    #[arg(long)]
    arrival: NaiveDate,

    /// The soldier has been on this base before
    #[arg(long)]
    was_in_base: bool,

    /// The visit needs explicit approval
    #[arg(long)]
    requires_approval: bool,
}

#[derive(Debug, clap::Subcommand)]
pub enum New {
    /// A one-day visit without an overnight stay
    SingleDay {
        #[command(flatten)]
        common: Common,
        #[command(flatten)]
        visit: Visit,
    },

    /// A visit with overnight stays
    MultiDay {
        #[command(flatten)]
        common: Common,
        #[command(flatten)]
        visit: Visit,
        /// Day of departure (YYYY-MM-DD)
        #[arg(long)]
        departure: NaiveDate,
    },

    /// A multi-day visit replacing another soldier
    Replacement {
        #[command(flatten)]
        common: Common,
        #[command(flatten)]
        visit: Visit,
        /// Day of departure (YYYY-MM-DD)
        #[arg(long)]
        departure: NaiveDate,
        /// The id of the soldier being replaced
        #[arg(long)]
        replaced: SoldierId,
        /// When the replaced soldier leaves the base (YYYY-MM-DD)
        #[arg(long)]
        replaced_departure: NaiveDate,
    },

    /// Leaving a base
    Departure {
        #[command(flatten)]
        common: Common,
    },
}

impl New {
    #[instrument(level = "debug", skip_all)]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut store = open_store(root)?;
        let config = load_config(root);

        let (common, draft) = self.into_draft(&store, &config)?;

        let mut message = store
            .generate_message(&draft)
            .context("Failed to generate message")?;

        if common.edit {
            match dialoguer::Editor::new().edit(&message)? {
                Some(edited) => message = edited,
                None => {
                    println!("{}", "Editor closed without saving, keeping the generated message.".dim());
                }
            }
        }

        println!("{message}");
        println!();

        if common.dry_run {
            println!("{}", "Dry run, request not saved.".dim());
            return Ok(());
        }

        if !common.yes
            && !dialoguer::Confirm::new()
                .with_prompt("Save this request?")
                .default(true)
                .interact()?
        {
            println!("Cancelled");
            return Ok(());
        }

        let request = store
            .add_request(draft, message)
            .context("Failed to save request")?;

        println!(
            "{}",
            format!("Saved {} request {}", request.kind.label(), request.id).success()
        );
        Ok(())
    }

    fn into_draft(
        self,
        store: &Store<FileStore>,
        config: &Config,
    ) -> anyhow::Result<(Common, RequestDraft)> {
        let (common, kind) = match self {
            Self::SingleDay { common, visit } => {
                let base_name = base_name(&common, config);
                let kind = RequestKind::SingleDay {
                    arrival_date: visit.arrival,
                    base_name,
                    was_in_base_before: visit.was_in_base,
                    requires_approval: visit.requires_approval,
                };
                (common, kind)
            }
            Self::MultiDay {
                common,
                visit,
                departure,
            } => {
                let base_name = base_name(&common, config);
                let kind = RequestKind::MultiDay {
                    arrival_date: visit.arrival,
                    departure_date: departure,
                    base_name,
                    was_in_base_before: visit.was_in_base,
                    requires_approval: visit.requires_approval,
                };
                (common, kind)
            }
            Self::Replacement {
                common,
                visit,
                departure,
                replaced,
                replaced_departure,
            } => {
                let replaced_soldier = store
                    .soldier(&replaced)
                    .ok_or(ValidationError::UnknownSoldier(replaced))?;
                let base_name = base_name(&common, config);
                let kind = RequestKind::Replacement {
                    arrival_date: visit.arrival,
                    departure_date: departure,
                    base_name,
                    was_in_base_before: visit.was_in_base,
                    requires_approval: visit.requires_approval,
                    replaced_soldier: ReplacedSoldier::snapshot(
                        replaced_soldier,
                        replaced_departure,
                    ),
                };
                (common, kind)
            }
            Self::Departure { common } => {
                let kind = RequestKind::Departure {
                    base_name: base_name(&common, config),
                };
                (common, kind)
            }
        };

        let commander_name = common
            .commander
            .clone()
            .or_else(|| config.default_commander().map(ToString::to_string))
            .unwrap_or_default();

        let draft = RequestDraft {
            soldier_id: common.soldier.clone(),
            commander_name,
            kind,
        };
        Ok((common, draft))
    }
}

fn base_name(common: &Common, config: &Config) -> String {
    common
        .base
        .clone()
        .or_else(|| config.default_base().map(ToString::to_string))
        .unwrap_or_default()
}

#[derive(Debug, Parser)]
pub struct Show {
    /// The request's id
    id: RequestId,
}

impl Show {
    #[instrument(level = "debug", skip_all)]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = open_store(root)?;
        let Some(request) = store.request(&self.id) else {
            anyhow::bail!("No request with id {}", self.id);
        };

        println!(
            "{} · {} · {}",
            request.id.to_string().dim(),
            request.kind.label(),
            status_badge(request.status)
        );
        println!();
        println!("{}", request.message);
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct SetStatus {
    /// The request's id
    id: RequestId,

    /// The new status (pending, approved, rejected)
    status: RequestStatus,
}

impl SetStatus {
    #[instrument(level = "debug", skip_all)]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut store = open_store(root)?;
        if !store
            .update_request_status(&self.id, self.status)
            .context("Failed to update request status")?
        {
            anyhow::bail!("No request with id {}", self.id);
        }

        println!(
            "{} {}",
            format!("Request {} is now", self.id).success(),
            status_badge(self.status)
        );
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Edit {
    /// The request's id
    id: RequestId,
}

impl Edit {
    #[instrument(level = "debug", skip_all)]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut store = open_store(root)?;
        let Some(request) = store.request(&self.id) else {
            anyhow::bail!("No request with id {}", self.id);
        };

        let Some(message) = dialoguer::Editor::new().edit(&request.message)? else {
            println!("{}", "Editor closed without saving, message unchanged.".dim());
            return Ok(());
        };

        store
            .update_request_message(&self.id, message)
            .context("Failed to update request message")?;

        println!(
            "{}",
            format!("Updated message of request {}", self.id).success()
        );
        Ok(())
    }
}

#[instrument(level = "debug")]
fn departments(root: &Path) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let departments = store.departments();
    if departments.is_empty() {
        println!("{}", "No requests yet.".dim());
        return Ok(());
    }
    for department in departments {
        println!("{department}");
    }
    Ok(())
}
