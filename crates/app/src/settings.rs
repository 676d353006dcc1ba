//! Command line and settings of the client.
//!
//! Settings are layered: built-in defaults, then the TOML file, then
//! `COST_TRACKER_*` environment variables, then command line flags.

use clap::{Args, Parser, Subcommand};
use ledger::view::{SortKey, SortOrder};
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/cost_tracker.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root URL of the remote document store.
    pub base_url: String,
    /// Identifier handed out by the identity provider.
    pub user_id: String,
    /// Bearer token sent with every request, if the store requires one.
    pub token: Option<String>,
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            user_id: String::new(),
            token: None,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cost_tracker", disable_version_flag = true)]
#[command(about = "Track item costs and other expenses")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:8080).
    #[arg(long)]
    base_url: Option<String>,
    /// Override user id (tokens are never read from CLI).
    #[arg(long)]
    user_id: Option<String>,
    /// Override log level.
    #[arg(long)]
    level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List items and other costs with their totals.
    List(ListArgs),
    /// Show cost distribution and top rankings.
    Analytics,
    /// Manage items.
    Item(ItemArgs),
    /// Manage other costs.
    Cost(CostArgs),
}

impl Command {
    /// Whether the command renders the fetched ledger.
    ///
    /// Mutations go straight to the remote store, so they still run when the
    /// initial fetch failed.
    pub fn reads_ledger(&self) -> bool {
        matches!(self, Self::List(_) | Self::Analytics)
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ListArgs {
    /// Sort by `name` or `cost`.
    #[arg(long, default_value = "name")]
    pub sort: SortKey,
    /// `asc` or `desc`.
    #[arg(long, default_value = "asc")]
    pub order: SortOrder,
    /// Hide items costing this much or less.
    #[arg(long, default_value_t = 0.0)]
    pub threshold: f64,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub command: ItemCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ItemCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        cost: f64,
    },
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        cost: f64,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CostArgs {
    #[command(subcommand)]
    pub command: CostCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CostCommand {
    Add {
        #[arg(long)]
        description: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
    },
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        description: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

pub fn load(cli: &Cli) -> Result<Settings> {
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("COST_TRACKER"));
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(user_id) = &cli.user_id {
        settings.user_id = user_id.clone();
    }
    if let Some(level) = &cli.level {
        settings.level = level.clone();
    }

    if settings.user_id.trim().is_empty() {
        return Err(AppError::Usage(
            "no user id configured (set user_id, COST_TRACKER_USER_ID or --user-id)".to_string(),
        ));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&["cost_tracker", "list"], true)]
    #[case(&["cost_tracker", "analytics"], true)]
    #[case(&["cost_tracker", "item", "add", "--name", "Pen", "--cost", "2"], false)]
    #[case(&["cost_tracker", "cost", "delete", "--id", "c1"], false)]
    fn only_views_need_the_fetched_ledger(#[case] args: &[&str], #[case] expected: bool) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.command.reads_ledger(), expected);
    }

    #[test]
    fn list_defaults_to_name_ascending_without_threshold() {
        let cli = Cli::try_parse_from(["cost_tracker", "list"]).unwrap();
        assert_eq!(
            cli.command,
            Command::List(ListArgs {
                sort: SortKey::Name,
                order: SortOrder::Ascending,
                threshold: 0.0,
            })
        );
    }

    #[test]
    fn parses_nested_item_update() {
        let cli = Cli::try_parse_from([
            "cost_tracker",
            "item",
            "update",
            "--id",
            "a",
            "--name",
            "Pen",
            "--cost",
            "3",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Item(ItemArgs {
                command: ItemCommand::Update {
                    id: "a".to_string(),
                    name: "Pen".to_string(),
                    cost: 3.0,
                },
            })
        );
    }

    #[test]
    fn negative_amounts_reach_validation() {
        let cli = Cli::try_parse_from(["cost_tracker", "cost", "add", "--description", "Fee", "--amount", "-1"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Cost(CostArgs {
                command: CostCommand::Add { amount, .. }
            }) if amount == -1.0
        ));
    }

    #[test]
    fn rejects_unknown_sort_key() {
        assert!(Cli::try_parse_from(["cost_tracker", "list", "--sort", "date"]).is_err());
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::try_parse_from([
            "cost_tracker",
            "--config",
            "does/not/exist",
            "--user-id",
            "uid-7",
            "--base-url",
            "http://store.local",
            "analytics",
        ])
        .unwrap();
        let settings = load(&cli).unwrap();
        assert_eq!(settings.user_id, "uid-7");
        assert_eq!(settings.base_url, "http://store.local");
    }
}
