use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(name = "cabinet", about = "Search and browse a personal catalog")]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the catalog
    Search(SearchArgs),
    /// List tags with their entry counts
    Tags(TagsArgs),
    /// List the available sort orders
    Sorts,
    /// List the field names usable in `field:value` terms
    Fields,
    /// Read search input line by line from stdin and print render commands
    Watch(WatchArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

/// Overrides for the stored settings. Unset flags keep the stored value.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SearchOverrides {
    /// Maximum number of results to show (0 for unlimited)
    #[arg(short = 'n', long)]
    pub threshold: Option<usize>,

    /// Sort order (see `cabinet sorts`)
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Toggle the stored reverse setting, flipping the current direction
    #[arg(short, long)]
    pub reverse: bool,

    /// Only show entries from this collection
    #[arg(short, long)]
    pub collection: Option<String>,

    /// Include entries marked as removed
    #[arg(long)]
    pub show_removed: bool,

    /// Score each matching term once, however often it occurs
    #[arg(long)]
    pub single_match: bool,
}

impl SearchOverrides {
    pub fn apply(&self, settings: &mut cabinet::Settings) {
        if let Some(threshold) = self.threshold {
            settings.threshold = threshold;
        }
        if let Some(sort) = &self.sort {
            settings.sort = sort.clone();
        }
        if self.reverse {
            settings.reverse = !settings.reverse;
        }
        if let Some(collection) = &self.collection {
            settings.collection = Some(collection.clone());
        }
        if self.show_removed {
            settings.show_removed = true;
        }
        if self.single_match {
            settings.count_multiple_matches = false;
        }
    }
}

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query, e.g. "tag:comedy, -tag:drama; artist:someone"
    #[arg(default_value = "", allow_hyphen_values = true)]
    pub query: String,

    #[command(flatten)]
    pub overrides: SearchOverrides,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct TagsArgs {
    /// Only show tags containing this text
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Sort alphabetically instead of by count
    #[arg(long)]
    pub by_name: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct WatchArgs {
    #[command(flatten)]
    pub overrides: SearchOverrides,

    /// Quiet period before a search runs, in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "cabinet",
            &mut std::io::stdout(),
        );
    }
}
