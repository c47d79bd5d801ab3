use clap::{Parser, Subcommand};
use tm::transfer;

#[derive(Parser)]
#[command(name = "tm", about = "Local task list with progress tracking", version)]
pub struct Cli {
    /// Path to the SQLite database [default: ~/.tm/tm.db]
    #[arg(long, env = "TM_DB", global = true)]
    pub db: Option<String>,

    /// Path to the config file [default: ~/.tm/config.toml]
    #[arg(long, env = "TM_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(short, long)]
        desc: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a task
    Edit {
        /// Task id
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        desc: Option<String>,
        /// New due date (YYYY-MM-DD, empty to clear)
        #[arg(long)]
        due: Option<String>,
        /// New priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// Replace tags with this comma-separated list
        #[arg(short, long)]
        tags: Option<String>,
    },

    /// Toggle a task between done and active
    Done {
        /// Task id
        id: String,
    },

    /// Remove a task
    Rm {
        /// Task id
        id: String,
    },

    /// Move a task one position up
    Up {
        /// Task id
        id: String,
    },

    /// Move a task one position down
    Down {
        /// Task id
        id: String,
    },

    /// Set the full task order
    Reorder {
        /// Every task id, in the new order
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Remove all completed tasks
    #[command(name = "clear-completed")]
    ClearCompleted,

    /// Remove every task
    #[command(name = "clear-all")]
    ClearAll {
        /// Confirm removing all tasks
        #[arg(long)]
        yes: bool,
    },

    /// Append tasks from a JSON export
    Import {
        /// File to import ("-" for stdin)
        file: String,
    },

    /// Write all tasks as JSON
    Export {
        /// Output file ("-" for stdout)
        #[arg(short, long, default_value = transfer::EXPORT_FILENAME)]
        output: String,
    },

    /// Write a timestamped JSON backup
    Backup {
        /// Directory for the backup file
        #[arg(long, default_value = ".")]
        dir: String,
    },

    /// List tasks
    List {
        /// Filter (all, active, completed)
        #[arg(short, long)]
        filter: Option<String>,
        /// Case-insensitive search over title, description and tags
        #[arg(short, long)]
        search: Option<String>,
        /// Sort (manual, due-asc, due-desc, prio-desc, prio-asc)
        #[arg(long)]
        sort: Option<String>,
        /// Show descriptions
        #[arg(long, conflicts_with = "no_details")]
        details: bool,
        /// Hide descriptions
        #[arg(long)]
        no_details: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show task details
    Show {
        /// Task id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show completion statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
