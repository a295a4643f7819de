use clap::{Parser, Subcommand};

/// wsroots - multi-root workspace registry for coding agents
#[derive(Parser)]
#[command(name = "wsroots")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Workspace root directory; repeat for multi-root (auto-detected if absent)
    #[arg(short = 'w', long = "workspace", global = true)]
    pub workspaces: Vec<String>,

    /// Name or path of the primary workspace
    #[arg(short, long, global = true)]
    pub primary: Option<String>,

    /// Timeout for each git/hg probe, in milliseconds
    #[arg(
        long,
        env = "WSROOTS_VCS_TIMEOUT_MS",
        default_value_t = 5000,
        global = true
    )]
    pub vcs_timeout_ms: u64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the configured workspaces
    Summary {
        /// Also show branch and working-copy status per root
        #[arg(long)]
        status: bool,
    },
    /// Print the workspace context injected into LLM prompts
    Context,
    /// Resolve a path, honoring @workspace:path hints
    Resolve {
        path: String,

        /// Probe every workspace for a relative path instead of using the primary
        #[arg(short, long)]
        disambiguate: bool,
    },
    /// Show which workspace contains a path
    Which { path: String },
    /// List the workspaces in which a relative path exists
    Find { path: String },
    /// Make another workspace primary and persist the choice
    Switch { identifier: String },
    /// Discover workspace roots under a directory (dry-run)
    Detect {
        /// Directory to scan (defaults to the project root)
        dir: Option<String>,

        /// Maximum directory depth to scan
        #[arg(long, default_value_t = 3)]
        max_depth: usize,

        /// Include hidden directories
        #[arg(long)]
        include_hidden: bool,
    },
    /// Detect workspaces and write .workspace.json
    Init {
        /// Directory to initialize (defaults to the project root)
        dir: Option<String>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
    /// Check a directory's .workspace.json
    Validate { dir: Option<String> },
    /// Print the persisted manager state
    State,
    /// Refresh commit hashes for Git workspaces
    Refresh,
}
