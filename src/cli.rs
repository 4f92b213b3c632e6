//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the persona panel.

use clap::{Parser, Subcommand};

/// Persona Panel - multi-persona advisory service
///
/// Fans a message and its blueprint context out to a panel of advisory
/// personas on an OpenAI-compatible backend and collects their answers.
#[derive(Parser, Debug)]
#[command(name = "persona-panel")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Path to configuration file
        #[arg(short, long, env = "PANEL_CONFIG")]
        config: Option<String>,

        /// Interface to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Consult the panel once from the terminal
    Ask {
        /// Path to configuration file
        #[arg(short, long, env = "PANEL_CONFIG")]
        config: Option<String>,

        /// JSON file with the blueprint to discuss
        #[arg(short, long)]
        blueprint: Option<String>,

        /// Persona to consult; repeat for several (default: all)
        #[arg(short = 'P', long = "persona")]
        personas: Vec<String>,

        /// The message to put to the panel
        message: String,
    },

    /// Inspect the bundled personas
    Personas {
        #[command(subcommand)]
        subcommand: PersonasSubcommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Persona subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonasSubcommand {
    /// List every persona
    List,

    /// Show one persona, including its system prompt
    Show {
        /// Persona id: strategist, technologist, impact
        persona: String,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
