//! Persona Panel - multi-persona advisory service
//!
//! Main entry point for the `persona-panel` binary: runs the HTTP service,
//! answers one-shot questions from the terminal and manages configuration.

use std::fs;
use std::path::Path;

use clap::Parser;
use serde_json::Value;
use tracing::info;

use persona_panel::cli::{Cli, Commands, ConfigSubcommand, PersonasSubcommand};
use persona_panel::config::{self, PanelConfig};
use persona_panel::error::{Error, Result};
use persona_panel::logging::{self, LogGuards};
use persona_panel::panel::PanelRequest;
use persona_panel::persona::{PersonaId, PersonaRegistry};
use persona_panel::server::{self, AppState};
use persona_panel::version;

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            version::print_version();
            Ok(())
        }
        Commands::Config { subcommand } => handle_config_command(subcommand),
        Commands::Personas { subcommand } => handle_personas_command(subcommand),
        Commands::Serve { config, host, port } => {
            let mut config = PanelConfig::load(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let _log_guards = init_logging(&config, cli.verbose, cli.quiet)?;
            run_server(config)
        }
        Commands::Ask {
            config,
            blueprint,
            personas,
            message,
        } => {
            let config = PanelConfig::load(config.as_deref())?;
            let _log_guards = init_logging(&config, cli.verbose, cli.quiet)?;
            run_ask(config, blueprint.as_deref(), personas, message)
        }
    }
}

/// Initialize logging and announce the build
fn init_logging(config: &PanelConfig, verbose: u8, quiet: bool) -> Result<LogGuards> {
    let guards = logging::init_logging(&config.logging, verbose, quiet)?;

    let build = version::build_info();
    info!(
        version = %build.full_version(),
        target = %build.target,
        profile = %build.profile,
        "Starting Persona Panel"
    );

    Ok(guards)
}

/// Run the HTTP service until Ctrl-C
fn run_server(config: PanelConfig) -> Result<()> {
    info!(
        base_url = %config.generation.base_url,
        model = %config.generation.model,
        timeout_secs = config.generation.timeout_secs,
        max_concurrency = config.panel.max_concurrency,
        "Generation backend configured"
    );

    let state = AppState::from_config(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("persona-panel")
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(server::serve(state, &config.server))
}

/// Consult the panel once and print every answer
fn run_ask(
    config: PanelConfig,
    blueprint: Option<&str>,
    personas: Vec<String>,
    message: String,
) -> Result<()> {
    let blueprint = match blueprint {
        Some(path) => read_blueprint(Path::new(path))?,
        None => Value::Null,
    };
    let selected_personas = if personas.is_empty() {
        PersonaId::all().iter().map(|id| id.slug().to_string()).collect()
    } else {
        personas
    };

    let request = PanelRequest {
        blueprint,
        user_message: message,
        conversation_history: Vec::new(),
        selected_personas,
    };

    let state = AppState::from_config(&config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;

    let responses = runtime.block_on(state.panel.consult(&request))?;

    for response in responses {
        println!("\n== {} ({}) ==\n", response.name, response.persona);
        println!("{}", response.response);
    }

    Ok(())
}

fn read_blueprint(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::malformed_request(format!("Blueprint {} is not valid JSON: {}", path.display(), e))
    })
}

/// Handle persona subcommands
fn handle_personas_command(subcommand: PersonasSubcommand) -> Result<()> {
    let registry = PersonaRegistry::bundled()?;

    match subcommand {
        PersonasSubcommand::List => {
            println!("{:<14} {:<20} {}", "ID", "NAME", "DESCRIPTION");
            for persona in registry.list() {
                println!(
                    "{:<14} {:<20} {}",
                    persona.id, persona.name, persona.description
                );
            }
        }
        PersonasSubcommand::Show { persona } => {
            let id: PersonaId = persona.parse()?;
            let def = registry
                .get(id)
                .ok_or_else(|| Error::Internal(format!("Persona '{}' is not loaded", id)))?;

            println!("Persona:     {}", def.id);
            println!("Name:        {}", def.name);
            println!("Role:        {}", def.role);
            println!("Accent:      {}", def.accent);
            println!("Description: {}", def.description);
            println!();
            println!("System prompt:");
            println!("{}", def.system_prompt);
        }
    }

    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let mut cfg = PanelConfig::load(config.as_deref())?;
            if !cfg.generation.api_key.is_empty() {
                cfg.generation.api_key = "********".to_string();
            }
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            PanelConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
