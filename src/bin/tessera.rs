use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tessera::common::config::{Config, config_file, snapshot_file};
use tessera::common::log;
use tessera::layout_engine::{self as layout, LayoutCommand};
use tessera::model::{AppState, WindowId, WindowSpec, WorkspaceId};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Tiling layout engine for the workspace shell")]
struct Cli {
    /// State snapshot to operate on. Defaults to the user data directory.
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Config file. Defaults to the user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a fresh state built from the config
    Init {
        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },
    /// Open a window in the active workspace
    Open {
        app_id: String,
        /// Application props as JSON
        #[arg(long)]
        props: Option<String>,
        /// Command line that produced the window
        #[arg(long)]
        command: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Close a window
    Close { window_id: String },
    /// Workspace commands
    Workspace {
        #[command(subcommand)]
        workspace_cmd: WorkspaceCommands,
    },
    /// Move a window to another workspace (by number or id)
    Move { window_id: String, workspace: String },
    /// Print a workspace's layout tree
    Tree { workspace: Option<String> },
    /// Report broken invariants in the snapshot
    Check,
    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum WorkspaceCommands {
    /// Create a workspace and switch to it
    Create { label: Option<String> },
    /// Delete a workspace and close its windows
    Delete { workspace: String },
    /// Switch to a workspace by number or id
    Switch { workspace: String },
    /// Switch to next workspace
    Next,
    /// Switch to previous workspace
    Prev,
    /// Set or clear a workspace label
    Rename { workspace: String, label: Option<String> },
    /// List workspaces in number order
    List,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective config
    Show,
    /// Fix invalid values and write the config file
    Save,
    /// Make the snapshot use the config's layout settings
    Apply,
}

fn main() {
    let cli = Cli::parse();
    log::init_logging();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => config_file()?,
    };
    let state_path = match cli.state {
        Some(path) => path,
        None => snapshot_file()?,
    };
    let mut config = Config::read_or_default(&config_path)?;
    for issue in config.validate() {
        warn!("config: {issue}");
    }

    match cli.command {
        Commands::Init { force } => {
            if state_path.exists() && !force {
                bail!("{} already exists (pass --force to replace it)", state_path.display());
            }
            let layout_config = config.layout.to_layout_config();
            layout_config.validate()?;
            let state: AppState =
                AppState::with_workspaces(config.workspaces.labels()).with_layout_config(layout_config);
            state.save(&state_path)?;
            println!("{}", state_path.display());
        }
        Commands::Config { config_cmd } => match config_cmd {
            ConfigCommands::Show => print!("{}", toml::to_string_pretty(&config)?),
            ConfigCommands::Save => {
                let fixes = config.auto_fix_values();
                if fixes > 0 {
                    println!("fixed {fixes} value(s)");
                }
                config.save(&config_path)?;
                println!("{}", config_path.display());
            }
            ConfigCommands::Apply => {
                let state = load_state(&state_path)?;
                let command = LayoutCommand::SetLayoutConfig(config.layout.to_layout_config());
                commit(&state_path, &state, command)?;
            }
        },
        Commands::Check => {
            let state = load_state(&state_path)?;
            let issues = state.validate();
            if issues.is_empty() {
                println!("ok");
                return Ok(());
            }
            for issue in &issues {
                println!("{issue}");
            }
            bail!("{} invariant violation(s) in {}", issues.len(), state_path.display());
        }
        Commands::Tree { workspace } => {
            let state = load_state(&state_path)?;
            let id = match workspace {
                Some(target) => resolve_workspace(&state, &target),
                None => state.active_workspace_id.clone(),
            };
            let workspace = state
                .workspace(&id)
                .with_context(|| format!("workspace {id} not found"))?;
            match &workspace.layout {
                Some(tree) => print!("{}", tree.draw_tree()),
                None => println!("(empty)"),
            }
        }
        Commands::Workspace {
            workspace_cmd: WorkspaceCommands::List,
        } => {
            let state = load_state(&state_path)?;
            for workspace in state.workspaces_by_number() {
                let marker = if workspace.id == state.active_workspace_id { "*" } else { " " };
                println!(
                    "{marker} {:>3} {:<16} {:>3} window(s)  {}",
                    workspace.number,
                    workspace.display_name(),
                    workspace.window_count(),
                    workspace.id
                );
            }
        }
        command => {
            let state = load_state(&state_path)?;
            let command = to_layout_command(&state, command)?;
            commit(&state_path, &state, command)?;
        }
    }
    Ok(())
}

fn to_layout_command(state: &AppState, command: Commands) -> anyhow::Result<LayoutCommand> {
    let command = match command {
        Commands::Open {
            app_id,
            props,
            command,
            title,
        } => {
            let props = match props {
                Some(raw) => serde_json::from_str(&raw).context("--props is not valid JSON")?,
                None => Value::Object(Default::default()),
            };
            let mut spec = WindowSpec::new(app_id, props);
            if let Some(command) = command {
                spec = spec.with_command_string(command);
            }
            if let Some(title) = title {
                spec = spec.with_custom_title(title);
            }
            LayoutCommand::OpenWindow(spec)
        }
        Commands::Close { window_id } => LayoutCommand::CloseWindow(WindowId::new(window_id)),
        Commands::Move {
            window_id,
            workspace,
        } => LayoutCommand::MoveWindowToWorkspace {
            window: WindowId::new(window_id),
            workspace: resolve_workspace(state, &workspace),
        },
        Commands::Workspace { workspace_cmd } => match workspace_cmd {
            WorkspaceCommands::Create { label } => LayoutCommand::CreateWorkspace { label },
            WorkspaceCommands::Delete { workspace } => {
                LayoutCommand::DeleteWorkspace(resolve_workspace(state, &workspace))
            }
            WorkspaceCommands::Switch { workspace } => {
                LayoutCommand::SwitchWorkspace(resolve_workspace(state, &workspace))
            }
            WorkspaceCommands::Next => LayoutCommand::NextWorkspace,
            WorkspaceCommands::Prev => LayoutCommand::PrevWorkspace,
            WorkspaceCommands::Rename { workspace, label } => LayoutCommand::RenameWorkspace {
                workspace: resolve_workspace(state, &workspace),
                label,
            },
            WorkspaceCommands::List => bail!("list does not change the state"),
        },
        Commands::Init { .. }
        | Commands::Tree { .. }
        | Commands::Check
        | Commands::Config { .. } => bail!("not a state change"),
    };
    Ok(command)
}

fn commit(path: &Path, state: &AppState, command: LayoutCommand) -> anyhow::Result<()> {
    debug!(?command, "applying");
    let response = layout::apply(state, command)?;
    response.state.save(path)?;
    if let Some(window) = response.window {
        println!("{window}");
    }
    if let Some(workspace) = response.workspace {
        println!("{workspace}");
    }
    Ok(())
}

fn load_state(path: &Path) -> anyhow::Result<AppState> {
    if !path.exists() {
        bail!("no state at {} (run `tessera init` first)", path.display());
    }
    AppState::load(path).with_context(|| format!("loading {}", path.display()))
}

/// Accepts a workspace number or a raw id.
fn resolve_workspace(state: &AppState, target: &str) -> WorkspaceId {
    target
        .parse::<u32>()
        .ok()
        .and_then(|number| state.workspace_by_number(number))
        .map(|workspace| workspace.id.clone())
        .unwrap_or_else(|| WorkspaceId::new(target))
}
