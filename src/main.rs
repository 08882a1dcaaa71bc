//! CLI entry point and command dispatch for edgecraft.

mod cmd;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "edgecraft")]
#[command(version)]
#[command(about = "Scaffolding for Azure IoT Edge modules", long_about = None)]
#[command(
    after_help = "GETTING STARTED:\n    edgecraft detect --save     Scan the project and cache its conventions\n    edgecraft scaffold <name>   Generate a new module wired into manifests and solution"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect project structure (module layout, namespace, registry, feeds)
    Detect {
        /// Root directory of the project
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Force re-detection, ignore saved configuration
        #[arg(long)]
        force: bool,
        /// Save the detected configuration for future runs
        #[arg(long)]
        save: bool,
        /// JSON output
        #[arg(long)]
        json: bool,
    },
    /// List deployment manifests with module and route counts
    Scan {
        /// Root directory of the project
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// JSON output
        #[arg(long)]
        json: bool,
    },
    /// Scaffold a new module and wire it into the manifest and solution
    Scaffold {
        /// Lowercase module name (e.g. telemetry-filter)
        name: String,
        /// Root directory of the project
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Container registry host (overrides detection)
        #[arg(long)]
        registry: Option<String>,
        /// Base project namespace (overrides detection)
        #[arg(long)]
        namespace: Option<String>,
        /// Private NuGet feed URL (overrides detection)
        #[arg(long)]
        nuget_feed: Option<String>,
        /// Set extra template variable (can be specified multiple times, format: key=value)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
        /// Don't mount a data volume in the module definition
        #[arg(long)]
        no_volume: bool,
        /// Skip the deployment manifest update
        #[arg(long)]
        no_manifest: bool,
        /// Deployment manifest to update (relative to root)
        #[arg(long, value_name = "PATH")]
        manifest: Option<String>,
        /// Skip the solution file update
        #[arg(long)]
        no_solution: bool,
        /// Overwrite an existing module directory
        #[arg(long)]
        force: bool,
        /// Never prompt; fail instead of asking
        #[arg(long)]
        yes: bool,
    },
    /// Inspect or patch a single deployment manifest
    Manifest {
        #[command(subcommand)]
        command: ManifestCommands,
    },
    /// Solution file management
    Solution {
        #[command(subcommand)]
        command: SolutionCommands,
    },
    /// Manage module templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Strip trailing newlines from .NET source files (SA1518)
    Tidy {
        /// Directory to clean (default: current directory)
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate shell completion script
    Completion {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Subcommands for manifest management
#[derive(Subcommand)]
enum ManifestCommands {
    /// Add a module definition and default route to a manifest
    Add {
        /// Path to the deployment manifest
        manifest: PathBuf,
        /// Lowercase module name
        name: String,
        /// Don't mount a data volume in the module definition
        #[arg(long)]
        no_volume: bool,
    },
    /// Show module and route metadata for a manifest
    Show {
        /// Path to the deployment manifest
        manifest: PathBuf,
        /// JSON output
        #[arg(long)]
        json: bool,
    },
}

/// Subcommands for solution management
#[derive(Subcommand)]
enum SolutionCommands {
    /// Detect the solution file type and location
    Detect {
        /// Root directory to search
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Add a project to the solution (auto for .slnx, instructions for .sln)
    Add {
        /// Relative path to the .csproj to add
        csproj: String,
        /// Root directory to search for the solution file
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Project name (for .sln instructions; defaults to the csproj stem)
        #[arg(long)]
        name: Option<String>,
    },
}

/// Subcommands for template management
#[derive(Subcommand)]
enum TemplateCommands {
    /// List available templates
    List {
        /// Root directory of the project (for overrides)
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Show template details
    Show {
        /// Template name
        name: String,
        /// Root directory of the project (for overrides)
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            root,
            force,
            save,
            json,
        } => cmd::detect::cmd_detect(&root, force, save, json),
        Commands::Scan { root, json } => cmd::scan::cmd_scan(&root, json),
        Commands::Scaffold {
            name,
            root,
            registry,
            namespace,
            nuget_feed,
            vars,
            no_volume,
            no_manifest,
            manifest,
            no_solution,
            force,
            yes,
        } => cmd::scaffold::cmd_scaffold(
            &name,
            &root,
            cmd::scaffold::ScaffoldOptions {
                registry,
                namespace,
                nuget_feed,
                vars,
                no_volume,
                no_manifest,
                manifest,
                no_solution,
                force,
                yes,
            },
        ),
        Commands::Manifest { command } => match command {
            ManifestCommands::Add {
                manifest,
                name,
                no_volume,
            } => cmd::manifest::cmd_manifest_add(&manifest, &name, no_volume),
            ManifestCommands::Show { manifest, json } => {
                cmd::manifest::cmd_manifest_show(&manifest, json)
            }
        },
        Commands::Solution { command } => match command {
            SolutionCommands::Detect { root } => cmd::solution::cmd_solution_detect(&root),
            SolutionCommands::Add { csproj, root, name } => {
                cmd::solution::cmd_solution_add(&root, &csproj, name.as_deref())
            }
        },
        Commands::Template { command } => match command {
            TemplateCommands::List { root } => cmd::template::cmd_template_list(&root),
            TemplateCommands::Show { name, root } => cmd::template::cmd_template_show(&root, &name),
        },
        Commands::Tidy { dir, dry_run } => cmd::tidy::cmd_tidy(&dir, dry_run),
        Commands::Completion { shell } => cmd_completion(shell),
    }
}

/// Generate shell completion script
fn cmd_completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "edgecraft", &mut io::stdout());
    Ok(())
}
