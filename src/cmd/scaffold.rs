//! Scaffold command: generate a new module and wire it into the project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use edgecraft::detect::detect_project_structure;
use edgecraft::manifest;
use edgecraft::scaffold::{
    self, load_all_templates, parse_var_args, pascal_case, ScaffoldPlan,
};
use edgecraft::solution::{self, SlnxAction, SolutionKind};

/// Options for the scaffold command, mirroring its CLI flags.
pub struct ScaffoldOptions {
    pub registry: Option<String>,
    pub namespace: Option<String>,
    pub nuget_feed: Option<String>,
    pub vars: Vec<String>,
    pub no_volume: bool,
    pub no_manifest: bool,
    pub manifest: Option<String>,
    pub no_solution: bool,
    pub force: bool,
    pub yes: bool,
}

/// Resolve a required value from flag, detected config, or an interactive
/// prompt. Runs with `--yes` or without a TTY never prompt; they fail with a
/// pointer to the flag.
fn resolve_required(
    flag: Option<String>,
    detected: Option<String>,
    prompt: &str,
    flag_name: &str,
    never_prompt: bool,
) -> Result<String> {
    if let Some(value) = flag {
        return Ok(value);
    }
    if let Some(value) = detected {
        return Ok(value);
    }
    if !never_prompt && atty::is(atty::Stream::Stdin) {
        let value: String = dialoguer::Input::new()
            .with_prompt(prompt)
            .interact_text()?;
        return Ok(value);
    }
    anyhow::bail!(
        "Could not detect {} and prompting is disabled. Pass {} explicitly.",
        prompt.to_lowercase(),
        flag_name
    );
}

/// Scaffold a new module under the detected (or given) modules base path,
/// then patch the deployment manifest and solution file.
pub fn cmd_scaffold(name: &str, root: &Path, opts: ScaffoldOptions) -> Result<()> {
    scaffold::validate_module_name(name)?;

    let config = detect_project_structure(root, false);

    let registry = resolve_required(
        opts.registry,
        config.container_registry.clone(),
        "Container registry",
        "--registry",
        opts.yes,
    )?;
    let namespace = resolve_required(
        opts.namespace,
        config.project_namespace.clone(),
        "Project namespace",
        "--namespace",
        opts.yes,
    )?;
    let nuget_feed = opts
        .nuget_feed
        .or_else(|| config.nuget_feed_url.clone())
        .unwrap_or_default();
    let modules_base = config
        .modules_base_path
        .clone()
        .unwrap_or_else(|| "modules".to_string());

    let mut variables = parse_var_args(&opts.vars)?;
    variables.insert("registry".to_string(), registry);
    variables.insert("namespace".to_string(), namespace);
    variables.insert("nuget_feed_url".to_string(), nuget_feed);

    // An existing module directory is only replaced on --force or explicit
    // confirmation; declining leaves the first scaffold untouched.
    let module_dir = root.join(&modules_base).join(name);
    let mut overwrite = opts.force;
    if module_dir.exists() && !overwrite {
        if opts.yes {
            anyhow::bail!(
                "Module directory already exists: {}. Use --force to overwrite.",
                module_dir.display()
            );
        }
        if atty::is(atty::Stream::Stdin) {
            overwrite = dialoguer::Confirm::new()
                .with_prompt(format!(
                    "{} already exists. Overwrite?",
                    module_dir.display()
                ))
                .default(false)
                .interact()?;
            if !overwrite {
                println!("{}", "Leaving existing module untouched.".yellow());
                return Ok(());
            }
        } else {
            anyhow::bail!(
                "Module directory already exists: {}. Use --force to overwrite.",
                module_dir.display()
            );
        }
    }

    let templates = load_all_templates(root)?;
    let plan = ScaffoldPlan {
        module_name: name.to_string(),
        variables,
        overwrite,
    };
    let report = scaffold::scaffold_module(root, &modules_base, &plan, &templates)?;

    println!(
        "{} Scaffolded module {} ({} files)",
        "✓".green(),
        name.cyan().bold(),
        report.files.len()
    );
    for file in &report.files {
        println!("  {} {}/{}", "Created".green(), report.module_dir.display(), file);
    }

    if !opts.no_manifest {
        patch_manifest(root, name, &config.manifests_found, opts.manifest, !opts.no_volume)?;
    }

    if !opts.no_solution {
        update_solution(root, &modules_base, name)?;
    }

    Ok(())
}

/// Choose and patch a deployment manifest. With several candidates and no
/// explicit choice, a TTY gets a picker and a non-TTY run skips the patch.
fn patch_manifest(
    root: &Path,
    name: &str,
    found: &[String],
    explicit: Option<String>,
    with_volume: bool,
) -> Result<()> {
    let manifest_path = match explicit {
        Some(path) => Some(path),
        None => match found.len() {
            0 => {
                println!(
                    "{} No deployment manifest found; skipping manifest update.",
                    "•".yellow()
                );
                None
            }
            1 => Some(found[0].clone()),
            _ => {
                if atty::is(atty::Stream::Stdin) {
                    let selection = dialoguer::Select::new()
                        .with_prompt("Which deployment manifest should include the module?")
                        .items(found)
                        .default(0)
                        .interact()?;
                    Some(found[selection].clone())
                } else {
                    println!(
                        "{} Multiple manifests found; pass --manifest to pick one.",
                        "•".yellow()
                    );
                    None
                }
            }
        },
    };

    let Some(manifest_path) = manifest_path else {
        return Ok(());
    };

    let outcome = manifest::update_file(&root.join(&manifest_path), name, with_volume)
        .with_context(|| format!("Failed to update manifest {}", manifest_path))?;
    println!(
        "{} Updated {} (startupOrder {}, route {})",
        "✓".green(),
        manifest_path.cyan(),
        outcome.startup_order,
        outcome.route_added.cyan()
    );

    Ok(())
}

/// Add the new module's csproj to the solution file, if one exists.
fn update_solution(root: &Path, modules_base: &str, name: &str) -> Result<()> {
    let csproj_path = format!("{}/{}/{}.csproj", modules_base, name, pascal_case(name));

    match solution::find_solution_file(root) {
        Some(found) if found.kind == SolutionKind::Slnx => {
            match solution::add_project_to_slnx(&found.path, &csproj_path)? {
                SlnxAction::Added { position, total } => {
                    println!(
                        "{} Added {} to {} (position {} of {})",
                        "✓".green(),
                        csproj_path.cyan(),
                        found.path.display(),
                        position,
                        total
                    );
                }
                SlnxAction::AlreadyExists => {
                    println!(
                        "{} {} already in {}",
                        "•".cyan(),
                        csproj_path,
                        found.path.display()
                    );
                }
            }
        }
        Some(found) => {
            println!(
                "{} Solution {} uses the legacy .sln format.",
                "•".yellow(),
                found.path.display()
            );
            println!("{}", solution::sln_instructions(&csproj_path, &pascal_case(name)));
        }
        None => {
            println!("{} No solution file found; skipping.", "•".dimmed());
        }
    }

    Ok(())
}
