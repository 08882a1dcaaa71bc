//! Template commands: list and show module templates.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use edgecraft::scaffold::{find_template, load_all_templates};

/// List available module templates (bundled plus project overrides).
pub fn cmd_template_list(root: &Path) -> Result<()> {
    let templates = load_all_templates(root)?;

    println!("{}", "Module templates:".bold());
    for template in &templates {
        println!(
            "  {:<14} {:<24} {} {}",
            template.name.cyan(),
            template.frontmatter.output,
            format!("[{}]", template.source).dimmed(),
            template.frontmatter.description.dimmed()
        );
    }
    println!();
    println!(
        "{}",
        format!(
            "Place overrides in {} to replace bundled templates by name.",
            edgecraft::paths::TEMPLATES_DIR
        )
        .dimmed()
    );

    Ok(())
}

/// Show one template's variables and body.
pub fn cmd_template_show(root: &Path, name: &str) -> Result<()> {
    let template = find_template(root, name)?;

    println!("{} {}", "Template".bold(), template.name.cyan());
    println!("  {:<12} {}", "Source:", template.source);
    println!("  {:<12} {}", "Output:", template.frontmatter.output);
    if !template.frontmatter.description.is_empty() {
        println!("  {:<12} {}", "Description:", template.frontmatter.description);
    }

    if !template.frontmatter.variables.is_empty() {
        println!("  {}", "Variables:".bold());
        for var in &template.frontmatter.variables {
            let requirement = if var.required && var.default.is_none() {
                "required".red().to_string()
            } else if let Some(ref default) = var.default {
                format!("default: {:?}", default).dimmed().to_string()
            } else {
                "optional".dimmed().to_string()
            };
            println!("    {:<16} {} {}", var.name.cyan(), requirement, var.description.dimmed());
        }
    }

    println!();
    println!("{}", template.body);

    Ok(())
}
