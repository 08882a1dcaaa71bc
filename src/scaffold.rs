//! Module templates and scaffolding.
//!
//! Templates are markdown files with YAML frontmatter and a body holding the
//! generated file content with `{{variable}}` placeholders:
//!
//! ```markdown
//! ---
//! name: program
//! description: Module entry point
//! output: Program.cs
//! variables:
//!   - name: namespace
//!     description: Base project namespace
//!     required: true
//! ---
//! namespace {{namespace}}.Modules.{{module_pascal}};
//! ...
//! ```
//!
//! Bundled templates are embedded in the binary; files in
//! `.edgecraft/templates/` override bundled templates with the same name.
//! Substitution is total: rendering fails if any `{{...}}` token survives.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::TEMPLATES_DIR;

/// Embedded templates shipped with the binary
const MODULE_JSON_TEMPLATE: &str = include_str!("../templates/module-json.md");
const PROGRAM_TEMPLATE: &str = include_str!("../templates/program-cs.md");
const CSPROJ_TEMPLATE: &str = include_str!("../templates/csproj.md");
const DOCKERFILE_TEMPLATE: &str = include_str!("../templates/dockerfile.md");
const APPSETTINGS_TEMPLATE: &str = include_str!("../templates/appsettings.md");

const BUNDLED: &[&str] = &[
    MODULE_JSON_TEMPLATE,
    PROGRAM_TEMPLATE,
    CSPROJ_TEMPLATE,
    DOCKERFILE_TEMPLATE,
    APPSETTINGS_TEMPLATE,
];

/// A variable definition within a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateVariable {
    /// Name of the variable (used in {{name}} placeholders)
    pub name: String,
    /// Description of what this variable is for
    #[serde(default)]
    pub description: String,
    /// Whether this variable must be provided (no default)
    #[serde(default)]
    pub required: bool,
    /// Default value if not provided
    #[serde(default)]
    pub default: Option<String>,
}

/// Template frontmatter with metadata and variable definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateFrontmatter {
    /// Template name (identifier)
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Output path relative to the module directory, may contain placeholders
    pub output: String,
    /// Variable definitions
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
}

/// Where a template was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    /// Embedded in the binary
    Bundled,
    /// From the user's config directory
    User,
    /// From the project's .edgecraft/templates/
    Project,
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::Bundled => write!(f, "bundled"),
            TemplateSource::User => write!(f, "user"),
            TemplateSource::Project => write!(f, "project"),
        }
    }
}

/// A module file template with its metadata and content
#[derive(Debug, Clone)]
pub struct ModuleTemplate {
    /// Template name
    pub name: String,
    /// Parsed frontmatter
    pub frontmatter: TemplateFrontmatter,
    /// Template body (with {{variable}} placeholders)
    pub body: String,
    /// Source location (bundled or project)
    pub source: TemplateSource,
}

impl ModuleTemplate {
    /// Parse a template from file content.
    pub fn parse(content: &str, source: TemplateSource) -> Result<Self> {
        let (frontmatter_str, body) = split_frontmatter(content);

        let frontmatter: TemplateFrontmatter = if let Some(fm) = frontmatter_str {
            serde_yaml::from_str(&fm).context("Failed to parse template frontmatter")?
        } else {
            anyhow::bail!("Template must have YAML frontmatter with 'name' and 'output' fields");
        };

        if frontmatter.name.is_empty() {
            anyhow::bail!("Template 'name' field is required and cannot be empty");
        }
        if frontmatter.output.is_empty() {
            anyhow::bail!("Template 'output' field is required and cannot be empty");
        }

        Ok(Self {
            name: frontmatter.name.clone(),
            frontmatter,
            body: body.to_string(),
            source,
        })
    }

    /// Load a template from a file path.
    pub fn load(path: &Path, source: TemplateSource) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read template from {}", path.display()))?;
        Self::parse(&content, source)
    }

    /// Get list of required variables that don't have defaults
    pub fn required_variables(&self) -> Vec<&TemplateVariable> {
        self.frontmatter
            .variables
            .iter()
            .filter(|v| v.required && v.default.is_none())
            .collect()
    }

    /// Check that all required variables are provided
    pub fn validate_variables(&self, provided: &HashMap<String, String>) -> Result<()> {
        let missing: Vec<_> = self
            .required_variables()
            .iter()
            .filter(|v| !provided.contains_key(&v.name))
            .map(|v| v.name.as_str())
            .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "Template '{}' is missing required variable(s): {}",
                self.name,
                missing.join(", ")
            );
        }

        Ok(())
    }

    /// Substitute variables in a string using {{variable}} syntax.
    /// Unknown placeholders are left in place for the leftover check.
    pub fn substitute(&self, text: &str, variables: &HashMap<String, String>) -> String {
        let re = Regex::new(r"\{\{(\w+)\}\}").unwrap();

        re.replace_all(text, |caps: &regex::Captures| {
            let var_name = &caps[1];

            if let Some(value) = variables.get(var_name) {
                return value.clone();
            }

            if let Some(var_def) = self
                .frontmatter
                .variables
                .iter()
                .find(|v| v.name == var_name)
            {
                if let Some(ref default) = var_def.default {
                    return default.clone();
                }
            }

            caps[0].to_string()
        })
        .to_string()
    }

    /// Render the output path for this template.
    pub fn render_output_path(&self, variables: &HashMap<String, String>) -> Result<String> {
        let rendered = self.substitute(&self.frontmatter.output, variables);
        ensure_total(&self.name, "output path", &rendered)?;
        Ok(rendered)
    }

    /// Render the file content from this template.
    ///
    /// Fails if a required variable is missing or any placeholder survives
    /// substitution.
    pub fn render(&self, variables: &HashMap<String, String>) -> Result<String> {
        self.validate_variables(variables)?;
        let rendered = self.substitute(&self.body, variables);
        ensure_total(&self.name, "body", &rendered)?;
        Ok(rendered)
    }
}

/// Fail if any `{{...}}` token remains after substitution.
fn ensure_total(template_name: &str, what: &str, rendered: &str) -> Result<()> {
    let leftover_re = Regex::new(r"\{\{\s*[\w.]+\s*\}\}").unwrap();
    let leftovers: Vec<_> = leftover_re
        .find_iter(rendered)
        .map(|m| m.as_str().to_string())
        .collect();

    if !leftovers.is_empty() {
        anyhow::bail!(
            "Template '{}' {} has unresolved placeholder(s): {}",
            template_name,
            what,
            leftovers.join(", ")
        );
    }
    Ok(())
}

/// Split content into frontmatter and body.
/// Returns (Some(frontmatter), body) if frontmatter exists, otherwise (None, full_content).
fn split_frontmatter(content: &str) -> (Option<String>, &str) {
    let content = content.trim_start();

    if !content.starts_with("---") {
        return (None, content);
    }

    let after_first = &content[3..];
    if let Some(end_pos) = after_first.find("\n---") {
        let frontmatter = after_first[..end_pos].trim();
        let body_start = 3 + end_pos + 4; // "---" + frontmatter + "\n---"
        let body = if body_start < content.len() {
            content[body_start..].trim_start_matches('\n')
        } else {
            ""
        };
        (Some(frontmatter.to_string()), body)
    } else {
        (None, content)
    }
}

/// Load the bundled templates embedded in the binary.
pub fn bundled_templates() -> Result<Vec<ModuleTemplate>> {
    BUNDLED
        .iter()
        .map(|content| ModuleTemplate::parse(content, TemplateSource::Bundled))
        .collect()
}

/// The user-level template directory, shared across projects.
pub fn user_templates_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("edgecraft").join("templates"))
}

fn load_templates_from_dir(
    dir: &Path,
    source: TemplateSource,
    by_name: &mut HashMap<String, ModuleTemplate>,
) -> Result<()> {
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            match ModuleTemplate::load(&path, source) {
                Ok(template) => {
                    by_name.insert(template.name.clone(), template);
                }
                Err(e) => {
                    eprintln!("Warning: Failed to load template {}: {}", path.display(), e);
                }
            }
        }
    }
    Ok(())
}

/// Load all templates for a project, keyed by name and sorted. Project
/// templates in `.edgecraft/templates/` override user templates, which
/// override the bundled set.
pub fn load_all_templates(root: &Path) -> Result<Vec<ModuleTemplate>> {
    let mut by_name: HashMap<String, ModuleTemplate> = HashMap::new();

    for template in bundled_templates()? {
        by_name.insert(template.name.clone(), template);
    }

    if let Some(user_dir) = user_templates_dir() {
        if user_dir.exists() {
            load_templates_from_dir(&user_dir, TemplateSource::User, &mut by_name)?;
        }
    }

    let project_dir = root.join(TEMPLATES_DIR);
    if project_dir.exists() {
        load_templates_from_dir(&project_dir, TemplateSource::Project, &mut by_name)?;
    }

    let mut templates: Vec<_> = by_name.into_values().collect();
    templates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(templates)
}

/// Find a template by name (project overrides take precedence).
pub fn find_template(root: &Path, name: &str) -> Result<ModuleTemplate> {
    load_all_templates(root)?
        .into_iter()
        .find(|t| t.name == name)
        .ok_or_else(|| anyhow::anyhow!("Template '{}' not found", name))
}

/// Validate a module name: lowercase alphanumeric with inner hyphens.
pub fn validate_module_name(name: &str) -> Result<()> {
    let re = Regex::new(r"^[a-z][a-z0-9-]*[a-z0-9]$|^[a-z]$").unwrap();
    if !re.is_match(name) {
        anyhow::bail!(
            "Invalid module name '{}'. Use lowercase letters, digits and hyphens, \
             starting with a letter (e.g. 'telemetry-filter').",
            name
        );
    }
    Ok(())
}

/// PascalCase form of a module name: `telemetry-filter` -> `TelemetryFilter`.
pub fn pascal_case(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Parse a list of "key=value" strings into a HashMap.
pub fn parse_var_args(var_args: &[String]) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();

    for arg in var_args {
        let parts: Vec<&str> = arg.splitn(2, '=').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid variable format '{}'. Expected 'key=value'.", arg);
        }
        vars.insert(parts[0].to_string(), parts[1].to_string());
    }

    Ok(vars)
}

/// A fully resolved scaffold request.
#[derive(Debug, Clone)]
pub struct ScaffoldPlan {
    /// Lowercase module name
    pub module_name: String,
    /// Variables for substitution (module_name and module_pascal are filled
    /// in automatically)
    pub variables: HashMap<String, String>,
    /// Replace an existing module directory instead of failing
    pub overwrite: bool,
}

/// Files written by a scaffold run.
#[derive(Debug)]
pub struct ScaffoldReport {
    /// The module directory that was created
    pub module_dir: PathBuf,
    /// Paths of all files written, relative to the module directory
    pub files: Vec<String>,
}

/// Render all templates for a new module into `<modules_base>/<name>/`.
///
/// All templates are rendered before anything is written, so a substitution
/// failure leaves the tree untouched. An existing module directory is a hard
/// stop unless the plan allows overwriting; in that case existing files are
/// replaced but unknown files in the directory are left alone.
pub fn scaffold_module(
    root: &Path,
    modules_base: &str,
    plan: &ScaffoldPlan,
    templates: &[ModuleTemplate],
) -> Result<ScaffoldReport> {
    validate_module_name(&plan.module_name)?;

    let mut variables = plan.variables.clone();
    variables.insert("module_name".to_string(), plan.module_name.clone());
    variables.insert(
        "module_pascal".to_string(),
        pascal_case(&plan.module_name),
    );

    let module_dir = root.join(modules_base).join(&plan.module_name);
    if module_dir.exists() && !plan.overwrite {
        anyhow::bail!(
            "Module directory already exists: {}. Re-run with --force to overwrite.",
            module_dir.display()
        );
    }

    // Render everything up front; nothing is written on failure
    let mut rendered: Vec<(String, String)> = Vec::new();
    for template in templates {
        let output_path = template.render_output_path(&variables)?;
        let content = template.render(&variables)?;
        rendered.push((output_path, content));
    }

    fs::create_dir_all(&module_dir)
        .with_context(|| format!("Failed to create {}", module_dir.display()))?;

    let mut files = Vec::new();
    for (output_path, content) in rendered {
        let target = module_dir.join(&output_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&target, content)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        files.push(output_path);
    }

    Ok(ScaffoldReport { module_dir, files })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_frontmatter() {
        let content = "---\nname: test\noutput: out.txt\n---\n\nbody\n";
        let (fm, body) = split_frontmatter(content);
        assert!(fm.is_some());
        assert_eq!(fm.unwrap(), "name: test\noutput: out.txt");
        assert_eq!(body, "body\n");
    }

    #[test]
    fn test_split_frontmatter_no_frontmatter() {
        let content = "just body\n";
        let (fm, body) = split_frontmatter(content);
        assert!(fm.is_none());
        assert_eq!(body, "just body\n");
    }

    #[test]
    fn test_parse_template() {
        let content = r#"---
name: program
description: Module entry point
output: Program.cs
variables:
  - name: namespace
    required: true
  - name: nuget_feed_url
    default: ""
---
namespace {{namespace}}.Modules.{{module_pascal}};
"#;
        let template = ModuleTemplate::parse(content, TemplateSource::Project).unwrap();
        assert_eq!(template.name, "program");
        assert_eq!(template.frontmatter.output, "Program.cs");
        assert_eq!(template.frontmatter.variables.len(), 2);
        assert!(template.frontmatter.variables[0].required);
    }

    #[test]
    fn test_parse_template_requires_output() {
        let content = "---\nname: test\n---\nbody\n";
        assert!(ModuleTemplate::parse(content, TemplateSource::Project).is_err());
    }

    #[test]
    fn test_substitution_with_defaults() {
        let content = r#"---
name: test
output: out.txt
variables:
  - name: x
    required: true
  - name: y
    default: fallback
---
{{x}} and {{y}}
"#;
        let template = ModuleTemplate::parse(content, TemplateSource::Project).unwrap();

        let mut vars = HashMap::new();
        vars.insert("x".to_string(), "value".to_string());
        assert_eq!(template.render(&vars).unwrap(), "value and fallback\n");
    }

    #[test]
    fn test_render_missing_required_variable_fails() {
        let content = "---\nname: test\noutput: out.txt\nvariables:\n  - name: x\n    required: true\n---\n{{x}}\n";
        let template = ModuleTemplate::parse(content, TemplateSource::Project).unwrap();

        let err = template.render(&HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("x"));
    }

    #[test]
    fn test_render_leftover_placeholder_fails() {
        // `undeclared` is not a declared variable and not provided
        let content = "---\nname: test\noutput: out.txt\n---\nhas {{undeclared}} token\n";
        let template = ModuleTemplate::parse(content, TemplateSource::Project).unwrap();

        let err = template.render(&HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("unresolved placeholder"));
        assert!(err.to_string().contains("{{undeclared}}"));
    }

    #[test]
    fn test_bundled_templates_parse() {
        let templates = bundled_templates().unwrap();
        assert_eq!(templates.len(), 5);
        for template in &templates {
            assert!(!template.name.is_empty());
            assert!(!template.frontmatter.output.is_empty());
        }
    }

    #[test]
    fn test_bundled_templates_render_totally() {
        let mut vars = HashMap::new();
        vars.insert("module_name".to_string(), "heartbeat".to_string());
        vars.insert("module_pascal".to_string(), "Heartbeat".to_string());
        vars.insert("namespace".to_string(), "Contoso.Edge".to_string());
        vars.insert("registry".to_string(), "contoso.azurecr.io".to_string());

        for template in bundled_templates().unwrap() {
            let rendered = template.render(&vars).unwrap();
            assert!(
                !rendered.contains("{{"),
                "template '{}' left a placeholder",
                template.name
            );
        }
    }

    #[test]
    fn test_validate_module_name() {
        assert!(validate_module_name("telemetry").is_ok());
        assert!(validate_module_name("telemetry-filter").is_ok());
        assert!(validate_module_name("mod2").is_ok());
        assert!(validate_module_name("a").is_ok());

        assert!(validate_module_name("Telemetry").is_err());
        assert!(validate_module_name("2fast").is_err());
        assert!(validate_module_name("bad_name").is_err());
        assert!(validate_module_name("trailing-").is_err());
        assert!(validate_module_name("").is_err());
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("telemetry"), "Telemetry");
        assert_eq!(pascal_case("telemetry-filter"), "TelemetryFilter");
        assert_eq!(pascal_case("a-b-c"), "ABC");
    }

    #[test]
    fn test_parse_var_args() {
        let args = vec!["key=value".to_string(), "url=https://x/y=z".to_string()];
        let vars = parse_var_args(&args).unwrap();
        assert_eq!(vars.get("key"), Some(&"value".to_string()));
        assert_eq!(vars.get("url"), Some(&"https://x/y=z".to_string()));

        assert!(parse_var_args(&["no-equals".to_string()]).is_err());
    }
}
