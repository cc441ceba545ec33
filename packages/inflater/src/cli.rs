//! Command-line interface for the layout inflater.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;

use crate::binder::{FieldBinder, LayoutBuilder};
use crate::config::InflaterConfig;
use crate::error::Result;
use crate::inflater::{Layout, NodeSnapshot};

/// Layout Inflater - Build component trees from declarative XML layouts.
#[derive(Parser)]
#[command(name = "layout-inflater")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inflate a layout and print its component tree.
    Inflate {
        /// Layout file
        file: PathBuf,

        /// Prefix prepended to every id
        #[arg(long)]
        id_prefix: Option<String>,

        /// Id owned by the controller (repeatable)
        #[arg(long = "reserve", value_name = "ID")]
        reserved: Vec<String>,

        /// Inflater config file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Inflate a layout and report whether it is valid.
    Check {
        /// Layout file
        file: PathBuf,

        /// Inflater config file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// How `inflate` prints the component tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented outline
    Text,
    /// YAML snapshot
    Yaml,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inflate {
            file,
            id_prefix,
            reserved,
            config,
            format,
        } => {
            let mut settings = load_config(config.as_deref())?;
            if let Some(prefix) = id_prefix {
                settings.id_prefix = Some(prefix);
            }
            settings.reserved_ids.extend(reserved);
            inflate_command(&file, &settings, format)
        }
        Commands::Check { file, config } => {
            let settings = load_config(config.as_deref())?;
            check_command(&file, &settings)
        }
    }
}

/// Load the config file, or the defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<InflaterConfig> {
    match path {
        Some(path) => InflaterConfig::load(path),
        None => Ok(InflaterConfig::default()),
    }
}

/// Inflate `file` with the settings, binding it to a binder that only
/// reserves the configured ids.
fn inflate_file(file: &Path, settings: &InflaterConfig) -> Result<Layout> {
    settings.validate()?;

    let document_dir = file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut settings = settings.clone();
    if let Some(root) = &settings.fragment_root {
        if !root.is_dir() {
            tracing::warn!(
                fragment_root = %root.display(),
                "Fragment root is not a directory, loading fragments next to the layout"
            );
            settings.fragment_root = None;
        }
    }

    let builder = LayoutBuilder::from_config(&settings, document_dir)?;
    let mut binder = settings
        .reserved_ids
        .iter()
        .fold(FieldBinder::new(), |binder, id| binder.with_assigned(id.clone()));

    builder.create_from_file(file, &mut binder)
}

/// Execute the inflate command.
fn inflate_command(file: &Path, settings: &InflaterConfig, format: OutputFormat) -> Result<()> {
    let layout = inflate_file(file, settings)?;
    let snapshot = layout.snapshot();

    match format {
        OutputFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&snapshot).map_err(std::io::Error::other)?;
            print!("{yaml}");
        }
        OutputFormat::Text => {
            println!(
                "{} {} ({} components, {} ids)",
                style("Inflated").bold(),
                style(file.display()).cyan(),
                layout.tree().len(),
                layout.ids().len()
            );
            println!();
            print!("{}", render_outline(&snapshot));
        }
    }

    Ok(())
}

/// Execute the check command.
fn check_command(file: &Path, settings: &InflaterConfig) -> Result<()> {
    let layout = inflate_file(file, settings)?;

    println!(
        "{} {} ({} components, {} ids)",
        style("OK").green().bold(),
        file.display(),
        layout.tree().len(),
        layout.ids().len()
    );
    Ok(())
}

/// Render a snapshot as an indented outline, one component per line.
pub fn render_outline(snapshot: &NodeSnapshot) -> String {
    let mut out = String::new();
    render_node(snapshot, 0, &mut out);
    out
}

fn render_node(node: &NodeSnapshot, depth: usize, out: &mut String) {
    let _ = write!(out, "{}{}", "  ".repeat(depth), style(&node.tag).bold());
    if let Some(id) = &node.id {
        let _ = write!(out, " {}", style(format!("#{id}")).cyan());
    }
    let _ = write!(out, " {}", style(&node.component_type).dim());

    for (name, value) in &node.properties {
        let _ = write!(out, " {name}={}", style(value).green());
    }
    for (name, value) in &node.slot {
        let _ = write!(out, " {}={}", style(format!("p:{name}")).yellow(), style(value).green());
    }
    out.push('\n');

    for child in &node.children {
        render_node(child, depth + 1, out);
    }
}
