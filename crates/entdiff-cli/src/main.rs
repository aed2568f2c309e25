//! Command-line front end for the entdiff change detector.
//!
//! Compares an initial and a current entity graph under a schema registry
//! and prints the rendered change set. The exit status is 0 when the graphs
//! match, 1 when they differ and 2 when the comparison could not be made.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use entdiff_core::{ChangeDetector, Changes, Node, RenderConfig, SchemaRegistry};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const EXIT_SAME: i32 = 0;
const EXIT_DIFFERENT: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "entdiff",
    version,
    about = "Identity-aware diff of JSON and YAML entity graphs.",
    override_usage = "entdiff [OPTIONS] --schema <FILE> <INITIAL> [CURRENT]",
    after_help = "When CURRENT is omitted the current graph is read from STDIN.\n\
                  Exit status: 0 no changes, 1 changes found, 2 error."
)]
struct Cli {
    /// Schema registry file, parsed as YAML for .yaml/.yml and JSON otherwise.
    #[arg(short = 's', long = "schema", value_name = "FILE")]
    schema: PathBuf,

    /// Override the discriminator field named by the schema file.
    #[arg(long = "type-field", value_name = "FIELD")]
    type_field: Option<String>,

    /// Override the identity field named by the schema file.
    #[arg(long = "id-field", value_name = "FIELD")]
    id_field: Option<String>,

    /// Read both graphs as YAML instead of JSON.
    #[arg(long = "yaml", action = ArgAction::SetTrue)]
    yaml: bool,

    /// Render the change set using ANSI colors.
    #[arg(long = "color", action = ArgAction::SetTrue)]
    color: bool,

    /// Print change counts instead of the rendered change set.
    #[arg(long = "summary", action = ArgAction::SetTrue)]
    summary: bool,

    /// Write output to FILE instead of STDOUT.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// The initial graph.
    initial: PathBuf,

    /// The current graph.
    current: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match try_main(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let _ = writeln!(io::stderr(), "entdiff: {err:#}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    // A subscriber installed by the host takes precedence.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "entdiff=warn",
        1 => "entdiff=debug",
        _ => "entdiff=trace",
    }
}

fn try_main(cli: &Cli) -> Result<i32> {
    let registry = load_registry(cli)?;

    let initial_source = InputSource::File(cli.initial.clone());
    let current_source = cli.current.clone().map_or(InputSource::Stdin, InputSource::File);
    let initial = parse_node(&read_input(&initial_source)?, cli.yaml)
        .context("failed to parse initial input")?;
    let current = parse_node(&read_input(&current_source)?, cli.yaml)
        .context("failed to parse current input")?;

    let detector = ChangeDetector::new(&registry, &registry);
    let changes = detector.get_changes(&initial, &current).context("failed to compare inputs")?;
    debug!(changed = changes.is_some(), "comparison finished");

    let rendered = render(changes.as_ref(), cli);
    match &cli.output {
        Some(path) => fs::write(path, rendered.as_bytes())
            .with_context(|| format!("failed to write output to {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes()).context("failed to write to stdout")?;
            stdout.flush().context("failed to write to stdout")?;
        }
    }

    Ok(if changes.is_some() { EXIT_DIFFERENT } else { EXIT_SAME })
}

fn load_registry(cli: &Cli) -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::from_path(&cli.schema)
        .with_context(|| format!("failed to load schema {}", cli.schema.display()))?;
    if let Some(field) = &cli.type_field {
        registry = registry.with_type_field(field.as_str()).context("invalid --type-field")?;
    }
    if let Some(field) = &cli.id_field {
        registry = registry.with_id_field(field.as_str()).context("invalid --id-field")?;
    }
    Ok(registry)
}

fn render(changes: Option<&Changes>, cli: &Cli) -> String {
    if cli.summary {
        let summary = changes.map(Changes::summary).unwrap_or_default();
        return format!("{summary}\n");
    }
    let config = RenderConfig::new().with_color(cli.color);
    changes.map(|changes| changes.render(&config)).unwrap_or_default()
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

fn read_input(source: &InputSource) -> Result<String> {
    match source {
        InputSource::File(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read STDIN")?;
            Ok(buffer)
        }
    }
}

fn parse_node(input: &str, yaml: bool) -> Result<Node> {
    let node = if yaml { Node::from_yaml_str(input)? } else { Node::from_json_str(input)? };
    Ok(node)
}
