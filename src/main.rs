use anyhow::Context;
use clap::{ArgAction, Parser};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use pkgdeptree::config::{discover_config, load_config_from_path, ConfigFile, WarnPolicy};
use pkgdeptree::graph::FilterSpec;
use pkgdeptree::parser::{self, PackageFact};
use pkgdeptree::pipeline::{self, Options};
use pkgdeptree::render::{OutputFormat, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "pkgdeptree")]
#[command(version)]
#[command(about = "Display the dependency tree of installed packages", long_about = None)]
struct Cli {
    /// Fact table to read ("-" for stdin)
    #[arg(long, value_name = "FILE", default_value = "-")]
    input: PathBuf,

    /// Comma separated packages to show; wildcards allowed
    #[arg(short = 'p', long, value_name = "P", value_delimiter = ',')]
    packages: Vec<String>,

    /// Comma separated packages to hide; wildcards allowed
    #[arg(short = 'e', long, value_name = "P", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Also hide everything the excluded packages depend on
    #[arg(long)]
    exclude_dependencies: bool,

    /// Show the packages that depend on each package
    #[arg(short, long)]
    reverse: bool,

    /// Limit the depth of the tree (0 means unlimited)
    #[arg(short, long, value_name = "D")]
    depth: Option<usize>,

    /// List every package at the top level
    #[arg(short, long)]
    all: bool,

    /// Print names as pip requirement lines
    #[arg(short, long)]
    freeze: bool,

    /// Draw the tree with box-drawing characters
    #[arg(long)]
    unicode: bool,

    /// Flat JSON output
    #[arg(short, long, group = "output")]
    json: bool,

    /// Nested JSON output
    #[arg(long, group = "output")]
    json_tree: bool,

    /// Mermaid flowchart output
    #[arg(long, group = "output")]
    mermaid: bool,

    /// Graphviz output format (dot, svg, png, ...)
    #[arg(long, value_name = "FMT", group = "output")]
    graph_output: Option<String>,

    /// What to do with warnings
    #[arg(short, long, value_enum)]
    warn: Option<WarnPolicy>,

    /// Configuration file (defaults to ./pkgdeptree.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.json_tree {
            OutputFormat::JsonTree
        } else if self.mermaid {
            OutputFormat::Mermaid
        } else {
            OutputFormat::Text
        }
    }

    /// Combines flags with the configuration file; flags win.
    fn options(&self, config: &ConfigFile) -> (Options, WarnPolicy) {
        // Configured excludes only apply when no include list is given.
        let exclude = if self.exclude.is_empty() && self.packages.is_empty() {
            config.exclude.clone().unwrap_or_default()
        } else {
            self.exclude.clone()
        };

        let options = Options {
            filter: FilterSpec {
                include: self.packages.clone(),
                exclude,
                exclude_dependencies: self.exclude_dependencies,
            },
            reverse: self.reverse,
            render: RenderOptions {
                max_depth: self.depth.or(config.depth),
                freeze: self.freeze,
                list_all: self.all || config.all.unwrap_or(false),
                unicode: self.unicode || config.unicode.unwrap_or(false),
            },
            format: self.format(),
            graph_output: self.graph_output.clone(),
            duplicate_policy: config.duplicate_policy.unwrap_or_default(),
        };
        let policy = self.warn.or(config.warn).unwrap_or_default();
        (options, policy)
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pkgdeptree=warn")),
        1 => EnvFilter::new("pkgdeptree=debug"),
        _ => EnvFilter::new("pkgdeptree=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<ConfigFile> {
    if let Some(path) = explicit {
        return Ok(load_config_from_path(path)?);
    }
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    Ok(discover_config(&cwd)?.unwrap_or_default())
}

fn read_facts(input: &Path) -> anyhow::Result<Vec<PackageFact>> {
    if input == Path::new("-") {
        parser::parse_reader(io::stdin().lock()).context("Failed to read fact table from stdin")
    } else {
        parser::parse_file(input).with_context(|| format!("Failed to read fact table: {}", input.display()))
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let (options, policy) = cli.options(&config);
    debug!(format = %options.effective_format(), policy = %policy, "resolved options");

    let facts = read_facts(&cli.input)?;
    let outcome = pipeline::run(&facts, &options)?;

    for diagnostic in &outcome.diagnostics {
        warn!("{}", diagnostic);
    }

    let report = options.shows_warnings() && policy != WarnPolicy::Silence && outcome.analysis.has_warnings();
    if report {
        eprint!("{}", outcome.analysis.render_warnings());
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(&outcome.output).context("Failed to write output")?;
    stdout.flush().context("Failed to write output")?;

    if report && policy == WarnPolicy::Fail {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
