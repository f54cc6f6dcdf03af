//! scriptkit CLI - structured-data helpers from the command line
//!
//! Usage:
//!   scriptkit run <script>                       Run a Rhai script
//!   scriptkit tree <dir> [--depth N] [--flat]     List a directory recursively
//!   scriptkit csv <src> [--no-headers] [--format json|xml|html]
//!   scriptkit xml <src>                          Decode XML to JSON
//!   scriptkit get <json-src> <path>              Read a dot-path from JSON

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use scriptkit::config::Settings;
use scriptkit::helpers::csv::{CsvReader, TableMarkup};
use scriptkit::helpers::dir::{self, DirNode, DirTree};
use scriptkit::helpers::dot::Dot;
use scriptkit::helpers::json::JsonReader;
use scriptkit::helpers::source::Source;
use scriptkit::helpers::xml;
use scriptkit::{UtilEngine, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "scriptkit")]
#[command(about = "Structured-data helpers for Rhai scripts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra config file, layered over the XDG config files
    #[arg(short, long, global = true, env = "SCRIPTKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Show script debug() output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Rhai script with all helpers registered
    Run {
        /// Path to the script file
        script: PathBuf,
    },

    /// List a directory recursively
    Tree {
        dir: PathBuf,

        /// Maximum depth to descend (defaults to the configured depth)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Print one full path per line instead of a tree
        #[arg(long)]
        flat: bool,
    },

    /// Convert CSV to JSON, XML or an HTML table
    Csv {
        /// CSV file path or literal CSV text
        src: String,

        /// Treat the first row as data
        #[arg(long)]
        no_headers: bool,

        #[arg(short, long, value_enum, default_value_t = CsvFormat::Json)]
        format: CsvFormat,
    },

    /// Decode XML into JSON
    Xml {
        /// XML file path or literal XML text
        src: String,
    },

    /// Print the value at a dot-path of a JSON document
    Get {
        /// JSON file path or literal JSON text
        src: String,

        /// Dot-path such as "user.profile.name"
        path: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CsvFormat {
    Json,
    Xml,
    Html,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    settings.verbose |= cli.verbose;

    match cli.command {
        Commands::Run { script } => run_script(settings, &script),
        Commands::Tree { dir, depth, flat } => {
            let depth = depth.unwrap_or(settings.max_depth);
            tree(&dir, depth, flat)
        }
        Commands::Csv {
            src,
            no_headers,
            format,
        } => convert_csv(&settings, src, !no_headers, format),
        Commands::Xml { src } => {
            let text = Source::sniff(src).read_to_string(settings.spool_threshold)?;
            let value = xml::decode(&text)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Commands::Get { src, path } => {
            let value = JsonReader::new(&settings).read(src)?;
            let Some(map) = value.as_object() else {
                bail!("JSON document is not an object");
            };
            match Dot::new(settings.key_delimiter).get(map, &path, None) {
                Some(found) => {
                    println!("{}", serde_json::to_string_pretty(found)?);
                    Ok(())
                }
                None => bail!("path '{}' not found", path),
            }
        }
    }
}

fn run_script(settings: Settings, script: &Path) -> Result<()> {
    output::action(&format!("Running {}", script.display()));
    let engine = UtilEngine::new(settings);
    match engine.run(script) {
        Ok(value) => {
            if !value.is_unit() {
                output::detail(&value.to_string());
            }
            output::success("Done");
            Ok(())
        }
        Err(e) => {
            output::error(&format!("{:#}", e));
            Err(e)
        }
    }
}

fn tree(dir: &Path, depth: usize, flat: bool) -> Result<()> {
    let pb = output::spinner(&format!("Scanning {}", dir.display()));
    if flat {
        let paths = match dir::glob_recursive(dir, depth) {
            Ok(paths) => paths,
            Err(e) => {
                output::progress_fail(pb, "scan failed");
                return Err(e).with_context(|| format!("Failed to list {}", dir.display()));
            }
        };
        output::progress_done(pb);
        for path in paths.keys() {
            println!("{}", path);
        }
    } else {
        let tree = match dir::scan_recursive(dir, depth) {
            Ok(tree) => tree,
            Err(e) => {
                output::progress_fail(pb, "scan failed");
                return Err(e).with_context(|| format!("Failed to list {}", dir.display()));
            }
        };
        output::progress_done(pb);
        output::info(&dir.display().to_string());
        print_tree(&tree, 1);
    }
    Ok(())
}

fn print_tree(tree: &DirTree, depth: usize) {
    for (name, node) in tree {
        match node {
            DirNode::Dir(sub) => {
                output::tree_item(depth, name, true);
                print_tree(sub, depth + 1);
            }
            DirNode::File(_) => output::tree_item(depth, name, false),
        }
    }
}

fn convert_csv(settings: &Settings, src: String, has_headers: bool, format: CsvFormat) -> Result<()> {
    let set = CsvReader::new(settings).has_headers(has_headers).read(src)?;
    if set.is_empty() {
        output::warning("no data rows");
    }
    let rendered = match format {
        CsvFormat::Json => set.to_json()?,
        CsvFormat::Xml => set.to_xml(&TableMarkup::from(&settings.xml))?,
        CsvFormat::Html => set.to_html("table-csv-data")?,
    };
    println!("{}", rendered);
    Ok(())
}
