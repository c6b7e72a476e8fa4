//! # Quire CLI
//!
//! Command-line front end: reads JSON requests, writes PDFs, prints the
//! result as pretty JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Everything-at-once request; the PDF lands in generated_docs/pdfs/
//! quire compose request.json
//!
//! # Sectioned document with title page and TOC
//! quire document doc.json -o report.pdf
//!
//! # Request builders (invoice, presentation, business_report, ...)
//! quire preset invoice invoice.json
//!
//! # Merge, split and inspect finished PDFs
//! quire merge a.pdf b.pdf -o both.pdf --no-cover
//! quire split both.pdf --pages-per-file 2
//! quire info both.pdf
//!
//! # Inspect palettes, chart classification and templates
//! quire palette "#2E86AB" analogous 5
//! quire classify data.json
//! quire templates
//! ```
//!
//! `-` reads a request from stdin. Exit status is 1 when the result is an
//! error.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};

use quire::{
    BuildResult, QuireError,
    chart::{self, palette::{PaletteGenerator, PaletteScheme}},
    color::Color,
    compose,
    config::{ColorScheme, Template},
    document::DocumentRequest,
    fetch::HttpFetcher,
    manipulate::{self, MergeOptions, Outcome},
    output::{OutputDirs, OutputKind, unique_name},
    presets,
};

/// Quire - declarative PDF document composition
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Root for generated charts, images and PDFs
    #[arg(long, global = true, default_value = quire::output::DEFAULT_ROOT)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an all-components compose request
    Compose {
        /// Request JSON file, or - for stdin
        request: PathBuf,

        /// Output PDF (defaults to the request's filename under pdfs/)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Build a sectioned document request
    Document {
        /// Document JSON file, or - for stdin
        request: PathBuf,

        /// Output PDF (defaults to a fresh name under pdfs/)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Build a document with one of the request builders
    Preset {
        /// Builder name (omit to list builders and templates)
        name: Option<String>,

        /// Request JSON file, or - for stdin (defaults to an empty request)
        request: Option<PathBuf>,

        /// Output PDF (defaults to a fresh name under pdfs/)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Merge PDFs into one, with bookmarks and a cover page by default
    Merge {
        /// Input PDFs, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output PDF (defaults to a fresh name under pdfs/)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Skip the per-file bookmarks
        #[arg(long)]
        no_bookmarks: bool,

        /// Skip the generated cover page
        #[arg(long)]
        no_cover: bool,

        /// Title of the cover page
        #[arg(long, default_value = "Merged Document")]
        cover_title: String,
    },

    /// Split a PDF into files of N pages
    Split {
        /// Input PDF
        file: PathBuf,

        /// Directory for the pieces (defaults to pdfs/)
        #[arg(short = 'd', long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Pages in each piece
        #[arg(short, long, default_value_t = 1)]
        pages_per_file: usize,
    },

    /// Show page count, page size and metadata of a PDF
    Info {
        /// Input PDF
        file: PathBuf,
    },

    /// Generate series colors from a base color
    Palette {
        /// Base color: #RRGGBB, #RGB or a color name
        base: String,

        /// analogous, complementary, triadic, rainbow, gradient or distinct
        scheme: String,

        /// Number of colors
        count: usize,
    },

    /// Suggest a chart type for a JSON data file
    Classify {
        /// Data JSON file, or - for stdin
        data: PathBuf,
    },

    /// List templates, color schemes and named presets
    Templates,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Returns whether the command succeeded.
fn run(cli: Cli) -> Result<bool, QuireError> {
    let output_dirs = OutputDirs::new(&cli.output_dir);

    match cli.command {
        Commands::Compose { request, output } => {
            let result = match read_json(&request) {
                Ok(value) => {
                    let fetcher = HttpFetcher::new()?;
                    compose::compose_value(value, &fetcher, &output_dirs, output.as_deref())
                }
                Err(e) => BuildResult::error(e.to_string()),
            };
            report(&result)
        }

        Commands::Document { request, output } => {
            let result = read_json(&request)
                .and_then(|value| Ok(serde_json::from_value::<DocumentRequest>(value)?))
                .and_then(|req| {
                    let path = output_path(output, &output_dirs, "document")?;
                    req.into_document().with_output(output_dirs.clone()).build(path)
                });
            report(&BuildResult::from(result))
        }

        Commands::Preset { name, request, output } => {
            let Some(name) = name else {
                print_json(&json!({
                    "builders": presets::BUILDERS,
                    "templates": presets::PRESETS,
                }))?;
                return Ok(true);
            };
            let result = match &request {
                Some(path) => read_json(path),
                None => Ok(json!({})),
            }
            .and_then(|value| presets::from_request(&name, value))
            .and_then(|doc| {
                let path = output_path(output, &output_dirs, &name)?;
                doc.with_output(output_dirs.clone()).build(path)
            });
            report(&BuildResult::from(result))
        }

        Commands::Merge {
            files,
            output,
            no_bookmarks,
            no_cover,
            cover_title,
        } => {
            let options = MergeOptions {
                bookmarks: !no_bookmarks,
                cover_page: !no_cover,
                cover_title,
            };
            let outcome: Outcome<_> = output_path(output, &output_dirs, "merged")
                .and_then(|path| manipulate::merge(&files, &path, &options))
                .into();
            print_json(&outcome)?;
            Ok(outcome.is_success())
        }

        Commands::Split {
            file,
            out_dir,
            pages_per_file,
        } => {
            let dir = match out_dir {
                Some(dir) => Ok(dir),
                None => output_dirs.dir(OutputKind::Pdfs),
            };
            let outcome: Outcome<_> = dir.and_then(|dir| manipulate::split(&file, &dir, pages_per_file)).into();
            print_json(&outcome)?;
            Ok(outcome.is_success())
        }

        Commands::Info { file } => {
            let outcome: Outcome<_> = manipulate::info(&file).into();
            print_json(&outcome)?;
            Ok(outcome.is_success())
        }

        Commands::Palette { base, scheme, count } => {
            let base: Color = base.parse()?;
            let scheme: PaletteScheme = scheme.parse().unwrap_or_default();
            let colors: Vec<String> = PaletteGenerator::new(base, scheme)
                .generate(count)
                .iter()
                .map(Color::to_hex)
                .collect();
            print_json(&json!({ "scheme": scheme.name(), "colors": colors }))?;
            Ok(true)
        }

        Commands::Classify { data } => {
            let data = read_json(&data)?;
            let analysis = chart::analyze(&data);
            print_json(&json!({
                "chart_type": analysis.kind.name(),
                "reason": analysis.reason,
                "summary": chart::summary_lines(&data),
            }))?;
            Ok(true)
        }

        Commands::Templates => {
            let templates: Vec<&str> = Template::ALL.iter().map(|t| t.name()).collect();
            let schemes: Vec<&str> = ColorScheme::ALL.iter().map(|s| s.name()).collect();
            print_json(&json!({
                "templates": templates,
                "color_schemes": schemes,
                "presets": presets::PRESETS,
            }))?;
            Ok(true)
        }
    }
}

/// Read a JSON request from `path`, or stdin for `-`.
fn read_json(path: &Path) -> Result<Value, QuireError> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

fn output_path(explicit: Option<PathBuf>, dirs: &OutputDirs, prefix: &str) -> Result<PathBuf, QuireError> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(dirs.dir(OutputKind::Pdfs)?.join(unique_name(prefix, "pdf"))),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), QuireError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(result: &BuildResult) -> Result<bool, QuireError> {
    print_json(result)?;
    Ok(result.is_success())
}
