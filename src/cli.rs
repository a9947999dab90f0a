//! Minimal CLI: summarize → (json | tree), render saved summaries
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;

use crate::render::{render_tree, RenderOptions};
use crate::report::{LogReporter, Reporter};
use crate::scan::{self, ScanError};
use crate::summary::Summary;
use crate::tree::TreeBuilder;
use crate::{SummarizeOptions, DEFAULT_BUCKET_COUNT, DEFAULT_MAX_DEPTH, DEFAULT_TOP_COUNT};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// summarize the structure of concatenated JSON objects: per-path frequencies and value statistics
#[derive(Parser, Debug)]
#[command(name = "json-digest", version)]
pub struct CommandLineInterface {
    /// more logging on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// scan JSON input and print its summary
    Summarize(SummarizeOut),
    /// print a previously saved JSON summary as a tree
    Render(RenderIn),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JQ pre-process filter for each document; every output object is summarized.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// compact JSON
    Json,
    /// indented JSON
    Pretty,
    /// human-readable tree
    Tree,
}

#[derive(clap::Parser, Debug)]
struct SummarizeOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// histogram buckets per numeric path
    #[arg(long, default_value_t = DEFAULT_BUCKET_COUNT)]
    buckets: usize,

    /// most frequent strings kept per string path
    #[arg(long, default_value_t = DEFAULT_TOP_COUNT)]
    top: usize,

    /// maximum container nesting
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct RenderIn {
    /// summary .json file ('-' for stdin)
    #[arg(long, short)]
    input: String,

    /// top strings shown per path
    #[arg(long, default_value_t = 3)]
    max_top: usize,

    /// also show never-visited array slots
    #[arg(long)]
    show_placeholders: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_process(&self, builder: &mut TreeBuilder, reporter: &mut dyn Reporter) -> Result<()> {
        let sources = resolve_file_path_patterns(&self.input)?;
        for source in sources {
            let name = source.to_string_lossy().to_string();
            let data = read_source(&source)?;
            log::info!("read {} bytes from {name}", data.len());
            match self.jq_expr.as_deref() {
                None => {
                    builder
                        .scan_bytes(&data, reporter)
                        .with_context(|| format!("failed to summarize {name}"))?;
                }
                Some(jq_expr) => {
                    observe_filtered(builder, &data, jq_expr, reporter)
                        .with_context(|| format!("failed to summarize {name} through `{jq_expr}`"))?;
                }
            }
        }
        Ok(())
    }
}

impl SummarizeOut {
    fn options(&self) -> SummarizeOptions {
        SummarizeOptions {
            bucket_count: self.buckets,
            top_count: self.top,
            max_depth: self.max_depth,
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Summarize(target) => {
                let mut reporter = LogReporter::new();
                let mut builder = TreeBuilder::new(target.options());
                target.input_settings.load_process(&mut builder, &mut reporter)?;
                let summary = builder.finish(&mut reporter);

                let text = match target.format {
                    OutputFormat::Json => serde_json::to_string(&summary)?,
                    OutputFormat::Pretty => serde_json::to_string_pretty(&summary)?,
                    OutputFormat::Tree => {
                        disable_color_unless_terminal(target.out.is_some());
                        render_tree(&summary, &RenderOptions::default())
                    }
                };
                write_output(target.out.as_deref(), &text)
            }
            Command::Render(target) => {
                let bytes = read_source(Path::new(&target.input))?;
                let summary = Summary::from_json_slice(&bytes)
                    .with_context(|| format!("failed to decode summary {}", target.input))?;
                let options = RenderOptions {
                    max_top: target.max_top,
                    hide_placeholders: !target.show_placeholders,
                };
                disable_color_unless_terminal(false);
                print!("{}", render_tree(&summary, &options));
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Decode each top-level value, run it through jq, observe the outputs.
fn observe_filtered(
    builder: &mut TreeBuilder,
    data: &[u8],
    jq_expr: &str,
    reporter: &mut dyn Reporter,
) -> crate::Result<()> {
    crate::jq_exec::with_jaq(jq_expr, |run_filter| {
        let mut i = 0;
        while let Some((span, raw)) = scan::next_document(data, i)? {
            let value = serde_json::from_str::<Value>(raw.get())
                .map_err(|source| ScanError::Malformed { offset: span.from, source })?;
            for output in run_filter(&value)? {
                builder.observe_document(&output, span.from)?;
            }
            reporter.object_read(i, span.to, data.len());
            i = span.to;
        }
        Ok(())
    })
}

fn disable_color_unless_terminal(to_file: bool) {
    if to_file || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut data = Vec::new();
        std::io::stdin().lock().read_to_end(&mut data).context("failed to read stdin")?;
        return Ok(data);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            if text.ends_with('\n') {
                print!("{text}");
            } else {
                println!("{text}");
            }
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
