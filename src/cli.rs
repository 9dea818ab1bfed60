//! CLI: contract schema → (rust | ir)
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use tracing::debug;

use wasm_schema_gen::{ContractSchema, GenerateOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate typed query clients from CosmWasm contract schemas
#[derive(Parser, Debug)]
#[command(name = "wasm-schema-gen", version)]
pub struct CommandLineInterface {
    /// more logging (-v info, -vv debug, -vvv trace); overrides WASM_SCHEMA_GEN_LOG
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit a Rust client module per input
    Rust(RustOut),
    /// print the compiled declarations and functions as JSON
    Ir(IrOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more contract schema files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON Pointer to the contract schema inside each document (e.g. /schema)
    #[arg(long)]
    json_pointer: Option<String>,

    /// name of the generated interface; the container drops a leading `I`
    #[arg(long)]
    interface: String,

    /// module path the output is wrapped in (`a::b` or `a.b`)
    #[arg(long, default_value = "")]
    namespace: String,
}

#[derive(Args, Debug)]
struct RustOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .rs file, or a directory when there are several inputs (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// TOML file with generation options
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct IrOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file, or a directory when there are several inputs (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One rendered input.
struct Rendered {
    source_path: PathBuf,
    text: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self, source_path: &Path) -> Result<ContractSchema> {
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read {}", source_path.display()))?;
        let document: serde_json::Value = serde_json::from_str(&source)
            .with_context(|| format!("failed to parse JSON source file ({})", source_path.display()))?;
        let document = match self.json_pointer.as_deref() {
            None => document,
            Some(pointer) => document.pointer(pointer).cloned().ok_or_else(|| {
                anyhow!("json pointer {pointer} selects nothing in {}", source_path.display())
            })?,
        };
        ContractSchema::from_value(document).with_context(|| format!("in {}", source_path.display()))
    }

    /// Compile every input in parallel; each compilation owns its registry.
    fn render_all<F>(&self, render: F) -> Result<Vec<Rendered>>
    where
        F: Fn(&ContractSchema) -> Result<String> + Sync,
    {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        debug!(inputs = source_paths.len(), "resolved input paths");
        source_paths
            .into_par_iter()
            .map(|source_path| {
                let schema = self.load(&source_path)?;
                let text = render(&schema).with_context(|| format!("while generating {}", source_path.display()))?;
                Ok(Rendered { source_path, text })
            })
            .collect()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Rust(target) => {
                let options = match target.config.as_ref() {
                    Some(path) => GenerateOptions::from_toml_file(path)?,
                    None => GenerateOptions::default(),
                };
                let settings = &target.input_settings;
                let rendered = settings.render_all(|schema| {
                    Ok(wasm_schema_gen::generate_with(&settings.interface, &settings.namespace, schema, &options)?)
                })?;
                write_outputs(&rendered, target.out.as_deref(), "rs")
            }
            Command::Ir(target) => {
                let settings = &target.input_settings;
                let rendered = settings.render_all(|schema| {
                    let ir = wasm_schema_gen::compile(&settings.interface, &settings.namespace, schema)?;
                    Ok(serde_json::to_string_pretty(&ir)?)
                })?;
                write_outputs(&rendered, target.out.as_deref(), "json")
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_outputs(rendered: &[Rendered], out: Option<&Path>, extension: &str) -> Result<()> {
    let Some(out) = out else {
        for item in rendered {
            println!("{}", item.text);
        }
        return Ok(());
    };
    match rendered {
        [single] if !out.is_dir() => write_file(out, &single.text),
        _ => {
            std::fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;
            for item in rendered {
                let stem = item.source_path
                    .file_stem()
                    .ok_or_else(|| anyhow!("input {} has no file name", item.source_path.display()))?;
                let target = out.join(stem).with_extension(extension);
                write_file(&target, &item.text)?;
            }
            Ok(())
        }
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("{} {}", "wrote".green().bold(), path.display());
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
