pub mod block;
mod callbacks;
pub mod error;
pub mod generator;
pub mod host;
pub mod order;
pub mod schema;
pub mod toolbox;
pub mod workspace;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

use anyhow::{anyhow, Result};
#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context;
#[cfg(not(target_arch = "wasm32"))]
use generator::GeneratorOptions;
use std::path::{Path, PathBuf};
use workspace::Workspace;

pub use generator::{Code, GenerationPass, HexputGenerator};
pub use host::{add_custom_literal, generate_hexput_blockly, init_blockly, BlocklyHost};

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    let total_stages = 4
        + usize::from(args.emit_blocks.is_some())
        + usize::from(args.emit_toolbox.is_some())
        + usize::from(args.output.is_some());
    let progress = CliProgress::new("Generate", total_stages);
    let mut stage = 0usize;

    stage += 1;
    progress.emit(stage, "Resolving input path");
    let input = canonicalize_file(&args.input)?;

    stage += 1;
    progress.emit(stage, "Reading workspace");
    let source = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read '{}'.", input.display()))?;
    let workspace = Workspace::from_json(&source)
        .with_context(|| format!("Failed to load workspace '{}'.", pretty_path(&input)))?;

    stage += 1;
    progress.emit(stage, "Registering blocks");
    let mut host = BlocklyHost::with_generator_options(GeneratorOptions {
        indent: " ".repeat(args.indent),
    });
    host::define_block_types(&mut host)?;
    for literal in &args.literals {
        let (type_name, label, value) = parse_literal_arg(literal)?;
        host.add_custom_literal(type_name, label, value)?;
    }

    stage += 1;
    progress.emit(stage, "Generating Hexput");
    let code = generate_hexput_blockly(&mut host).workspace_to_code(&workspace)?;

    if let Some(path) = &args.emit_blocks {
        stage += 1;
        progress.emit(stage, "Writing block definitions");
        let json = serde_json::to_string_pretty(&host.registry().to_json()?)?;
        write_atomic(path, json.as_bytes())?;
    }

    if let Some(path) = &args.emit_toolbox {
        stage += 1;
        progress.emit(stage, "Writing toolbox");
        let xml = toolbox::default_toolbox_xml(host.registry())?;
        write_atomic(path, xml.as_bytes())?;
    }

    match &args.output {
        Some(path) => {
            stage += 1;
            progress.emit(stage, "Writing Hexput source");
            write_atomic(path, code.as_bytes())?;
        }
        None => print!("{}", code),
    }

    Ok(())
}

/// Loads a workspace saved in the editor's JSON format and generates Hexput with
/// the generator bound to `host`.
pub fn generate_from_workspace_json(host: &mut BlocklyHost, source: &str) -> Result<String> {
    let workspace = Workspace::from_json(source)?;
    generate_hexput_blockly(host).workspace_to_code(&workspace)
}

/// The block definitions of `host` as a JSON string, ready for `defineBlocksWithJsonArray`.
pub fn block_definitions_json(host: &mut BlocklyHost) -> Result<String> {
    host::define_block_types(host)?;
    Ok(serde_json::to_string(&host.registry().to_json()?)?)
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_literal_arg(literal: &str) -> Result<(&str, &str, &str)> {
    let mut parts = literal.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(type_name), Some(label), Some(value)) if !type_name.is_empty() => {
            Ok((type_name, label, value))
        }
        _ => Err(anyhow!(
            "Invalid --literal '{}': expected TYPE:LABEL:VALUE.",
            literal
        )),
    }
}

pub fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() || !path.is_file() {
        return Err(anyhow!("Input file not found: '{}'.", path.display()));
    }
    Ok(path.canonicalize()?)
}

#[cfg(not(target_arch = "wasm32"))]
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            parent.to_path_buf()
        }
        _ => PathBuf::from("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(&dir)
        .with_context(|| format!("Failed to create a temporary file in '{}'.", dir.display()))?;
    temp.write_all(bytes)?;
    temp.persist(path)
        .map_err(|e| anyhow!("Failed to write '{}': {}.", path.display(), e.error))?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn pretty_path(path: &Path) -> String {
    let raw = path.display().to_string();
    if let Some(stripped) = raw.strip_prefix(r"\\?\") {
        stripped.to_string()
    } else {
        raw
    }
}

#[cfg(not(target_arch = "wasm32"))]
struct CliProgress {
    prefix: &'static str,
    total: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl CliProgress {
    fn new(prefix: &'static str, total: usize) -> Self {
        Self {
            prefix,
            total: total.max(1),
        }
    }

    fn emit(&self, step: usize, label: &str) {
        let step = step.clamp(1, self.total);
        let bar = render_progress_bar(step, self.total, 14);
        eprintln!(
            "[{}] {}... ({}/{}) {}",
            self.prefix, label, step, self.total, bar
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn render_progress_bar(step: usize, total: usize, width: usize) -> String {
    let width = width.max(1);
    let filled = ((step * width) + (total / 2)) / total;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < filled { '=' } else { '-' });
    }
    s.push(']');
    s
}
