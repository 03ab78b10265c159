//! `cmds`: parse, format, and check line-oriented command scripts.

mod render;

use std::fs;
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use cmdscript_core::source::{BOM, SourceLine, all_lines, split_lines};
use cmdscript_core::{
    Interpreter, Invocation, Manifest, ReaderConfig, ScriptError, Session, emit_invocation,
};
use cmdscript_diagnostics::{self as diag, Diagnostic, codes};
use tracing_subscriber::EnvFilter;

use crate::render::{Format, print_summary, render_diagnostics_json, render_diagnostics_pretty};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cmds",
    version,
    about = "Parse, format, and check line-oriented command scripts"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Log more (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse every line and print the argument trees.
    Parse {
        file: String,
        /// Command manifest supplying prefixes and reader configuration.
        #[arg(long)]
        manifest: Option<String>,
    },

    /// Rewrite every command line in canonical form.
    Format {
        file: String,
        /// Command manifest supplying prefixes and reader configuration.
        #[arg(long)]
        manifest: Option<String>,
        /// Write formatted output back to the file (in-place).
        #[arg(long, short, conflicts_with = "check")]
        write: bool,
        /// Check if the file is already formatted (exit 1 if not). For CI.
        #[arg(long, conflicts_with = "write")]
        check: bool,
    },

    /// Run a script against a command manifest without side effects.
    Check {
        file: String,
        /// Command manifest describing modes, types, and commands.
        #[arg(long)]
        manifest: String,
    },

    /// List the compiled overloads of a manifest's commands.
    Signatures {
        /// Command manifest describing modes, types, and commands.
        #[arg(long)]
        manifest: String,
        /// Only show this command.
        command: Option<String>,
    },

    /// Explain a diagnostic code (e.g. CMD2002), or list every code.
    Explain { id: Option<String> },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());

    let ok = match cli.cmd {
        Cmd::Parse { file, manifest } => cmd_parse(&file, manifest.as_deref(), format)?,
        Cmd::Format {
            file,
            manifest,
            write,
            check,
        } => cmd_format(&file, manifest.as_deref(), write, check, format)?,
        Cmd::Check { file, manifest } => cmd_check(&file, &manifest, format)?,
        Cmd::Signatures { manifest, command } => {
            cmd_signatures(&manifest, command.as_deref(), format)?
        }
        Cmd::Explain { id } => cmd_explain(id.as_deref(), format)?,
    };

    if !ok {
        process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(file: &str, manifest: Option<&str>, format: Format) -> Result<bool> {
    let input = read_script(file)?;
    let interp = load_interpreter(manifest)?;
    let mut invocations: Vec<Invocation> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    // Unlike `check`, keep going so every lexical problem is reported.
    for line in split_lines(&input, &interp.config().line_comments) {
        match interp.parse_line(line.code, line.offset) {
            Ok(inv) => invocations.push(inv),
            Err(d) => diagnostics.push(d),
        }
    }
    tracing::debug!(
        file,
        invocations = invocations.len(),
        errors = diagnostics.len(),
        "parsed"
    );

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "invocations": invocations,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            println!("{}", cmdscript_core::to_pretty_json(&invocations)?);
            render_diagnostics_pretty(&input, file, &diagnostics);
            print_summary(&diagnostics);
        }
    }
    Ok(diagnostics.is_empty())
}

fn cmd_format(
    file: &str,
    manifest: Option<&str>,
    write: bool,
    check: bool,
    format: Format,
) -> Result<bool> {
    let input = read_script(file)?;
    let interp = load_interpreter(manifest)?;
    let (formatted, diagnostics) = format_script(&interp, &input);

    if !diagnostics.is_empty() {
        // Never rewrite a file that does not parse.
        match format {
            Format::Json => render_diagnostics_json(&diagnostics)?,
            Format::Pretty => {
                render_diagnostics_pretty(&input, file, &diagnostics);
                print_summary(&diagnostics);
            }
        }
        return Ok(false);
    }

    let already_formatted = formatted == input;
    if check {
        let msg = if already_formatted {
            "already formatted"
        } else {
            "not formatted"
        };
        status_message(format, msg, file)?;
        return Ok(already_formatted);
    }
    if write {
        if !already_formatted {
            fs::write(file, &formatted).with_context(|| format!("failed to write {file}"))?;
        }
        let msg = if already_formatted {
            "already formatted"
        } else {
            "formatted"
        };
        status_message(format, msg, file)?;
        return Ok(true);
    }
    print!("{formatted}");
    Ok(true)
}

fn cmd_check(file: &str, manifest: &str, format: Format) -> Result<bool> {
    let input = read_script(file)?;
    let interp = load_interpreter(Some(manifest))?;
    let mut session = Session::new(());
    let result = interp.read_str(file, &input, &mut session);

    match (result, format) {
        (Ok(summary), Format::Json) => {
            let out = serde_json::json!({
                "ok": true,
                "summary": summary,
                "resources": session.resources.names(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(true)
        }
        (Ok(summary), Format::Pretty) => {
            eprintln!(
                "check ok: {} commands on {} lines, {} open scope(s)",
                summary.commands, summary.lines, summary.open_scopes
            );
            Ok(true)
        }
        (Err(err @ ScriptError::Io { .. }), _) => Err(err.into()),
        (Err(err), Format::Json) => {
            let out = serde_json::json!({
                "ok": false,
                "error": located_json(&err),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(false)
        }
        (Err(err), Format::Pretty) => {
            if let Some(d) = err.diagnostic() {
                render_diagnostics_pretty(&input, file, std::slice::from_ref(d));
            } else {
                eprintln!("{}", err.render());
            }
            Ok(false)
        }
    }
}

fn cmd_signatures(manifest: &str, command: Option<&str>, format: Format) -> Result<bool> {
    let interp = load_interpreter(Some(manifest))?;
    let defs: Vec<_> = interp
        .commands()
        .iter()
        .filter(|d| command.is_none_or(|c| d.name.eq_ignore_ascii_case(c)))
        .collect();
    if let Some(name) = command
        && defs.is_empty()
    {
        bail!("no command named `{name}` in {manifest}");
    }

    match format {
        Format::Json => {
            let out: Vec<_> = defs
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "name": d.name,
                        "modes": interp.modes().describe(d.modes),
                        "overloads": d.signatures,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            for d in defs {
                println!("{}  [{}]", d.name, interp.modes().describe(d.modes));
                for (i, sig) in d.signatures.iter().enumerate() {
                    if sig.params.is_empty() {
                        println!("  {i}: {}", d.name);
                    } else {
                        println!("  {i}: {} {sig}", d.name);
                    }
                }
            }
        }
    }
    Ok(true)
}

fn cmd_explain(id: Option<&str>, format: Format) -> Result<bool> {
    let Some(id) = id else {
        match format {
            Format::Json => {
                let out: Vec<_> = codes::all().map(code_json).collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Format::Pretty => {
                for code in codes::all() {
                    let class = codes::class_of(code).map(|c| c.to_string()).unwrap_or_default();
                    println!("{code}  {class:<10}  {}", codes::summary(code).unwrap_or(""));
                }
            }
        }
        return Ok(true);
    };

    let id = id.to_ascii_uppercase();
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&code_json(&id))?),
        Format::Pretty => {
            use ariadne::Fmt;
            match (codes::summary(&id), diag::explain(&id)) {
                (Some(summary), Some(text)) => {
                    println!("{}: {summary}", id.as_str().fg(ariadne::Color::Cyan));
                    println!("{text}");
                }
                _ => println!("{id}: (no explanation available)"),
            }
        }
    }
    Ok(true)
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn read_script(file: &str) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("failed to read {file}"))
}

/// Interpreter from a manifest, or a bare one (no prefixes) when absent.
fn load_interpreter(manifest: Option<&str>) -> Result<Interpreter<()>> {
    let Some(path) = manifest else {
        return Ok(Interpreter::with_config(ReaderConfig::default()));
    };
    let manifest = Manifest::load(path)?;
    manifest
        .build()
        .with_context(|| format!("invalid command manifest {path}"))
}

/// Canonical text for `input`, plus a diagnostic for every line that does
/// not parse. Indentation, comments, blank lines, and line endings are kept.
fn format_script(interp: &Interpreter<()>, input: &str) -> (String, Vec<Diagnostic>) {
    let newline = if input.contains("\r\n") { "\r\n" } else { "\n" };
    let mut out = String::with_capacity(input.len());
    if input.starts_with(BOM) {
        out.push(BOM);
    }
    let mut diagnostics = Vec::new();
    let lines = all_lines(input, &interp.config().line_comments);
    let count = lines.len();

    for (i, line) in lines.into_iter().enumerate() {
        match format_line(interp, &line) {
            Ok(text) => out.push_str(&text),
            Err(d) => {
                diagnostics.push(d);
                out.push_str(line.raw);
            }
        }
        if i + 1 < count || input.ends_with('\n') {
            out.push_str(newline);
        }
    }
    (out, diagnostics)
}

fn format_line(interp: &Interpreter<()>, line: &SourceLine<'_>) -> Result<String, Diagnostic> {
    let indent = &line.raw[..line.raw.len() - line.raw.trim_start().len()];
    let mut text = String::from(indent);
    if !line.is_blank() {
        let inv = interp.parse_line(line.code, line.offset)?;
        text.push_str(&emit_invocation(&inv));
    }
    if let Some(comment) = line.comment {
        if !line.is_blank() {
            text.push(' ');
        }
        text.push_str(comment);
    }
    if line.is_blank() && line.comment.is_none() {
        text.clear();
    }
    Ok(text)
}

fn status_message(format: Format, msg: &str, file: &str) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({ "status": msg, "file": file });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => eprintln!("{msg}: {file}"),
    }
    Ok(())
}

fn located_json(err: &ScriptError) -> serde_json::Value {
    match err {
        ScriptError::Located {
            path,
            line,
            column,
            snippet,
            diagnostic,
        } => serde_json::json!({
            "path": path,
            "line": line,
            "column": column,
            "snippet": snippet,
            "class": diagnostic.class(),
            "diagnostic": diagnostic,
        }),
        other => serde_json::json!({ "message": other.to_string() }),
    }
}

fn code_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "class": codes::class_of(id),
        "summary": codes::summary(id),
        "explanation": diag::explain(id),
    })
}
