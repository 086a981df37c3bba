//! Command-line host for editing AI preset files.
//!
//! Every subcommand maps onto one editor command and prints the refreshed
//! navigation (or, with `--json`, the full outbound message).
//!
//! # Examples
//!
//! ```sh
//! # Navigation and settings
//! preset-editor show my-preset.json
//!
//! # Order bookkeeping
//! preset-editor insert my-preset.json main
//! preset-editor enable my-preset.json main
//! preset-editor move my-preset.json main --before chatHistory
//!
//! # Edit one prompt's text in $EDITOR
//! preset-editor scratch edit my-preset.json main
//!
//! # Long-running host speaking JSON lines on stdin/stdout
//! preset-editor serve --workspace ~/presets
//! ```

mod serve;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use preset_editor::navigation::render_text;
use preset_editor::preset::settings::{self, FormSection};
use preset_editor::preset::{InjectionPosition, Preset};
use preset_editor::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Edit the prompts, prompt order and settings of an AI preset file.
#[derive(Parser, Debug)]
#[command(name = "preset-editor")]
struct Cli {
    /// Workspace root holding the scratch directory. Defaults to the
    /// current directory.
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Print the outbound message as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print navigation and settings.
    Show { preset: PathBuf },
    /// Insert a prompt at the front of the order, disabled.
    Insert { preset: PathBuf, identifier: String },
    /// Take a prompt out of the order without deleting it.
    Remove { preset: PathBuf, identifier: String },
    Enable { preset: PathBuf, identifier: String },
    Disable { preset: PathBuf, identifier: String },
    /// Move a prompt before another, or to the front.
    Move {
        preset: PathBuf,
        identifier: String,
        #[arg(long)]
        before: Option<String>,
    },
    /// Create a new prompt.
    Add {
        preset: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Also insert it into the order.
        #[arg(long)]
        insert: bool,
    },
    /// Delete a prompt and its order entry.
    Delete { preset: PathBuf, identifier: String },
    /// Set a scalar setting.
    Set {
        preset: PathBuf,
        key: String,
        value: String,
    },
    /// Change a prompt's fields.
    EditPrompt {
        preset: PathBuf,
        identifier: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        content: Option<String>,
        /// 0 = relative, 1 = in-chat.
        #[arg(long)]
        position: Option<u8>,
        #[arg(long)]
        depth: Option<u32>,
        #[arg(long)]
        order: Option<u32>,
        #[arg(long)]
        forbid_overrides: Option<bool>,
    },
    /// Scratch-document editing.
    #[command(subcommand)]
    Scratch(ScratchCmd),
    /// Delete stale scratch files.
    ///
    /// A one-shot run cannot see which scratch files another host (`serve`,
    /// a running `scratch edit`) still has open, so every file past the
    /// orphan limit is removed. Requires `--force` to acknowledge that.
    Sweep {
        #[arg(long)]
        force: bool,
    },
    /// Read JSON-line requests on stdin, answer on stdout.
    Serve,
}

#[derive(Subcommand, Debug)]
enum ScratchCmd {
    /// Open a prompt in an editor and commit it when the editor exits.
    Edit {
        preset: PathBuf,
        identifier: String,
        /// Editor command. Defaults to $VISUAL, then $EDITOR, then `vi`.
        #[arg(long)]
        editor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = match &cli.workspace {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot resolve current directory")?,
    };
    let ws = EditorWorkspace::new(root).with_event_handler(LoggingHandler);

    if let Cmd::Serve = cli.command {
        return serve::run(ws).await;
    }

    let mut ws = ws;
    let output = run(&mut ws, cli.command)?;
    print!("{}", render_output(&output, cli.json)?);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

enum Output {
    Message(Outbound),
    Show(Outbound),
    Added { out: Outbound, identifier: String },
    Swept(SweepReport),
}

/// Run one non-interactive subcommand.
fn run(ws: &mut EditorWorkspace, cmd: Cmd) -> anyhow::Result<Output> {
    let out = match cmd {
        Cmd::Show { preset } => return Ok(Output::Show(ws.handle(&preset, Command::Load)?)),
        Cmd::Insert { preset, identifier } => ws.handle(&preset, Command::Insert { identifier })?,
        Cmd::Remove { preset, identifier } => ws.handle(&preset, Command::Remove { identifier })?,
        Cmd::Enable { preset, identifier } => ws.handle(
            &preset,
            Command::SetEnabled {
                identifier,
                enabled: true,
            },
        )?,
        Cmd::Disable { preset, identifier } => ws.handle(
            &preset,
            Command::SetEnabled {
                identifier,
                enabled: false,
            },
        )?,
        Cmd::Move {
            preset,
            identifier,
            before,
        } => ws.handle(&preset, Command::Move { identifier, before })?,
        Cmd::Add {
            preset,
            name,
            content,
            insert,
        } => return add_prompt(ws, &preset, name, content, insert),
        Cmd::Delete { preset, identifier } => {
            ws.handle(&preset, Command::DeletePrompt { identifier })?
        }
        Cmd::Set { preset, key, value } => {
            let value = setting_value(&key, &value)?;
            ws.handle(&preset, Command::SetSetting { key, value })?
        }
        Cmd::EditPrompt {
            preset,
            identifier,
            name,
            role,
            content,
            position,
            depth,
            order,
            forbid_overrides,
        } => {
            let injection_position = position
                .map(InjectionPosition::try_from)
                .transpose()
                .map_err(anyhow::Error::msg)?;
            let patch = PromptPatch {
                name,
                role,
                content,
                injection_position,
                injection_depth: depth,
                injection_order: order,
                forbid_overrides,
            };
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field flag");
            }
            ws.handle(&preset, Command::UpdatePrompt { identifier, patch })?
        }
        Cmd::Scratch(ScratchCmd::Edit {
            preset,
            identifier,
            editor,
        }) => edit_in_editor(ws, &preset, identifier, editor)?,
        Cmd::Sweep { force } => {
            if !force {
                bail!(
                    "sweep cannot tell which scratch files other hosts still have open; \
                     rerun with --force to delete every stale one"
                );
            }
            return Ok(Output::Swept(ws.sweep_scratch(&Default::default())));
        }
        Cmd::Serve => bail!("serve is handled by main"),
    };
    Ok(Output::Message(out))
}

fn add_prompt(
    ws: &mut EditorWorkspace,
    preset: &Path,
    name: Option<String>,
    content: Option<String>,
    insert: bool,
) -> anyhow::Result<Output> {
    let out = ws.handle(preset, Command::AddPrompt)?;
    let Some(CommandDetail::PromptAdded { identifier }) = out.detail().cloned() else {
        bail!("add_prompt returned no identifier");
    };
    let mut out = out;
    if name.is_some() || content.is_some() {
        let patch = PromptPatch {
            name,
            content,
            ..Default::default()
        };
        out = ws.handle(
            preset,
            Command::UpdatePrompt {
                identifier: identifier.clone(),
                patch,
            },
        )?;
    }
    if insert {
        out = ws.handle(
            preset,
            Command::Insert {
                identifier: identifier.clone(),
            },
        )?;
    }
    Ok(Output::Added { out, identifier })
}

/// Parse a command-line value for `key` using the settings table.
fn setting_value(key: &str, raw: &str) -> anyhow::Result<serde_json::Value> {
    let Some(spec) = settings::lookup(key) else {
        bail!("unknown setting `{key}`");
    };
    spec.kind
        .parse_str(raw)
        .with_context(|| format!("setting `{key}` expects {}", spec.kind.expected()))
}

fn edit_in_editor(
    ws: &mut EditorWorkspace,
    preset: &Path,
    identifier: String,
    editor: Option<String>,
) -> anyhow::Result<Outbound> {
    let out = ws.handle(preset, Command::OpenScratch { identifier })?;
    let Some(CommandDetail::ScratchOpened { scratch }) = out.detail().cloned() else {
        bail!("open_scratch returned no path");
    };

    let editor = editor
        .or_else(|| std::env::var("VISUAL").ok())
        .or_else(|| std::env::var("EDITOR").ok())
        .unwrap_or_else(|| "vi".to_string());
    let status = std::process::Command::new(&editor).arg(&scratch).status();
    let result = match status {
        Ok(status) if status.success() => ws.commit_scratch(&scratch, None).map_err(Into::into),
        Ok(status) => Err(anyhow::anyhow!("{editor} exited with {status}")),
        Err(e) => Err(anyhow::Error::new(e).context(format!("failed to launch {editor}"))),
    };
    ws.close_scratch(&scratch);
    result
}

/// Stdout text for one subcommand. With `json` it is exactly one JSON
/// document.
fn render_output(output: &Output, json: bool) -> anyhow::Result<String> {
    if json {
        let doc = match output {
            Output::Message(out) | Output::Show(out) | Output::Added { out, .. } => {
                serde_json::to_string_pretty(out)?
            }
            Output::Swept(report) => serde_json::to_string_pretty(report)?,
        };
        return Ok(doc + "\n");
    }
    let text = match output {
        Output::Message(out) => render_outbound(out),
        Output::Show(out) => {
            let mut text = render_outbound(out);
            if let Outbound::Refresh { preset, .. } = out {
                text.push_str(&render_settings(preset));
            }
            text
        }
        Output::Added { out, identifier } => {
            format!("{}Added prompt {identifier}\n", render_outbound(out))
        }
        Output::Swept(report) => format!("Removed {} scratch file(s)\n", report.removed.len()),
    };
    Ok(text)
}

fn render_outbound(out: &Outbound) -> String {
    match out {
        Outbound::Refresh {
            navigation, detail, ..
        } => {
            let mut text = render_text(navigation);
            if let Some(CommandDetail::ScratchCommitted { content, .. }) = detail {
                text.push_str(&format!("Committed {} chars\n", content.chars().count()));
            }
            text
        }
        Outbound::Error { message, .. } => format!("Error: {message}\n"),
    }
}

fn render_settings(preset: &Preset) -> String {
    let mut out = String::new();
    for section in FormSection::ALL {
        out.push_str(&format!("\n[{}]\n", section.title()));
        for spec in settings::in_section(section) {
            let value = preset
                .setting(spec.key)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!("  {:<24} {value}\n", spec.label));
        }
    }
    out
}
