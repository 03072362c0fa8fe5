use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "puppetry", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the rig discovered in an SVG file as JSON.
    Rig(RigArgs),
    /// Print the timeline overrides of a document at a frame as JSON.
    Eval(FrameArgs),
    /// Print the render tree of a document at a frame as JSON.
    Render(FrameArgs),
}

#[derive(Parser, Debug)]
struct RigArgs {
    /// Input SVG file.
    #[arg(long)]
    svg: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based, clamped to the timeline).
    #[arg(long, default_value_t = 0)]
    frame: u64,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RigReport<'a> {
    metadata: &'a puppetry::RigMetadata,
    mirror: &'a puppetry::MirrorTable,
    size: Option<puppetry::Size2>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Rig(args) => cmd_rig(args),
        Command::Eval(args) => cmd_eval(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_doc(path: &Path) -> anyhow::Result<puppetry::DocumentSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read document '{}'", path.display()))?;
    let doc = puppetry::DocumentSnapshot::from_json(&json)
        .with_context(|| format!("parse document '{}'", path.display()))?;
    Ok(doc)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{out}");
    Ok(())
}

fn cmd_rig(args: RigArgs) -> anyhow::Result<()> {
    let markup = std::fs::read_to_string(&args.svg)
        .with_context(|| format!("read svg '{}'", args.svg.display()))?;
    let rig = puppetry::Rig::parse(&markup, &puppetry::RigSchema::default())
        .with_context(|| format!("extract rig from '{}'", args.svg.display()))?;
    for part in &rig.metadata.unpivoted {
        eprintln!("warning: part '{part}' has no pivot");
    }
    print_json(&RigReport {
        metadata: &rig.metadata,
        mirror: &rig.mirror,
        size: rig.doc_size(),
    })
}

fn cmd_eval(args: FrameArgs) -> anyhow::Result<()> {
    let doc = read_doc(&args.in_path)?;
    let frame = args.frame.min(doc.timeline.duration());
    let overrides = puppetry::evaluate_tracks(&doc.timeline.tracks, puppetry::FrameIndex(frame));
    print_json(&overrides)
}

fn cmd_render(args: FrameArgs) -> anyhow::Result<()> {
    let doc = read_doc(&args.in_path)?;
    let mut session = puppetry::EditorSession::from_snapshot(doc, puppetry::EditorOpts::default())?;
    session.seek(args.frame);
    print_json(&session.render_tree())
}
