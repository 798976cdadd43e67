use std::io::{self, Read};

use boardgram::config::{ConfigError, DiagramConfig};
use boardgram::mermaid::{self, ConvertOptions, LayoutOverrides, ParseError};
use boardgram::services::diagram::{self, CancelToken, DiagramError, GenerateDiagramRequest};
use boardgram::services::memory::MemoryCanvas;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Diagram(#[from] DiagramError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "boardgram", about = "Compile Mermaid diagrams into whiteboard frames, shapes and connectors")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a diagram and print its kind and size.
    Parse(InputArgs),
    /// Print the creation plan without touching a board.
    Plan(PlanCommand),
    /// Create the diagram on an in-memory board and print the result.
    Generate(GenerateCommand),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Diagram file, or `-` for stdin.
    input: String,
}

#[derive(Args, Debug, Clone, Copy)]
struct LayoutArgs {
    #[arg(long)]
    start_x: Option<f64>,
    #[arg(long)]
    start_y: Option<f64>,
    #[arg(long)]
    node_width: Option<f64>,
    /// Draw flowchart nodes as flowchart stencils.
    #[arg(long)]
    stencils: bool,
}

impl LayoutArgs {
    fn overrides(self) -> LayoutOverrides {
        LayoutOverrides {
            start_x: self.start_x,
            start_y: self.start_y,
            node_width: self.node_width,
            ..LayoutOverrides::default()
        }
    }

    fn convert_options(self) -> ConvertOptions {
        ConvertOptions { use_stencils: self.stencils }
    }
}

#[derive(Args, Debug)]
struct PlanCommand {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    layout: LayoutArgs,
}

#[derive(Args, Debug)]
struct GenerateCommand {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long, env = "BOARDGRAM_BOARD_ID", default_value = "local")]
    board: String,
    #[arg(long)]
    parent_id: Option<String>,
    #[command(flatten)]
    layout: LayoutArgs,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Parse(args) => run_parse(&args),
        Command::Plan(plan) => run_plan(&plan),
        Command::Generate(generate) => run_generate(generate).await,
    };

    if let Err(CliError::Parse(e) | CliError::Diagram(DiagramError::Parse(e))) = &result {
        eprintln!("hint: {}", e.suggestion());
    }
    result
}

fn run_parse(args: &InputArgs) -> Result<(), CliError> {
    let text = read_input(&args.input)?;
    let diagram = mermaid::parse(&text)?;
    print_json(&json!({
        "kind": diagram.kind(),
        "direction": diagram.direction(),
        "nodes": diagram.node_count(),
        "edges": diagram.edge_count(),
    }))
}

fn run_plan(plan: &PlanCommand) -> Result<(), CliError> {
    let text = read_input(&plan.input.input)?;
    let config = DiagramConfig::from_env()?;
    let overrides = config.layout.merged(&plan.layout.overrides());
    let converted = mermaid::compile_with(&text, &overrides, &plan.layout.convert_options())?;
    print_json(&converted)
}

async fn run_generate(generate: GenerateCommand) -> Result<(), CliError> {
    let text = read_input(&generate.input.input)?;
    let config = DiagramConfig::from_env()?;

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping diagram creation");
            on_signal.cancel();
        }
    });

    let request = GenerateDiagramRequest {
        board_id: generate.board,
        diagram: text,
        start_x: generate.layout.start_x,
        start_y: generate.layout.start_y,
        node_width: generate.layout.node_width,
        parent_id: generate.parent_id,
        use_stencils: generate.layout.stencils,
    };
    let canvas = MemoryCanvas::new();
    let result = diagram::generate_diagram(&canvas, &request, &config, cancel).await?;
    eprintln!("{}", result.message);
    print_json(&result)
}

fn read_input(path: &str) -> Result<String, CliError> {
    let read = if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        std::fs::read_to_string(path)
    };
    read.map_err(|source| CliError::Read { path: path.to_owned(), source })
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
