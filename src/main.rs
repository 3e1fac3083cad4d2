use boardstore::{Board, BoardStore, jsonl, render, seed};
use clap::{Parser, Subcommand, ValueEnum};
use eyre::Result;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "boardstore")]
#[command(about = "BoardStore CLI - Replay kanban board commands against a seed board")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Seed board file (.json, .yaml or .yml); defaults to the config dir seed or the sample board
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Re-rank columns and tasks of the seed before validating it
    #[arg(long)]
    normalize: bool,

    /// Output format for the board
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the seed board
    Show,

    /// Replay a JSONL command script and print the resulting board
    Apply {
        /// Path to the command script
        script: PathBuf,
    },

    /// Check the seed board against the board invariants
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Yaml,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the board
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let mut board = load_seed(cli.seed.as_deref())?;
    if cli.normalize {
        board = seed::normalize(board);
    }

    match cli.command {
        Commands::Show => {
            let store = BoardStore::init(board)?;
            print_board(&store.snapshot(), cli.format)?;
        }
        Commands::Apply { script } => {
            let store = BoardStore::init(board)?;
            let commands = jsonl::read_commands(&script)?;
            let applied = store.apply_all(&commands);
            eprintln!("applied {} of {} commands", applied, commands.len());
            print_board(&store.snapshot(), cli.format)?;
        }
        Commands::Validate => {
            seed::validate(&board)?;
            println!(
                "Board is valid: {} columns, {} tasks",
                board.column_count(),
                board.task_count()
            );
        }
    }

    Ok(())
}

fn load_seed(path: Option<&Path>) -> Result<Board> {
    if let Some(path) = path {
        return seed::load(path);
    }

    match seed::default_seed_path() {
        Some(path) if path.exists() => seed::load(&path),
        _ => {
            info!("No seed file found, using sample board");
            Ok(seed::sample_board())
        }
    }
}

fn print_board(board: &Board, format: Format) -> Result<()> {
    let output = match format {
        Format::Text => render::to_text(board),
        Format::Json => render::to_json(board)?,
        Format::Yaml => render::to_yaml(board)?,
    };
    print!("{}", output);
    if format == Format::Json {
        println!();
    }
    Ok(())
}
