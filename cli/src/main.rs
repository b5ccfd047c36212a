mod bot;
mod store;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Args, Parser, Subcommand};
use puzzleboard_core::store::read_best;
use puzzleboard_core::timer::{format_best, format_clock};
use puzzleboard_core::{AlignmentRules, CanvasSize, Difficulty, PuzzleCatalog, PuzzleController};
use rand::Rng;
use tracing_subscriber::EnvFilter;

use crate::store::FileStore;

#[derive(Parser)]
#[command(name = "puzzleboard-cli", version, about = "Headless tools for the puzzleboard jigsaw widget")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the difficulty presets.
    Presets,
    /// Show the puzzle catalog and which entry is featured this week.
    Catalog {
        #[command(flatten)]
        catalog: CatalogArgs,
        #[arg(long)]
        now_ms: Option<f64>,
    },
    /// Shuffle a board and let the solver bot drag it back together.
    Simulate {
        #[command(flatten)]
        board: BoardArgs,
        #[command(flatten)]
        bot: bot::BotArgs,
    },
    /// Lock every piece in place, as the simulate buttons do.
    ForceWin {
        #[command(flatten)]
        board: BoardArgs,
        #[arg(long)]
        update_best: bool,
        #[arg(long, default_value_t = 60_000.0)]
        elapsed_ms: f64,
    },
    /// Print the stored best times for a puzzle.
    Best {
        #[arg(long)]
        puzzle: Option<String>,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

#[derive(Args)]
struct StoreArgs {
    #[arg(long = "store", env = "PUZZLEBOARD_STORE", default_value = "puzzleboard-store.json")]
    store_path: PathBuf,
}

#[derive(Args)]
struct CatalogArgs {
    /// `{"puzzles": [...]}` file; the built-in puzzle when absent.
    #[arg(long = "catalog", visible_alias = "file", env = "PUZZLEBOARD_CATALOG")]
    catalog_path: Option<PathBuf>,
}

#[derive(Args)]
struct BoardArgs {
    #[arg(long, default_value = "easy", value_parser = parse_difficulty_arg)]
    difficulty: Difficulty,
    #[arg(long, default_value_t = 800)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Catalog id; defaults to this week's featured puzzle.
    #[arg(long)]
    puzzle: Option<String>,
    /// Shuffle seed, decimal or 0x-prefixed hex; random when absent.
    #[arg(long, value_parser = parse_seed_arg)]
    seed: Option<u32>,
    #[command(flatten)]
    store: StoreArgs,
    #[command(flatten)]
    catalog: CatalogArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Presets => {
            for difficulty in Difficulty::ALL {
                println!("{difficulty}: {}", difficulty.grid().label());
            }
        }
        Commands::Catalog { catalog, now_ms } => {
            let catalog = load_catalog(&catalog)?;
            let featured = catalog.week_index(now_ms.unwrap_or_else(wall_clock_ms));
            for (index, puzzle) in catalog.puzzles().iter().enumerate() {
                let marker = if index == featured { "*" } else { " " };
                println!("{marker} {} | {} | {}", puzzle.id, puzzle.title, puzzle.optimized_image_url());
            }
        }
        Commands::Simulate { board, bot } => {
            let (mut controller, seed) = build_controller(&board)?;
            println!(
                "puzzle: {} ({}, {})",
                controller.current_puzzle().id,
                board.difficulty,
                board.difficulty.grid().label()
            );
            println!("seed: {seed:#010x}");
            bot::run(&mut controller, &bot)?;
        }
        Commands::ForceWin {
            board,
            update_best,
            elapsed_ms,
        } => {
            let (mut controller, _seed) = build_controller(&board)?;
            if update_best {
                controller.start_clock(0.0);
            }
            match controller.force_win(update_best, elapsed_ms.max(0.0))? {
                Some(report) => {
                    println!("completed: {} in {}", report.puzzle_id, format_clock(report.elapsed_ms));
                    println!("new best: {}", report.new_best);
                    println!("{}", format_best(report.best_ms));
                }
                None => println!("already complete"),
            }
        }
        Commands::Best {
            puzzle,
            store,
            catalog,
        } => {
            let catalog = load_catalog(&catalog)?;
            let puzzle_id =
                puzzle.unwrap_or_else(|| catalog.wrapped(catalog.week_index(wall_clock_ms())).id.clone());
            let store = FileStore::open(store.store_path);
            for difficulty in Difficulty::ALL {
                println!("{puzzle_id} {difficulty}: {}", format_best(read_best(&store, &puzzle_id, difficulty)));
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn wall_clock_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

fn load_catalog(args: &CatalogArgs) -> Result<PuzzleCatalog, Box<dyn std::error::Error>> {
    let Some(path) = args.catalog_path.as_deref() else {
        return Ok(PuzzleCatalog::default());
    };
    let raw = std::fs::read_to_string(path)?;
    Ok(PuzzleCatalog::from_json_or_default(Some(&raw)))
}

fn build_controller(
    board: &BoardArgs,
) -> Result<(PuzzleController<FileStore>, u32), Box<dyn std::error::Error>> {
    let catalog = load_catalog(&board.catalog)?;
    let index = match board.puzzle.as_deref() {
        Some(id) => match catalog.position(id) {
            Some(index) => index,
            None => {
                let available: Vec<&str> = catalog.puzzles().iter().map(|p| p.id.as_str()).collect();
                return Err(err_msg(format!(
                    "unknown puzzle: {id} (available: {})",
                    available.join(", ")
                )));
            }
        },
        None => catalog.week_index(wall_clock_ms()),
    };
    let store = FileStore::open(board.store.store_path.clone());
    tracing::debug!(path = %store.path().display(), "store opened");
    let mut controller = PuzzleController::new(store, catalog, AlignmentRules::default());
    controller.select_puzzle(index);
    controller.select_difficulty(board.difficulty, 0);
    let seed = board.seed.unwrap_or_else(|| rand::rng().random());
    controller.install_puzzle(CanvasSize::new(board.width, board.height), seed);
    Ok((controller, seed))
}

fn err_msg(message: String) -> Box<dyn std::error::Error> {
    message.into()
}

fn parse_difficulty_arg(raw: &str) -> Result<Difficulty, String> {
    raw.parse()
}

fn parse_seed_arg(raw: &str) -> Result<u32, String> {
    let trimmed = raw.trim();
    let parsed = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        trimmed.parse::<u32>()
    };
    parsed.map_err(|err| format!("invalid seed {raw:?}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_accept_decimal_and_hex() {
        assert_eq!(parse_seed_arg("42"), Ok(42));
        assert_eq!(parse_seed_arg("0x5EED"), Ok(0x5EED));
        assert!(parse_seed_arg("0xZZ").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
