use clap::{Parser, ValueEnum};
use sokoboard::{HashedBoardManager, Level, Levels, Mover, Snapshot, SolvingMode, Tessellation};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TessellationType {
    Sokoban,
    Trioban,
    Hexoban,
    Octoban,
}

impl From<TessellationType> for Tessellation {
    fn from(tessellation: TessellationType) -> Self {
        match tessellation {
            TessellationType::Sokoban => Tessellation::Sokoban,
            TessellationType::Trioban => Tessellation::Trioban,
            TessellationType::Hexoban => Tessellation::Hexoban,
            TessellationType::Octoban => Tessellation::Octoban,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Forward,
    Reverse,
}

impl From<Mode> for SolvingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Forward => SolvingMode::Forward,
            Mode::Reverse => SolvingMode::Reverse,
        }
    }
}

#[derive(Parser)]
#[command(name = "sokoboard")]
#[command(about = "Plays moves on Sokoban-family puzzles", long_about = None)]
struct Args {
    /// Path to the levels file (XSB format)
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Level number to play (1-indexed)
    #[arg(value_name = "LEVEL", default_value = "1")]
    level: usize,

    /// Board tessellation
    #[arg(short, long, value_enum, default_value = "sokoban")]
    tessellation: TessellationType,

    /// Solving mode; reverse mode switches boxes and goals and pulls boxes
    #[arg(short, long, value_enum, default_value = "forward")]
    mode: Mode,

    /// Moves to play: lowercase moves, uppercase pushes or pulls
    #[arg(short = 'M', long, default_value = "")]
    moves: String,

    /// Sokoban+ box tags, overriding the level file
    #[arg(long)]
    boxorder: Option<String>,

    /// Sokoban+ goal tags, overriding the level file
    #[arg(long)]
    goalorder: Option<String>,

    /// Seed for Zobrist hash factors
    #[arg(long)]
    seed: Option<u64>,

    /// Walk away from boxes instead of pulling them in reverse mode
    #[arg(long, default_value = "false")]
    no_pulls: bool,

    /// Print the board after every step
    #[arg(short, long)]
    print_steps: bool,
}

fn play(level: &Level, args: &Args) -> sokoboard::Result<()> {
    let tessellation = Tessellation::from(args.tessellation);
    let solving_mode = SolvingMode::from(args.mode);
    let board = level.board().clone();
    let mut manager = match args.seed {
        Some(seed) => HashedBoardManager::with_seed(board, seed),
        None => HashedBoardManager::new(board),
    };

    let boxorder = args.boxorder.as_deref().or(level.boxorder());
    let goalorder = args.goalorder.as_deref().or(level.goalorder());
    if let (Some(boxorder), Some(goalorder)) = (boxorder, goalorder) {
        manager.set_boxorder(boxorder);
        manager.set_goalorder(goalorder);
        manager.enable_sokoban_plus()?;
    }

    let mut mover = Mover::with_manager(manager, solving_mode)?;
    mover.set_pulls_boxes(!args.no_pulls);

    let snapshot = Snapshot::from_moves_str(tessellation, solving_mode, &args.moves)?;
    if let Some(title) = level.title() {
        println!("{}", title);
    }
    println!("Starting position:\n{}", mover.board());

    let mut played = Snapshot::new(tessellation, solving_mode);
    let total = snapshot.len();
    for (count, step) in snapshot.iter().enumerate() {
        mover.move_pusher(step.direction)?;
        played.extend(mover.last_move().iter().copied());
        if args.print_steps {
            println!("{} ({}/{}):\n{}", step.direction, count + 1, total, mover.board());
        }
    }

    let manager = mover.board_manager();
    println!("Final position:\n{}", mover.board());
    println!(
        "moves: {:<5}  pushes: {:<5}  hash: {:016x}  solved: {}",
        played.moves_count(),
        played.pushes_count(),
        manager.state_hash(),
        if manager.is_solved() { 'Y' } else { 'N' }
    );
    if !played.is_empty() {
        println!("played: {}", played);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let levels = match Levels::from_file(&args.levels_file, args.tessellation.into()) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Error loading levels: {}", e);
            std::process::exit(1);
        }
    };

    if args.level == 0 {
        eprintln!("Error: level numbers must be at least 1");
        std::process::exit(1);
    }

    let Some(level) = levels.get(args.level - 1) else {
        eprintln!(
            "Error: level {} not found (file contains {} levels)",
            args.level,
            levels.len()
        );
        std::process::exit(1);
    };

    if let Err(e) = play(level, &args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
