use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use two_salmons::{Color, Difficulty, GameState, Outcome, Search, SearchConfig, Square};

const SELF_PLAY_PLY_LIMIT: usize = 300;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Play chess against a minimax engine", long_about = None)]
struct Args {
    /// easy, medium or hard
    #[arg(short, long, default_value = "medium")]
    difficulty: Difficulty,

    /// Side the human plays
    #[arg(long, value_enum, default_value = "white")]
    play_as: Side,

    /// Let the engine play both sides and print the game
    #[arg(long)]
    self_play: bool,

    /// Two humans share the console; undo takes back one move
    #[arg(long, conflicts_with = "self_play")]
    two_player: bool,

    /// Seed for reproducible engine choices
    #[arg(long)]
    seed: Option<u64>,

    /// Start from this position instead of the initial one
    #[arg(long)]
    fen: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

struct Controller {
    initial: GameState,
    state: GameState,
    search: Search,
    config: SearchConfig,
    /// Side the engine plays, `None` when two humans play.
    engine: Option<Color>,
}

impl Controller {
    fn new(initial: GameState, search: Search, config: SearchConfig, engine: Option<Color>) -> Self {
        Controller {
            state: initial.clone(),
            initial,
            search,
            config,
            engine,
        }
    }

    fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        print!("{}", self.state.board());
        print!("{}", self.engine_reply()?);
        stdout.flush()?;

        while reader.read_line(&mut line)? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }

            match self.handle_command(command) {
                Ok(response) => print!("{}", response),
                Err(err) => println!("error: {:#}", err),
            }

            stdout.flush()?;
            line.clear();
        }
        Ok(())
    }

    fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(String::new());
        }

        match parts[0] {
            "board" => Ok(self.state.board().to_string()),
            "fen" => Ok(format!("{}\n", self.state.to_fen())),
            "new" => {
                self.state = self.initial.clone();
                let mut response = self.state.board().to_string();
                response.push_str(&self.engine_reply()?);
                Ok(response)
            }
            "undo" => self.handle_undo(),
            "moves" => {
                let square: Square = parts
                    .get(1)
                    .ok_or_else(|| anyhow!("usage: moves <square>"))?
                    .parse()?;
                let targets: Vec<String> = self
                    .state
                    .legal_moves(square)
                    .iter()
                    .map(|mv| mv.to.to_string())
                    .collect();
                Ok(format!("{}\n", targets.join(" ")))
            }
            text => self.handle_move(text),
        }
    }

    fn handle_move(&mut self, text: &str) -> Result<String> {
        let (from, to) = parse_move(text)?;
        if self.engine == Some(self.state.side_to_move()) {
            return Err(anyhow!("it is not your turn"));
        }

        let record = self.state.apply_move(from, to)?;
        let mut response = format!("you play {}\n", record);
        response.push_str(&self.engine_reply()?);
        response.push_str(&self.state.board().to_string());
        response.push_str(&status_line(&self.state));
        Ok(response)
    }

    /// Against the engine, takes back its reply together with the human move
    /// before it. If that leaves the engine on move (its opening move was the
    /// only one), it plays again.
    fn handle_undo(&mut self) -> Result<String> {
        if !self.state.undo() {
            return Ok("nothing to undo\n".to_string());
        }
        if self.engine == Some(self.state.side_to_move()) {
            self.state.undo();
        }
        let mut response = self.engine_reply()?;
        response.push_str(&self.state.board().to_string());
        Ok(response)
    }

    fn engine_reply(&mut self) -> Result<String> {
        if self.state.is_game_over() || self.engine != Some(self.state.side_to_move()) {
            return Ok(String::new());
        }

        match self.search.select_move(&self.state, &self.config) {
            Some(mv) => {
                let record = self
                    .state
                    .apply_move(mv.from, mv.to)
                    .with_context(|| format!("engine produced an illegal move {}", mv))?;
                Ok(format!("engine plays {}\n", record))
            }
            None => Ok(String::new()),
        }
    }
}

fn parse_move(text: &str) -> Result<(Square, Square)> {
    if text.len() != 4 || !text.is_ascii() {
        return Err(anyhow!("unknown command {:?}", text));
    }
    let from = text[0..2].parse()?;
    let to = text[2..4].parse()?;
    Ok((from, to))
}

fn status_line(state: &GameState) -> String {
    match state.outcome() {
        Outcome::Checkmate(winner) => format!("checkmate, {} wins\n", winner),
        Outcome::Stalemate => "stalemate\n".to_string(),
        Outcome::InProgress if state.is_in_check(state.side_to_move()) => {
            format!("{} is in check\n", state.side_to_move())
        }
        Outcome::InProgress => String::new(),
    }
}

fn self_play(mut state: GameState, search: &mut Search, config: &SearchConfig) -> Result<()> {
    while !state.is_game_over() && state.history().len() < SELF_PLAY_PLY_LIMIT {
        let Some(mv) = search.select_move(&state, config) else {
            break;
        };
        state
            .apply_move(mv.from, mv.to)
            .with_context(|| format!("engine produced an illegal move {}", mv))?;
    }

    let black_first = state.history().first().map_or(false, |record| record.color == Color::Black);
    let mut moves = String::new();
    for (i, record) in state.history().iter().enumerate() {
        if record.color == Color::White || i == 0 {
            let number = (i + usize::from(black_first)) / 2 + 1;
            let dots = if record.color == Color::White { "." } else { "..." };
            moves.push_str(&format!("{}{} ", number, dots));
        }
        moves.push_str(&format!("{} ", record));
    }

    println!("{}", moves.trim_end());
    print!("{}", state.board());
    match state.outcome() {
        Outcome::InProgress => println!("stopped after {} plies", state.history().len()),
        _ => print!("{}", status_line(&state)),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();

    let initial = match &args.fen {
        Some(fen) => GameState::from_fen(fen).context("invalid --fen")?,
        None => GameState::new(),
    };
    let mut search = match args.seed {
        Some(seed) => Search::with_seed(seed),
        None => Search::new(),
    };
    let config = args.difficulty.config();
    info!("difficulty {}, engine depth {}-{}", args.difficulty, config.min_depth, config.max_depth);

    if args.self_play {
        return self_play(initial, &mut search, &config);
    }

    let engine = if args.two_player {
        None
    } else {
        Some(Color::from(args.play_as).opposite())
    };
    Controller::new(initial, search, config, engine).run()
}
