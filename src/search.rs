use std::fmt;
use std::str::FromStr;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Color};
use crate::error::ChessError;
use crate::evaluation::{EvalTier, Evaluator, Score};
use crate::game::GameState;
use crate::movegen::{Move, MoveGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Minimax,
    AlphaBeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Depth in plies is drawn uniformly from `min_depth..=max_depth`.
    pub min_depth: u32,
    pub max_depth: u32,
    pub algorithm: Algorithm,
    pub tier: EvalTier,
    /// Largest magnitude of the random term added to each root score.
    pub noise: Score,
    /// Nodes visited past this budget are scored instead of expanded.
    pub max_nodes: Option<u64>,
}

impl SearchConfig {
    pub fn fixed(depth: u32, algorithm: Algorithm, tier: EvalTier) -> Self {
        Self {
            min_depth: depth,
            max_depth: depth,
            algorithm,
            tier,
            noise: 0,
            max_nodes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn config(&self) -> SearchConfig {
        match self {
            Difficulty::Easy => SearchConfig::fixed(1, Algorithm::Minimax, EvalTier::Basic),
            Difficulty::Medium => SearchConfig {
                min_depth: 2,
                max_depth: 3,
                algorithm: Algorithm::Minimax,
                tier: EvalTier::Basic,
                noise: 250,
                max_nodes: None,
            },
            Difficulty::Hard => SearchConfig {
                min_depth: 4,
                max_depth: 5,
                algorithm: Algorithm::AlphaBeta,
                tier: EvalTier::Advanced,
                noise: 0,
                max_nodes: None,
            },
        }
    }
}

impl FromStr for Difficulty {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ChessError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Game-tree search over disposable board copies. The live [`GameState`] is
/// only read.
pub struct Search {
    evaluator: Evaluator,
    move_generator: MoveGenerator,
    rng: StdRng,
    nodes_searched: u64,
    max_nodes: Option<u64>,
}

impl Search {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible depth draws and score noise.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            evaluator: Evaluator::new(),
            move_generator: MoveGenerator::new(),
            rng,
            nodes_searched: 0,
            max_nodes: None,
        }
    }

    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Picks a move for the side to move, or `None` when it has no legal
    /// move. Ties go to the first move in scan order with the best score.
    pub fn select_move(&mut self, state: &GameState, config: &SearchConfig) -> Option<Move> {
        self.nodes_searched = 0;
        self.max_nodes = config.max_nodes;

        let moves = state.all_legal_moves();
        if moves.is_empty() {
            return None;
        }

        let depth = if config.min_depth >= config.max_depth {
            config.max_depth
        } else {
            self.rng.gen_range(config.min_depth..=config.max_depth)
        }
        .max(1);
        let me = state.side_to_move();

        let mut best: Option<(Move, Score)> = None;
        let mut alpha = Score::MIN;
        let beta = Score::MAX;

        for mv in moves {
            let mut board_copy = state.board().clone();
            board_copy.make_move(&mv);

            let score = match config.algorithm {
                Algorithm::Minimax => self.minimax(&board_copy, me.opposite(), depth - 1, me, config.tier),
                Algorithm::AlphaBeta => {
                    self.alpha_beta(&board_copy, me.opposite(), depth - 1, alpha, beta, me, config.tier)
                }
            };
            let adjusted = if config.noise > 0 {
                score.saturating_add(self.rng.gen_range(-config.noise..=config.noise))
            } else {
                score
            };
            trace!("root {} scored {} (adjusted {})", mv, score, adjusted);

            if best.map_or(true, |(_, best_score)| adjusted > best_score) {
                best = Some((mv, adjusted));
            }
            if config.algorithm == Algorithm::AlphaBeta {
                alpha = alpha.max(score);
            }
        }

        if let Some((mv, score)) = best {
            debug!(
                "{} chose {} at depth {} with score {} after {} nodes",
                me, mv, depth, score, self.nodes_searched
            );
        }
        best.map(|(mv, _)| mv)
    }

    /// Minimax value of `board` with `side` on move, seen from `me`.
    fn minimax(&mut self, board: &Board, side: Color, depth: u32, me: Color, tier: EvalTier) -> Score {
        self.nodes_searched += 1;

        if depth == 0 || self.budget_exhausted() {
            return self.evaluator.evaluate(board, me, tier);
        }

        let moves = self.move_generator.legal_moves(board, side);
        if moves.is_empty() {
            return self.evaluator.evaluate(board, me, tier);
        }

        let maximizing = side == me;
        let mut best_score = if maximizing { Score::MIN } else { Score::MAX };

        for mv in moves {
            let mut board_copy = board.clone();
            board_copy.make_move(&mv);

            let score = self.minimax(&board_copy, side.opposite(), depth - 1, me, tier);
            best_score = if maximizing {
                best_score.max(score)
            } else {
                best_score.min(score)
            };
        }

        best_score
    }

    /// Same recursion as [`Search::minimax`] with `alpha`/`beta` bounds;
    /// siblings are skipped once `beta <= alpha`.
    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &mut self,
        board: &Board,
        side: Color,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        me: Color,
        tier: EvalTier,
    ) -> Score {
        self.nodes_searched += 1;

        if depth == 0 || self.budget_exhausted() {
            return self.evaluator.evaluate(board, me, tier);
        }

        let moves = self.move_generator.legal_moves(board, side);
        if moves.is_empty() {
            return self.evaluator.evaluate(board, me, tier);
        }

        let maximizing = side == me;
        let mut best_score = if maximizing { Score::MIN } else { Score::MAX };

        for mv in moves {
            let mut board_copy = board.clone();
            board_copy.make_move(&mv);

            let score = self.alpha_beta(&board_copy, side.opposite(), depth - 1, alpha, beta, me, tier);
            if maximizing {
                best_score = best_score.max(score);
                alpha = alpha.max(score);
            } else {
                best_score = best_score.min(score);
                beta = beta.min(score);
            }

            if beta <= alpha {
                break;
            }
        }

        best_score
    }

    fn budget_exhausted(&self) -> bool {
        self.max_nodes.map_or(false, |limit| self.nodes_searched > limit)
    }

    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

impl Default for Search {
    fn default() -> Self {
        Search::new()
    }
}
