use crate::board::{Board, Color, Piece, PieceKind};
use crate::movegen::MoveGenerator;

/// Scores are in millipawns: a pawn is worth 1000.
pub type Score = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalTier {
    /// Material only.
    Basic,
    /// Material, piece placement, mobility and centre occupancy.
    Advanced,
}

/// Heuristic constants of the evaluator. Only their relative sizes matter
/// for move choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalWeights {
    // Piece values
    pub pawn_value: Score,
    pub knight_value: Score,
    pub bishop_value: Score,
    pub rook_value: Score,
    pub queen_value: Score,
    pub king_value: Score,

    // Placement, per unit of distance (or rows advanced)
    pub minor_centralization: Score,
    pub pawn_advancement: Score,
    pub king_shelter: Score,

    // Per legal move of difference
    pub mobility: Score,

    // Per piece standing on d4, e4, d5 or e5
    pub center_occupancy: Score,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            pawn_value: 1000,
            knight_value: 3000,
            bishop_value: 3000,
            rook_value: 5000,
            queen_value: 9000,
            king_value: 0,

            minor_centralization: 10,
            pawn_advancement: 5,
            king_shelter: 10,

            mobility: 100,

            center_occupancy: 300,
        }
    }
}

pub struct Evaluator {
    pub weights: EvalWeights,
    move_generator: MoveGenerator,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_weights(EvalWeights::default())
    }

    pub fn with_weights(weights: EvalWeights) -> Self {
        Self {
            weights,
            move_generator: MoveGenerator::new(),
        }
    }

    /// Score of `board` from `perspective`'s point of view.
    pub fn evaluate(&self, board: &Board, perspective: Color, tier: EvalTier) -> Score {
        match tier {
            EvalTier::Basic => self.material_balance(board, perspective),
            EvalTier::Advanced => self.evaluate_advanced(board, perspective),
        }
    }

    pub fn material(&self, board: &Board, color: Color) -> Score {
        board.pieces(color).map(|piece| self.get_piece_value(piece.kind)).sum()
    }

    fn material_balance(&self, board: &Board, perspective: Color) -> Score {
        self.material(board, perspective) - self.material(board, perspective.opposite())
    }

    fn evaluate_advanced(&self, board: &Board, perspective: Color) -> Score {
        let opponent = perspective.opposite();
        let mut score = self.material_balance(board, perspective);

        for piece in board.pieces(perspective) {
            score += self.placement_bonus(&piece) + self.center_bonus(&piece);
        }
        for piece in board.pieces(opponent) {
            score -= self.placement_bonus(&piece) + self.center_bonus(&piece);
        }

        score += self.evaluate_mobility(board, perspective);

        score
    }

    pub fn get_piece_value(&self, kind: PieceKind) -> Score {
        match kind {
            PieceKind::Pawn => self.weights.pawn_value,
            PieceKind::Knight => self.weights.knight_value,
            PieceKind::Bishop => self.weights.bishop_value,
            PieceKind::Rook => self.weights.rook_value,
            PieceKind::Queen => self.weights.queen_value,
            PieceKind::King => self.weights.king_value,
        }
    }

    fn placement_bonus(&self, piece: &Piece) -> Score {
        let distance = center_distance(piece);
        match piece.kind {
            PieceKind::Knight | PieceKind::Bishop => -distance * self.weights.minor_centralization,
            PieceKind::Pawn => {
                let start = piece.color.back_row() as Score;
                let advancement = (piece.square.row() as Score - start).abs();
                advancement * self.weights.pawn_advancement
            }
            PieceKind::King => distance * self.weights.king_shelter,
            PieceKind::Rook | PieceKind::Queen => 0,
        }
    }

    fn center_bonus(&self, piece: &Piece) -> Score {
        let (row, col) = (piece.square.row(), piece.square.col());
        if (3..=4).contains(&row) && (3..=4).contains(&col) {
            self.weights.center_occupancy
        } else {
            0
        }
    }

    fn evaluate_mobility(&self, board: &Board, perspective: Color) -> Score {
        let own = self.move_generator.legal_moves(board, perspective).len() as Score;
        let theirs = self
            .move_generator
            .legal_moves(board, perspective.opposite())
            .len() as Score;
        (own - theirs) * self.weights.mobility
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

/// Manhattan distance from the board's centre point, in whole squares
/// (1 on the four centre squares, 7 in the corners).
fn center_distance(piece: &Piece) -> Score {
    let row = piece.square.row() as Score;
    let col = piece.square.col() as Score;
    ((7 - 2 * row).abs() + (7 - 2 * col).abs()) / 2
}
