use log::{debug, info};

use crate::board::{Board, Color, PieceKind, Square};
use crate::error::{ChessError, MoveRejected};
use crate::movegen::{Move, MoveGenerator, MoveKind};
use crate::notation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCategory {
    Normal,
    Castle,
    EnPassant,
    Promotion,
}

/// One accepted move, as kept in the game history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub color: Color,
    pub captured: Option<PieceKind>,
    pub category: MoveCategory,
    pub is_promotion: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    /// The color is the winner.
    Checkmate(Color),
    Stalemate,
}

/// The live state of a match: board, side to move, history, captures and
/// outcome. All mutation goes through [`GameState::apply_move`] and
/// [`GameState::undo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    side_to_move: Color,
    history: Vec<MoveRecord>,
    captured: [Vec<PieceKind>; 2],
    outcome: Outcome,
    start_board: Board,
    start_side: Color,
    move_generator: MoveGenerator,
}

impl GameState {
    /// Standard starting position, White to move.
    pub fn new() -> Self {
        Self::unchecked(Board::new(), Color::White)
    }

    /// Builds a state from an arbitrary placement. Fails when either side
    /// does not have exactly one king.
    pub fn from_board(board: Board, side_to_move: Color) -> Result<Self, ChessError> {
        for color in [Color::White, Color::Black] {
            let kings = board.count(PieceKind::King, color);
            if kings != 1 {
                return Err(ChessError::Invariant(format!(
                    "{} has {} kings, expected exactly one",
                    color, kings
                )));
            }
        }
        Ok(Self::unchecked(board, side_to_move))
    }

    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let (board, side_to_move) = notation::parse_fen(fen)?;
        Self::from_board(board, side_to_move)
    }

    pub fn to_fen(&self) -> String {
        notation::write_fen(&self.board, self.side_to_move)
    }

    fn unchecked(board: Board, side_to_move: Color) -> Self {
        let mut state = Self {
            start_board: board.clone(),
            start_side: side_to_move,
            board,
            side_to_move,
            history: Vec::new(),
            captured: [Vec::new(), Vec::new()],
            outcome: Outcome::InProgress,
            move_generator: MoveGenerator::new(),
        };
        state.refresh_outcome();
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Kinds captured by `color`, in capture order.
    pub fn captured_by(&self, color: Color) -> &[PieceKind] {
        &self.captured[color.index()]
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.move_generator.is_king_in_check(&self.board, color)
    }

    /// Legal moves of the piece on `square`. Empty when the square is empty
    /// or holds a piece of the side not on move. Recomputed on every call.
    pub fn legal_moves(&self, square: Square) -> Vec<Move> {
        match self.board.piece_at(square) {
            Some(piece) if piece.color == self.side_to_move && !self.is_game_over() => {
                self.move_generator.legal_moves_from(&self.board, square)
            }
            _ => Vec::new(),
        }
    }

    /// Every legal move of the side to move, in board scan order.
    pub fn all_legal_moves(&self) -> Vec<Move> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.move_generator.legal_moves(&self.board, self.side_to_move)
    }

    /// Validates and plays `from -> to`. Either everything (board, history,
    /// captures, turn, outcome) is updated or nothing is.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<MoveRecord, MoveRejected> {
        match self.check_move(from, to) {
            Ok(mv) => Ok(self.play(mv)),
            Err(reason) => {
                debug!("rejected {}{}: {}", from, to, reason);
                Err(reason)
            }
        }
    }

    fn check_move(&self, from: Square, to: Square) -> Result<Move, MoveRejected> {
        if self.is_game_over() {
            return Err(MoveRejected::GameOver);
        }
        let piece = self
            .board
            .piece_at(from)
            .ok_or(MoveRejected::EmptySquare(from))?;
        if piece.color != self.side_to_move {
            return Err(MoveRejected::WrongSide {
                square: from,
                color: piece.color,
            });
        }
        self.move_generator
            .legal_moves_from(&self.board, from)
            .into_iter()
            .find(|mv| mv.to == to)
            .ok_or(MoveRejected::Illegal { from, to })
    }

    fn play(&mut self, mv: Move) -> MoveRecord {
        let color = self.side_to_move;
        let captured = self.board.make_move(&mv);
        let is_promotion = mv.piece == PieceKind::Pawn && mv.to.row() == color.promotion_row();
        let category = match mv.kind {
            MoveKind::CastleKingside | MoveKind::CastleQueenside => MoveCategory::Castle,
            MoveKind::EnPassant => MoveCategory::EnPassant,
            _ if is_promotion => MoveCategory::Promotion,
            _ => MoveCategory::Normal,
        };

        if let Some(piece) = captured {
            self.captured[color.index()].push(piece.kind);
        }

        let record = MoveRecord {
            from: mv.from,
            to: mv.to,
            piece: mv.piece,
            color,
            captured: captured.map(|piece| piece.kind),
            category,
            is_promotion,
        };
        self.history.push(record);
        self.side_to_move = color.opposite();
        self.refresh_outcome();

        debug!("{} played {} ({})", color, notation::notation(&record), mv);
        record
    }

    fn refresh_outcome(&mut self) {
        let side = self.side_to_move;
        if self.move_generator.has_legal_move(&self.board, side) {
            self.outcome = Outcome::InProgress;
            return;
        }

        self.outcome = if self.is_in_check(side) {
            Outcome::Checkmate(side.opposite())
        } else {
            Outcome::Stalemate
        };
        match self.outcome {
            Outcome::Checkmate(winner) => info!("checkmate, {} wins", winner),
            _ => info!("stalemate, {} has no legal move", side),
        }
    }

    /// Takes back the last move by replaying the remaining history from the
    /// starting position. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some((last, kept)) = self.history.split_last() else {
            return false;
        };

        let mut replay = Self::unchecked(self.start_board.clone(), self.start_side);
        for record in kept {
            if let Err(err) = replay.apply_move(record.from, record.to) {
                panic!(
                    "history replay rejected {} ({}{}): {}",
                    notation::notation(record),
                    record.from,
                    record.to,
                    err
                );
            }
        }

        debug!("undid {}", notation::notation(last));
        *self = replay;
        true
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn play(state: &mut GameState, moves: &[(&str, &str)]) {
        for (from, to) in moves {
            state
                .apply_move(sq(from), sq(to))
                .unwrap_or_else(|err| panic!("{}{} rejected: {}", from, to, err));
        }
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let mut state = GameState::new();
        let before = state.clone();

        assert_eq!(
            state.apply_move(sq("e4"), sq("e5")),
            Err(MoveRejected::EmptySquare(sq("e4")))
        );
        assert_eq!(
            state.apply_move(sq("e7"), sq("e5")),
            Err(MoveRejected::WrongSide {
                square: sq("e7"),
                color: Color::Black
            })
        );
        assert_eq!(
            state.apply_move(sq("e2"), sq("e5")),
            Err(MoveRejected::Illegal {
                from: sq("e2"),
                to: sq("e5")
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_turns_alternate_and_history_grows() {
        let mut state = GameState::new();
        play(&mut state, &[("e2", "e4"), ("e7", "e5"), ("g1", "f3")]);

        assert_eq!(state.side_to_move(), Color::Black);
        assert_eq!(state.history().len(), 3);
        assert_eq!(state.history()[2].piece, PieceKind::Knight);
        assert_eq!(state.history()[2].color, Color::White);
    }

    #[test]
    fn test_captures_are_recorded_per_side() {
        let mut state = GameState::new();
        play(&mut state, &[("e2", "e4"), ("d7", "d5"), ("e4", "d5"), ("d8", "d5")]);

        assert_eq!(state.captured_by(Color::White), &[PieceKind::Pawn]);
        assert_eq!(state.captured_by(Color::Black), &[PieceKind::Pawn]);
        assert_eq!(state.history()[3].captured, Some(PieceKind::Pawn));
    }

    #[test]
    fn test_legal_moves_only_for_side_to_move() {
        let state = GameState::new();
        assert_eq!(state.legal_moves(sq("b1")).len(), 2);
        assert!(state.legal_moves(sq("b8")).is_empty());
        assert!(state.legal_moves(sq("e4")).is_empty());
        assert_eq!(state.all_legal_moves().len(), 20);
    }

    #[test]
    fn test_undo_restores_previous_state() {
        let mut state = GameState::new();
        play(&mut state, &[("e2", "e4"), ("e7", "e5")]);
        let after_one = {
            let mut s = GameState::new();
            play(&mut s, &[("e2", "e4")]);
            s
        };

        assert!(state.undo());
        assert_eq!(state, after_one);
        assert!(state.undo());
        assert_eq!(state, GameState::new());
        assert!(!state.undo());
    }

    #[test]
    fn test_from_board_requires_one_king_each() {
        let mut board = Board::empty();
        board.place(PieceKind::King, Color::White, sq("e1"));
        assert!(matches!(
            GameState::from_board(board.clone(), Color::White),
            Err(ChessError::Invariant(_))
        ));

        board.place(PieceKind::King, Color::Black, sq("e8"));
        board.place(PieceKind::King, Color::Black, sq("a8"));
        assert!(GameState::from_board(board, Color::White).is_err());
    }

    #[test]
    fn test_no_moves_after_game_over() {
        let mut state = GameState::new();
        play(&mut state, &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")]);

        assert!(state.is_game_over());
        assert!(state.all_legal_moves().is_empty());
        assert_eq!(state.apply_move(sq("a2"), sq("a3")), Err(MoveRejected::GameOver));
    }
}
