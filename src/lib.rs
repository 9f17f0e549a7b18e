pub mod board;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod movegen;
pub mod notation;
pub mod search;

pub use board::{Board, Color, Piece, PieceKind, Square};
pub use error::{ChessError, MoveRejected};
pub use evaluation::{EvalTier, EvalWeights, Evaluator, Score};
pub use game::{GameState, MoveCategory, MoveRecord, Outcome};
pub use movegen::{Move, MoveGenerator, MoveKind};
pub use search::{Algorithm, Difficulty, Search, SearchConfig};

/// Standard starting position, White to move.
pub fn new_game() -> GameState {
    GameState::new()
}

pub fn legal_moves(state: &GameState, square: Square) -> Vec<Move> {
    state.legal_moves(square)
}

pub fn apply_move(state: &mut GameState, from: Square, to: Square) -> Result<MoveRecord, MoveRejected> {
    state.apply_move(from, to)
}

pub fn undo(state: &mut GameState) -> bool {
    state.undo()
}

pub fn is_in_check(state: &GameState, color: Color) -> bool {
    state.is_in_check(color)
}

pub fn outcome(state: &GameState) -> Outcome {
    state.outcome()
}

/// Runs a fresh, entropy-seeded search. `None` means the side to move has
/// nothing to play.
pub fn select_move(state: &GameState, config: &SearchConfig) -> Option<Move> {
    Search::new().select_move(state, config)
}

pub fn notation(record: &MoveRecord) -> String {
    notation::notation(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn play(state: &mut GameState, moves: &[&str]) {
        for text in moves {
            let (from, to) = text.split_at(2);
            apply_move(state, sq(from), sq(to)).unwrap_or_else(|err| panic!("{} rejected: {}", text, err));
        }
    }

    fn perft(fen: &str, depth: u32) -> u64 {
        let state = GameState::from_fen(fen).unwrap();
        MoveGenerator::new().perft(state.board(), state.side_to_move(), depth)
    }

    #[test]
    fn test_initial_position() {
        let state = new_game();
        let generator = MoveGenerator::new();
        let moves = state.all_legal_moves();

        // White should have 20 legal moves in the initial position
        assert_eq!(moves.len(), 20);
        for mv in moves {
            assert!(generator.is_legal(state.board(), &mv));
        }
        assert_eq!(outcome(&state), Outcome::InProgress);
    }

    #[test]
    fn test_perft_kiwipete() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        assert_eq!(perft(fen, 1), 48);
        assert_eq!(perft(fen, 2), 2039);
    }

    #[test]
    fn test_perft_rook_endgame() {
        let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
        assert_eq!(perft(fen, 1), 14);
        assert_eq!(perft(fen, 2), 191);
        assert_eq!(perft(fen, 3), 2812);
    }

    #[test]
    fn test_fools_mate() {
        let mut state = new_game();
        play(&mut state, &["f2f3", "e7e5", "g2g4", "d8h4"]);

        assert_eq!(outcome(&state), Outcome::Checkmate(Color::Black));
        assert!(is_in_check(&state, Color::White));
        assert!(select_move(&state, &Difficulty::Easy.config()).is_none());
        assert_eq!(notation(&state.history()[3]), "Qh4");
    }

    #[test]
    fn test_stalemate() {
        let state = GameState::from_fen("k7/8/1Q6/8/8/8/8/7K b - - 0 1").unwrap();

        assert!(!is_in_check(&state, Color::Black));
        assert_eq!(outcome(&state), Outcome::Stalemate);
        assert!(state.is_game_over());
    }

    #[test]
    fn test_stalemate_reached_by_a_move() {
        let mut state = GameState::from_fen("k7/8/8/2Q5/8/8/8/7K w - - 0 1").unwrap();
        play(&mut state, &["c5b6"]);
        assert_eq!(outcome(&state), Outcome::Stalemate);
    }

    #[test]
    fn test_castling_kingside_in_one_move() {
        let mut state = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let record = apply_move(&mut state, sq("e1"), sq("g1")).unwrap();

        assert_eq!(record.category, MoveCategory::Castle);
        assert_eq!(notation(&record), "O-O");
        let board = state.board();
        assert_eq!(board.piece_at(sq("g1")).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(board.piece_at(sq("f1")).map(|p| p.kind), Some(PieceKind::Rook));
        assert!(board.is_empty(sq("e1")));
        assert!(board.is_empty(sq("h1")));

        let record = apply_move(&mut state, sq("e8"), sq("c8")).unwrap();
        assert_eq!(notation(&record), "O-O-O");
        assert_eq!(state.board().piece_at(sq("d8")).map(|p| p.kind), Some(PieceKind::Rook));
    }

    #[test]
    fn test_castling_rejected_when_blocked() {
        let mut state = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K1NR w KQkq - 0 1").unwrap();
        assert_eq!(
            apply_move(&mut state, sq("e1"), sq("g1")),
            Err(MoveRejected::Illegal {
                from: sq("e1"),
                to: sq("g1")
            })
        );

        let mut state = GameState::from_fen("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1").unwrap();
        assert!(apply_move(&mut state, sq("e1"), sq("c1")).is_err());
        assert!(apply_move(&mut state, sq("e1"), sq("g1")).is_ok());
    }

    #[test]
    fn test_castling_rejected_through_or_into_attack() {
        // The rook on f8 covers f1, the square the king passes.
        let mut state = GameState::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(apply_move(&mut state, sq("e1"), sq("g1")).is_err());
        assert!(apply_move(&mut state, sq("e1"), sq("c1")).is_ok());

        // The rook on g8 covers the landing square.
        let mut state = GameState::from_fen("4k1r1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(apply_move(&mut state, sq("e1"), sq("g1")).is_err());
    }

    #[test]
    fn test_castling_rejected_in_check_or_after_moving() {
        let mut state = GameState::from_fen("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1").unwrap();
        assert!(is_in_check(&state, Color::White));
        assert!(apply_move(&mut state, sq("e1"), sq("g1")).is_err());
        assert!(apply_move(&mut state, sq("e1"), sq("c1")).is_err());

        // The rook leaves and comes back; the right is gone.
        let mut state = GameState::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        play(&mut state, &["h1h2", "e8e7", "h2h1", "e7e8"]);
        assert!(apply_move(&mut state, sq("e1"), sq("g1")).is_err());
        assert!(apply_move(&mut state, sq("e1"), sq("c1")).is_ok());
    }

    #[test]
    fn test_castling_rejected_after_king_returns_home() {
        let mut state = GameState::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        play(&mut state, &["e1e2", "e8e7", "e2e1", "e7e8"]);

        assert!(!legal_moves(&state, sq("e1")).iter().any(|mv| mv.is_castling()));
        assert!(apply_move(&mut state, sq("e1"), sq("g1")).is_err());
        assert!(apply_move(&mut state, sq("e1"), sq("c1")).is_err());
        assert!(state.to_fen().starts_with("4k3/8/8/8/8/8/8/R3K2R w - -"));
    }

    #[test]
    fn test_en_passant_capture() {
        let mut state = new_game();
        play(&mut state, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(state.board().en_passant, Some(sq("d6")));

        let record = apply_move(&mut state, sq("e5"), sq("d6")).unwrap();
        assert_eq!(record.category, MoveCategory::EnPassant);
        assert_eq!(record.captured, Some(PieceKind::Pawn));
        assert_eq!(notation(&record), "exd6");
        assert!(state.board().is_empty(sq("d5")));
        assert_eq!(state.captured_by(Color::White), &[PieceKind::Pawn]);
        assert_eq!(state.board().en_passant, None);
    }

    #[test]
    fn test_en_passant_expires_after_one_move() {
        let mut state = new_game();
        play(&mut state, &["e2e4", "a7a6", "e4e5", "d7d5", "a2a3", "a6a5"]);

        assert!(!legal_moves(&state, sq("e5")).iter().any(|mv| mv.to == sq("d6")));
        assert!(apply_move(&mut state, sq("e5"), sq("d6")).is_err());
    }

    #[test]
    fn test_promotion_to_queen() {
        let mut state = GameState::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let record = apply_move(&mut state, sq("a7"), sq("a8")).unwrap();

        assert!(record.is_promotion);
        assert_eq!(record.category, MoveCategory::Promotion);
        assert_eq!(notation(&record), "a8=Q");
        let queen = state.board().piece_at(sq("a8")).unwrap();
        assert_eq!((queen.kind, queen.color), (PieceKind::Queen, Color::White));
        assert!(queen.has_moved);
        assert!(is_in_check(&state, Color::Black));
    }

    #[test]
    fn test_undo_after_undo() {
        let mut state = new_game();
        let start = state.clone();
        play(&mut state, &["e2e4"]);
        let after_one = state.clone();
        play(&mut state, &["d7d5", "e4d5"]);

        assert!(undo(&mut state));
        assert!(undo(&mut state));
        assert_eq!(state, after_one);
        assert!(undo(&mut state));
        assert_eq!(state, start);
        assert!(!undo(&mut state));
    }

    #[test]
    fn test_undo_from_constructed_position() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let mut state = GameState::from_fen(fen).unwrap();
        play(&mut state, &["e1g1", "e8c8"]);

        assert!(undo(&mut state));
        assert!(undo(&mut state));
        assert_eq!(state.to_fen(), fen);
    }

    #[test]
    fn test_random_playouts_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(2024);

        for _ in 0..8 {
            let mut state = new_game();
            for _ in 0..60 {
                let moves = state.all_legal_moves();
                let Some(mv) = moves.choose(&mut rng).copied() else {
                    break;
                };
                let mover = state.side_to_move();
                let before = state.clone();

                apply_move(&mut state, mv.from, mv.to).unwrap();
                assert!(!is_in_check(&state, mover), "{} left its king in check with {}", mover, mv);
                for color in [Color::White, Color::Black] {
                    assert_eq!(state.board().count(PieceKind::King, color), 1);
                }

                let mut undone = state.clone();
                assert!(undo(&mut undone));
                assert_eq!(undone, before);
            }
        }
    }

    #[test]
    fn test_select_move_returns_a_legal_move() {
        let state = new_game();
        let mv = select_move(&state, &Difficulty::Easy.config()).unwrap();
        assert!(state.all_legal_moves().contains(&mv));
    }
}
