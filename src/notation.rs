//! Text forms: short algebraic notation for history entries and FEN for
//! whole positions.

use std::fmt;

use crate::board::{Board, Color, PieceKind, Square};
use crate::error::ChessError;
use crate::game::{MoveCategory, MoveRecord};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Short algebraic form: piece letter (none for pawns), origin file on pawn
/// captures, `x` on captures, destination, `=Q` on promotion. Castling is
/// `O-O` / `O-O-O`.
pub fn notation(record: &MoveRecord) -> String {
    if record.category == MoveCategory::Castle {
        let text = if record.to.col() > record.from.col() { "O-O" } else { "O-O-O" };
        return text.to_string();
    }

    let mut text = String::new();
    if record.piece != PieceKind::Pawn {
        text.push(record.piece.letter());
    }
    if record.captured.is_some() {
        if record.piece == PieceKind::Pawn {
            text.push(record.from.file_char());
        }
        text.push('x');
    }
    text.push_str(&record.to.to_string());
    if record.is_promotion {
        text.push_str("=Q");
    }
    text
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", notation(self))
    }
}

/// Reads placement, side to move, castling availability and the en-passant
/// target. Move clocks are accepted and ignored. Castling availability is
/// turned into `has_moved` flags on kings and home-corner rooks.
pub fn parse_fen(fen: &str) -> Result<(Board, Color), ChessError> {
    let mut fields = fen.split_whitespace();
    let placement = fields
        .next()
        .ok_or_else(|| ChessError::InvalidFen("empty string".to_string()))?;
    let side = match fields.next() {
        Some("w") => Color::White,
        Some("b") => Color::Black,
        other => {
            return Err(ChessError::InvalidFen(format!(
                "side to move must be w or b, got {:?}",
                other.unwrap_or("")
            )))
        }
    };
    let castling = fields.next().unwrap_or("-");
    let en_passant = fields.next().unwrap_or("-");

    let mut board = Board::empty();
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessError::InvalidFen(format!("expected 8 ranks, found {}", ranks.len())));
    }
    for (i, rank) in ranks.iter().enumerate() {
        let row = 7 - i as u8;
        let mut col: u8 = 0;
        for c in rank.chars() {
            if let Some(skip) = c.to_digit(10) {
                col = col.saturating_add(skip as u8);
                continue;
            }
            let kind = PieceKind::from_letter(c)
                .ok_or_else(|| ChessError::InvalidFen(format!("unknown piece {:?}", c)))?;
            if col >= 8 {
                return Err(ChessError::InvalidFen(format!("rank {} is too long", row + 1)));
            }
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            board.place(kind, color, Square::new(row, col));
            col += 1;
        }
        if col != 8 {
            return Err(ChessError::InvalidFen(format!("rank {} does not cover 8 files", row + 1)));
        }
    }

    if castling != "-" && !castling.chars().all(|c| "KQkq".contains(c)) {
        return Err(ChessError::InvalidFen(format!("bad castling field {:?}", castling)));
    }
    mark_moved_pieces(&mut board, castling);

    board.en_passant = match en_passant {
        "-" => None,
        text => {
            let target = text
                .parse::<Square>()
                .map_err(|_| ChessError::InvalidFen(format!("bad en-passant square {:?}", text)))?;
            // The square a pawn of the side not on move just skipped.
            let expected_row = match side {
                Color::White => 5,
                Color::Black => 2,
            };
            if target.row() != expected_row {
                return Err(ChessError::InvalidFen(format!(
                    "en-passant square {} is not on rank {}",
                    target,
                    expected_row + 1
                )));
            }
            Some(target)
        }
    };

    Ok((board, side))
}

fn mark_moved_pieces(board: &mut Board, castling: &str) {
    for square in Square::all() {
        let Some(mut piece) = board.piece_at(square) else {
            continue;
        };
        let (kingside, queenside) = match piece.color {
            Color::White => (castling.contains('K'), castling.contains('Q')),
            Color::Black => (castling.contains('k'), castling.contains('q')),
        };
        let home = piece.color.back_row();
        piece.has_moved = match piece.kind {
            PieceKind::King => !(square == Square::new(home, 4) && (kingside || queenside)),
            PieceKind::Rook => {
                !((square == Square::new(home, 7) && kingside) || (square == Square::new(home, 0) && queenside))
            }
            PieceKind::Pawn => square.row() != piece.color.pawn_row(),
            _ => false,
        };
        board.set(square, Some(piece));
    }
}

pub fn write_fen(board: &Board, side: Color) -> String {
    let mut placement = String::new();
    for row in (0..8).rev() {
        let mut empty = 0;
        for col in 0..8 {
            match board.piece_at(Square::new(row, col)) {
                Some(piece) => {
                    if empty > 0 {
                        placement.push_str(&empty.to_string());
                        empty = 0;
                    }
                    let letter = piece.kind.letter();
                    placement.push(match piece.color {
                        Color::White => letter,
                        Color::Black => letter.to_ascii_lowercase(),
                    });
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            placement.push_str(&empty.to_string());
        }
        if row > 0 {
            placement.push('/');
        }
    }

    let mut castling = String::new();
    for (color, letters) in [(Color::White, ['K', 'Q']), (Color::Black, ['k', 'q'])] {
        let home = color.back_row();
        let unmoved = |col: u8, kind: PieceKind| {
            board
                .piece_at(Square::new(home, col))
                .map_or(false, |p| p.kind == kind && p.color == color && !p.has_moved)
        };
        if unmoved(4, PieceKind::King) {
            if unmoved(7, PieceKind::Rook) {
                castling.push(letters[0]);
            }
            if unmoved(0, PieceKind::Rook) {
                castling.push(letters[1]);
            }
        }
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let side = match side {
        Color::White => "w",
        Color::Black => "b",
    };
    let en_passant = board
        .en_passant
        .map_or_else(|| "-".to_string(), |sq| sq.to_string());

    format!("{} {} {} {} 0 1", placement, side, castling, en_passant)
}
