use std::fmt;
use std::str::FromStr;

use crate::error::ChessError;
use crate::movegen::{Move, MoveKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Upper-case letter used by FEN and algebraic notation.
    pub fn letter(&self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_letter(letter: char) -> Option<PieceKind> {
        match letter.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// Row holding this side's king and rooks at the start.
    pub fn back_row(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn pawn_row(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn promotion_row(&self) -> u8 {
        self.opposite().back_row()
    }

    /// Row delta of a pawn advance.
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// A board coordinate. Row 0 is White's back rank (rank 1), column 0 is the
/// a-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Panics when the coordinate is off the board; use [`Square::offset`]
    /// for arithmetic that may step outside.
    pub const fn new(row: u8, col: u8) -> Self {
        assert!(row < 8 && col < 8, "square coordinate outside the 8x8 board");
        Self { row, col }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    pub fn offset(&self, d_row: i8, d_col: i8) -> Option<Square> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Every square, row by row from White's back rank.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square { row, col }))
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.col) as char
    }

    pub fn rank_char(&self) -> char {
        (b'1' + self.row) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        match (bytes[0], bytes[1]) {
            (file @ b'a'..=b'h', rank @ b'1'..=b'8') => Ok(Square::new(rank - b'1', file - b'a')),
            _ => Err(ChessError::InvalidSquare(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub square: Square,
    /// Set the first time the piece moves and never cleared.
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, square: Square) -> Self {
        Self {
            kind,
            color,
            square,
            has_moved: false,
        }
    }
}

/// An 8x8 grid of optional pieces plus the en-passant target. `Clone` is a
/// full deep copy; no two boards share a piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    pub en_passant: Option<Square>,
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Board {
    /// The standard starting position.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for color in [Color::White, Color::Black] {
            for (col, &kind) in BACK_RANK.iter().enumerate() {
                board.place(kind, color, Square::new(color.back_row(), col as u8));
                board.place(PieceKind::Pawn, color, Square::new(color.pawn_row(), col as u8));
            }
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
            en_passant: None,
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row as usize][square.col as usize]
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Puts a fresh (unmoved) piece on `square`, replacing any occupant.
    pub fn place(&mut self, kind: PieceKind, color: Color, square: Square) {
        self.set(square, Some(Piece::new(kind, color, square)));
    }

    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.row as usize][square.col as usize] = piece.map(|mut p| {
            p.square = square;
            p
        });
    }

    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.row as usize][square.col as usize].take()
    }

    /// Relocates the piece on `from` and returns whatever stood on `to`.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.remove(from);
        let captured = self.remove(to);
        if let Some(mut piece) = piece {
            piece.has_moved = true;
            self.set(to, Some(piece));
        }
        captured
    }

    pub fn pieces(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.squares
            .iter()
            .flatten()
            .filter_map(|cell| *cell)
            .filter(move |piece| piece.color == color)
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|piece| piece.kind == PieceKind::King)
            .map(|piece| piece.square)
    }

    pub fn count(&self, kind: PieceKind, color: Color) -> usize {
        self.pieces(color).filter(|piece| piece.kind == kind).count()
    }

    /// Plays an already-validated move: relocates the rook when castling,
    /// removes the passed pawn on en passant, auto-promotes to a queen and
    /// updates the en-passant target. Returns the captured piece.
    pub fn make_move(&mut self, mv: &Move) -> Option<Piece> {
        let row = mv.from.row();
        let side_capture = match mv.kind {
            MoveKind::EnPassant => self.remove(Square::new(row, mv.to.col())),
            MoveKind::CastleKingside => {
                self.move_piece(Square::new(row, 7), Square::new(row, 5));
                None
            }
            MoveKind::CastleQueenside => {
                self.move_piece(Square::new(row, 0), Square::new(row, 3));
                None
            }
            _ => None,
        };

        let landed_on = self.move_piece(mv.from, mv.to);

        if let Some(piece) = self.piece_at(mv.to) {
            if piece.kind == PieceKind::Pawn && mv.to.row() == piece.color.promotion_row() {
                let mut queen = Piece::new(PieceKind::Queen, piece.color, mv.to);
                queen.has_moved = true;
                self.set(mv.to, Some(queen));
            }
        }

        self.en_passant = if mv.kind == MoveKind::DoubleStep {
            Some(Square::new((mv.from.row() + mv.to.row()) / 2, mv.from.col()))
        } else {
            None
        };

        side_capture.or(landed_on)
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for row in (0..8).rev() {
            for col in 0..8 {
                let piece_char = match self.piece_at(Square::new(row, col)) {
                    Some(piece) if piece.color == Color::White => piece.kind.letter(),
                    Some(piece) => piece.kind.letter().to_ascii_lowercase(),
                    None => '.',
                };
                result.push(piece_char);
                if col < 7 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        write!(f, "{}", result)
    }
}
