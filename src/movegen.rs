use std::fmt;

use crate::board::{Board, Color, Piece, PieceKind, Square};

/// Shape of a candidate move, decided when it is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Quiet,
    DoubleStep,
    Capture,
    EnPassant,
    CastleKingside,
    CastleQueenside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub kind: MoveKind,
}

impl Move {
    pub fn new(from: Square, to: Square, piece: PieceKind, kind: MoveKind) -> Self {
        Self {
            from,
            to,
            piece,
            kind,
        }
    }

    pub fn is_capture(&self) -> bool {
        matches!(self.kind, MoveKind::Capture | MoveKind::EnPassant)
    }

    pub fn is_castling(&self) -> bool {
        matches!(self.kind, MoveKind::CastleKingside | MoveKind::CastleQueenside)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (-1, 0), (1, 0), (0, -1), (0, 1),
    (-1, -1), (-1, 1), (1, -1), (1, 1),
];

/// Move-shape generation and the legality filter. Stateless; every query is
/// a pure function of the board it is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Pseudo-legal moves of the piece on `from`, ignoring whether they leave
    /// its own king in check. Castling shapes are proposed whenever the king
    /// has not moved and still need [`MoveGenerator::can_castle`].
    pub fn pseudo_moves(&self, board: &Board, from: Square) -> Vec<Move> {
        let Some(piece) = board.piece_at(from) else {
            return Vec::new();
        };
        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(board, &piece),
            PieceKind::Knight => self.step_moves(board, &piece, &KNIGHT_OFFSETS),
            PieceKind::Bishop => self.slide_moves(board, &piece, &BISHOP_DIRECTIONS),
            PieceKind::Rook => self.slide_moves(board, &piece, &ROOK_DIRECTIONS),
            PieceKind::Queen => self.slide_moves(board, &piece, &QUEEN_DIRECTIONS),
            PieceKind::King => {
                let mut moves = self.step_moves(board, &piece, &KING_OFFSETS);
                if !piece.has_moved {
                    if let Some(to) = piece.square.offset(0, 2) {
                        moves.push(Move::new(piece.square, to, PieceKind::King, MoveKind::CastleKingside));
                    }
                    if let Some(to) = piece.square.offset(0, -2) {
                        moves.push(Move::new(piece.square, to, PieceKind::King, MoveKind::CastleQueenside));
                    }
                }
                moves
            }
        }
    }

    fn pawn_moves(&self, board: &Board, pawn: &Piece) -> Vec<Move> {
        let mut moves = Vec::new();
        let from = pawn.square;
        let forward = pawn.color.forward();

        if let Some(one) = from.offset(forward, 0) {
            if board.is_empty(one) {
                moves.push(Move::new(from, one, PieceKind::Pawn, MoveKind::Quiet));
                if from.row() == pawn.color.pawn_row() {
                    if let Some(two) = from.offset(2 * forward, 0) {
                        if board.is_empty(two) {
                            moves.push(Move::new(from, two, PieceKind::Pawn, MoveKind::DoubleStep));
                        }
                    }
                }
            }
        }

        for d_col in [-1, 1] {
            let Some(to) = from.offset(forward, d_col) else {
                continue;
            };
            match board.piece_at(to) {
                Some(target) if target.color != pawn.color => {
                    moves.push(Move::new(from, to, PieceKind::Pawn, MoveKind::Capture));
                }
                None if board.en_passant == Some(to) => {
                    // The passed pawn sits beside us, not on the target square.
                    let passed = Square::new(from.row(), to.col());
                    let is_victim = board
                        .piece_at(passed)
                        .map_or(false, |p| p.kind == PieceKind::Pawn && p.color != pawn.color);
                    if is_victim {
                        moves.push(Move::new(from, to, PieceKind::Pawn, MoveKind::EnPassant));
                    }
                }
                _ => {}
            }
        }

        moves
    }

    fn step_moves(&self, board: &Board, piece: &Piece, offsets: &[(i8, i8)]) -> Vec<Move> {
        offsets
            .iter()
            .filter_map(|&(d_row, d_col)| piece.square.offset(d_row, d_col))
            .filter_map(|to| match board.piece_at(to) {
                None => Some(Move::new(piece.square, to, piece.kind, MoveKind::Quiet)),
                Some(target) if target.color != piece.color => {
                    Some(Move::new(piece.square, to, piece.kind, MoveKind::Capture))
                }
                Some(_) => None,
            })
            .collect()
    }

    fn slide_moves(&self, board: &Board, piece: &Piece, directions: &[(i8, i8)]) -> Vec<Move> {
        let mut moves = Vec::new();
        for &(d_row, d_col) in directions {
            let mut cursor = piece.square.offset(d_row, d_col);
            while let Some(to) = cursor {
                match board.piece_at(to) {
                    None => moves.push(Move::new(piece.square, to, piece.kind, MoveKind::Quiet)),
                    Some(target) => {
                        if target.color != piece.color {
                            moves.push(Move::new(piece.square, to, piece.kind, MoveKind::Capture));
                        }
                        break;
                    }
                }
                cursor = to.offset(d_row, d_col);
            }
        }
        moves
    }

    /// True if a piece of `attacker` could capture on `square`: the reverse
    /// of the capture shapes produced by [`MoveGenerator::pseudo_moves`].
    pub fn is_square_attacked(&self, board: &Board, square: Square, attacker: Color) -> bool {
        let holds = |sq: Option<Square>, kinds: &[PieceKind]| {
            sq.and_then(|sq| board.piece_at(sq))
                .map_or(false, |p| p.color == attacker && kinds.contains(&p.kind))
        };

        // Pawns capture diagonally forward, so look one row behind the target.
        let behind = -attacker.forward();
        if holds(square.offset(behind, -1), &[PieceKind::Pawn])
            || holds(square.offset(behind, 1), &[PieceKind::Pawn])
        {
            return true;
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(dr, dc)| holds(square.offset(dr, dc), &[PieceKind::Knight]))
        {
            return true;
        }

        if KING_OFFSETS
            .iter()
            .any(|&(dr, dc)| holds(square.offset(dr, dc), &[PieceKind::King]))
        {
            return true;
        }

        let sliders = [
            (&BISHOP_DIRECTIONS, [PieceKind::Bishop, PieceKind::Queen]),
            (&ROOK_DIRECTIONS, [PieceKind::Rook, PieceKind::Queen]),
        ];
        for (directions, kinds) in sliders {
            for &(dr, dc) in directions.iter() {
                let mut cursor = square.offset(dr, dc);
                while let Some(sq) = cursor {
                    if let Some(piece) = board.piece_at(sq) {
                        if piece.color == attacker && kinds.contains(&piece.kind) {
                            return true;
                        }
                        break;
                    }
                    cursor = sq.offset(dr, dc);
                }
            }
        }

        false
    }

    pub fn is_king_in_check(&self, board: &Board, color: Color) -> bool {
        match board.find_king(color) {
            Some(king) => self.is_square_attacked(board, king, color.opposite()),
            None => false,
        }
    }

    /// Castling rules: king and rook unmoved on their home squares, nothing
    /// between them, king not in check, and neither the square it crosses nor
    /// the one it lands on attacked.
    pub fn can_castle(&self, board: &Board, color: Color, kingside: bool) -> bool {
        let row = color.back_row();
        let king_square = Square::new(row, 4);
        let is_unmoved = |sq: Square, kind: PieceKind| {
            board
                .piece_at(sq)
                .map_or(false, |p| p.kind == kind && p.color == color && !p.has_moved)
        };

        let (rook_col, between, king_path): (u8, &[u8], [u8; 2]) = if kingside {
            (7, &[5, 6][..], [5, 6])
        } else {
            (0, &[1, 2, 3][..], [3, 2])
        };

        if !is_unmoved(king_square, PieceKind::King) || !is_unmoved(Square::new(row, rook_col), PieceKind::Rook) {
            return false;
        }
        if between.iter().any(|&col| !board.is_empty(Square::new(row, col))) {
            return false;
        }
        if self.is_king_in_check(board, color) {
            return false;
        }

        king_path.iter().all(|&col| {
            let mut probe = board.clone();
            probe.move_piece(king_square, Square::new(row, col));
            !self.is_king_in_check(&probe, color)
        })
    }

    /// A pseudo-legal move is legal when, played on a copy of the board, it
    /// does not leave the mover's king attacked.
    pub fn is_legal(&self, board: &Board, mv: &Move) -> bool {
        let Some(piece) = board.piece_at(mv.from) else {
            return false;
        };
        match mv.kind {
            MoveKind::CastleKingside => self.can_castle(board, piece.color, true),
            MoveKind::CastleQueenside => self.can_castle(board, piece.color, false),
            _ => {
                let mut after = board.clone();
                after.make_move(mv);
                !self.is_king_in_check(&after, piece.color)
            }
        }
    }

    pub fn legal_moves_from(&self, board: &Board, from: Square) -> Vec<Move> {
        self.pseudo_moves(board, from)
            .into_iter()
            .filter(|mv| self.is_legal(board, mv))
            .collect()
    }

    /// All legal moves of `color`, squares scanned from a1 to h8.
    pub fn legal_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        board
            .pieces(color)
            .flat_map(|piece| self.legal_moves_from(board, piece.square))
            .collect()
    }

    pub fn has_legal_move(&self, board: &Board, color: Color) -> bool {
        board.pieces(color).any(|piece| {
            self.pseudo_moves(board, piece.square)
                .iter()
                .any(|mv| self.is_legal(board, mv))
        })
    }

    /// Counts leaf nodes of the legal move tree, `depth` plies deep.
    pub fn perft(&self, board: &Board, side: Color, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = self.legal_moves(board, side);
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for mv in moves {
            let mut new_board = board.clone();
            new_board.make_move(&mv);
            nodes += self.perft(&new_board, side.opposite(), depth - 1);
        }

        nodes
    }
}
