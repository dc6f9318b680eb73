//! Board position: bitboards plus a mailbox, made and unmade by value.
//!
//! `Position` is `Copy`. The search keeps per-ply snapshots and restores them
//! instead of undoing moves, so there is no `undo_move`; `do_move` only has
//! to go forward.

use crate::board::attacks::{
    bishop_attacks, rook_attacks, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS,
};
use crate::board::types::{
    Bitboard, Color, Move, MoveKind, Piece, PieceType, Square, CASTLE_ALL, CASTLE_BLACK_K,
    CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q,
};
use crate::board::zobrist;
use crate::eval::Accumulator;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    by_color: [Bitboard; 2],
    by_kind: [Bitboard; 6],
    board: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: u8,
    pub ep_square: Option<Square>,
    pub half_move_clock: u16,
    pub full_move: u16,
    pub key: u64,
    /// Opponent pieces currently giving check to the side to move.
    pub checkers: Bitboard,
}

/// Castling rights that survive a piece moving from or to this square.
fn castle_mask(sq: Square) -> u8 {
    match sq.index() {
        0 => CASTLE_ALL & !CASTLE_WHITE_Q,
        4 => CASTLE_ALL & !(CASTLE_WHITE_K | CASTLE_WHITE_Q),
        7 => CASTLE_ALL & !CASTLE_WHITE_K,
        56 => CASTLE_ALL & !CASTLE_BLACK_Q,
        60 => CASTLE_ALL & !(CASTLE_BLACK_K | CASTLE_BLACK_Q),
        63 => CASTLE_ALL & !CASTLE_BLACK_K,
        _ => CASTLE_ALL,
    }
}

impl Position {
    pub(crate) fn empty() -> Self {
        Position {
            by_color: [Bitboard::EMPTY; 2],
            by_kind: [Bitboard::EMPTY; 6],
            board: [None; 64],
            side_to_move: Color::White,
            castling: 0,
            ep_square: None,
            half_move_clock: 0,
            full_move: 1,
            key: 0,
            checkers: Bitboard::EMPTY,
        }
    }

    /// The standard starting position.
    #[must_use]
    pub fn startpos() -> Self {
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse()
            .expect("start position FEN is valid")
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn pieces(&self, color: Color, kind: PieceType) -> Bitboard {
        self.by_color[color.index()] & self.by_kind[kind.index()]
    }

    #[inline]
    #[must_use]
    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.by_color[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn kind_bb(&self, kind: PieceType) -> Bitboard {
        self.by_kind[kind.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.by_color[0] | self.by_color[1]
    }

    /// King square of the given color. Every valid position has both kings.
    #[inline]
    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        let king = self.pieces(color, PieceType::King);
        debug_assert!(king.any(), "position without a {color:?} king");
        king.lsb()
    }

    #[inline]
    #[must_use]
    pub fn has_non_pawns(&self, color: Color) -> bool {
        let pieces = self.by_color[color.index()]
            & !(self.by_kind[PieceType::Pawn.index()] | self.by_kind[PieceType::King.index()]);
        pieces.any()
    }

    /// A quiet move changes no material: a plain move to an empty square.
    #[inline]
    #[must_use]
    pub fn is_quiet(&self, mv: Move) -> bool {
        matches!(mv.kind(), MoveKind::Normal) && self.board[mv.dest().index()].is_none()
    }

    #[inline]
    #[must_use]
    pub fn is_capture(&self, mv: Move) -> bool {
        match mv.kind() {
            MoveKind::EnPassant => true,
            MoveKind::Castling => false,
            MoveKind::Normal | MoveKind::Promotion => self.board[mv.dest().index()].is_some(),
        }
    }

    // ------------------------------------------------------------------
    // Attack queries
    // ------------------------------------------------------------------

    /// All pieces of either color attacking `sq` under the given occupancy.
    #[must_use]
    pub fn attackers_to(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let idx = sq.index();
        (PAWN_ATTACKS[Color::White.index()][idx] & self.pieces(Color::Black, PieceType::Pawn))
            | (PAWN_ATTACKS[Color::Black.index()][idx] & self.pieces(Color::White, PieceType::Pawn))
            | (KNIGHT_ATTACKS[idx] & self.by_kind[PieceType::Knight.index()])
            | (KING_ATTACKS[idx] & self.by_kind[PieceType::King.index()])
            | (bishop_attacks(sq, occupied)
                & (self.by_kind[PieceType::Bishop.index()] | self.by_kind[PieceType::Queen.index()]))
            | (rook_attacks(sq, occupied)
                & (self.by_kind[PieceType::Rook.index()] | self.by_kind[PieceType::Queen.index()]))
    }

    #[must_use]
    pub fn attacked_by(&self, sq: Square, by: Color, occupied: Bitboard) -> bool {
        (self.attackers_to(sq, occupied) & self.by_color[by.index()]).any()
    }

    pub(crate) fn compute_checkers(&mut self) {
        let us = self.side_to_move;
        self.checkers =
            self.attackers_to(self.king_square(us), self.occupied()) & self.by_color[(!us).index()];
    }

    // ------------------------------------------------------------------
    // Making moves
    // ------------------------------------------------------------------

    fn put_piece(&mut self, piece: Piece, sq: Square, acc: &mut Accumulator) {
        let bb = Bitboard::from_square(sq);
        self.by_color[piece.color.index()] |= bb;
        self.by_kind[piece.kind.index()] |= bb;
        self.board[sq.index()] = Some(piece);
        self.key ^= zobrist::piece(piece, sq);
        acc.add_piece(piece, sq);
    }

    fn take_piece(&mut self, piece: Piece, sq: Square, acc: &mut Accumulator) {
        let bb = Bitboard::from_square(sq);
        self.by_color[piece.color.index()] ^= bb;
        self.by_kind[piece.kind.index()] ^= bb;
        self.board[sq.index()] = None;
        self.key ^= zobrist::piece(piece, sq);
        acc.remove_piece(piece, sq);
    }

    /// Raw placement used while building positions; no key or accumulator upkeep.
    pub(crate) fn set_piece_raw(&mut self, piece: Piece, sq: Square) {
        let bb = Bitboard::from_square(sq);
        self.by_color[piece.color.index()] |= bb;
        self.by_kind[piece.kind.index()] |= bb;
        self.board[sq.index()] = Some(piece);
    }

    /// Recompute the Zobrist key and checkers after raw construction.
    pub(crate) fn finalize(&mut self) {
        let mut key = 0u64;
        for idx in 0..64 {
            if let Some(piece) = self.board[idx] {
                key ^= zobrist::piece(piece, Square::from_index(idx));
            }
        }
        key ^= zobrist::castling(self.castling);
        if let Some(ep) = self.ep_square {
            key ^= zobrist::en_passant_file(ep.file());
        }
        if self.side_to_move == Color::Black {
            key ^= zobrist::side_to_move();
        }
        self.key = key;
        self.compute_checkers();
    }

    /// Play a pseudo-legal move, updating the evaluator accumulator in place.
    pub fn do_move(&mut self, mv: Move, acc: &mut Accumulator) {
        let us = self.side_to_move;
        let them = !us;
        let from = mv.src();
        let to = mv.dest();
        let piece = self.board[from.index()].expect("move source is occupied");

        self.half_move_clock += 1;
        if let Some(ep) = self.ep_square.take() {
            self.key ^= zobrist::en_passant_file(ep.file());
        }

        match mv.kind() {
            MoveKind::Normal => {
                if let Some(captured) = self.board[to.index()] {
                    self.take_piece(captured, to, acc);
                    self.half_move_clock = 0;
                }
                self.take_piece(piece, from, acc);
                self.put_piece(piece, to, acc);
                if piece.kind == PieceType::Pawn {
                    self.half_move_clock = 0;
                    if from.rank().abs_diff(to.rank()) == 2 {
                        let ep = Square::new(from.file(), (from.rank() + to.rank()) / 2);
                        self.ep_square = Some(ep);
                        self.key ^= zobrist::en_passant_file(ep.file());
                    }
                }
            }
            MoveKind::EnPassant => {
                let captured_sq = Square::new(to.file(), from.rank());
                self.take_piece(Piece::new(them, PieceType::Pawn), captured_sq, acc);
                self.take_piece(piece, from, acc);
                self.put_piece(piece, to, acc);
                self.half_move_clock = 0;
            }
            MoveKind::Castling => {
                let (rook_from, rook_to) = if to.file() == 6 {
                    (Square::new(7, from.rank()), Square::new(5, from.rank()))
                } else {
                    (Square::new(0, from.rank()), Square::new(3, from.rank()))
                };
                let rook = Piece::new(us, PieceType::Rook);
                self.take_piece(piece, from, acc);
                self.put_piece(piece, to, acc);
                self.take_piece(rook, rook_from, acc);
                self.put_piece(rook, rook_to, acc);
            }
            MoveKind::Promotion => {
                if let Some(captured) = self.board[to.index()] {
                    self.take_piece(captured, to, acc);
                }
                self.take_piece(piece, from, acc);
                self.put_piece(Piece::new(us, mv.promo_type()), to, acc);
                self.half_move_clock = 0;
            }
        }

        let new_castling = self.castling & castle_mask(from) & castle_mask(to);
        if new_castling != self.castling {
            self.key ^= zobrist::castling(self.castling) ^ zobrist::castling(new_castling);
            self.castling = new_castling;
        }

        self.key ^= zobrist::side_to_move();
        self.side_to_move = them;
        if us == Color::Black {
            self.full_move += 1;
        }
        self.compute_checkers();
    }

    /// Pass the move. Only valid when not in check.
    pub fn do_null_move(&mut self) {
        debug_assert!(self.checkers.is_empty());
        if let Some(ep) = self.ep_square.take() {
            self.key ^= zobrist::en_passant_file(ep.file());
        }
        self.key ^= zobrist::side_to_move();
        self.side_to_move = !self.side_to_move;
        self.half_move_clock += 1;
        self.compute_checkers();
    }

    // ------------------------------------------------------------------
    // Legality
    // ------------------------------------------------------------------

    /// Full legality test for a pseudo-legal move: the own king must not be
    /// attacked afterwards, and castling may not pass through check.
    #[must_use]
    pub fn is_legal(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        let them = !us;
        let from = mv.src();
        let to = mv.dest();
        let occ = self.occupied();

        match mv.kind() {
            MoveKind::Castling => {
                let transit = if to.file() == 6 {
                    Square::new(5, from.rank())
                } else {
                    Square::new(3, from.rank())
                };
                ![from, transit, to]
                    .iter()
                    .any(|&sq| self.attacked_by(sq, them, occ))
            }
            MoveKind::EnPassant => {
                let captured = Square::new(to.file(), from.rank());
                self.king_safe_after(self.king_square(us), from, to, Some(captured))
            }
            MoveKind::Normal | MoveKind::Promotion => {
                let king_move = self.board[from.index()].map(|p| p.kind) == Some(PieceType::King);
                let king_sq = if king_move { to } else { self.king_square(us) };
                self.king_safe_after(king_sq, from, to, None)
            }
        }
    }

    /// Would the king on `king_sq` be safe once `from` has moved to `to`
    /// (optionally also removing an en-passant victim)?
    fn king_safe_after(
        &self,
        king_sq: Square,
        from: Square,
        to: Square,
        ep_capture: Option<Square>,
    ) -> bool {
        let us = self.side_to_move;
        let them = !us;
        let to_bb = Bitboard::from_square(to);
        let mut occ = self.occupied() ^ Bitboard::from_square(from);
        let mut gone = to_bb;
        if let Some(cap) = ep_capture {
            let cap_bb = Bitboard::from_square(cap);
            occ ^= cap_bb;
            gone |= cap_bb;
        }
        occ |= to_bb;

        let enemy = |kind: PieceType| self.pieces(them, kind) & !gone;
        let kidx = king_sq.index();

        if (KNIGHT_ATTACKS[kidx] & enemy(PieceType::Knight)).any() {
            return false;
        }
        if (PAWN_ATTACKS[us.index()][kidx] & enemy(PieceType::Pawn)).any() {
            return false;
        }
        if (KING_ATTACKS[kidx] & self.pieces(them, PieceType::King)).any() {
            return false;
        }
        if (bishop_attacks(king_sq, occ) & (enemy(PieceType::Bishop) | enemy(PieceType::Queen)))
            .any()
        {
            return false;
        }
        if (rook_attacks(king_sq, occ) & (enemy(PieceType::Rook) | enemy(PieceType::Queen))).any() {
            return false;
        }
        true
    }

    /// Color-flipped copy: pieces mirrored across the middle of the board
    /// with colors swapped. Evaluation and search results must mirror too.
    #[must_use]
    pub fn mirror(&self) -> Position {
        let mut mirrored = Position::empty();
        for idx in 0..64 {
            let sq = Square::from_index(idx);
            if let Some(piece) = self.board[idx] {
                mirrored.set_piece_raw(Piece::new(!piece.color, piece.kind), sq.flip_rank());
            }
        }
        mirrored.side_to_move = !self.side_to_move;
        mirrored.castling = ((self.castling & 0b0011) << 2) | ((self.castling & 0b1100) >> 2);
        mirrored.ep_square = self.ep_square.map(Square::flip_rank);
        mirrored.half_move_clock = self.half_move_clock;
        mirrored.full_move = self.full_move;
        mirrored.finalize();
        mirrored
    }
}
