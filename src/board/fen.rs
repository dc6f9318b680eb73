//! FEN parsing and formatting.

use std::fmt;
use std::str::FromStr;

use super::position::Position;
use super::types::{
    Color, Piece, PieceType, Square, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K,
    CASTLE_WHITE_Q,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// Fewer fields than the mandatory four.
    MissingFields,
    /// Board field does not describe 8 ranks of 8 squares.
    BadBoard,
    BadPiece(char),
    BadSideToMove(String),
    BadCastling(String),
    BadEnPassant(String),
    BadCounter(String),
    /// Each side must have exactly one king.
    BadKingCount,
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::MissingFields => write!(f, "FEN needs at least 4 fields"),
            FenError::BadBoard => write!(f, "board field is not 8x8"),
            FenError::BadPiece(c) => write!(f, "unknown piece character '{c}'"),
            FenError::BadSideToMove(s) => write!(f, "bad side to move '{s}'"),
            FenError::BadCastling(s) => write!(f, "bad castling field '{s}'"),
            FenError::BadEnPassant(s) => write!(f, "bad en passant field '{s}'"),
            FenError::BadCounter(s) => write!(f, "bad move counter '{s}'"),
            FenError::BadKingCount => write!(f, "each side needs exactly one king"),
        }
    }
}

impl std::error::Error for FenError {}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::MissingFields);
        }

        let mut pos = Position::empty();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadBoard);
        }
        for (row, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - row;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let piece = Piece::from_char(c).ok_or(FenError::BadPiece(c))?;
                    if file >= 8 {
                        return Err(FenError::BadBoard);
                    }
                    pos.set_piece_raw(piece, Square::new(file, rank));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadBoard);
            }
        }

        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadSideToMove(other.to_string())),
        };

        pos.castling = 0;
        if fields[2] != "-" {
            for c in fields[2].chars() {
                pos.castling |= match c {
                    'K' => CASTLE_WHITE_K,
                    'Q' => CASTLE_WHITE_Q,
                    'k' => CASTLE_BLACK_K,
                    'q' => CASTLE_BLACK_Q,
                    _ => return Err(FenError::BadCastling(fields[2].to_string())),
                };
            }
        }

        pos.ep_square = match fields[3] {
            "-" => None,
            sq => Some(
                Square::parse(sq).ok_or_else(|| FenError::BadEnPassant(sq.to_string()))?,
            ),
        };

        pos.half_move_clock = match fields.get(4) {
            Some(s) => s
                .parse()
                .map_err(|_| FenError::BadCounter((*s).to_string()))?,
            None => 0,
        };
        pos.full_move = match fields.get(5) {
            Some(s) => s
                .parse()
                .map_err(|_| FenError::BadCounter((*s).to_string()))?,
            None => 1,
        };

        for color in [Color::White, Color::Black] {
            if pos.pieces(color, PieceType::King).count() != 1 {
                return Err(FenError::BadKingCount);
            }
        }

        pos.finalize();
        Ok(pos)
    }
}

impl Position {
    /// Format the position as a FEN string.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut run = 0;
            for file in 0..8 {
                match self.piece_on(Square::new(file, rank)) {
                    Some(piece) => {
                        if run > 0 {
                            fen.push(char::from_digit(run, 10).unwrap_or('8'));
                            run = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => run += 1,
                }
            }
            if run > 0 {
                fen.push(char::from_digit(run, 10).unwrap_or('8'));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling == 0 {
            fen.push('-');
        } else {
            for (bit, c) in [
                (CASTLE_WHITE_K, 'K'),
                (CASTLE_WHITE_Q, 'Q'),
                (CASTLE_BLACK_K, 'k'),
                (CASTLE_BLACK_Q, 'q'),
            ] {
                if self.castling & bit != 0 {
                    fen.push(c);
                }
            }
        }

        match self.ep_square {
            Some(sq) => {
                fen.push(' ');
                fen.push_str(&sq.to_string());
            }
            None => fen.push_str(" -"),
        }

        fen.push_str(&format!(" {} {}", self.half_move_clock, self.full_move));
        fen
    }
}
