//! Canonical byte encoding of board states, used as the value-table key and
//! as the stored form of transitions.
//!
//! Layout: `[width, height, cells...]` with cells row-major from the bottom
//! row, one byte each (0 empty, 1 X, 2 O). The dimension header lets
//! decoding reject keys produced under a different board configuration.

use crate::error::EncodingError;
use crate::game::{Board, Cell};

/// Opaque value-table key: an independent, canonical copy of a board.
pub type StateKey = Vec<u8>;

/// Encode a board into its canonical key.
pub fn encode_board(board: &Board) -> StateKey {
    let mut key = Vec::with_capacity(2 + board.cells().len());
    key.push(board.width() as u8);
    key.push(board.height() as u8);
    key.extend(board.cells().iter().map(|c| c.to_byte()));
    key
}

/// Decode a key back into a board, validating the dimension header against
/// the running configuration.
pub fn decode_board(
    key: &[u8],
    expected_width: usize,
    expected_height: usize,
) -> Result<Board, EncodingError> {
    if key.len() < 2 {
        return Err(EncodingError::Truncated { len: key.len() });
    }
    let width = key[0] as usize;
    let height = key[1] as usize;
    if width != expected_width || height != expected_height {
        return Err(EncodingError::DimensionMismatch {
            expected_width,
            expected_height,
            found_width: width,
            found_height: height,
        });
    }
    if key.len() != 2 + width * height {
        return Err(EncodingError::Truncated { len: key.len() });
    }

    let mut board = Board::new(width, height);
    for (i, &byte) in key[2..].iter().enumerate() {
        let cell = Cell::from_byte(byte).ok_or(EncodingError::InvalidCell { byte, index: i })?;
        board.set(i / width, i % width, cell);
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Side;

    #[test]
    fn test_encode_empty_board() {
        let board = Board::new(5, 3);
        let key = encode_board(&board);
        assert_eq!(key.len(), 2 + 15);
        assert_eq!(key[0], 5);
        assert_eq!(key[1], 3);
        assert!(key[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_roundtrip_preserves_pieces() {
        let mut board = Board::new(5, 3);
        board.drop_piece(0, Side::X).unwrap();
        board.drop_piece(0, Side::O).unwrap();
        board.drop_piece(3, Side::X).unwrap();

        let key = encode_board(&board);
        let decoded = decode_board(&key, 5, 3).unwrap();
        assert_eq!(decoded, board);
    }

    #[test]
    fn test_distinct_states_distinct_keys() {
        let a = Board::new(4, 4);
        let mut b = Board::new(4, 4);
        b.drop_piece(2, Side::X).unwrap();
        assert_ne!(encode_board(&a), encode_board(&b));
    }

    #[test]
    fn test_decode_rejects_dimension_mismatch() {
        let board = Board::new(5, 3);
        let key = encode_board(&board);
        let err = decode_board(&key, 7, 6).unwrap_err();
        assert!(matches!(err, EncodingError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_decode_rejects_truncated_key() {
        assert_eq!(
            decode_board(&[5], 5, 3),
            Err(EncodingError::Truncated { len: 1 })
        );
        let mut key = encode_board(&Board::new(5, 3));
        key.pop();
        assert!(matches!(
            decode_board(&key, 5, 3),
            Err(EncodingError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_cell() {
        let mut key = encode_board(&Board::new(3, 3));
        key[4] = 9;
        assert_eq!(
            decode_board(&key, 3, 3),
            Err(EncodingError::InvalidCell { byte: 9, index: 2 })
        );
    }
}
