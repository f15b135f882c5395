//! Pawn move representation.

use crate::board::sq_name;
use smallvec::SmallVec;

/// A single pawn move, carrying everything needed to undo it and the
/// ordering score assigned by the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    /// Contents of the destination square before the move (0 for quiet
    /// moves and en-passant captures).
    pub captured: i8,
    /// Square of the pawn removed by an en-passant capture, -1 otherwise.
    pub ep_capture_sq: i8,
    /// En-passant file before the move, restored by `undo_move`.
    pub prev_ep_file: i8,
    /// En-passant file after the move (-1 unless this is a double push).
    pub new_ep_file: i8,
    /// Move-ordering heuristic score.
    pub value: i16,
}

impl Move {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured != 0 || self.ep_capture_sq >= 0
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        self.ep_capture_sq >= 0
    }

    /// Whether the move starts in the right half of an `n`-file board.
    /// Used to drop mirror-image moves from horizontally symmetric
    /// positions (the centre file of an odd board counts as left).
    #[inline]
    pub fn is_from_right_half(&self, n: u8) -> bool {
        self.from % n >= (n + 1) / 2
    }

    /// Algebraic-style notation, e.g. `a2a3` or `b4xa5`.
    pub fn notation(&self, n: u8) -> String {
        let sep = if self.is_capture() { "x" } else { "" };
        format!("{}{}{}", sq_name(self.from as usize, n), sep, sq_name(self.to as usize, n))
    }
}

/// Move buffer sized for the worst case (3·N board moves plus en-passant
/// captures stays inline for N = 8).
pub type MoveList = SmallVec<[Move; 32]>;

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet(from: u8, to: u8) -> Move {
        Move {
            from,
            to,
            captured: 0,
            ep_capture_sq: -1,
            prev_ep_file: -1,
            new_ep_file: -1,
            value: 0,
        }
    }

    #[test]
    fn right_half_split() {
        // even board: files e-h are the right half
        assert!(!quiet(3, 11).is_from_right_half(8));
        assert!(quiet(4, 12).is_from_right_half(8));
        // odd board: the centre file belongs to the left half
        assert!(!quiet(2, 7).is_from_right_half(5));
        assert!(quiet(3, 8).is_from_right_half(5));
    }

    #[test]
    fn notation_quiet_and_capture() {
        assert_eq!(quiet(0, 8).notation(8), "a2a3");
        let mut capture = quiet(8, 17);
        capture.captured = -1;
        assert_eq!(capture.notation(8), "a3xb4");
    }
}
