//! Three-valued game results with zero bounds.
//!
//! A transposition entry stores either an exact value for the side to
//! move (−1, 0, +1), a one-sided bound against zero produced by a
//! narrow-window search, or nothing. Merging two deposits for the same
//! position always yields the tightest consistent result; an impossible
//! combination means the search itself is broken and panics.

/// Result kind stored in 3 bits of a table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TpResult {
    /// Empty slot.
    None = 0,
    /// The side to move loses (value −1).
    CurrentLoss = 1,
    /// Drawn (value 0).
    Draw = 2,
    /// The side to move wins (value +1).
    CurrentWin = 3,
    /// True value ≥ 0.
    LowerBound0 = 4,
    /// True value ≤ 0.
    UpperBound0 = 5,
}

impl TpResult {
    #[inline]
    pub fn from_bits(bits: u32) -> Self {
        match bits {
            0 => TpResult::None,
            1 => TpResult::CurrentLoss,
            2 => TpResult::Draw,
            3 => TpResult::CurrentWin,
            4 => TpResult::LowerBound0,
            5 => TpResult::UpperBound0,
            _ => panic!("corrupted transposition entry kind: {bits}"),
        }
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self as u32
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self == TpResult::None
    }

    #[inline]
    pub fn is_exact(self) -> bool {
        matches!(self, TpResult::CurrentLoss | TpResult::Draw | TpResult::CurrentWin)
    }

    #[inline]
    pub fn exact_value(self) -> Option<i8> {
        match self {
            TpResult::CurrentLoss => Some(-1),
            TpResult::Draw => Some(0),
            TpResult::CurrentWin => Some(1),
            _ => None,
        }
    }

    /// Inclusive bounds `(lo, hi)` on the value for the side to move.
    #[inline]
    pub fn value_range(self) -> (i8, i8) {
        match self {
            TpResult::None => (-1, 1),
            TpResult::CurrentLoss => (-1, -1),
            TpResult::Draw => (0, 0),
            TpResult::CurrentWin => (1, 1),
            TpResult::LowerBound0 => (0, 1),
            TpResult::UpperBound0 => (-1, 0),
        }
    }

    /// The same knowledge seen from the opponent's side: exact values
    /// negate, bounds swap direction.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            TpResult::CurrentLoss => TpResult::CurrentWin,
            TpResult::CurrentWin => TpResult::CurrentLoss,
            TpResult::LowerBound0 => TpResult::UpperBound0,
            TpResult::UpperBound0 => TpResult::LowerBound0,
            other => other,
        }
    }

    /// Combines two deposits for the same position into the tightest
    /// consistent result.
    ///
    /// # Panics
    ///
    /// On contradictory inputs (two different exact values, or a bound
    /// violated by an exact value): such a merge means the search
    /// produced inconsistent results for one position.
    pub fn merge(self, other: Self) -> Self {
        use TpResult::*;
        match (self, other) {
            (a, None) | (None, a) => a,
            (a, b) if a == b => a,
            (Draw, LowerBound0) | (LowerBound0, Draw) => Draw,
            (Draw, UpperBound0) | (UpperBound0, Draw) => Draw,
            (CurrentWin, LowerBound0) | (LowerBound0, CurrentWin) => CurrentWin,
            (CurrentLoss, UpperBound0) | (UpperBound0, CurrentLoss) => CurrentLoss,
            (LowerBound0, UpperBound0) | (UpperBound0, LowerBound0) => Draw,
            (a, b) => panic!("contradictory transposition results: {a:?} vs {b:?}"),
        }
    }
}
