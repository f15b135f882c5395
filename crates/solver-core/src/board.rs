//! Board representation for the pawns-only endgame.
//!
//! A position is an N×N board (4 ≤ N ≤ 8) with pawns confined to the
//! N·(N−2) interior squares: the first and last ranks are promotion
//! ranks and are never occupied. Squares hold +1 (white pawn), −1
//! (black pawn) or 0. Positions are small `Copy` values; the search
//! clones them freely.

use crate::moves::Move;
use rand::Rng;
use std::fmt;

/// Largest supported board size.
pub const MAX_N: u8 = 8;

/// Interior squares of the largest board (8 files × 6 ranks).
pub const MAX_ISQ: usize = 48;

/// Square name in algebraic style; interior rank 0 is board rank 2.
pub fn sq_name(sq: usize, n: u8) -> String {
    let file = sq % n as usize;
    let rank = sq / n as usize;
    format!("{}{}", (b'a' + file as u8) as char, rank + 2)
}

/// Flags reported by [`Pos::canonize`], describing how the position was
/// rewritten into its canonical representative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanonFlags {
    /// Colors were swapped (and the board rotated 180°) to put White on move.
    pub player_flipped: bool,
    /// The board was mirrored left-right.
    pub horiz_flipped: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    n: u8,
    turn: i8,
    num_white: i8,
    num_black: i8,
    ep_file: i8,
    // invariant: cells at index >= num_isq() are always 0, so derived
    // equality compares whole positions
    sq: [i8; MAX_ISQ],
}

impl Pos {
    /// Empty board, White to move. Pawns are added with [`Pos::place`].
    pub fn empty(n: u8) -> Self {
        assert!((4..=MAX_N).contains(&n), "board size out of range: {n}");
        Pos {
            n,
            turn: 1,
            num_white: 0,
            num_black: 0,
            ep_file: -1,
            sq: [0; MAX_ISQ],
        }
    }

    /// The initial position: N white pawns on the lowest interior rank,
    /// N black pawns on the highest.
    pub fn initial(n: u8) -> Self {
        let mut pos = Self::empty(n);
        let top = (pos.num_ranks() - 1) * n as usize;
        for file in 0..n as usize {
            pos.place(file, 1);
            pos.place(top + file, -1);
        }
        pos
    }

    #[inline]
    pub fn n(&self) -> u8 {
        self.n
    }

    #[inline]
    pub fn num_ranks(&self) -> usize {
        self.n as usize - 2
    }

    #[inline]
    pub fn num_isq(&self) -> usize {
        self.n as usize * self.num_ranks()
    }

    /// +1 when White is to move, −1 for Black.
    #[inline]
    pub fn side_to_move(&self) -> i8 {
        self.turn
    }

    #[inline]
    pub fn ep_file(&self) -> i8 {
        self.ep_file
    }

    #[inline]
    pub fn counts(&self) -> (i8, i8) {
        (self.num_white, self.num_black)
    }

    #[inline]
    pub fn piece_at(&self, sq: usize) -> i8 {
        debug_assert!(sq < self.num_isq());
        self.sq[sq]
    }

    /// Puts a pawn on an empty interior square.
    pub fn place(&mut self, sq: usize, color: i8) {
        assert!(sq < self.num_isq());
        assert!(color == 1 || color == -1);
        assert_eq!(self.sq[sq], 0, "square {} already occupied", sq_name(sq, self.n));
        self.sq[sq] = color;
        if color == 1 {
            self.num_white += 1;
            assert!(self.num_white <= self.n as i8);
        } else {
            self.num_black += 1;
            assert!(self.num_black <= self.n as i8);
        }
    }

    pub fn set_side_to_move(&mut self, turn: i8) {
        assert!(turn == 1 || turn == -1);
        self.turn = turn;
    }

    pub fn set_ep_file(&mut self, ep_file: i8) {
        assert!(ep_file >= -1 && ep_file < self.n as i8);
        self.ep_file = ep_file;
    }

    /// Terminal classification, relative to the side to move: +1 the
    /// mover has won (opponent out of pawns, or an own pawn one step
    /// from promotion), −1 the mover has lost, 0 not terminal.
    pub fn winner(&self) -> i8 {
        debug_assert!(self.num_white + self.num_black > 0);
        let (mine, theirs) = if self.turn == 1 {
            (self.num_white, self.num_black)
        } else {
            (self.num_black, self.num_white)
        };
        if mine == 0 {
            return -1;
        }
        if theirs == 0 {
            return 1;
        }
        let rank = if self.turn == 1 { self.num_ranks() - 1 } else { 0 };
        let base = rank * self.n as usize;
        for file in 0..self.n as usize {
            if self.sq[base + file] == self.turn {
                return 1;
            }
        }
        0
    }

    pub fn do_move(&mut self, mv: &Move) {
        let turn = self.turn;
        debug_assert_eq!(self.sq[mv.from as usize], turn);
        debug_assert_eq!(self.ep_file, mv.prev_ep_file);
        self.sq[mv.from as usize] = 0;
        if mv.ep_capture_sq >= 0 {
            debug_assert_eq!(self.sq[mv.to as usize], 0);
            debug_assert_eq!(self.sq[mv.ep_capture_sq as usize], -turn);
            self.sq[mv.ep_capture_sq as usize] = 0;
        } else {
            debug_assert_eq!(self.sq[mv.to as usize], mv.captured);
        }
        self.sq[mv.to as usize] = turn;
        if mv.is_capture() {
            if turn == 1 {
                self.num_black -= 1;
            } else {
                self.num_white -= 1;
            }
        }
        self.ep_file = mv.new_ep_file;
        self.turn = -turn;
    }

    /// Exact inverse of [`Pos::do_move`]: restores byte-identical state.
    pub fn undo_move(&mut self, mv: &Move) {
        self.turn = -self.turn;
        let turn = self.turn;
        debug_assert_eq!(self.sq[mv.to as usize], turn);
        debug_assert_eq!(self.sq[mv.from as usize], 0);
        self.sq[mv.from as usize] = turn;
        if mv.ep_capture_sq >= 0 {
            self.sq[mv.to as usize] = 0;
            self.sq[mv.ep_capture_sq as usize] = -turn;
        } else {
            self.sq[mv.to as usize] = mv.captured;
        }
        if mv.is_capture() {
            if turn == 1 {
                self.num_black += 1;
            } else {
                self.num_white += 1;
            }
        }
        self.ep_file = mv.prev_ep_file;
    }

    /// Rewrites the position into the canonical representative of its
    /// symmetry class: White to move (colors swapped and board rotated
    /// 180° if needed), then the lexicographically greater of the two
    /// horizontal mirror images, reading rank by rank left to right.
    pub fn canonize(&mut self) -> CanonFlags {
        let mut flags = CanonFlags::default();
        if self.turn == -1 {
            self.rotate_and_swap_colors();
            flags.player_flipped = true;
        }

        let n = self.n as usize;
        'scan: for rank in 0..self.num_ranks() {
            let mut left = rank * n;
            let mut right = left + n - 1;
            while left < right {
                match self.sq[left].cmp(&self.sq[right]) {
                    std::cmp::Ordering::Less => {
                        self.mirror_horizontal();
                        flags.horiz_flipped = true;
                        break 'scan;
                    }
                    std::cmp::Ordering::Greater => break 'scan,
                    std::cmp::Ordering::Equal => {
                        left += 1;
                        right -= 1;
                    }
                }
            }
        }
        flags
    }

    fn rotate_and_swap_colors(&mut self) {
        let nisq = self.num_isq();
        let (mut i, mut j) = (0, nisq - 1);
        while i < j {
            let tmp = self.sq[i];
            self.sq[i] = -self.sq[j];
            self.sq[j] = -tmp;
            i += 1;
            j -= 1;
        }
        if nisq % 2 == 1 {
            self.sq[nisq / 2] = -self.sq[nisq / 2];
        }
        std::mem::swap(&mut self.num_white, &mut self.num_black);
        if self.ep_file >= 0 {
            self.ep_file = self.n as i8 - 1 - self.ep_file;
        }
        self.turn = 1;
    }

    pub fn mirror_horizontal(&mut self) {
        let n = self.n as usize;
        for rank in 0..self.num_ranks() {
            let base = rank * n;
            let (mut left, mut right) = (0, n - 1);
            while left < right {
                self.sq.swap(base + left, base + right);
                left += 1;
                right -= 1;
            }
        }
        if self.ep_file >= 0 {
            self.ep_file = self.n as i8 - 1 - self.ep_file;
        }
    }

    /// Whether the position equals its own horizontal mirror image, in
    /// which case the search drops moves originating in the right half.
    pub fn is_horiz_symmetric(&self) -> bool {
        if self.ep_file >= 0 && 2 * self.ep_file != self.n as i8 - 1 {
            return false;
        }
        let n = self.n as usize;
        let (mut left, mut right) = (0, n - 1);
        while left < right {
            for base in (0..self.num_isq()).step_by(n) {
                if self.sq[base + left] != self.sq[base + right] {
                    return false;
                }
            }
            left += 1;
            right -= 1;
        }
        true
    }

    /// Uniformly random pawn layout with random piece counts (not both
    /// zero) and a random side to move. Used by the property tests.
    pub fn random<R: Rng>(rng: &mut R, n: u8) -> Self {
        loop {
            let nw = rng.gen_range(0..=n);
            let nb = rng.gen_range(0..=n);
            if nw + nb > 0 {
                return Self::random_with_counts(rng, n, nw, nb);
            }
        }
    }

    /// Random layout with exactly `nw` white and `nb` black pawns.
    pub fn random_with_counts<R: Rng>(rng: &mut R, n: u8, nw: u8, nb: u8) -> Self {
        assert!(nw <= n && nb <= n);
        assert!(nw + nb > 0);
        let mut pos = Self::empty(n);
        let nisq = pos.num_isq();
        for color in [1i8, -1] {
            let want = if color == 1 { nw } else { nb };
            let mut placed = 0;
            while placed < want {
                let sq = rng.gen_range(0..nisq);
                if pos.sq[sq] == 0 {
                    pos.place(sq, color);
                    placed += 1;
                }
            }
        }
        if rng.gen() {
            pos.turn = -1;
        }
        pos
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.n as usize;
        let mut delim = String::with_capacity(2 * n + 1);
        for _ in 0..n {
            delim.push_str("+-");
        }
        delim.push('+');

        for rank in (0..n).rev() {
            writeln!(f, "{delim}")?;
            write!(f, "|")?;
            for file in 0..n {
                if rank == 0 || rank == n - 1 {
                    // promotion ranks are always empty
                    write!(f, " ")?;
                } else {
                    let glyph = match self.sq[(rank - 1) * n + file] {
                        1 => 'x',
                        -1 => 'o',
                        _ => ' ',
                    };
                    write!(f, "{glyph}")?;
                }
                write!(f, "|")?;
            }
            if rank == 0 {
                let mover = if self.turn == 1 { "White" } else { "Black" };
                write!(f, "   {mover} to move")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{delim}")
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Pos(n={}, turn={}, ep_file={}, {}w/{}b)",
            self.n, self.turn, self.ep_file, self.num_white, self.num_black
        )?;
        fmt::Display::fmt(self, f)
    }
}
