use std::sync::OnceLock;

use crate::board::{Bitboard, Square};

/// The 8 ray directions used by sliding-piece attack tables, ordered as
/// N, NE, E, SE, S, SW, W, NW. Indices 0, 2, 4, 6 (N, E, S, W) are the rook
/// directions; 1, 3, 5, 7 (NE, SE, SW, NW) are the bishop directions.
const ROOK_DIRS: [usize; 4] = [0, 2, 4, 6];
const BISHOP_DIRS: [usize; 4] = [1, 3, 5, 7];

/// Precomputed attack/offset lookup tables, analogous to the teacher crate's
/// [`crate::board::ZobristHash`] table: built once behind a [`OnceLock`] and
/// never mutated afterwards.
///
/// Sliding-piece attacks are computed from a per-square, per-direction ray
/// table plus a first-blocker bitscan, rather than a magic-bitboard perfect
/// hash -- simpler to verify and fast enough since this crate has no search
/// loop to make magic bitboards pay for themselves.
pub struct Lookups {
    knight_attacks: [Bitboard; 64],
    king_attacks: [Bitboard; 64],
    rays: [[Bitboard; 8]; 64],
}

impl Lookups {
    pub fn get() -> &'static Self {
        static INSTANCE: OnceLock<Lookups> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        let mut knight_attacks = [Bitboard::EMPTY; 64];
        let mut king_attacks = [Bitboard::EMPTY; 64];
        let mut rays = [[Bitboard::EMPTY; 8]; 64];

        for square in Square::all() {
            knight_attacks[square.index()] = knight_attacks_from(square);
            king_attacks[square.index()] = king_attacks_from(square);
            rays[square.index()] = rays_from(square);
        }

        Self {
            knight_attacks,
            king_attacks,
            rays,
        }
    }

    pub fn knight_attacks(&self, square: Square) -> Bitboard {
        self.knight_attacks[square.index()]
    }

    pub fn king_attacks(&self, square: Square) -> Bitboard {
        self.king_attacks[square.index()]
    }

    fn ray(&self, square: Square, direction: usize) -> Bitboard {
        self.rays[square.index()][direction]
    }

    /// Attacks along a single ray direction, stopped at (and including) the
    /// first occupied square.
    fn sliding_ray_attacks(&self, occupied: Bitboard, square: Square, direction: usize) -> Bitboard {
        let full_ray = self.ray(square, direction);
        let blockers = full_ray & occupied;

        match blockers.lsb_or_msb_for_direction(direction) {
            Some(blocker) => full_ray & !self.ray(Square::from_index_unchecked(blocker as _), direction),
            None => full_ray,
        }
    }

    pub fn rook_attacks(&self, occupied: Bitboard, square: Square) -> Bitboard {
        ROOK_DIRS
            .iter()
            .fold(Bitboard::EMPTY, |acc, &dir| acc | self.sliding_ray_attacks(occupied, square, dir))
    }

    pub fn bishop_attacks(&self, occupied: Bitboard, square: Square) -> Bitboard {
        BISHOP_DIRS
            .iter()
            .fold(Bitboard::EMPTY, |acc, &dir| acc | self.sliding_ray_attacks(occupied, square, dir))
    }

    pub fn queen_attacks(&self, occupied: Bitboard, square: Square) -> Bitboard {
        self.rook_attacks(occupied, square) | self.bishop_attacks(occupied, square)
    }
}

/// Whether each direction index points "away from a1" (towards increasing
/// square index) or "towards a1" (decreasing). Directions 0..=3 are N, NE, E,
/// SE (increasing); 4..=7 are S, SW, W, NW (decreasing) -- see
/// [`DIRECTION_DELTAS`].
const INCREASING: [bool; 8] = [true, true, true, true, false, false, false, false];

trait DirectionalBitscan {
    fn lsb_or_msb_for_direction(self, direction: usize) -> Option<u8>;
}

impl DirectionalBitscan for Bitboard {
    fn lsb_or_msb_for_direction(self, direction: usize) -> Option<u8> {
        if INCREASING[direction] {
            self.lsb()
        } else {
            self.msb()
        }
    }
}

/// (file delta, rank delta) for each of the 8 ray directions, in the same
/// order as [`INCREASING`]: N, NE, E, SE, S, SW, W, NW.
const DIRECTION_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

fn rays_from(square: Square) -> [Bitboard; 8] {
    let mut rays = [Bitboard::EMPTY; 8];

    for (direction, &(df, dr)) in DIRECTION_DELTAS.iter().enumerate() {
        let mut bitboard = Bitboard::EMPTY;
        let (mut file, mut rank) = (square.file() as i8, square.rank() as i8);

        loop {
            file += df;
            rank += dr;
            if !(0..8).contains(&file) || !(0..8).contains(&rank) {
                break;
            }
            bitboard.set(Square::new_unchecked(rank as u8, file as u8));
        }

        rays[direction] = bitboard;
    }

    rays
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

fn knight_attacks_from(square: Square) -> Bitboard {
    offsets_to_bitboard(square, &KNIGHT_OFFSETS)
}

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

fn king_attacks_from(square: Square) -> Bitboard {
    offsets_to_bitboard(square, &KING_OFFSETS)
}

fn offsets_to_bitboard(square: Square, offsets: &[(i8, i8)]) -> Bitboard {
    let mut bitboard = Bitboard::EMPTY;
    let (file, rank) = (square.file() as i8, square.rank() as i8);

    for &(df, dr) in offsets {
        let (nf, nr) = (file + df, rank + dr);
        if (0..8).contains(&nf) && (0..8).contains(&nr) {
            bitboard.set(Square::new_unchecked(nr as u8, nf as u8));
        }
    }

    bitboard
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn knight_attacks_from_corner() {
        let attacks = Lookups::get().knight_attacks(Square::A1);
        assert_eq!(attacks.pop_count(), 2);
        assert!(attacks.get(Square::B3));
        assert!(attacks.get(Square::C2));
    }

    #[test]
    fn king_attacks_from_center() {
        let attacks = Lookups::get().king_attacks(Square::E4);
        assert_eq!(attacks.pop_count(), 8);
    }

    #[test]
    fn rook_attacks_stop_at_blocker() {
        let occupied = Bitboard::from_square(Square::E6) | Bitboard::from_square(Square::E1);
        let attacks = Lookups::get().rook_attacks(occupied, Square::E4);

        assert!(attacks.get(Square::E5));
        assert!(attacks.get(Square::E6));
        assert!(!attacks.get(Square::E7));
        assert!(attacks.get(Square::E3));
        assert!(attacks.get(Square::E1));
        assert!(attacks.get(Square::A4));
        assert!(attacks.get(Square::H4));
    }

    #[test]
    fn bishop_attacks_stop_at_blocker() {
        let occupied = Bitboard::from_square(Square::G6);
        let attacks = Lookups::get().bishop_attacks(occupied, Square::E4);

        assert!(attacks.get(Square::F5));
        assert!(attacks.get(Square::G6));
        assert!(!attacks.get(Square::H7));
    }
}
