use std::collections::{BTreeSet, HashMap, HashSet};

use rand::RngCore;
use rand_chacha::ChaCha8Rng;

use crate::board_manager::{BoardManager, BoardState};
use crate::config::Position;
use crate::sokoban_plus::PlusId;

/// Random factors for Zobrist hashing of pusher and box positions.
///
/// Boxes with equal Sokoban+ tags share a table, so swapping two such boxes
/// doesn't change the hash. Walls get a zero factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zobrist {
    seed: u64,
    pusher_hashes: Vec<u64>,
    box_hashes: HashMap<PlusId, Vec<u64>>,
}

impl Zobrist {
    /// Draws fresh factors for every non-wall position of `manager`'s board.
    ///
    /// All drawn values are distinct.
    pub fn new(rng: &mut ChaCha8Rng, manager: &BoardManager) -> Self {
        let size = manager.board().size();
        let walls: HashSet<Position> = manager.walls_positions().iter().copied().collect();
        let tags: BTreeSet<PlusId> = manager.box_tags().into_iter().collect();

        let floor_count = size - walls.len();
        let pool_size = 1 + floor_count * (1 + tags.len());
        let mut seen = HashSet::with_capacity(pool_size);
        let mut pool = Vec::with_capacity(pool_size);
        while pool.len() < pool_size {
            let value = rng.next_u64();
            if seen.insert(value) {
                pool.push(value);
            }
        }

        let mut pool = pool.into_iter();
        let seed = pool.next().unwrap_or_default();
        let mut table = || -> Vec<u64> {
            (0..size)
                .map(|position| {
                    if walls.contains(&position) {
                        0
                    } else {
                        pool.next().unwrap_or_default()
                    }
                })
                .collect()
        };

        let mut box_hashes = HashMap::with_capacity(tags.len());
        for tag in tags {
            box_hashes.insert(tag, table());
        }
        let pusher_hashes = table();

        Zobrist {
            seed,
            pusher_hashes,
            box_hashes,
        }
    }

    /// Hash of an empty board.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn pusher_hash(&self, position: Position) -> Option<u64> {
        self.pusher_hashes.get(position).copied()
    }

    pub fn box_hash(&self, plus_id: PlusId, position: Position) -> Option<u64> {
        self.box_hashes.get(&plus_id)?.get(position).copied()
    }

    /// XOR of the factors of all given boxes, with `tags[i]` the tag of the
    /// box at `positions[i]`.
    pub fn boxes_hash(&self, tags: &[PlusId], positions: &[Position]) -> Option<u64> {
        tags.iter()
            .zip(positions)
            .try_fold(0, |hash, (&tag, &position)| {
                Some(hash ^ self.box_hash(tag, position)?)
            })
    }

    pub fn pushers_hash(&self, positions: &[Position]) -> Option<u64> {
        positions
            .iter()
            .try_fold(0, |hash, &position| Some(hash ^ self.pusher_hash(position)?))
    }

    /// Hash of `state` on the board `manager` tracks.
    ///
    /// `None` if the box count doesn't match or a position is off board.
    pub fn state_hash(&self, manager: &BoardManager, state: &BoardState) -> Option<u64> {
        if state.boxes_positions.len() != manager.boxes_count()
            || state.boxes_positions.len() != manager.goals_count()
        {
            return None;
        }
        let tags = manager.box_tags();
        Some(
            self.seed
                ^ self.boxes_hash(&tags, &state.boxes_positions)?
                ^ self.pushers_hash(&state.pushers_positions)?,
        )
    }
}
