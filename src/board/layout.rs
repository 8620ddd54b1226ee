//! The lever board.
//!
//! Slots are addressed by signed offset from the board centre. Two pivots
//! sit left of centre; the board tips when the torque about the left pivot
//! turns positive or the torque about the right pivot turns negative.

/// A weight value. Player weights are `1..=HAND_SIZE`.
pub type Weight = i32;

/// Slots run from `-BOARD_SIZE` to `BOARD_SIZE` inclusive.
pub const BOARD_SIZE: i32 = 15;

/// Number of addressable slots.
pub const SLOT_COUNT: usize = (2 * BOARD_SIZE + 1) as usize;

/// Left support of the board.
pub const PIVOT_LEFT: i32 = -3;

/// Right support of the board.
pub const PIVOT_RIGHT: i32 = -1;

/// Weight of the board itself, acting at its centre of gravity.
pub const BOARD_WEIGHT: Weight = 3;

/// Centre of gravity of the bare board.
pub const CENTER_OF_GRAVITY: i32 = 0;

/// Slot of the fixed anchor weight placed before play starts.
pub const ANCHOR_POSITION: i32 = -4;

/// Value of the fixed anchor weight.
pub const ANCHOR_WEIGHT: Weight = 3;

/// Slot contents plus whether the anchor is seated at `ANCHOR_POSITION`.
///
/// Uses a fixed-size array so the board is trivially copyable and the
/// search can mutate it in place without allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    slots: [Option<Weight>; SLOT_COUNT],
    anchored: bool,
}

impl Default for Board {
    fn default() -> Self {
        Board::initial()
    }
}

impl Board {
    /// A board with every slot empty, the anchor included. It tips.
    pub const fn cleared() -> Self {
        Board {
            slots: [None; SLOT_COUNT],
            anchored: false,
        }
    }

    /// The starting board: empty apart from the anchor.
    pub fn initial() -> Self {
        let mut board = Board::cleared();
        board.seat_anchor();
        board
    }

    /// Empties every slot, including the anchor's.
    pub fn clear(&mut self) {
        *self = Board::cleared();
    }

    /// Places the anchor weight at its slot.
    pub fn seat_anchor(&mut self) {
        assert!(
            self.get(ANCHOR_POSITION).is_none(),
            "anchor slot already occupied"
        );
        self.slots[Self::index(ANCHOR_POSITION)] = Some(ANCHOR_WEIGHT);
        self.anchored = true;
    }

    /// Returns true if the anchor is seated.
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Returns true if `position` holds the anchor.
    #[inline]
    pub fn is_anchor(&self, position: i32) -> bool {
        self.anchored && position == ANCHOR_POSITION
    }

    /// Converts a signed slot offset to an array index.
    #[inline]
    pub fn index(position: i32) -> usize {
        debug_assert!(
            (-BOARD_SIZE..=BOARD_SIZE).contains(&position),
            "slot {} off the board",
            position
        );
        (position + BOARD_SIZE) as usize
    }

    /// Converts an array index back to a signed slot offset.
    #[inline]
    pub fn position(index: usize) -> i32 {
        index as i32 - BOARD_SIZE
    }

    /// Iterates all slot offsets from left to right.
    pub fn positions() -> impl Iterator<Item = i32> {
        -BOARD_SIZE..=BOARD_SIZE
    }

    /// Weight at `position`, if any.
    #[inline]
    pub fn get(&self, position: i32) -> Option<Weight> {
        self.slots[Self::index(position)]
    }

    /// Puts `weight` on an empty slot.
    #[inline]
    pub fn place(&mut self, position: i32, weight: Weight) {
        let slot = &mut self.slots[Self::index(position)];
        assert!(slot.is_none(), "slot {} already occupied", position);
        *slot = Some(weight);
    }

    /// Takes the weight off an occupied slot and returns it.
    #[inline]
    pub fn lift(&mut self, position: i32) -> Weight {
        let slot = &mut self.slots[Self::index(position)];
        match slot.take() {
            Some(w) => w,
            None => panic!("slot {} is empty", position),
        }
    }

    /// Occupied slots that a player may remove, left to right.
    pub fn removable(&self) -> impl Iterator<Item = (i32, Weight)> + '_ {
        self.occupied().filter(|&(pos, _)| !self.is_anchor(pos))
    }

    /// All occupied slots, anchor included, left to right.
    pub fn occupied(&self) -> impl Iterator<Item = (i32, Weight)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.map(|w| (Self::position(i), w)))
    }

    /// Number of weights a player may remove.
    pub fn removable_count(&self) -> usize {
        self.removable().count()
    }

    /// Torque about `pivot`, including the board's own weight.
    pub fn torque(&self, pivot: i32) -> i32 {
        let mut torque = (pivot - CENTER_OF_GRAVITY) * BOARD_WEIGHT;
        for (pos, w) in self.occupied() {
            torque += w * (pivot - pos);
        }
        torque
    }

    /// Torque about the left pivot.
    pub fn torque_left(&self) -> i32 {
        self.torque(PIVOT_LEFT)
    }

    /// Torque about the right pivot.
    pub fn torque_right(&self) -> i32 {
        self.torque(PIVOT_RIGHT)
    }

    /// Returns true if the board is out of balance.
    pub fn is_tipped(&self) -> bool {
        tips(self.torque_left(), self.torque_right())
    }
}

/// Tipping test on a pair of pivot torques.
#[inline]
pub fn tips(torque_left: i32, torque_right: i32) -> bool {
    torque_left > 0 || torque_right < 0
}
