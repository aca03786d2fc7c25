//! Fixed-width lane groups and the bitmask scans built on top of them
//!
//! A [`Lanes`] value is one 32-byte block of source (or of per-byte tags)
//! processed as a unit. Classifiers never touch individual source bytes
//! directly; they compare whole lane groups and combine the resulting
//! bitmasks, where bit `i` of a [`LaneMask`] corresponds to byte `i`.
//!
//! All loads go through bounds-checked slice indexing on the padded
//! buffer. Masks that can spill past the lane end (consumed lookahead
//! bytes of a straddling punctuator) are widened to `u64` by the caller.

/// Number of bytes processed per lane-group step.
pub const LANE_WIDTH: usize = 32;

/// One bit per lane byte; bit `i` describes byte `i`.
pub type LaneMask = u32;

/// A fixed-width group of bytes processed in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lanes([u8; LANE_WIDTH]);

impl Lanes {
    /// All-zero lane group (the separator sentinel in every lane).
    pub const fn zero() -> Self {
        Self([0; LANE_WIDTH])
    }

    /// Lane group with every byte set to `b`.
    pub const fn splat(b: u8) -> Self {
        Self([b; LANE_WIDTH])
    }

    pub const fn from_array(bytes: [u8; LANE_WIDTH]) -> Self {
        Self(bytes)
    }

    /// Bounds-checked load of one lane group from `storage` at `base`.
    ///
    /// Panics if the storage does not cover a full lane; the padded
    /// buffer contract makes that a caller bug, not an input condition.
    pub fn load(storage: &[u8], base: usize) -> Self {
        let mut lanes = [0u8; LANE_WIDTH];
        lanes.copy_from_slice(&storage[base..base + LANE_WIDTH]);
        Self(lanes)
    }

    pub const fn byte(&self, i: usize) -> u8 {
        self.0[i]
    }

    pub const fn as_bytes(&self) -> &[u8; LANE_WIDTH] {
        &self.0
    }

    /// Mask of bytes equal to `b`.
    ///
    /// Named apart from `PartialEq::eq` so calls through `&mut Lanes`
    /// receivers resolve here instead of into the blanket trait impls.
    pub fn eq_byte(&self, b: u8) -> LaneMask {
        let mut mask = 0;
        for (i, &lane) in self.0.iter().enumerate() {
            mask |= LaneMask::from(lane == b) << i;
        }
        mask
    }

    /// Mask of bytes in the inclusive range `lo..=hi`.
    pub fn in_range(&self, lo: u8, hi: u8) -> LaneMask {
        let mut mask = 0;
        for (i, &lane) in self.0.iter().enumerate() {
            mask |= LaneMask::from(lo <= lane && lane <= hi) << i;
        }
        mask
    }

    /// Mask of bytes whose entry in the membership table is set.
    pub fn in_set(&self, set: &[bool; 256]) -> LaneMask {
        let mut mask = 0;
        for (i, &lane) in self.0.iter().enumerate() {
            mask |= LaneMask::from(set[lane as usize]) << i;
        }
        mask
    }

    /// Mask of non-zero bytes (positions carrying a tag).
    pub fn nonzero(&self) -> LaneMask {
        let mut mask = 0;
        for (i, &lane) in self.0.iter().enumerate() {
            mask |= LaneMask::from(lane != 0) << i;
        }
        mask
    }

    /// Shifts the group left by `n` bytes, pulling the first `n` bytes of
    /// `next` in at the end. This is the lookahead view used to test byte
    /// `i + n` of a multi-byte punctuator across the chunk boundary.
    pub fn shift_in(&self, next: &Lanes, n: usize) -> Self {
        debug_assert!(n <= LANE_WIDTH);
        let mut lanes = [0u8; LANE_WIDTH];
        for (i, lane) in lanes.iter_mut().enumerate() {
            *lane = if i + n < LANE_WIDTH {
                self.0[i + n]
            } else {
                next.0[i + n - LANE_WIDTH]
            };
        }
        Self(lanes)
    }

    /// Zeroes the bytes selected by `mask`.
    pub fn clear(&self, mask: LaneMask) -> Self {
        let mut lanes = self.0;
        for (i, lane) in lanes.iter_mut().enumerate() {
            if mask & (1 << i) != 0 {
                *lane = 0;
            }
        }
        Self(lanes)
    }

    /// Takes bytes from `other` where `mask` is set, from `self` elsewhere.
    pub fn blend(&self, other: &Lanes, mask: LaneMask) -> Self {
        let mut lanes = self.0;
        for (i, lane) in lanes.iter_mut().enumerate() {
            if mask & (1 << i) != 0 {
                *lane = other.0[i];
            }
        }
        Self(lanes)
    }

    /// Element-wise wrapping sum.
    pub fn wrapping_add(&self, other: &Lanes) -> Self {
        let mut lanes = self.0;
        for (i, lane) in lanes.iter_mut().enumerate() {
            *lane = lane.wrapping_add(other.0[i]);
        }
        Self(lanes)
    }

    /// Element-wise wrapping subtraction of a constant.
    pub fn wrapping_sub_splat(&self, b: u8) -> Self {
        let mut lanes = self.0;
        for lane in lanes.iter_mut() {
            *lane = lane.wrapping_sub(b);
        }
        Self(lanes)
    }
}

/// Builds a byte membership table from a set of characters.
pub const fn byte_set(chars: &[u8]) -> [bool; 256] {
    let mut set = [false; 256];
    let mut i = 0;
    while i < chars.len() {
        set[chars[i] as usize] = true;
        i += 1;
    }
    set
}

/// Inclusive prefix-parity scan: bit `i` of the result is the XOR of bits
/// `0..=i` of `mask`.
///
/// Turns sparse region toggles into a per-byte inside/outside mask in
/// log-steps instead of a sequential walk (the carry-less-multiply trick
/// from vectorized JSON scanners, expressed with shifts).
pub const fn prefix_xor(mask: LaneMask) -> LaneMask {
    let mut x = mask;
    x ^= x << 1;
    x ^= x << 2;
    x ^= x << 4;
    x ^= x << 8;
    x ^= x << 16;
    x
}

/// Positions escaped by a backslash, i.e. bytes immediately following an
/// odd-length run of consecutive backslashes.
///
/// `pending` carries "the previous chunk ended in an odd-length backslash
/// run" across the boundary; it is updated for the next chunk. The
/// computation is the carry-propagating bitwise scan used by vectorized
/// JSON parsers: run starts are split by position parity and pushed
/// through an addition so each run's end pops out one past the run, then
/// parity of start vs. end selects the odd-length runs.
pub fn escaped_positions(backslashes: LaneMask, pending: &mut bool) -> LaneMask {
    const EVEN_BITS: LaneMask = 0x5555_5555;
    const ODD_BITS: LaneMask = !EVEN_BITS;

    let carry_in = LaneMask::from(*pending);
    let starts = backslashes & !(backslashes << 1);
    let even_start_mask = EVEN_BITS ^ carry_in;
    let even_starts = starts & even_start_mask;
    let odd_starts = starts & !even_start_mask;

    let even_carries = backslashes.wrapping_add(even_starts);
    let (odd_carries, ends_pending) = backslashes.overflowing_add(odd_starts);
    let odd_carries = odd_carries | carry_in;
    *pending = ends_pending;

    let even_carry_ends = even_carries & !backslashes;
    let odd_carry_ends = odd_carries & !backslashes;
    (even_carry_ends & ODD_BITS) | (odd_carry_ends & EVEN_BITS)
}

/// Resolves overlapping multi-byte punctuator candidates to leftmost,
/// non-overlapping matches.
///
/// Within each run of consecutive candidate positions, keeps candidates
/// at offsets 0, `width`, 2*`width`, ... from the run start. For runs of
/// two this drops the right candidate; for runs of three it drops the
/// middle one.
pub fn select_leftmost(candidates: LaneMask, width: u32) -> LaneMask {
    let starts = candidates & !(candidates << 1);
    let mut keep = starts;
    loop {
        let grown = keep | (candidates & (keep << width));
        if grown == keep {
            return keep;
        }
        keep = grown;
    }
}
