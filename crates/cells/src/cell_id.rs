//! 64-bit cell identifiers.
//!
//! Layout (most significant first): 3 face bits, then two bits per level along the
//! Hilbert curve, then a single trailing `1` marker whose position encodes the
//! level. A leaf (level 30) id is always odd.

use serde::{Deserialize, Serialize};

use pokecull_core::Coordinate;

/// Deepest subdivision level.
pub const MAX_LEVEL: u8 = 30;

const NUM_FACES: u64 = 6;
const POS_BITS: u32 = 2 * MAX_LEVEL as u32 + 1;
const MAX_SIZE: u32 = 1 << MAX_LEVEL;

/// Offset that maps one-past-the-last cell back onto face 0.
const WRAP_OFFSET: u64 = NUM_FACES << POS_BITS;

const SWAP_MASK: usize = 0x01;
const INVERT_MASK: usize = 0x02;

/// Hilbert position of each (i,j) quadrant, per orientation.
const IJ_TO_POS: [[u64; 4]; 4] = [
    [0, 1, 3, 2], // canonical
    [0, 3, 1, 2], // axes swapped
    [2, 3, 1, 0], // bits inverted
    [2, 1, 3, 0], // swapped & inverted
];

/// Orientation change applied when descending into the child at a Hilbert position.
const POS_TO_ORIENTATION: [usize; 4] = [SWAP_MASK, 0, 0, INVERT_MASK | SWAP_MASK];

/// Identifier of one cell of the spherical grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(u64);

impl CellId {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }

    /// The level-0 cell covering a whole cube face.
    pub fn from_face(face: u8) -> Self {
        Self(((face as u64) << POS_BITS) + lsb_for_level(0))
    }

    /// Leaf cell containing the given position.
    pub fn from_coordinate(position: &Coordinate) -> Self {
        Self::from_lat_lng(position.latitude(), position.longitude())
    }

    /// Leaf cell containing the point at `lat`/`lng` degrees.
    ///
    /// Callers are expected to validate ranges first (see `Coordinate::new`).
    pub fn from_lat_lng(lat_deg: f64, lng_deg: f64) -> Self {
        let (lat, lng) = (lat_deg.to_radians(), lng_deg.to_radians());
        let cos_lat = lat.cos();
        let point = [cos_lat * lng.cos(), cos_lat * lng.sin(), lat.sin()];

        let (face, u, v) = xyz_to_face_uv(point);
        let i = st_to_ij(uv_to_st(u));
        let j = st_to_ij(uv_to_st(v));
        Self::from_face_ij(face, i, j)
    }

    /// Leaf cell at integer face coordinates `i`, `j` in `[0, 2^30)`.
    pub fn from_face_ij(face: u8, i: u32, j: u32) -> Self {
        let mut pos: u64 = 0;
        let mut orientation = face as usize & SWAP_MASK;

        for k in (0..MAX_LEVEL as u32).rev() {
            let quadrant = ((((i >> k) & 1) << 1) | ((j >> k) & 1)) as usize;
            let child = IJ_TO_POS[orientation][quadrant];
            pos = (pos << 2) | child;
            orientation ^= POS_TO_ORIENTATION[child as usize];
        }

        Self(((face as u64) << POS_BITS) | (pos << 1) | 1)
    }

    pub fn face(self) -> u8 {
        (self.0 >> POS_BITS) as u8
    }

    /// Lowest set bit; its position encodes the level.
    pub fn lsb(self) -> u64 {
        self.0 & self.0.wrapping_neg()
    }

    pub fn level(self) -> u8 {
        MAX_LEVEL - (self.0.trailing_zeros() / 2) as u8
    }

    pub fn is_leaf(self) -> bool {
        self.0 & 1 != 0
    }

    pub fn is_valid(self) -> bool {
        u64::from(self.face()) < NUM_FACES && (self.lsb() & 0x1555_5555_5555_5555) != 0
    }

    /// Ancestor at `level` (must not be deeper than the current level).
    pub fn parent(self, level: u8) -> Self {
        let lsb = lsb_for_level(level);
        Self((self.0 & lsb.wrapping_neg()) | lsb)
    }

    /// First descendant at `level`.
    pub fn child_begin_at(self, level: u8) -> Self {
        Self(self.0 - self.lsb() + lsb_for_level(level))
    }

    /// One past the last descendant at `level`.
    pub fn child_end_at(self, level: u8) -> Self {
        Self(self.0 + self.lsb() + lsb_for_level(level))
    }

    /// Next cell at the same level along the Hilbert curve (may leave the valid range).
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(self.lsb() << 1))
    }

    /// Previous cell at the same level along the Hilbert curve (may leave the valid range).
    pub fn prev(self) -> Self {
        Self(self.0.wrapping_sub(self.lsb() << 1))
    }

    /// Like `next`, but wraps from the end of face 5 to the start of face 0.
    pub fn next_wrap(self) -> Self {
        let n = self.next();
        if n.0 < WRAP_OFFSET {
            n
        } else {
            Self(n.0.wrapping_sub(WRAP_OFFSET))
        }
    }

    /// Like `prev`, but wraps from the start of face 0 to the end of face 5.
    pub fn prev_wrap(self) -> Self {
        let p = self.prev();
        if p.0 < WRAP_OFFSET {
            p
        } else {
            Self(p.0.wrapping_add(WRAP_OFFSET))
        }
    }

    /// Compact hex form with trailing zeros stripped.
    pub fn to_token(self) -> String {
        if self.0 == 0 {
            return "X".to_string();
        }
        let hex = format!("{:016x}", self.0);
        hex.trim_end_matches('0').to_string()
    }

    /// Protobuf base-128 varint encoding (repeated cell-id fields on the wire).
    pub fn to_varint(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(10);
        let mut value = self.0;
        while value >= 0x80 {
            out.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        out.push(value as u8);
        out
    }
}

impl core::fmt::Display for CellId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<CellId> for u64 {
    fn from(value: CellId) -> Self {
        value.0
    }
}

fn lsb_for_level(level: u8) -> u64 {
    1u64 << (2 * u32::from(MAX_LEVEL - level))
}

/// Project a unit vector onto the cube face with the largest absolute component.
fn xyz_to_face_uv(p: [f64; 3]) -> (u8, f64, f64) {
    let [x, y, z] = p;
    let mut face: u8 = if x.abs() > y.abs() {
        if x.abs() > z.abs() { 0 } else { 2 }
    } else if y.abs() > z.abs() {
        1
    } else {
        2
    };
    if p[face as usize] < 0.0 {
        face += 3;
    }

    let (u, v) = match face {
        0 => (y / x, z / x),
        1 => (-x / y, z / y),
        2 => (-x / z, -y / z),
        3 => (z / x, y / x),
        4 => (z / y, -x / y),
        _ => (-y / z, -x / z),
    };
    (face, u, v)
}

/// Quadratic projection, keeping cell areas roughly uniform.
fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        0.5 * (1.0 + 3.0 * u).sqrt()
    } else {
        1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
    }
}

fn st_to_ij(s: f64) -> u32 {
    let scaled = (f64::from(MAX_SIZE) * s).floor();
    scaled.clamp(0.0, f64::from(MAX_SIZE - 1)) as u32
}
