use crate::geometry::Vec3;
use crate::scene::PieceKey;

/// One addressable grid position with a bounded list of occupants.
/// The first occupant is the primary one.
#[derive(Debug, Clone)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
    /// World position of the cell center as placed in the scene.
    pub position: Vec3,
    capacity: usize,
    occupants: Vec<PieceKey>,
}

impl Cell {
    pub fn new(row: i32, col: i32, position: Vec3, capacity: usize) -> Self {
        Self {
            row,
            col,
            position,
            capacity: capacity.max(1),
            occupants: Vec::new(),
        }
    }

    pub fn pos(&self) -> (i32, i32) {
        (self.row, self.col)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn occupants(&self) -> &[PieceKey] {
        &self.occupants
    }

    pub fn primary(&self) -> Option<PieceKey> {
        self.occupants.first().copied()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn holds(&self, key: PieceKey) -> bool {
        self.occupants.contains(&key)
    }

    /// Returns false when `key` is already here or the cell is full.
    pub(crate) fn add_occupant(&mut self, key: PieceKey) -> bool {
        if self.holds(key) || self.is_full() {
            return false;
        }
        self.occupants.push(key);
        true
    }

    pub(crate) fn remove_occupant(&mut self, key: PieceKey) -> bool {
        match self.occupants.iter().position(|&k| k == key) {
            Some(idx) => {
                self.occupants.remove(idx);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_at_least_one() {
        let c = Cell::new(0, 0, Vec3::ZERO, 0);
        assert_eq!(c.capacity(), 1);
    }

    #[test]
    fn add_respects_capacity_and_duplicates() {
        let mut c = Cell::new(0, 0, Vec3::ZERO, 2);
        let (a, b, d) = (PieceKey(1), PieceKey(2), PieceKey(3));
        assert!(c.add_occupant(a));
        assert!(!c.add_occupant(a));
        assert!(c.add_occupant(b));
        assert!(c.is_full());
        assert!(!c.add_occupant(d));
        assert_eq!(c.primary(), Some(a));

        assert!(c.remove_occupant(a));
        assert_eq!(c.primary(), Some(b));
        assert!(!c.remove_occupant(a));
    }
}
