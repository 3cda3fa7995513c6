//! Owned bounds-checked 2D container.
//!
//! `Grid2` stores row-major data and exposes `Option` accessors so callers
//! can treat out-of-bounds reads as "no value" without explicit branching.

use crate::util::{DiffMatchError, DiffMatchResult};

/// Owned row-major 2D grid.
#[derive(Clone, Debug)]
pub struct Grid2<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Grid2<T> {
    /// Creates a grid from a row-major vector of exactly `width * height`
    /// elements.
    pub fn from_vec(data: Vec<T>, width: usize, height: usize) -> DiffMatchResult<Self> {
        let needed = checked_area(width, height)?;
        if data.len() < needed {
            return Err(DiffMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(DiffMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the grid height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Mutable counterpart of [`Grid2::get`].
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get_mut(y * self.width + x)
    }

    /// Returns a contiguous slice for row `y`.
    pub fn row(&self, y: usize) -> Option<&[T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Returns the backing row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Clone> Grid2<T> {
    /// Creates a grid filled with copies of `value`.
    pub fn filled(value: T, width: usize, height: usize) -> DiffMatchResult<Self> {
        let needed = checked_area(width, height)?;
        Ok(Self {
            data: vec![value; needed],
            width,
            height,
        })
    }
}

fn checked_area(width: usize, height: usize) -> DiffMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(DiffMatchError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(DiffMatchError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = Grid2::from_vec(vec![0u8; 3], 2, 2).err().unwrap();
        assert_eq!(err, DiffMatchError::BufferTooSmall { needed: 4, got: 3 });

        let err = Grid2::from_vec(vec![0u8; 5], 2, 2).err().unwrap();
        assert_eq!(
            err,
            DiffMatchError::InvalidDimensions {
                width: 2,
                height: 2
            }
        );
    }

    #[test]
    fn get_is_bounds_checked() {
        let grid = Grid2::from_vec((0u8..6).collect(), 3, 2).unwrap();
        assert_eq!(grid.get(2, 1).copied(), Some(5));
        assert!(grid.get(3, 0).is_none());
        assert!(grid.get(0, 2).is_none());
        assert_eq!(grid.row(1).unwrap(), &[3, 4, 5]);
        assert!(grid.row(2).is_none());
    }
}
