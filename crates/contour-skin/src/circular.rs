//! Circular indexing for closed curves.
//!
//! Closed perimeters have no canonical first point, so most index arithmetic
//! on them wraps around. All wrapping goes through [`wrap`] and
//! [`CircularView`] instead of scattered `%` expressions.

/// Wrap a signed index into `0..len`.
///
/// Works for any distance below or above the range, not just one lap.
///
/// # Panics
///
/// Panics if `len` is zero.
#[inline]
pub fn wrap(index: isize, len: usize) -> usize {
    assert!(len > 0, "cannot wrap an index into an empty range");
    index.rem_euclid(len as isize) as usize
}

/// A read-only view of a slice that starts at `offset` and wraps around.
///
/// `view.get(k)` is `items[(offset + k) mod len]`.
#[derive(Debug, Clone, Copy)]
pub struct CircularView<'a, T> {
    items: &'a [T],
    offset: usize,
}

impl<'a, T> CircularView<'a, T> {
    /// Create a view of `items` rotated so that `offset` becomes index 0.
    ///
    /// An offset beyond the slice length wraps.
    pub fn new(items: &'a [T], offset: usize) -> Self {
        let offset = if items.is_empty() {
            0
        } else {
            offset % items.len()
        };
        Self { items, offset }
    }

    /// Number of items in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the underlying slice is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The rotation applied to the underlying slice.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Map a view index to an index into the underlying slice.
    #[inline]
    pub fn source_index(&self, k: usize) -> usize {
        (self.offset + k) % self.items.len()
    }

    /// Item at view index `k` (wrapping).
    ///
    /// # Panics
    ///
    /// Panics if the view is empty.
    #[inline]
    pub fn get(&self, k: usize) -> &'a T {
        &self.items[self.source_index(k)]
    }

    /// Iterate over one full lap of the view, starting at the offset.
    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        (0..self.items.len()).map(move |k| self.get(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(0, 5), 0);
        assert_eq!(wrap(4, 5), 4);
        assert_eq!(wrap(5, 5), 0);
        assert_eq!(wrap(-1, 5), 4);
        assert_eq!(wrap(-6, 5), 4);
        assert_eq!(wrap(12, 5), 2);
    }

    #[test]
    #[should_panic]
    fn test_wrap_empty_range() {
        wrap(1, 0);
    }

    #[test]
    fn test_view_rotates() {
        let items = [10, 20, 30, 40];
        let view = CircularView::new(&items, 3);
        assert_eq!(*view.get(0), 40);
        assert_eq!(*view.get(1), 10);
        assert_eq!(*view.get(5), 10);
        assert_eq!(view.source_index(2), 1);
        let lap: Vec<i32> = view.iter().copied().collect();
        assert_eq!(lap, vec![40, 10, 20, 30]);
    }

    #[test]
    fn test_view_offset_wraps() {
        let items = [1, 2, 3];
        let view = CircularView::new(&items, 7);
        assert_eq!(view.offset(), 1);
        assert_eq!(*view.get(0), 2);
    }
}
