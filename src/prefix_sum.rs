use std::cell::{Cell, RefCell};

/// An ordered sequence of non-negative values with cached cumulative sums.
///
/// Mutations do not recompute anything; they only lower a watermark recording
/// how much of the cached sum array still matches `values`. Lookups extend
/// the valid region on demand, which is why the cache sits behind interior
/// mutability while lookups take `&self`.
#[derive(Debug)]
pub struct PrefixSums {
    values: Vec<usize>,
    /// `sums[i]` caches `values[0..=i]` summed; only `sums[..valid]` is current.
    sums: RefCell<Vec<usize>>,
    valid: Cell<usize>,
}

impl Clone for PrefixSums {
    fn clone(&self) -> Self {
        PrefixSums {
            values: self.values.clone(),
            sums: RefCell::new(self.sums.borrow().clone()),
            valid: Cell::new(self.valid.get()),
        }
    }
}

impl PartialEq for PrefixSums {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for PrefixSums {}

impl PrefixSums {
    pub fn new(values: Vec<usize>) -> PrefixSums {
        PrefixSums {
            sums: RefCell::new(Vec::with_capacity(values.len())),
            valid: Cell::new(0),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> usize {
        self.values[index]
    }

    pub fn values(&self) -> &[usize] {
        &self.values
    }

    /// Set entry `index` to `value`.
    pub fn set_value(&mut self, index: usize, value: usize) {
        self.values[index] = value;
        self.invalidate(index);
    }

    /// Remove `count` contiguous entries starting at `start`.
    pub fn remove_values(&mut self, start: usize, count: usize) {
        self.values.drain(start..start + count);
        self.invalidate(start);
    }

    /// Insert `new_values` before position `start`.
    pub fn insert_values(&mut self, start: usize, new_values: &[usize]) {
        self.values.splice(start..start, new_values.iter().copied());
        self.invalidate(start);
    }

    pub fn total(&self) -> usize {
        self.sum_to(self.values.len())
    }

    /// Sum of the first `count` values; `count` beyond the end clamps.
    pub fn sum_to(&self, count: usize) -> usize {
        let count = count.min(self.values.len());
        if count == 0 {
            return 0;
        }
        self.ensure(count);
        self.sums.borrow()[count - 1]
    }

    /// Locate `target` within the cumulative sums, returning
    /// `(index, remainder)` such that `sum_to(index) + remainder == target`
    /// and `remainder <= value(index)`. A target on a segment boundary
    /// resolves to the later segment with remainder 0, except a target of 0,
    /// which always resolves to `(0, 0)`, and the grand total, which
    /// resolves to the final segment with its full value.
    pub fn index_of(&self, target: usize) -> (usize, usize) {
        let count = self.values.len();
        debug_assert!(count > 0, "index_of on an empty sequence");
        if target == 0 {
            return (0, 0);
        }
        self.ensure(count);
        let sums = self.sums.borrow();
        debug_assert!(target <= sums[count - 1]);

        let index = sums.partition_point(|&sum| sum <= target);
        let index = if index == count { count - 1 } else { index };
        let before = if index > 0 { sums[index - 1] } else { 0 };
        (index, target - before)
    }

    fn invalidate(&mut self, from: usize) {
        if self.valid.get() > from {
            self.valid.set(from);
        }
    }

    fn ensure(&self, upto: usize) {
        let valid = self.valid.get();
        if valid >= upto {
            return;
        }
        let mut sums = self.sums.borrow_mut();
        sums.resize(self.values.len(), 0);
        let mut running = if valid > 0 { sums[valid - 1] } else { 0 };
        for i in valid..upto {
            running += self.values[i];
            sums[i] = running;
        }
        self.valid.set(upto);
    }
}
