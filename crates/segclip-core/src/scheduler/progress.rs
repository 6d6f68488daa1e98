//! Job progress as a 0–100 percentage.
//!
//! Only successful segment fetches count; init resources are not part of the
//! total. A clean run therefore ends at exactly 100.

#[derive(Debug, Clone, Copy)]
pub(crate) struct ProgressCounter {
    completed: usize,
    total: usize,
}

impl ProgressCounter {
    /// `total` is `2 * range.len()` (both tracks).
    pub(crate) fn new(total: usize) -> Self {
        Self { completed: 0, total }
    }

    /// Record one successful segment and return the new percentage.
    pub(crate) fn complete_one(&mut self) -> u8 {
        self.completed = (self.completed + 1).min(self.total);
        self.percent()
    }

    pub(crate) fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed * 100 / self.total) as u8
    }
}
