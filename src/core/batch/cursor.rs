//! Pagination state of a batch run

/// Position of a batch run: the current step, the page size and the total
/// number of items, once counted
///
/// Steps are 1-based; `offset()` converts to a 0-based item offset.
///
/// # Example
///
/// ```
/// use kitsync::core::batch::BatchCursor;
///
/// let mut cursor = BatchCursor::new(1, 10).with_total(25);
/// assert_eq!(cursor.offset(), 0);
/// cursor.advance();
/// assert_eq!(cursor.offset(), 10);
/// assert_eq!(cursor.progress(), 80);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCursor {
    step: u64,
    per_step: u32,
    total: Option<u64>,
}

impl BatchCursor {
    /// Creates a cursor; step 0 and page size 0 are clamped to 1
    pub fn new(step: u64, per_step: u32) -> Self {
        Self {
            step: step.max(1),
            per_step: per_step.max(1),
            total: None,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn per_step(&self) -> u32 {
        self.per_step
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn set_total(&mut self, total: u64) {
        self.total = Some(total);
    }

    /// 0-based offset of the first item of the current step
    pub fn offset(&self) -> u64 {
        (self.step - 1) * u64::from(self.per_step)
    }

    /// Percentage of items covered once the current step is done, 0..=100
    ///
    /// An uncounted run reports 0; an empty run reports 100.
    pub fn progress(&self) -> u8 {
        match self.total {
            None => 0,
            Some(0) => 100,
            Some(total) => {
                let covered = u128::from(self.step) * u128::from(self.per_step) * 100;
                (covered / u128::from(total)).min(100) as u8
            }
        }
    }

    /// Whether the current step covers the last item
    pub fn is_complete(&self) -> bool {
        self.progress() >= 100
    }

    pub fn advance(&mut self) {
        self.step += 1;
    }
}
