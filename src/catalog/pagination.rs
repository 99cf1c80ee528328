/// Offset paging over a result set of known size.
///
/// The offset is always a multiple of `page_size` reachable through the
/// navigation methods and is never `>= total_count`, except for offset 0 on
/// an empty result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    offset: u64,
    page_size: u64,
    total_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    First,
    Prev,
    Next,
    Last,
}

impl Pagination {
    pub fn new(page_size: u64) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// 1-based inclusive range of visible items, `None` when empty.
    pub fn current_range(&self) -> Option<(u64, u64)> {
        if self.total_count == 0 {
            return None;
        }
        Some((self.offset + 1, (self.offset + self.page_size).min(self.total_count)))
    }

    pub fn can_go_first(&self) -> bool {
        self.offset > 0
    }

    pub fn can_go_prev(&self) -> bool {
        self.can_go_first()
    }

    pub fn can_go_next(&self) -> bool {
        self.offset + self.page_size < self.total_count
    }

    pub fn can_go_last(&self) -> bool {
        self.can_go_next()
    }

    /// Whether a pagination bar is worth showing at all.
    pub fn has_multiple_pages(&self) -> bool {
        self.total_count > self.page_size
    }

    pub fn next(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.offset += self.page_size;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.can_go_prev() {
            return false;
        }
        self.offset = self.offset.saturating_sub(self.page_size);
        true
    }

    pub fn first(&mut self) -> bool {
        let moved = self.offset != 0;
        self.offset = 0;
        moved
    }

    pub fn last(&mut self) -> bool {
        let target = self.last_offset();
        let moved = self.offset != target;
        self.offset = target;
        moved
    }

    pub fn go(&mut self, direction: PageDirection) -> bool {
        match direction {
            PageDirection::First => self.first(),
            PageDirection::Prev => self.prev(),
            PageDirection::Next => self.next(),
            PageDirection::Last => self.last(),
        }
    }

    /// Jump to a 0-based page index. Pages past the end are refused.
    pub fn go_to_page(&mut self, page: u64) -> bool {
        let target = page.saturating_mul(self.page_size);
        if target == self.offset || (target > 0 && target >= self.total_count) {
            return false;
        }
        self.offset = target;
        true
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Record the total reported by the latest response. An offset past the
    /// new end moves back to the start of the last page; returns `true` when
    /// that happened and the page on hand no longer matches the offset.
    pub fn set_total(&mut self, total_count: u64) -> bool {
        self.total_count = total_count;
        let clamped = self.last_offset();
        if self.offset >= total_count && self.offset != clamped {
            self.offset = clamped;
            return true;
        }
        false
    }

    /// Changing the page size goes back to the first page.
    pub fn set_page_size(&mut self, page_size: u64) {
        self.page_size = page_size.max(1);
        self.offset = 0;
    }

    fn last_offset(&self) -> u64 {
        if self.total_count == 0 {
            0
        } else {
            (self.total_count - 1) / self.page_size * self.page_size
        }
    }
}
