/// Rows kept above the now-slot when the window is recentred.
pub const NOW_MARGIN: usize = 3;

/// Fixed-height window over `len` rows.
///
/// `top..=bottom` always spans exactly `height` rows and stays inside `0..len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    top: usize,
    bottom: usize,
    height: usize,
    len: usize,
}

impl Viewport {
    pub fn new(height: usize, len: usize) -> Self {
        let len = len.max(1);
        let height = height.clamp(1, len);
        Viewport {
            top: 0,
            bottom: height - 1,
            height,
            len,
        }
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn bottom(&self) -> usize {
        self.bottom
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.top..=self.bottom
    }

    /// Shifts the window by the smallest amount that brings `cursor` into view.
    pub fn follow(&mut self, cursor: usize) {
        if cursor > self.bottom {
            let diff = cursor - self.bottom;
            self.top += diff;
            self.bottom += diff;
        }
        if cursor < self.top {
            let diff = self.top - cursor;
            self.top -= diff;
            self.bottom -= diff;
        }
        self.clamp();
    }

    /// Places `row` `NOW_MARGIN` rows below the top, then clamps to the edges.
    pub fn centre_on(&mut self, row: usize) {
        self.top = row.saturating_sub(NOW_MARGIN);
        self.bottom = self.top + self.height - 1;
        self.clamp();
    }

    fn clamp(&mut self) {
        if self.bottom >= self.len {
            self.bottom = self.len - 1;
            self.top = self.bottom + 1 - self.height;
        }
        // top is unsigned, so the lower edge only needs re-deriving bottom
        self.bottom = self.top + self.height - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SLOTS_PER_DAY;

    #[test]
    fn cursor_stays_inside_window_for_every_walk() {
        let mut view = Viewport::new(6, SLOTS_PER_DAY);
        let mut cursor = 0usize;
        for _ in 0..SLOTS_PER_DAY + 5 {
            cursor = (cursor + 1).min(SLOTS_PER_DAY - 1);
            view.follow(cursor);
            assert!(view.top() <= cursor && cursor <= view.bottom());
            assert_eq!(view.bottom() - view.top() + 1, 6);
        }
        for _ in 0..SLOTS_PER_DAY + 5 {
            cursor = cursor.saturating_sub(1);
            view.follow(cursor);
            assert!(view.top() <= cursor && cursor <= view.bottom());
            assert_eq!(view.bottom() - view.top() + 1, 6);
        }
    }

    #[test]
    fn follow_handles_jumps_larger_than_window() {
        let mut view = Viewport::new(6, SLOTS_PER_DAY);
        view.follow(30);
        assert_eq!((view.top(), view.bottom()), (25, 30));
        view.follow(2);
        assert_eq!((view.top(), view.bottom()), (2, 7));
        view.follow(47);
        assert_eq!((view.top(), view.bottom()), (42, 47));
    }

    #[test]
    fn centre_puts_now_three_rows_below_top() {
        let mut view = Viewport::new(6, SLOTS_PER_DAY);
        view.centre_on(20);
        assert_eq!((view.top(), view.bottom()), (17, 22));
        assert!(view.rows().contains(&20));
    }

    #[test]
    fn centre_clamps_at_both_edges() {
        let mut view = Viewport::new(6, SLOTS_PER_DAY);
        view.centre_on(1);
        assert_eq!((view.top(), view.bottom()), (0, 5));
        view.centre_on(46);
        assert_eq!((view.top(), view.bottom()), (42, 47));
        assert_eq!(view.rows().count(), 6);
    }

    #[test]
    fn height_never_exceeds_row_count() {
        let mut view = Viewport::new(100, SLOTS_PER_DAY);
        assert_eq!(view.rows().count(), SLOTS_PER_DAY);
        view.centre_on(40);
        assert_eq!((view.top(), view.bottom()), (0, 47));
        let tiny = Viewport::new(0, SLOTS_PER_DAY);
        assert_eq!(tiny.rows().count(), 1);
    }
}
