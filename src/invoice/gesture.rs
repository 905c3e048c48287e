//! Swipe-to-delete for a single line item row on touch layouts.
//!
//! A leftward swipe past [`THRESHOLD`] arms the row; lifting the finger while
//! armed removes it through [`LineItems::remove_item`], so the last row stays
//! protected exactly as with the delete button.

use super::item::LineItems;

/// Honored displacement must exceed this to arm the row.
pub const THRESHOLD: f64 = 60.0;

/// The row never slides further than this.
pub const MAX_OFFSET: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeState {
    Idle,
    Tracking { start_x: f64 },
    Armed { start_x: f64, current_x: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwipeToDelete {
    touch_layout: bool,
    state: SwipeState,
    offset: f64,
}

impl SwipeToDelete {
    pub fn new(touch_layout: bool) -> Self {
        Self {
            touch_layout,
            state: SwipeState::Idle,
            offset: 0.0,
        }
    }

    pub fn state(&self) -> SwipeState {
        self.state
    }

    /// How far the row is drawn to the left.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, SwipeState::Armed { .. })
    }

    /// Begin tracking. Ignored on non-touch layouts and when the row is the
    /// only one left.
    pub fn touch_start(&mut self, x: f64, item_count: usize) {
        if !self.touch_layout || item_count <= 1 {
            return;
        }
        self.state = SwipeState::Tracking { start_x: x };
        self.offset = 0.0;
    }

    pub fn touch_move(&mut self, x: f64) {
        let start_x = match self.state {
            SwipeState::Idle => return,
            SwipeState::Tracking { start_x } | SwipeState::Armed { start_x, .. } => start_x,
        };

        // rightward movement is not honored
        let honored = (start_x - x).max(0.0);
        self.offset = honored.min(MAX_OFFSET);
        self.state = if honored > THRESHOLD {
            SwipeState::Armed {
                start_x,
                current_x: x,
            }
        } else {
            SwipeState::Tracking { start_x }
        };
    }

    /// Finish the gesture for the row at `index`. Returns true if the row was
    /// removed.
    pub fn touch_end(&mut self, items: &mut LineItems, index: usize) -> bool {
        let removed = self.is_armed() && items.remove_item(index);
        if removed {
            tracing::debug!(index, "line item removed by swipe");
        }
        self.reset();
        removed
    }

    pub fn touch_cancel(&mut self) {
        self.reset();
    }

    /// A click anywhere else in the document abandons the swipe.
    pub fn outside_click(&mut self) {
        if self.state != SwipeState::Idle {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.state = SwipeState::Idle;
        self.offset = 0.0;
    }
}
