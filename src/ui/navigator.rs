//! Modal viewer navigation state, independent of any widget.

/// Where the full-screen viewer points within the currently displayed
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigatorState {
    #[default]
    Closed,
    Open(usize),
}

/// State machine for the viewer's logical position.
///
/// The navigator is agnostic to how the sequence was produced; it only
/// tracks its length. Whenever the active view shrinks to or below the open
/// index the navigator closes, so it can never point at a wrong item.
#[derive(Debug, Default)]
pub struct ModalNavigator {
    state: NavigatorState,
    len: usize,
}

impl ModalNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, NavigatorState::Open(_))
    }

    pub fn open_index(&self) -> Option<usize> {
        match self.state {
            NavigatorState::Open(index) => Some(index),
            NavigatorState::Closed => None,
        }
    }

    /// Opens at a flat position in the active view. Out-of-range requests
    /// are rejected and leave the navigator closed.
    pub fn open(&mut self, index: usize) -> bool {
        if index < self.len {
            self.state = NavigatorState::Open(index);
            true
        } else {
            self.state = NavigatorState::Closed;
            false
        }
    }

    pub fn close(&mut self) {
        self.state = NavigatorState::Closed;
    }

    /// Advances with wraparound. Returns the new index, or `None` when
    /// closed or the view is empty.
    pub fn next(&mut self) -> Option<usize> {
        match self.state {
            NavigatorState::Open(index) if self.len > 0 => {
                let next = (index + 1) % self.len;
                self.state = NavigatorState::Open(next);
                Some(next)
            }
            _ => None,
        }
    }

    /// Retreats with wraparound. Returns the new index, or `None` when
    /// closed or the view is empty.
    pub fn prev(&mut self) -> Option<usize> {
        match self.state {
            NavigatorState::Open(index) if self.len > 0 => {
                let prev = (index + self.len - 1) % self.len;
                self.state = NavigatorState::Open(prev);
                Some(prev)
            }
            _ => None,
        }
    }

    /// Tells the navigator the active view's new length. Closes when the
    /// open index no longer fits; returns `true` if that happened.
    pub fn sync_len(&mut self, len: usize) -> bool {
        self.len = len;
        if let NavigatorState::Open(index) = self.state {
            if index >= len {
                self.state = NavigatorState::Closed;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_at(len: usize, index: usize) -> ModalNavigator {
        let mut nav = ModalNavigator::new();
        nav.sync_len(len);
        assert!(nav.open(index));
        nav
    }

    #[test]
    fn test_open_requires_in_range_index() {
        let mut nav = ModalNavigator::new();
        nav.sync_len(3);
        assert!(!nav.open(3));
        assert_eq!(nav.state(), NavigatorState::Closed);
        assert!(nav.open(2));
        assert_eq!(nav.open_index(), Some(2));
    }

    #[test]
    fn test_next_wraps_at_end() {
        let mut nav = open_at(10, 9);
        assert_eq!(nav.next(), Some(0));
    }

    #[test]
    fn test_prev_wraps_at_start() {
        let mut nav = open_at(10, 0);
        assert_eq!(nav.prev(), Some(9));
    }

    #[test]
    fn test_navigation_noop_while_closed() {
        let mut nav = ModalNavigator::new();
        nav.sync_len(5);
        assert_eq!(nav.next(), None);
        assert_eq!(nav.prev(), None);
        assert_eq!(nav.state(), NavigatorState::Closed);
    }

    #[test]
    fn test_shrink_to_or_below_open_index_closes() {
        let mut nav = open_at(10, 4);
        assert!(nav.sync_len(4));
        assert_eq!(nav.state(), NavigatorState::Closed);

        // Shrinking while still above the index keeps it open.
        let mut nav = open_at(10, 4);
        assert!(!nav.sync_len(5));
        assert_eq!(nav.open_index(), Some(4));
    }

    #[test]
    fn test_view_switch_shrink_scenario() {
        // Open at 4 of 10, switch to a 3-item view.
        let mut nav = open_at(10, 4);
        assert!(nav.sync_len(3));
        assert_eq!(nav.state(), NavigatorState::Closed);
        // Navigation after the forced close stays inert.
        assert_eq!(nav.next(), None);
    }

    #[test]
    fn test_shrink_to_empty_then_navigate() {
        let mut nav = open_at(1, 0);
        assert!(nav.sync_len(0));
        assert_eq!(nav.next(), None);
        assert_eq!(nav.prev(), None);
    }

    proptest! {
        #[test]
        fn prop_full_cycle_returns_to_start(len in 1usize..200, start in 0usize..200) {
            let start = start % len;
            let mut nav = open_at(len, start);
            for _ in 0..len {
                nav.next().unwrap();
            }
            prop_assert_eq!(nav.open_index(), Some(start));
            for _ in 0..len {
                nav.prev().unwrap();
            }
            prop_assert_eq!(nav.open_index(), Some(start));
        }

        #[test]
        fn prop_open_index_always_in_bounds(
            len in 1usize..100,
            start in 0usize..100,
            steps in proptest::collection::vec(0u8..2, 0..50),
        ) {
            let mut nav = open_at(len, start % len);
            for step in steps {
                if step == 0 { nav.next(); } else { nav.prev(); }
                let index = nav.open_index().unwrap();
                prop_assert!(index < len);
            }
        }
    }
}
