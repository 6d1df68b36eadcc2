//! Verse navigation - the one place next/previous indices are computed

use crate::features::LoopMode;

/// Computes the neighbours of the current verse under a loop mode
///
/// Only [`LoopMode::Chapter`] changes navigation: it wraps the last verse to
/// the first. Verse looping is applied on completion, not here.
#[derive(Debug, Clone, Copy)]
pub struct VerseNavigator {
    len: usize,
    current: usize,
    loop_mode: LoopMode,
}

impl VerseNavigator {
    pub fn new(len: usize, current: usize, loop_mode: LoopMode) -> Self {
        Self {
            len,
            current,
            loop_mode,
        }
    }

    pub fn next_index(&self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }

        let next = self.current + 1;
        if next < self.len {
            Some(next)
        } else if self.loop_mode == LoopMode::Chapter {
            Some(0)
        } else {
            None
        }
    }

    pub fn prev_index(&self) -> Option<usize> {
        if self.len == 0 || self.current == 0 {
            return None;
        }
        Some((self.current - 1).min(self.len - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_advances_within_bounds() {
        let nav = VerseNavigator::new(7, 2, LoopMode::None);
        assert_eq!(nav.next_index(), Some(3));
    }

    #[test]
    fn next_at_end_depends_on_loop_mode() {
        assert_eq!(VerseNavigator::new(7, 6, LoopMode::None).next_index(), None);
        assert_eq!(VerseNavigator::new(7, 6, LoopMode::Verse).next_index(), None);
        assert_eq!(VerseNavigator::new(7, 6, LoopMode::Chapter).next_index(), Some(0));
    }

    #[test]
    fn prev_stops_at_first_verse() {
        assert_eq!(VerseNavigator::new(7, 3, LoopMode::Chapter).prev_index(), Some(2));
        assert_eq!(VerseNavigator::new(7, 0, LoopMode::Chapter).prev_index(), None);
    }

    #[test]
    fn empty_sequence_has_no_neighbours() {
        let nav = VerseNavigator::new(0, 0, LoopMode::Chapter);
        assert_eq!(nav.next_index(), None);
        assert_eq!(nav.prev_index(), None);
    }
}
