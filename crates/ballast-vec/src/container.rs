//! The behaviour shared by every arena-backed container.

/// Common surface of [`crate::Sequence`] and [`crate::CheckedSequence`].
///
/// Lets clients hold heterogeneous arena-backed containers behind one
/// interface when all they need is occupancy and health. Containers
/// report their jeopardy state here; the flag is sticky and clears only
/// by rebuilding the container.
pub trait Container {
    /// Number of elements currently held.
    fn len(&self) -> usize;

    /// Whether the container holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any failure has been latched since construction.
    fn is_jeopardized(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(usize, bool);

    impl Container for Fixed {
        fn len(&self) -> usize {
            self.0
        }
        fn is_jeopardized(&self) -> bool {
            self.1
        }
    }

    #[test]
    fn is_empty_follows_len() {
        assert!(Fixed(0, false).is_empty());
        assert!(!Fixed(3, false).is_empty());
    }
}
