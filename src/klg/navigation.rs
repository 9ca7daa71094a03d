//! Stream offsets visited during forward reads

/// Offsets of consumed records, most recent on top.
///
/// The top is always where reading resumes to redo the current frame.
#[derive(Debug, Default, Clone)]
pub struct NavigationStack {
    offsets: Vec<u64>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, offset: u64) {
        self.offsets.push(offset);
    }

    pub fn pop(&mut self) -> Option<u64> {
        self.offsets.pop()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Drop all history and release its memory.
    pub fn clear(&mut self) {
        self.offsets = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_in_first_out() {
        let mut stack = NavigationStack::new();
        assert!(stack.is_empty());

        stack.push(4);
        stack.push(100);
        assert_eq!(stack.len(), 2);

        assert_eq!(stack.pop(), Some(100));
        assert_eq!(stack.pop(), Some(4));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn clear_empties() {
        let mut stack = NavigationStack::new();
        stack.push(4);
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
    }
}
