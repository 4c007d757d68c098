//! Single-slot mailbox
//!
//! Holds at most one unread value. A write before the previous value was
//! read replaces it: consumers see the latest state, not a history.

/// One overwrite-on-write slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox<T> {
    slot: Option<T>,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> Mailbox<T> {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning the unread value it displaced
    pub fn put(&mut self, value: T) -> Option<T> {
        self.slot.replace(value)
    }

    /// Remove and return the unread value, if any
    pub fn take(&mut self) -> Option<T> {
        self.slot.take()
    }

    /// Whether an unread value is waiting
    pub fn is_full(&self) -> bool {
        self.slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_empty() {
        let mut mailbox: Mailbox<u32> = Mailbox::new();
        assert!(!mailbox.is_full());
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_put_then_take() {
        let mut mailbox = Mailbox::new();
        assert_eq!(mailbox.put(1), None);
        assert!(mailbox.is_full());
        assert_eq!(mailbox.take(), Some(1));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_unread_value_is_displaced() {
        let mut mailbox = Mailbox::new();
        mailbox.put("first");
        assert_eq!(mailbox.put("second"), Some("first"));
        assert_eq!(mailbox.take(), Some("second"));
        assert_eq!(mailbox.take(), None);
    }
}
