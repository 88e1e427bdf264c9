//! Offset paging over a room's message log.

use serde::{Deserialize, Serialize};

/// Zero-based page of a newest-first listing.
///
/// Page 0 holds the `size` most recent messages, page 1 the `size` before
/// those, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Rows to skip.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(0, 30).offset(), 0);
        assert_eq!(PageRequest::new(3, 30).offset(), 90);
        assert_eq!(PageRequest::new(2, 1).limit(), 1);
    }
}
