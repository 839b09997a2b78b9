//! Concurrency window configuration

/// How many tasks a scheduler may keep launched-but-not-completed at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// Launch every task immediately
    #[default]
    Unbounded,
    /// Keep at most this many tasks in flight; `0` runs nothing
    Limit(usize),
}

impl Concurrency {
    /// Effective window size for a list of `total` tasks
    ///
    /// # Example
    ///
    /// ```rust
    /// use callflow_core::Concurrency;
    ///
    /// assert_eq!(Concurrency::Unbounded.window(5), 5);
    /// assert_eq!(Concurrency::Limit(2).window(5), 2);
    /// assert_eq!(Concurrency::Limit(64).window(5), 5);
    /// ```
    #[must_use]
    pub fn window(self, total: usize) -> usize {
        match self {
            Self::Unbounded => total,
            Self::Limit(limit) => limit.min(total),
        }
    }
}

impl From<usize> for Concurrency {
    fn from(limit: usize) -> Self {
        Self::Limit(limit)
    }
}

impl From<Option<usize>> for Concurrency {
    fn from(limit: Option<usize>) -> Self {
        limit.map_or(Self::Unbounded, Self::Limit)
    }
}
