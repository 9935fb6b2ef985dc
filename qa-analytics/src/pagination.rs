//! Pagination for the release listing
//!
//! Values arrive as raw query-string text. Anything that does not parse as
//! a usable number falls back to the default instead of failing the request.

/// Releases returned when no limit is requested
pub const DEFAULT_LIMIT: u64 = 5;

/// Skip/limit window over the sorted release list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleasePage {
    pub skip: u64,
    pub limit: u64,
}

impl Default for ReleasePage {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ReleasePage {
    /// Build a page, replacing a zero limit with the default
    pub fn new(skip: u64, limit: u64) -> Self {
        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
        Self { skip, limit }
    }

    /// Parse optional query-string values
    ///
    /// Missing, negative or non-numeric values use the defaults.
    ///
    /// # Examples
    /// ```
    /// use qa_analytics::pagination::ReleasePage;
    ///
    /// let page = ReleasePage::parse(Some("10"), None);
    /// assert_eq!(page.skip, 10);
    /// assert_eq!(page.limit, 5);
    ///
    /// // Zero limit means "default"
    /// assert_eq!(ReleasePage::parse(None, Some("0")).limit, 5);
    /// ```
    pub fn parse(skip: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |value: Option<&str>| value.and_then(|v| v.trim().parse::<u64>().ok());
        let defaults = Self::default();

        Self::new(
            parse(skip).unwrap_or(defaults.skip),
            parse(limit).unwrap_or(defaults.limit),
        )
    }
}
