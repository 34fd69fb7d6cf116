/// Read-only view of the decoder's current position, supplied per decision.
///
/// Implemented by the stream decoder. The filter never retains it.
pub trait FilterInfo {
    /// Resolved class name, or `None` when no class is known at this point
    /// (primitives, `void`, array bases, or a pure limit check).
    fn class_name(&self) -> Option<&str>;

    /// Current nesting depth of the object graph.
    fn depth(&self) -> u64;

    /// Length of the array being decoded, if the current node is an array.
    fn array_length(&self) -> Option<u64>;

    /// Distinct object references seen so far in the stream.
    fn references(&self) -> u64;

    /// Bytes consumed so far from the stream.
    fn stream_bytes(&self) -> u64;
}

/// Plain [`FilterInfo`] snapshot, built with chained setters.
///
/// ```
/// use unmarshal_filter::Query;
///
/// let query = Query::new()
///     .class("java.util.HashMap")
///     .depth(2)
///     .references(14)
///     .stream_bytes(512);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Query<'a> {
    class_name: Option<&'a str>,
    depth: u64,
    array_length: Option<u64>,
    references: u64,
    stream_bytes: u64,
}

impl<'a> Query<'a> {
    /// An empty query: no class, every counter at zero, not an array.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn class(mut self, name: &'a str) -> Self {
        self.class_name = Some(name);
        self
    }

    #[must_use]
    pub fn depth(mut self, depth: u64) -> Self {
        self.depth = depth;
        self
    }

    #[must_use]
    pub fn array_length(mut self, len: u64) -> Self {
        self.array_length = Some(len);
        self
    }

    #[must_use]
    pub fn references(mut self, refs: u64) -> Self {
        self.references = refs;
        self
    }

    #[must_use]
    pub fn stream_bytes(mut self, bytes: u64) -> Self {
        self.stream_bytes = bytes;
        self
    }
}

impl FilterInfo for Query<'_> {
    fn class_name(&self) -> Option<&str> {
        self.class_name
    }

    fn depth(&self) -> u64 {
        self.depth
    }

    fn array_length(&self) -> Option<u64> {
        self.array_length
    }

    fn references(&self) -> u64 {
        self.references
    }

    fn stream_bytes(&self) -> u64 {
        self.stream_bytes
    }
}

/// Class name used for matching: absent classes match as `""`.
pub(crate) fn class_name_of<I: FilterInfo + ?Sized>(info: &I) -> &str {
    info.class_name().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_query_is_empty() {
        let q = Query::new();
        assert_eq!(q.class_name(), None);
        assert_eq!(FilterInfo::depth(&q), 0);
        assert_eq!(FilterInfo::array_length(&q), None);
        assert_eq!(FilterInfo::references(&q), 0);
        assert_eq!(FilterInfo::stream_bytes(&q), 0);
    }

    #[test]
    fn setters_populate_fields() {
        let q = Query::new()
            .class("com.example.Foo")
            .depth(3)
            .array_length(16)
            .references(7)
            .stream_bytes(2048);
        assert_eq!(q.class_name(), Some("com.example.Foo"));
        assert_eq!(FilterInfo::depth(&q), 3);
        assert_eq!(FilterInfo::array_length(&q), Some(16));
        assert_eq!(FilterInfo::references(&q), 7);
        assert_eq!(FilterInfo::stream_bytes(&q), 2048);
    }

    #[test]
    fn absent_class_matches_as_empty() {
        assert_eq!(class_name_of(&Query::new()), "");
        assert_eq!(class_name_of(&Query::new().class("a.B")), "a.B");
    }
}
