//! Response header map with case-insensitive name lookup.
//!
//! HTTP headers are order-preserving and case-insensitive per [RFC 9110 §5].

/// A case-insensitive, multi-value HTTP header map.
///
/// Preserves the order the server sent fields in and keeps repeated fields,
/// which is what a cached response needs to replay faithfully.
///
/// # Examples
///
/// ```
/// use cachefetch::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.insert("Content-Type", "application/json");
/// headers.insert("Content-Length", "17");
///
/// assert_eq!(headers.get("content-type"), Some("application/json"));
/// assert_eq!(headers.content_length(), Some(17));
/// assert!(!headers.is_chunked());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header map with pre-allocated capacity for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
        }
    }

    /// Appends a header entry. Multiple values for the same name are preserved.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the first value for the given header name (case-insensitive), or `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over all values for the given header name (case-insensitive).
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.inner
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `Content-Length` parsed as a `usize`, if present and well-formed.
    pub fn content_length(&self) -> Option<usize> {
        self.get("content-length")?.trim().parse().ok()
    }

    /// Returns `true` if the final transfer coding is `chunked` (RFC 9112 §6.1).
    pub fn is_chunked(&self) -> bool {
        self.get_all("transfer-encoding")
            .flat_map(|v| v.split(','))
            .last()
            .is_some_and(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
    }

    /// Approximate heap footprint, used to weigh cache entries.
    pub(crate) fn byte_size(&self) -> usize {
        self.inner.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_get() {
        let mut h = Headers::new();
        h.insert("Content-Type", "text/plain");
        assert_eq!(h.get("content-type"), Some("text/plain"));
        assert_eq!(h.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn repeated_fields_kept_in_order() {
        let mut h = Headers::new();
        h.insert("Vary", "Accept");
        h.insert("Vary", "Accept-Encoding");
        let vals: Vec<_> = h.get_all("vary").collect();
        assert_eq!(vals, vec!["Accept", "Accept-Encoding"]);
    }

    #[test]
    fn content_length_rejects_garbage() {
        let mut h = Headers::new();
        h.insert("Content-Length", "abc");
        assert_eq!(h.content_length(), None);
        assert_eq!(Headers::new().content_length(), None);
    }

    #[test]
    fn chunked_must_be_last_coding() {
        let mut h = Headers::new();
        h.insert("Transfer-Encoding", "gzip, chunked");
        assert!(h.is_chunked());

        let mut h = Headers::new();
        h.insert("Transfer-Encoding", "chunked, gzip");
        assert!(!h.is_chunked());
    }
}
