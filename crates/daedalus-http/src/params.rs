//! Ordered name/value pairs.
//!
//! [`Params`] stores path parameters captured by a router and the decoded
//! pairs of a query string. Small sets stay on the stack. Lookups return the
//! first pair with a matching name.

use smallvec::SmallVec;

/// Maximum number of pairs stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Ordered name/value pairs.
///
/// # Example
///
/// ```rust
/// use daedalus_http::Params;
///
/// let mut params = Params::new();
/// params.push("id", "123");
/// params.push("id", "456");
///
/// assert_eq!(params.get("id"), Some("123"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` query string.
    ///
    /// Percent-escapes and `+` are decoded. Repeated names are kept in order.
    ///
    /// ```rust
    /// use daedalus_http::Params;
    ///
    /// let params = Params::from_query("q=hello+world&tag=a&tag=b").unwrap();
    /// assert_eq!(params.get("q"), Some("hello world"));
    /// assert_eq!(params.get("tag"), Some("a"));
    /// assert_eq!(params.len(), 3);
    /// ```
    pub fn from_query(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        Ok(pairs.into_iter().collect())
    }

    /// Appends a pair.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the first value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.inner
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}
