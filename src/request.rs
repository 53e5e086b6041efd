use std::collections::BTreeMap;

/// Cookie parameters of an inbound request, keyed by cookie name.
pub type CookieParams = BTreeMap<String, CookieValue>;

/// The value of one inbound cookie parameter.
///
/// After the middleware has decoded a request, a protected cookie that failed
/// verification or decryption is [`CookieValue::Absent`]: it reads exactly
/// like a cookie that was never sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieValue {
    /// No usable value
    Absent,
    /// A single string value
    Text(String),
    /// An array-valued cookie; each element is decoded independently
    List(Vec<CookieValue>),
}

impl CookieValue {
    /// Returns the string value, or `None` for absent and list values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CookieValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the elements of an array-valued cookie.
    pub fn as_list(&self) -> Option<&[CookieValue]> {
        match self {
            CookieValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true for [`CookieValue::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, CookieValue::Absent)
    }

    /// Counts absent leaves, recursing into lists.
    pub(crate) fn absent_leaves(&self) -> usize {
        match self {
            CookieValue::Absent => 1,
            CookieValue::Text(_) => 0,
            CookieValue::List(items) => items.iter().map(CookieValue::absent_leaves).sum(),
        }
    }
}

impl From<&str> for CookieValue {
    fn from(value: &str) -> Self {
        CookieValue::Text(value.to_string())
    }
}

impl From<String> for CookieValue {
    fn from(value: String) -> Self {
        CookieValue::Text(value)
    }
}

impl From<Vec<CookieValue>> for CookieValue {
    fn from(items: Vec<CookieValue>) -> Self {
        CookieValue::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        let text = CookieValue::from("value");
        assert_eq!(text.as_str(), Some("value"));
        assert!(text.as_list().is_none());

        let list = CookieValue::from(vec![CookieValue::from("a")]);
        assert_eq!(list.as_list().map(<[_]>::len), Some(1));
        assert!(list.as_str().is_none());

        assert!(CookieValue::Absent.is_absent());
        assert!(CookieValue::Absent.as_str().is_none());
    }

    #[test]
    fn absent_leaves_recurses() {
        let value = CookieValue::List(vec![
            CookieValue::Absent,
            CookieValue::from("x"),
            CookieValue::List(vec![CookieValue::Absent, CookieValue::Absent]),
        ]);
        assert_eq!(value.absent_leaves(), 3);
        assert_eq!(CookieValue::from("x").absent_leaves(), 0);
    }
}
