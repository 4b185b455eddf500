use crate::query::trigram_query::Query;
use std::collections::BTreeSet;

/// Maximum number of strings kept in one set
pub const MAX_SET_SIZE: usize = 200;

/// Maximum total bytes stored across one set
pub const MAX_SET_BYTES: usize = 4096;

/// Sorted set of byte strings used for exact/prefix/suffix tracking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringSet(BTreeSet<Vec<u8>>);

impl StringSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set `{""}`
    pub fn empty_string() -> Self {
        Self::single(Vec::new())
    }

    pub fn single(s: impl Into<Vec<u8>>) -> Self {
        Self(BTreeSet::from([s.into()]))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.0.iter().map(Vec::as_slice)
    }

    pub fn insert(&mut self, s: impl Into<Vec<u8>>) {
        self.0.insert(s.into());
    }

    /// Whether the set is exactly `{""}`
    pub fn is_empty_string(&self) -> bool {
        self.0.len() == 1 && self.0.iter().all(Vec::is_empty)
    }

    pub fn total_bytes(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    pub fn max_len(&self) -> usize {
        self.0.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Over the cardinality or byte cap
    pub fn overflows(&self) -> bool {
        self.len() > MAX_SET_SIZE || self.total_bytes() > MAX_SET_BYTES
    }

    pub fn union(mut self, other: StringSet) -> StringSet {
        self.0.extend(other.0);
        self
    }

    /// `{x + y : x in self, y in other}`, or `None` when the product would
    /// exceed the caps. The bound is checked before anything is allocated.
    pub fn cross(&self, other: &StringSet) -> Option<StringSet> {
        let count = self.len().checked_mul(other.len())?;
        let bytes = self
            .len()
            .checked_mul(other.total_bytes())?
            .checked_add(other.len().checked_mul(self.total_bytes())?)?;
        if count > MAX_SET_SIZE || bytes > MAX_SET_BYTES {
            return None;
        }

        let mut out = BTreeSet::new();
        for x in &self.0 {
            for y in &other.0 {
                let mut s = Vec::with_capacity(x.len() + y.len());
                s.extend_from_slice(x);
                s.extend_from_slice(y);
                out.insert(s);
            }
        }
        Some(StringSet(out))
    }

    /// Longest prefix shared by every member
    pub fn common_prefix(&self) -> Vec<u8> {
        let mut iter = self.0.iter();
        let Some(first) = iter.next() else {
            return Vec::new();
        };
        let mut len = first.len();
        for s in iter {
            len = first[..len].iter().zip(s).take_while(|(a, b)| a == b).count();
        }
        first[..len].to_vec()
    }

    /// Longest suffix shared by every member
    pub fn common_suffix(&self) -> Vec<u8> {
        let mut iter = self.0.iter();
        let Some(first) = iter.next() else {
            return Vec::new();
        };
        let mut len = first.len();
        for s in iter {
            len = first[first.len() - len..]
                .iter()
                .rev()
                .zip(s.iter().rev())
                .take_while(|(a, b)| a == b)
                .count();
        }
        first[first.len() - len..].to_vec()
    }

    /// Keep the first `n` bytes of every member
    pub fn truncate_prefixes(&self, n: usize) -> StringSet {
        StringSet(self.0.iter().map(|s| s[..s.len().min(n)].to_vec()).collect())
    }

    /// Keep the last `n` bytes of every member
    pub fn truncate_suffixes(&self, n: usize) -> StringSet {
        StringSet(
            self.0
                .iter()
                .map(|s| s[s.len().saturating_sub(n)..].to_vec())
                .collect(),
        )
    }

    /// Drop members that extend another member (as prefix sets, `{"ab", "abc"}`
    /// only says as much as `{"ab"}`)
    pub fn minimize_prefixes(&mut self) {
        // In sorted order a string's prefixes come before it.
        let mut kept: Vec<Vec<u8>> = Vec::with_capacity(self.0.len());
        for s in std::mem::take(&mut self.0) {
            if !kept.iter().any(|k| s.starts_with(k)) {
                kept.push(s);
            }
        }
        self.0 = kept.into_iter().collect();
    }

    /// Suffix counterpart of [`StringSet::minimize_prefixes`]
    pub fn minimize_suffixes(&mut self) {
        let mut by_len: Vec<Vec<u8>> = std::mem::take(&mut self.0).into_iter().collect();
        by_len.sort_by_key(Vec::len);
        let mut kept: Vec<Vec<u8>> = Vec::with_capacity(by_len.len());
        for s in by_len {
            if !kept.iter().any(|k| s.ends_with(k)) {
                kept.push(s);
            }
        }
        self.0 = kept.into_iter().collect();
    }

    /// OR over the members of the AND of each member's trigrams.
    ///
    /// A member shorter than three bytes constrains nothing, so it makes the
    /// whole set `All`. The empty set is `None`.
    pub fn to_query(&self) -> Query {
        if self.0.iter().any(|s| s.len() < 3) {
            return Query::All;
        }
        Query::any_of(self.0.iter().map(|s| Query::string(s)).collect())
    }
}

impl<S: Into<Vec<u8>>> FromIterator<S> for StringSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        StringSet(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> StringSet {
        items.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_cross() {
        let product = set(&["a", "b"]).cross(&set(&["x", ""])).unwrap();
        assert_eq!(product, set(&["a", "ax", "b", "bx"]));
    }

    #[test]
    fn test_cross_overflow() {
        let big: StringSet = (0..20).map(|i| format!("{i:02}")).collect();
        assert!(big.cross(&big).is_none());
        let small: StringSet = (0..10).map(|i| format!("{i}")).collect();
        assert_eq!(big.cross(&small).map(|s| s.len()), Some(200));
    }

    #[test]
    fn test_cross_byte_cap() {
        let long = StringSet::single(vec![b'x'; 3000]);
        let two = set(&["a", "b"]);
        assert!(long.cross(&two).is_none());
    }

    #[test]
    fn test_common_affixes() {
        let s = set(&["foobar", "fooqux", "foo_bar"]);
        assert_eq!(s.common_prefix(), b"foo");
        assert_eq!(set(&["xbar", "ybar", "bar"]).common_suffix(), b"bar");
        assert_eq!(set(&["abc", "xyz"]).common_prefix(), b"");
        assert_eq!(StringSet::new().common_prefix(), b"");
    }

    #[test]
    fn test_minimize() {
        let mut s = set(&["ab", "abc", "abd", "x"]);
        s.minimize_prefixes();
        assert_eq!(s, set(&["ab", "x"]));

        let mut s = set(&["bc", "abc", "zbc", "q"]);
        s.minimize_suffixes();
        assert_eq!(s, set(&["bc", "q"]));

        let mut s = set(&["", "abc"]);
        s.minimize_prefixes();
        assert!(s.is_empty_string());
    }

    #[test]
    fn test_truncate() {
        let s = set(&["abcdef", "xy"]);
        assert_eq!(s.truncate_prefixes(3), set(&["abc", "xy"]));
        assert_eq!(s.truncate_suffixes(3), set(&["def", "xy"]));
    }

    #[test]
    fn test_to_query() {
        assert_eq!(set(&["ab", "abcd"]).to_query(), Query::All);
        assert_eq!(StringSet::new().to_query(), Query::None);
        assert_eq!(
            set(&["abcd", "wxyz"]).to_query().to_string(),
            "(\"abc\" \"bcd\")|(\"wxy\" \"xyz\")"
        );
    }
}
