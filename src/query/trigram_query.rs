use crate::index::types::{Trigram, trigram_to_bytes};
use crate::utils::string_trigrams;
use std::collections::BTreeSet;
use std::fmt;

/// Boolean query over trigram presence.
///
/// Values are kept in a canonical form by the [`Query::and`] / [`Query::or`]
/// constructors: nested nodes of the same kind are flattened, single-trigram
/// nodes are folded into the parent's trigram set, `All`/`None` are absorbed,
/// and subqueries are sorted and deduplicated. A lone trigram is always
/// `And({t})`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Query {
    /// Every file is a candidate
    All,
    /// No file is a candidate
    None,
    And {
        trigrams: BTreeSet<Trigram>,
        subs: Vec<Query>,
    },
    Or {
        trigrams: BTreeSet<Trigram>,
        subs: Vec<Query>,
    },
}

impl Query {
    /// Query requiring a single trigram
    pub fn trigram(t: Trigram) -> Self {
        Query::And {
            trigrams: BTreeSet::from([t]),
            subs: Vec::new(),
        }
    }

    /// Query requiring every trigram of `s`; `All` when `s` is shorter than 3 bytes
    pub fn string(s: &[u8]) -> Self {
        make_and(string_trigrams(s).collect(), Vec::new())
    }

    pub fn and(self, other: Query) -> Self {
        make_and(BTreeSet::new(), vec![self, other])
    }

    pub fn or(self, other: Query) -> Self {
        make_or(BTreeSet::new(), vec![self, other])
    }

    /// OR of many queries; `None` when empty
    pub fn any_of(subs: Vec<Query>) -> Self {
        make_or(BTreeSet::new(), subs)
    }

    /// Rebuild the query bottom-up in canonical form
    pub fn simplify(self) -> Self {
        match self {
            Query::All | Query::None => self,
            Query::And { trigrams, subs } => {
                make_and(trigrams, subs.into_iter().map(Query::simplify).collect())
            }
            Query::Or { trigrams, subs } => {
                make_or(trigrams, subs.into_iter().map(Query::simplify).collect())
            }
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Query::All)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Query::None)
    }

    /// Whether a file whose trigram set is given by `has` satisfies the query
    pub fn accepts(&self, has: &impl Fn(Trigram) -> bool) -> bool {
        match self {
            Query::All => true,
            Query::None => false,
            Query::And { trigrams, subs } => {
                trigrams.iter().all(|&t| has(t)) && subs.iter().all(|q| q.accepts(has))
            }
            Query::Or { trigrams, subs } => {
                trigrams.iter().any(|&t| has(t)) || subs.iter().any(|q| q.accepts(has))
            }
        }
    }
}

fn is_single_trigram(trigrams: &BTreeSet<Trigram>, subs: &[Query]) -> bool {
    trigrams.len() == 1 && subs.is_empty()
}

/// Canonical AND of a trigram set and subqueries
fn make_and(mut trigrams: BTreeSet<Trigram>, subs: Vec<Query>) -> Query {
    let mut out = Vec::new();
    for sub in subs {
        match sub {
            Query::All => {}
            Query::None => return Query::None,
            Query::And { trigrams: t, subs: s } => {
                trigrams.extend(t);
                out.extend(s);
            }
            Query::Or { trigrams: t, subs: s } if is_single_trigram(&t, &s) => {
                trigrams.extend(t);
            }
            or => out.push(or),
        }
    }

    // An OR sharing a trigram with this AND is already implied by it.
    out.retain(|q| match q {
        Query::Or { trigrams: t, .. } => t.is_disjoint(&trigrams),
        _ => true,
    });
    out.sort();
    out.dedup();

    if trigrams.is_empty() {
        match out.len() {
            0 => return Query::All,
            1 => return out.remove(0),
            _ => {}
        }
    }
    Query::And { trigrams, subs: out }
}

/// Canonical OR of a trigram set and subqueries
fn make_or(mut trigrams: BTreeSet<Trigram>, subs: Vec<Query>) -> Query {
    let mut out = Vec::new();
    for sub in subs {
        match sub {
            Query::None => {}
            Query::All => return Query::All,
            Query::Or { trigrams: t, subs: s } => {
                trigrams.extend(t);
                out.extend(s);
            }
            Query::And { trigrams: t, subs: s } if is_single_trigram(&t, &s) => {
                trigrams.extend(t);
            }
            and => out.push(and),
        }
    }

    // An AND containing one of these trigrams only narrows an alternative
    // that is already accepted.
    out.retain(|q| match q {
        Query::And { trigrams: t, .. } => t.is_disjoint(&trigrams),
        _ => true,
    });
    out.sort();
    out.dedup();

    if trigrams.is_empty() {
        match out.len() {
            0 => return Query::None,
            1 => return out.remove(0),
            _ => {}
        }
    }
    if is_single_trigram(&trigrams, &out) {
        return Query::And {
            trigrams,
            subs: Vec::new(),
        };
    }
    Query::Or { trigrams, subs: out }
}

struct QuotedTrigram(Trigram);

impl fmt::Display for QuotedTrigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", trigram_to_bytes(self.0).escape_ascii())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (trigrams, subs, sep) = match self {
            Query::All => return f.write_str("+"),
            Query::None => return f.write_str("-"),
            Query::And { trigrams, subs } => (trigrams, subs, " "),
            Query::Or { trigrams, subs } => (trigrams, subs, "|"),
        };

        let mut first = true;
        for &t in trigrams {
            if !first {
                f.write_str(sep)?;
            }
            first = false;
            write!(f, "{}", QuotedTrigram(t))?;
        }
        for sub in subs {
            if !first {
                f.write_str(sep)?;
            }
            first = false;
            write!(f, "({sub})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::bytes_to_trigram;

    fn t(s: &[u8; 3]) -> Trigram {
        bytes_to_trigram(s[0], s[1], s[2])
    }

    fn q(s: &[u8; 3]) -> Query {
        Query::trigram(t(s))
    }

    #[test]
    fn test_identities() {
        assert_eq!(q(b"abc").and(Query::All), q(b"abc"));
        assert_eq!(q(b"abc").and(Query::None), Query::None);
        assert_eq!(q(b"abc").or(Query::None), q(b"abc"));
        assert_eq!(q(b"abc").or(Query::All), Query::All);
    }

    #[test]
    fn test_and_flattens_trigrams() {
        let query = q(b"abc").and(q(b"bcd")).and(q(b"abc"));
        assert_eq!(
            query,
            Query::And {
                trigrams: BTreeSet::from([t(b"abc"), t(b"bcd")]),
                subs: vec![],
            }
        );
        assert_eq!(query.to_string(), "\"abc\" \"bcd\"");
    }

    #[test]
    fn test_or_of_single_trigrams() {
        let query = q(b"abc").or(q(b"def"));
        assert_eq!(
            query,
            Query::Or {
                trigrams: BTreeSet::from([t(b"abc"), t(b"def")]),
                subs: vec![],
            }
        );
        assert_eq!(query.to_string(), "\"abc\"|\"def\"");
        assert_eq!(q(b"abc").or(q(b"abc")), q(b"abc"));
    }

    #[test]
    fn test_nested_display() {
        let query = Query::string(b"abcd").or(Query::string(b"wxyz")).and(q(b"123"));
        assert_eq!(query.to_string(), "\"123\" ((\"abc\" \"bcd\")|(\"wxy\" \"xyz\"))");
    }

    #[test]
    fn test_absorption() {
        // abc AND (abc OR def) == abc
        let query = q(b"abc").and(q(b"abc").or(q(b"def")));
        assert_eq!(query, q(b"abc"));

        // abc OR (abc AND def) == abc
        let query = q(b"abc").or(q(b"abc").and(q(b"def")));
        assert_eq!(query, q(b"abc"));
    }

    #[test]
    fn test_string() {
        assert_eq!(Query::string(b"ab"), Query::All);
        assert_eq!(Query::string(b"abc"), q(b"abc"));
        assert_eq!(Query::string(b"aaaa"), q(b"aaa"));
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let messy = Query::And {
            trigrams: BTreeSet::new(),
            subs: vec![
                Query::All,
                Query::Or {
                    trigrams: BTreeSet::from([t(b"abc")]),
                    subs: vec![Query::None],
                },
                Query::And {
                    trigrams: BTreeSet::from([t(b"xyz")]),
                    subs: vec![],
                },
            ],
        };
        let once = messy.simplify();
        assert_eq!(
            once,
            Query::And {
                trigrams: BTreeSet::from([t(b"abc"), t(b"xyz")]),
                subs: vec![],
            }
        );
        assert_eq!(once.clone().simplify(), once);
    }

    #[test]
    fn test_accepts() {
        let query = Query::string(b"abcd").or(q(b"xyz"));
        let has = |x: Trigram| x == t(b"xyz");
        assert!(query.accepts(&has));
        let has = |x: Trigram| x == t(b"abc");
        assert!(!query.accepts(&has));
    }

    #[test]
    fn test_escaped_display() {
        assert_eq!(Query::string(b"a\"\n").to_string(), "\"a\\\"\\n\"");
        assert_eq!(Query::All.to_string(), "+");
        assert_eq!(Query::None.to_string(), "-");
    }
}
