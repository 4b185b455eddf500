//! Regex to trigram query compilation.
//!
//! The regex is parsed into `regex-syntax`'s HIR and summarized bottom-up into
//! a [`RegexInfo`]: what the matched text must look like (exact strings,
//! prefixes, suffixes) plus a trigram query it must satisfy. The summary is
//! conservative: a text matching the regex always satisfies the query.

use crate::error::PatternError;
use crate::query::string_set::{MAX_SET_SIZE, StringSet};
use crate::query::trigram_query::Query;
use regex_syntax::ParserBuilder;
use regex_syntax::hir::{Class, Hir, HirKind, Repetition};

/// Exact strings longer than this are folded into the match query
pub const MAX_EXACT_LEN: usize = 4;

/// Prefix/suffix strings longer than this are folded and truncated
pub const MAX_AFFIX_LEN: usize = 3;

/// Summary of everything a regex can match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexInfo {
    /// The regex matches the empty string
    pub can_empty: bool,
    /// The complete set of matched strings, when small enough to know
    pub exact: Option<StringSet>,
    /// Every match starts with one of these
    pub prefix: StringSet,
    /// Every match ends with one of these
    pub suffix: StringSet,
    /// Every match satisfies this query
    pub matches: Query,
}

impl RegexInfo {
    /// Matches only the empty string
    pub fn empty_string() -> Self {
        Self {
            can_empty: true,
            exact: Some(StringSet::empty_string()),
            prefix: StringSet::empty_string(),
            suffix: StringSet::empty_string(),
            matches: Query::All,
        }
    }

    /// Matches any single character
    pub fn any_char() -> Self {
        Self {
            can_empty: false,
            exact: None,
            prefix: StringSet::empty_string(),
            suffix: StringSet::empty_string(),
            matches: Query::All,
        }
    }

    /// Matches any string, including the empty one
    pub fn any_match() -> Self {
        Self {
            can_empty: true,
            ..Self::any_char()
        }
    }

    /// Matches nothing at all
    pub fn no_match() -> Self {
        Self {
            can_empty: false,
            exact: Some(StringSet::new()),
            prefix: StringSet::new(),
            suffix: StringSet::new(),
            matches: Query::None,
        }
    }

    /// Matches exactly the given strings
    pub fn exact(set: StringSet) -> Self {
        let can_empty = set.iter().any(<[u8]>::is_empty);
        Self {
            can_empty,
            prefix: set.clone(),
            suffix: set.clone(),
            exact: Some(set),
            matches: Query::All,
        }
        .normalize()
    }

    /// The query a file must satisfy to possibly contain a match
    pub fn query(&self) -> Query {
        match &self.exact {
            Some(exact) => self.matches.clone().and(exact.to_query()),
            None => self
                .matches
                .clone()
                .and(self.prefix.to_query())
                .and(self.suffix.to_query()),
        }
    }

    /// Enforce the size bounds, moving information that no longer fits in
    /// the string sets into `matches`.
    fn normalize(mut self) -> Self {
        // An oversized exact set is dropped; prefix/suffix still describe it.
        if let Some(exact) = self.exact.take().filter(|e| !e.overflows()) {
            if exact.max_len() > MAX_EXACT_LEN {
                self.matches = self.matches.and(exact.to_query());
                self.prefix = exact.clone();
                self.suffix = exact;
            } else {
                self.exact = Some(exact);
            }
        }

        if self.prefix.overflows() {
            self.prefix = StringSet::single(self.prefix.common_prefix());
        }
        if self.suffix.overflows() {
            self.suffix = StringSet::single(self.suffix.common_suffix());
        }

        if self.prefix.max_len() > MAX_AFFIX_LEN {
            self.matches = self.matches.and(self.prefix.to_query());
            self.prefix = self.prefix.truncate_prefixes(MAX_AFFIX_LEN);
        }
        if self.suffix.max_len() > MAX_AFFIX_LEN {
            self.matches = self.matches.and(self.suffix.to_query());
            self.suffix = self.suffix.truncate_suffixes(MAX_AFFIX_LEN);
        }

        self.prefix.minimize_prefixes();
        self.suffix.minimize_suffixes();
        self
    }
}

/// `a` followed by `b`
pub fn concat(a: RegexInfo, b: RegexInfo) -> RegexInfo {
    let exact = match (&a.exact, &b.exact) {
        (Some(x), Some(y)) => x.cross(y),
        _ => None,
    };

    let mut prefix = match &a.exact {
        Some(x) => x.cross(&b.prefix).unwrap_or_else(|| x.clone()),
        None => a.prefix.clone(),
    };
    if a.can_empty {
        prefix = prefix.union(b.prefix.clone());
    }

    let mut suffix = match &b.exact {
        Some(y) => a.suffix.cross(y).unwrap_or_else(|| y.clone()),
        None => b.suffix.clone(),
    };
    if b.can_empty {
        suffix = suffix.union(a.suffix.clone());
    }

    let mut matches = a.matches.and(b.matches);
    if let Some(junction) = a.suffix.cross(&b.prefix) {
        matches = matches.and(junction.to_query());
    }

    RegexInfo {
        can_empty: a.can_empty && b.can_empty,
        exact,
        prefix,
        suffix,
        matches,
    }
    .normalize()
}

/// `a|b`
pub fn alternate(a: RegexInfo, b: RegexInfo) -> RegexInfo {
    let exact = match (a.exact, b.exact) {
        (Some(x), Some(y)) => Some(x.union(y)),
        _ => None,
    };

    RegexInfo {
        can_empty: a.can_empty || b.can_empty,
        exact,
        prefix: a.prefix.union(b.prefix),
        suffix: a.suffix.union(b.suffix),
        matches: a.matches.or(b.matches),
    }
    .normalize()
}

/// `a*`, and also `a?`: nothing can be required of an optional match
pub fn star(a: RegexInfo) -> RegexInfo {
    let only_empty = a.exact.as_ref().is_some_and(StringSet::is_empty_string);
    if only_empty {
        RegexInfo::empty_string()
    } else {
        RegexInfo::any_match()
    }
}

/// `a+`
pub fn plus(a: RegexInfo) -> RegexInfo {
    if a.exact.as_ref().is_some_and(StringSet::is_empty_string) {
        return RegexInfo::empty_string();
    }

    let (prefix, suffix, matches) = match a.exact {
        Some(exact) => (exact.clone(), exact.clone(), a.matches.and(exact.to_query())),
        None => (a.prefix, a.suffix, a.matches),
    };

    RegexInfo {
        can_empty: a.can_empty,
        exact: None,
        prefix,
        suffix,
        matches,
    }
    .normalize()
}

/// `a{min,max}`
pub fn repeat(a: RegexInfo, min: u32, max: Option<u32>) -> RegexInfo {
    match (min, max) {
        (0, Some(0)) => return RegexInfo::empty_string(),
        (0, _) => return star(a),
        (1, None) => return plus(a),
        _ => {}
    }

    let mut info = a.clone();
    for _ in 1..min {
        let next = concat(info.clone(), a.clone());
        // Once the summary stops changing further copies add nothing.
        if next == info {
            break;
        }
        info = next;
    }

    match max {
        None => concat(info, star(a)),
        Some(max) if max > min => concat(info, star(a)),
        Some(_) => info,
    }
}

/// Summarize a parsed regex
pub fn analyze(hir: &Hir) -> RegexInfo {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => RegexInfo::empty_string(),
        HirKind::Literal(lit) => RegexInfo::exact(StringSet::single(lit.0.to_vec())),
        HirKind::Class(class) => analyze_class(class),
        HirKind::Capture(cap) => analyze(&cap.sub),
        HirKind::Repetition(Repetition { min, max, sub, .. }) => repeat(analyze(sub), *min, *max),
        HirKind::Concat(subs) => subs
            .iter()
            .map(analyze)
            .reduce(concat)
            .unwrap_or_else(RegexInfo::empty_string),
        HirKind::Alternation(subs) => subs
            .iter()
            .map(analyze)
            .reduce(alternate)
            .unwrap_or_else(RegexInfo::no_match),
    }
}

/// Enumerate small classes, treat large ones as "any character"
fn analyze_class(class: &Class) -> RegexInfo {
    match class {
        Class::Unicode(cls) => {
            let size: usize = cls
                .iter()
                .map(|r| r.end() as usize - r.start() as usize + 1)
                .sum();
            if size == 0 {
                return RegexInfo::no_match();
            }
            if size > MAX_SET_SIZE {
                return RegexInfo::any_char();
            }
            let mut buf = [0u8; 4];
            let set = cls
                .iter()
                .flat_map(|r| r.start()..=r.end())
                .map(|c| c.encode_utf8(&mut buf).as_bytes().to_vec())
                .collect();
            RegexInfo::exact(set)
        }
        Class::Bytes(cls) => {
            let size: usize = cls
                .iter()
                .map(|r| r.end() as usize - r.start() as usize + 1)
                .sum();
            if size == 0 {
                return RegexInfo::no_match();
            }
            if size > MAX_SET_SIZE {
                return RegexInfo::any_char();
            }
            let set = cls
                .iter()
                .flat_map(|r| r.start()..=r.end())
                .map(|b| vec![b])
                .collect();
            RegexInfo::exact(set)
        }
    }
}

/// Parse `pattern` the way the line matcher will see it
pub fn parse(pattern: &str, case_insensitive: bool) -> Result<Hir, PatternError> {
    ParserBuilder::new()
        .case_insensitive(case_insensitive)
        .multi_line(true)
        .utf8(false)
        .build()
        .parse(pattern)
        .map_err(|e| PatternError::Syntax {
            pattern: pattern.to_string(),
            source: Box::new(e),
        })
}

/// Compile a regex into the trigram query its matching files must satisfy
pub fn compile(pattern: &str, case_insensitive: bool) -> Result<Query, PatternError> {
    let hir = parse(pattern, case_insensitive)?;
    Ok(analyze(&hir).query().simplify())
}
