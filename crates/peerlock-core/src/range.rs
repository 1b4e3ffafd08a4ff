//! Range atom grammar and the half-open interval algebra built on top of it.
//!
//! A range *expression* (e.g. `"^1.2.0 <2.0.0 || 3.x"`) is a `||`-separated list
//! of alternatives; each alternative intersects at most its first two
//! whitespace-separated atoms (§4.1's documented limitation — extra atoms are
//! silently dropped, not rejected).

use crate::version::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Caret,
    Tilde,
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
}

/// A parsed atom's components. `None` means the wildcard `x`/`*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Components {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
}

/// A half-open interval `[lo, hi)`. `hi = None` means unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub lo: Version,
    pub hi: Option<Version>,
}

impl Range {
    pub fn unbounded() -> Self {
        Range { lo: Version::new(0, 0, 0), hi: None }
    }

    /// Sentinel that never matches any version, used for disjoint intersections
    /// and unparsable atoms.
    pub fn empty() -> Self {
        Range { lo: Version::new(u64::MAX, u64::MAX, u64::MAX), hi: Some(Version::new(0, 0, 0)) }
    }

    pub fn contains(&self, v: &Version) -> bool {
        v >= &self.lo && self.hi.map(|hi| v < &hi).unwrap_or(true)
    }

    pub fn intersect(&self, other: &Range) -> Range {
        let lo = self.lo.max(other.lo);
        let hi = match (self.hi, other.hi) {
            (None, None) => None,
            (Some(h), None) | (None, Some(h)) => Some(h),
            (Some(h1), Some(h2)) => Some(h1.min(h2)),
        };
        if let Some(h) = hi {
            if lo >= h {
                return Range::empty();
            }
        }
        Range { lo, hi }
    }
}

fn bump_from_prefix(major: u64, minor: Option<u64>, patch: Option<u64>) -> Version {
    match (minor, patch) {
        (Some(m), Some(p)) => Version::new(major, m, p + 1),
        (Some(m), None) => Version::new(major, m + 1, 0),
        (None, _) => Version::new(major + 1, 0, 0),
    }
}

fn parse_component(raw: &str) -> Option<u64> {
    if raw.is_empty() || raw == "x" || raw == "X" || raw == "*" {
        None
    } else {
        raw.parse::<u64>().ok()
    }
}

fn parse_atom(raw: &str) -> Option<Range> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (op, rest) = if let Some(r) = raw.strip_prefix(">=") {
        (Op::Ge, r)
    } else if let Some(r) = raw.strip_prefix("<=") {
        (Op::Le, r)
    } else if let Some(r) = raw.strip_prefix('^') {
        (Op::Caret, r)
    } else if let Some(r) = raw.strip_prefix('~') {
        (Op::Tilde, r)
    } else if let Some(r) = raw.strip_prefix('>') {
        (Op::Gt, r)
    } else if let Some(r) = raw.strip_prefix('<') {
        (Op::Lt, r)
    } else if let Some(r) = raw.strip_prefix('=') {
        (Op::Eq, r)
    } else {
        (Op::Eq, raw)
    };

    // Truncate a trailing build/pre-release suffix before parsing components.
    let rest = match rest.find(['+', '-']) {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    if rest.is_empty() {
        return None;
    }

    let mut tokens = rest.split('.');
    let major_tok = tokens.next()?;
    let minor_tok = tokens.next();
    let patch_tok = tokens.next();
    if tokens.next().is_some() {
        // More than three components is not a valid atom.
        return None;
    }

    // An unparsable non-wildcard token anywhere is a grammar violation for this atom.
    let is_wildcard_token = |t: &str| matches!(t, "x" | "X" | "*");
    let major = parse_component(major_tok);
    if major.is_none() && !is_wildcard_token(major_tok) {
        return None;
    }
    let component_or_reject = |tok: Option<&str>| -> Result<Option<u64>, ()> {
        match tok {
            None => Ok(None),
            Some(t) => {
                let c = parse_component(t);
                if c.is_none() && !is_wildcard_token(t) {
                    Err(())
                } else {
                    Ok(c)
                }
            }
        }
    };
    let minor = component_or_reject(minor_tok).ok()?;
    let patch = component_or_reject(patch_tok).ok()?;

    Some(components_to_range(op, Components { major, minor, patch }))
}

fn components_to_range(op: Op, c: Components) -> Range {
    let major = match c.major {
        Some(m) => m,
        // A fully-wildcard major collapses the whole atom to "matches everything".
        None => return Range::unbounded(),
    };

    match op {
        Op::Caret => {
            if major > 0 {
                let lo = Version::new(major, c.minor.unwrap_or(0), c.patch.unwrap_or(0));
                Range { lo, hi: Some(Version::new(major + 1, 0, 0)) }
            } else if c.minor.unwrap_or(0) > 0 {
                let minor = c.minor.unwrap_or(0);
                let lo = Version::new(0, minor, c.patch.unwrap_or(0));
                Range { lo, hi: Some(Version::new(0, minor + 1, 0)) }
            } else {
                let patch = c.patch.unwrap_or(0);
                Range { lo: Version::new(0, 0, patch), hi: Some(Version::new(0, 0, patch + 1)) }
            }
        }
        Op::Tilde => {
            let minor = c.minor.unwrap_or(0);
            let lo = Version::new(major, minor, c.patch.unwrap_or(0));
            Range { lo, hi: Some(Version::new(major, minor + 1, 0)) }
        }
        Op::Eq => {
            let lo = Version::new(major, c.minor.unwrap_or(0), c.patch.unwrap_or(0));
            Range { lo, hi: Some(bump_from_prefix(major, c.minor, c.patch)) }
        }
        Op::Ge => {
            let lo = Version::new(major, c.minor.unwrap_or(0), c.patch.unwrap_or(0));
            Range { lo, hi: None }
        }
        Op::Gt => Range { lo: bump_from_prefix(major, c.minor, c.patch), hi: None },
        Op::Le => Range { lo: Version::new(0, 0, 0), hi: Some(bump_from_prefix(major, c.minor, c.patch)) },
        Op::Lt => {
            let hi = Version::new(major, c.minor.unwrap_or(0), c.patch.unwrap_or(0));
            Range { lo: Version::new(0, 0, 0), hi: Some(hi) }
        }
    }
}

/// Result of evaluating a version against a range expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub compatible: bool,
    pub higher_required: bool,
}

/// Evaluates `v` against a full range expression (`||`-separated alternatives,
/// each an intersection of up to its first two whitespace-separated atoms).
///
/// An unparsable atom is a grammar violation, not a hard error: the alternative
/// it appears in never matches and never signals `higher_required`, per the
/// "no match, no higher required" rule.
pub fn evaluate(expr: &str, v: &Version) -> MatchResult {
    let mut compatible = false;
    let mut any_alternative_not_below_lo = false;

    for alternative in expr.split("||") {
        let atoms: Vec<&str> = alternative.split_whitespace().take(2).collect();
        if atoms.is_empty() {
            any_alternative_not_below_lo = true;
            continue;
        }

        let mut grammar_violation = false;
        let mut range: Option<Range> = None;
        for atom in &atoms {
            match parse_atom(atom) {
                Some(r) => {
                    range = Some(match range {
                        Some(acc) => acc.intersect(&r),
                        None => r,
                    });
                }
                None => {
                    grammar_violation = true;
                    break;
                }
            }
        }

        if grammar_violation {
            any_alternative_not_below_lo = true;
            continue;
        }

        let range = range.unwrap_or_else(Range::empty);
        if range.contains(v) {
            compatible = true;
        } else if v >= &range.lo {
            any_alternative_not_below_lo = true;
        }
    }

    MatchResult { compatible, higher_required: !compatible && !any_alternative_not_below_lo }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn caret_major_nonzero() {
        assert!(evaluate("^1.2.3", &v("1.9.9")).compatible);
        assert!(!evaluate("^1.2.3", &v("2.0.0")).compatible);
    }

    #[test]
    fn caret_zero_minor() {
        assert!(evaluate("^0.2.3", &v("0.2.9")).compatible);
        assert!(!evaluate("^0.2.3", &v("0.3.0")).compatible);
    }

    #[test]
    fn caret_zero_zero() {
        assert!(evaluate("^0.0.3", &v("0.0.3")).compatible);
        assert!(!evaluate("^0.0.3", &v("0.0.4")).compatible);
    }

    #[test]
    fn tilde() {
        assert!(evaluate("~1.2.3", &v("1.2.9")).compatible);
        assert!(!evaluate("~1.2.3", &v("1.3.0")).compatible);
    }

    #[test]
    fn range_intersection_atoms() {
        assert!(evaluate(">=1.0.0 <2.0.0", &v("1.5.0")).compatible);
        assert!(!evaluate(">=1.0.0 <2.0.0", &v("2.0.0")).compatible);
        assert!(!evaluate(">=1.0.0 <2.0.0", &v("0.9.9")).compatible);
    }

    #[test]
    fn union_of_alternatives() {
        assert!(evaluate("1.x || 2.x", &v("1.4.0")).compatible);
        assert!(evaluate("1.x || 2.x", &v("2.7.0")).compatible);
        assert!(!evaluate("1.x || 2.x", &v("3.0.0")).compatible);
    }

    #[test]
    fn disjoint_intersection_rejects_all() {
        // Constructed so that >=2.0.0 and <1.0.0 never overlap.
        assert!(!evaluate(">=2.0.0 <1.0.0", &v("1.5.0")).compatible);
        assert!(!evaluate(">=2.0.0 <1.0.0", &v("0.1.0")).compatible);
        assert!(!evaluate(">=2.0.0 <1.0.0", &v("5.0.0")).compatible);
    }

    #[test]
    fn higher_required_flag() {
        assert!(evaluate(">=2.0.0", &v("1.0.0")).higher_required);
        assert!(!evaluate("<2.0.0", &v("3.0.0")).higher_required);
    }

    #[test]
    fn third_atom_is_dropped() {
        // The third atom (!=1.5.0, itself not even a valid atom form) must be ignored.
        let a = evaluate(">=1.0.0 <2.0.0 !=1.5.0", &v("1.5.0"));
        let b = evaluate(">=1.0.0 <2.0.0", &v("1.5.0"));
        assert_eq!(a, b);
    }

    #[test]
    fn grammar_violation_is_no_match_no_higher_required() {
        let r = evaluate("not-a-range", &v("1.0.0"));
        assert!(!r.compatible);
        assert!(!r.higher_required);
    }

    proptest::proptest! {
        #[test]
        fn wildcard_major_matches_everything(major in 0u64..1000, minor in 0u64..1000, patch in 0u64..1000) {
            let r = evaluate("x", &Version::new(major, minor, patch));
            proptest::prop_assert!(r.compatible);
        }
    }
}
