//! Backend over the `fancy-regex` crate (PCRE-style, backtracking).
//!
//! Flag bits follow the libpcre option values. fancy-regex has no builder
//! flags, so the engine translates the bitmask into an inline `(?ims)` prefix.
//! Runtime errors (such as hitting the backtrack limit) are reported as
//! "no match"; the adapter contract has no runtime-error channel.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;

use bitflags::bitflags;
use fancy_regex::{Captures, Regex};
use log::debug;

use crate::{Engine, Error, Matcher, Regexp, Result};

bitflags! {
    /// Pattern flags for the `fancy-regex` backend, using libpcre bit values.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u32 {
        /// Set case-insensitive matching.
        const CASELESS = 0x0001;
        /// Set multi-line anchoring.
        const MULTILINE = 0x0002;
        /// Matching a `.` will not exclude newlines.
        const DOTALL = 0x0004;
    }
}

impl FromStr for Flags {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut flags = Flags::empty();

        for c in s.chars() {
            match c {
                'i' => flags |= Flags::CASELESS,
                'm' => flags |= Flags::MULTILINE,
                's' => flags |= Flags::DOTALL,
                _ => {
                    return Err(Error::InvalidFlag(c));
                }
            }
        }

        Ok(flags)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(Flags::CASELESS) {
            write!(f, "i")?
        }
        if self.contains(Flags::MULTILINE) {
            write!(f, "m")?
        }
        if self.contains(Flags::DOTALL) {
            write!(f, "s")?
        }
        Ok(())
    }
}

/// A matcher engine backed by the `fancy-regex` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PcreEngine;

impl Engine for PcreEngine {
    fn compile(&self, pattern: &str, flags: u32) -> Result<Box<dyn Regexp>> {
        let flags =
            Flags::from_bits(flags).ok_or(Error::UnsupportedFlags(flags & !Flags::all().bits()))?;

        // the Display impl prints the inline-flag letter codes
        let expr = if flags.is_empty() {
            Cow::Borrowed(pattern)
        } else {
            Cow::Owned(format!("(?{}){}", flags, pattern))
        };

        let re = Regex::new(expr.as_ref()).map_err(|err| Error::InvalidPattern(err.to_string()))?;

        let names = re
            .capture_names()
            .enumerate()
            .filter_map(|(idx, name)| name.map(|name| (name.to_owned(), idx)))
            .collect();

        debug!("pattern `/{}/{}` compiled for the pcre backend", pattern, flags);

        Ok(Box::new(PcreRegexp {
            re: Arc::new(re),
            names: Arc::new(names),
        }))
    }

    fn quote(&self, literal: &str) -> String {
        regex_syntax::escape(literal)
    }

    fn flag_caseless(&self) -> u32 {
        Flags::CASELESS.bits()
    }

    fn flag_dot_all(&self) -> u32 {
        Flags::DOTALL.bits()
    }

    fn flag_multi_line(&self) -> u32 {
        Flags::MULTILINE.bits()
    }
}

struct PcreRegexp {
    re: Arc<Regex>,
    names: Arc<HashMap<String, usize>>,
}

/// Absolute byte ranges of every capture group, `None` for non-participating
/// groups. `base` is the offset of the searched suffix within the subject.
fn capture_slots(caps: &Captures<'_>, groups: usize, base: usize) -> Vec<Option<Range<usize>>> {
    (0..groups)
        .map(|idx| caps.get(idx).map(|m| base + m.start()..base + m.end()))
        .collect()
}

impl Regexp for PcreRegexp {
    fn search<'t>(&self, subject: &'t str) -> Option<Box<dyn Matcher<'t> + 't>> {
        let caps = self.re.captures(subject).ok().flatten()?;
        let whole = caps.get(0)?;
        let groups = caps.len();

        Some(Box::new(PcreMatcher {
            re: self.re.clone(),
            names: self.names.clone(),
            subject,
            at: whole.start()..whole.end(),
            slots: capture_slots(&caps, groups, 0),
            done: false,
        }))
    }
}

struct PcreMatcher<'t> {
    re: Arc<Regex>,
    names: Arc<HashMap<String, usize>>,
    subject: &'t str,
    /// Whole-match range of the current match, in subject offsets.
    at: Range<usize>,
    slots: Vec<Option<Range<usize>>>,
    done: bool,
}

impl<'t> Matcher<'t> for PcreMatcher<'t> {
    fn groups(&self) -> usize {
        self.slots.len()
    }

    fn group(&self, idx: usize) -> &'t str {
        assert!(idx < self.slots.len(), "group index {} out of range", idx);

        self.slots[idx]
            .clone()
            .map_or("", |range| &self.subject[range])
    }

    fn group_present(&self, idx: usize) -> bool {
        assert!(idx < self.slots.len(), "group index {} out of range", idx);

        self.slots[idx].is_some()
    }

    fn group_by_name(&self, name: &str) -> &'t str {
        self.names
            .get(name)
            .and_then(|&idx| self.slots[idx].clone())
            .map_or("", |range| &self.subject[range])
    }

    fn group_present_by_name(&self, name: &str) -> bool {
        self.names
            .get(name)
            .map_or(false, |&idx| self.slots[idx].is_some())
    }

    fn start(&self) -> usize {
        self.at.start
    }

    fn end(&self) -> usize {
        self.at.end
    }

    fn next(&mut self) -> bool {
        if self.done {
            return false;
        }

        let mut resume = self.at.end;
        if self.at.is_empty() {
            // zero-length match: step past one char so iteration terminates
            match self.subject[resume..].chars().next() {
                Some(c) => resume += c.len_utf8(),
                None => {
                    self.done = true;
                    return false;
                }
            }
        }

        let found = self
            .re
            .captures(&self.subject[resume..])
            .ok()
            .flatten()
            .and_then(|caps| {
                let whole = caps.get(0)?;
                let slots = capture_slots(&caps, self.slots.len(), resume);

                Some((resume + whole.start()..resume + whole.end(), slots))
            });

        match found {
            Some((at, slots)) => {
                self.at = at;
                self.slots = slots;
                true
            }
            None => {
                self.done = true;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let _ = env_logger::try_init();

        let flags: Flags = "im".parse().unwrap();

        assert_eq!(flags, Flags::CASELESS | Flags::MULTILINE);
        assert_eq!(format!("{}", flags), "im");
        assert_eq!(Flags::DOTALL.bits(), 0x0004);
        assert!(matches!("q".parse::<Flags>(), Err(Error::InvalidFlag('q'))));
    }

    #[test]
    fn test_compile_errors() {
        let _ = env_logger::try_init();

        assert!(matches!(
            PcreEngine.compile("(unclosed", 0),
            Err(Error::InvalidPattern(_))
        ));
        assert!(matches!(
            PcreEngine.compile("a", 1 << 31),
            Err(Error::UnsupportedFlags(_))
        ));
    }

    #[test]
    fn test_flag_translation() {
        let _ = env_logger::try_init();

        let e = PcreEngine;

        let re = e.compile("a.b", e.flag_dot_all()).unwrap();
        assert!(re.search("a\nb").is_some());

        let re = e.compile("a.b", 0).unwrap();
        assert!(re.search("a\nb").is_none());

        let re = e.compile("abc", e.flag_caseless() | e.flag_dot_all()).unwrap();
        assert!(re.search("xABCx").is_some());
    }

    #[test]
    fn test_backtracking_features() {
        let _ = env_logger::try_init();

        // lookahead and backreferences are what the backtracking backend buys
        let re = PcreEngine.compile(r"foo(?=bar)", 0).unwrap();
        let m = re.search("a foobar b").unwrap();
        assert_eq!(m.group(0), "foo");

        let re = PcreEngine.compile(r"(\w)\1", 0).unwrap();
        let m = re.search("abba").unwrap();
        assert_eq!(m.group(0), "bb");
    }

    #[test]
    fn test_search_and_iterate() {
        let _ = env_logger::try_init();

        let re = PcreEngine.compile("ab", 0).unwrap();

        assert!(re.search("xyz").is_none());

        let mut m = re.search("ab ab ab").unwrap();
        assert_eq!((m.start(), m.end()), (0, 2));
        assert!(m.next());
        assert_eq!((m.start(), m.end()), (3, 5));
        assert!(m.next());
        assert_eq!((m.start(), m.end()), (6, 8));
        assert!(!m.next());
        assert!(!m.next());
    }

    #[test]
    fn test_absent_vs_empty_group() {
        let _ = env_logger::try_init();

        let re = PcreEngine.compile("a(b)?c", 0).unwrap();

        let mut m = re.search("ac abc ac").unwrap();
        assert_eq!(m.groups(), 2);
        assert_eq!(m.group(0), "ac");
        assert!(!m.group_present(1));
        assert_eq!(m.group(1), "");

        assert!(m.next());
        assert_eq!(m.group(0), "abc");
        assert!(m.group_present(1));
        assert_eq!(m.group(1), "b");

        let re = PcreEngine.compile("a(b*)c", 0).unwrap();
        let m = re.search("ac").unwrap();
        assert!(m.group_present(1));
        assert_eq!(m.group(1), "");
    }

    #[test]
    fn test_named_groups() {
        let _ = env_logger::try_init();

        let re = PcreEngine
            .compile(r"(?P<y>\d{4})-(?P<m>\d{2})", 0)
            .unwrap();

        let m = re.search("2023-01").unwrap();
        assert_eq!(m.group_by_name("y"), "2023");
        assert!(m.group_present_by_name("m"));
        assert_eq!(m.group_by_name("nope"), "");
        assert!(!m.group_present_by_name("nope"));
    }

    #[test]
    fn test_replace() {
        let _ = env_logger::try_init();

        let re = PcreEngine
            .compile(r"(\d{4})-(\d{2})-(\d{2})", 0)
            .unwrap();

        assert_eq!(re.replace("2023-01-02", "$3/$2/$1").unwrap(), "02/01/2023");

        let re = PcreEngine.compile("x*", 0).unwrap();
        assert_eq!(re.replace("abc", "-").unwrap(), "-a-b-c-");
    }

    #[test]
    fn test_quote() {
        let _ = env_logger::try_init();

        let e = PcreEngine;
        let literal = "1.5 * (2+2) = $6?";

        let re = e.compile(&e.quote(literal), 0).unwrap();
        let m = re.search(literal).unwrap();
        assert_eq!((m.start(), m.end()), (0, literal.len()));
    }
}
