//! Backend over the `regex` crate (RE2-style, linear-time matching).

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;

use bitflags::bitflags;
use log::debug;
use regex::{Captures, Regex, RegexBuilder};

use crate::{Engine, Error, Matcher, Regexp, Result};

bitflags! {
    /// Pattern flags for the `regex` backend.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u32 {
        /// Set case-insensitive matching.
        const CASELESS = 1 << 0;
        /// Matching a `.` will not exclude newlines.
        const DOTALL = 1 << 1;
        /// Set multi-line anchoring.
        const MULTILINE = 1 << 2;
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

/// A matcher engine backed by the `regex` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Re2Engine;

impl Engine for Re2Engine {
    fn compile(&self, pattern: &str, flags: u32) -> Result<Box<dyn Regexp>> {
        let flags =
            Flags::from_bits(flags).ok_or(Error::UnsupportedFlags(flags & !Flags::all().bits()))?;

        let re = RegexBuilder::new(pattern)
            .case_insensitive(flags.contains(Flags::CASELESS))
            .dot_matches_new_line(flags.contains(Flags::DOTALL))
            .multi_line(flags.contains(Flags::MULTILINE))
            .build()
            .map_err(|err| Error::InvalidPattern(err.to_string()))?;

        let names = re
            .capture_names()
            .enumerate()
            .filter_map(|(idx, name)| name.map(|name| (name.to_owned(), idx)))
            .collect();

        debug!("pattern `/{}/{}` compiled for the re2 backend", pattern, flags);

        Ok(Box::new(Re2Regexp {
            re,
            names: Arc::new(names),
        }))
    }

    fn quote(&self, literal: &str) -> String {
        regex::escape(literal)
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

struct Re2Regexp {
    re: Regex,
    names: Arc<HashMap<String, usize>>,
}

/// Absolute byte ranges of every capture group, `None` for non-participating
/// groups. `base` is the offset of the searched suffix within the subject.
fn capture_slots(caps: &Captures<'_>, groups: usize, base: usize) -> Vec<Option<Range<usize>>> {
    (0..groups)
        .map(|idx| caps.get(idx).map(|m| base + m.start()..base + m.end()))
        .collect()
}

impl Regexp for Re2Regexp {
    fn search<'t>(&self, subject: &'t str) -> Option<Box<dyn Matcher<'t> + 't>> {
        let caps = self.re.captures(subject)?;
        let whole = caps.get(0)?;
        let groups = caps.len();

        Some(Box::new(Re2Matcher {
            re: self.re.clone(),
            names: self.names.clone(),
            subject,
            at: whole.start()..whole.end(),
            slots: capture_slots(&caps, groups, 0),
            done: false,
        }))
    }
}

struct Re2Matcher<'t> {
    re: Regex,
    names: Arc<HashMap<String, usize>>,
    subject: &'t str,
    /// Whole-match range of the current match, in subject offsets.
    at: Range<usize>,
    slots: Vec<Option<Range<usize>>>,
    done: bool,
}

impl<'t> Matcher<'t> for Re2Matcher<'t> {
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

        let found = self.re.captures(&self.subject[resume..]).and_then(|caps| {
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
