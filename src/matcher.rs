use crate::{template, Result};

/// A regex backend: compiles patterns and translates flags.
///
/// Engines are stateless and immutable; a single instance can serve
/// concurrent callers. Flag bit values are backend-specific, so callers
/// compose them through the `flag_*` accessors rather than hard-coding
/// constants.
pub trait Engine {
    /// Compiles `pattern` into a regexp, with `flags` composed from this
    /// engine's `flag_*` accessors.
    ///
    /// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern)
    /// carrying the backend diagnostic when the pattern does not compile, and
    /// [`Error::UnsupportedFlags`](crate::Error::UnsupportedFlags) when
    /// `flags` contains bits this backend does not define.
    fn compile(&self, pattern: &str, flags: u32) -> Result<Box<dyn Regexp>>;

    /// Returns `literal` with every regex metacharacter escaped, so the
    /// result matches `literal` verbatim when compiled.
    fn quote(&self, literal: &str) -> String;

    /// The backend's flag bit for case-insensitive matching.
    fn flag_caseless(&self) -> u32;

    /// The backend's flag bit for "`.` matches newline" semantics.
    fn flag_dot_all(&self) -> u32;

    /// The backend's flag bit for multi-line anchoring.
    fn flag_multi_line(&self) -> u32;
}

/// An immutable compiled pattern.
///
/// Safe for concurrent read-only use; every [`search`](Regexp::search)
/// produces an independent cursor.
pub trait Regexp {
    /// Attempts the first match anywhere in `subject`.
    ///
    /// Returns `None` when there is no match; "no match" is a normal
    /// outcome, not an error.
    fn search<'t>(&self, subject: &'t str) -> Option<Box<dyn Matcher<'t> + 't>>;

    /// Global search-and-replace with a Java-style replacement template.
    ///
    /// The template is processed left to right: `\X` produces the literal
    /// character `X`, and `$N` substitutes the text of capture group `N`
    /// (empty if the group did not participate). Digits after `$` are
    /// consumed greedily one at a time, stopping as soon as the accumulated
    /// index would exceed the pattern's highest group index, so `$12` with
    /// three groups resolves as group 1 followed by a literal `2`. Any other
    /// character is copied verbatim.
    ///
    /// Returns [`Error::MalformedTemplate`](crate::Error::MalformedTemplate)
    /// for a trailing backslash or a `$` with no usable digit.
    ///
    /// Not performance-critical; intended for test-harness use.
    fn replace(&self, subject: &str, template: &str) -> Result<String> {
        let mut cursor = match self.search(subject) {
            Some(cursor) => cursor,
            None => return Ok(subject.to_owned()),
        };

        let mut out = String::with_capacity(subject.len());
        let mut last = 0;
        loop {
            out.push_str(&subject[last..cursor.start()]);
            template::expand(template, &*cursor, &mut out)?;
            last = cursor.end();
            if !cursor.next() {
                break;
            }
        }
        out.push_str(&subject[last..]);

        Ok(out)
    }
}

/// A stateful cursor over successive non-overlapping matches in a subject.
///
/// A matcher always holds a current match. Advancing with
/// [`next`](Matcher::next) mutates the cursor, so it must not be shared
/// across concurrent callers without external synchronization.
///
/// The lifetime parameter `'t` refers to the lifetime of the subject text.
pub trait Matcher<'t> {
    /// Total capture-group count defined by the pattern, including group 0
    /// (the whole match). Constant across the life of the cursor.
    fn groups(&self) -> usize;

    /// Text of group `idx` in the current match, or `""` if the group is
    /// defined but did not participate.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= groups()`; an out-of-range index is a caller bug,
    /// not an absent group.
    fn group(&self, idx: usize) -> &'t str;

    /// Whether group `idx` participated in the current match. Distinguishes
    /// a group that matched empty text from one that did not match at all.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= groups()`.
    fn group_present(&self, idx: usize) -> bool;

    /// Text of the named group, or `""` if the name is unknown or the group
    /// did not participate.
    fn group_by_name(&self, name: &str) -> &'t str;

    /// Whether `name` resolves to a participating group.
    fn group_present_by_name(&self, name: &str) -> bool;

    /// Starting byte offset of the current match in the subject.
    fn start(&self) -> usize;

    /// Ending byte offset (exclusive) of the current match in the subject.
    fn end(&self) -> usize;

    /// Advances to the next match strictly after the end of the current one.
    ///
    /// A zero-length current match additionally steps one character forward
    /// before re-matching, so patterns that match the empty string cannot
    /// loop forever.
    ///
    /// Returns `false` when no further match exists; the cursor is then
    /// terminal and every subsequent call keeps returning `false`. The
    /// current match is left untouched by a failed advance.
    fn next(&mut self) -> bool;
}
