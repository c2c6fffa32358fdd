//! Java-style replacement-template expansion.

use crate::{Error, Matcher, Result};

/// Expands `template` against the current match of `m`, appending to `out`.
///
/// `\X` emits the literal character `X`. `$` introduces a group reference:
/// digits are taken greedily one at a time, but taking another digit stops as
/// soon as the accumulated index would exceed the pattern's highest group
/// index. At least one digit must be taken, otherwise the template is
/// malformed. A non-participating group substitutes the empty string.
pub(crate) fn expand(template: &str, m: &dyn Matcher<'_>, out: &mut String) -> Result<()> {
    let max_group = m.groups() - 1;
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => out.push(escaped),
                None => {
                    return Err(Error::MalformedTemplate(format!(
                        "dangling backslash at byte {}",
                        pos
                    )))
                }
            },
            '$' => {
                let mut group = None;
                while let Some(&(_, d)) = chars.peek() {
                    let digit = match d.to_digit(10) {
                        Some(digit) => digit as usize,
                        None => break,
                    };
                    let widened = group.unwrap_or(0) * 10 + digit;
                    if widened > max_group {
                        break;
                    }
                    group = Some(widened);
                    chars.next();
                }
                match group {
                    Some(idx) => out.push_str(m.group(idx)),
                    None => {
                        return Err(Error::MalformedTemplate(format!(
                            "expected group index after `$` at byte {}",
                            pos
                        )))
                    }
                }
            }
            _ => out.push(c),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A fixed match: group texts with explicit participation flags.
    struct StubMatch(Vec<Option<&'static str>>);

    impl Matcher<'static> for StubMatch {
        fn groups(&self) -> usize {
            self.0.len()
        }

        fn group(&self, idx: usize) -> &'static str {
            self.0[idx].unwrap_or("")
        }

        fn group_present(&self, idx: usize) -> bool {
            self.0[idx].is_some()
        }

        fn group_by_name(&self, _name: &str) -> &'static str {
            ""
        }

        fn group_present_by_name(&self, _name: &str) -> bool {
            false
        }

        fn start(&self) -> usize {
            0
        }

        fn end(&self) -> usize {
            self.group(0).len()
        }

        fn next(&mut self) -> bool {
            false
        }
    }

    fn expanded(template: &str, m: &StubMatch) -> Result<String> {
        let mut out = String::new();
        expand(template, m, &mut out).map(|_| out)
    }

    #[test]
    fn test_literal_and_escape() {
        let m = StubMatch(vec![Some("abc")]);

        assert_eq!(expanded("plain text", &m).unwrap(), "plain text");
        assert_eq!(expanded(r"a\$b\\c", &m).unwrap(), "a$b\\c");
        assert_eq!(expanded(r"\0", &m).unwrap(), "0");
    }

    #[test]
    fn test_group_references() {
        let m = StubMatch(vec![Some("2023-01-02"), Some("2023"), Some("01"), Some("02")]);

        assert_eq!(expanded("$0", &m).unwrap(), "2023-01-02");
        assert_eq!(expanded("$3/$2/$1", &m).unwrap(), "02/01/2023");
        assert_eq!(expanded("y=$1.", &m).unwrap(), "y=2023.");
    }

    #[test]
    fn test_absent_group_is_empty() {
        let m = StubMatch(vec![Some("ac"), None]);

        assert_eq!(expanded("[$1]", &m).unwrap(), "[]");
    }

    #[test]
    fn test_digit_consumption_bounded_by_group_count() {
        // highest index is 3, so `$12` is group 1 followed by a literal 2
        let m = StubMatch(vec![Some("abc"), Some("a"), Some("b"), Some("c")]);

        assert_eq!(expanded("$12", &m).unwrap(), "a2");
        assert_eq!(expanded("$33", &m).unwrap(), "c3");
    }

    #[test]
    fn test_malformed_templates() {
        let m = StubMatch(vec![Some("abc"), Some("a")]);

        assert!(matches!(
            expanded("abc\\", &m),
            Err(Error::MalformedTemplate(_))
        ));
        assert!(matches!(
            expanded("price: $", &m),
            Err(Error::MalformedTemplate(_))
        ));
        // the first digit is already out of range, so no digit is consumed
        assert!(matches!(
            expanded("$9", &m),
            Err(Error::MalformedTemplate(_))
        ));
    }
}
