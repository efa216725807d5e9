//! IRC case-mapping functions.
//!
//! Nicks and channel names compare case-insensitively under the `rfc1459`
//! mapping, where `[]\~` are the upper-case forms of `{}|^`. Owner checks
//! and log context names both go through here.

#[inline]
fn fold(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(fold).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().map(fold).eq(b.chars().map(fold))
}

/// Whether `target` names a channel rather than a nick.
pub fn is_channel_name(target: &str) -> bool {
    matches!(target.chars().next(), Some('#' | '&' | '+' | '!'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irc_to_lower() {
        assert_eq!(irc_to_lower("Alice[AWAY]"), "alice{away}");
        assert_eq!(irc_to_lower("a\\b~c"), "a|b^c");
    }

    #[test]
    fn test_irc_eq() {
        assert!(irc_eq("Alice", "alice"));
        assert!(irc_eq("nick[m]", "NICK{M}"));
        assert!(!irc_eq("alice", "alicia"));
        assert!(!irc_eq("bob", "bobby"));
    }

    #[test]
    fn test_is_channel_name() {
        assert!(is_channel_name("#rust"));
        assert!(is_channel_name("&local"));
        assert!(!is_channel_name("logbot"));
        assert!(!is_channel_name(""));
    }
}
