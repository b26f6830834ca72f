//! Container keys: integers or strings, with insertion order significant.

use core::fmt;

/// A key in a [`WeakArray`](crate::WeakArray).
///
/// Keys are either integers or strings; anything else is unrepresentable,
/// which is how this crate surfaces the "key must be absent, integer, or
/// string" contract. The "absent" case is a separate operation
/// ([`WeakArray::push`](crate::WeakArray::push)) rather than an `Option`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            Key::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Int(_) => None,
            Key::Str(s) => Some(s),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::Str(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Key;

    #[test]
    fn conversions_and_accessors() {
        assert_eq!(Key::from(3), Key::Int(3));
        assert_eq!(Key::from(3i64), Key::Int(3));
        assert_eq!(Key::from("a"), Key::Str("a".to_owned()));
        assert_eq!(Key::from("a".to_owned()), Key::Str("a".to_owned()));

        assert_eq!(Key::Int(7).as_int(), Some(7));
        assert_eq!(Key::Int(7).as_str(), None);
        assert_eq!(Key::Str("x".into()).as_str(), Some("x"));
        assert_eq!(Key::Str("x".into()).as_int(), None);
    }

    #[test]
    fn display_matches_inner_value() {
        assert_eq!(Key::from(-5).to_string(), "-5");
        assert_eq!(Key::from("foo").to_string(), "foo");
    }

    #[test]
    fn int_and_str_keys_are_distinct() {
        // "1" the string and 1 the integer are different keys.
        assert_ne!(Key::from(1), Key::from("1"));
    }
}
