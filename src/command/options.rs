//! Option storage and argv serialization.
//!
//! Options are kept in the order they were first set. Re-setting a key
//! replaces its value in place, so emission order always follows the first
//! assignment.

use std::fmt;

/// A single option value as understood by the configtxgen argv convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Bare `--name`, only emitted when true
    Flag(bool),
    /// `--name value`
    Scalar(String),
    /// `--name a,b,c`
    List(Vec<String>),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Flag(b) => write!(f, "{}", b),
            OptionValue::Scalar(s) => f.write_str(s),
            OptionValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Scalar(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Scalar(value.to_string())
    }
}

impl From<&String> for OptionValue {
    fn from(value: &String) -> Self {
        OptionValue::Scalar(value.clone())
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        OptionValue::List(value)
    }
}

impl From<&[&str]> for OptionValue {
    fn from(value: &[&str]) -> Self {
        OptionValue::List(value.iter().map(|s| s.to_string()).collect())
    }
}

macro_rules! scalar_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for OptionValue {
                fn from(value: $ty) -> Self {
                    OptionValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_number!(u16, u32, u64, usize, i32, i64, f64);

/// Insertion-ordered option map with unique keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionStore {
    entries: Vec<(String, OptionValue)>,
}

impl OptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, keeping the key's original position if it
    /// already exists. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Convert an option store to argv tokens
/// - Flag(true) -> --name
/// - Flag(false) -> (omitted)
/// - Scalar(s) -> --name s
/// - List(v) -> --name v1,v2,...
pub fn options_to_args(options: &OptionStore) -> Vec<String> {
    let mut args = Vec::with_capacity(options.len() * 2);
    for (key, value) in options.iter() {
        match value {
            OptionValue::Flag(true) => args.push(format!("--{}", key)),
            OptionValue::Flag(false) => {}
            OptionValue::Scalar(s) => {
                args.push(format!("--{}", key));
                args.push(s.clone());
            }
            OptionValue::List(items) => {
                args.push(format!("--{}", key));
                args.push(items.join(","));
            }
        }
    }
    args
}
