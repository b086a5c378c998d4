//! # Board Options
//!
//! Configuration values handed to a board when it is constructed.
//!
//! Options are flat `path=value` pairs where the path addresses a node of the
//! platform description, for example:
//! * `cluster/nb_pe=16`
//! * `soc/l2/size=0x100000`
//! * `cluster/neureka=false`
//!
//! Values are kept as text and only interpreted when a board asks for them,
//! so an option no board reads is carried along untouched.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::BoardError;

/// Ordered set of `path=value` configuration entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    entries: BTreeMap<String, String>,
}

/// A type an option value can be interpreted as.
pub trait OptionValue: Sized {
    fn parse_option(raw: &str) -> Result<Self, String>;
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds options from a list of `path=value` strings.
    ///
    /// Later entries override earlier ones for the same path.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::new();
        for pair in pairs {
            let (key, value) = parse_entry(pair.as_ref())?;
            options.entries.insert(key, value);
        }
        Ok(options)
    }

    /// Sets `key` to `value`, returning the previous value if any.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<Option<String>, BoardError> {
        let key = normalize_key(key).ok_or_else(|| BoardError::MalformedOption(key.to_string()))?;
        Ok(self.entries.insert(key, value.into()))
    }

    /// Builder flavour of [`Options::set`] for keys known to be well formed.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Result<Self, BoardError> {
        self.set(key, value)?;
        Ok(self)
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        let key = normalize_key(key)?;
        self.entries.get(&key).map(String::as_str)
    }

    /// Reads and interprets `key`. Missing keys yield `Ok(None)`.
    pub fn get<T: OptionValue>(&self, key: &str) -> Result<Option<T>, BoardError> {
        let Some(raw) = self.raw(key) else {
            return Ok(None);
        };

        T::parse_option(raw)
            .map(Some)
            .map_err(|reason| BoardError::InvalidOption {
                key: key.to_string(),
                value: raw.to_string(),
                reason,
            })
    }

    pub fn get_or<T: OptionValue>(&self, key: &str, default: T) -> Result<T, BoardError> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Splits a `path=value` entry.
pub fn parse_entry(s: &str) -> Result<(String, String), BoardError> {
    let Some((key, value)) = s.split_once('=') else {
        return Err(BoardError::MalformedOption(s.to_string()));
    };

    let key = normalize_key(key).ok_or_else(|| BoardError::MalformedOption(s.to_string()))?;
    Ok((key, value.trim().to_string()))
}

/// Trims whitespace and surrounding separators; rejects empty path segments.
fn normalize_key(key: &str) -> Option<String> {
    let key = key.trim().trim_matches('/');
    if key.is_empty() || key.split('/').any(|segment| segment.trim().is_empty()) {
        return None;
    }
    Some(key.split('/').map(str::trim).collect::<Vec<_>>().join("/"))
}

/// Parses decimal or `0x`-prefixed hexadecimal integers, `_` separators allowed.
fn parse_unsigned(raw: &str) -> Result<u64, String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    let parsed = match cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => cleaned.parse::<u64>(),
    };
    parsed.map_err(|e| e.to_string())
}

macro_rules! unsigned_option_value {
    ($($ty:ty),*) => {
        $(
            impl OptionValue for $ty {
                fn parse_option(raw: &str) -> Result<Self, String> {
                    let value = parse_unsigned(raw)?;
                    <$ty>::try_from(value).map_err(|_| format!("{value} does not fit in {}", stringify!($ty)))
                }
            }
        )*
    };
}

unsigned_option_value!(u8, u16, u32, u64, usize);

impl OptionValue for bool {
    fn parse_option(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(format!("'{other}' is not a boolean")),
        }
    }
}

impl OptionValue for String {
    fn parse_option(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
