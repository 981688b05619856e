//! Positional arguments for message templates

use super::template::SegmentStyle;
use std::borrow::Cow;
use std::fmt;

/// A value filling one `{}` placeholder.
///
/// The kind is fixed when the argument is built, which decides how the
/// console styles it: integers are emphasized, everything else is shown
/// as a plain value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogArg {
    Integer(i128),
    Text(String),
    Other(String),
    Null,
}

impl LogArg {
    /// Any printable value that is neither an integer nor text
    pub fn display(value: impl fmt::Display) -> Self {
        LogArg::Other(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LogArg::Null)
    }

    pub fn style(&self) -> SegmentStyle {
        match self {
            LogArg::Integer(_) => SegmentStyle::Emphasis,
            _ => SegmentStyle::Value,
        }
    }

    /// Textual form, `None` for [`LogArg::Null`]
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            LogArg::Integer(n) => Some(Cow::Owned(n.to_string())),
            LogArg::Text(s) | LogArg::Other(s) => Some(Cow::Borrowed(s)),
            LogArg::Null => None,
        }
    }
}

macro_rules! integer_args {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LogArg {
                fn from(value: $t) -> Self {
                    LogArg::Integer(value as i128)
                }
            }
        )*
    };
}

macro_rules! other_args {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LogArg {
                fn from(value: $t) -> Self {
                    LogArg::Other(value.to_string())
                }
            }
        )*
    };
}

integer_args!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);
other_args!(f32, f64, bool, char);

impl From<&str> for LogArg {
    fn from(value: &str) -> Self {
        LogArg::Text(value.to_string())
    }
}

impl From<String> for LogArg {
    fn from(value: String) -> Self {
        LogArg::Text(value)
    }
}

impl From<&String> for LogArg {
    fn from(value: &String) -> Self {
        LogArg::Text(value.clone())
    }
}

impl From<Cow<'_, str>> for LogArg {
    fn from(value: Cow<'_, str>) -> Self {
        LogArg::Text(value.into_owned())
    }
}

impl<T: Into<LogArg>> From<Option<T>> for LogArg {
    fn from(value: Option<T>) -> Self {
        value.map_or(LogArg::Null, Into::into)
    }
}

impl fmt::Display for LogArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}
