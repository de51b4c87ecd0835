use crate::time_format::format_time;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// One argument of a status line.
///
/// Plain values are joined as text, structured values are pretty-printed as JSON
/// in their original position.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Text(String),
    Object(Value),
}

impl Arg {
    pub fn as_object(&self) -> Option<&Value> {
        match self {
            Arg::Object(value) => Some(value),
            Arg::Text(_) => None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Text(text) => f.write_str(text),
            Arg::Object(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Arg {
    fn from(text: &str) -> Self {
        Arg::Text(text.to_owned())
    }
}

impl From<String> for Arg {
    fn from(text: String) -> Self {
        Arg::Text(text)
    }
}

impl From<&String> for Arg {
    fn from(text: &String) -> Self {
        Arg::Text(text.clone())
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Arg::Text(text),
            Value::Number(number) => Arg::Text(number.to_string()),
            Value::Bool(flag) => Arg::Text(flag.to_string()),
            other => Arg::Object(other),
        }
    }
}

macro_rules! text_arg_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Text(value.to_string())
                }
            }
        )*
    };
}

text_arg_from!(bool, i32, i64, u32, u64, usize, f32, f64);

/// Builds a `Vec<Arg>` from values of mixed types.
///
/// ```
/// use live_status::{args, Arg};
/// use serde_json::json;
///
/// let args = args!["Uploading", 3, json!({"file": "a.txt"})];
/// assert_eq!(args[1], Arg::Text("3".into()));
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::Arg>::new() };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}

/// Turns the arguments of a status and its elapsed time into one rendered string.
pub trait MessageFormatter: Send + Sync {
    fn format(&self, args: &[Arg], elapsed: Duration) -> String;
}

impl<F> MessageFormatter for F
where
    F: Fn(&[Arg], Duration) -> String + Send + Sync,
{
    fn format(&self, args: &[Arg], elapsed: Duration) -> String {
        self(args, elapsed)
    }
}

/// The formatter used when no custom one is configured.
#[derive(Debug, Clone)]
pub struct DefaultFormatter {
    separator: String,
}

impl DefaultFormatter {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self::new(" ")
    }
}

impl MessageFormatter for DefaultFormatter {
    fn format(&self, args: &[Arg], elapsed: Duration) -> String {
        format_message(args, elapsed, &self.separator)
    }
}

/// Joins `args` with `separator`, inserting `(<elapsed>)` once: before the first
/// structured argument, or after the last argument when there is none. An elapsed
/// time under one millisecond gets no annotation.
pub fn format_message(args: &[Arg], elapsed: Duration, separator: &str) -> String {
    let show_time = elapsed.as_millis() > 0;
    let mut added_time = false;
    let mut parts = Vec::with_capacity(args.len() + 1);

    for (i, arg) in args.iter().enumerate() {
        let is_last = i + 1 == args.len();
        if let Arg::Text(text) = arg {
            parts.push(text.clone());
        }
        if show_time && !added_time && (is_last || arg.as_object().is_some()) {
            parts.push(format!("({})", format_time(elapsed)));
            added_time = true;
        }
        if let Arg::Object(value) = arg {
            parts.push(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()));
        }
    }

    parts.join(separator)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    const FIFTY_NINE: Duration = Duration::from_secs(59);

    #[test]
    fn zero_elapsed_has_no_time() {
        assert_eq!(format_message(&args!["A", "B"], Duration::ZERO, " "), "A B");
        assert_eq!(
            format_message(&args!["A"], Duration::from_micros(900), " "),
            "A"
        );
    }

    #[test]
    fn time_goes_last_without_objects() {
        assert_eq!(
            format_message(&args!["TEST_MESSAGE"], FIFTY_NINE, " "),
            "TEST_MESSAGE (59 seconds)"
        );
    }

    #[test]
    fn time_goes_before_first_object() {
        assert_eq!(
            format_message(&args!["A", json!({"x": 1})], FIFTY_NINE, " "),
            "A (59 seconds) {\n  \"x\": 1\n}"
        );
        assert_eq!(
            format_message(
                &args!["A", json!({"a": true}), "B", json!([1])],
                FIFTY_NINE,
                " "
            ),
            "A (59 seconds) {\n  \"a\": true\n} B [\n  1\n]"
        );
    }

    #[test]
    fn objects_stay_in_place_without_time() {
        assert_eq!(
            format_message(&args!["Arg1", json!({"arg2": true}), "Arg3"], Duration::ZERO, " "),
            "Arg1 {\n  \"arg2\": true\n} Arg3"
        );
    }

    #[test]
    fn uses_separator() {
        let formatter = DefaultFormatter::new("::");
        assert_eq!(
            formatter.format(&args!["Arg1", "Arg2", "Arg3"], Duration::ZERO),
            "Arg1::Arg2::Arg3"
        );
    }

    #[test]
    fn scalar_json_values_are_text() {
        assert_eq!(Arg::from(json!("hi")), Arg::Text("hi".into()));
        assert_eq!(Arg::from(json!(2)), Arg::Text("2".into()));
        assert_eq!(Arg::from(json!(null)), Arg::Object(Value::Null));
        assert_eq!(args![1.5, false], vec![Arg::from("1.5"), Arg::from("false")]);
    }

    #[test]
    fn closures_are_formatters() {
        let formatter =
            |args: &[Arg], elapsed: Duration| format!("{}@{}", args.len(), elapsed.as_secs());
        assert_eq!(formatter.format(&args!["x"], FIFTY_NINE), "1@59");
    }
}
