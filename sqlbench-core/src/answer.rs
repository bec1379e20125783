//! Final answers produced by agents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An agent's final answer.
///
/// Agents may answer with text or with a bare number. Scoring compares the
/// canonical text form given by [`Display`](fmt::Display):
///
/// - text is used verbatim
/// - integers are rendered in decimal (`401`)
/// - floats use the shortest representation that round-trips and always
///   carry a fractional part (`401.0`, `0.5`); non-finite values render as
///   `nan`, `inf` and `-inf`
///
/// No decimal trimming happens beyond that, so `Answer::Float(401.0)` does
/// not compare equal to the text `"401"`.
///
/// # Example
///
/// ```
/// use sqlbench_core::Answer;
///
/// assert_eq!(Answer::from("Sales").to_string(), "Sales");
/// assert_eq!(Answer::from(67).to_string(), "67");
/// assert_eq!(Answer::from(39265.0).to_string(), "39265.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// An integer answer
    Integer(i64),
    /// A floating-point answer
    Float(f64),
    /// A textual answer
    Text(String),
}

impl Answer {
    /// Whether the answer was given as text.
    pub fn is_text(&self) -> bool {
        matches!(self, Answer::Text(_))
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Text(text) => f.write_str(text),
            Answer::Integer(value) => write!(f, "{}", value),
            Answer::Float(value) if value.is_nan() => f.write_str("nan"),
            Answer::Float(value) if value.is_infinite() => {
                f.write_str(if *value > 0.0 { "inf" } else { "-inf" })
            }
            // Debug formatting keeps the trailing ".0" on integral values
            Answer::Float(value) => write!(f, "{:?}", value),
        }
    }
}

impl From<&str> for Answer {
    fn from(text: &str) -> Self {
        Answer::Text(text.to_string())
    }
}

impl From<String> for Answer {
    fn from(text: String) -> Self {
        Answer::Text(text)
    }
}

impl From<&String> for Answer {
    fn from(text: &String) -> Self {
        Answer::Text(text.clone())
    }
}

impl From<i64> for Answer {
    fn from(value: i64) -> Self {
        Answer::Integer(value)
    }
}

impl From<i32> for Answer {
    fn from(value: i32) -> Self {
        Answer::Integer(value.into())
    }
}

impl From<u32> for Answer {
    fn from(value: u32) -> Self {
        Answer::Integer(value.into())
    }
}

impl From<f64> for Answer {
    fn from(value: f64) -> Self {
        Answer::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::text(Answer::from("Arno Kumaresan"), "Arno Kumaresan")]
    #[case::text_untouched(Answer::from("  Sales "), "  Sales ")]
    #[case::integer(Answer::from(401), "401")]
    #[case::negative(Answer::from(-3_i64), "-3")]
    #[case::unsigned(Answer::from(67_u32), "67")]
    #[case::integral_float(Answer::from(401.0), "401.0")]
    #[case::fraction(Answer::from(0.5), "0.5")]
    #[case::nan(Answer::from(f64::NAN), "nan")]
    #[case::inf(Answer::from(f64::INFINITY), "inf")]
    #[case::neg_inf(Answer::from(f64::NEG_INFINITY), "-inf")]
    fn test_display(#[case] answer: Answer, #[case] expected: &str) {
        assert_eq!(answer.to_string(), expected);
    }

    #[test]
    fn test_deserialize_untagged() {
        let answers: Vec<Answer> = serde_json::from_str(r#"["Sales", 390, 39265.5]"#).unwrap();
        assert_eq!(answers[0], Answer::Text("Sales".into()));
        assert_eq!(answers[1], Answer::Integer(390));
        assert_eq!(answers[2], Answer::Float(39265.5));
    }

    #[test]
    fn test_is_text() {
        assert!(Answer::from("x").is_text());
        assert!(!Answer::from(1).is_text());
    }
}
