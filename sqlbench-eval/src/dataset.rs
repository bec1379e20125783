//! Evaluation cases and dataset loading.
//!
//! A [`CaseSet`] is the fixed benchmark a harness drives agents through. It
//! is built once, validated on construction and never mutated afterwards;
//! clones share the same backing storage.

use crate::reward::DEFAULT_OPTIMAL_ACTIONS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

/// Errors that can occur when loading datasets.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    /// Failed to read dataset file
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse dataset
    #[error("Failed to parse dataset: {0}")]
    Parse(String),

    /// A case is missing a field or has an out-of-range budget
    #[error("Invalid case at index {index}: {reason}")]
    InvalidCase { index: usize, reason: String },

    /// The dataset has no cases
    #[error("Dataset contains no cases")]
    Empty,
}

/// A single evaluation case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalCase {
    /// The question given to the agent
    pub question: String,

    /// Ground-truth answer, compared case- and whitespace-insensitively
    #[serde(alias = "answer")]
    pub expected_answer: String,

    /// Actions a maximally efficient agent needs
    #[serde(default = "default_optimal_actions")]
    pub optimal_actions: u32,
}

fn default_optimal_actions() -> u32 {
    DEFAULT_OPTIMAL_ACTIONS
}

impl EvalCase {
    pub fn new(
        question: impl Into<String>,
        expected_answer: impl Into<String>,
        optimal_actions: u32,
    ) -> Self {
        Self {
            question: question.into(),
            expected_answer: expected_answer.into(),
            optimal_actions,
        }
    }

    fn validate(&self, index: usize) -> Result<(), DatasetError> {
        let invalid = |reason: &str| DatasetError::InvalidCase {
            index,
            reason: reason.to_string(),
        };

        if self.question.trim().is_empty() {
            return Err(invalid("question is empty"));
        }
        if self.expected_answer.trim().is_empty() {
            return Err(invalid("expected answer is empty"));
        }
        if self.optimal_actions == 0 {
            return Err(invalid("optimal_actions must be at least 1"));
        }
        Ok(())
    }
}

/// An immutable, ordered set of evaluation cases.
///
/// # Example
///
/// ```
/// use sqlbench_eval::CaseSet;
///
/// let cases = CaseSet::employees();
/// assert_eq!(cases.len(), 10);
/// assert!(cases.iter().all(|case| case.optimal_actions == 4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSet {
    cases: Arc<[EvalCase]>,
}

impl CaseSet {
    /// Build a case set, validating every case.
    pub fn new(cases: Vec<EvalCase>) -> Result<Self, DatasetError> {
        if cases.is_empty() {
            return Err(DatasetError::Empty);
        }
        for (index, case) in cases.iter().enumerate() {
            case.validate(index)?;
        }
        Ok(Self {
            cases: cases.into(),
        })
    }

    /// The built-in employees benchmark.
    ///
    /// Ten questions over an employees database, each with a budget of four
    /// actions.
    pub fn employees() -> Self {
        let cases: Vec<EvalCase> = EMPLOYEES
            .iter()
            .map(|&(question, answer)| EvalCase::new(question, answer, EMPLOYEES_OPTIMAL_ACTIONS))
            .collect();
        Self {
            cases: cases.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EvalCase> {
        self.cases.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvalCase> {
        self.cases.iter()
    }

    pub fn as_slice(&self) -> &[EvalCase] {
        &self.cases
    }

    /// Find a case by its exact question text.
    pub fn find_by_question(&self, question: &str) -> Option<&EvalCase> {
        self.cases.iter().find(|case| case.question == question)
    }

    /// The first `size` cases, or the whole set if `size` is `None` or at
    /// least the set length. Never empty: a size of zero keeps one case.
    #[must_use]
    pub fn truncated(&self, size: Option<usize>) -> Self {
        match size {
            Some(size) if size < self.cases.len() => Self {
                cases: self.cases[..size.max(1)].into(),
            },
            _ => self.clone(),
        }
    }
}

impl<'a> IntoIterator for &'a CaseSet {
    type Item = &'a EvalCase;
    type IntoIter = std::slice::Iter<'a, EvalCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

const EMPLOYEES_OPTIMAL_ACTIONS: u32 = 4;

const EMPLOYEES: [(&str, &str); 10] = [
    (
        "Who is the most paid employee? Return only the name of the emploeyee.",
        "Arno Kumaresan",
    ),
    (
        "Which department has the highest number of employees? \
         Return only the name of the department.",
        "Development",
    ),
    (
        "Which department has the highest average salary? Return only the name of the department.",
        "Sales",
    ),
    (
        "Who is the longest serving employee? Return only the full name.",
        "Manton Leuchs",
    ),
    (
        "How many employees are currently working as Engineers (any type of Engineer)? \
         Return only the number.",
        "401",
    ),
    (
        "Who is the current manager of the Development department? Return only the full name.",
        "Dietrich Journel",
    ),
    (
        "How many employees were born in 1960? Return only the number.",
        "67",
    ),
    (
        "What is the minimum salary in the company? Return only the number.",
        "39265",
    ),
    (
        "How many female employees are there in the company? Return only the number.",
        "390",
    ),
    (
        "Who was the most recently hired employee? Return only the full name.",
        "Aimee Tokunaga",
    ),
];

/// Trait for evaluation datasets.
///
/// Implement this trait to add support for custom datasets.
///
/// # Example
///
/// ```text
/// struct MyDataset {
///     path: PathBuf,
/// }
///
/// impl Dataset for MyDataset {
///     fn name(&self) -> &str {
///         "my_dataset"
///     }
///
///     async fn load(&self, sample_size: Option<usize>) -> Result<CaseSet, DatasetError> {
///         // Load cases from self.path
///         // ...
///     }
/// }
/// ```
pub trait Dataset: Send + Sync {
    /// The name of this dataset (used in reports).
    fn name(&self) -> &str;

    /// Load the cases.
    ///
    /// If `sample_size` is specified, return at most that many cases, taken
    /// from the front.
    fn load(
        &self,
        sample_size: Option<usize>,
    ) -> impl std::future::Future<Output = Result<CaseSet, DatasetError>> + Send;
}

/// The built-in employees benchmark as a [`Dataset`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeesBenchmark;

impl Dataset for EmployeesBenchmark {
    fn name(&self) -> &str {
        "employees"
    }

    async fn load(&self, sample_size: Option<usize>) -> Result<CaseSet, DatasetError> {
        Ok(CaseSet::employees().truncated(sample_size))
    }
}

/// One case as written in a JSON case file, before a default budget is applied.
#[derive(Debug, Deserialize)]
struct CaseRecord {
    question: String,
    #[serde(alias = "answer")]
    expected_answer: String,
    optimal_actions: Option<u32>,
}

impl CaseSet {
    /// Parse a JSON array of cases, giving budget-less cases
    /// `default_optimal_actions`.
    ///
    /// ```
    /// use sqlbench_eval::CaseSet;
    ///
    /// let cases = CaseSet::from_json(r#"[{"question": "Q?", "answer": "A"}]"#, 6).unwrap();
    /// assert_eq!(cases.get(0).unwrap().optimal_actions, 6);
    /// ```
    pub fn from_json(content: &str, default_optimal_actions: u32) -> Result<Self, DatasetError> {
        let records: Vec<CaseRecord> =
            serde_json::from_str(content).map_err(|e| DatasetError::Parse(e.to_string()))?;

        let cases = records
            .into_iter()
            .map(|record| {
                EvalCase::new(
                    record.question,
                    record.expected_answer,
                    record.optimal_actions.unwrap_or(default_optimal_actions),
                )
            })
            .collect();
        Self::new(cases)
    }
}

/// Custom JSON file dataset.
///
/// Expects a JSON array of objects with `question`, `expected_answer` (or
/// `answer`) and optionally `optimal_actions` fields. A missing budget
/// defaults to [`DEFAULT_OPTIMAL_ACTIONS`] unless
/// [`with_default_optimal_actions`](Self::with_default_optimal_actions)
/// sets another.
///
/// # Example JSON format
///
/// ```json
/// [
///   {
///     "question": "Who is the most paid employee?",
///     "answer": "Arno Kumaresan",
///     "optimal_actions": 4
///   },
///   {"question": "How many female employees are there?", "expected_answer": "390"}
/// ]
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileDataset {
    path: PathBuf,
    name: String,
    default_optimal_actions: u32,
}

impl JsonFileDataset {
    /// Create a dataset from a JSON file, named after the file stem.
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("json_dataset")
            .to_string();

        Self::with_name(path, name)
    }

    /// Create a dataset with a custom name.
    pub fn with_name(path: PathBuf, name: impl Into<String>) -> Self {
        Self {
            path,
            name: name.into(),
            default_optimal_actions: DEFAULT_OPTIMAL_ACTIONS,
        }
    }

    /// Budget for cases that do not set `optimal_actions`.
    #[must_use]
    pub fn with_default_optimal_actions(mut self, optimal_actions: u32) -> Self {
        self.default_optimal_actions = optimal_actions;
        self
    }
}

impl Dataset for JsonFileDataset {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self, sample_size: Option<usize>) -> Result<CaseSet, DatasetError> {
        let content = fs::read_to_string(&self.path).await?;
        let cases = CaseSet::from_json(&content, self.default_optimal_actions)?;
        Ok(cases.truncated(sample_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn json_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_employees_benchmark_integrity() {
        let cases = CaseSet::employees();

        assert_eq!(cases.len(), 10);
        for case in &cases {
            assert!(!case.question.trim().is_empty());
            assert!(!case.expected_answer.trim().is_empty());
            assert_eq!(case.optimal_actions, 4);
        }
        assert_eq!(CaseSet::new(cases.as_slice().to_vec()).unwrap(), cases);
    }

    #[test]
    fn test_employees_order_and_lookup() {
        let cases = CaseSet::employees();

        assert_eq!(cases.get(0).unwrap().expected_answer, "Arno Kumaresan");
        assert_eq!(cases.get(9).unwrap().expected_answer, "Aimee Tokunaga");
        assert!(cases.get(10).is_none());

        let case = cases
            .find_by_question("How many employees were born in 1960? Return only the number.")
            .unwrap();
        assert_eq!(case.expected_answer, "67");
        assert!(cases.find_by_question("Who are you?").is_none());
    }

    #[rstest]
    #[case::none(None, 10)]
    #[case::some(Some(3), 3)]
    #[case::larger(Some(50), 10)]
    #[case::zero(Some(0), 1)]
    fn test_truncated(#[case] size: Option<usize>, #[case] expected: usize) {
        assert_eq!(CaseSet::employees().truncated(size).len(), expected);
    }

    #[test]
    fn test_case_set_rejects_invalid_cases() {
        assert!(matches!(CaseSet::new(vec![]), Err(DatasetError::Empty)));

        let err = CaseSet::new(vec![
            EvalCase::new("Q1?", "A1", 4),
            EvalCase::new("Q2?", "  ", 4),
        ])
        .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidCase { index: 1, .. }));

        let err = CaseSet::new(vec![EvalCase::new("", "A", 4)]).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidCase { index: 0, .. }));

        let err = CaseSet::new(vec![EvalCase::new("Q?", "A", 0)]).unwrap_err();
        assert!(err.to_string().contains("optimal_actions"));
    }

    #[tokio::test]
    async fn test_employees_dataset() {
        let dataset = EmployeesBenchmark;
        assert_eq!(dataset.name(), "employees");
        assert_eq!(dataset.load(None).await.unwrap().len(), 10);
        assert_eq!(dataset.load(Some(2)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_json_file_dataset() {
        let file = json_file(
            r#"[
                {"question": "Q1?", "expected_answer": "A1", "optimal_actions": 3},
                {"question": "Q2?", "answer": "A2"}
            ]"#,
        );

        let dataset = JsonFileDataset::new(file.path().to_path_buf());
        let cases = dataset.load(None).await.unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases.get(0).unwrap().optimal_actions, 3);
        assert_eq!(cases.get(1).unwrap().expected_answer, "A2");
        assert_eq!(cases.get(1).unwrap().optimal_actions, DEFAULT_OPTIMAL_ACTIONS);
    }

    #[tokio::test]
    async fn test_json_file_dataset_default_budget() {
        let file = json_file(
            r#"[
                {"question": "Q1?", "answer": "A1", "optimal_actions": 3},
                {"question": "Q2?", "answer": "A2"}
            ]"#,
        );

        let dataset =
            JsonFileDataset::new(file.path().to_path_buf()).with_default_optimal_actions(6);
        let cases = dataset.load(None).await.unwrap();

        assert_eq!(cases.get(0).unwrap().optimal_actions, 3);
        assert_eq!(cases.get(1).unwrap().optimal_actions, 6);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            CaseSet::from_json("{}", 4),
            Err(DatasetError::Parse(_))
        ));
        assert!(matches!(
            CaseSet::from_json(r#"[{"question": "Q?", "answer": "A"}]"#, 0),
            Err(DatasetError::InvalidCase { index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_json_file_dataset_sample_size() {
        let file = json_file(
            r#"[
                {"question": "Q1?", "answer": "A1"},
                {"question": "Q2?", "answer": "A2"},
                {"question": "Q3?", "answer": "A3"}
            ]"#,
        );

        let dataset = JsonFileDataset::new(file.path().to_path_buf());
        assert_eq!(dataset.load(Some(2)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_json_file_dataset_errors() {
        let missing = JsonFileDataset::new(PathBuf::from("/nonexistent/cases.json"));
        assert!(matches!(missing.load(None).await, Err(DatasetError::Io(_))));

        let file = json_file(r#"{"question": "not an array"}"#);
        let dataset = JsonFileDataset::new(file.path().to_path_buf());
        assert!(matches!(dataset.load(None).await, Err(DatasetError::Parse(_))));

        let file = json_file(r#"[{"question": "Q?", "answer": ""}]"#);
        let dataset = JsonFileDataset::new(file.path().to_path_buf());
        assert!(matches!(
            dataset.load(None).await,
            Err(DatasetError::InvalidCase { index: 0, .. })
        ));
    }

    #[test]
    fn test_json_file_dataset_name() {
        let dataset = JsonFileDataset::new(PathBuf::from("/path/to/hr_questions.json"));
        assert_eq!(dataset.name(), "hr_questions");

        let dataset = JsonFileDataset::with_name(PathBuf::from("/path/to/file.json"), "custom");
        assert_eq!(dataset.name(), "custom");
    }
}
