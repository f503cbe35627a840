use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub kind: QuestionKind,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Single,
    Multiple,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Question {
    /// Builds a question, keeping `kind == Open` exactly when there are no choices.
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        multi: bool,
        choices: Vec<Choice>,
    ) -> Self {
        let kind = match (choices.is_empty(), multi) {
            (true, _) => QuestionKind::Open,
            (false, true) => QuestionKind::Multiple,
            (false, false) => QuestionKind::Single,
        };
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind,
            choices,
        }
    }

    pub fn is_open(&self) -> bool {
        self.kind == QuestionKind::Open
    }
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}
