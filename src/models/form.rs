use crate::models::question::{Question, QuestionKind};
use serde::{Deserialize, Serialize};

/// Rendered input state of an open attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptForm {
    pub blocks: Vec<QuestionBlock>,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlock {
    pub question_id: String,
    pub prompt: String,
    pub control: Control,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "inputs", rename_all = "snake_case")]
pub enum Control {
    Checkboxes(Vec<OptionInput>),
    Radios(Vec<OptionInput>),
    Text(String),
    /// A block whose inputs failed to render.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionInput {
    pub value: String,
    pub label: String,
    pub checked: bool,
}

impl AttemptForm {
    pub fn render(questions: &[Question]) -> Self {
        let blocks = questions
            .iter()
            .map(|q| {
                let options = || {
                    q.choices
                        .iter()
                        .map(|c| OptionInput {
                            value: c.value.clone(),
                            label: c.label.clone(),
                            checked: false,
                        })
                        .collect::<Vec<_>>()
                };
                let control = match q.kind {
                    QuestionKind::Multiple => Control::Checkboxes(options()),
                    QuestionKind::Single => Control::Radios(options()),
                    QuestionKind::Open => Control::Text(String::new()),
                };
                QuestionBlock {
                    question_id: q.id.clone(),
                    prompt: q.prompt.clone(),
                    control,
                }
            })
            .collect();

        Self {
            blocks,
            locked: false,
        }
    }

    pub fn block(&self, question_id: &str) -> Option<&QuestionBlock> {
        self.blocks.iter().find(|b| b.question_id == question_id)
    }

    fn block_mut(&mut self, question_id: &str) -> Option<&mut QuestionBlock> {
        if self.locked {
            return None;
        }
        self.blocks.iter_mut().find(|b| b.question_id == question_id)
    }

    /// Checks `value`. Radios uncheck their siblings; checkboxes keep them.
    pub fn select(&mut self, question_id: &str, value: &str) -> bool {
        let Some(block) = self.block_mut(question_id) else {
            return false;
        };
        match &mut block.control {
            Control::Radios(options) => {
                if !options.iter().any(|o| o.value == value) {
                    return false;
                }
                for option in options.iter_mut() {
                    option.checked = option.value == value;
                }
                true
            }
            Control::Checkboxes(options) => match options.iter_mut().find(|o| o.value == value) {
                Some(option) => {
                    option.checked = true;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Flips a checkbox.
    pub fn toggle(&mut self, question_id: &str, value: &str) -> bool {
        let Some(block) = self.block_mut(question_id) else {
            return false;
        };
        match &mut block.control {
            Control::Checkboxes(options) => match options.iter_mut().find(|o| o.value == value) {
                Some(option) => {
                    option.checked = !option.checked;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn set_text(&mut self, question_id: &str, text: &str) -> bool {
        let Some(block) = self.block_mut(question_id) else {
            return false;
        };
        match &mut block.control {
            Control::Text(current) => {
                *current = text.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }
}
