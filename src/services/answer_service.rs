use crate::models::attempt::{AnswerMap, AnswerValue};
use crate::models::form::{AttemptForm, Control, OptionInput};
use crate::models::question::Question;

pub struct AnswerCollector;

impl AnswerCollector {
    /// Reads the form into an answer map holding every question of the attempt.
    /// Questions without a rendered block (or with no inputs) map to `Null`.
    pub fn collect(form: &AttemptForm, questions: &[Question]) -> AnswerMap {
        questions
            .iter()
            .map(|q| {
                let value = form
                    .block(&q.id)
                    .map(|block| read_control(&block.control))
                    .unwrap_or(AnswerValue::Null);
                (q.id.clone(), value)
            })
            .collect()
    }
}

fn checked_values(options: &[OptionInput]) -> impl Iterator<Item = String> + '_ {
    options.iter().filter(|o| o.checked).map(|o| o.value.clone())
}

fn read_control(control: &Control) -> AnswerValue {
    match control {
        Control::Checkboxes(options) if !options.is_empty() => {
            AnswerValue::Selection(checked_values(options).collect())
        }
        Control::Radios(options) if !options.is_empty() => checked_values(options)
            .next()
            .map(AnswerValue::Text)
            .unwrap_or(AnswerValue::Null),
        Control::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                AnswerValue::Null
            } else {
                AnswerValue::Text(trimmed.to_string())
            }
        }
        _ => AnswerValue::Null,
    }
}
