use crate::models::question::{Choice, Question};
use crate::utils::collection::{lenient_bool, scalar_text, text_field};
use crate::utils::html::list_item_texts;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use tracing::debug;

const PROMPT_KEYS: &[&str] = &["question", "title", "text", "prompt"];
const ID_KEYS: &[&str] = &["id", "pk"];
const ARRAY_KEYS: &[&str] = &["choices", "options", "answers"];
const MAP_KEYS: &[&str] = &["choices", "options"];
const DELIMITED_KEYS: &[&str] = &["options_text", "choices_text", "choices", "options"];
const HTML_KEYS: &[&str] = &["choices_html", "options_html"];
const MULTI_FLAGS: &[&str] = &["multiple", "multi", "multi_select", "allow_multiple"];
const MULTI_TYPES: &[&str] = &["multiple_select", "multi_select", "checkbox", "multiple_answer"];

pub struct QuestionNormalizer;

impl QuestionNormalizer {
    /// Reduces one raw question to the canonical model. Returns `None` only when there is no
    /// prompt text; unreadable choice data degrades to an open question.
    pub fn normalize(raw: &JsonValue, index: usize) -> Option<Question> {
        let prompt = text_field(raw, PROMPT_KEYS)?;
        let id = text_field(raw, ID_KEYS).unwrap_or_else(|| fallback_id(index));
        let choices = Self::extract_choices(raw);
        Some(Question::new(id, prompt, is_multi_select(raw), choices))
    }

    /// Normalizes a question list: prompt-less entries are dropped, ids made unique, and the
    /// list capped at `limit`.
    pub fn normalize_all(raw_questions: &[JsonValue], limit: usize) -> Vec<Question> {
        let mut seen = HashSet::new();
        let mut questions = Vec::new();

        for (index, raw) in raw_questions.iter().enumerate() {
            if questions.len() >= limit {
                debug!(limit, total = raw_questions.len(), "Question list truncated");
                break;
            }
            let Some(mut question) = Self::normalize(raw, index) else {
                debug!(index, "Skipping question without prompt");
                continue;
            };
            if !seen.insert(question.id.clone()) {
                question.id = fallback_id(index);
                while !seen.insert(question.id.clone()) {
                    question.id.push('_');
                }
            }
            questions.push(question);
        }
        questions
    }

    /// array field → object map → delimited string → HTML fragment → none.
    pub fn extract_choices(raw: &JsonValue) -> Vec<Choice> {
        if let Some(choices) = ARRAY_KEYS
            .iter()
            .filter_map(|key| raw.get(*key).and_then(JsonValue::as_array))
            .map(|items| from_array(items))
            .find(|choices| !choices.is_empty())
        {
            return choices;
        }

        if let Some(choices) = MAP_KEYS
            .iter()
            .filter_map(|key| raw.get(*key).and_then(JsonValue::as_object))
            .map(from_map)
            .find(|choices| !choices.is_empty())
        {
            return choices;
        }

        if let Some(choices) = DELIMITED_KEYS
            .iter()
            .filter_map(|key| raw.get(*key).and_then(JsonValue::as_str))
            .filter(|text| !looks_like_html(text))
            .map(from_delimited)
            .find(|choices| !choices.is_empty())
        {
            return choices;
        }

        HTML_KEYS
            .iter()
            .chain(DELIMITED_KEYS.iter())
            .filter_map(|key| raw.get(*key).and_then(JsonValue::as_str))
            .map(from_html)
            .find(|choices| !choices.is_empty())
            .unwrap_or_default()
    }
}

fn fallback_id(index: usize) -> String {
    format!("q{}", index)
}

fn is_multi_select(raw: &JsonValue) -> bool {
    let flagged = MULTI_FLAGS
        .iter()
        .filter_map(|key| raw.get(*key))
        .any(|v| lenient_bool(v) == Some(true));
    let typed = raw
        .get("type")
        .and_then(JsonValue::as_str)
        .map(|t| MULTI_TYPES.contains(&t.trim().to_lowercase().as_str()))
        .unwrap_or(false);
    flagged || typed
}

fn looks_like_html(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('<') && trimmed.contains('>')
}

fn indexed(labels: impl IntoIterator<Item = String>) -> Vec<Choice> {
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| Choice::new(i.to_string(), label))
        .collect()
}

fn from_array(items: &[JsonValue]) -> Vec<Choice> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match item {
            JsonValue::Object(_) => {
                let compact = item.to_string();
                let value = text_field(item, &["value", "id", "key"])
                    .unwrap_or_else(|| compact.clone());
                let label = text_field(item, &["label", "text"]).unwrap_or(compact);
                Some(Choice::new(value, label))
            }
            other => scalar_text(other).map(|label| Choice::new(i.to_string(), label)),
        })
        .collect()
}

fn from_map(map: &Map<String, JsonValue>) -> Vec<Choice> {
    map.iter()
        .filter_map(|(key, entry)| {
            let label = match entry {
                JsonValue::Object(_) => text_field(entry, &["label", "text"]),
                other => scalar_text(other),
            }?;
            Some(Choice::new(key.trim(), label))
        })
        .collect()
}

fn from_delimited(text: &str) -> Vec<Choice> {
    indexed(
        text.split(|c| c == '\n' || c == '|')
            .map(|part| part.trim_end_matches('\r').trim().to_string())
            .filter(|part| !part.is_empty()),
    )
}

fn from_html(fragment: &str) -> Vec<Choice> {
    indexed(list_item_texts(fragment))
}
