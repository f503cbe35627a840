use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_root: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub candidate_id: Option<String>,
    pub request_timeout_secs: u64,
    pub fragment_timeout_secs: u64,
    pub max_quiz_questions: usize,
    pub watch_job_ids: Vec<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Default for Config {
    fn default() -> Self {
        Self {
            api_root: "http://127.0.0.1:8000".to_string(),
            access_token: None,
            refresh_token: None,
            candidate_id: None,
            request_timeout_secs: 60,
            fragment_timeout_secs: 5,
            max_quiz_questions: 50,
            watch_job_ids: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Config::default();

        Ok(Self {
            api_root: get_env_opt("API_ROOT").unwrap_or(defaults.api_root),
            access_token: get_env_opt("ACCESS_TOKEN"),
            refresh_token: get_env_opt("REFRESH_TOKEN"),
            candidate_id: get_env_opt("CANDIDATE_ID"),
            request_timeout_secs: get_env_parse_or(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            fragment_timeout_secs: get_env_parse_or(
                "FRAGMENT_TIMEOUT_SECS",
                defaults.fragment_timeout_secs,
            )?,
            max_quiz_questions: get_env_parse_or(
                "MAX_QUIZ_QUESTIONS",
                defaults.max_quiz_questions,
            )?,
            watch_job_ids: get_env_opt("WATCH_JOB_IDS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
        })
    }
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(split_list(" 1, 2,,3 ,"), vec!["1", "2", "3"]);
        assert!(split_list("").is_empty());
    }
}
