use crate::dto::quiz_dto::{question_collection, GenerateQuizRequest};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::routes;
use crate::services::fetch_service::{ApiResponse, ResilientFetch};
use crate::services::question_service::QuestionNormalizer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct QuizService {
    fetch: ResilientFetch,
    max_questions: usize,
}

impl QuizService {
    pub fn new(fetch: ResilientFetch, max_questions: usize) -> Self {
        Self {
            fetch,
            max_questions,
        }
    }

    /// Fetches the job's quiz, generating one when none exists yet.
    pub async fn load_questions(&self, job_id: &str) -> Result<Vec<Question>> {
        let response = self.fetch.call_one(routes::quiz::get_quiz(job_id)).await?;
        let response = if response.ok {
            response
        } else {
            warn!(job_id, status = response.status, "Quiz fetch failed, requesting generation");
            self.request_generation(job_id, &GenerateQuizRequest::default())
                .await?
        };
        self.questions_from(job_id, response)
    }

    /// Recruiter-side generation with explicit parameters.
    pub async fn generate(
        &self,
        job_id: &str,
        request: &GenerateQuizRequest,
    ) -> Result<Vec<Question>> {
        let response = self.request_generation(job_id, request).await?;
        self.questions_from(job_id, response)
    }

    async fn request_generation(
        &self,
        job_id: &str,
        request: &GenerateQuizRequest,
    ) -> Result<ApiResponse> {
        let candidates = routes::quiz::generate_quiz(job_id, request.body(job_id));
        self.fetch.call(&candidates).await?.into_success()
    }

    fn questions_from(&self, job_id: &str, response: ApiResponse) -> Result<Vec<Question>> {
        let body = response
            .data
            .ok_or_else(|| Error::MalformedResponse("quiz response has no body".to_string()))?;
        let raw = question_collection(&body)?;
        let questions = QuestionNormalizer::normalize_all(&raw, self.max_questions);
        if questions.is_empty() {
            return Err(Error::NoQuestions(job_id.to_string()));
        }
        info!(job_id, count = questions.len(), "Quiz questions loaded");
        Ok(questions)
    }
}
