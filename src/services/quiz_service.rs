use std::sync::Arc;

use crate::{
    config::GenerationBudgets,
    errors::AppResult,
    models::domain::{
        ContentKind, GenerationRequest, MultipleChoiceItem, QuizItem, QuizParams,
        ShortAnswerItem, TrueFalseItem,
    },
    services::{
        generation_client::{GenerationClient, GenerationOptions},
        prompt_builder, response_decoder,
    },
};

/// Quiz generation is kept close to deterministic.
const QUIZ_TEMPERATURE: f32 = 0.2;

pub struct QuizService {
    client: Arc<dyn GenerationClient>,
    budgets: GenerationBudgets,
}

impl QuizService {
    pub fn new(client: Arc<dyn GenerationClient>, budgets: GenerationBudgets) -> Self {
        Self { client, budgets }
    }

    pub async fn get_multiple_choice_questions(
        &self,
        book_id: &str,
        book_name: &str,
        params: QuizParams,
    ) -> AppResult<Vec<MultipleChoiceItem>> {
        self.generate(book_id, book_name, params, self.budgets.multiple_choice)
            .await
    }

    pub async fn get_true_false_questions(
        &self,
        book_id: &str,
        book_name: &str,
        params: QuizParams,
    ) -> AppResult<Vec<TrueFalseItem>> {
        self.generate(book_id, book_name, params, self.budgets.true_false)
            .await
    }

    pub async fn get_short_answer_questions(
        &self,
        book_id: &str,
        book_name: &str,
        params: QuizParams,
    ) -> AppResult<Vec<ShortAnswerItem>> {
        self.generate(book_id, book_name, params, self.budgets.short_answer)
            .await
    }

    /// Build, call once and decode. The item type picks the template and
    /// the schema; failures propagate unchanged.
    async fn generate<T: QuizItem>(
        &self,
        book_id: &str,
        book_name: &str,
        params: QuizParams,
        max_output_tokens: u32,
    ) -> AppResult<Vec<T>> {
        let kind: ContentKind = T::KIND;
        let request = GenerationRequest::quiz_with_params(kind, book_name, params)?;
        let prompt = prompt_builder::build(&request);

        log::info!(
            "Generating {} {} questions for book_id={}",
            request.question_count(),
            kind,
            book_id
        );

        let raw = self
            .client
            .generate(
                &prompt,
                GenerationOptions::json(max_output_tokens, QUIZ_TEMPERATURE),
            )
            .await
            .map_err(|err| {
                log::warn!("{} generation failed for book_id={}: {}", kind, book_id, err);
                err
            })?;

        let items = response_decoder::decode::<T>(&raw, request.question_count()).map_err(|err| {
            log::warn!("{} response rejected for book_id={}: {}", kind, book_id, err);
            err
        })?;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::{AppError, GenerationError},
        services::generation_client::MockGenerationClient,
        test_utils::fixtures,
    };

    fn service_with(mock: MockGenerationClient) -> QuizService {
        QuizService::new(Arc::new(mock), GenerationBudgets::default())
    }

    fn three_questions() -> QuizParams {
        QuizParams {
            question_count: Some(3),
            ..QuizParams::default()
        }
    }

    #[tokio::test]
    async fn test_multiple_choice_returns_exact_count() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .withf(|prompt, options| {
                prompt.contains("\"Dune\"")
                    && prompt.contains("exactly 3 multiple-choice questions")
                    && options.expect_json
                    && options.max_output_tokens == 4000
            })
            .times(1)
            .returning(|_, _| Ok(fixtures::multiple_choice_body("Dune", 3)));

        let items = service_with(mock)
            .get_multiple_choice_questions("book-42", "Dune", three_questions())
            .await
            .expect("quiz generated");

        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item.correct_answer_index < 4));
        assert!(items.iter().all(|item| item.options.len() == 4));
    }

    #[tokio::test]
    async fn test_true_false_uses_its_own_budget() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .withf(|_, options| options.max_output_tokens == 2000 && options.expect_json)
            .times(1)
            .returning(|_, _| Ok(fixtures::true_false_body("Emma", 10)));

        let items = service_with(mock)
            .get_true_false_questions("book-1", "Emma", QuizParams::default())
            .await
            .expect("quiz generated");

        assert_eq!(items.len(), 10);
    }

    #[tokio::test]
    async fn test_short_answer_accepts_fenced_body() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Ok(format!("```json\n{}\n```", fixtures::short_answer_body("Emma", 3))));

        let items = service_with(mock)
            .get_short_answer_questions("book-1", "Emma", three_questions())
            .await
            .expect("quiz generated");

        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| !item.answer.is_empty()));
    }

    #[tokio::test]
    async fn test_empty_model_output_is_empty_response() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Ok(String::new()));

        let result = service_with(mock)
            .get_short_answer_questions("book-1", "Emma", three_questions())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Generation(GenerationError::EmptyResponse))
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_propagates_without_retry() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Err(GenerationError::RateLimited("429 RESOURCE_EXHAUSTED".into())));

        let result = service_with(mock)
            .get_multiple_choice_questions("book-1", "Dune", three_questions())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Generation(GenerationError::RateLimited(_)))
        ));
    }

    #[tokio::test]
    async fn test_short_batch_is_schema_violation() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Ok(fixtures::true_false_body("Dune", 2)));

        let result = service_with(mock)
            .get_true_false_questions("book-1", "Dune", three_questions())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Generation(GenerationError::SchemaViolation(_)))
        ));
    }

    #[tokio::test]
    async fn test_blank_book_name_never_reaches_client() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate().never();

        let result = service_with(mock)
            .get_multiple_choice_questions("book-1", "  ", QuizParams::default())
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_author_reaches_prompt() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .withf(|prompt, _| prompt.contains("\"Dune\" by Frank Herbert"))
            .times(1)
            .returning(|_, _| Ok(fixtures::multiple_choice_body("Dune", 10)));

        let params = QuizParams {
            author: Some("Frank Herbert".to_string()),
            ..QuizParams::default()
        };
        let items = service_with(mock)
            .get_multiple_choice_questions("book-1", "Dune", params)
            .await
            .expect("quiz generated");

        assert_eq!(items.len(), 10);
    }
}
