use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    config::GenerationBudgets,
    errors::{AppError, AppResult, GenerationError},
    models::domain::{ChatReply, GenerationRequest},
    services::{
        generation_client::{GenerationClient, GenerationOptions},
        prompt_builder, response_decoder,
    },
};

const CHAT_TEMPERATURE: f32 = 0.7;

/// Fragments buffered between the model stream and the HTTP response.
const STREAM_BUFFER: usize = 32;

pub type FragmentReceiver = mpsc::Receiver<Result<String, GenerationError>>;

pub struct ChatService {
    client: Arc<dyn GenerationClient>,
    budgets: GenerationBudgets,
}

impl ChatService {
    pub fn new(client: Arc<dyn GenerationClient>, budgets: GenerationBudgets) -> Self {
        Self { client, budgets }
    }

    fn options(&self) -> GenerationOptions {
        GenerationOptions::plain_text(self.budgets.chat, CHAT_TEMPERATURE)
    }

    /// Answers one question about a book.
    pub async fn get_chat_reply(
        &self,
        chat_id: &str,
        prompt: &str,
        book_name: &str,
    ) -> AppResult<ChatReply> {
        let request = GenerationRequest::free_chat(book_name, prompt)?;
        let prompt = prompt_builder::build(&request);

        log::info!("Generating chat reply for chat_id={}", chat_id);

        let raw = self.client.generate(&prompt, self.options()).await?;
        let message = response_decoder::decode_chat(&raw)?;

        Ok(ChatReply {
            id: chat_id.to_string(),
            message,
        })
    }

    /// Streams the model's answer to a free-form prompt.
    ///
    /// The producer task owns the only sender: the channel closes when the
    /// task ends, whether it finished, failed or noticed that the receiver
    /// was dropped. A failure is delivered as the last item.
    pub fn stream_chat_reply(&self, prompt: &str) -> AppResult<FragmentReceiver> {
        if prompt.trim().is_empty() {
            return Err(AppError::ValidationError(
                "prompt must not be empty".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let client = Arc::clone(&self.client);
        let options = self.options();
        let prompt = prompt.to_string();

        tokio::spawn(async move {
            let producer = client.generate_stream(&prompt, options, tx.clone());

            tokio::select! {
                result = producer => {
                    if let Err(err) = result {
                        log::warn!("Chat stream failed: {}", err);
                        // Nobody is listening if this fails; nothing left to do.
                        let _ = tx.send(Err(err)).await;
                    }
                }
                _ = tx.closed() => {
                    log::debug!("Chat stream receiver dropped, cancelling generation");
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::generation_client::MockGenerationClient, test_utils::test_helpers};
    use std::time::Duration;

    fn service_with(mock: MockGenerationClient) -> ChatService {
        ChatService::new(Arc::new(mock), GenerationBudgets::default())
    }

    async fn collect(mut rx: FragmentReceiver) -> Vec<Result<String, GenerationError>> {
        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        items
    }

    #[tokio::test]
    async fn test_chat_reply_is_trimmed_and_tagged_with_chat_id() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .withf(|prompt, options| {
                prompt.contains("\"Why is spice valuable?\"")
                    && !options.expect_json
                    && options.max_output_tokens == 1000
            })
            .times(1)
            .returning(|_, _| Ok("  Spice extends life and enables navigation.\n".to_string()));

        let reply = service_with(mock)
            .get_chat_reply("chat-7", "Why is spice valuable?", "Dune")
            .await
            .expect("reply");

        assert_eq!(reply.id, "chat-7");
        assert_eq!(reply.message, "Spice extends life and enables navigation.");
    }

    #[tokio::test]
    async fn test_blank_chat_reply_is_empty_response() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Ok("   ".to_string()));

        let result = service_with(mock)
            .get_chat_reply("chat-7", "Who is Paul?", "Dune")
            .await;

        assert!(matches!(
            result,
            Err(AppError::Generation(GenerationError::EmptyResponse))
        ));
    }

    #[tokio::test]
    async fn test_chat_upstream_error_propagates() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Err(GenerationError::UpstreamError("503".into())));

        let result = service_with(mock)
            .get_chat_reply("chat-7", "Who is Paul?", "Dune")
            .await;

        assert!(matches!(
            result,
            Err(AppError::Generation(GenerationError::UpstreamError(_)))
        ));
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_prompt() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate().never();

        let result = service_with(mock).get_chat_reply("chat-7", " ", "Dune").await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_stream_forwards_fragments_then_closes() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate_stream()
            .times(1)
            .returning(|_, _, fragments| {
                for fragment in ["Paul ", "is ", "the heir."] {
                    fragments
                        .try_send(Ok(fragment.to_string()))
                        .expect("buffer has room");
                }
                Ok(())
            });

        let rx = service_with(mock)
            .stream_chat_reply("Who is Paul?")
            .expect("stream started");
        let items = collect(rx).await;

        assert_eq!(
            items,
            vec![
                Ok("Paul ".to_string()),
                Ok("is ".to_string()),
                Ok("the heir.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_failure_is_last_item() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate_stream()
            .times(1)
            .returning(|_, _, fragments| {
                fragments
                    .try_send(Ok("Partial".to_string()))
                    .expect("buffer has room");
                Err(GenerationError::RateLimited("quota".into()))
            });

        let rx = service_with(mock)
            .stream_chat_reply("Who is Paul?")
            .expect("stream started");
        let items = collect(rx).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok("Partial".to_string()));
        assert!(matches!(items[1], Err(GenerationError::RateLimited(_))));
    }

    #[tokio::test]
    async fn test_stream_rejects_blank_prompt() {
        let mock = MockGenerationClient::new();
        assert!(service_with(mock).stream_chat_reply("  ").is_err());
    }

    #[tokio::test]
    async fn test_dropped_receiver_closes_producer_side() {
        let (probe_tx, mut probe_rx) = mpsc::channel::<()>(1);
        let client = test_helpers::PendingStreamClient::new(probe_tx);
        let started = client.started();
        let service = ChatService::new(Arc::new(client), GenerationBudgets::default());

        let rx = service.stream_chat_reply("Who is Paul?").expect("stream started");
        started.notified().await;
        drop(rx);

        // The probe sender lives inside the producer future; it is dropped
        // once the producer task is cancelled.
        let closed = tokio::time::timeout(Duration::from_secs(2), probe_rx.recv()).await;
        assert_eq!(closed.expect("producer cancelled in time"), None);
    }
}
