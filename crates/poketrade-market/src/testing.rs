//! Test doubles shared by the module tests

use async_trait::async_trait;
use poketrade_llm::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, StopReason,
    TokenUsage,
};

mockall::mock! {
    pub Llm {}

    #[async_trait]
    impl LLMProvider for Llm {
        async fn complete(&self, request: CompletionRequest) -> poketrade_llm::Result<CompletionResponse>;
        fn name(&self) -> &'static str;
    }
}

/// A plain end-of-turn response carrying `text`
pub fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    }
}

/// A provider answering every request with `reply`.
///
/// With `expect_in_prompt`, only requests whose prompt contains that text match.
pub fn replying_llm(reply: &'static str, expect_in_prompt: Option<&'static str>) -> MockLlm {
    let mut llm = MockLlm::new();
    llm.expect_name().return_const("mock-llm");
    llm.expect_complete()
        .withf(move |request| {
            expect_in_prompt.is_none_or(|needle| {
                request
                    .last_user_text()
                    .is_some_and(|prompt| prompt.contains(needle))
            })
        })
        .returning(move |_| Ok(text_response(reply)));
    llm
}

/// A provider failing every request
pub fn failing_llm() -> MockLlm {
    let mut llm = MockLlm::new();
    llm.expect_name().return_const("mock-llm");
    llm.expect_complete()
        .returning(|_| Err(LLMError::RequestFailed("HTTP 503: unavailable".to_string())));
    llm
}
