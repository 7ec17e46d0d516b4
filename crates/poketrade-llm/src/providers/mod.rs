//! Concrete provider implementations
//!
//! This module contains implementations of the LLMProvider trait for
//! the model services poketrade talks to.

#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};
#[cfg(feature = "openai")]
pub use openai::{OpenAIConfig, OpenAIProvider};
