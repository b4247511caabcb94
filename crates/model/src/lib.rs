//! OpenAI-compatible execution backend.
//!
//! [`OpenAIRunner`] implements [`ccore::Runner`] by sending one chat
//! completions request per run through [`HttpProvider`]. Works against any
//! OpenAI-compatible endpoint; the default is Gemini's.

pub use {
    http::HttpProvider,
    request::{Message, Request, Role},
    reqwest::{self, Client},
    response::{Choice, CompletionMeta, Delta, FinishReason, Response, Usage},
    runner::OpenAIRunner,
};

mod http;
mod request;
mod response;
mod runner;
