// Contract audit: LLM risk review plus reconciliation of its excerpts
// against the contract text. All LLM calls go through llm_client.

pub mod handlers;
pub mod parse;
pub mod prompts;
pub mod service;
