// Resume screening: scores resumes against a job description and drafts
// interview questions. All LLM calls go through llm_client.

pub mod evaluation;
pub mod handlers;
pub mod interview;
pub mod prompts;
