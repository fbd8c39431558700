// Question answering over a session's CVs. Questions are screened by the guard,
// matched against retrieved sections, and answered only from those sections.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod answer;
pub mod ask;
pub mod guard;
pub mod handlers;
pub mod prompts;
pub mod retrieval;
