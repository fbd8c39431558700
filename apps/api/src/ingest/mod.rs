// CV ingestion. Uploaded PDFs are split into sections by the LLM, embedded, and
// written to the vector index.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod chunking;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
