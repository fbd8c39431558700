// CV Strength & Weakness Report: one CV against one job description.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;
