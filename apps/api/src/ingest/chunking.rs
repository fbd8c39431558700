//! Structural chunking: the LLM decides what a CV's sections are.
//!
//! Chunking never fails: when the model is unreachable, returns no JSON, or yields no
//! usable sections, the whole CV becomes a single "Full Text" chunk.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ingest::prompts::{CV_PARSE_PROMPT, CV_PARSE_SYSTEM};
use crate::llm_client::prompts::render;
use crate::llm_client::{extract_json_object, ChatModel, ChatRequest, LlmError};

/// Characters of CV text sent to the model.
pub const MAX_CHUNKING_CHARS: usize = 6000;
/// Sections whose trimmed content is this short or shorter are dropped.
pub const MIN_SECTION_CHARS: usize = 40;

pub const UNKNOWN_CANDIDATE: &str = "Unknown";
pub const DEFAULT_SECTION: &str = "General";
pub const FULL_TEXT_SECTION: &str = "Full Text";

/// One labeled CV section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvChunk {
    pub content: String,
    pub section: String,
    pub candidate_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkedCv {
    pub candidate_name: String,
    pub chunks: Vec<CvChunk>,
}

impl ChunkedCv {
    /// Unique section names in first-seen order.
    pub fn section_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for chunk in &self.chunks {
            if !names.contains(&chunk.section) {
                names.push(chunk.section.clone());
            }
        }
        names
    }
}

#[derive(Debug, Deserialize)]
struct ParsedLayout {
    candidate_name: Option<String>,
    #[serde(default)]
    sections: Vec<ParsedSection>,
}

#[derive(Debug, Deserialize)]
struct ParsedSection {
    section_title: Option<String>,
    content: Option<String>,
}

#[derive(Debug)]
enum LayoutError {
    Llm(LlmError),
    NoJson,
    Json(serde_json::Error),
}

/// Splits a CV into labeled sections using the chat model, falling back to a single chunk.
pub async fn structural_chunking(text: &str, llm: &dyn ChatModel) -> ChunkedCv {
    match request_layout(text, llm).await {
        Ok(layout) => {
            let chunked = chunks_from_layout(layout);
            if chunked.chunks.is_empty() {
                warn!("LLM returned no usable sections, using fallback");
                fallback_chunking(text, &chunked.candidate_name)
            } else {
                info!(
                    "Chunked CV for {} into {} sections",
                    chunked.candidate_name,
                    chunked.chunks.len()
                );
                chunked
            }
        }
        Err(LayoutError::NoJson) => {
            warn!("LLM returned no JSON object, using fallback");
            fallback_chunking(text, UNKNOWN_CANDIDATE)
        }
        Err(LayoutError::Json(e)) => {
            warn!("LLM chunking JSON was malformed: {e}, using fallback");
            fallback_chunking(text, UNKNOWN_CANDIDATE)
        }
        Err(LayoutError::Llm(e)) => {
            warn!("LLM chunking failed: {e}, using fallback");
            fallback_chunking(text, UNKNOWN_CANDIDATE)
        }
    }
}

/// Last resort: store the whole CV as one chunk.
pub fn fallback_chunking(text: &str, candidate_name: &str) -> ChunkedCv {
    ChunkedCv {
        candidate_name: candidate_name.to_string(),
        chunks: vec![CvChunk {
            content: text.to_string(),
            section: FULL_TEXT_SECTION.to_string(),
            candidate_name: candidate_name.to_string(),
        }],
    }
}

async fn request_layout(text: &str, llm: &dyn ChatModel) -> Result<ParsedLayout, LayoutError> {
    let excerpt: String = text.chars().take(MAX_CHUNKING_CHARS).collect();
    let request = ChatRequest::new(render(CV_PARSE_PROMPT, &[("cv_text", excerpt.as_str())]))
        .with_system(CV_PARSE_SYSTEM)
        .with_temperature(0.0);

    let raw = llm.complete(&request).await.map_err(LayoutError::Llm)?;
    let json = extract_json_object(&raw).ok_or(LayoutError::NoJson)?;
    serde_json::from_str(&json).map_err(LayoutError::Json)
}

fn chunks_from_layout(layout: ParsedLayout) -> ChunkedCv {
    let candidate_name = layout
        .candidate_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string());

    let chunks = layout
        .sections
        .into_iter()
        .filter_map(|s| {
            let content = s.content?;
            if content.trim().chars().count() <= MIN_SECTION_CHARS {
                return None;
            }
            let section = s
                .section_title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_SECTION.to_string());
            Some(CvChunk {
                content,
                section,
                candidate_name: candidate_name.clone(),
            })
        })
        .collect();

    ChunkedCv {
        candidate_name,
        chunks,
    }
}
