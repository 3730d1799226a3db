//! `Chunker` capability: strategy-dispatch text splitting.

use noetic_common::{Error, Result};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub token_count: usize,
}

fn new_chunk(text: String) -> Chunk {
    let token_count = text.split_whitespace().count();
    Chunk { id: Uuid::new_v4().to_string(), text, token_count }
}

pub trait Chunker: Send + Sync {
    fn chunk(&self, content: &str, max_chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>>;
}

fn validate_sizes(max_chunk_size: usize, overlap: usize) -> Result<()> {
    if max_chunk_size == 0 {
        return Err(Error::InvalidInput("maxChunkSize must be greater than zero".to_string()));
    }
    if overlap >= max_chunk_size {
        return Err(Error::InvalidInput("overlap must be smaller than maxChunkSize".to_string()));
    }
    Ok(())
}

/// Packs a sequence of already-segmented units (sentences, tokens,
/// paragraphs) into chunks of at most `max_units` units, repeating the
/// trailing `overlap` units of one chunk at the head of the next.
fn pack(units: &[String], max_units: usize, overlap: usize, separator: &str) -> Vec<Chunk> {
    if units.is_empty() {
        return Vec::new();
    }
    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < units.len() {
        let end = (start + max_units).min(units.len());
        let text = units[start..end].join(separator);
        chunks.push(new_chunk(text));
        if end >= units.len() {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }
    chunks
}

fn split_sentences(content: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for ch in content.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trailing = current.trim();
    if !trailing.is_empty() {
        sentences.push(trailing.to_string());
    }
    sentences
}

fn split_paragraphs(content: &str) -> Vec<String> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// `sentence`: pack sentences up to `maxChunkSize` characters, with
/// `overlap` characters of trailing context carried into the next chunk.
pub struct SentenceChunker;

impl Chunker for SentenceChunker {
    fn chunk(&self, content: &str, max_chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
        validate_sizes(max_chunk_size, overlap)?;
        let sentences = split_sentences(content);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }
        Ok(pack_by_chars(&sentences, max_chunk_size, overlap))
    }
}

/// `token`: split on whitespace, pack up to `maxChunkSize` tokens with
/// `overlap` tokens shared between neighbouring chunks.
pub struct TokenChunker;

impl Chunker for TokenChunker {
    fn chunk(&self, content: &str, max_chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
        validate_sizes(max_chunk_size, overlap)?;
        let tokens: Vec<String> = content.split_whitespace().map(str::to_string).collect();
        Ok(pack(&tokens, max_chunk_size, overlap, " "))
    }
}

/// `semantic`: split at paragraph boundaries, then pack like `sentence`.
pub struct SemanticChunker;

impl Chunker for SemanticChunker {
    fn chunk(&self, content: &str, max_chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
        validate_sizes(max_chunk_size, overlap)?;
        let paragraphs = split_paragraphs(content);
        if paragraphs.is_empty() {
            return Ok(Vec::new());
        }
        Ok(pack_by_chars(&paragraphs, max_chunk_size, overlap))
    }
}

/// Character-budgeted packing, used by the two strategies whose budget is
/// specified in characters rather than whitespace tokens.
fn pack_by_chars(units: &[String], max_chars: usize, overlap_chars: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    for unit in units {
        if !buffer.is_empty() && buffer.len() + 1 + unit.len() > max_chars {
            chunks.push(new_chunk(buffer.clone()));
            let tail_start = buffer.len().saturating_sub(overlap_chars);
            buffer = buffer[tail_start..].to_string();
        }
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(unit);
    }
    if !buffer.trim().is_empty() {
        chunks.push(new_chunk(buffer));
    }
    chunks
}

#[must_use]
pub fn resolve(strategy: &str) -> Box<dyn Chunker> {
    match strategy {
        "token" => Box::new(TokenChunker),
        "semantic" => Box::new(SemanticChunker),
        _ => Box::new(SentenceChunker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_chunker_packs_within_budget() {
        let text = "One sentence here. Another one follows. A third sentence appears.";
        let chunks = SentenceChunker.chunk(text, 40, 10).unwrap();
        assert!(!chunks.is_empty());
        for c in &chunks {
            assert!(c.text.len() <= 50);
        }
    }

    #[test]
    fn token_chunker_respects_max_tokens() {
        let text = "a b c d e f g h i j";
        let chunks = TokenChunker.chunk(text, 4, 1).unwrap();
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.token_count <= 4);
        }
    }

    #[test]
    fn semantic_chunker_splits_on_paragraphs() {
        let text = "Para one.\n\nPara two.\n\nPara three.";
        let chunks = SemanticChunker.chunk(text, 1000, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("Para one"));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_max_chunk_size() {
        let err = TokenChunker.chunk("a b c", 4, 4).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn empty_content_produces_no_chunks() {
        let chunks = SentenceChunker.chunk("", 100, 10).unwrap();
        assert!(chunks.is_empty());
    }
}
