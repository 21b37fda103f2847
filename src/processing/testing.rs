//! Deterministic embedders for unit tests

use crate::error::{Result, SkillGapError};
use crate::processing::catalog::SkillCatalog;
use crate::processing::embeddings::Embedder;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Bag-of-words embedder: one dimension per known word plus a shared bucket for the rest
pub struct VocabEmbedder {
    vocab: Vec<String>,
}

impl VocabEmbedder {
    pub fn for_catalog(catalog: &SkillCatalog) -> Self {
        let mut vocab: Vec<String> = Vec::new();
        for name in catalog.names() {
            for word in words(name) {
                if !vocab.contains(&word) {
                    vocab.push(word);
                }
            }
        }
        Self { vocab }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.vocab.len() + 1];
        for word in words(text) {
            let index = self
                .vocab
                .iter()
                .position(|v| *v == word)
                .unwrap_or(self.vocab.len());
            vector[index] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            vector[self.vocab.len()] = 1.0;
        } else {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

impl Embedder for VocabEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn model_name(&self) -> &str {
        "vocab-test"
    }
}

/// Records every call made to the wrapped embedder
pub struct CountingEmbedder {
    inner: VocabEmbedder,
    pub calls: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
}

impl CountingEmbedder {
    pub fn new(inner: VocabEmbedder) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls that embedded exactly `size` strings
    pub fn batch_calls(&self, size: usize) -> usize {
        self.batch_sizes
            .lock()
            .unwrap()
            .iter()
            .filter(|&&s| s == size)
            .count()
    }
}

impl Embedder for CountingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch_sizes.lock().unwrap().push(texts.len());
        self.inner.embed(texts)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(SkillGapError::scoring("embedding model offline"))
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}
