// 🧮 Similarity Index - TF-IDF vector space over roster names
//
// Fitted once (build-index), persisted as a JSON artifact, loaded once per run.
// Loading validates everything up front so a corrupt artifact never reaches
// the matching phase.
//
// Weighting:
//   tf  = raw term count
//   idf = ln((1 + n) / (1 + df)) + 1
//   every vector is L2-normalised

use crate::error::{PresenceError, PresenceResult};
use crate::roster::Roster;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Bumped whenever the artifact layout changes
pub const INDEX_FORMAT_VERSION: u32 = 1;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Runs of 2+ word characters; single letters are dropped
    PATTERN.get_or_init(|| Regex::new(r"(?u)\b\w\w+\b").expect("token pattern is valid"))
}

/// Lowercase and split text into vocabulary tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    token_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

// ============================================================================
// SPARSE VECTOR
// ============================================================================

/// (term index, weight) pairs sorted by term index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub terms: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.terms.len() && j < other.terms.len() {
            let (a_idx, a_w) = self.terms[i];
            let (b_idx, b_w) = other.terms[j];

            if a_idx == b_idx {
                sum += a_w * b_w;
                i += 1;
                j += 1;
            } else if a_idx < b_idx {
                i += 1;
            } else {
                j += 1;
            }
        }

        sum
    }

    pub fn norm(&self) -> f64 {
        self.terms.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.norm() == 0.0
    }

    fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in self.terms.iter_mut() {
                *w /= norm;
            }
        }
        self
    }
}

/// Cosine similarity in [0, 1]; zero vectors are similar to nothing
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    // Weights are non-negative; rounding can still land a hair above 1.0
    (a.dot(b) / denom).clamp(0.0, 1.0)
}

// ============================================================================
// TF-IDF VECTORIZER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// term → column index (columns assigned in sorted term order)
    vocabulary: BTreeMap<String, usize>,

    /// idf weight per column
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and idf weights from a corpus
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for doc in documents {
            let unique: BTreeSet<String> = tokenize(doc.as_ref()).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());

        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        TfidfVectorizer { vocabulary, idf }
    }

    /// Project text into the fitted space; unknown terms are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();

        for token in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut terms: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        terms.sort_by_key(|(index, _)| *index);

        SparseVector { terms }.normalized()
    }

    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn validate(&self) -> PresenceResult<()> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(PresenceError::Artifact(format!(
                "vocabulary has {} terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }

        let columns: BTreeSet<usize> = self.vocabulary.values().copied().collect();
        if columns.len() != self.idf.len() || columns.iter().any(|&c| c >= self.idf.len()) {
            return Err(PresenceError::Artifact(
                "vocabulary columns are not a permutation of the idf vector".to_string(),
            ));
        }

        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err(PresenceError::Artifact("non-finite idf weight".to_string()));
        }

        Ok(())
    }
}

// ============================================================================
// SIMILARITY INDEX
// ============================================================================

/// On-disk layout of the index
#[derive(Debug, Serialize, Deserialize)]
struct IndexArtifact {
    version: u32,
    vectorizer: TfidfVectorizer,
    names: Vec<String>,
    vectors: Vec<SparseVector>,
    checksum: String,
}

/// Fitted vectorizer + roster + one vector per roster entry (same order)
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    vectorizer: TfidfVectorizer,
    roster: Roster,
    vectors: Vec<SparseVector>,
}

impl SimilarityIndex {
    /// Fit a new index over the roster's composite names
    pub fn build(roster: Roster) -> Self {
        let names: Vec<&str> = roster.composites().collect();
        let vectorizer = TfidfVectorizer::fit(names.as_slice());
        let vectors = names.iter().map(|name| vectorizer.transform(name)).collect();

        debug!(
            entries = roster.len(),
            terms = vectorizer.dimension(),
            "Fitted similarity index"
        );

        SimilarityIndex {
            vectorizer,
            roster,
            vectors,
        }
    }

    /// Load and fully validate an index artifact
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open similarity index: {}", path.display()))?;

        let artifact: IndexArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PresenceError::Artifact(e.to_string()))
            .with_context(|| format!("Failed to parse similarity index: {}", path.display()))?;

        let index = SimilarityIndex::from_artifact(artifact)
            .with_context(|| format!("Rejected similarity index: {}", path.display()))?;

        Ok(index)
    }

    /// Persist the index as a JSON artifact
    pub fn save(&self, path: &Path) -> Result<()> {
        let names: Vec<String> = self.roster.composites().map(str::to_string).collect();
        let artifact = IndexArtifact {
            version: INDEX_FORMAT_VERSION,
            checksum: compute_checksum(INDEX_FORMAT_VERSION, &self.vectorizer, &names, &self.vectors),
            vectorizer: self.vectorizer.clone(),
            names,
            vectors: self.vectors.clone(),
        };

        let file = File::create(path)
            .with_context(|| format!("Failed to create similarity index: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &artifact).context("Failed to serialize similarity index")?;
        writer.flush().context("Failed to flush similarity index")?;

        Ok(())
    }

    fn from_artifact(artifact: IndexArtifact) -> PresenceResult<Self> {
        if artifact.version != INDEX_FORMAT_VERSION {
            return Err(PresenceError::Artifact(format!(
                "format version {} (expected {})",
                artifact.version, INDEX_FORMAT_VERSION
            )));
        }

        let expected = compute_checksum(
            artifact.version,
            &artifact.vectorizer,
            &artifact.names,
            &artifact.vectors,
        );
        if expected != artifact.checksum {
            return Err(PresenceError::Artifact("checksum mismatch".to_string()));
        }

        artifact.vectorizer.validate()?;

        if artifact.names.len() != artifact.vectors.len() {
            return Err(PresenceError::Artifact(format!(
                "{} names but {} vectors",
                artifact.names.len(),
                artifact.vectors.len()
            )));
        }

        let dimension = artifact.vectorizer.dimension();
        for vector in &artifact.vectors {
            if vector.terms.iter().any(|(index, _)| *index >= dimension) {
                return Err(PresenceError::Artifact(
                    "vector term outside the vocabulary".to_string(),
                ));
            }
        }

        let roster = Roster::from_composites(&artifact.names)?;

        Ok(SimilarityIndex {
            vectorizer: artifact.vectorizer,
            roster,
            vectors: artifact.vectors,
        })
    }

    /// Cosine similarity of `query` against every roster entry, in roster order
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let projected = self.vectorizer.transform(query);
        self.vectors
            .iter()
            .map(|vector| cosine_similarity(&projected, vector))
            .collect()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn compute_checksum(
    version: u32,
    vectorizer: &TfidfVectorizer,
    names: &[String],
    vectors: &[SparseVector],
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(version.to_le_bytes());

    for (term, index) in &vectorizer.vocabulary {
        hasher.update(term.as_bytes());
        hasher.update([0u8]);
        hasher.update((*index as u64).to_le_bytes());
    }
    for weight in &vectorizer.idf {
        hasher.update(weight.to_bits().to_le_bytes());
    }
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
    }
    for vector in vectors {
        hasher.update((vector.terms.len() as u64).to_le_bytes());
        for (index, weight) in &vector.terms {
            hasher.update((*index as u64).to_le_bytes());
            hasher.update(weight.to_bits().to_le_bytes());
        }
    }

    format!("{:x}", hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================
