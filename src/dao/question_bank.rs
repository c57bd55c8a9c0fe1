use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::info;

use crate::dao::models::QuestionRecord;

/// Error raised while loading the question bank at startup.
#[derive(Debug, Error)]
pub enum BankError {
    /// The bank file could not be read at all.
    #[error("cannot read question bank {}: {source}", .path.display())]
    Read {
        /// Location of the bank file on disk.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The bank file is not a JSON array of question records.
    #[error("cannot parse question bank {}: {source}", .path.display())]
    Parse {
        /// Location of the bank file on disk.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The bank parsed but holds zero questions.
    #[error("question bank {} is empty", .path.display())]
    Empty {
        /// Location of the bank file on disk.
        path: PathBuf,
    },
}

/// Immutable collection of questions loaded once at startup.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<QuestionRecord>,
}

impl QuestionBank {
    /// Load and validate the bank from a JSON array file.
    pub fn load(path: &Path) -> Result<Self, BankError> {
        let contents = std::fs::read_to_string(path).map_err(|source| BankError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let questions: Vec<QuestionRecord> =
            serde_json::from_str(&contents).map_err(|source| BankError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if questions.is_empty() {
            return Err(BankError::Empty {
                path: path.to_path_buf(),
            });
        }

        info!(path = %path.display(), count = questions.len(), "loaded question bank");
        Ok(Self { questions })
    }

    /// Build a bank directly from records, bypassing the filesystem.
    pub fn from_records(questions: Vec<QuestionRecord>) -> Self {
        Self { questions }
    }

    /// Number of questions available.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Sample up to `amount` distinct questions without replacement.
    ///
    /// A bank smaller than `amount` yields the whole bank (in random order).
    pub fn sample(&self, amount: usize) -> Vec<QuestionRecord> {
        let amount = amount.min(self.questions.len());
        self.questions
            .choose_multiple(&mut rand::rng(), amount)
            .cloned()
            .collect()
    }
}
