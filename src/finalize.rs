//! Finalize Module
//!
//! Collects per-document outcomes of a batch, writes generated sources to
//! their sibling output files, and produces a serializable summary for
//! hosts that report results as JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::generate::GenerationResult;
use crate::validate::{Diagnostic, GenerationError};

#[derive(Debug)]
pub struct DocumentOutcome {
    pub owner: String,
    pub source_path: PathBuf,
    pub result: Result<GenerationResult, GenerationError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Generated,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub owner: String,
    pub source_path: String,
    pub status: DocumentStatus,
    pub output_path: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&DocumentOutcome, &GenerationResult)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|r| (o, r)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&DocumentOutcome, &GenerationError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }

    pub fn has_errors(&self) -> bool {
        self.failed().next().is_some()
    }

    /// Warnings from successful documents plus one error diagnostic per
    /// failed document, in outcome order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.outcomes.iter().flat_map(outcome_diagnostics).collect()
    }

    pub fn summary(&self) -> Vec<DocumentSummary> {
        self.outcomes
            .iter()
            .map(|outcome| {
                let (status, output_path) = match &outcome.result {
                    Ok(result) => (
                        DocumentStatus::Generated,
                        result.output_path.as_ref().map(|p| p.display().to_string()),
                    ),
                    Err(_) => (DocumentStatus::Failed, None),
                };
                DocumentSummary {
                    owner: outcome.owner.clone(),
                    source_path: outcome.source_path.display().to_string(),
                    status,
                    output_path,
                    diagnostics: outcome_diagnostics(outcome),
                }
            })
            .collect()
    }

    /// Write every successful result that has an output path. Files whose
    /// content is already identical are left untouched.
    pub fn write_outputs(&self) -> std::io::Result<Vec<(PathBuf, WriteStatus)>> {
        let mut written = Vec::new();
        for (_, result) in self.succeeded() {
            if let Some(path) = &result.output_path {
                let status = write_if_changed(path, &result.source_text)?;
                written.push((path.clone(), status));
            }
        }
        info!(files = written.len(), "wrote generated sources");
        Ok(written)
    }
}

fn outcome_diagnostics(outcome: &DocumentOutcome) -> Vec<Diagnostic> {
    match &outcome.result {
        Ok(result) => result.diagnostics.clone(),
        Err(e) => vec![e.to_diagnostic(&outcome.source_path.display().to_string())],
    }
}

pub fn write_if_changed(path: &Path, contents: &str) -> std::io::Result<WriteStatus> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == contents {
            debug!(path = %path.display(), "generated source unchanged");
            return Ok(WriteStatus::Unchanged);
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(WriteStatus::Written)
}
