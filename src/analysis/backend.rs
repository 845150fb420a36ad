// src/analysis/backend.rs
//! Seam between the run orchestration and the generative service.
//!
//! The trait is object safe (boxed futures) so the running app and the
//! headless CLI can share one `Arc<dyn AnalysisBackend>`, and tests can swap in
//! a scripted implementation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use super::error::AnalysisError;
use super::input::ComponentInput;
use super::schema::{ComponentAnalysis, Reference, UnifiedMethod};

pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The API key. Read once at startup and handed to every call explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank input.
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let trimmed = key.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

pub fn require_credential(credential: Option<&Credential>) -> Result<&Credential, AnalysisError> {
    credential.ok_or(AnalysisError::Auth)
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Unified method plus the citations that came with it.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodOutcome {
    pub method: UnifiedMethod,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentOutcome {
    pub analysis: ComponentAnalysis,
    pub references: Vec<Reference>,
}

/// Every operation fails with [`AnalysisError::Auth`] before doing any I/O
/// when no credential is supplied.
pub trait AnalysisBackend: Send + Sync {
    /// One call covering every component of the run.
    fn unified_method<'a>(
        &'a self,
        credential: Option<&'a Credential>,
        inputs: &'a [ComponentInput],
    ) -> BoxFut<'a, Result<MethodOutcome, AnalysisError>>;

    /// One call for a single component, independent of its siblings.
    fn component_analysis<'a>(
        &'a self,
        credential: Option<&'a Credential>,
        input: &'a ComponentInput,
    ) -> BoxFut<'a, Result<ComponentOutcome, AnalysisError>>;

    /// Base64 PNG of the component's pH-logD curve.
    fn curve_image<'a>(
        &'a self,
        credential: Option<&'a Credential>,
        input: &'a ComponentInput,
    ) -> BoxFut<'a, Result<String, AnalysisError>>;
}
