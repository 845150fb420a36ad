// src/analysis/aggregate.rs
//! The in-progress result of one analysis run.
//!
//! `components` has a fixed length for the whole run and each slot moves
//! `Loading -> Complete | Error` at most once. Only the curve image of a
//! `Complete` slot may change afterwards.

use serde::Serialize;

use super::schema::{ComponentAnalysis, Reference, UnifiedMethod};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ComponentResult {
    #[serde(rename_all = "camelCase")]
    Loading { display_id: String },
    #[serde(rename_all = "camelCase")]
    Error { display_id: String, message: String },
    Complete(Box<ComponentAnalysis>),
}

impl ComponentResult {
    pub fn label(&self) -> &str {
        match self {
            ComponentResult::Loading { display_id } | ComponentResult::Error { display_id, .. } => {
                display_id
            }
            ComponentResult::Complete(analysis) => &analysis.component_id,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ComponentResult::Loading { .. })
    }

    pub fn as_complete(&self) -> Option<&ComponentAnalysis> {
        match self {
            ComponentResult::Complete(analysis) => Some(analysis),
            _ => None,
        }
    }
}

/// Citations keyed by URI. Re-merging a URI replaces its title and keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferenceSet {
    entries: Vec<Reference>,
}

impl ReferenceSet {
    pub fn merge<I: IntoIterator<Item = Reference>>(&mut self, references: I) {
        for reference in references {
            match self.entries.iter_mut().find(|r| r.uri == reference.uri) {
                Some(existing) => existing.title = reference.title,
                None => self.entries.push(reference),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisAggregate {
    pub unified_method: Option<UnifiedMethod>,
    pub components: Vec<ComponentResult>,
    pub references: ReferenceSet,
}

impl AnalysisAggregate {
    /// Every slot starts as `Loading`.
    pub fn seed<I: IntoIterator<Item = String>>(display_ids: I) -> Self {
        Self {
            unified_method: None,
            components: display_ids
                .into_iter()
                .map(|display_id| ComponentResult::Loading { display_id })
                .collect(),
            references: ReferenceSet::default(),
        }
    }

    /// Set once per run; later calls are ignored. Returns whether it was applied.
    pub fn set_unified_method(&mut self, method: UnifiedMethod) -> bool {
        if self.unified_method.is_some() {
            return false;
        }
        self.unified_method = Some(method);
        true
    }

    /// Resolves a `Loading` slot. Already-resolved or out-of-range indices are
    /// left alone and `false` is returned.
    pub fn resolve_component(&mut self, index: usize, result: ComponentResult) -> bool {
        if result.is_loading() {
            return false;
        }
        match self.components.get_mut(index) {
            Some(slot) if slot.is_loading() => {
                *slot = result;
                true
            }
            _ => false,
        }
    }

    /// Sets only `phLogDCurveImage` of a `Complete` slot.
    pub fn set_curve_image(&mut self, index: usize, image: String) -> bool {
        match self.components.get_mut(index) {
            Some(ComponentResult::Complete(analysis)) => {
                analysis.physicochemical.ph_log_d.ph_log_d_curve_image = Some(image);
                true
            }
            _ => false,
        }
    }

    pub fn merge_references<I: IntoIterator<Item = Reference>>(&mut self, references: I) {
        self.references.merge(references);
    }

    pub fn pending_count(&self) -> usize {
        self.components.iter().filter(|c| c.is_loading()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::schema::tests::{sample_component, sample_method};

    fn reference(title: &str, uri: &str) -> Reference {
        Reference { title: title.into(), uri: uri.into() }
    }

    fn seeded(n: usize) -> AnalysisAggregate {
        AnalysisAggregate::seed((0..n).map(|i| format!("Component {} (SMILES)", i + 1)))
    }

    #[test]
    fn test_reference_last_write_wins() {
        let mut set = ReferenceSet::default();
        set.merge(vec![reference("A", "x")]);
        set.merge(vec![reference("B", "x")]);
        assert_eq!(set.len(), 1);
        let only = set.iter().next().unwrap();
        assert_eq!((only.title.as_str(), only.uri.as_str()), ("B", "x"));
    }

    #[test]
    fn test_reference_merge_keeps_first_position() {
        let mut set = ReferenceSet::default();
        set.merge(vec![reference("A", "x"), reference("Y", "y")]);
        set.merge(vec![reference("Z", "z"), reference("A2", "x")]);
        let uris: Vec<&str> = set.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["x", "y", "z"]);
        set.merge(vec![reference("Z", "z")]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_slot_resolves_once() {
        let mut agg = seeded(2);
        let done = ComponentResult::Complete(Box::new(sample_component("Component 1 (SMILES)")));
        assert!(agg.resolve_component(0, done.clone()));
        let failed = ComponentResult::Error {
            display_id: "Component 1 (SMILES)".into(),
            message: "late".into(),
        };
        assert!(!agg.resolve_component(0, failed));
        assert_eq!(agg.components[0], done);
        assert!(!agg.resolve_component(
            1,
            ComponentResult::Loading { display_id: "Component 2 (SMILES)".into() }
        ));
        assert!(!agg.resolve_component(7, done));
        assert_eq!(agg.components.len(), 2);
        assert_eq!(agg.pending_count(), 1);
    }

    #[test]
    fn test_unified_method_set_once() {
        let mut agg = seeded(1);
        assert!(agg.set_unified_method(sample_method()));
        let mut other = sample_method();
        other.summary = "different".into();
        assert!(!agg.set_unified_method(other));
        assert_eq!(agg.unified_method, Some(sample_method()));
    }

    #[test]
    fn test_curve_image_only_on_complete_slots() {
        let mut agg = seeded(3);
        agg.resolve_component(0, ComponentResult::Complete(Box::new(sample_component("c1"))));
        agg.resolve_component(
            1,
            ComponentResult::Error { display_id: "c2".into(), message: "boom".into() },
        );
        let before = agg.clone();

        assert!(!agg.set_curve_image(1, "img".into()));
        assert!(!agg.set_curve_image(2, "img".into()));
        assert_eq!(agg, before);

        assert!(agg.set_curve_image(0, "img".into()));
        let after = agg.components[0].as_complete().unwrap();
        let original = before.components[0].as_complete().unwrap();
        assert_eq!(after.physicochemical.ph_log_d.ph_log_d_curve_image.as_deref(), Some("img"));
        assert_eq!(after.basic_profile, original.basic_profile);
        assert_eq!(after.toxicology, original.toxicology);
        assert_eq!(after.structure_analysis, original.structure_analysis);
        assert_eq!(&agg.components[1..], &before.components[1..]);
    }
}
