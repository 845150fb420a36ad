// src/analysis/run.rs
//! Run orchestration and the Result Aggregator.
//!
//! ## Flow
//!
//! 1. [`AnalysisSession::begin_run`] seeds the aggregate with `Loading` slots
//!    and hands out a fresh run id.
//! 2. [`dispatch_run`] spawns one task per component and then awaits the
//!    unified-method call. Every task reports through the run channel as a
//!    [`RunMessage`]; nothing else touches the aggregate.
//! 3. The single consumer of the channel calls [`AnalysisSession::apply`] for
//!    each message, in arrival order. Messages tagged with an older run id are
//!    dropped, which is how superseded runs are abandoned.
//!
//! A failed unified-method call clears the aggregate and fails the whole run.
//! A failed component call only marks its own slot.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::log::{debug, error, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::aggregate::{AnalysisAggregate, ComponentResult};
use super::backend::{AnalysisBackend, ComponentOutcome, Credential, MethodOutcome};
use super::error::AnalysisError;
use super::input::ComponentInput;

#[derive(Debug)]
pub enum RunEvent {
    Method(Result<MethodOutcome, AnalysisError>),
    Component {
        index: usize,
        result: Result<ComponentOutcome, AnalysisError>,
    },
    Curve {
        index: usize,
        result: Result<String, AnalysisError>,
    },
}

#[derive(Debug)]
pub struct RunMessage {
    pub run_id: Uuid,
    pub event: RunEvent,
}

pub type RunSender = mpsc::UnboundedSender<RunMessage>;
pub type RunReceiver = mpsc::UnboundedReceiver<RunMessage>;

pub fn run_channel() -> (RunSender, RunReceiver) {
    mpsc::unbounded_channel()
}

fn send(tx: &RunSender, run_id: Uuid, event: RunEvent) {
    if tx.send(RunMessage { run_id, event }).is_err() {
        debug!("Run channel closed; dropping result for run {}", run_id);
    }
}

/// Issues every request of a run. Component requests are spawned and left to
/// finish on their own; the future returned here completes once the
/// unified-method call has resolved.
pub async fn dispatch_run(
    backend: Arc<dyn AnalysisBackend>,
    credential: Option<Credential>,
    inputs: Arc<Vec<ComponentInput>>,
    run_id: Uuid,
    tx: RunSender,
) {
    info!("Dispatching run {} with {} component(s)", run_id, inputs.len());

    for index in 0..inputs.len() {
        let backend = Arc::clone(&backend);
        let inputs = Arc::clone(&inputs);
        let credential = credential.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = backend
                .component_analysis(credential.as_ref(), &inputs[index])
                .await;
            send(&tx, run_id, RunEvent::Component { index, result });
        });
    }

    let result = backend.unified_method(credential.as_ref(), &inputs).await;
    send(&tx, run_id, RunEvent::Method(result));
}

/// A curve request approved by [`AnalysisSession::request_curve`].
#[derive(Debug, Clone)]
pub struct CurveJob {
    pub run_id: Uuid,
    pub index: usize,
    pub input: ComponentInput,
}

pub async fn dispatch_curve(
    backend: Arc<dyn AnalysisBackend>,
    credential: Option<Credential>,
    job: CurveJob,
    tx: RunSender,
) {
    let result = backend.curve_image(credential.as_ref(), &job.input).await;
    send(&tx, job.run_id, RunEvent::Curve { index: job.index, result });
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunPhase {
    #[default]
    Idle,
    /// Seeded, unified method not back yet.
    AwaitingMethod,
    /// Unified method in; components may still be arriving.
    Streaming,
    /// Run aborted; the message is shown in place of any result.
    Failed(String),
}

/// Owner of the current run's aggregate.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    run_id: Option<Uuid>,
    inputs: Arc<Vec<ComponentInput>>,
    aggregate: Option<AnalysisAggregate>,
    phase: RunPhase,
    curve_loading: HashMap<usize, bool>,
    notice: Option<String>,
}

impl AnalysisSession {
    /// Seeds a new run and discards the previous one.
    pub fn begin_run(&mut self, inputs: Vec<ComponentInput>) -> (Uuid, Arc<Vec<ComponentInput>>) {
        let run_id = Uuid::new_v4();
        if let Some(previous) = self.run_id {
            debug!("Run {} superseded by {}", previous, run_id);
        }
        self.aggregate = Some(AnalysisAggregate::seed(
            inputs.iter().map(|i| i.display_id.clone()),
        ));
        self.inputs = Arc::new(inputs);
        self.run_id = Some(run_id);
        self.phase = RunPhase::AwaitingMethod;
        self.curve_loading.clear();
        self.notice = None;
        (run_id, Arc::clone(&self.inputs))
    }

    /// Forgets the current run. Its in-flight responses are dropped on arrival.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Applies one message. Returns whether anything changed.
    pub fn apply(&mut self, message: RunMessage) -> bool {
        if self.run_id != Some(message.run_id) {
            debug!("Dropping message from superseded run {}", message.run_id);
            return false;
        }

        match message.event {
            RunEvent::Method(Ok(outcome)) => {
                let Some(aggregate) = self.aggregate.as_mut() else {
                    return false;
                };
                let applied = aggregate.set_unified_method(outcome.method);
                aggregate.merge_references(outcome.references);
                if self.phase == RunPhase::AwaitingMethod {
                    self.phase = RunPhase::Streaming;
                }
                info!("Unified method received for run {}", message.run_id);
                applied
            }
            RunEvent::Method(Err(e)) => {
                error!("Run {} aborted: {}", message.run_id, e);
                self.aggregate = None;
                self.curve_loading.clear();
                self.phase = RunPhase::Failed(e.to_string());
                true
            }
            RunEvent::Component { index, result } => {
                let Some(aggregate) = self.aggregate.as_mut() else {
                    debug!("Ignoring component {} of aborted run", index);
                    return false;
                };
                match result {
                    Ok(outcome) => {
                        let applied = aggregate.resolve_component(
                            index,
                            ComponentResult::Complete(Box::new(outcome.analysis)),
                        );
                        if applied {
                            aggregate.merge_references(outcome.references);
                        }
                        applied
                    }
                    Err(e) => {
                        let Some(display_id) =
                            aggregate.components.get(index).map(|c| c.label().to_string())
                        else {
                            return false;
                        };
                        warn!("{} failed: {}", display_id, e);
                        aggregate.resolve_component(
                            index,
                            ComponentResult::Error { display_id, message: e.to_string() },
                        )
                    }
                }
            }
            RunEvent::Curve { index, result } => {
                self.curve_loading.insert(index, false);
                match result {
                    Ok(image) => self
                        .aggregate
                        .as_mut()
                        .map(|a| a.set_curve_image(index, image))
                        .unwrap_or(false),
                    Err(e) => {
                        warn!("Curve request for component {} failed: {}", index + 1, e);
                        self.notice = Some(e.to_string());
                        true
                    }
                }
            }
        }
    }

    /// Applies everything already waiting on the channel without blocking.
    pub fn apply_pending(&mut self, rx: &mut RunReceiver) -> usize {
        let mut changed = 0;
        while let Ok(message) = rx.try_recv() {
            if self.apply(message) {
                changed += 1;
            }
        }
        changed
    }

    /// Approves a curve request for a `Complete` slot that has no image and no
    /// request in flight, and marks it loading. Anything else is a no-op.
    pub fn request_curve(&mut self, index: usize) -> Option<CurveJob> {
        let run_id = self.run_id?;
        let analysis = self.aggregate.as_ref()?.components.get(index)?.as_complete()?;
        if analysis.physicochemical.ph_log_d.ph_log_d_curve_image.is_some() {
            return None;
        }
        if self.is_curve_loading(index) {
            return None;
        }
        let input = self.inputs.get(index)?.clone();
        self.curve_loading.insert(index, true);
        Some(CurveJob { run_id, index, input })
    }

    pub fn is_curve_loading(&self, index: usize) -> bool {
        self.curve_loading.get(&index).copied().unwrap_or(false)
    }

    pub fn curve_loading_status(&self) -> &HashMap<usize, bool> {
        &self.curve_loading
    }

    pub fn aggregate(&self) -> Option<&AnalysisAggregate> {
        self.aggregate.as_ref()
    }

    pub fn phase(&self) -> &RunPhase {
        &self.phase
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    pub fn inputs(&self) -> &[ComponentInput] {
        &self.inputs
    }

    /// True only while the unified method is outstanding.
    pub fn is_loading(&self) -> bool {
        self.phase == RunPhase::AwaitingMethod
    }

    /// Labels of slots still waiting for their component call.
    pub fn pending_components(&self) -> Vec<&str> {
        self.aggregate
            .iter()
            .flat_map(|a| a.components.iter())
            .filter(|c| c.is_loading())
            .map(|c| c.label())
            .collect()
    }

    /// No request of the current run is still expected to report back.
    pub fn is_settled(&self) -> bool {
        let pending = self.aggregate.as_ref().map(|a| a.pending_count()).unwrap_or(0);
        let curves = self.curve_loading.values().any(|loading| *loading);
        match self.phase {
            RunPhase::Idle | RunPhase::Failed(_) => true,
            RunPhase::AwaitingMethod => false,
            RunPhase::Streaming => pending == 0 && !curves,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analysis::backend::{require_credential, BoxFut};
    use crate::analysis::input::{normalize_inputs, tests::encoded};
    use crate::analysis::schema::tests::{sample_component, sample_method};
    use crate::analysis::schema::Reference;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory backend. Component `i` of `n` finishes after `(n - i) * 5` ms,
    /// so completions arrive in reverse index order.
    #[derive(Default)]
    pub(crate) struct ScriptedBackend {
        pub fail_method: bool,
        pub failing: HashSet<String>,
        pub method_delay_ms: u64,
        pub calls: AtomicUsize,
    }

    impl AnalysisBackend for ScriptedBackend {
        fn unified_method<'a>(
            &'a self,
            credential: Option<&'a Credential>,
            _inputs: &'a [ComponentInput],
        ) -> BoxFut<'a, Result<MethodOutcome, AnalysisError>> {
            Box::pin(async move {
                require_credential(credential)?;
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(self.method_delay_ms)).await;
                if self.fail_method {
                    return Err(AnalysisError::unified_method());
                }
                Ok(MethodOutcome {
                    method: sample_method(),
                    references: vec![Reference { title: "A".into(), uri: "x".into() }],
                })
            })
        }

        fn component_analysis<'a>(
            &'a self,
            credential: Option<&'a Credential>,
            input: &'a ComponentInput,
        ) -> BoxFut<'a, Result<ComponentOutcome, AnalysisError>> {
            Box::pin(async move {
                require_credential(credential)?;
                self.calls.fetch_add(1, Ordering::SeqCst);
                let position: u64 = input
                    .display_id
                    .split_whitespace()
                    .nth(1)
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(1);
                tokio::time::sleep(Duration::from_millis(50u64.saturating_sub(position * 5))).await;
                if self.failing.contains(&input.display_id) {
                    return Err(AnalysisError::component(&input.display_id));
                }
                Ok(ComponentOutcome {
                    analysis: sample_component(&input.display_id),
                    references: vec![
                        Reference { title: format!("B{}", position), uri: "x".into() },
                        Reference { title: input.display_id.clone(), uri: input.display_id.clone() },
                    ],
                })
            })
        }

        fn curve_image<'a>(
            &'a self,
            credential: Option<&'a Credential>,
            input: &'a ComponentInput,
        ) -> BoxFut<'a, Result<String, AnalysisError>> {
            Box::pin(async move {
                require_credential(credential)?;
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.failing.contains(&format!("curve:{}", input.display_id)) {
                    return Err(AnalysisError::curve(&input.display_id));
                }
                Ok(format!("png-of-{}", input.display_id))
            })
        }
    }

    fn key() -> Option<Credential> {
        Credential::new("test-key")
    }

    fn complete(run_id: Uuid, index: usize, id: &str) -> RunMessage {
        RunMessage {
            run_id,
            event: RunEvent::Component {
                index,
                result: Ok(ComponentOutcome {
                    analysis: sample_component(id),
                    references: vec![Reference { title: id.into(), uri: format!("uri:{}", id) }],
                }),
            },
        }
    }

    fn method_ok(run_id: Uuid) -> RunMessage {
        RunMessage {
            run_id,
            event: RunEvent::Method(Ok(MethodOutcome {
                method: sample_method(),
                references: vec![Reference { title: "M".into(), uri: "uri:method".into() }],
            })),
        }
    }

    fn started(smiles: &str, images: usize) -> (AnalysisSession, Uuid) {
        let images: Vec<_> = (0..images).map(|i| encoded(&format!("{}.png", i))).collect();
        let mut session = AnalysisSession::default();
        let (run_id, _) = session.begin_run(normalize_inputs(smiles, &images).unwrap());
        (session, run_id)
    }

    async fn drain_until_settled(session: &mut AnalysisSession, rx: &mut RunReceiver) {
        while !session.is_settled() {
            let Some(message) = rx.recv().await else { break };
            session.apply(message);
        }
    }

    #[test]
    fn test_seed_has_one_loading_slot_per_input_in_order() {
        let (session, _) = started("CCO\nCCN\nCCC", 2);
        let agg = session.aggregate().unwrap();
        assert_eq!(agg.components.len(), 5);
        assert!(agg.components.iter().all(ComponentResult::is_loading));
        let labels: Vec<&str> = agg.components.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Component 1 (SMILES)",
                "Component 2 (SMILES)",
                "Component 3 (SMILES)",
                "Component 4 (image)",
                "Component 5 (image)",
            ]
        );
        assert!(agg.unified_method.is_none());
        assert!(agg.references.is_empty());
        assert!(session.is_loading());
        assert_eq!(session.pending_components(), labels);
    }

    #[test]
    fn test_completion_order_does_not_change_final_aggregate() {
        let ids = ["Component 1 (SMILES)", "Component 2 (SMILES)", "Component 3 (SMILES)"];

        let (mut forward, run_a) = started("A\nB\nC", 0);
        forward.apply(method_ok(run_a));
        for (i, id) in ids.iter().enumerate() {
            forward.apply(complete(run_a, i, id));
        }

        let (mut reverse, run_b) = started("A\nB\nC", 0);
        for (i, id) in ids.iter().enumerate().rev() {
            reverse.apply(complete(run_b, i, id));
        }
        reverse.apply(method_ok(run_b));

        let fwd = forward.aggregate().unwrap();
        let rev = reverse.aggregate().unwrap();
        assert_eq!(fwd.components, rev.components);
        assert_eq!(fwd.unified_method, rev.unified_method);
        let mut fwd_refs: Vec<_> = fwd.references.iter().cloned().map(|r| r.uri).collect();
        let mut rev_refs: Vec<_> = rev.references.iter().cloned().map(|r| r.uri).collect();
        fwd_refs.sort();
        rev_refs.sort();
        assert_eq!(fwd_refs, rev_refs);
        assert!(forward.is_settled() && reverse.is_settled());
    }

    #[test]
    fn test_component_failure_is_isolated() {
        let (mut session, run_id) = started("A\nB\nC", 0);
        session.apply(method_ok(run_id));
        session.apply(complete(run_id, 0, "Component 1 (SMILES)"));
        session.apply(RunMessage {
            run_id,
            event: RunEvent::Component {
                index: 1,
                result: Err(AnalysisError::component("Component 2 (SMILES)")),
            },
        });
        session.apply(complete(run_id, 2, "Component 3 (SMILES)"));

        let agg = session.aggregate().unwrap();
        assert!(agg.components[0].as_complete().is_some());
        assert!(agg.components[2].as_complete().is_some());
        match &agg.components[1] {
            ComponentResult::Error { display_id, message } => {
                assert_eq!(display_id, "Component 2 (SMILES)");
                assert!(message.contains("Component 2 (SMILES)"));
            }
            other => panic!("expected error slot, got {:?}", other),
        }
        assert!(agg.unified_method.is_some());
        assert_eq!(agg.references.len(), 3);
        assert_eq!(session.phase(), &RunPhase::Streaming);
    }

    #[test]
    fn test_method_failure_aborts_whole_run() {
        let (mut session, run_id) = started("A\nB", 0);
        session.apply(complete(run_id, 0, "Component 1 (SMILES)"));
        session.apply(RunMessage { run_id, event: RunEvent::Method(Err(AnalysisError::unified_method())) });

        assert!(session.aggregate().is_none());
        match session.phase() {
            RunPhase::Failed(message) => assert!(!message.is_empty()),
            other => panic!("expected failed phase, got {:?}", other),
        }
        assert!(!session.apply(complete(run_id, 1, "Component 2 (SMILES)")));
        assert!(session.aggregate().is_none());
        assert!(session.is_settled());
    }

    #[test]
    fn test_superseded_run_messages_are_dropped() {
        let (mut session, old_run) = started("A", 0);
        let (new_run, _) = session.begin_run(normalize_inputs("B\nC", &[]).unwrap());
        assert_ne!(old_run, new_run);
        assert!(!session.apply(complete(old_run, 0, "Component 1 (SMILES)")));
        assert!(!session.apply(method_ok(old_run)));
        let agg = session.aggregate().unwrap();
        assert_eq!(agg.components.len(), 2);
        assert!(agg.components.iter().all(ComponentResult::is_loading));
        assert!(agg.unified_method.is_none());
    }

    #[test]
    fn test_curve_request_guarded_until_complete() {
        let (mut session, run_id) = started("A\nB", 0);
        assert!(session.request_curve(0).is_none());
        session.apply(RunMessage {
            run_id,
            event: RunEvent::Component { index: 1, result: Err(AnalysisError::component("x")) },
        });
        assert!(session.request_curve(1).is_none());
        assert!(session.request_curve(9).is_none());
        assert!(session.curve_loading_status().is_empty());

        session.apply(complete(run_id, 0, "Component 1 (SMILES)"));
        let job = session.request_curve(0).unwrap();
        assert_eq!(job.index, 0);
        assert_eq!(job.input.display_id, "Component 1 (SMILES)");
        assert!(session.is_curve_loading(0));
        assert!(session.request_curve(0).is_none(), "second request while loading");
    }

    #[test]
    fn test_curve_result_patches_only_its_image() {
        let (mut session, run_id) = started("A\nB", 0);
        session.apply(method_ok(run_id));
        session.apply(complete(run_id, 0, "Component 1 (SMILES)"));
        session.apply(complete(run_id, 1, "Component 2 (SMILES)"));
        let before = session.aggregate().unwrap().clone();

        session.request_curve(1).unwrap();
        session.apply(RunMessage { run_id, event: RunEvent::Curve { index: 1, result: Ok("png".into()) } });

        let after = session.aggregate().unwrap();
        assert!(!session.is_curve_loading(1));
        assert_eq!(after.components[0], before.components[0]);
        assert_eq!(after.unified_method, before.unified_method);
        assert_eq!(after.references, before.references);
        let patched = after.components[1].as_complete().unwrap();
        let original = before.components[1].as_complete().unwrap();
        assert_eq!(patched.physicochemical.ph_log_d.ph_log_d_curve_image.as_deref(), Some("png"));
        assert_eq!(patched.basic_profile, original.basic_profile);
        assert_eq!(patched.toxicology, original.toxicology);
        assert!(session.request_curve(1).is_none(), "image already present");
    }

    #[test]
    fn test_curve_failure_sets_notice_and_keeps_slot() {
        let (mut session, run_id) = started("A", 0);
        session.apply(method_ok(run_id));
        session.apply(complete(run_id, 0, "Component 1 (SMILES)"));
        let before = session.aggregate().unwrap().clone();

        session.request_curve(0).unwrap();
        session.apply(RunMessage {
            run_id,
            event: RunEvent::Curve { index: 0, result: Err(AnalysisError::curve("Component 1 (SMILES)")) },
        });

        assert!(!session.is_curve_loading(0));
        assert!(session.notice().unwrap().contains("pH-logD"));
        assert_eq!(session.aggregate().unwrap(), &before);
        assert!(session.request_curve(0).is_some(), "may retry after failure");
    }

    #[tokio::test]
    async fn test_end_to_end_two_smiles() {
        let backend: Arc<dyn AnalysisBackend> = Arc::new(ScriptedBackend::default());
        let (tx, mut rx) = run_channel();
        let mut session = AnalysisSession::default();
        let (run_id, inputs) = session.begin_run(normalize_inputs("CCO\nCC(=O)O", &[]).unwrap());

        dispatch_run(Arc::clone(&backend), key(), inputs, run_id, tx.clone()).await;
        drain_until_settled(&mut session, &mut rx).await;

        let agg = session.aggregate().unwrap();
        assert!(agg.unified_method.is_some());
        let ids: Vec<&str> = agg
            .components
            .iter()
            .map(|c| c.as_complete().unwrap().component_id.as_str())
            .collect();
        assert_eq!(ids, vec!["Component 1 (SMILES)", "Component 2 (SMILES)"]);
        let uris: Vec<&str> = agg.references.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris.iter().filter(|u| **u == "x").count(), 1);
        assert_eq!(agg.references.len(), 3);
    }

    #[tokio::test]
    async fn test_dispatch_returns_before_components_finish() {
        let backend: Arc<dyn AnalysisBackend> = Arc::new(ScriptedBackend::default());
        let (tx, mut rx) = run_channel();
        let mut session = AnalysisSession::default();
        let (run_id, inputs) = session.begin_run(normalize_inputs("A\nB\nC", &[]).unwrap());

        dispatch_run(backend, key(), inputs, run_id, tx).await;
        session.apply_pending(&mut rx);

        assert!(!session.is_loading());
        assert!(session.aggregate().unwrap().unified_method.is_some());
        assert!(session.aggregate().unwrap().pending_count() > 0);

        drain_until_settled(&mut session, &mut rx).await;
        assert_eq!(session.aggregate().unwrap().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_method_failure_clears_run() {
        let backend: Arc<dyn AnalysisBackend> = Arc::new(ScriptedBackend {
            fail_method: true,
            method_delay_ms: 100,
            ..ScriptedBackend::default()
        });
        let (tx, mut rx) = run_channel();
        let mut session = AnalysisSession::default();
        let (run_id, inputs) = session.begin_run(normalize_inputs("CCO\nCCN", &[]).unwrap());

        dispatch_run(backend, key(), inputs, run_id, tx).await;
        drain_until_settled(&mut session, &mut rx).await;

        assert!(session.aggregate().is_none());
        assert!(matches!(session.phase(), RunPhase::Failed(m) if !m.is_empty()));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_run_without_calls() {
        let scripted = Arc::new(ScriptedBackend::default());
        let backend: Arc<dyn AnalysisBackend> = scripted.clone();
        let (tx, mut rx) = run_channel();
        let mut session = AnalysisSession::default();
        let (run_id, inputs) = session.begin_run(normalize_inputs("CCO", &[]).unwrap());

        dispatch_run(backend, None, inputs, run_id, tx).await;
        drain_until_settled(&mut session, &mut rx).await;

        assert_eq!(scripted.calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.phase(), &RunPhase::Failed(AnalysisError::Auth.to_string()));
    }

    #[tokio::test]
    async fn test_curve_round_trip_through_channel() {
        let backend: Arc<dyn AnalysisBackend> = Arc::new(ScriptedBackend::default());
        let (tx, mut rx) = run_channel();
        let mut session = AnalysisSession::default();
        let (run_id, inputs) = session.begin_run(normalize_inputs("CCO", &[]).unwrap());
        dispatch_run(Arc::clone(&backend), key(), inputs, run_id, tx.clone()).await;
        drain_until_settled(&mut session, &mut rx).await;

        let job = session.request_curve(0).unwrap();
        dispatch_curve(backend, key(), job, tx).await;
        drain_until_settled(&mut session, &mut rx).await;

        let analysis = session.aggregate().unwrap().components[0].as_complete().unwrap();
        assert_eq!(
            analysis.physicochemical.ph_log_d.ph_log_d_curve_image.as_deref(),
            Some("png-of-Component 1 (SMILES)")
        );
        assert!(!session.is_curve_loading(0));
    }
}
