// src/ui/view.rs
// What the results panel shows, derived from the session alone. Shared by the
// egui panel and the headless text report, and free of any egui types.

use crate::analysis::aggregate::ComponentResult;
use crate::analysis::run::{AnalysisSession, RunPhase};
use crate::analysis::schema::{ComponentAnalysis, Reference, UnifiedMethod};

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: &'static str,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CurveView {
    /// Base64 PNG.
    Image(String),
    Button { loading: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardView {
    Pending { label: String },
    Failed { label: String, message: String },
    Ready { index: usize, label: String, sections: Vec<Section>, curve: CurveView },
}

impl CardView {
    pub fn label(&self) -> &str {
        match self {
            CardView::Pending { label } | CardView::Failed { label, .. } | CardView::Ready { label, .. } => label,
        }
    }
}

/// One component: its report comes before the method. Several: method first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Single,
    Multi,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Idle,
    Failed { message: String },
    /// Every slot gets a card from the moment the run starts. `method` stays
    /// `None` until the unified method arrives.
    Report {
        layout: Layout,
        method: Option<Vec<Row>>,
        cards: Vec<CardView>,
        references: Vec<Reference>,
    },
}

fn row(label: &'static str, value: impl Into<String>) -> Row {
    Row { label, value: value.into() }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

pub fn method_rows(method: &UnifiedMethod) -> Vec<Row> {
    vec![
        row("Summary", method.summary.as_str()),
        row("Technique", method.technique.recommendation.as_str()),
        row("Justification", method.technique.justification.as_str()),
        row("Stationary phase", method.stationary_phase.recommendation.as_str()),
        row("Pump A", method.mobile_phase.pump_a.as_str()),
        row("Pump B", method.mobile_phase.pump_b.as_str()),
        row("pH range", method.mobile_phase.ph_range.as_str()),
        row("Gradient", method.mobile_phase.gradient.as_str()),
        row("Detector", method.detector.recommendation.as_str()),
        row("Detector settings", method.detector.settings.as_str()),
    ]
}

pub fn component_sections(analysis: &ComponentAnalysis) -> Vec<Section> {
    let profile = &analysis.basic_profile;
    let physchem = &analysis.physicochemical;
    let structure = &analysis.structure_analysis;
    let tox = &analysis.toxicology;
    vec![
        Section {
            title: "Basic profile",
            rows: vec![
                row("Formula", profile.formula.as_str()),
                row("Molecular weight", format!("{:.2}", profile.molecular_weight)),
                row("IUPAC name", profile.iupac_name.as_str()),
                row("Chinese name", profile.chinese_name.as_str()),
                row("CAS number", profile.cas_number.as_str()),
            ],
        },
        Section {
            title: "Physicochemical & spectra",
            rows: vec![
                row("pH-logD trend", physchem.ph_log_d.trend_description.as_str()),
                row("pKa points", physchem.ph_log_d.pka_points.as_str()),
                row("1H-NMR", physchem.nmr.prediction.as_str()),
                row("MS", physchem.ms.prediction.as_str()),
            ],
        },
        Section {
            title: "Structure analysis",
            rows: vec![
                row("Chiral centers", structure.isomers.chiral_centers.as_str()),
                row("Geometric isomers", structure.isomers.geometric_isomers.as_str()),
                row("Separation notes", structure.isomers.separation_notes.as_str()),
                row("Tautomers", yes_no(structure.tautomers.has_tautomers)),
                row("Tautomer description", structure.tautomers.description.as_str()),
                row("Chromatographic effects", structure.tautomers.chromatographic_effects.as_str()),
            ],
        },
        Section {
            title: "Toxicology",
            rows: vec![
                row("ICH M7 alerts", tox.ich_m7.alerts.as_str()),
                row("ICH M7 class", tox.ich_m7.classification.as_str()),
                row("TD50", tox.td50.value.as_str()),
                row("TD50 source", tox.td50.source.as_str()),
                row("Acceptable intake", tox.td50.ai.as_str()),
                row("Nitrosamine", yes_no(tox.nitrosamine.is_nitrosamine)),
                row("CPCA class", tox.nitrosamine.cpca_class.as_str()),
                row("AI limit", tox.nitrosamine.ai_limit.as_str()),
                row("Guideline", tox.nitrosamine.guideline_reference.as_str()),
            ],
        },
    ]
}

fn card(session: &AnalysisSession, index: usize, slot: &ComponentResult) -> CardView {
    match slot {
        ComponentResult::Loading { display_id } => CardView::Pending { label: display_id.clone() },
        ComponentResult::Error { display_id, message } => CardView::Failed {
            label: display_id.clone(),
            message: message.clone(),
        },
        ComponentResult::Complete(analysis) => {
            let curve = match &analysis.physicochemical.ph_log_d.ph_log_d_curve_image {
                Some(image) => CurveView::Image(image.clone()),
                None => CurveView::Button { loading: session.is_curve_loading(index) },
            };
            CardView::Ready {
                index,
                label: analysis.component_id.clone(),
                sections: component_sections(analysis),
                curve,
            }
        }
    }
}

pub fn results_view(session: &AnalysisSession) -> ResultsView {
    if let RunPhase::Failed(message) = session.phase() {
        return ResultsView::Failed { message: message.clone() };
    }
    let Some(aggregate) = session.aggregate() else {
        return ResultsView::Idle;
    };
    let layout = if aggregate.components.len() == 1 { Layout::Single } else { Layout::Multi };
    ResultsView::Report {
        layout,
        method: aggregate.unified_method.as_ref().map(method_rows),
        cards: aggregate
            .components
            .iter()
            .enumerate()
            .map(|(index, slot)| card(session, index, slot))
            .collect(),
        references: aggregate.references.iter().cloned().collect(),
    }
}
