// src/analysis/schema.rs
//! Shared response types and the JSON schemas requested from the service.
//!
//! The field tables below are the only description of the response shapes.
//! Every request builder takes its `responseSchema` from here, and the serde
//! types mirror the same tables (checked by the skeleton tests at the bottom).

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use self::FieldKind::{Choice, Flag, Number, Object, Text};

// ============================================================================
// Unified method
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechniqueChoice {
    /// Usually "HPLC" or "GC". Grounded answers are not held to the schema
    /// enum, so any text ("RP-HPLC", "UHPLC") is kept as returned.
    pub recommendation: String,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationaryPhase {
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobilePhase {
    pub pump_a: String,
    pub pump_b: String,
    pub ph_range: String,
    pub gradient: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorSettings {
    pub recommendation: String,
    pub settings: String,
}

/// The single chromatographic protocol proposed for all components of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedMethod {
    pub summary: String,
    pub technique: TechniqueChoice,
    pub stationary_phase: StationaryPhase,
    pub mobile_phase: MobilePhase,
    pub detector: DetectorSettings,
}

// ============================================================================
// Per-component analysis
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicProfile {
    pub formula: String,
    pub molecular_weight: f64,
    pub iupac_name: String,
    #[serde(default)]
    pub chinese_name: String,
    #[serde(default)]
    pub cas_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhLogD {
    pub trend_description: String,
    /// Base64 PNG, filled in by a separate on-demand request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph_log_d_curve_image: Option<String>,
    pub pka_points: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrumPrediction {
    pub prediction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Physicochemical {
    pub ph_log_d: PhLogD,
    pub nmr: SpectrumPrediction,
    pub ms: SpectrumPrediction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Isomers {
    pub chiral_centers: String,
    pub geometric_isomers: String,
    pub separation_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tautomers {
    pub has_tautomers: bool,
    pub description: String,
    pub chromatographic_effects: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureAnalysis {
    pub isomers: Isomers,
    pub tautomers: Tautomers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IchM7 {
    pub alerts: String,
    pub classification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Td50 {
    pub value: String,
    #[serde(default)]
    pub source: String,
    pub ai: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nitrosamine {
    pub is_nitrosamine: bool,
    pub cpca_class: String,
    pub ai_limit: String,
    #[serde(default)]
    pub guideline_reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toxicology {
    pub ich_m7: IchM7,
    pub td50: Td50,
    pub nitrosamine: Nitrosamine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentAnalysis {
    pub component_id: String,
    pub basic_profile: BasicProfile,
    pub physicochemical: Physicochemical,
    pub structure_analysis: StructureAnalysis,
    pub toxicology: Toxicology,
}

/// A citation attached to a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub uri: String,
}

// ============================================================================
// Field tables
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Number,
    Flag,
    Choice(&'static [&'static str]),
    Object(&'static [Field]),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: Option<&'static str>,
}

const fn field(name: &'static str, kind: FieldKind) -> Field {
    Field { name, kind, description: None }
}

const fn described(name: &'static str, kind: FieldKind, description: &'static str) -> Field {
    Field { name, kind, description: Some(description) }
}

const RECOMMENDATION_ONLY: &[Field] = &[field("recommendation", Text)];
const PREDICTION_ONLY: &[Field] = &[field("prediction", Text)];
const TECHNIQUE_OPTIONS: &[&str] = &["HPLC", "GC"];

const TECHNIQUE_FIELDS: &[Field] = &[
    field("recommendation", Choice(TECHNIQUE_OPTIONS)),
    field("justification", Text),
];

const MOBILE_PHASE_FIELDS: &[Field] = &[
    field("pumpA", Text),
    field("pumpB", Text),
    field("phRange", Text),
    described(
        "gradient",
        Text,
        "Recommended gradient program, e.g. '10% B to 90% B linearly over 20 min'.",
    ),
];

const DETECTOR_FIELDS: &[Field] = &[field("recommendation", Text), field("settings", Text)];

pub const UNIFIED_METHOD_FIELDS: &[Field] = &[
    described(
        "summary",
        Text,
        "Overall strategy able to separate every submitted component.",
    ),
    field("technique", Object(TECHNIQUE_FIELDS)),
    field("stationaryPhase", Object(RECOMMENDATION_ONLY)),
    field("mobilePhase", Object(MOBILE_PHASE_FIELDS)),
    field("detector", Object(DETECTOR_FIELDS)),
];

const BASIC_PROFILE_FIELDS: &[Field] = &[
    described("formula", Text, "Molecular formula in plain text, e.g. C10H12O2."),
    described("molecularWeight", Number, "Exact molecular weight."),
    described("iupacName", Text, "IUPAC name in the form 'English Name (Chinese name)'."),
    field("chineseName", Text),
    described("casNumber", Text, "CAS Registry Number, or 'N/A'."),
];

// phLogDCurveImage is generated on demand and never requested here.
const PH_LOG_D_FIELDS: &[Field] = &[
    described("trendDescription", Text, "How hydrophobicity changes across pH 1-14."),
    described("pkaPoints", Text, "Identified pKa values."),
];

const PHYSICOCHEMICAL_FIELDS: &[Field] = &[
    field("phLogD", Object(PH_LOG_D_FIELDS)),
    field("nmr", Object(PREDICTION_ONLY)),
    field("ms", Object(PREDICTION_ONLY)),
];

const ISOMER_FIELDS: &[Field] = &[
    field("chiralCenters", Text),
    field("geometricIsomers", Text),
    field("separationNotes", Text),
];

const TAUTOMER_FIELDS: &[Field] = &[
    field("hasTautomers", Flag),
    field("description", Text),
    field("chromatographicEffects", Text),
];

const STRUCTURE_FIELDS: &[Field] = &[
    field("isomers", Object(ISOMER_FIELDS)),
    field("tautomers", Object(TAUTOMER_FIELDS)),
];

const ICH_M7_FIELDS: &[Field] = &[field("alerts", Text), field("classification", Text)];

const TD50_FIELDS: &[Field] = &[
    field("value", Text),
    described("source", Text, "Data source, e.g. CPDB."),
    field("ai", Text),
];

const NITROSAMINE_FIELDS: &[Field] = &[
    field("isNitrosamine", Flag),
    field("cpcaClass", Text),
    field("aiLimit", Text),
    described("guidelineReference", Text, "Guideline, e.g. EMA/CHMP/SWP/44272/2019."),
];

const TOXICOLOGY_FIELDS: &[Field] = &[
    field("ichM7", Object(ICH_M7_FIELDS)),
    field("td50", Object(TD50_FIELDS)),
    field("nitrosamine", Object(NITROSAMINE_FIELDS)),
];

pub const COMPONENT_FIELDS: &[Field] = &[
    described("componentId", Text, "Identifier of the component, copied from the request."),
    field("basicProfile", Object(BASIC_PROFILE_FIELDS)),
    field("physicochemical", Object(PHYSICOCHEMICAL_FIELDS)),
    field("structureAnalysis", Object(STRUCTURE_FIELDS)),
    field("toxicology", Object(TOXICOLOGY_FIELDS)),
];

fn kind_to_schema(kind: FieldKind) -> Value {
    match kind {
        Text => json!({ "type": "STRING" }),
        Number => json!({ "type": "NUMBER" }),
        Flag => json!({ "type": "BOOLEAN" }),
        Choice(options) => json!({ "type": "STRING", "enum": options }),
        Object(fields) => object_schema(fields),
    }
}

/// Gemini response schema (OpenAPI subset) for a field table. Every field is
/// required.
pub fn object_schema(fields: &[Field]) -> Value {
    let mut properties = Map::new();
    for f in fields {
        let mut node = kind_to_schema(f.kind);
        if let (Some(description), Value::Object(map)) = (f.description, &mut node) {
            map.insert("description".to_string(), Value::String(description.to_string()));
        }
        properties.insert(f.name.to_string(), node);
    }
    let required: Vec<&str> = fields.iter().map(|f| f.name).collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

pub fn unified_method_schema() -> Value {
    object_schema(UNIFIED_METHOD_FIELDS)
}

pub fn component_schema() -> Value {
    object_schema(COMPONENT_FIELDS)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal instance accepted by the schema: empty strings, zeros, `false`,
    /// first enum option.
    fn skeleton(fields: &[Field]) -> Value {
        let mut map = Map::new();
        for f in fields {
            let value = match f.kind {
                Text => json!(""),
                Number => json!(0.0),
                Flag => json!(false),
                Choice(options) => json!(options[0]),
                Object(inner) => skeleton(inner),
            };
            map.insert(f.name.to_string(), value);
        }
        Value::Object(map)
    }

    pub(crate) fn sample_method() -> UnifiedMethod {
        UnifiedMethod {
            summary: "Reversed-phase gradient".into(),
            technique: TechniqueChoice {
                recommendation: "HPLC".into(),
                justification: "Polar, non-volatile analytes".into(),
            },
            stationary_phase: StationaryPhase { recommendation: "C18, 150 x 4.6 mm, 5 um".into() },
            mobile_phase: MobilePhase {
                pump_a: "0.1% formic acid in water".into(),
                pump_b: "Acetonitrile".into(),
                ph_range: "2.5-3.0".into(),
                gradient: "5% B to 60% B over 15 min".into(),
            },
            detector: DetectorSettings { recommendation: "UV".into(), settings: "210 nm".into() },
        }
    }

    pub(crate) fn sample_component(id: &str) -> ComponentAnalysis {
        let mut value = skeleton(COMPONENT_FIELDS);
        value["componentId"] = json!(id);
        value["basicProfile"]["formula"] = json!(format!("formula of {}", id));
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unified_skeleton_matches_type() {
        let method: UnifiedMethod = serde_json::from_value(skeleton(UNIFIED_METHOD_FIELDS)).unwrap();
        assert_eq!(method.technique.recommendation, "HPLC");
    }

    #[test]
    fn test_free_text_technique_is_kept() {
        let mut value = skeleton(UNIFIED_METHOD_FIELDS);
        value["technique"]["recommendation"] = json!("RP-HPLC");
        let method: UnifiedMethod = serde_json::from_value(value).unwrap();
        assert_eq!(method.technique.recommendation, "RP-HPLC");
    }

    #[test]
    fn test_component_skeleton_matches_type() {
        let analysis: ComponentAnalysis = serde_json::from_value(skeleton(COMPONENT_FIELDS)).unwrap();
        assert!(analysis.physicochemical.ph_log_d.ph_log_d_curve_image.is_none());
        assert!(!analysis.toxicology.nitrosamine.is_nitrosamine);
    }

    #[test]
    fn test_type_serializes_back_to_schema_keys() {
        let value = serde_json::to_value(sample_method()).unwrap();
        assert_eq!(value["mobilePhase"]["pumpA"], "0.1% formic acid in water");
        assert_eq!(value["technique"]["recommendation"], "HPLC");
        let component = serde_json::to_value(sample_component("Component 1 (SMILES)")).unwrap();
        assert!(component["physicochemical"]["phLogD"].get("phLogDCurveImage").is_none());
    }

    #[test]
    fn test_component_schema_omits_curve_image() {
        let schema = component_schema();
        let ph = &schema["properties"]["physicochemical"]["properties"]["phLogD"];
        assert!(ph["properties"].get("phLogDCurveImage").is_none());
        assert_eq!(ph["required"], json!(["trendDescription", "pkaPoints"]));
    }

    #[test]
    fn test_choice_becomes_enum() {
        let schema = unified_method_schema();
        assert_eq!(
            schema["properties"]["technique"]["properties"]["recommendation"]["enum"],
            json!(["HPLC", "GC"])
        );
        assert_eq!(schema["properties"]["summary"]["type"], "STRING");
        assert!(schema["properties"]["summary"]["description"].is_string());
    }
}
