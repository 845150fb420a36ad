// src/analysis/prompt.rs
// Prompt text for the three request kinds. The wording is not load-bearing;
// the response shape is enforced by the schemas in `schema.rs`.

use super::input::{ComponentInput, ComponentSource};

pub fn system_instruction(output_language: &str) -> String {
    format!(
        "You are a multi-component chromatographic method development system. \
         You receive a set of chemical structures as SMILES strings and/or structure images.\n\
         Rules:\n\
         1. Unified method first: weigh the differences between all components (hydrophobicity, pKa, volatility) \
            and propose one robust HPLC or GC method that separates all of them, with stationary phase, \
            mobile phase, gradient program and detector.\n\
         2. When asked about a single component, analyse only that component.\n\
         3. Write every text field in professional scientific {language}.\n\
         4. Use plain text for symbols (pH, logD, pKa, [M+H]+, TD50). Write formulas as C10H12O2, \
            without subscripts, braces or '$'. Give IUPAC names as 'English Name (Chinese name)', \
            for example 'Aspirin (阿司匹林)'.\n\
         5. Do not include design-of-experiments or method optimisation content.\n\
         6. Follow the requested JSON structure exactly.",
        language = output_language
    )
}

fn describe_inputs(inputs: &[ComponentInput]) -> String {
    let mut smiles = Vec::new();
    let mut images = Vec::new();
    for input in inputs {
        match &input.source {
            ComponentSource::Smiles(s) => smiles.push(format!("- {}: {}", input.display_id, s)),
            ComponentSource::Image(_) => images.push(format!("- {}", input.display_id)),
        }
    }
    let mut text = String::new();
    if !smiles.is_empty() {
        text.push_str("SMILES components (one per line):\n");
        text.push_str(&smiles.join("\n"));
        text.push('\n');
    }
    if !images.is_empty() {
        text.push_str(&format!(
            "Structure images, attached in this order ({}):\n",
            images.len()
        ));
        text.push_str(&images.join("\n"));
        text.push('\n');
    }
    text
}

pub fn unified_method_prompt(inputs: &[ComponentInput]) -> String {
    format!(
        "Develop one unified chromatographic separation method for all of the following components. \
         Return only the unified method.\n{}",
        describe_inputs(inputs)
    )
}

pub fn component_prompt(input: &ComponentInput) -> String {
    let subject = match &input.source {
        ComponentSource::Smiles(s) => format!("the structure with SMILES {}", s),
        ComponentSource::Image(_) => "the structure shown in the attached image".to_string(),
    };
    format!(
        "Provide a detailed analysis report for {subject}. Use \"{id}\" as componentId. \
         Cover the basic profile, pH-logD behaviour with pKa points, 1H-NMR and MS predictions, \
         isomer and tautomer analysis, and toxicology (ICH M7, TD50, nitrosamine CPCA).",
        subject = subject,
        id = input.display_id
    )
}

pub fn curve_prompt(input: &ComponentInput) -> String {
    let subject = match &input.source {
        ComponentSource::Smiles(s) => format!("the compound with SMILES {}", s),
        ComponentSource::Image(_) => "the compound shown in the attached image".to_string(),
    };
    format!(
        "Using Python and matplotlib, plot the logD curve of {} over pH 1.0 to 14.0. \
         Mark each pKa point on the curve, label both axes and render the figure as a PNG.",
        subject
    )
}

/// Appended to the prompt when the schema cannot be sent as structured-output
/// configuration (search grounding enabled).
pub fn inline_schema_instruction(schema: &serde_json::Value) -> String {
    format!(
        "\n\nRespond with a single JSON object, without commentary, matching this schema:\n{}",
        schema
    )
}
