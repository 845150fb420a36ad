// src/cli/report.rs
// Plain-text rendering of the results view for the terminal.

use std::fmt::Write as _;

use crate::ui::view::{CardView, CurveView, Layout, ResultsView, Row};

fn push_rows(out: &mut String, rows: &[Row], indent: &str) {
    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
    for row in rows {
        let _ = writeln!(out, "{}{:<width$}  {}", indent, row.label, row.value, width = width);
    }
}

fn push_method(out: &mut String, rows: Option<&[Row]>) {
    out.push_str("=== Unified method ===\n");
    match rows {
        Some(rows) => push_rows(out, rows, "  "),
        None => out.push_str("  (no result)\n"),
    }
    out.push('\n');
}

fn push_card(out: &mut String, card: &CardView) {
    let _ = writeln!(out, "=== {} ===", card.label());
    match card {
        CardView::Pending { .. } => out.push_str("  (no result)\n"),
        CardView::Failed { message, .. } => {
            let _ = writeln!(out, "  Error: {}", message);
        }
        CardView::Ready { sections, curve, .. } => {
            for section in sections {
                let _ = writeln!(out, "  -- {} --", section.title);
                push_rows(out, &section.rows, "    ");
            }
            match curve {
                CurveView::Image(data) => {
                    let _ = writeln!(out, "  pH-logD curve: PNG, {} base64 characters", data.len());
                }
                CurveView::Button { .. } => out.push_str("  pH-logD curve: not requested\n"),
            }
        }
    }
    out.push('\n');
}

pub fn render_report(view: &ResultsView) -> String {
    let mut out = String::new();
    match view {
        ResultsView::Idle => out.push_str("No analysis.\n"),
        ResultsView::Failed { message } => {
            let _ = writeln!(out, "Error: {}", message);
        }
        ResultsView::Report { layout, method, cards, references } => {
            match layout {
                Layout::Single => {
                    cards.iter().for_each(|c| push_card(&mut out, c));
                    push_method(&mut out, method.as_deref());
                }
                Layout::Multi => {
                    push_method(&mut out, method.as_deref());
                    cards.iter().for_each(|c| push_card(&mut out, c));
                }
            }
            if !references.is_empty() {
                out.push_str("=== References ===\n");
                for (i, reference) in references.iter().enumerate() {
                    let _ = writeln!(out, "  [{}] {} <{}>", i + 1, reference.title, reference.uri);
                }
            }
        }
    }
    out
}
