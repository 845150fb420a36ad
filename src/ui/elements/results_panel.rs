// src/ui/elements/results_panel.rs
use bevy::prelude::*;
use bevy_egui::egui;

use crate::analysis::events::RequestCurveImage;
use crate::analysis::run::AnalysisSession;
use crate::ui::curve_cache::CurveTextureCache;
use crate::ui::view::{results_view, CardView, CurveView, Layout, ResultsView, Row, Section};

const CURVE_MAX_WIDTH: f32 = 480.0;

fn show_rows(ui: &mut egui::Ui, id: impl std::hash::Hash, rows: &[Row]) {
    egui::Grid::new(id)
        .num_columns(2)
        .striped(true)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for row in rows {
                ui.strong(row.label);
                ui.add(egui::Label::new(row.value.as_str()).wrap());
                ui.end_row();
            }
        });
}

fn show_method(ui: &mut egui::Ui, rows: Option<&[Row]>, session: &AnalysisSession) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.heading("Unified method");
        match rows {
            Some(rows) => show_rows(ui, "unified_method_grid", rows),
            None => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!(
                        "Developing a unified method… ({} component(s) still running)",
                        session.pending_components().len()
                    ));
                });
            }
        }
    });
}

fn show_sections(ui: &mut egui::Ui, index: usize, sections: &[Section]) {
    for section in sections {
        egui::CollapsingHeader::new(section.title)
            .id_salt(("component_section", index, section.title))
            .default_open(true)
            .show(ui, |ui| show_rows(ui, ("component_grid", index, section.title), &section.rows));
    }
}

fn show_card(
    ui: &mut egui::Ui,
    card: &CardView,
    session: &AnalysisSession,
    cache: &mut CurveTextureCache,
    curve_writer: &mut EventWriter<RequestCurveImage>,
) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.heading(card.label());
        match card {
            CardView::Pending { .. } => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Analyzing…");
                });
            }
            CardView::Failed { message, .. } => {
                ui.colored_label(egui::Color32::RED, message);
            }
            CardView::Ready { index, sections, curve, .. } => {
                show_sections(ui, *index, sections);
                ui.separator();
                match curve {
                    CurveView::Image(data) => {
                        let texture = session
                            .run_id()
                            .and_then(|run_id| cache.texture(ui.ctx(), run_id, *index, data));
                        match texture {
                            Some(texture) => {
                                ui.add(egui::Image::new(texture).max_width(CURVE_MAX_WIDTH));
                            }
                            None => {
                                ui.colored_label(egui::Color32::RED, "The curve image could not be displayed.");
                            }
                        }
                    }
                    CurveView::Button { loading: true } => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Generating pH-logD curve…");
                        });
                    }
                    CurveView::Button { loading: false } => {
                        if ui.button("Generate pH-logD curve").clicked() {
                            curve_writer.write(RequestCurveImage { index: *index });
                        }
                    }
                }
            }
        }
    });
}

pub fn show_results_panel(
    ui: &mut egui::Ui,
    session: &AnalysisSession,
    cache: &mut CurveTextureCache,
    curve_writer: &mut EventWriter<RequestCurveImage>,
) {
    match results_view(session) {
        ResultsView::Idle => {
            ui.centered_and_justified(|ui| {
                ui.label("Enter SMILES strings or choose structure images, then press Analyze.");
            });
        }
        ResultsView::Failed { message } => {
            ui.colored_label(egui::Color32::RED, message);
        }
        ResultsView::Report { layout, method, cards, references } => {
            egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                match layout {
                    Layout::Single => {
                        for card in &cards {
                            show_card(ui, card, session, cache, curve_writer);
                        }
                        show_method(ui, method.as_deref(), session);
                    }
                    Layout::Multi => {
                        show_method(ui, method.as_deref(), session);
                        for card in &cards {
                            show_card(ui, card, session, cache, curve_writer);
                        }
                    }
                }
                if !references.is_empty() {
                    ui.separator();
                    ui.heading("References");
                    for reference in &references {
                        ui.hyperlink_to(reference.title.as_str(), reference.uri.as_str());
                    }
                }
            });
        }
    }
}
