//! egui renderer for the prediction form.
use eframe::egui::{self, Frame, Margin, RichText, Ui, Vec2};

use crate::egui_app::controller::PredictorController;
use crate::egui_app::style;
use crate::egui_app::view_model;
use crate::form::{
    MAX_CGPA, MAX_MID_MARKS, MAX_QUIZ_SCORE, MAX_STUDY_HOURS, MAX_SUBJECTS, MIN_SUBJECTS,
    SubjectMarks,
};
use crate::model::{Prediction, PredictionService};

/// Minimum window size that keeps the form and the sidebar readable.
pub const MIN_VIEWPORT_SIZE: Vec2 = Vec2::new(720.0, 560.0);

/// Renders the form, the model summary and the latest prediction.
pub struct GradecastApp {
    controller: PredictorController,
    visuals_set: bool,
}

impl GradecastApp {
    pub fn new(service: PredictionService) -> Self {
        Self {
            controller: PredictorController::new(service),
            visuals_set: false,
        }
    }

    fn ensure_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn render_sidebar(&self, ui: &mut Ui) {
        let palette = style::palette();
        ui.add_space(8.0);
        ui.heading("Model Performance");
        ui.add_space(8.0);
        let Some(models) = self.controller.models() else {
            ui.label(RichText::new("Models are not trained.").color(palette.warning));
            return;
        };
        metric(ui, "Pass/Fail Accuracy", &view_model::accuracy_label(models.accuracy));
        metric(ui, "R² Score", &view_model::r2_label(models.r2));
        ui.add_space(12.0);
        ui.label(RichText::new("Random Forest Model").color(palette.text_muted));
        ui.label(
            RichText::new(format!(
                "{} trees, {} training rows, {} test rows",
                models.options.n_trees, models.train_rows, models.test_rows
            ))
            .small()
            .color(palette.text_muted),
        );
        ui.label(
            RichText::new(format!("Dataset {}", models.dataset))
                .small()
                .color(palette.text_muted),
        );
    }

    fn render_form(&mut self, ui: &mut Ui) {
        let palette = style::palette();
        let mut changed = false;
        let form = &mut self.controller.form;

        ui.heading("Student Performance Predictor");
        ui.label(
            RichText::new("Enter academic details to predict semester results.")
                .color(palette.text_muted),
        );
        ui.add_space(12.0);

        egui::Grid::new("student_details")
            .num_columns(2)
            .spacing([24.0, 8.0])
            .show(ui, |ui| {
                ui.label("Attendance (%)");
                changed |= ui
                    .add(egui::Slider::new(&mut form.attendance, 0..=100))
                    .changed();
                ui.end_row();

                ui.label("Previous CGPA");
                changed |= ui
                    .add(
                        egui::DragValue::new(&mut form.previous_cgpa)
                            .range(0.0..=MAX_CGPA)
                            .speed(0.1)
                            .fixed_decimals(1),
                    )
                    .changed();
                ui.end_row();

                ui.label("Study hours per week");
                changed |= ui
                    .add(egui::Slider::new(&mut form.study_hours, 0..=MAX_STUDY_HOURS))
                    .changed();
                ui.end_row();

                ui.label("Assignment completion (%)");
                changed |= ui
                    .add(egui::Slider::new(&mut form.assignments, 0..=100))
                    .changed();
                ui.end_row();

                ui.label("Quiz/Test score");
                changed |= ui
                    .add(egui::Slider::new(&mut form.quiz, 0..=MAX_QUIZ_SCORE))
                    .on_hover_text("Out of 30")
                    .changed();
                ui.end_row();

                ui.label("Number of subjects");
                let mut count = form.subject_count();
                if ui
                    .add(egui::DragValue::new(&mut count).range(MIN_SUBJECTS..=MAX_SUBJECTS))
                    .changed()
                {
                    form.set_subject_count(count);
                    changed = true;
                }
                ui.end_row();
            });

        ui.add_space(12.0);
        ui.label(RichText::new("Mid-term marks (out of 30 each)").color(palette.text_primary));
        egui::Grid::new("subject_marks")
            .num_columns(3)
            .striped(true)
            .spacing([24.0, 6.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Subject").color(palette.text_muted));
                ui.label(RichText::new("Mid-1").color(palette.text_muted));
                ui.label(RichText::new("Mid-2").color(palette.text_muted));
                ui.end_row();
                for idx in 0..form.subject_count() {
                    let mut marks = form.subjects()[idx];
                    ui.label(format!("Subject {}", idx + 1));
                    let mid1 = ui.add(
                        egui::DragValue::new(&mut marks.mid1).range(0..=MAX_MID_MARKS),
                    );
                    let mid2 = ui.add(
                        egui::DragValue::new(&mut marks.mid2).range(0..=MAX_MID_MARKS),
                    );
                    if mid1.changed() || mid2.changed() {
                        form.set_subject(idx, SubjectMarks::new(marks.mid1, marks.mid2));
                        changed = true;
                    }
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(format!(
                "Total Mid-1: {}",
                view_model::total_label(form.total_mid1(), form.max_total())
            ));
            ui.add_space(24.0);
            ui.label(format!(
                "Total Mid-2: {}",
                view_model::total_label(form.total_mid2(), form.max_total())
            ));
        });

        if changed {
            self.controller.clear_prediction();
        }

        ui.add_space(12.0);
        if ui.button("Predict Semester Result").clicked() {
            self.controller.predict();
        }
        if let Some(status) = self.controller.status() {
            ui.label(RichText::new(status).color(palette.warning));
        }
    }

    fn render_result(&self, ui: &mut Ui) {
        let Some(prediction) = self.controller.last_prediction() else {
            return;
        };
        ui.add_space(16.0);
        ui.horizontal(|ui| {
            result_card(ui, "Predicted Semester %", |ui| {
                ui.label(
                    RichText::new(view_model::percentage_label(prediction.percentage))
                        .size(28.0)
                        .strong(),
                );
            });
            result_card(ui, "Pass/Fail Prediction", |ui| {
                ui.label(
                    RichText::new(view_model::outcome_label(prediction.outcome))
                        .size(28.0)
                        .strong()
                        .color(style::outcome_color(prediction.outcome.is_pass())),
                );
            });
        });
        ui.add_space(8.0);
        render_message(ui, prediction);
    }
}

impl eframe::App for GradecastApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_visuals(ctx);
        egui::SidePanel::left("model_summary")
            .resizable(false)
            .default_width(220.0)
            .show(ctx, |ui| self.render_sidebar(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_form(ui);
                self.render_result(ui);
            });
        });
    }
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    let palette = style::palette();
    ui.label(RichText::new(label).color(palette.text_muted));
    ui.label(RichText::new(value).size(22.0).color(palette.text_primary));
    ui.add_space(6.0);
}

fn result_card(ui: &mut Ui, title: &str, body: impl FnOnce(&mut Ui)) {
    let palette = style::palette();
    Frame::new()
        .fill(palette.bg_tertiary)
        .stroke(style::card_border())
        .inner_margin(Margin::symmetric(16, 12))
        .show(ui, |ui| {
            ui.set_min_width(200.0);
            ui.label(RichText::new(title).color(palette.text_muted));
            body(ui);
        });
}

fn render_message(ui: &mut Ui, prediction: Prediction) {
    let color = style::outcome_color(prediction.outcome.is_pass());
    Frame::new()
        .stroke(egui::Stroke::new(1.0, color))
        .inner_margin(Margin::symmetric(12, 8))
        .show(ui, |ui| {
            ui.label(RichText::new(view_model::outcome_message(prediction.outcome)).color(color));
        });
}
