use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::analysis::trend::Granularity;
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dashboard Controls");
    ui.separator();

    let (Some(dataset), Some(filters), Some((min_date, max_date))) =
        (state.dataset.clone(), state.filters.clone(), state.date_bounds)
    else {
        ui.label("No dataset loaded.");
        return;
    };

    // ---- Date range ----
    ui.strong("Select Date Range");
    let mut start = filters.date_range.start;
    let mut end = filters.date_range.end;
    let mut date_changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("From");
        date_changed |= ui
            .add(DatePickerButton::new(&mut start).id_salt("start_date"))
            .changed();
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("To");
        date_changed |= ui
            .add(DatePickerButton::new(&mut end).id_salt("end_date"))
            .changed();
    });
    if ui.small_button("Full range").clicked() {
        start = min_date;
        end = max_date;
        date_changed = true;
    }
    if date_changed {
        state.set_date_range(start.clamp(min_date, max_date), end.clamp(min_date, max_date));
    }
    ui.separator();

    // ---- Trend granularity ----
    ui.strong("Sales trend");
    let mut granularity = state.settings.granularity;
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut granularity, Granularity::Weekly, "Weekly");
        ui.radio_value(&mut granularity, Granularity::Daily, "Daily");
    });
    state.set_granularity(granularity);
    ui.separator();

    // ---- Export ----
    ui.checkbox(&mut state.export_derived, "Include discount columns");
    if ui.button("Save Filtered Data…").clicked() {
        save_file_dialog(state);
    }
    ui.separator();

    // ---- Categories ----
    let n_selected = filters.categories.len();
    let n_total = dataset.categories.len();
    ui.strong(format!("Categories  ({n_selected}/{n_total})"));

    let mut all = state.all_categories;
    if ui.checkbox(&mut all, "Select All Categories").changed() {
        state.set_all_categories(all);
    }

    if !state.all_categories {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui: &mut Ui| {
                for category in &dataset.categories {
                    let mut checked = filters.categories.contains(category);
                    let color = state.category_colors.color_for(category);
                    let text = RichText::new(category).color(color);
                    if ui.checkbox(&mut checked, text).changed() {
                        state.toggle_category(category);
                    }
                }
            });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                let _ = state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} order lines loaded, {} in view",
                ds.len(),
                state.visible_rows()
            ));
            if ds.quantity_synthesized {
                ui.label(RichText::new("(no quantity column: each line counts as 1)").weak());
            }
        }

        ui.separator();

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Warning(msg)) => {
                ui.label(RichText::new(msg).color(Color32::YELLOW));
            }
            Some(Status::Info(msg)) => {
                ui.label(RichText::new(msg).color(Color32::LIGHT_GREEN));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open order data")
        .add_filter("Supported files", &["csv", "tsv", "tab", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv", "tab"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Errors are logged and shown in the status line by `open`.
        let _ = state.open(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let default = state.default_export_path();
    let mut dialog = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .add_filter("CSV", &["csv"]);
    if let Some(dir) = default.parent() {
        dialog = dialog.set_directory(dir);
    }
    if let Some(name) = default.file_name().and_then(|n| n.to_str()) {
        dialog = dialog.set_file_name(name);
    }

    if let Some(path) = dialog.save_file() {
        if let Err(e) = state.export(&path) {
            log::error!("Export failed: {e:#}");
            state.status = Some(Status::Error(format!("{e:#}")));
        }
    }
}
