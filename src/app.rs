use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct OrderScopeApp {
    pub state: AppState,
}

impl OrderScopeApp {
    /// Build the app and try to open the configured dataset. A failed load
    /// only surfaces in the status line; the user can pick another file.
    pub fn new(config: DashboardConfig) -> Self {
        let dataset_path = config.dataset_path.clone();
        let mut state = AppState::new(config);
        if let Err(e) = state.open(&dataset_path) {
            log::warn!("Startup dataset not loaded: {e:#}");
        }
        Self { state }
    }
}

impl eframe::App for OrderScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state);
        });
    }
}
