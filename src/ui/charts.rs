use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::analysis::correlation::CorrelationMatrix;
use crate::analysis::discount::DiscountGroup;
use crate::analysis::kpi::KpiSummary;
use crate::analysis::ranking::CategoryStat;
use crate::analysis::stats::Statistic;
use crate::analysis::AnalysisError;
use crate::color::{correlation_color, CategoryColors};
use crate::pipeline::{DashboardReport, Outcome};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render KPIs and every chart for the current report.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to begin  (File → Open…)");
        });
        return;
    }

    let report = match &state.outcome {
        Some(Outcome::Report(report)) => report,
        Some(Outcome::Empty) | None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(crate::state::NO_DATA_MESSAGE);
            });
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("E-Commerce Analytics Dashboard");
            kpi_row(ui, &report.kpi);
            ui.separator();

            top_products_chart(ui, report, &state.category_colors);
            ui.separator();

            trend_chart(ui, report);
            ui.separator();

            discount_chart(ui, report);
            ui.separator();

            price_quantity_chart(ui, report);
            ui.separator();

            category_charts(ui, report, &state.category_colors);
            ui.separator();

            correlation_grid(ui, &report.correlation);
        });
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

fn kpi_row(ui: &mut Ui, kpi: &KpiSummary) {
    let cells = [
        ("Total Sales", money(kpi.total_sales)),
        ("Average Order Value", money(kpi.average_order_value)),
        ("Total Orders", format!("{:.0}", kpi.total_orders)),
        ("Unique Products", kpi.unique_products.to_string()),
    ];
    ui.columns(cells.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(cells) {
            col.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(label).weak());
                ui.label(RichText::new(value).size(22.0).strong());
            });
        }
    });
}

fn money(value: Statistic) -> String {
    value
        .value()
        .map(|v| format!("${v:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}

// ---------------------------------------------------------------------------
// Bar charts with a categorical x axis
// ---------------------------------------------------------------------------

/// Bars at x = 0, 1, 2, … with `labels` printed under the ticks.
fn labeled_bar_plot(
    ui: &mut Ui,
    id: &str,
    y_label: &str,
    labels: Vec<String>,
    bars: Vec<Bar>,
) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.6));
        });
}

fn unavailable(ui: &mut Ui, err: &AnalysisError) {
    ui.label(RichText::new(format!("Not available: {err}")).weak());
}

fn top_products_chart(ui: &mut Ui, report: &DashboardReport, colors: &CategoryColors) {
    let products = match &report.top_products {
        Ok(products) => products,
        Err(e) => {
            ui.strong("Top products by total sales");
            unavailable(ui, e);
            return;
        }
    };
    ui.strong(format!("Top {} products by total sales", products.len()));
    let labels = products
        .iter()
        .map(|p| short_id(&p.product_id))
        .collect();
    let bars = products
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Bar::new(i as f64, p.total_sales)
                .name(format!("{} ({})", p.product_id, p.category))
                .fill(colors.color_for(&p.category))
        })
        .collect();
    labeled_bar_plot(ui, "top_products", "Total sales ($)", labels, bars);
}

/// Product ids are long hashes; the hover name carries the full one.
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn category_charts(ui: &mut Ui, report: &DashboardReport, colors: &CategoryColors) {
    let stat_bars = |stats: &[CategoryStat], value: fn(&CategoryStat) -> f64| {
        let labels: Vec<String> = stats.iter().map(|s| s.category.clone()).collect();
        let bars: Vec<Bar> = stats
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Bar::new(i as f64, value(s))
                    .name(&s.category)
                    .fill(colors.color_for(&s.category))
            })
            .collect();
        (labels, bars)
    };

    let categories = match &report.categories {
        Ok(categories) => categories,
        Err(e) => {
            ui.strong("Top categories");
            unavailable(ui, e);
            return;
        }
    };

    ui.strong("Top categories by total sales");
    let (labels, bars) = stat_bars(&categories.by_total, |s| s.total_sales);
    labeled_bar_plot(ui, "category_total", "Total sales ($)", labels, bars);

    ui.strong("Top categories by average price");
    let (labels, bars) = stat_bars(&categories.by_average, |s| s.average_price);
    labeled_bar_plot(ui, "category_average", "Average price ($)", labels, bars);
}

fn discount_chart(ui: &mut Ui, report: &DashboardReport) {
    ui.strong("Sales with vs without discount");
    let groups: &[DiscountGroup] = match &report.discount {
        Ok(groups) => groups,
        Err(e) => {
            unavailable(ui, e);
            return;
        }
    };

    let price_bars = groups
        .iter()
        .enumerate()
        .map(|(i, g)| Bar::new(i as f64 - 0.15, g.price_sum).width(0.3))
        .collect();
    let payment_bars = groups
        .iter()
        .enumerate()
        .map(|(i, g)| Bar::new(i as f64 + 0.15, g.payment_sum).width(0.3))
        .collect();
    let labels: Vec<String> = groups.iter().map(|g| g.status.to_string()).collect();

    Plot::new("discount_impact")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Total ($)")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(price_bars)
                    .name("price")
                    .color(Color32::LIGHT_BLUE),
            );
            plot_ui.bar_chart(
                BarChart::new(payment_bars)
                    .name("payment_value")
                    .color(Color32::LIGHT_GREEN),
            );
        });

    for g in groups {
        ui.label(format!(
            "{}: {} lines, quantity {:.0}",
            g.status, g.lines, g.quantity_sum
        ));
    }
}

// ---------------------------------------------------------------------------
// Line and scatter
// ---------------------------------------------------------------------------

fn trend_chart(ui: &mut Ui, report: &DashboardReport) {
    ui.strong(format!("{} sales trend", report.granularity.label()));
    let trend = match &report.trend {
        Ok(trend) => trend,
        Err(e) => {
            unavailable(ui, e);
            return;
        }
    };
    let Some(first) = trend.first().map(|p| p.bucket) else {
        return;
    };

    let points: PlotPoints = trend
        .iter()
        .map(|p| [(p.bucket - first).num_days() as f64, p.sales])
        .collect();

    Plot::new("sales_trend")
        .height(CHART_HEIGHT)
        .y_axis_label("Total sales ($)")
        .x_axis_formatter(move |mark, _range| {
            chrono::TimeDelta::try_days(mark.value.round() as i64)
                .and_then(|offset| first.checked_add_signed(offset))
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("sales").width(2.0));
        });
}

fn price_quantity_chart(ui: &mut Ui, report: &DashboardReport) {
    ui.strong("Price vs quantity");
    ui.label(format!(
        "Correlation coefficient between price and quantity: {:.2}",
        report.price_quantity
    ));
    if !report.price_quantity.is_defined() {
        ui.label(
            RichText::new("Not available: too few points or no variation in price or quantity.")
                .weak(),
        );
    }

    let series: Vec<[f64; 2]> = report.scatter.iter().map(|&(p, q)| [p, q]).collect();
    Plot::new("price_quantity")
        .height(CHART_HEIGHT)
        .x_axis_label("Price ($)")
        .y_axis_label("Quantity")
        .show(ui, |plot_ui| {
            plot_ui.points(Points::new(series).radius(2.5).color(Color32::LIGHT_BLUE));
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn correlation_grid(ui: &mut Ui, matrix: &CorrelationMatrix) {
    ui.strong("Correlation: price, freight value, product weight");
    egui::Grid::new("correlation_grid")
        .spacing([6.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for label in matrix.labels {
                ui.label(RichText::new(label).strong());
            }
            ui.end_row();

            for (i, row_label) in matrix.labels.iter().enumerate() {
                ui.label(RichText::new(*row_label).strong());
                for j in 0..matrix.labels.len() {
                    let value = matrix.get(i, j);
                    ui.label(
                        RichText::new(format!(" {value:.2} "))
                            .monospace()
                            .color(Color32::BLACK)
                            .background_color(correlation_color(value)),
                    );
                }
                ui.end_row();
            }
        });
}
