use eframe::egui::Ui;
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Column;
use crate::metrics::{DailyAggregate, DayGrouping};

const ROW_HEIGHT: f32 = 18.0;

/// Daily means as a scrollable table, one row per aggregate.
pub fn daily_table(ui: &mut Ui, daily: &[DailyAggregate], grouping: DayGrouping) {
    if daily.is_empty() {
        ui.label("No days in the current selection.");
        return;
    }

    let key_header = match grouping {
        DayGrouping::Calendar => "Date",
        DayGrouping::DayOfMonth => "Day",
    };

    ui.push_id("daily_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .max_scroll_height(260.0)
            .column(TableColumn::auto().at_least(90.0))
            .columns(TableColumn::remainder(), DailyAggregate::COLUMNS.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|ui| {
                    ui.strong(key_header);
                });
                for column in DailyAggregate::COLUMNS {
                    header.col(|ui| {
                        ui.strong(format!("{} ({})", column.header(), column.unit()));
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, daily.len(), |mut row| {
                    let day = &daily[row.index()];
                    row.col(|ui| {
                        ui.label(day.date_label());
                    });
                    for column in DailyAggregate::COLUMNS {
                        row.col(|ui| {
                            ui.label(cell(day, column));
                        });
                    }
                });
            });
    });
}

fn cell(day: &DailyAggregate, column: Column) -> String {
    match day.metric(column).value() {
        Some(v) => format!("{v:.2}"),
        None => "–".to_string(),
    }
}
