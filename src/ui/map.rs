use eframe::egui::{self, Color32, ColorImage, RichText, TextureHandle, TextureOptions, Ui};
use egui_plot::{Plot, PlotImage, PlotPoint, PlotPoints, Points, Text};

use crate::color;
use crate::geo::{GeoBounds, MapArtifact, StationCoordinates};
use crate::metrics::categorize;
use crate::ui::plot::to_color32;

const MAP_HEIGHT: f32 = 420.0;
/// Degrees added around the stations.
const MAP_MARGIN: f64 = 0.08;
const MAX_RASTER: usize = 512;

// ---------------------------------------------------------------------------
// Geospatial view
// ---------------------------------------------------------------------------

/// Station base layer, heat overlay and one marker per sampled row.
pub fn heat_map(
    ui: &mut Ui,
    map: &MapArtifact,
    stations: &StationCoordinates,
    texture: &mut Option<TextureHandle>,
) {
    ui.strong(format!(
        "PM2.5 heat map ({} sampled rows, radius {})",
        map.markers.len(),
        map.heat.radius
    ));

    let Some(bounds) = GeoBounds::around(stations.iter().map(|(_, c)| c), MAP_MARGIN) else {
        ui.label("No station coordinates configured.");
        return;
    };
    if map.markers.is_empty() {
        ui.label("No rows to place on the map.");
    }

    // One screen pixel covers more degrees of longitude than of latitude.
    let lon_per_lat = 1.0 / bounds.center().lat.to_radians().cos();

    if texture.is_none() && !map.heat.points.is_empty() {
        let screen_w = ui.available_width().max(1.0) as f64;
        *texture = Some(heat_texture(ui.ctx(), map, bounds, screen_w, lon_per_lat));
    }

    Plot::new("heat_map")
        .height(MAP_HEIGHT)
        .data_aspect(lon_per_lat as f32)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui| {
            if let Some(tex) = texture.as_ref() {
                let center = bounds.center();
                plot_ui.image(PlotImage::new(
                    tex.id(),
                    PlotPoint::new(center.lon, center.lat),
                    egui::vec2(bounds.width() as f32, bounds.height() as f32),
                ));
            }

            // Base layer: every configured station.
            let base: PlotPoints = stations.iter().map(|(_, c)| [c.lon, c.lat]).collect();
            plot_ui.points(Points::new(base).radius(3.0).color(Color32::GRAY));
            for (name, c) in stations.iter() {
                plot_ui.text(Text::new(
                    PlotPoint::new(c.lon, c.lat + 0.012),
                    RichText::new(name).small().color(Color32::GRAY),
                ));
            }

            for marker in &map.markers {
                let (label, quality_color) = match marker.pm25 {
                    Some(v) => (
                        format!("{}: PM2.5 {v:.1} µg/m³", marker.station),
                        to_color32(color::quality_color(categorize(v))),
                    ),
                    None => (
                        format!("{}: PM2.5 data unavailable", marker.station),
                        Color32::LIGHT_GRAY,
                    ),
                };
                let point: PlotPoints = vec![[marker.coordinate.lon, marker.coordinate.lat]].into();
                plot_ui.points(Points::new(point).radius(4.0).color(quality_color).name(label));
            }
        });
}

/// Rasterize the heat layer at half the on-screen width and upload it.
fn heat_texture(
    ctx: &egui::Context,
    map: &MapArtifact,
    bounds: GeoBounds,
    screen_w: f64,
    lon_per_lat: f64,
) -> TextureHandle {
    let width = ((screen_w / 2.0) as usize).clamp(64, MAX_RASTER);
    let height = ((width as f64 * bounds.height() * lon_per_lat / bounds.width()) as usize)
        .clamp(64, MAX_RASTER);
    let radius_px = map.heat.radius * width as f64 / screen_w;

    let raster = map.heat.rasterize(bounds, width, height, radius_px);

    let mut rgba = Vec::with_capacity(width * height * 4);
    for y in 0..raster.height {
        for x in 0..raster.width {
            let v = raster.get(x, y);
            let c = color::heat_color(v);
            let alpha = if v > 0.0 { (40.0 + 180.0 * v) as u8 } else { 0 };
            rgba.extend_from_slice(&[c.red, c.green, c.blue, alpha]);
        }
    }

    log::debug!("Heat raster {width}x{height}, radius {radius_px:.1}px");
    let image = ColorImage::from_rgba_unmultiplied([width, height], &rgba);
    ctx.load_texture("heat_map", image, TextureOptions::LINEAR)
}
