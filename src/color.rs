use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Column;
use crate::metrics::AirQuality;

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

pub const RED: Srgb<u8> = Srgb::new(220, 40, 40);
pub const BLUE: Srgb<u8> = Srgb::new(40, 90, 220);
pub const GREEN: Srgb<u8> = Srgb::new(40, 160, 60);
pub const GRAY: Srgb<u8> = Srgb::new(140, 140, 140);
pub const STEEL: Srgb<u8> = Srgb::new(70, 130, 180);
pub const ORANGE: Srgb<u8> = Srgb::new(240, 150, 40);

/// Conventional line colour of a pollutant in the trend chart.
pub fn series_color(column: Column) -> Srgb<u8> {
    match column {
        Column::Pm25 => RED,
        Column::Pm10 => BLUE,
        Column::Co => GREEN,
        _ => GRAY,
    }
}

pub fn quality_color(quality: AirQuality) -> Srgb<u8> {
    match quality {
        AirQuality::Good => GREEN,
        AirQuality::Moderate => Srgb::new(230, 200, 40),
        AirQuality::Unhealthy => ORANGE,
        AirQuality::Poor => RED,
        AirQuality::Unknown => GRAY,
    }
}

// ---------------------------------------------------------------------------
// Heat-map gradient
// ---------------------------------------------------------------------------

/// Heat-map colour for an intensity in `[0, 1]`: blue → cyan → lime →
/// yellow → red, the usual leaflet-heat ramp, walked along the HSL hue.
pub fn heat_color(intensity: f32) -> Srgb<u8> {
    let t = intensity.clamp(0.0, 1.0);
    let hue = 240.0 * (1.0 - t);
    let hsl = Hsl::new(hue, 0.9, 0.5);
    let rgb: Srgb = hsl.into_color();
    rgb.into_format()
}
