//! Weather panel: unit switch, fetch trigger and the six grouped readouts.
//!
//! Values are shown exactly as received. Only the suffix depends on the unit
//! system; the provider is trusted to have answered in the requested units.

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::{Display, Write as _};

use crate::{
    coordinate::CoordinateHolder,
    model::{ReadingView, RealtimeValues, Units, WeatherReading},
    query::{QueryClient, QueryState, QueryStatus, WeatherFetcher, WeatherQuery},
};

pub const PLACEHOLDER: &str = "--";

const TIME_FORMAT: &str = "%B %d, %Y %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: &'static str,
    pub fields: Vec<Field>,
}

impl Panel {
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.label == label).map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// A failed fetch replaces the whole panel with its message.
    Error(String),
    Panels {
        units_label: &'static str,
        time: Option<String>,
        panels: Vec<Panel>,
    },
}

impl Rendered {
    /// Panels for `reading`, or placeholders when there is none. Time is local.
    pub fn reading(reading: Option<&WeatherReading>, units: Units) -> Self {
        Self::reading_in(reading, units, &Local)
    }

    pub fn reading_in<Tz: TimeZone>(reading: Option<&WeatherReading>, units: Units, tz: &Tz) -> Self
    where
        Tz::Offset: Display,
    {
        let view = reading.map(ReadingView::from_reading);
        Rendered::Panels {
            units_label: units.label(),
            time: view.as_ref().and_then(|v| v.time).map(|t| format_time(t, tz)),
            panels: panels(view.as_ref().map(|v| &v.values), units),
        }
    }

    /// Plain-text layout for a terminal.
    pub fn to_text(&self) -> String {
        match self {
            Rendered::Error(message) => format!("Error: {message}"),
            Rendered::Panels { units_label, time, panels } => {
                let mut out = String::new();
                let _ = writeln!(out, "[{units_label}] {}", time.as_deref().unwrap_or(""));
                for panel in panels {
                    let _ = writeln!(out, "\n{}", panel.title);
                    for field in &panel.fields {
                        let _ = writeln!(out, "  {}: {}", field.label, field.value);
                    }
                }
                out
            }
        }
    }
}

/// Controller for the weather readout.
#[derive(Debug)]
pub struct WeatherPanel {
    holder: CoordinateHolder,
    units: Units,
    client: QueryClient,
    query: WeatherQuery,
}

impl WeatherPanel {
    pub fn new(holder: CoordinateHolder) -> Self {
        Self {
            holder,
            units: Units::default(),
            client: QueryClient::new(),
            query: WeatherQuery::new(),
        }
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// Change units and drop the cached reading so the next fetch is fresh.
    pub fn set_units(&mut self, units: Units) {
        self.units = units;
        self.client.set_query_data(self.query.key(), None);
    }

    pub fn toggle_units(&mut self) {
        self.set_units(self.units.toggle());
    }

    /// Read the current coordinate and fetch once.
    pub async fn fetch_weather(&mut self, fetcher: &dyn WeatherFetcher) -> QueryStatus {
        let location = self.holder.get().to_location_param();
        self.query.refetch(&mut self.client, fetcher, &location, self.units).await
    }

    pub fn state(&self) -> QueryState {
        self.client.state(self.query.key())
    }

    pub fn render(&self) -> Rendered {
        self.render_in(&Local)
    }

    pub fn render_in<Tz: TimeZone>(&self, tz: &Tz) -> Rendered
    where
        Tz::Offset: Display,
    {
        let state = self.state();
        if state.status == QueryStatus::Error {
            return Rendered::Error(state.error.unwrap_or_default());
        }

        Rendered::reading_in(state.data.as_ref(), self.units, tz)
    }
}

/// Reading time in the viewer's zone `tz`, e.g. "June 05, 2025 14:30".
pub fn format_time<Tz: TimeZone>(time: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    time.with_timezone(tz).format(TIME_FORMAT).to_string()
}

/// Build the six panels. `None` renders every field as a placeholder.
pub fn panels(values: Option<&RealtimeValues>, units: Units) -> Vec<Panel> {
    let temp = units.temperature_suffix();
    let dist = units.distance_suffix();

    vec![
        Panel {
            title: "Temperature",
            fields: vec![
                field("Actual", values.and_then(|v| v.temperature), temp),
                field("Feels Like", values.and_then(|v| v.temperature_apparent), temp),
                field("Dew Point", values.and_then(|v| v.dew_point), temp),
                field("Humidity", values.and_then(|v| v.humidity), "%"),
            ],
        },
        Panel {
            title: "Clouds & Visibility",
            fields: vec![
                field("Cloud Cover", values.and_then(|v| v.cloud_cover), "%"),
                field("Cloud Base", values.and_then(|v| v.cloud_base), dist),
                field("Cloud Ceiling", values.and_then(|v| v.cloud_ceiling), dist),
                field("Visibility", values.and_then(|v| v.visibility), dist),
            ],
        },
        Panel {
            title: "Wind",
            fields: vec![
                field("Speed", values.and_then(|v| v.wind_speed), "m/s"),
                field("Direction", values.and_then(|v| v.wind_direction), "°"),
                field("Gust", values.and_then(|v| v.wind_gust), "m/s"),
            ],
        },
        Panel {
            title: "Precipitation",
            fields: vec![
                field("Probability", values.and_then(|v| v.precipitation_probability), "%"),
                field("Rain", values.and_then(|v| v.rain_intensity), "mm/hr"),
                field("Snow", values.and_then(|v| v.snow_intensity), "mm/hr"),
                field("Sleet", values.and_then(|v| v.sleet_intensity), "mm/hr"),
            ],
        },
        Panel {
            title: "Pressure",
            fields: vec![
                field("Sea Level", values.and_then(|v| v.pressure_sea_level), "hPa"),
                field("Surface", values.and_then(|v| v.pressure_surface_level), "hPa"),
                field("Altimeter", values.and_then(|v| v.altimeter_setting), "inHg"),
            ],
        },
        Panel {
            title: "UV & Weather",
            fields: vec![
                field("UV Index", values.and_then(|v| v.uv_index), ""),
                field("Health Concern", values.and_then(|v| v.uv_health_concern), ""),
                field("Weather Code", values.and_then(|v| v.weather_code), ""),
            ],
        },
    ]
}

fn field(label: &'static str, value: Option<f64>, suffix: &str) -> Field {
    let value = match value {
        Some(v) => format!("{v}{suffix}"),
        None => PLACEHOLDER.to_string(),
    };
    Field { label, value }
}
