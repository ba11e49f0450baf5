use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, value::RawValue};
use std::{fmt, str::FromStr};

/// Parsed JSON of a provider response, as seen by the client.
pub type WeatherReading = Value;

/// A provider body checked to be JSON and otherwise kept byte for byte.
pub type RawReading = Box<RawValue>;

/// Map default center, New York City.
pub const DEFAULT_CENTER: Coordinate = Coordinate { longitude: -74.006, latitude: 40.7128 };

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// `"lat,lon"`, the location format the weather provider expects.
    pub fn to_location_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        DEFAULT_CENTER
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4} (lon, lat)", self.longitude, self.latitude)
    }
}

/// Unit system used both as the provider query parameter and for display suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Metric,
    #[default]
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Units::Metric => "Metric",
            Units::Imperial => "Imperial",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn distance_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "km",
            Units::Imperial => "mi",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!("Unknown units '{value}'. Supported units: metric, imperial.")),
        }
    }
}

/// Numeric fields of a realtime reading, as found under `data.values`.
///
/// This is a read-only view for display. Every field is optional and nothing
/// is normalized. A field that is absent or not a number is `None` on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RealtimeValues {
    pub altimeter_setting: Option<f64>,
    pub cloud_base: Option<f64>,
    pub cloud_ceiling: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub dew_point: Option<f64>,
    pub freezing_rain_intensity: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub pressure_sea_level: Option<f64>,
    pub pressure_surface_level: Option<f64>,
    pub rain_intensity: Option<f64>,
    pub sleet_intensity: Option<f64>,
    pub snow_intensity: Option<f64>,
    pub temperature: Option<f64>,
    pub temperature_apparent: Option<f64>,
    pub uv_health_concern: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility: Option<f64>,
    pub weather_code: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl RealtimeValues {
    pub fn from_values(values: &Value) -> Self {
        let num = |name: &str| values.get(name).and_then(Value::as_f64);

        Self {
            altimeter_setting: num("altimeterSetting"),
            cloud_base: num("cloudBase"),
            cloud_ceiling: num("cloudCeiling"),
            cloud_cover: num("cloudCover"),
            dew_point: num("dewPoint"),
            freezing_rain_intensity: num("freezingRainIntensity"),
            humidity: num("humidity"),
            precipitation_probability: num("precipitationProbability"),
            pressure_sea_level: num("pressureSeaLevel"),
            pressure_surface_level: num("pressureSurfaceLevel"),
            rain_intensity: num("rainIntensity"),
            sleet_intensity: num("sleetIntensity"),
            snow_intensity: num("snowIntensity"),
            temperature: num("temperature"),
            temperature_apparent: num("temperatureApparent"),
            uv_health_concern: num("uvHealthConcern"),
            uv_index: num("uvIndex"),
            visibility: num("visibility"),
            weather_code: num("weatherCode"),
            wind_direction: num("windDirection"),
            wind_gust: num("windGust"),
            wind_speed: num("windSpeed"),
        }
    }
}

/// Display view over a [`WeatherReading`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingView {
    pub time: Option<DateTime<Utc>>,
    pub values: RealtimeValues,
}

impl ReadingView {
    /// Extract what can be displayed. Unknown or malformed parts are left empty.
    pub fn from_reading(reading: &WeatherReading) -> Self {
        let data = reading.get("data");

        let time = data
            .and_then(|d| d.get("time"))
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let values = data
            .and_then(|d| d.get("values"))
            .map(RealtimeValues::from_values)
            .unwrap_or_default();

        Self { time, values }
    }
}

/// Body of `weatherBasedCoordinates`: geocoding and weather results side by side.
///
/// The proxy builds it from [`RawReading`]s; the client decodes it as [`Value`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedReport<T = WeatherReading> {
    pub location: T,
    pub weather: T,
}

/// First place name in a reverse geocoding result, if any.
pub fn place_name(geocoding: &Value) -> Option<&str> {
    geocoding
        .get("features")?
        .as_array()?
        .first()?
        .get("place_name")?
        .as_str()
}
