use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, Select};
use weatherbox_core::{
    BackendClient, Config, Coordinate, CoordinateHolder, MapView, ProviderId, Rendered, Units,
    WeatherPanel, map::MAPBOX_TILE_TEMPLATE, model::place_name,
};

/// Pixels moved by one pan step in `explore`.
const PAN_STEP_PX: f64 = 100.0;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbox", version, about = "Map-centered realtime weather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the provider proxy.
    Serve {
        /// Listen address, overrides the configured one.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store the API key for a provider: "tomorrowio" or "mapbox".
    Configure {
        provider: String,
    },

    /// Fetch and print realtime weather for a coordinate through the proxy.
    Show {
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, default_value = "imperial")]
        units: Units,
    },

    /// Place name plus weather for a coordinate, in one proxy call.
    Report {
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, default_value = "imperial")]
        units: Units,
    },

    /// Interactive session: move the map, switch units, fetch on demand.
    Explore,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Serve { bind } => {
                weatherbox_proxy::start_server(&config, bind.as_deref()).await?;
            }
            Command::Configure { provider } => {
                let id = ProviderId::try_from(provider.as_str())?;
                let api_key = Password::new(&format!("API key for {id}:"))
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?;

                config.upsert_provider_api_key(id, api_key.trim().to_string());
                config.save()?;
                println!("Saved API key for {id} to {}", Config::config_file_path()?.display());
            }
            Command::Show { lon, lat, units } => {
                let backend = BackendClient::new(config.backend_url());
                let holder = CoordinateHolder::new(Coordinate::new(lon, lat));
                let mut panel = WeatherPanel::new(holder);
                panel.set_units(units);

                panel.fetch_weather(&backend).await;
                println!("{}", panel.render().to_text());
            }
            Command::Report { lon, lat, units } => {
                let backend = BackendClient::new(config.backend_url());
                let report = backend
                    .weather_based_coordinates(Coordinate::new(lon, lat), units)
                    .await?;

                println!("{}", place_name(&report.location).unwrap_or("Unknown place"));
                println!("{}", Rendered::reading(Some(&report.weather), units).to_text());
            }
            Command::Explore => explore(&config).await?,
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    PanNorth,
    PanSouth,
    PanEast,
    PanWest,
    JumpTo,
    ZoomIn,
    ZoomOut,
    ToggleUnits,
    Fetch,
    Locate,
    Tile,
    Quit,
}

impl Action {
    const ALL: [Action; 12] = [
        Action::Fetch,
        Action::PanNorth,
        Action::PanSouth,
        Action::PanEast,
        Action::PanWest,
        Action::JumpTo,
        Action::ZoomIn,
        Action::ZoomOut,
        Action::ToggleUnits,
        Action::Locate,
        Action::Tile,
        Action::Quit,
    ];
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::PanNorth => "Pan north",
            Action::PanSouth => "Pan south",
            Action::PanEast => "Pan east",
            Action::PanWest => "Pan west",
            Action::JumpTo => "Jump to coordinate",
            Action::ZoomIn => "Zoom in",
            Action::ZoomOut => "Zoom out",
            Action::ToggleUnits => "Toggle units",
            Action::Fetch => "Get realtime weather",
            Action::Locate => "Where is this?",
            Action::Tile => "Show map tile URL",
            Action::Quit => "Quit",
        })
    }
}

async fn explore(config: &Config) -> Result<()> {
    let backend = BackendClient::new(config.backend_url());
    let holder = CoordinateHolder::default();
    holder.subscribe(|center| println!("Center: {center}"));

    let mut map = MapView::new(holder.clone());
    let mut panel = WeatherPanel::new(holder.clone());

    loop {
        let prompt = format!("[{}] {}", panel.units().label(), holder.get());
        let action = Select::new(&prompt, Action::ALL.to_vec())
            .prompt()
            .context("Failed to read action")?;

        match action {
            Action::PanNorth => map.pan_pixels(0.0, -PAN_STEP_PX),
            Action::PanSouth => map.pan_pixels(0.0, PAN_STEP_PX),
            Action::PanEast => map.pan_pixels(PAN_STEP_PX, 0.0),
            Action::PanWest => map.pan_pixels(-PAN_STEP_PX, 0.0),
            Action::JumpTo => {
                let lon = CustomType::<f64>::new("Longitude:").prompt()?;
                let lat = CustomType::<f64>::new("Latitude:").prompt()?;
                map.move_to(Coordinate::new(lon, lat));
            }
            Action::ZoomIn => map.set_zoom(map.zoom() + 1.0),
            Action::ZoomOut => map.set_zoom(map.zoom() - 1.0),
            Action::ToggleUnits => {
                panel.toggle_units();
                println!("{}", panel.render().to_text());
            }
            Action::Fetch => {
                panel.fetch_weather(&backend).await;
                println!("{}", panel.render().to_text());
            }
            Action::Locate => match backend.reverse_geocoding(holder.get()).await {
                Ok(result) => println!("{}", place_name(&result).unwrap_or("No place found")),
                Err(err) => println!("Error: {err:#}"),
            },
            Action::Tile => match config.provider_api_key(ProviderId::Mapbox) {
                Some(token) => println!("{}", map.tile_url(MAPBOX_TILE_TEMPLATE, token)),
                None => println!("No mapbox key. Hint: run `weatherbox configure mapbox`."),
            },
            Action::Quit => break,
        }
    }

    Ok(())
}
