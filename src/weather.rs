use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REVERSE_GEOCODE_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub temp: f32,
    pub description: String,
    pub city: String,
}

/// What the header shows when geolocation or either fetch fails.
pub fn fallback() -> WeatherData {
    WeatherData {
        temp: 20.0,
        description: "Clear".to_string(),
        city: "Unknown".to_string(),
    }
}

/// WMO weather interpretation codes as reported by Open-Meteo. Anything
/// unrecognized reads as clear sky.
pub fn describe_weather_code(code: u32) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 | 48 => "Foggy",
        51 => "Light Drizzle",
        53 => "Drizzle",
        55 => "Heavy Drizzle",
        61 => "Light Rain",
        63 => "Rain",
        65 => "Heavy Rain",
        71 => "Light Snow",
        73 => "Snow",
        75 => "Heavy Snow",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Clear",
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f32,
    weathercode: u32,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    #[serde(default)]
    city: String,
    #[serde(default)]
    locality: String,
}

/// Two-step weather lookup: current conditions from Open-Meteo, then a
/// reverse geocode for the city name. Coordinates come from the webview's
/// geolocation API.
pub struct WeatherService {
    client: reqwest::Client,
}

impl WeatherService {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Never fails: any error in either step yields the fixed fallback.
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> WeatherData {
        match self.try_fetch(latitude, longitude).await {
            Ok(weather) => weather,
            Err(err) => {
                warn!("Weather fetch failed, using fallback: {:#}", err);
                fallback()
            }
        }
    }

    async fn try_fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherData> {
        let forecast: ForecastResponse = self
            .client
            .get(FORECAST_URL)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await
            .context("forecast request failed")?
            .error_for_status()
            .context("forecast request was rejected")?
            .json()
            .await
            .context("forecast response was not valid JSON")?;

        let place: ReverseGeocodeResponse = self
            .client
            .get(REVERSE_GEOCODE_URL)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .send()
            .await
            .context("reverse geocode request failed")?
            .error_for_status()
            .context("reverse geocode request was rejected")?
            .json()
            .await
            .context("reverse geocode response was not valid JSON")?;

        let city = if !place.city.is_empty() {
            place.city
        } else if !place.locality.is_empty() {
            place.locality
        } else {
            "Unknown".to_string()
        };

        Ok(WeatherData {
            temp: forecast.current_weather.temperature,
            description: describe_weather_code(forecast.current_weather.weathercode).to_string(),
            city,
        })
    }
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new()
    }
}
