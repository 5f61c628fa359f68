use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use log::{info, warn};

use crate::model::{BoxDimensions, PalletFootprint, PalletPreset, ValidationError};
use crate::types::DEFAULT_MAX_DIMENSION;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub calculator: CalculatorConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            calculator: CalculatorConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
    enable_stream: bool,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "PALLET_CALC_API_HOST";
    const PORT_VAR: &'static str = "PALLET_CALC_API_PORT";
    const ENABLE_STREAM_VAR: &'static str = "PALLET_CALC_ENABLE_STREAM";

    fn from_env() -> Self {
        let host_value =
            env_string(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match env_string(Self::PORT_VAR) {
            Some(raw) => parse_port(&raw).unwrap_or(Self::DEFAULT_PORT),
            None => Self::DEFAULT_PORT,
        };

        let enable_stream = env_string(Self::ENABLE_STREAM_VAR)
            .and_then(|raw| parse_bool(&raw, Self::ENABLE_STREAM_VAR))
            .unwrap_or(true);

        Self {
            bind_ip,
            display_host: effective_host,
            port,
            enable_stream,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the SSE endpoint is mounted.
    pub fn stream_enabled(&self) -> bool {
        self.enable_stream
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            display_host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            enable_stream: true,
        }
    }
}

/// Configuration for the pallet calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatorConfig {
    footprint: PalletFootprint,
    max_dimension: f64,
}

impl CalculatorConfig {
    pub const DEFAULT_PRESET: PalletPreset = PalletPreset::Tolerance;
    const PRESET_VAR: &'static str = "PALLET_CALC_PALLET_PRESET";
    const LENGTH_VAR: &'static str = "PALLET_CALC_PALLET_LENGTH";
    const WIDTH_VAR: &'static str = "PALLET_CALC_PALLET_WIDTH";
    const MAX_DIMENSION_VAR: &'static str = "PALLET_CALC_MAX_DIMENSION";

    /// Creates a configuration after validating the parameters.
    pub fn new(footprint: PalletFootprint, max_dimension: f64) -> Result<Self, ValidationError> {
        if !max_dimension.is_finite() || max_dimension <= 0.0 {
            return Err(ValidationError::InvalidConfiguration(format!(
                "Maximum box dimension must be positive, got: {}",
                max_dimension
            )));
        }
        Ok(Self {
            footprint,
            max_dimension,
        })
    }

    fn from_env() -> Self {
        let preset = match env_string(Self::PRESET_VAR) {
            Some(raw) => PalletPreset::parse(&raw).unwrap_or_else(|| {
                warn!(
                    "⚠️ Unknown pallet preset {} ('{}'). Using {}.",
                    Self::PRESET_VAR,
                    raw,
                    Self::DEFAULT_PRESET.name()
                );
                Self::DEFAULT_PRESET
            }),
            None => Self::DEFAULT_PRESET,
        };
        let base = preset.footprint();

        let length = load_f64_with_warning(
            Self::LENGTH_VAR,
            base.length(),
            |value| value > 0.0 && value.is_finite(),
            "must be greater than 0",
            "Custom pallet length overrides the preset",
        );
        let width = load_f64_with_warning(
            Self::WIDTH_VAR,
            base.width(),
            |value| value > 0.0 && value.is_finite(),
            "must be greater than 0",
            "Custom pallet width overrides the preset",
        );
        let max_dimension = load_f64_with_warning(
            Self::MAX_DIMENSION_VAR,
            DEFAULT_MAX_DIMENSION,
            |value| value > 0.0 && value.is_finite(),
            "must be greater than 0",
            "Adjusted maximum box dimension differs from the 999 mm form limit",
        );

        // Values already passed the validators above.
        let footprint = PalletFootprint::new(length, width).unwrap_or(base);
        Self::new(footprint, max_dimension).unwrap_or_default()
    }

    /// Footprint used when a request names no preset.
    pub fn footprint(&self) -> PalletFootprint {
        self.footprint
    }

    /// Upper bound for a single box dimension.
    pub fn max_dimension(&self) -> f64 {
        self.max_dimension
    }

    /// Validates raw box input against the configured limit.
    pub fn box_dimensions(
        &self,
        length: f64,
        width: f64,
        height: f64,
    ) -> Result<BoxDimensions, ValidationError> {
        BoxDimensions::with_max(length, width, height, self.max_dimension)
    }
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            footprint: Self::DEFAULT_PRESET.footprint(),
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    match raw.parse::<u16>() {
        Ok(value) if value != 0 => Some(value),
        Ok(_) => {
            warn!("⚠️ {} must not be 0. Using default.", ApiConfig::PORT_VAR);
            None
        }
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}'): {}. Using default.",
                ApiConfig::PORT_VAR,
                raw,
                err
            );
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "⚠️ Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn parse_f64_with_warning(
    var_name: &str,
    raw: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) => {
            if !validator(value) {
                warn!(
                    "⚠️ {} contains invalid value '{}': {}. Using {}.",
                    var_name, raw, invalid_hint, default
                );
                default
            } else {
                let tolerance = (default.abs().max(1.0)) * 1e-9;
                if (value - default).abs() > tolerance {
                    info!("ℹ️ {} ({} = {}).", notice, var_name, value);
                }
                value
            }
        }
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    match env_string(var_name) {
        Some(raw) => parse_f64_with_warning(var_name, &raw, default, validator, invalid_hint, notice),
        None => default,
    }
}
