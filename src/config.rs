//! YAML configuration: device address, named colors and the modes built from them.

use std::{
    fmt, fs,
    io::ErrorKind,
    marker::PhantomData,
    net::Ipv6Addr,
    path::{Path, PathBuf},
    time::Duration,
};

use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, Visitor},
};
use tracing::info;

use crate::{
    color::Color,
    device::{DEFAULT_TIMEOUT, DeviceConfig},
    error::ConfigError,
    gradient::{ColorTable, DEFAULT_STEPS},
    strategy::{HueStrategy, StrategyKind},
};

/// Configuration file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
/// Mode selected when `--mode` is not given.
pub const DEFAULT_MODE: &str = "rotate";
/// Port of the Elgato HTTP API, used when `ip` does not carry one.
pub const DEFAULT_PORT: u16 = 9123;

#[derive(Debug, Clone)]
/// Parsed configuration. Colors and modes are kept raw until a mode is resolved.
pub struct AppConfig {
    path: PathBuf,
    base_url: String,
    verbose: bool,
    light_index: usize,
    timeout: Duration,
    interval: Duration,
    colors: IndexMap<String, String>,
    modes: IndexMap<String, serde_yaml::Value>,
}

impl AppConfig {
    /// Read and parse the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let config = Self::from_yaml(&contents, path)?;
        info!(
            path = %path.display(),
            colors = config.colors.len(),
            modes = config.modes.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Parse configuration text; `path` is only used in error reports.
    pub fn from_yaml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_raw(raw, path))
    }

    fn from_raw(raw: RawConfig, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            base_url: base_url(&raw.ip, raw.port.unwrap_or(DEFAULT_PORT)),
            verbose: raw.verbose,
            light_index: raw.light,
            timeout: raw
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            interval: Duration::from_millis(raw.interval_ms),
            colors: raw.colors,
            modes: raw.modes,
        }
    }

    /// File the configuration was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base URL of the light, always with a scheme.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether fetched light states should be logged.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Pause between two iterations of the run loop.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Names of the declared modes, in file order.
    pub fn mode_names(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    /// Connection settings for the device client.
    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig::new(self.base_url.clone())
            .with_light_index(self.light_index)
            .with_timeout(self.timeout)
    }

    /// Parse every entry of the `colors` table.
    pub fn color_table(&self) -> Result<ColorTable, ConfigError> {
        self.colors
            .iter()
            .map(|(name, value)| {
                value
                    .parse::<Color>()
                    .map(|color| (name.clone(), color))
                    .map_err(|source| ConfigError::InvalidColor {
                        name: name.clone(),
                        source,
                    })
            })
            .collect()
    }

    /// Build the strategy for `mode`.
    ///
    /// The mode must exist before anything else is validated, so a missing mode is reported
    /// even when the color table is broken. Only the selected mode is checked for shape.
    pub fn resolve_strategy(&self, mode: &str) -> Result<HueStrategy, ConfigError> {
        let value = self
            .modes
            .get(mode)
            .ok_or_else(|| ConfigError::ModeNotFound {
                mode: mode.to_string(),
                available: self.mode_names().map(str::to_string).collect(),
            })?;
        let table = self.color_table()?;

        let invalid = |reason: String| ConfigError::InvalidMode {
            mode: mode.to_string(),
            reason,
        };

        let raw: RawMode = serde_yaml::from_value(value.clone())
            .map_err(|err| invalid(err.to_string()))?;

        let kind = raw
            .kind
            .as_deref()
            .ok_or_else(|| invalid("missing `type`".into()))?
            .parse::<StrategyKind>()
            .map_err(invalid)?;

        let strategy = match kind {
            StrategyKind::Random => HueStrategy::Random,
            StrategyKind::Rotate => HueStrategy::Rotate,
            StrategyKind::Linear => {
                let names = raw
                    .colors
                    .as_deref()
                    .ok_or_else(|| invalid("linear mode requires `colors`".into()))?;
                let steps = match raw.steps {
                    None => DEFAULT_STEPS,
                    Some(steps) => usize::try_from(steps)
                        .map_err(|_| invalid(format!("`steps` must be at least 2, got {steps}")))?,
                };
                HueStrategy::linear(names, &table, steps).map_err(|source| {
                    ConfigError::InvalidGradient {
                        mode: mode.to_string(),
                        source,
                    }
                })?
            }
        };

        Ok(strategy)
    }
}

#[derive(Debug, Deserialize)]
/// YAML representation of the configuration file.
struct RawConfig {
    ip: String,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    verbose: bool,
    #[serde(default)]
    light: usize,
    /// Per-request timeout; missing or `0` falls back to [`DEFAULT_TIMEOUT`].
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(default)]
    interval_ms: u64,
    #[serde(default, deserialize_with = "unique_keys")]
    colors: IndexMap<String, String>,
    /// Kept untyped so a malformed mode only fails when it is selected.
    #[serde(default, deserialize_with = "unique_keys")]
    modes: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Default, Deserialize)]
/// YAML representation of one entry under `modes`.
struct RawMode {
    #[serde(rename = "type")]
    kind: Option<String>,
    colors: Option<Vec<String>>,
    steps: Option<i64>,
}

/// Deserialize a mapping, rejecting repeated keys instead of keeping the last one.
fn unique_keys<'de, D, V>(deserializer: D) -> Result<IndexMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct UniqueKeys<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeys<V> {
        type Value = IndexMap<String, V>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a mapping with unique keys")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry::<String, V>()? {
                if map.contains_key(&key) {
                    return Err(de::Error::custom(format_args!("duplicate key `{key}`")));
                }
                map.insert(key, value);
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(UniqueKeys(PhantomData))
}

/// Turn the `ip` key into a base URL, adding scheme and port when missing.
///
/// Bare IPv6 literals are bracketed; `[addr]:port` and `host:port` are kept as written.
fn base_url(ip: &str, port: u16) -> String {
    let ip = ip.trim().trim_end_matches('/');
    if ip.contains("://") {
        ip.to_string()
    } else if ip.parse::<Ipv6Addr>().is_ok() {
        format!("http://[{ip}]:{port}")
    } else if ip.starts_with('[') && ip.ends_with(']') {
        format!("http://{ip}:{port}")
    } else if ip.contains(':') {
        format!("http://{ip}")
    } else {
        format!("http://{ip}:{port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
ip: 192.168.178.64
verbose: true
colors:
  red: "255,0,0"
  blue: "0, 0, 255"
  green: "0,255,0"
modes:
  rotate:
    type: rotate
  party:
    type: random
  sunset:
    type: linear
    colors: [red, blue]
    steps: 3
  rainbow:
    type: linear
    colors: [red, green, blue]
"#;

    fn parse(contents: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::from_yaml(contents, Path::new("test.yml"))
    }

    #[test]
    fn parses_sample_config() {
        let config = parse(SAMPLE).unwrap();
        assert_eq!(config.base_url(), "http://192.168.178.64:9123");
        assert!(config.verbose());
        assert_eq!(config.interval(), Duration::ZERO);
        assert_eq!(
            config.mode_names().collect::<Vec<_>>(),
            vec!["rotate", "party", "sunset", "rainbow"]
        );

        let device = config.device_config();
        assert_eq!(device.light_index, 0);
        assert_eq!(device.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn resolves_each_strategy_kind() {
        let config = parse(SAMPLE).unwrap();
        assert_eq!(config.resolve_strategy("rotate").unwrap().kind(), StrategyKind::Rotate);
        assert_eq!(config.resolve_strategy("party").unwrap().kind(), StrategyKind::Random);

        let HueStrategy::Linear(cursor) = config.resolve_strategy("rainbow").unwrap() else {
            panic!("expected linear strategy");
        };
        assert_eq!(cursor.sequence().len(), 3 * (DEFAULT_STEPS - 1));
    }

    #[test]
    fn red_blue_gradient_cycles_through_four_hues() {
        let mut strategy = parse(SAMPLE).unwrap().resolve_strategy("sunset").unwrap();
        let hues: Vec<u16> = (0..8).map(|_| strategy.next_hue(0)).collect();
        assert_eq!(hues, vec![0, 300, 240, 300, 0, 300, 240, 300]);
    }

    #[test]
    fn missing_mode_is_reported_before_bad_colors() {
        let config = parse("ip: 10.0.0.2\ncolors: {red: \"300,0,0\"}\nmodes: {rotate: {type: rotate}}")
            .unwrap();
        let err = config.resolve_strategy("foo").unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = config.resolve_strategy("rotate").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColor { ref name, .. } if name == "red"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn invalid_modes_exit_with_three() {
        let config = parse(
            r#"
ip: 10.0.0.2
colors: {red: "255,0,0", blue: "0,0,255"}
modes:
  lonely: {type: linear, colors: [red]}
  missing: {type: linear}
  unknown: {type: linear, colors: [red, mauve]}
  flat: {type: linear, colors: [red, blue], steps: 1}
  negative: {type: linear, colors: [red, blue], steps: -4}
  sparkle: {type: sparkle}
  untyped: {colors: [red, blue]}
"#,
        )
        .unwrap();

        for mode in ["lonely", "missing", "unknown", "flat", "negative", "sparkle", "untyped"] {
            let err = config.resolve_strategy(mode).unwrap_err();
            assert_eq!(err.exit_code(), 3, "{mode}: {err}");
        }

        assert!(matches!(
            config.resolve_strategy("unknown").unwrap_err(),
            ConfigError::InvalidGradient {
                source: crate::gradient::GradientError::UnknownColor { ref name },
                ..
            } if name == "mauve"
        ));
    }

    #[test]
    fn duplicate_color_names_are_rejected() {
        let err = parse("ip: 10.0.0.2\ncolors:\n  red: \"255,0,0\"\n  red: \"0,0,255\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_ip_is_a_parse_error() {
        let err = parse("verbose: true\n").unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn optional_keys_override_defaults() {
        let config = parse("ip: 10.0.0.2\nport: 8080\nlight: 1\ntimeout_secs: 3\ninterval_ms: 250\n").unwrap();
        assert_eq!(config.base_url(), "http://10.0.0.2:8080");
        assert_eq!(config.interval(), Duration::from_millis(250));

        let device = config.device_config();
        assert_eq!(device.light_index, 1);
        assert_eq!(device.timeout, Duration::from_secs(3));
    }

    #[test]
    fn base_url_keeps_explicit_scheme_and_port() {
        assert_eq!(base_url("10.0.0.2:9000", DEFAULT_PORT), "http://10.0.0.2:9000");
        assert_eq!(base_url("https://lamp.local/", DEFAULT_PORT), "https://lamp.local");
        assert_eq!(base_url(" lamp.local ", 80), "http://lamp.local:80");
    }

    #[test]
    fn base_url_brackets_ipv6_literals() {
        assert_eq!(base_url("fe80::1", DEFAULT_PORT), "http://[fe80::1]:9123");
        assert_eq!(base_url("[fe80::1]", DEFAULT_PORT), "http://[fe80::1]:9123");
        assert_eq!(base_url("[fe80::1]:8080", DEFAULT_PORT), "http://[fe80::1]:8080");
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let config = parse("ip: 10.0.0.2\ntimeout_secs: 0\n").unwrap();
        assert_eq!(config.device_config().timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn malformed_mode_shapes_exit_with_three() {
        let config = parse(
            r#"
ip: 10.0.0.2
colors: {red: "255,0,0", blue: "0,0,255"}
modes:
  rotate: {type: rotate}
  fractional: {type: linear, colors: [red, blue], steps: 2.5}
  scalar: {type: linear, colors: red}
  bare:
"#,
        )
        .unwrap();

        for mode in ["fractional", "scalar", "bare"] {
            let err = config.resolve_strategy(mode).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidMode { .. }), "{mode}: {err}");
            assert_eq!(err.exit_code(), 3);
        }
    }

    #[test]
    fn broken_mode_does_not_block_other_modes() {
        let config = parse(
            "ip: 10.0.0.2\nmodes:\n  rotate: {type: rotate}\n  broken: {type: linear, steps: [1]}\n",
        )
        .unwrap();
        assert_eq!(config.resolve_strategy("rotate").unwrap().kind(), StrategyKind::Rotate);
    }
}
