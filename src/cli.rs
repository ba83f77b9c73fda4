use crate::config::ConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/flying_cat.json";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    config: Option<PathBuf>,
    media_dir: Option<PathBuf>,
    tick_ms: Option<u64>,
    idle_after_ms: Option<u64>,
    promote_after_ms: Option<u64>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Flags take the form --name value.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "media" => overrides.media_dir = Some(PathBuf::from(value)),
                "tick-ms" => overrides.tick_ms = Some(parse_millis("tick-ms", &value)?),
                "idle-ms" => overrides.idle_after_ms = Some(parse_millis("idle-ms", &value)?),
                "promote-ms" => overrides.promote_after_ms = Some(parse_millis("promote-ms", &value)?),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --media, --tick-ms, --idle-ms, --promote-ms."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn into_config_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            media_dir: self.media_dir,
            tick_ms: self.tick_ms,
            idle_after_ms: self.idle_after_ms,
            promote_after_ms: self.promote_after_ms,
        }
    }
}

fn parse_millis(flag: &str, value: &str) -> Result<u64> {
    let parsed = value.parse::<u64>().with_context(|| format!("Invalid {flag} value '{value}'"))?;
    if parsed == 0 {
        bail!("--{flag} must be greater than zero");
    }
    Ok(parsed)
}
