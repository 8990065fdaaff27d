use crate::config::AppConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub fixture: Option<String>,
    script: Option<String>,
    frames: Option<usize>,
    tick_hz: Option<u32>,
}

impl CliArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = CliArgs::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Use --config/--script/--fixture/--frames/--tick-hz with values.");
            }
            let key = &flag[2..];
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?
                .as_ref()
                .to_string();
            match key {
                "config" => parsed.config = Some(value),
                "script" => parsed.script = Some(value),
                "fixture" => parsed.fixture = Some(value),
                "frames" => {
                    parsed.frames =
                        Some(value.parse::<usize>().with_context(|| format!("Invalid frame count '{value}'"))?);
                }
                "tick-hz" => {
                    parsed.tick_hz =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid tick rate '{value}'"))?);
                }
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --script, --fixture, --frames, --tick-hz."
                ),
            }
        }
        Ok(parsed)
    }

    pub fn into_config_overrides(self) -> AppConfigOverrides {
        AppConfigOverrides { script: self.script, frames: self.frames, tick_hz: self.tick_hz }
    }
}
