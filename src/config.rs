use std::str::FromStr;

pub const DEFAULT_MAZE_W: usize = 22;
pub const DEFAULT_MAZE_H: usize = 18;
pub const DEFAULT_TICK_MS: u64 = 33;
pub const DEFAULT_RENDER_FPS: u64 = 120;
pub const DEFAULT_MOBS: usize = 15;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub tick_ms: u64,
    pub render_fps: u64,
    pub mobs: usize,
    pub seed: Option<u64>,
    pub charge_infinite: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_MAZE_W,
            height: DEFAULT_MAZE_H,
            tick_ms: DEFAULT_TICK_MS,
            render_fps: DEFAULT_RENDER_FPS,
            mobs: DEFAULT_MOBS,
            seed: None,
            charge_infinite: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Missing or unusable values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            width: parse_var(&lookup, "MAZE_WIDTH", |v: &usize| *v >= 2).unwrap_or(d.width),
            height: parse_var(&lookup, "MAZE_HEIGHT", |v: &usize| *v >= 2).unwrap_or(d.height),
            tick_ms: parse_var(&lookup, "MAZE_TICK_MS", |v: &u64| *v > 0).unwrap_or(d.tick_ms),
            render_fps: parse_var(&lookup, "MAZE_FPS", |v: &u64| *v > 0).unwrap_or(d.render_fps),
            mobs: parse_var(&lookup, "MAZE_MOBS", |_: &usize| true).unwrap_or(d.mobs),
            seed: parse_var(&lookup, "MAZE_SEED", |_: &u64| true),
            charge_infinite: lookup("MAZE_CHARGE_INF")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(d.charge_infinite),
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    valid: impl Fn(&T) -> bool,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => Some(v),
        _ => {
            log::warn!("ignoring {}={:?}, using default", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn reads_values_and_rejects_bad_ones() {
        let s = settings(&[
            ("MAZE_WIDTH", "30"),
            ("MAZE_HEIGHT", "1"),
            ("MAZE_TICK_MS", "0"),
            ("MAZE_FPS", "abc"),
            ("MAZE_SEED", " 42 "),
            ("MAZE_CHARGE_INF", "true"),
        ]);
        assert_eq!(s.width, 30);
        assert_eq!(s.height, DEFAULT_MAZE_H);
        assert_eq!(s.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(s.render_fps, DEFAULT_RENDER_FPS);
        assert_eq!(s.seed, Some(42));
        assert!(s.charge_infinite);
    }
}
