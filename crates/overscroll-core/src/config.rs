use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Color theme of the interactive demo
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            theme: default_theme(),
        }
    }
}

/// Easing curve used by the scroll animator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    Linear,
    Cubic,
    Quintic,
    /// Exponential ease-out
    EaseOut,
    /// `1 - (1 - t)^(2 * factor)`, the factor comes from `PhysicsConfig::deceleration_factor`
    #[default]
    Decelerate,
}

/// Tuning constants for the touch and animation physics.
///
/// Distances suffixed `_dp` are density independent and get multiplied by
/// `density` before use; everything else is in physical pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Physical pixels per density independent pixel
    #[serde(default = "default_density")]
    pub density: f32,
    /// Multiplier applied to the remaining-viewport ratio when damping a pull
    #[serde(default = "default_damping")]
    pub damping: f32,
    /// Spring-back animation duration
    #[serde(default = "default_spring_back_duration")]
    pub spring_back_duration_ms: u64,
    /// Easing curve for spring-back and fling animations
    #[serde(default)]
    pub easing: EasingType,
    /// Exponent factor of the decelerate curve
    #[serde(default = "default_deceleration_factor")]
    pub deceleration_factor: f64,
    /// Distance a finger must travel before a touch becomes a drag
    #[serde(default = "default_touch_slop")]
    pub touch_slop_dp: f32,
    /// Minimum release velocity (per second) that counts as a fling
    #[serde(default = "default_min_fling_velocity")]
    pub min_fling_velocity_dp: f32,
    /// Velocity cap (per second)
    #[serde(default = "default_max_fling_velocity")]
    pub max_fling_velocity_dp: f32,
    /// How far back the velocity tracker looks
    #[serde(default = "default_velocity_horizon")]
    pub velocity_horizon_ms: i64,
    /// Pull-up distance past which releasing triggers load-more
    #[serde(default = "default_load_more_threshold")]
    pub load_more_threshold_dp: f32,
    /// Upper bound of a fling overshoot, as a fraction of the viewport height
    #[serde(default = "default_max_fling_overscroll_ratio")]
    pub max_fling_overscroll_ratio: f32,
    /// Target frame rate while an animation is running
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            damping: default_damping(),
            spring_back_duration_ms: default_spring_back_duration(),
            easing: EasingType::default(),
            deceleration_factor: default_deceleration_factor(),
            touch_slop_dp: default_touch_slop(),
            min_fling_velocity_dp: default_min_fling_velocity(),
            max_fling_velocity_dp: default_max_fling_velocity(),
            velocity_horizon_ms: default_velocity_horizon(),
            load_more_threshold_dp: default_load_more_threshold(),
            max_fling_overscroll_ratio: default_max_fling_overscroll_ratio(),
            animation_fps: default_animation_fps(),
        }
    }
}

impl PhysicsConfig {
    #[inline]
    fn px(&self, dp: f32) -> f32 {
        dp * self.density
    }

    /// Touch slop in physical pixels
    pub fn touch_slop_px(&self) -> i32 {
        self.px(self.touch_slop_dp).round() as i32
    }

    pub fn min_fling_velocity_px(&self) -> f32 {
        self.px(self.min_fling_velocity_dp)
    }

    pub fn max_fling_velocity_px(&self) -> f32 {
        self.px(self.max_fling_velocity_dp)
    }

    /// Load-more activation threshold in physical pixels
    pub fn load_more_threshold_px(&self) -> i32 {
        self.px(self.load_more_threshold_dp) as i32
    }

    /// Frame interval while animating
    pub fn animation_tick_duration(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_millis(1000 / self.animation_fps as u64)
        }
    }

    /// Reject values that would make the physics meaningless
    pub fn validate(&self) -> crate::Result<()> {
        if self.density <= 0.0 {
            return Err(crate::Error::Config("density must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(crate::Error::Config("damping must be within [0, 1]".into()));
        }
        if self.deceleration_factor <= 0.0 {
            return Err(crate::Error::Config(
                "deceleration_factor must be positive".into(),
            ));
        }
        if self.velocity_horizon_ms <= 0 {
            return Err(crate::Error::Config(
                "velocity_horizon_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Parameters of the interactive demo list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Items shown after a refresh
    #[serde(default = "default_initial_items")]
    pub initial_items: usize,
    /// Items appended by one load-more
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Load-more reports "no more data" once the list reaches this size
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Simulated refresh latency
    #[serde(default = "default_refresh_delay")]
    pub refresh_delay_ms: u64,
    /// Simulated load-more latency
    #[serde(default = "default_load_delay")]
    pub load_delay_ms: u64,
    /// Pixels represented by one terminal row
    #[serde(default = "default_row_pixels")]
    pub row_pixels: i32,
    /// Header rest height in rows
    #[serde(default = "default_header_rows")]
    pub header_rows: i32,
    /// Idle tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            initial_items: default_initial_items(),
            page_size: default_page_size(),
            max_items: default_max_items(),
            refresh_delay_ms: default_refresh_delay(),
            load_delay_ms: default_load_delay(),
            row_pixels: default_row_pixels(),
            header_rows: default_header_rows(),
            tick_rate_ms: default_tick_rate(),
        }
    }
}

impl DemoConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.row_pixels <= 0 {
            return Err(crate::Error::Config("row_pixels must be positive".into()));
        }
        if self.header_rows <= 0 {
            return Err(crate::Error::Config("header_rows must be positive".into()));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_theme() -> String {
    "gruvbox-dark".to_string()
}

fn default_density() -> f32 {
    1.0
}

fn default_damping() -> f32 {
    // empirical
    0.4
}

fn default_spring_back_duration() -> u64 {
    350
}

fn default_deceleration_factor() -> f64 {
    1.3
}

fn default_touch_slop() -> f32 {
    8.0
}

fn default_min_fling_velocity() -> f32 {
    50.0
}

fn default_max_fling_velocity() -> f32 {
    8000.0
}

fn default_velocity_horizon() -> i64 {
    100
}

fn default_load_more_threshold() -> f32 {
    50.0
}

fn default_max_fling_overscroll_ratio() -> f32 {
    0.25
}

fn default_animation_fps() -> u32 {
    60
}

fn default_initial_items() -> usize {
    25
}

fn default_page_size() -> usize {
    10
}

fn default_max_items() -> usize {
    55
}

fn default_refresh_delay() -> u64 {
    2000
}

fn default_load_delay() -> u64 {
    1000
}

fn default_row_pixels() -> i32 {
    16
}

fn default_header_rows() -> i32 {
    3
}

fn default_tick_rate() -> u64 {
    250
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, defaults when the file is missing
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.physics.validate()?;
        self.demo.validate()
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/overscroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("overscroll")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_physics() {
        let config = PhysicsConfig::default();
        assert_eq!(config.spring_back_duration_ms, 350);
        assert_eq!(config.easing, EasingType::Decelerate);
        assert!((config.damping - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.load_more_threshold_px(), 50);
        assert_eq!(config.touch_slop_px(), 8);
    }

    #[test]
    fn test_density_scaling() {
        let config = PhysicsConfig {
            density: 2.0,
            ..Default::default()
        };
        assert_eq!(config.load_more_threshold_px(), 100);
        assert_eq!(config.touch_slop_px(), 16);
        assert!((config.min_fling_velocity_px() - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [physics]
            damping = 0.3
            easing = "cubic"
            "#,
        )
        .unwrap();
        assert!((config.physics.damping - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.physics.easing, EasingType::Cubic);
        assert_eq!(config.physics.spring_back_duration_ms, 350);
        assert_eq!(config.demo.page_size, 10);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.theme, "gruvbox-dark");
    }

    #[test]
    fn test_validate_rejects_bad_damping() {
        let config = PhysicsConfig {
            damping: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(PhysicsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_rejects_empty_header() {
        let path = std::env::temp_dir().join(format!(
            "overscroll-config-{}-header.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[demo]\nheader_rows = 0\n").unwrap();
        let result = AppConfig::load_from(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_validate_demo_rows() {
        let config = DemoConfig {
            row_pixels: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tick_duration_fallback() {
        let config = PhysicsConfig {
            animation_fps: 0,
            ..Default::default()
        };
        assert_eq!(config.animation_tick_duration(), Duration::from_millis(16));
    }
}
