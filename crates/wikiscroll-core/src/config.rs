use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::source::Source;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Source selected at start-up
    #[serde(default)]
    pub initial_source: Source,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            initial_source: Source::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// MediaWiki API endpoint
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Site root used to build article embed URLs (`{article_base}/?curid=N`)
    #[serde(default = "default_article_base")]
    pub article_base: String,
    /// Items requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Category listed by the featured source (without the `Category:` prefix)
    #[serde(default = "default_featured_category")]
    pub featured_category: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// HTTP proxy URL (e.g., "http://127.0.0.1:7890" or "socks5://127.0.0.1:1080")
    #[serde(default)]
    pub proxy_url: Option<String>,
    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            article_base: default_article_base(),
            page_size: default_page_size(),
            featured_category: default_featured_category(),
            request_timeout_secs: default_timeout(),
            proxy_url: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Item geometry, in layout units (pixels in a browser, scaled rows in the TUI)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Base height of an item in full layout
    #[serde(default = "default_full_base_height")]
    pub full_base_height: u32,
    /// Viewports narrower than or equal to this use the compact layout
    #[serde(default = "default_compact_breakpoint")]
    pub compact_breakpoint: u32,
    /// Extra height added to the embed frame in full layout
    #[serde(default = "default_full_extra_margin")]
    pub full_extra_margin: u32,
    /// Extra height added to the embed frame in compact layout
    #[serde(default = "default_compact_extra_margin")]
    pub compact_extra_margin: u32,
    /// Height added per expansion
    #[serde(default = "default_growth_step")]
    pub growth_step: u32,
    /// Height of the per-item chrome (title and expand affordance)
    #[serde(default = "default_chrome_height")]
    pub chrome_height: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            full_base_height: default_full_base_height(),
            compact_breakpoint: default_compact_breakpoint(),
            full_extra_margin: default_full_extra_margin(),
            compact_extra_margin: default_compact_extra_margin(),
            growth_step: default_growth_step(),
            chrome_height: default_chrome_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Margin applied above the viewport; negative values shrink the tracked region
    #[serde(default)]
    pub margin_top: i32,
    /// Margin applied below the viewport
    #[serde(default)]
    pub margin_bottom: i32,
    /// Visible fraction at which an extra visibility report is emitted
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            margin_top: 0,
            margin_bottom: 0,
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Distance from the document bottom at which the next page is requested
    #[serde(default = "default_prefetch_margin")]
    pub prefetch_margin: u32,
    /// Stop paginating a source once a response carries no continuation
    #[serde(default)]
    pub stop_at_end: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            prefetch_margin: default_prefetch_margin(),
            stop_at_end: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds when idle
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Animation frames per second (scroll checks run once per frame)
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Layout units drawn per terminal row
    #[serde(default = "default_units_per_row")]
    pub units_per_row: u32,
    /// Rows moved per line-scroll key press
    #[serde(default = "default_scroll_lines")]
    pub scroll_lines: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            units_per_row: default_units_per_row(),
            scroll_lines: default_scroll_lines(),
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-j>" (Ctrl+j), "<S-g>" (Shift+g), "<CR>" (Enter), "<Esc>", "<Tab>", "<Space>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the application
    #[serde(default = "default_key_quit")]
    pub quit: String,

    // Scrolling
    /// Scroll down by a few lines
    #[serde(default = "default_key_scroll_down")]
    pub scroll_down: String,
    /// Scroll up by a few lines
    #[serde(default = "default_key_scroll_up")]
    pub scroll_up: String,
    /// Scroll half page down
    #[serde(default = "default_key_scroll_half_down")]
    pub scroll_half_down: String,
    /// Scroll half page up
    #[serde(default = "default_key_scroll_half_up")]
    pub scroll_half_up: String,
    /// Scroll full page down
    #[serde(default = "default_key_scroll_page_down")]
    pub scroll_page_down: String,
    /// Scroll full page up
    #[serde(default = "default_key_scroll_page_up")]
    pub scroll_page_up: String,
    /// Jump to top of the feed
    #[serde(default = "default_key_jump_to_top")]
    pub jump_to_top: String,
    /// Jump to bottom of the feed
    #[serde(default = "default_key_jump_to_bottom")]
    pub jump_to_bottom: String,

    // Sources
    /// Switch to the random source
    #[serde(default = "default_key_source_random")]
    pub source_random: String,
    /// Switch to the featured source
    #[serde(default = "default_key_source_featured")]
    pub source_featured: String,
    /// Switch to the alphabetical source
    #[serde(default = "default_key_source_alphabetical")]
    pub source_alphabetical: String,
    /// Cycle to the next source
    #[serde(default = "default_key_next_source")]
    pub next_source: String,

    // Item actions
    /// Expand the item at the top of the viewport
    #[serde(default = "default_key_expand")]
    pub expand: String,
    /// Open the item at the top of the viewport in the browser
    #[serde(default = "default_key_open_browser")]
    pub open_browser: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            scroll_down: default_key_scroll_down(),
            scroll_up: default_key_scroll_up(),
            scroll_half_down: default_key_scroll_half_down(),
            scroll_half_up: default_key_scroll_half_up(),
            scroll_page_down: default_key_scroll_page_down(),
            scroll_page_up: default_key_scroll_page_up(),
            jump_to_top: default_key_jump_to_top(),
            jump_to_bottom: default_key_jump_to_bottom(),
            source_random: default_key_source_random(),
            source_featured: default_key_source_featured(),
            source_alphabetical: default_key_source_alphabetical(),
            next_source: default_key_next_source(),
            expand: default_key_expand(),
            open_browser: default_key_open_browser(),
        }
    }
}

// Default keymap values (Vim-style notation)
fn default_key_quit() -> String { "q".to_string() }
fn default_key_scroll_down() -> String { "j".to_string() }
fn default_key_scroll_up() -> String { "k".to_string() }
fn default_key_scroll_half_down() -> String { "<C-d>".to_string() }
fn default_key_scroll_half_up() -> String { "<C-u>".to_string() }
fn default_key_scroll_page_down() -> String { "<C-f>".to_string() }
fn default_key_scroll_page_up() -> String { "<C-b>".to_string() }
fn default_key_jump_to_top() -> String { "gg".to_string() }
fn default_key_jump_to_bottom() -> String { "G".to_string() }
fn default_key_source_random() -> String { "1".to_string() }
fn default_key_source_featured() -> String { "2".to_string() }
fn default_key_source_alphabetical() -> String { "3".to_string() }
fn default_key_next_source() -> String { "<Tab>".to_string() }
fn default_key_expand() -> String { "e".to_string() }
fn default_key_open_browser() -> String { "o".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wikiscroll")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_article_base() -> String {
    "https://en.wikipedia.org".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_featured_category() -> String {
    "Featured_articles".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("wikiscroll/{} (terminal article feed)", env!("CARGO_PKG_VERSION"))
}

fn default_full_base_height() -> u32 {
    600
}

fn default_compact_breakpoint() -> u32 {
    768
}

fn default_full_extra_margin() -> u32 {
    204
}

fn default_compact_extra_margin() -> u32 {
    245
}

fn default_growth_step() -> u32 {
    300
}

fn default_chrome_height() -> u32 {
    80 // title row + expand row at the default 40 units per row
}

fn default_threshold() -> f64 {
    0.1
}

fn default_prefetch_margin() -> u32 {
    5000
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_units_per_row() -> u32 {
    40
}

fn default_scroll_lines() -> u32 {
    3
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Render configuration as pretty TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/wikiscroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("wikiscroll")
            .join("config.toml")
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("wikiscroll.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_browser_layout() {
        let config = AppConfig::default();
        assert_eq!(config.layout.full_base_height, 600);
        assert_eq!(config.layout.full_extra_margin, 204);
        assert_eq!(config.layout.compact_extra_margin, 245);
        assert_eq!(config.layout.growth_step, 300);
        assert_eq!(config.feed.prefetch_margin, 5000);
        assert_eq!(config.source.page_size, 10);
        assert_eq!(config.general.initial_source, Source::Featured);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [general]
            initial_source = "random"

            [viewport]
            margin_bottom = -200
            "#,
        )
        .unwrap();

        assert_eq!(config.general.initial_source, Source::Random);
        assert_eq!(config.viewport.margin_bottom, -200);
        assert_eq!(config.viewport.margin_top, 0);
        assert_eq!(config.source.featured_category, "Featured_articles");
        assert_eq!(config.keymap.expand, "e");
    }

    #[test]
    fn test_toml_roundtrip_keeps_values() {
        let mut config = AppConfig::default();
        config.feed.stop_at_end = true;
        config.source.proxy_url = Some("socks5://127.0.0.1:1080".to_string());

        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert!(parsed.feed.stop_at_end);
        assert_eq!(parsed.source.proxy_url.as_deref(), Some("socks5://127.0.0.1:1080"));
    }

    #[test]
    fn test_invalid_source_is_config_error() {
        let err = AppConfig::from_toml("[general]\ninitial_source = \"trending\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
