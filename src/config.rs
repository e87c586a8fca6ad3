//! TOML configuration for `tscout`.
//!
//! Every section is optional; a missing file yields [`Config::default`].
//!
//! ```toml
//! [site]
//! entry = "search"
//!
//! [browser]
//! webdriver_url = "http://localhost:9515"
//! browser = "chrome"
//! headless = false
//!
//! [timeouts]
//! ready_secs = 60
//! interaction_secs = 15
//!
//! [selectors]
//! flight_button = "button.flight-result-button"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::form::EntryPoint;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub selectors: Selectors,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_home_url")]
    pub home_url: String,
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default)]
    pub entry: EntryPoint,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            search_url: default_search_url(),
            entry: EntryPoint::default(),
        }
    }
}

impl SiteConfig {
    /// URL hosting the search form for the given entry point.
    pub fn entry_url(&self, entry: EntryPoint) -> &str {
        match entry {
            EntryPoint::Home => &self.home_url,
            EntryPoint::Search => &self.search_url,
        }
    }
}

fn default_home_url() -> String {
    "https://www.transavia.com/fr-FR/accueil/".to_string()
}
fn default_search_url() -> String {
    "https://www.transavia.com/fr-FR/reservez-un-vol/vols/rechercher/".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Firefox,
    Chrome,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default)]
    pub browser: Browser,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            browser: Browser::default(),
            headless: default_headless(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}
fn default_headless() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutsConfig {
    /// Upper bound for the search form to appear after navigation.
    #[serde(default = "default_ready_secs")]
    pub ready_secs: u64,
    /// Upper bound for any single page interaction.
    #[serde(default = "default_interaction_secs")]
    pub interaction_secs: u64,
    /// Polling period while waiting for an element.
    #[serde(default = "default_poll_millis")]
    pub poll_millis: u64,
}

impl TimeoutsConfig {
    pub fn ready(&self) -> Duration {
        Duration::from_secs(self.ready_secs)
    }

    pub fn interaction(&self) -> Duration {
        Duration::from_secs(self.interaction_secs)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_millis)
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            ready_secs: default_ready_secs(),
            interaction_secs: default_interaction_secs(),
            poll_millis: default_poll_millis(),
        }
    }
}

/// Upper bound for any configured timeout (one day).
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

fn default_ready_secs() -> u64 {
    60
}
fn default_interaction_secs() -> u64 {
    15
}
fn default_poll_millis() -> u64 {
    250
}

/// CSS selectors for every element the pipeline touches.
///
/// Defaults match the live site; override them when the markup changes.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Selectors {
    /// Readiness marker: present once the search form has loaded.
    pub ready_marker: String,
    pub cookie_accept: String,
    pub origin_input: String,
    pub destination_input: String,
    pub outbound_date_input: String,
    pub return_date_input: String,
    pub outbound_section: String,
    pub inbound_section: String,
    pub date_tab_strip: String,
    pub date_tab: String,
    /// Class carried by date tabs that have flights.
    pub availability_class: String,
    pub date_tab_button: String,
    pub flight_button: String,
    pub price: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            ready_marker: "#routeSelection_DepartureStation-input".to_string(),
            cookie_accept: "button.info-banner-button-all.button-call-to-action".to_string(),
            origin_input: "input#routeSelection_DepartureStation-input".to_string(),
            destination_input: "input#routeSelection_ArrivalStation-input".to_string(),
            outbound_date_input: "input#dateSelection_OutboundDate-datepicker".to_string(),
            return_date_input: "input#dateSelection_IsReturnFlight-datepicker".to_string(),
            outbound_section: "section.flight.outbound".to_string(),
            inbound_section: "section.flight.inbound".to_string(),
            date_tab_strip: ".nav-days .animation-container form".to_string(),
            date_tab: ".day-with-availability".to_string(),
            availability_class: "day-with-availability".to_string(),
            date_tab_button: ".button".to_string(),
            flight_button: "button.flight-result-button".to_string(),
            price: "div.price".to_string(),
        }
    }
}

impl Selectors {
    fn all(&self) -> [(&'static str, &str); 14] {
        [
            ("ready_marker", &self.ready_marker),
            ("cookie_accept", &self.cookie_accept),
            ("origin_input", &self.origin_input),
            ("destination_input", &self.destination_input),
            ("outbound_date_input", &self.outbound_date_input),
            ("return_date_input", &self.return_date_input),
            ("outbound_section", &self.outbound_section),
            ("inbound_section", &self.inbound_section),
            ("date_tab_strip", &self.date_tab_strip),
            ("date_tab", &self.date_tab),
            ("availability_class", &self.availability_class),
            ("date_tab_button", &self.date_tab_button),
            ("flight_button", &self.flight_button),
            ("price", &self.price),
        ]
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` when it exists, otherwise fall back to defaults.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

pub fn validate(config: &Config) -> Result<()> {
    let t = &config.timeouts;
    if t.ready_secs == 0 || t.ready_secs > MAX_TIMEOUT_SECS {
        bail!("timeouts.ready_secs must be between 1 and {}", MAX_TIMEOUT_SECS);
    }
    if t.interaction_secs == 0 || t.interaction_secs > MAX_TIMEOUT_SECS {
        bail!("timeouts.interaction_secs must be between 1 and {}", MAX_TIMEOUT_SECS);
    }
    if t.poll_millis == 0 || t.poll_millis >= t.interaction_secs.saturating_mul(1000) {
        bail!("timeouts.poll_millis must be > 0 and shorter than timeouts.interaction_secs");
    }

    if config.site.home_url.trim().is_empty() || config.site.search_url.trim().is_empty() {
        bail!("site.home_url and site.search_url must not be empty");
    }
    if config.browser.webdriver_url.trim().is_empty() {
        bail!("browser.webdriver_url must not be empty");
    }

    for (name, value) in config.selectors.all() {
        if value.trim().is_empty() {
            bail!("selectors.{} must not be empty", name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.timeouts.ready_secs, 60);
        assert_eq!(config.site.entry, EntryPoint::Home);
        assert_eq!(config.browser.browser, Browser::Firefox);
        assert!(config.browser.headless);
        assert_eq!(config.selectors.flight_button, "button.flight-result-button");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let file = write_config(
            r#"
[site]
entry = "search"

[browser]
browser = "chrome"
headless = false

[selectors]
price = "span.amount"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.site.entry, EntryPoint::Search);
        assert_eq!(
            config.site.entry_url(config.site.entry),
            "https://www.transavia.com/fr-FR/reservez-un-vol/vols/rechercher/"
        );
        assert_eq!(config.browser.browser, Browser::Chrome);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.webdriver_url, "http://localhost:4444");
        assert_eq!(config.selectors.price, "span.amount");
        assert_eq!(config.selectors.date_tab, ".day-with-availability");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let file = write_config("[timeouts]\ninteraction_secs = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("interaction_secs"));
    }

    #[test]
    fn test_huge_timeouts_rejected() {
        let file = write_config("[timeouts]\ninteraction_secs = 9223372036854775807\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("interaction_secs"));

        let file = write_config("[timeouts]\nready_secs = 86401\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_poll_longer_than_interaction_rejected() {
        let file = write_config("[timeouts]\ninteraction_secs = 1\npoll_millis = 1000\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_blank_selector_rejected() {
        let file = write_config("[selectors]\nflight_button = \"  \"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("selectors.flight_button"));
    }

    #[test]
    fn test_unknown_entry_rejected() {
        let file = write_config("[site]\nentry = \"mobile\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = load_config_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.timeouts.interaction_secs, 15);
    }
}
