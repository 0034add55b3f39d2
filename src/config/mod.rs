use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Desktop-browser user agent for watch-page requests; the platform may
/// block obviously non-browser clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fallback preference list handed to the extraction tool when a video
/// advertises no caption language.
pub const DEFAULT_LANGUAGES: &str = "en,en-US,en-GB";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,

    /// Subtitle extraction settings
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Working directory for temporary subtitle files (a private temp
    /// directory is used when unset)
    pub work_dir: Option<PathBuf>,

    /// Default output format
    pub default_output_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Explicit yt-dlp path; discovered in PATH when unset
    pub ytdlp_path: Option<PathBuf>,

    /// Cookies file forwarded to yt-dlp for gated videos
    pub cookies_file: Option<PathBuf>,

    /// Language preference list used when a video has no detectable
    /// caption language
    pub default_languages: String,

    /// Watch-page metadata timeout in seconds
    pub metadata_timeout_secs: u64,

    /// User agent for watch-page and timed-text requests
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                work_dir: None,
                default_output_format: "text".to_string(),
            },
            extraction: ExtractionConfig {
                ytdlp_path: None,
                cookies_file: None,
                default_languages: DEFAULT_LANGUAGES.to_string(),
                metadata_timeout_secs: 30,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("tubetext").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.extraction.metadata_timeout_secs == 0 {
            anyhow::bail!("metadata_timeout_secs must be greater than zero");
        }

        crate::utils::validate_lang_param(&self.extraction.default_languages)
            .context("default_languages must be a comma-separated list of language codes")?;

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        if let Some(dir) = &self.app.work_dir {
            println!("  Work Dir: {}", dir.display());
        } else {
            println!("  Work Dir: (private temp directory)");
        }
        println!("  Default Format: {}", self.app.default_output_format);
        if let Some(path) = &self.extraction.ytdlp_path {
            println!("  yt-dlp Path: {}", path.display());
        } else {
            println!("  yt-dlp Path: (discovered in PATH)");
        }
        if let Some(path) = &self.extraction.cookies_file {
            println!("  Cookies File: {}", path.display());
        }
        println!("  Default Languages: {}", self.extraction.default_languages);
        println!("  Metadata Timeout: {}s", self.extraction.metadata_timeout_secs);
    }

    /// Interactive configuration setup
    pub async fn interactive_setup(&self) -> Result<()> {
        println!("Interactive configuration setup coming soon!");
        println!("For now, please edit the config file manually:");
        println!("  {}", Self::config_path()?.display());
        Ok(())
    }
}
