//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.local.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, EngineKind};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "VOXALIGN";

/// 加载应用配置
///
/// # 环境变量示例
/// - `VOXALIGN_SERVER__PORT=8080`
/// - `VOXALIGN_TTS__URL=http://kokoro-tts:8880`
/// - `VOXALIGN_ALIGNMENT__DEVICE=cuda`
/// - `VOXALIGN_CONCURRENCY__MAX_CONCURRENT=4`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// `config_path` 为 None 时搜索工作目录下的默认配置文件
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("tts.engine", "http")?
        .set_default("tts.url", "http://localhost:8880")?
        .set_default("tts.timeout_secs", 120)?
        .set_default("alignment.engine", "http")?
        .set_default("alignment.url", "http://localhost:9000")?
        .set_default("alignment.budget_secs", 30)?
        .set_default("concurrency.max_concurrent", 2)?
        .set_default("concurrency.queue_timeout_secs", 60)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），层级分隔符 `__`
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.tts.engine == EngineKind::Http && config.tts.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    if config.alignment.engine == EngineKind::Http && config.alignment.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Alignment URL cannot be empty".to_string(),
        ));
    }

    if config.alignment.budget_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Alignment budget cannot be 0".to_string(),
        ));
    }

    if config.concurrency.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "max_concurrent must be at least 1".to_string(),
        ));
    }

    if config.voices.available.iter().all(|v| v.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "Voice table cannot be empty".to_string(),
        ));
    }

    for (alias, target) in &config.voices.aliases {
        let known = config
            .voices
            .available
            .iter()
            .any(|v| v.trim().eq_ignore_ascii_case(target.trim()));
        if !known {
            return Err(ConfigError::ValidationError(format!(
                "Voice alias '{}' points to unknown voice '{}'",
                alias, target
            )));
        }
    }

    if config.audio.opus_bitrate < 6000 || config.audio.opus_bitrate > 510_000 {
        return Err(ConfigError::ValidationError(format!(
            "Opus bitrate must be between 6000 and 510000, got {}",
            config.audio.opus_bitrate
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!(
        "TTS: {} ({}), timeout {}s",
        config.tts.url,
        config.tts.engine.as_str(),
        config.tts.timeout_secs
    );
    tracing::info!(
        "Alignment: {} ({}), model {} on {}, budget {}s",
        config.alignment.url,
        config.alignment.engine.as_str(),
        config.alignment.model,
        config.alignment.device,
        config.alignment.budget_secs
    );
    tracing::info!(
        "VAD: filter={}, min_silence={}ms",
        config.alignment.vad_filter,
        config.alignment.min_silence_duration_ms
    );
    match config.concurrency.queue_timeout() {
        Some(timeout) => tracing::info!(
            "Concurrency: {} in flight, queue timeout {}s",
            config.concurrency.max_concurrent,
            timeout.as_secs()
        ),
        None => tracing::info!(
            "Concurrency: {} in flight, unbounded queue",
            config.concurrency.max_concurrent
        ),
    }
    tracing::info!(
        "Voices: {} ({} aliases)",
        config.voices.available.len(),
        config.voices.aliases.len()
    );
    tracing::info!("Opus Bitrate: {}bps", config.audio.opus_bitrate);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
