//! Configuration Types
//!
//! 定义所有配置结构体；启动时加载一次，之后只读

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 合成后端配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 对齐后端配置
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// 流水线并发配置
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,

    /// 音色表配置
    #[serde(default)]
    pub voices: VoicesConfig,

    /// 音频编码配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 后端实现选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// 远程 HTTP 后端
    #[default]
    Http,
    /// 进程内假后端（本地调试、测试）
    Fake,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Fake => "fake",
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024 // 50 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 合成后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub engine: EngineKind,

    /// 合成服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_url() -> String {
    "http://localhost:8880".to_string()
}

fn default_tts_timeout() -> u64 {
    120
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            url: default_tts_url(),
            timeout_secs: default_tts_timeout(),
        }
    }
}

/// 对齐后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct AlignmentConfig {
    #[serde(default)]
    pub engine: EngineKind,

    #[serde(default = "default_alignment_url")]
    pub url: String,

    /// HTTP 请求超时（秒）
    #[serde(default = "default_alignment_timeout")]
    pub timeout_secs: u64,

    /// 单次对齐的时间预算（秒），超出返回 AlignmentTimeout
    #[serde(default = "default_alignment_budget")]
    pub budget_secs: u64,

    /// 模型大小，如 tiny / base / small
    #[serde(default = "default_alignment_model")]
    pub model: String,

    /// 运行设备
    #[serde(default = "default_alignment_device")]
    pub device: String,

    /// 是否启用 VAD 过滤静音
    #[serde(default = "default_vad_filter")]
    pub vad_filter: bool,

    /// VAD 最小静音时长（毫秒）
    #[serde(default = "default_min_silence_duration_ms")]
    pub min_silence_duration_ms: u32,
}

fn default_alignment_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_alignment_timeout() -> u64 {
    60
}

fn default_alignment_budget() -> u64 {
    30
}

fn default_alignment_model() -> String {
    "tiny".to_string()
}

fn default_alignment_device() -> String {
    "cpu".to_string()
}

fn default_vad_filter() -> bool {
    true
}

fn default_min_silence_duration_ms() -> u32 {
    200
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            url: default_alignment_url(),
            timeout_secs: default_alignment_timeout(),
            budget_secs: default_alignment_budget(),
            model: default_alignment_model(),
            device: default_alignment_device(),
            vad_filter: default_vad_filter(),
            min_silence_duration_ms: default_min_silence_duration_ms(),
        }
    }
}

impl AlignmentConfig {
    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.budget_secs)
    }
}

/// 流水线并发配置
#[derive(Debug, Clone, Deserialize)]
pub struct ConcurrencyConfig {
    /// 同时执行的流水线请求上限
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 排队超时（秒），0 表示无限等待
    #[serde(default = "default_queue_timeout")]
    pub queue_timeout_secs: u64,
}

fn default_max_concurrent() -> usize {
    2
}

fn default_queue_timeout() -> u64 {
    60
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_timeout_secs: default_queue_timeout(),
        }
    }
}

impl ConcurrencyConfig {
    pub fn queue_timeout(&self) -> Option<Duration> {
        (self.queue_timeout_secs > 0).then(|| Duration::from_secs(self.queue_timeout_secs))
    }
}

/// 音色表配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoicesConfig {
    /// 规范音色 ID 列表
    #[serde(default = "default_voice_list")]
    pub available: Vec<String>,

    /// 别名 -> 规范 ID
    #[serde(default)]
    pub aliases: HashMap<String, String>,

    /// 短名补全时使用的语言前缀
    #[serde(default = "default_voice_language")]
    pub default_language: String,
}

fn default_voice_list() -> Vec<String> {
    [
        "af_alloy",
        "af_bella",
        "af_nova",
        "af_sky",
        "af_heart",
        "am_adam",
        "am_echo",
        "am_michael",
        "bf_emma",
        "bm_george",
    ]
    .iter()
    .map(|v| v.to_string())
    .collect()
}

fn default_voice_language() -> String {
    "af".to_string()
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            available: default_voice_list(),
            aliases: HashMap::new(),
            default_language: default_voice_language(),
        }
    }
}

/// 音频编码配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Opus 编码比特率（bps），语音 16000-64000 足够
    #[serde(default = "default_opus_bitrate")]
    pub opus_bitrate: u32,
}

fn default_opus_bitrate() -> u32 {
    32000
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            opus_bitrate: default_opus_bitrate(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
