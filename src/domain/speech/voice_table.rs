//! 音色表
//!
//! 启动时由配置构建，之后只读。
//!
//! 解析顺序（大小写不敏感）：
//! 1. 规范 ID 精确匹配，如 `af_bella`
//! 2. 配置中的显式别名
//! 3. 短名 `<name>` 先补默认语言前缀 `<lang>_<name>`
//! 4. 短名唯一后缀匹配 `*_<name>`

use serde::Serialize;
use std::collections::HashMap;

use super::errors::SpeechError;

/// 规范音色 ID（`<lang>_<name>`，小写）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 语言前缀（`af_bella` -> `af`）
    pub fn language(&self) -> &str {
        self.0.split_once('_').map(|(lang, _)| lang).unwrap_or("")
    }

    /// 短名（`af_bella` -> `bella`）
    pub fn name(&self) -> &str {
        self.0.split_once('_').map(|(_, name)| name).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct VoiceTable {
    voices: Vec<VoiceId>,
    aliases: HashMap<String, VoiceId>,
    default_language: String,
}

impl VoiceTable {
    pub fn new<I, S>(
        voices: I,
        aliases: &HashMap<String, String>,
        default_language: &str,
    ) -> Result<Self, SpeechError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table: Vec<VoiceId> = Vec::new();
        for voice in voices {
            let id = voice.as_ref().trim().to_lowercase();
            if id.is_empty() {
                continue;
            }
            if !table.iter().any(|v| v.0 == id) {
                table.push(VoiceId(id));
            }
        }

        if table.is_empty() {
            return Err(SpeechError::invalid_parameter(
                "voice table must contain at least one voice",
            ));
        }

        let mut resolved_aliases = HashMap::new();
        for (alias, target) in aliases {
            let target = target.trim().to_lowercase();
            let voice = table
                .iter()
                .find(|v| v.0 == target)
                .cloned()
                .ok_or_else(|| SpeechError::InvalidVoice(target.clone()))?;
            resolved_aliases.insert(alias.trim().to_lowercase(), voice);
        }

        Ok(Self {
            voices: table,
            aliases: resolved_aliases,
            default_language: default_language.trim().to_lowercase(),
        })
    }

    pub fn voices(&self) -> &[VoiceId] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// 解析调用方传入的音色名
    pub fn resolve(&self, requested: &str) -> Result<VoiceId, SpeechError> {
        let key = requested.trim().to_lowercase();
        if key.is_empty() {
            return Err(SpeechError::InvalidVoice(requested.to_string()));
        }

        if let Some(voice) = self.find(&key) {
            return Ok(voice.clone());
        }

        if let Some(voice) = self.aliases.get(&key) {
            return Ok(voice.clone());
        }

        if !key.contains('_') {
            let prefixed = format!("{}_{}", self.default_language, key);
            if let Some(voice) = self.find(&prefixed) {
                return Ok(voice.clone());
            }

            let mut candidates = self.voices.iter().filter(|v| v.name() == key);
            if let (Some(voice), None) = (candidates.next(), candidates.next()) {
                return Ok(voice.clone());
            }
        }

        Err(SpeechError::InvalidVoice(requested.to_string()))
    }

    fn find(&self, id: &str) -> Option<&VoiceId> {
        self.voices.iter().find(|v| v.0 == id)
    }
}
