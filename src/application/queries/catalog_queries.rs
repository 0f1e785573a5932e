//! Catalog Queries - 音色、模型与后端透传

/// 列出音色
#[derive(Debug, Clone)]
pub struct ListVoices;

/// 列出合成后端的模型
#[derive(Debug, Clone)]
pub struct ListModels;

/// 透传合成后端的 Web 界面
#[derive(Debug, Clone)]
pub struct ProxyWeb {
    /// `/web/` 之后的路径，可为空
    pub path: String,
}
