//! voxalign - TTS 网关
//!
//! 合成后端（GPU）+ 对齐后端（CPU）组合成一个请求/响应接口：
//! - Domain: speech/, alignment/, language
//! - Application: commands, queries, services, ports
//! - Infrastructure: http, adapters

use std::sync::Arc;

use voxalign::application::{
    AlignmentEnginePort, AudioCodecPort, ConcurrencyGovernor, TtsEnginePort,
};
use voxalign::config::{load_config, print_config, AppConfig, EngineKind, LogConfig};
use voxalign::domain::speech::VoiceTable;
use voxalign::infrastructure::adapters::{
    FakeAlignmentEngine, FakeTtsClient, HttpAlignmentClient, HttpAlignmentClientConfig,
    HttpTtsClient, HttpTtsClientConfig, SymphoniaCodec,
};
use voxalign::infrastructure::http::{AppState, HttpServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("voxalign {} - TTS gateway", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    let tts_engine = build_tts_engine(&config)?;
    let alignment_engine = build_alignment_engine(&config)?;
    let codec: Arc<dyn AudioCodecPort> = Arc::new(SymphoniaCodec::new(config.audio.opus_bitrate));

    let voices = VoiceTable::new(
        &config.voices.available,
        &config.voices.aliases,
        &config.voices.default_language,
    )
    .map_err(|e| anyhow::anyhow!("Invalid voice table: {}", e))?;

    let governor = Arc::new(ConcurrencyGovernor::new(
        config.concurrency.max_concurrent,
        config.concurrency.queue_timeout(),
    ));

    if !tts_engine.health_check().await {
        tracing::warn!(backend = tts_engine.backend_url(), "TTS backend is not reachable yet");
    }

    let state = AppState::new(
        tts_engine,
        alignment_engine,
        codec,
        Arc::new(voices),
        governor,
        config.alignment.budget(),
    );

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(config.server.max_body_bytes);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server.run_with_shutdown(shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志；`RUST_LOG` 优先于配置文件
fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},voxalign={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_tts_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn TtsEnginePort>> {
    let engine: Arc<dyn TtsEnginePort> = match config.tts.engine {
        EngineKind::Http => {
            let tts_config = HttpTtsClientConfig::new(&config.tts.url)
                .with_timeout(config.tts.timeout_secs);
            Arc::new(HttpTtsClient::new(tts_config)?)
        }
        EngineKind::Fake => {
            tracing::warn!("Using fake TTS engine (tone generator)");
            Arc::new(FakeTtsClient::default())
        }
    };
    Ok(engine)
}

fn build_alignment_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn AlignmentEnginePort>> {
    let engine: Arc<dyn AlignmentEnginePort> = match config.alignment.engine {
        EngineKind::Http => {
            let alignment = &config.alignment;
            let client_config = HttpAlignmentClientConfig {
                base_url: alignment.url.clone(),
                timeout_secs: alignment.timeout_secs,
                model: alignment.model.clone(),
                device: alignment.device.clone(),
                vad_filter: alignment.vad_filter,
                min_silence_duration_ms: alignment.min_silence_duration_ms,
            };
            Arc::new(HttpAlignmentClient::new(client_config)?)
        }
        EngineKind::Fake => {
            tracing::warn!("Using fake alignment engine (evenly spaced words)");
            Arc::new(FakeAlignmentEngine::new())
        }
    };
    Ok(engine)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => {
            // 无法监听信号时保持运行
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}
