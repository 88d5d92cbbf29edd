use std::process::ExitCode;

use configs::{AppConfig, LogFormat, LoggingConfig};
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging(cfg: &LoggingConfig) {
    // 日志文件不可用时退回 stdout，保证启动错误仍然可见
    if let Some(path) = &cfg.file {
        match common::utils::logging::init_logging_file(path, cfg.format == LogFormat::Json) {
            Ok(()) => {
                info!(service = "server", event = "logger_init", file = %path.display(), "tracing subscriber initialized");
                return;
            }
            Err(e) => {
                common::utils::logging::init_logging_default();
                error!(service = "server", event = "logger_init_failed", file = %path.display(), error = %e, "cannot open log file, logging to stdout");
                return;
            }
        }
    }
    match cfg.format {
        LogFormat::Json => common::utils::logging::init_logging_json(),
        LogFormat::Compact => common::utils::logging::init_logging_default(),
    }
    info!(service = "server", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> ExitCode {
    // 提前加载 .env，使得 RUST_LOG 及配置覆盖项生效
    dotenv().ok();

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "server", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&cfg.logging);

    // 基础服务上下文（不含敏感信息）
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    // 按配置构建 Tokio 运行时
    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "server",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        data_file = %cfg.storage.resorts_csv.display(),
        "ski resort service starting"
    );

    rt.block_on(async move {
        let server_task = tokio::spawn(async move {
            if let Err(e) = server::run(cfg).await {
                error!(service = "server", event = "run_failed", error = %e, "server::run returned error");
                Err(e)
            } else {
                Ok(())
            }
        });

        tokio::select! {
            res = server_task => {
                match res {
                    Ok(Ok(())) => {
                        info!(service = "server", event = "stop", %service_id, pid, "server stopped normally");
                        ExitCode::SUCCESS
                    }
                    // 错误已在任务内记录
                    Ok(Err(_)) => ExitCode::FAILURE,
                    Err(e) => {
                        error!(service = "server", event = "task_join_error", error = %e, "server task join error");
                        ExitCode::FAILURE
                    }
                }
            }
            // 收到 Ctrl+C 时直接退出，未完成的请求随运行时一起丢弃
            _ = tokio::signal::ctrl_c() => {
                info!(service = "server", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
                ExitCode::SUCCESS
            }
        }
    })
}
