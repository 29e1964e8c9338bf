//! 日志初始化.
//!
//! 双输出:
//! - console: 彩色, 写入 stderr, 级别随 -v/-vv 提升
//! - file: 无色, 默认 info, 可通过 -v/-vv 或 COMPOSITE_LOG 环境变量调整
//!
//! 日志文件输出到 $cwd/logs/{prefix}.{date}.log. 库 crate 经 `log` 门面输出的
//! 记录由 tracing-subscriber 转发.

use std::sync::OnceLock;

use anyhow::Context;
use chrono::{Datelike, Local, Timelike};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// 文件日志级别覆盖环境变量
const LOG_ENV: &str = "COMPOSITE_LOG";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// 初始化日志系统
///
/// - `file_prefix`: 日志文件前缀
/// - `verbosity`: 0=info, 1=debug, 2+=trace
pub fn init(file_prefix: &str, verbosity: u8) -> anyhow::Result<()> {
    std::fs::create_dir_all("logs").context("创建日志目录失败")?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_prefix)
        .filename_suffix("log")
        .build("logs")
        .context("创建日志文件失败")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD.set(guard).ok();

    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let console_layer = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .event_format(LineFormatter { ansi: true })
        .with_filter(EnvFilter::new(level));

    let file_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(LineFormatter { ansi: false })
        .with_filter(file_filter);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("注册日志订阅者失败")?;
    Ok(())
}

/// 单行格式: `[月-日 时:分:秒.毫秒] 级别 > 消息`, console 输出时级别带颜色
struct LineFormatter {
    ansi: bool,
}

impl LineFormatter {
    fn level_color(level: tracing::Level) -> &'static str {
        match level {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            _ => "\x1b[34m",
        }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = Local::now();
        let level = *event.metadata().level();
        write!(
            writer,
            "[{:02}-{:02} {:02}:{:02}:{:02}.{:03}] ",
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis(),
        )?;
        if self.ansi {
            write!(writer, "{}{level:5}\x1b[0m > ", Self::level_color(level))?;
        } else {
            write!(writer, "{level:5} > ")?;
        }
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
