//! composite - 模拟复合彩色视频编解码命令行工具
//!
//! 编码: 读入 RGB 图像, 输出单通道复合信号图像.
//! 解码: 读入单通道复合信号图像, 输出 RGB 图像.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use log::{debug, info};

use composite::raster::{decode_image, encode_image};
use composite_codec::{DiagnosticSink, SeparatorMode, WriterSink};

#[derive(Parser, Debug)]
#[command(name = "composite-cli", version, about = "模拟复合彩色视频编解码工具")]
struct Cli {
    /// 处理模式
    #[arg(value_enum)]
    mode: Mode,

    /// 输入图像路径
    input: PathBuf,

    /// 输出图像路径, 格式由扩展名决定
    output: PathBuf,

    /// 解码时的亮色分离方式
    #[arg(long, value_enum, default_value_t = Separator::Harmonic)]
    separator: Separator,

    /// 在 stderr 输出载波参数
    #[arg(long)]
    diagnostics: bool,

    /// 日志级别 (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// 覆盖输出文件
    #[arg(short = 'y', long)]
    overwrite: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// RGB → 复合信号
    #[value(alias = "e")]
    Encode,
    /// 复合信号 → RGB
    #[value(alias = "d")]
    Decode,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Separator {
    /// 梳状分离
    Comb,
    /// 亮度直通, 谐波残差消除
    Harmonic,
}

impl From<Separator> for SeparatorMode {
    fn from(s: Separator) -> Self {
        match s {
            Separator::Comb => SeparatorMode::Comb,
            Separator::Harmonic => SeparatorMode::Harmonic,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init("composite-cli", cli.verbose) {
        eprintln!("警告: 日志初始化失败: {e:#}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if !cli.overwrite && cli.output.exists() {
        bail!("输出文件已存在 '{}', 使用 -y 覆盖", cli.output.display());
    }

    let diagnostics = cli
        .diagnostics
        .then(|| Box::new(WriterSink::new(std::io::stderr())) as Box<dyn DiagnosticSink>);

    let reader = image::open(&cli.input)
        .with_context(|| format!("无法读取输入图像 '{}'", cli.input.display()))?;
    debug!(
        "输入: {} ({}x{})",
        cli.input.display(),
        reader.width(),
        reader.height()
    );

    match cli.mode {
        Mode::Encode => {
            let encoded = encode_image(&reader.into_rgb8(), diagnostics).context("编码失败")?;
            encoded
                .save(&cli.output)
                .with_context(|| format!("无法写入输出图像 '{}'", cli.output.display()))?;
        }
        Mode::Decode => {
            let separator = SeparatorMode::from(cli.separator);
            let harmonic = separator == SeparatorMode::Harmonic;
            let decoded =
                decode_image(&reader.into_luma8(), harmonic, diagnostics).context("解码失败")?;
            decoded
                .save(&cli.output)
                .with_context(|| format!("无法写入输出图像 '{}'", cli.output.display()))?;
            debug!("分离方式: {separator}");
        }
    }

    info!("{:?} 完成: {}", cli.mode, cli.output.display());
    Ok(())
}
