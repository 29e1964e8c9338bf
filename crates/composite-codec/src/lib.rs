//! # composite-codec
//!
//! 模拟复合彩色视频编解码引擎, 逐行处理静态图像, 重现亮色串扰、
//! 逐行副载波相位翻转和色度带宽受限等时代特征.
//!
//! ## 组成
//!
//! - **载波生成器** (`generator`): 两种行相位的正交参考表
//! - **双二阶滤波器** (`biquad`): 同相/正交两路低通, 状态贯穿整幅图像
//! - **调制器** (`modulator`): RGB 扫描线 → 复合信号
//! - **解调器** (`demodulator`): 复合信号 → RGB, 梳状或谐波分离
//! - **谐波残差消除器** (`harmonic`): 借助外部频谱估计器扣除副载波泄漏
//! - **诊断** (`diagnostics`): 载波参数报告
//!
//! ## 使用示例
//!
//! ```rust
//! use composite_codec::CompositeContext;
//!
//! let width = 8;
//! let mut encoder = CompositeContext::new(width).unwrap();
//! let rgb = vec![0.25f32; width * 3];
//! let mut composite = vec![0.0f32; width];
//! encoder.encode_line(&rgb, &mut composite).unwrap();
//!
//! let mut decoder = CompositeContext::new(width).unwrap();
//! let mut restored = vec![0.0f32; width * 3];
//! decoder.decode_line(&composite, &mut restored).unwrap();
//! ```

pub mod biquad;
pub mod context;
pub mod demodulator;
pub mod diagnostics;
pub mod generator;
pub mod harmonic;
pub mod modulator;

// 重导出常用类型
pub use biquad::BiquadFilter;
pub use context::{CompositeContext, MAX_WIDTH};
pub use demodulator::SeparatorMode;
pub use diagnostics::{CarrierReport, DiagnosticSink, LogSink, NullSink, WriterSink};
pub use generator::{Carrier, CarrierGenerator, LinePhase};
pub use harmonic::{FILTER_BLOCK_WIDTH, HarmonicCanceller};
