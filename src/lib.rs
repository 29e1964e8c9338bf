//! # Composite
//!
//! 纯 Rust 实现的模拟复合彩色视频仿真, 逐行把 RGB 图像编码为单通道复合信号,
//! 再从复合信号解码回 RGB.
//!
//! 解码结果带有真实复合视频的时代特征:
//! - **亮色串扰**: 细密亮度纹理被误认为色度, 产生彩色干扰纹
//! - **逐行副载波翻转**: 相邻行载波相位相反, 梳状分离依赖这一点
//! - **色度带宽受限**: 同相/正交通道经过窄带低通, 颜色边缘拖尾
//!
//! # 快速开始
//!
//! ```rust
//! let width = 32;
//! let mut encoder = composite::create_context(width, false).unwrap();
//! let mut decoder = composite::create_context(width, true).unwrap();
//!
//! let rgb = vec![0.1f32; width * 3];
//! let mut signal = vec![0.0f32; width];
//! let mut restored = vec![0.0f32; width * 3];
//! for _ in 0..4 {
//!     encoder.encode_line(&rgb, &mut signal).unwrap();
//!     decoder.decode_line(&signal, &mut restored).unwrap();
//! }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `composite-core` | 错误类型、色彩变换、采样缩放、频谱估计接口 |
//! | `composite-codec` | 载波、滤波、调制、解调与谐波残差消除 |
//! | `composite-gha` | 广义谐波分析频谱估计器 |

pub mod raster;

/// 核心类型与工具
pub use composite_core as core;

/// 复合视频编解码引擎
pub use composite_codec as codec;

/// 广义谐波分析频谱估计器
pub use composite_gha as gha;

use composite_codec::{CompositeContext, FILTER_BLOCK_WIDTH};
use composite_core::CompositeResult;
use composite_gha::GhaEstimator;

/// 获取 Composite 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建编解码上下文
///
/// `harmonic` 为 true 时注入 [`GhaEstimator`], 解码使用谐波分离;
/// 否则使用梳状分离. 编码不受该标志影响.
pub fn create_context(width: usize, harmonic: bool) -> CompositeResult<CompositeContext> {
    if harmonic {
        let estimator = GhaEstimator::new(FILTER_BLOCK_WIDTH)?;
        CompositeContext::with_estimator(width, Box::new(estimator))
    } else {
        CompositeContext::new(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_create_context_模式() {
        assert!(!create_context(16, false).unwrap().is_harmonic());
        assert!(create_context(16, true).unwrap().is_harmonic());
    }

    #[test]
    fn test_create_context_宽度越界() {
        let err = create_context(65535, true).unwrap_err();
        assert!(err.is_creation_error());
    }
}
