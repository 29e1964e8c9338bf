//! # composite-core
//!
//! Composite 复合视频仿真核心库, 提供错误类型、色彩变换、采样缩放与频谱估计接口.
//!
//! 编解码引擎 (`composite-codec`) 与频谱估计器 (`composite-gha`) 都只依赖本 crate,
//! 二者之间通过 [`SpectralEstimator`] trait 解耦.

pub mod color;
pub mod error;
pub mod sample;
pub mod spectral;

use log::warn;

// 重导出常用类型
pub use color::{Iq, Rgb};
pub use error::{CompositeError, CompositeResult};
pub use spectral::{HarmonicEstimate, SpectralEstimator};

/// 尝试分配指定长度的零值缓冲区
///
/// 内存不足时返回 `OutOfMemory`, 而不是直接中止进程.
pub fn try_alloc<T: Clone + Default>(len: usize, what: &str) -> CompositeResult<Vec<T>> {
    let mut buf = Vec::new();
    if let Err(e) = buf.try_reserve_exact(len) {
        warn!("分配{what}失败: {len} 项");
        return Err(CompositeError::OutOfMemory(format!("{what} ({len} 项): {e}")));
    }
    buf.resize(len, T::default());
    Ok(buf)
}
