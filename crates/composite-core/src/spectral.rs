//! 频谱估计器接口.
//!
//! 谐波残差消除需要从短块实数采样中提取主导正弦分量.
//! 具体算法 (广义谐波分析等) 由外部实现, 编解码引擎只通过本 trait 调用.

/// 单个正弦分量的估计结果
///
/// 分量模型为 `magnitude * sin(frequency * n + phase)`, 其中 `n` 为块内采样下标.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HarmonicEstimate {
    /// 角频率 (弧度/采样), 取值 `[0, π]`
    pub frequency: f32,
    /// 幅度
    pub magnitude: f32,
    /// 初相 (弧度)
    pub phase: f32,
}

impl HarmonicEstimate {
    pub const fn new(frequency: f32, magnitude: f32, phase: f32) -> Self {
        Self {
            frequency,
            magnitude,
            phase,
        }
    }

    /// 在块内下标 `n` 处的分量取值
    #[inline]
    pub fn sample_at(&self, n: usize) -> f32 {
        self.magnitude * (self.frequency * n as f32 + self.phase).sin()
    }
}

/// 频谱估计器 trait
///
/// 估计器处理固定长度的采样块. 实现方需保证:
/// - 结果按幅度从强到弱排列
/// - 不在调用中分配内存 (预分配的暂存区可复用)
/// - 退化输入 (全零、奇异拟合) 时返回较少甚至零个分量, 而不是报错
pub trait SpectralEstimator: Send {
    /// 估计器接受的块长度
    fn block_size(&self) -> usize;

    /// 提取最强的若干个分量
    ///
    /// # 参数
    /// - `block`: 长度为 `block_size()` 的实数采样
    /// - `out`: 输出缓冲, 最多写入 `out.len()` 个分量
    ///
    /// # 返回
    /// 实际写入的分量个数
    fn extract_top(&mut self, block: &[f32], out: &mut [HarmonicEstimate]) -> usize;
}

impl<T: SpectralEstimator + ?Sized> SpectralEstimator for Box<T> {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn extract_top(&mut self, block: &[f32], out: &mut [HarmonicEstimate]) -> usize {
        (**self).extract_top(block, out)
    }
}
