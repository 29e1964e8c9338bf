//! 谐波残差消除器.
//!
//! 副载波在短窗口内近似纯正弦. 对色度信号分块做频谱估计, 找出落在副载波频带内的
//! 分量 (频率、幅度、相位), 直接从亮度中扣除, 比梳状平均更锐利.
//!
//! 分块方式:
//! - 窗口长度 16, 步长 8, 超出行尾部分补零
//! - 每块只校正中间一半 `[4, 12)` (块内坐标), 第一块额外覆盖 `[0, 4)`
//! - 到达行尾即停止

use std::ops::Range;

use composite_core::{
    CompositeError, CompositeResult, HarmonicEstimate, SpectralEstimator, try_alloc,
};
use log::trace;

/// 分析窗口长度 (采样)
pub const FILTER_BLOCK_WIDTH: usize = 16;

/// 每块请求的分量个数
pub const TOP_COMPONENTS: usize = 4;

/// 副载波频带 (弧度/采样)
pub const SUBCARRIER_BAND: Range<f32> = 2.0..2.3;

/// 谐波残差消除器
pub struct HarmonicCanceller {
    /// 外部注入的频谱估计器
    estimator: Box<dyn SpectralEstimator>,
    /// 分析窗口暂存
    block: Vec<f32>,
    /// 估计结果暂存
    candidates: Vec<HarmonicEstimate>,
}

impl HarmonicCanceller {
    /// 创建消除器
    ///
    /// 估计器的块长度必须等于 [`FILTER_BLOCK_WIDTH`].
    pub fn new(estimator: Box<dyn SpectralEstimator>) -> CompositeResult<Self> {
        if estimator.block_size() != FILTER_BLOCK_WIDTH {
            return Err(CompositeError::InvalidArgument(format!(
                "频谱估计器块长度为 {}, 需要 {}",
                estimator.block_size(),
                FILTER_BLOCK_WIDTH,
            )));
        }
        Ok(Self {
            estimator,
            block: try_alloc(FILTER_BLOCK_WIDTH, "谐波分析窗口")?,
            candidates: try_alloc(TOP_COMPONENTS, "谐波估计结果")?,
        })
    }

    /// 以 `chroma` 为分析信号, 从 `luma` 中扣除副载波泄漏
    ///
    /// 两个切片长度相同. 估计失败的块不做任何修改.
    pub fn apply(&mut self, luma: &mut [f32], chroma: &[f32]) {
        let width = luma.len();
        if width == 0 {
            return;
        }

        let hop = FILTER_BLOCK_WIDTH / 2;
        let quarter = FILTER_BLOCK_WIDTH / 4;

        let mut index = 0;
        loop {
            let start = index * hop;
            let estimate = self.estimate_block(chroma, start);

            let first = if index == 0 { 0 } else { quarter };
            for j in first..quarter + hop {
                let pos = start + j;
                if pos >= width {
                    return;
                }
                luma[pos] -= estimate.sample_at(j);
            }
            index += 1;
        }
    }

    /// 估计从 `start` 开始的一个窗口, 返回落在副载波频带内的第一个分量
    ///
    /// 没有合格分量时返回零分量.
    fn estimate_block(&mut self, chroma: &[f32], start: usize) -> HarmonicEstimate {
        let end = (start + FILTER_BLOCK_WIDTH).min(chroma.len());
        let copied = end - start;
        self.block[..copied].copy_from_slice(&chroma[start..end]);
        self.block[copied..].fill(0.0);

        let found = self
            .estimator
            .extract_top(&self.block, &mut self.candidates)
            .min(self.candidates.len());

        let selected = self.candidates[..found]
            .iter()
            .find(|c| SUBCARRIER_BAND.contains(&c.frequency))
            .filter(|c| c.magnitude.is_finite() && c.phase.is_finite());

        match selected {
            Some(c) => *c,
            None => {
                trace!("窗口 {start} 未找到副载波分量 (共 {found} 个候选), 跳过校正");
                HarmonicEstimate::default()
            }
        }
    }
}
