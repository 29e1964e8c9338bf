//! 编解码上下文.
//!
//! 一幅图像对应一个上下文. 上下文持有载波表、两路滤波器、相位标志和历史行缓冲,
//! 每次编码/解码调用都会修改这些状态, 因此必须按从上到下的顺序逐行调用,
//! 且同一上下文不能并发使用.

use composite_core::{
    CompositeError, CompositeResult, Iq, Rgb, SpectralEstimator, color::luma, try_alloc,
};
use log::debug;

use crate::biquad::BiquadFilter;
use crate::demodulator::{self, SeparatorMode};
use crate::diagnostics::{CarrierReport, DiagnosticSink, NullSink};
use crate::generator::{CarrierGenerator, LinePhase};
use crate::harmonic::HarmonicCanceller;
use crate::modulator;

/// 扫描线宽度上限 (不含)
pub const MAX_WIDTH: usize = 65535;

/// 同相通道截止频率 (占采样率比例)
pub const I_CUTOFF: f32 = 0.08;

/// 正交通道截止频率, 正交分量带宽更窄
pub const Q_CUTOFF: f32 = 0.05;

/// 复合视频编解码上下文
pub struct CompositeContext {
    /// 扫描线宽度
    width: usize,
    /// 当前行载波相位
    phase: LinePhase,
    /// 载波表
    generator: CarrierGenerator,
    /// 色差采样缓冲, 每次调用整体覆盖
    iq: Vec<Iq>,
    /// 亮度工作区, 调用结束时保存本行原始复合信号
    luma: Vec<f32>,
    /// 色度工作区, 调用结束时保存本行原始复合信号
    chroma: Vec<f32>,
    /// 同相通道滤波器
    i_filter: BiquadFilter,
    /// 正交通道滤波器
    q_filter: BiquadFilter,
    /// 谐波残差消除器, 存在时解码使用谐波模式
    canceller: Option<HarmonicCanceller>,
    /// 诊断输出
    diagnostics: Box<dyn DiagnosticSink>,
}

impl CompositeContext {
    /// 创建梳状分离模式的上下文
    pub fn new(width: usize) -> CompositeResult<Self> {
        Self::build(width, None)
    }

    /// 创建谐波分离模式的上下文
    ///
    /// 估计器的块长度必须为 [`crate::harmonic::FILTER_BLOCK_WIDTH`].
    pub fn with_estimator(
        width: usize,
        estimator: Box<dyn SpectralEstimator>,
    ) -> CompositeResult<Self> {
        Self::build(width, Some(estimator))
    }

    fn build(width: usize, estimator: Option<Box<dyn SpectralEstimator>>) -> CompositeResult<Self> {
        if width >= MAX_WIDTH {
            return Err(CompositeError::WidthOutOfRange(width));
        }

        let generator = CarrierGenerator::new(width)?;
        let canceller = estimator.map(HarmonicCanceller::new).transpose()?;

        let ctx = Self {
            width,
            phase: LinePhase::Even,
            iq: try_alloc(width, "色差缓冲")?,
            luma: try_alloc(width, "亮度历史")?,
            chroma: try_alloc(width, "色度历史")?,
            generator,
            i_filter: BiquadFilter::low_pass(I_CUTOFF),
            q_filter: BiquadFilter::low_pass(Q_CUTOFF),
            canceller,
            diagnostics: Box::new(NullSink),
        };

        debug!(
            "创建复合视频上下文: 宽度={}, 载波频率={}, 分离模式={}",
            ctx.width,
            ctx.generator.frequency(),
            ctx.separator_mode(),
        );
        Ok(ctx)
    }

    /// 启用诊断输出, 立即报告载波参数
    pub fn enable_diagnostics(&mut self, sink: Box<dyn DiagnosticSink>) {
        self.diagnostics = sink;
        CarrierReport::from_generator(&self.generator).emit(self.diagnostics.as_mut());
    }

    /// 编码一行
    ///
    /// # 参数
    /// - `input`: 交错 RGB, 长度 `3 * width`
    /// - `output`: 复合信号, 长度 `width`
    pub fn encode_line(&mut self, input: &[f32], output: &mut [f32]) -> CompositeResult<()> {
        check_len("编码输入", input.len(), self.width * 3)?;
        check_len("编码输出", output.len(), self.width)?;

        for (iq, px) in self.iq.iter_mut().zip(input.chunks_exact(3)) {
            *iq = Iq::from_rgb(&Rgb::from_slice(px));
        }

        modulator::modulate_line(
            self.generator.carrier(self.phase),
            &mut self.i_filter,
            &mut self.q_filter,
            &self.iq,
            output,
        );

        for (out, px) in output.iter_mut().zip(input.chunks_exact(3)) {
            *out += luma(&Rgb::from_slice(px));
        }

        self.phase.flip();
        Ok(())
    }

    /// 解码一行
    ///
    /// # 参数
    /// - `input`: 复合信号, 长度 `width`
    /// - `output`: 交错 RGB, 长度 `3 * width`
    pub fn decode_line(&mut self, input: &[f32], output: &mut [f32]) -> CompositeResult<()> {
        check_len("解码输入", input.len(), self.width)?;
        check_len("解码输出", output.len(), self.width * 3)?;

        match &mut self.canceller {
            None => demodulator::separate_comb(input, &mut self.luma, &mut self.chroma),
            Some(canceller) => {
                demodulator::separate_direct(input, &mut self.luma, &mut self.chroma);
                canceller.apply(&mut self.luma, &self.chroma);
            }
        }

        demodulator::demodulate_line(
            self.generator.carrier(self.phase),
            &mut self.i_filter,
            &mut self.q_filter,
            &self.chroma,
            &mut self.iq,
        );
        demodulator::reconstruct_rgb(&self.iq, &self.luma, output);

        // 历史始终保存原始复合信号, 而不是分离结果
        self.luma.copy_from_slice(input);
        self.chroma.copy_from_slice(input);

        self.phase.flip();
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// 下一次调用将使用的载波相位
    pub fn phase(&self) -> LinePhase {
        self.phase
    }

    pub fn separator_mode(&self) -> SeparatorMode {
        if self.canceller.is_some() {
            SeparatorMode::Harmonic
        } else {
            SeparatorMode::Comb
        }
    }

    pub fn is_harmonic(&self) -> bool {
        self.canceller.is_some()
    }

    pub fn generator(&self) -> &CarrierGenerator {
        &self.generator
    }

    /// 亮度历史 (上一次解码的原始输入)
    pub fn luma_history(&self) -> &[f32] {
        &self.luma
    }

    /// 色度历史 (上一次解码的原始输入)
    pub fn chroma_history(&self) -> &[f32] {
        &self.chroma
    }

    /// 同相/正交滤波器当前状态
    pub fn filter_states(&self) -> ((f32, f32), (f32, f32)) {
        (self.i_filter.state(), self.q_filter.state())
    }
}

impl std::fmt::Debug for CompositeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeContext")
            .field("width", &self.width)
            .field("phase", &self.phase)
            .field("frequency", &self.generator.frequency())
            .field("mode", &self.separator_mode())
            .finish_non_exhaustive()
    }
}

fn check_len(what: &str, actual: usize, expected: usize) -> CompositeResult<()> {
    if actual != expected {
        return Err(CompositeError::ContractViolation(format!(
            "{what}长度为 {actual}, 需要 {expected}",
        )));
    }
    Ok(())
}
