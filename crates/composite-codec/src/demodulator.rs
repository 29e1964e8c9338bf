//! 亮色分离与正交解调 (解码路径).
//!
//! 分离方式在上下文创建时确定:
//! - 梳状模式: 相邻两行相加抵消 (反相的) 副载波得到亮度, 相减抵消亮度得到色度
//! - 谐波模式: 亮度直接取当前行, 之后由谐波残差消除器扣除副载波泄漏
//!
//! 两种模式下色度都取相邻两行之差的一半.

use composite_core::{Iq, Rgb};

use crate::biquad::BiquadFilter;
use crate::generator::Carrier;
use crate::modulator::CHROMA_SHIFT;

/// 解调增益, 抵消调制时 sin² / cos² 带来的一半幅度
pub const DEMOD_GAIN: f32 = 2.0;

/// 亮色分离方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeparatorMode {
    /// 两行梳状滤波
    #[default]
    Comb,
    /// 谐波残差消除
    Harmonic,
}

impl std::fmt::Display for SeparatorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comb => write!(f, "comb"),
            Self::Harmonic => write!(f, "harmonic"),
        }
    }
}

/// 梳状分离
///
/// `luma` / `chroma` 进入时保存上一行的原始复合信号, 返回时为本行分离结果.
pub(crate) fn separate_comb(input: &[f32], luma: &mut [f32], chroma: &mut [f32]) {
    for ((&x, l), c) in input.iter().zip(luma.iter_mut()).zip(chroma.iter_mut()) {
        *l = (x + *l) / 2.0;
        *c = (x - *c) / 2.0;
    }
}

/// 谐波模式下的分离: 亮度不做跨行平均
pub(crate) fn separate_direct(input: &[f32], luma: &mut [f32], chroma: &mut [f32]) {
    for ((&x, l), c) in input.iter().zip(luma.iter_mut()).zip(chroma.iter_mut()) {
        *l = x;
        *c = (x - *c) / 2.0;
    }
}

/// 解调一行色度信号, 结果写入 `iq` (长度与 `chroma` 相同)
///
/// 与调制相同的预热/左移/排空方式, 补偿低通滤波延迟.
pub(crate) fn demodulate_line(
    carrier: Carrier<'_>,
    i_filter: &mut BiquadFilter,
    q_filter: &mut BiquadFilter,
    chroma: &[f32],
    iq: &mut [Iq],
) {
    let width = chroma.len();
    let (sin, cos) = (carrier.sin, carrier.cos);

    // 预热滤波器, 输出丢弃
    for i in 0..CHROMA_SHIFT.min(width) {
        i_filter.process(chroma[i] * sin[i]);
        q_filter.process(chroma[i] * cos[i]);
    }

    // 色度整体左移 CHROMA_SHIFT 个像素
    for i in CHROMA_SHIFT..width {
        iq[i - CHROMA_SHIFT] = Iq {
            i: i_filter.process(chroma[i] * sin[i]) * DEMOD_GAIN,
            q: q_filter.process(chroma[i] * cos[i]) * DEMOD_GAIN,
        };
    }

    // 排空延迟中的残余值
    for i in 0..CHROMA_SHIFT {
        let ei = i_filter.process(0.0) * DEMOD_GAIN;
        let eq = q_filter.process(0.0) * DEMOD_GAIN;
        if let Some(j) = (i + width).checked_sub(CHROMA_SHIFT) {
            iq[j] = Iq::new(ei, eq);
        }
    }
}

/// 由解调色差与亮度重建交错 RGB
pub(crate) fn reconstruct_rgb(iq: &[Iq], luma: &[f32], out: &mut [f32]) {
    for ((c, &y), px) in iq.iter().zip(luma).zip(out.chunks_exact_mut(3)) {
        let rgb: Rgb = c.to_rgb(y);
        rgb.write_to(px);
    }
}
