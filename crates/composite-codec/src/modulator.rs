//! 正交调制 (编码路径).
//!
//! 将一行 IQ 色差调制到副载波上. 低通滤波带来约 3 个采样的群延迟,
//! 因此先用前 3 个采样预热滤波器, 输出整体左移 3 个位置,
//! 行尾再送入 3 个零值把残余能量排空到最后 3 个输出位置.

use composite_core::Iq;

use crate::biquad::BiquadFilter;
use crate::generator::Carrier;

/// 色差滤波群延迟补偿 (采样数)
pub const CHROMA_SHIFT: usize = 3;

/// 调制一行色差, 结果写入 `out` (长度与 `iq` 相同)
///
/// 只写入调制后的色度分量, 亮度由调用方叠加.
pub(crate) fn modulate_line(
    carrier: Carrier<'_>,
    i_filter: &mut BiquadFilter,
    q_filter: &mut BiquadFilter,
    iq: &[Iq],
    out: &mut [f32],
) {
    let width = iq.len();
    let (sin, cos) = (carrier.sin, carrier.cos);

    // 预热滤波器, 输出丢弃
    for i in 0..CHROMA_SHIFT.min(width) {
        i_filter.process(iq[i].i * sin[i]);
        q_filter.process(iq[i].q * cos[i]);
    }

    for i in CHROMA_SHIFT..width {
        let j = i - CHROMA_SHIFT;
        out[j] = i_filter.process(iq[i].i) * sin[j] + q_filter.process(iq[i].q) * cos[j];
    }

    // 排空延迟中的残余值
    for i in 0..CHROMA_SHIFT {
        let ei = i_filter.process(0.0);
        let eq = q_filter.process(0.0);
        if let Some(j) = (i + width).checked_sub(CHROMA_SHIFT) {
            out[j] = ei * sin[j] + eq * cos[j];
        }
    }
}
