//! 字节 ↔ 归一化浮点采样转换.
//!
//! 编解码引擎只处理以 0 为中心的浮点采样, 宿主程序在读入和写出图像时
//! 使用这里的转换: `v = b / 255 - 0.5`, 还原时四舍五入并钳位到 `[0, 255]`.

/// 8 位采样 → 归一化浮点 (`[-0.5, 0.5]`)
#[inline]
pub fn byte_to_sample(b: u8) -> f32 {
    b as f32 / 255.0 - 0.5
}

/// 归一化浮点 → 8 位采样 (四舍五入并钳位)
#[inline]
pub fn sample_to_byte(v: f32) -> u8 {
    let t = ((v + 0.5) * 255.0).round();
    if t.is_nan() {
        return 0;
    }
    t.clamp(0.0, 255.0) as u8
}

/// 批量转换一行字节为浮点采样
pub fn bytes_to_samples(src: &[u8], dst: &mut [f32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = byte_to_sample(s);
    }
}

/// 批量转换一行浮点采样为字节
pub fn samples_to_bytes(src: &[f32], dst: &mut [u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = sample_to_byte(s);
    }
}
