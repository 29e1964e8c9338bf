//! RGB ↔ YIQ 变换.
//!
//! 使用固定系数矩阵, 输入输出均为归一化浮点:
//! ```text
//! Y =  0.30 * R + 0.59 * G + 0.11 * B
//! I =  0.60 * R - 0.28 * G - 0.32 * B
//! Q =  0.21 * R - 0.52 * G + 0.31 * B
//!
//! R = Y + 0.96 * I + 0.62 * Q
//! G = Y - 0.27 * I - 0.65 * Q
//! B = Y - 1.11 * I + 1.70 * Q
//! ```
//! 不做钳位, 钳位由调用方在转换回字节时完成.

/// 一个 RGB 像素 (归一化浮点)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// 从交错排列的 RGB 三元组读取像素
    ///
    /// `px` 至少包含 3 个元素.
    #[inline]
    pub fn from_slice(px: &[f32]) -> Self {
        Self {
            r: px[0],
            g: px[1],
            b: px[2],
        }
    }

    /// 写回交错排列的 RGB 三元组
    #[inline]
    pub fn write_to(&self, px: &mut [f32]) {
        px[0] = self.r;
        px[1] = self.g;
        px[2] = self.b;
    }
}

/// 两路色差分量 (同相 I, 正交 Q)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Iq {
    /// 同相分量
    pub i: f32,
    /// 正交分量
    pub q: f32,
}

impl Iq {
    pub const fn new(i: f32, q: f32) -> Self {
        Self { i, q }
    }

    /// RGB → IQ
    #[inline]
    pub fn from_rgb(rgb: &Rgb) -> Self {
        Self {
            i: rgb.r * 0.6 - rgb.g * 0.28 - rgb.b * 0.32,
            q: rgb.r * 0.21 - rgb.g * 0.52 + rgb.b * 0.31,
        }
    }

    /// IQ + Y → RGB
    #[inline]
    pub fn to_rgb(&self, y: f32) -> Rgb {
        Rgb {
            r: self.i * 0.96 + self.q * 0.62 + y,
            g: self.i * (-0.27) - self.q * 0.65 + y,
            b: self.i * (-1.11) + self.q * 1.7 + y,
        }
    }
}

/// RGB → Y (亮度)
#[inline]
pub fn luma(rgb: &Rgb) -> f32 {
    rgb.r * 0.30 + rgb.g * 0.59 + rgb.b * 0.11
}
