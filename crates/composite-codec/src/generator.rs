//! 副载波生成器.
//!
//! 预先计算两倍行宽的正弦/余弦表. 载波频率取奇数, 因此表的后半段恰好是
//! 前半段反相 180° 的载波, 相邻扫描线只需切换读取偏移即可实现逐行相位翻转.

use std::f64::consts::PI;

use composite_core::{CompositeResult, try_alloc};

/// 扫描线载波相位
///
/// 每处理一行 (编码或解码) 翻转一次, 从 `Even` 开始.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinePhase {
    /// 读取载波表前半段 `[0, width)`
    #[default]
    Even,
    /// 读取载波表后半段 `[width, 2 * width)`
    Odd,
}

impl LinePhase {
    /// 返回翻转后的相位
    pub const fn flipped(self) -> Self {
        match self {
            Self::Even => Self::Odd,
            Self::Odd => Self::Even,
        }
    }

    /// 原地翻转相位
    pub fn flip(&mut self) {
        *self = self.flipped();
    }

    pub const fn is_odd(self) -> bool {
        matches!(self, Self::Odd)
    }
}

/// 一行扫描线对应的载波窗口 (只读)
#[derive(Debug, Clone, Copy)]
pub struct Carrier<'a> {
    /// 同相参考 (正弦)
    pub sin: &'a [f32],
    /// 正交参考 (余弦)
    pub cos: &'a [f32],
}

/// 副载波生成器
pub struct CarrierGenerator {
    /// 正弦表, 长度 2 * width
    sin_table: Vec<f32>,
    /// 余弦表, 长度 2 * width
    cos_table: Vec<f32>,
    /// 载波频率 (每 2 * width 个采样内的周期数, 奇数)
    frequency: u32,
    /// 扫描线宽度
    width: usize,
}

/// 根据行宽选择载波频率: `floor(width / 1.46)` 并强制为奇数
pub fn carrier_frequency(width: usize) -> u32 {
    ((width as f64 / 1.46) as u32) | 0x01
}

impl CarrierGenerator {
    /// 创建生成器并预计算载波表
    pub fn new(width: usize) -> CompositeResult<Self> {
        let frequency = carrier_frequency(width);
        let n = 2 * width;
        let mut sin_table: Vec<f32> = try_alloc(n, "载波正弦表")?;
        let mut cos_table: Vec<f32> = try_alloc(n, "载波余弦表")?;

        let w = width as f64;
        let f = frequency as f64;
        for (i, (s, c)) in sin_table.iter_mut().zip(cos_table.iter_mut()).enumerate() {
            let theta = f * i as f64 * PI / w;
            *s = theta.sin() as f32;
            *c = theta.cos() as f32;
        }

        Ok(Self {
            sin_table,
            cos_table,
            frequency,
            width,
        })
    }

    /// 按相位选取长度为 width 的载波窗口
    ///
    /// 奇数行与偶数行共享同一份表, 只是起始偏移不同.
    pub fn carrier(&self, phase: LinePhase) -> Carrier<'_> {
        let offset = if phase.is_odd() { self.width } else { 0 };
        let range = offset..offset + self.width;
        Carrier {
            sin: &self.sin_table[range.clone()],
            cos: &self.cos_table[range],
        }
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// 载波周期 (像素)
    pub fn period(&self) -> f32 {
        (self.width * 2) as f32 / self.frequency as f32
    }

    /// 载波频率占最高可表示频率 (Nyquist) 的比例
    pub fn fraction_of_fmax(&self) -> f32 {
        2.0 / self.period()
    }
}
