//! 双二阶 (biquad) 低通滤波器.
//!
//! 系数在创建时按截止频率一次性计算, 状态寄存器贯穿整幅图像持续演化,
//! 行与行之间不复位.

/// 固定品质因数
pub const FILTER_Q: f32 = 0.7;

/// 双二阶低通滤波器 (转置直接 II 型)
#[derive(Debug, Clone, PartialEq)]
pub struct BiquadFilter {
    a0: f32,
    a1: f32,
    a2: f32,
    b1: f32,
    b2: f32,
    /// 状态寄存器
    z1: f32,
    z2: f32,
}

impl BiquadFilter {
    /// 创建低通滤波器
    ///
    /// `cutoff` 为截止频率占采样率的比例 (`0 < cutoff < 0.5`).
    /// 双线性变换预畸变: k = tan(π * cutoff)
    /// norm = 1 / (1 + k/q + k²)
    /// a0 = a2 = k² * norm, a1 = 2 * a0
    /// b1 = 2 * (k² - 1) * norm, b2 = (1 - k/q + k²) * norm
    pub fn low_pass(cutoff: f32) -> Self {
        let k = (std::f64::consts::PI * cutoff as f64).tan() as f32;
        let q = FILTER_Q;
        let norm = 1.0 / (1.0 + k / q + k * k);
        let a0 = k * k * norm;
        Self {
            a0,
            a1: 2.0 * a0,
            a2: a0,
            b1: 2.0 * (k * k - 1.0) * norm,
            b2: (1.0 - k / q + k * k) * norm,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// 处理单个采样, 返回滤波输出并推进状态
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let out = input * self.a0 + self.z1;
        self.z1 = input * self.a1 + self.z2 - self.b1 * out;
        self.z2 = input * self.a2 - self.b2 * out;
        out
    }

    /// 系数 `(a0, a1, a2, b1, b2)`
    pub fn coefficients(&self) -> (f32, f32, f32, f32, f32) {
        (self.a0, self.a1, self.a2, self.b1, self.b2)
    }

    /// 状态寄存器 `(z1, z2)`
    pub fn state(&self) -> (f32, f32) {
        (self.z1, self.z2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biquad_coefficients() {
        let filter = BiquadFilter::low_pass(0.08);
        let (a0, a1, a2, b1, b2) = filter.coefficients();
        let k = (std::f32::consts::PI * 0.08).tan();
        let norm = 1.0 / (1.0 + k / 0.7 + k * k);
        assert!((a0 - k * k * norm).abs() < 1e-6);
        assert!((a1 - 2.0 * a0).abs() < 1e-7);
        assert_eq!(a0, a2);
        assert!((b1 - 2.0 * (k * k - 1.0) * norm).abs() < 1e-6);
        assert!((b2 - (1.0 - k / 0.7 + k * k) * norm).abs() < 1e-6);
        assert_eq!(filter.state(), (0.0, 0.0));
    }

    #[test]
    fn test_直流增益为一() {
        for cutoff in [0.05, 0.08] {
            let mut filter = BiquadFilter::low_pass(cutoff);
            let mut out = 0.0;
            for _ in 0..500 {
                out = filter.process(0.75);
            }
            assert!((out - 0.75).abs() < 1e-4, "cutoff={cutoff}, out={out}");
        }
    }

    #[test]
    fn test_process_silence() {
        let mut filter = BiquadFilter::low_pass(0.05);
        for _ in 0..32 {
            assert_eq!(filter.process(0.0), 0.0);
        }
        assert_eq!(filter.state(), (0.0, 0.0));
    }

    #[test]
    fn test_impulse_decays() {
        let mut filter = BiquadFilter::low_pass(0.05);
        let first = filter.process(1.0);
        assert!(first > 0.0);
        let mut tail = 0.0f32;
        for _ in 0..200 {
            tail = filter.process(0.0);
        }
        assert!(tail.abs() < 1e-6, "冲激响应未衰减: {tail}");
    }

    #[test]
    fn test_分批处理结果一致() {
        let input: Vec<f32> = (0..97)
            .map(|i| ((i * 37 % 11) as f32 - 5.0) * 0.1)
            .collect();

        let mut whole = BiquadFilter::low_pass(0.08);
        let expected: Vec<f32> = input.iter().map(|&x| whole.process(x)).collect();

        // 分成不等长的批次送入, 输出序列和最终状态应完全相同
        let mut batched = BiquadFilter::low_pass(0.08);
        let mut actual = Vec::with_capacity(input.len());
        for chunk in input.chunks(13) {
            for &x in chunk {
                actual.push(batched.process(x));
            }
        }
        assert_eq!(actual, expected);
        assert_eq!(batched.state(), whole.state());
    }

    #[test]
    fn test_high_frequency_attenuated() {
        // 奈奎斯特频率的交替序列应被强烈衰减
        let mut filter = BiquadFilter::low_pass(0.05);
        let mut peak = 0.0f32;
        for n in 0..400 {
            let x = if n % 2 == 0 { 1.0 } else { -1.0 };
            let y = filter.process(x);
            if n > 200 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 0.05, "peak={peak}");
    }
}
