//! # composite-gha
//!
//! 广义谐波分析 (GHA) 频谱估计器, 实现 [`SpectralEstimator`].
//!
//! 对一个短块反复执行单分量提取:
//! 1. 补零 FFT 求周期图峰值, 得到粗略频率
//! 2. 在峰值附近半个主瓣内做黄金分割搜索, 使 `{sin ωn, cos ωn}` 最小二乘拟合
//!    捕获的能量最大, 得到精确频率
//! 3. 由最小二乘系数 `a sin + b cos` 得到幅度 `hypot(a, b)` 与相位 `atan2(b, a)`
//! 4. 从残差中扣除该分量, 继续提取下一个
//!
//! 残差能量过低或拟合矩阵奇异时提前停止, 返回已提取的分量.
//!
//! ## 使用示例
//!
//! ```rust
//! use composite_core::{HarmonicEstimate, SpectralEstimator};
//! use composite_gha::GhaEstimator;
//!
//! let mut gha = GhaEstimator::new(16).unwrap();
//! let block: Vec<f32> = (0..16).map(|n| 0.3 * (2.15 * n as f32 + 0.4).sin()).collect();
//! let mut out = [HarmonicEstimate::default(); 4];
//! let found = gha.extract_top(&block, &mut out);
//! assert!(found >= 1);
//! assert!((out[0].frequency - 2.15).abs() < 1e-3);
//! ```

use std::f64::consts::PI;
use std::sync::Arc;

use composite_core::{
    CompositeError, CompositeResult, HarmonicEstimate, SpectralEstimator, try_alloc,
};
use log::debug;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// FFT 补零倍数
const OVERSAMPLE: usize = 16;

/// 残差能量下限, 低于此值视为退化块
const MIN_ENERGY: f64 = 1e-12;

/// 拟合矩阵奇异判定阈值 (相对)
const SINGULAR_EPS: f64 = 1e-12;

/// 黄金分割搜索迭代次数
const GOLDEN_ITERATIONS: usize = 60;

/// 广义谐波分析估计器
pub struct GhaEstimator {
    /// 块长度
    block_size: usize,
    /// 补零后的 FFT 长度
    fft_size: usize,
    /// 预先规划的前向 FFT
    fft: Arc<dyn Fft<f64>>,
    /// 频谱缓冲
    spectrum: Vec<Complex<f64>>,
    /// FFT 暂存区
    scratch: Vec<Complex<f64>>,
    /// 当前残差
    residual: Vec<f64>,
}

/// 固定频率下的最小二乘拟合结果 `a sin(ωn) + b cos(ωn)`
#[derive(Debug, Clone, Copy)]
struct SineFit {
    a: f64,
    b: f64,
    /// 拟合捕获的能量
    energy: f64,
}

impl GhaEstimator {
    /// 创建估计器
    ///
    /// 块长度至少为 2.
    pub fn new(block_size: usize) -> CompositeResult<Self> {
        if block_size < 2 {
            return Err(CompositeError::InvalidArgument(format!(
                "GHA 块长度至少为 2, 实际为 {block_size}",
            )));
        }

        let fft_size = (block_size * OVERSAMPLE).next_power_of_two();
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        debug!("创建 GHA 估计器: 块长度={block_size}, FFT 长度={fft_size}");

        Ok(Self {
            block_size,
            fft_size,
            fft,
            spectrum: try_alloc(fft_size, "GHA 频谱缓冲")?,
            scratch: try_alloc(scratch_len, "GHA FFT 暂存")?,
            residual: try_alloc(block_size, "GHA 残差")?,
        })
    }

    /// 从残差中提取一个最强分量, 并从残差中扣除
    fn extract_one(&mut self) -> Option<HarmonicEstimate> {
        let energy: f64 = self.residual.iter().map(|x| x * x).sum();
        if energy < MIN_ENERGY {
            return None;
        }

        let coarse = self.coarse_frequency()?;

        // 半个主瓣宽度内搜索
        let half_lobe = PI / self.block_size as f64;
        let lo = (coarse - half_lobe).max(0.0);
        let hi = (coarse + half_lobe).min(PI);
        let residual = &self.residual;
        let omega = golden_section_max(lo, hi, |w| {
            fit_sine(residual, w).map_or(f64::NEG_INFINITY, |f| f.energy)
        });

        let fit = fit_sine(&self.residual, omega)?;
        if fit.energy <= MIN_ENERGY {
            return None;
        }

        for (n, x) in self.residual.iter_mut().enumerate() {
            let theta = omega * n as f64;
            *x -= fit.a * theta.sin() + fit.b * theta.cos();
        }

        Some(HarmonicEstimate {
            frequency: omega as f32,
            magnitude: fit.a.hypot(fit.b) as f32,
            phase: fit.b.atan2(fit.a) as f32,
        })
    }

    /// 补零周期图峰值对应的角频率
    fn coarse_frequency(&mut self) -> Option<f64> {
        for (k, c) in self.spectrum.iter_mut().enumerate() {
            let x = self.residual.get(k).copied().unwrap_or(0.0);
            *c = Complex::new(x, 0.0);
        }
        self.fft.process_with_scratch(&mut self.spectrum, &mut self.scratch);

        let half = self.fft_size / 2;
        let peak = (0..=half).max_by(|&a, &b| {
            self.spectrum[a]
                .norm_sqr()
                .total_cmp(&self.spectrum[b].norm_sqr())
        })?;
        Some(2.0 * PI * peak as f64 / self.fft_size as f64)
    }
}

impl SpectralEstimator for GhaEstimator {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn extract_top(&mut self, block: &[f32], out: &mut [HarmonicEstimate]) -> usize {
        if block.len() != self.block_size {
            debug!(
                "GHA 输入块长度 {} 与估计器块长度 {} 不符, 不返回分量",
                block.len(),
                self.block_size
            );
            return 0;
        }

        for (r, &x) in self.residual.iter_mut().zip(block) {
            *r = x as f64;
        }

        let mut count = 0;
        while count < out.len() {
            match self.extract_one() {
                Some(estimate) => {
                    out[count] = estimate;
                    count += 1;
                }
                None => break,
            }
        }

        out[..count].sort_unstable_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
        count
    }
}

/// 固定频率下拟合 `a sin(ωn) + b cos(ωn)`
///
/// 两个基底线性相关时退化为单基底拟合, 两者都为零时返回 `None`.
fn fit_sine(x: &[f64], omega: f64) -> Option<SineFit> {
    let (mut ss, mut cc, mut sc, mut xs, mut xc) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (n, &v) in x.iter().enumerate() {
        let (s, c) = (omega * n as f64).sin_cos();
        ss += s * s;
        cc += c * c;
        sc += s * c;
        xs += v * s;
        xc += v * c;
    }

    let det = ss * cc - sc * sc;
    let scale = (ss + cc) * (ss + cc);
    let (a, b) = if det > SINGULAR_EPS * scale {
        ((xs * cc - xc * sc) / det, (xc * ss - xs * sc) / det)
    } else if cc > SINGULAR_EPS {
        (0.0, xc / cc)
    } else if ss > SINGULAR_EPS {
        (xs / ss, 0.0)
    } else {
        return None;
    };

    let fit = SineFit {
        a,
        b,
        energy: a * xs + b * xc,
    };
    fit.energy.is_finite().then_some(fit)
}

/// 在 `[lo, hi]` 上用黄金分割搜索单峰函数的最大值点
fn golden_section_max(mut lo: f64, mut hi: f64, f: impl Fn(f64) -> f64) -> f64 {
    let ratio = (5.0f64.sqrt() - 1.0) / 2.0;
    let mut x1 = hi - ratio * (hi - lo);
    let mut x2 = lo + ratio * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);

    for _ in 0..GOLDEN_ITERATIONS {
        if f1 < f2 {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + ratio * (hi - lo);
            f2 = f(x2);
        } else {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - ratio * (hi - lo);
            f1 = f(x1);
        }
    }
    (lo + hi) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(n: usize, freq: f32, mag: f32, phase: f32) -> Vec<f32> {
        (0..n)
            .map(|i| mag * (freq * i as f32 + phase).sin())
            .collect()
    }

    #[test]
    fn test_单分量精确恢复() {
        let mut gha = GhaEstimator::new(16).unwrap();
        let block = tone(16, 2.15, 0.3, 0.4);
        let mut out = [HarmonicEstimate::default(); 1];
        assert_eq!(gha.extract_top(&block, &mut out), 1);
        let est = out[0];
        assert!((est.frequency - 2.15).abs() < 1e-3, "frequency={}", est.frequency);
        assert!((est.magnitude - 0.3).abs() < 1e-3, "magnitude={}", est.magnitude);
        assert!((est.phase - 0.4).abs() < 1e-2, "phase={}", est.phase);
    }

    #[test]
    fn test_全零块为退化结果() {
        let mut gha = GhaEstimator::new(16).unwrap();
        let mut out = [HarmonicEstimate::default(); 4];
        assert_eq!(gha.extract_top(&[0.0; 16], &mut out), 0);
    }

    #[test]
    fn test_纯正弦提取后提前停止() {
        let mut gha = GhaEstimator::new(16).unwrap();
        let block = tone(16, 1.3, 0.5, -0.7);
        let mut out = [HarmonicEstimate::default(); 4];
        let found = gha.extract_top(&block, &mut out);
        assert!(found >= 1);
        assert!((out[0].frequency - 1.3).abs() < 1e-3);
        // 第一个分量之后的残差只剩数值误差
        for est in &out[1..found] {
            assert!(est.magnitude < 1e-3, "残差分量过大: {est:?}");
        }
    }

    #[test]
    fn test_直流块频率接近零() {
        let mut gha = GhaEstimator::new(16).unwrap();
        let mut out = [HarmonicEstimate::default(); 4];
        let found = gha.extract_top(&[0.25; 16], &mut out);
        assert!(found >= 1);
        assert!(out[0].frequency < 0.3, "frequency={}", out[0].frequency);
        assert!((out[0].magnitude - 0.25).abs() < 0.05);
    }

    #[test]
    fn test_two_tones_strongest_first() {
        let mut gha = GhaEstimator::new(16).unwrap();
        let a = tone(16, 1.0, 0.5, 0.0);
        let b = tone(16, 2.2, 0.2, 0.3);
        let block: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
        let mut out = [HarmonicEstimate::default(); 4];
        let found = gha.extract_top(&block, &mut out);
        assert!(found >= 2);
        for pair in out[..found].windows(2) {
            assert!(pair[0].magnitude >= pair[1].magnitude);
        }
        assert!((out[0].frequency - 1.0).abs() < 0.1, "{:?}", out[0]);
        assert!(
            out[..found].iter().any(|e| (e.frequency - 2.2).abs() < 0.15),
            "{:?}",
            &out[..found]
        );
    }

    #[test]
    fn test_块长度不符() {
        let mut gha = GhaEstimator::new(16).unwrap();
        let mut out = [HarmonicEstimate::default(); 4];
        assert_eq!(gha.extract_top(&[0.5; 8], &mut out), 0);
        assert_eq!(gha.block_size(), 16);
    }

    #[test]
    fn test_拒绝过小的块() {
        assert!(GhaEstimator::new(0).is_err());
        assert!(GhaEstimator::new(1).is_err());
        assert!(GhaEstimator::new(2).is_ok());
    }

    #[test]
    fn test_golden_section_max() {
        let x = golden_section_max(0.0, 3.0, |w| -(w - 1.234) * (w - 1.234));
        assert!((x - 1.234).abs() < 1e-6);
    }
}
