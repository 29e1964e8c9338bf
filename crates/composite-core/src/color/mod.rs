//! 色彩相关类型定义.
//!
//! RGB 与 YIQ (亮度 + 两路色差) 之间的固定线性变换.

mod yiq;

pub use yiq::{Iq, Rgb, luma};
