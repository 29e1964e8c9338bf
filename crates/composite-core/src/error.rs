//! 统一错误类型定义.
//!
//! 所有 Composite crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// Composite 统一错误类型
#[derive(Debug, Error)]
pub enum CompositeError {
    /// 扫描线宽度超出范围 (必须小于 65535)
    #[error("扫描线宽度超出范围: {0} (必须小于 65535)")]
    WidthOutOfRange(usize),

    /// 内存分配失败
    #[error("内存分配失败: {0}")]
    OutOfMemory(String),

    /// 调用方违反缓冲区尺寸约定
    #[error("缓冲区尺寸不符合约定: {0}")]
    ContractViolation(String),

    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl CompositeError {
    /// 是否属于上下文创建阶段的错误
    pub fn is_creation_error(&self) -> bool {
        matches!(self, Self::WidthOutOfRange(_) | Self::OutOfMemory(_))
    }
}

/// Composite 统一 Result 类型
pub type CompositeResult<T> = Result<T, CompositeError>;
