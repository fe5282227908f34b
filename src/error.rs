//! # 统一错误处理模块
//!
//! 定义 vaspcollect 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use std::io;
use std::path::Path;
use thiserror::Error;

/// vaspcollect 统一错误类型
#[derive(Error, Debug)]
pub enum CollectError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    // ─────────────────────────────────────────────────────────────
    // 数据存储错误
    // ─────────────────────────────────────────────────────────────
    #[error("Corrupted data store: {path}")]
    StoreDecodeError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode data store: {path}")]
    StoreEncodeError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// 失败类别
///
/// 对应三类故障：文件缺失/不可读、内容格式错误、文件系统操作失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingFile,
    Unreadable,
    MalformedContent,
    Filesystem,
}

impl CollectError {
    /// 读取文件时的错误：NotFound 单独归类
    pub fn read(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            CollectError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            CollectError::FileReadError {
                path: path.display().to_string(),
                source,
            }
        }
    }

    pub fn write(path: &Path, source: io::Error) -> Self {
        CollectError::FileWriteError {
            path: path.display().to_string(),
            source,
        }
    }

    /// 构造解析错误
    pub fn parse(format: &str, path: &Path, reason: impl Into<String>) -> Self {
        CollectError::ParseError {
            format: format.to_string(),
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// 错误归类
    pub fn kind(&self) -> FailureKind {
        match self {
            CollectError::FileNotFound { .. } | CollectError::DirectoryNotFound { .. } => {
                FailureKind::MissingFile
            }
            CollectError::FileReadError { .. } => FailureKind::Unreadable,
            CollectError::FileWriteError { .. } => FailureKind::Filesystem,
            _ => FailureKind::MalformedContent,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, CollectError>;
