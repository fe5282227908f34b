//! # VASP OUTCAR 解析器
//!
//! 检查上一阶段 OUTCAR (prev_OUTCAR) 中的结构优化收敛标记。
//!
//! ## 依赖关系
//! - 被 `vasp/result.rs` 使用
//! - 使用 `models/calculation.rs`

use crate::error::{CollectError, Result};
use crate::models::OptStatus;
use std::fs;
use std::path::Path;

/// 离子弛豫收敛标记
pub const CONVERGED_MARKER: &str = "reached required accuracy";

/// 读取 OUTCAR 并判断优化状态
///
/// 任何读取失败（不仅是文件缺失）都视为 `NoFile`。
pub fn check_optimization(path: &Path) -> OptStatus {
    match read_outcar(path) {
        Ok(content) => optimization_status(&content),
        Err(_) => OptStatus::NoFile,
    }
}

/// 从 OUTCAR 内容判断优化状态
pub fn optimization_status(content: &str) -> OptStatus {
    if content.lines().any(|line| line.contains(CONVERGED_MARKER)) {
        OptStatus::Done
    } else {
        OptStatus::NotYet
    }
}

fn read_outcar(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CollectError::read(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_anywhere_is_done() {
        let first = "reached required accuracy - stopping structural energy minimisation\nfoo\nbar\n";
        let middle = "foo\n reached required accuracy - stopping\nbar\n";
        let last = "foo\nbar\n reached required accuracy";
        assert_eq!(optimization_status(first), OptStatus::Done);
        assert_eq!(optimization_status(middle), OptStatus::Done);
        assert_eq!(optimization_status(last), OptStatus::Done);
    }

    #[test]
    fn test_no_marker_is_not_yet() {
        let content = " General timing and accounting informations for this job:\n";
        assert_eq!(optimization_status(content), OptStatus::NotYet);
        assert_eq!(optimization_status(""), OptStatus::NotYet);
    }

    #[test]
    fn test_missing_file_is_no_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            check_optimization(&dir.path().join("prev_OUTCAR")),
            OptStatus::NoFile
        );
    }

    #[test]
    fn test_directory_instead_of_file_is_no_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(check_optimization(dir.path()), OptStatus::NoFile);
    }
}
