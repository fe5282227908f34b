//! # export 命令实现
//!
//! 将结构步骤数据中某一步的结构写成 POSCAR。
//!
//! ## 依赖关系
//! - 使用 `cli/report.rs` 定义的参数
//! - 使用 `store/`, `parsers/poscar.rs`

use crate::cli::report::ExportArgs;
use crate::error::{CollectError, Result};
use crate::models::{CalcId, Crystal};
use crate::parsers::poscar::to_poscar_string;
use crate::store::{Store, StrucStepData};
use crate::utils::output;

use std::fs;
use std::path::PathBuf;

/// 执行 export 命令
pub fn execute(args: ExportArgs, store: &Store) -> Result<()> {
    let data = store.load_struc_step()?;
    let crystal = select_step(&data, &args.id, args.step)?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("POSCAR_{}", args.id)));

    fs::write(&output_path, to_poscar_string(crystal))
        .map_err(|e| CollectError::write(&output_path, e))?;

    output::print_export(&crystal.name, &output_path.display().to_string());
    Ok(())
}

/// 最后一次成功结构提取中的某一步（1 起始，默认最终步）
fn select_step<'a>(data: &'a StrucStepData, id: &CalcId, step: Option<usize>) -> Result<&'a Crystal> {
    let (_, structures) = data.last_success(id).ok_or_else(|| {
        CollectError::InvalidArgument(format!("No successful structure steps for ID {}", id))
    })?;

    let index = match step {
        Some(n) => n.checked_sub(1),
        None => structures.len().checked_sub(1),
    };

    index.and_then(|i| structures.get(i)).ok_or_else(|| {
        CollectError::InvalidArgument(format!(
            "ID {} has {} relaxation steps",
            id,
            structures.len()
        ))
    })
}
