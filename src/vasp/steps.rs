//! # 弛豫步骤提取
//!
//! 从 vasprun.xml 提取每个离子步的能量、结构、力/应力，
//! 追加到对应累加器并立即持久化。
//!
//! 解析失败时本次尝试记为 `None`（不保留部分结果），并输出诊断信息。
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs`, `commands/step.rs`, `commands/batch.rs` 使用
//! - 使用 `parsers/vasprun.rs`, `store/`
//! - 使用 `utils/output.rs` 输出诊断信息

use crate::error::{CollectError, FailureKind, Result};
use crate::models::{CalcId, StepOutcome};
use crate::parsers::vasprun;
use crate::store::{EnergyStepData, FsStepData, Store, StrucStepData};
use crate::utils::output;

use std::path::Path;

/// 将解析结果转为 (尝试记录, 提取结果)
fn settle<T>(
    id: &CalcId,
    parsed: Result<T>,
    steps: impl FnOnce(&T) -> usize,
) -> (Option<T>, StepOutcome) {
    match parsed {
        Ok(value) => {
            let n = steps(&value);
            (Some(value), StepOutcome::Parsed { steps: n })
        }
        Err(e) => {
            let outcome = failure_outcome(&e);
            output::print_diagnostic(id, &format!("failed to parse vasprun.xml ({})", outcome));
            (None, outcome)
        }
    }
}

fn failure_outcome(err: &CollectError) -> StepOutcome {
    match err.kind() {
        FailureKind::MissingFile => StepOutcome::MissingFile,
        _ => StepOutcome::Malformed(err.to_string()),
    }
}

/// 提取能量步骤并追加到累加器
pub fn get_energy_step(
    mut data: EnergyStepData,
    id: &CalcId,
    vasprun_path: &Path,
    store: &Store,
) -> Result<(EnergyStepData, StepOutcome)> {
    let (attempt, outcome) = settle(id, vasprun::parse_energy_steps(vasprun_path), Vec::len);

    data.append(id, attempt);
    store.save_energy_step(&data)?;

    Ok((data, outcome))
}

/// 提取结构步骤并追加到累加器
pub fn get_struc_step(
    mut data: StrucStepData,
    id: &CalcId,
    vasprun_path: &Path,
    store: &Store,
) -> Result<(StrucStepData, StepOutcome)> {
    let (attempt, outcome) = settle(
        id,
        vasprun::parse_structure_steps(vasprun_path, id.as_str()),
        Vec::len,
    );

    data.append(id, attempt);
    store.save_struc_step(&data)?;

    Ok((data, outcome))
}

/// 提取力/应力步骤并成对追加
pub fn get_fs_step(
    mut data: FsStepData,
    id: &CalcId,
    vasprun_path: &Path,
    store: &Store,
) -> Result<(FsStepData, StepOutcome)> {
    let (attempt, outcome) = settle(
        id,
        vasprun::parse_force_stress_steps(vasprun_path),
        |s| s.forces.len(),
    );

    data.append(id, attempt.map(|s| (s.forces, s.stress)));
    store.save_fs_step(&data)?;

    Ok((data, outcome))
}
