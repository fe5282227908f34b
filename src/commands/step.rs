//! # step 命令实现
//!
//! 单独运行一种步骤提取，也为 collect/batch 提供共用的提取入口。
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `vasp/steps.rs`, `store/`
//! - 使用 `utils/output.rs`

use crate::cli::collect::{StepArgs, StepKind};
use crate::error::Result;
use crate::models::{CalcId, StepOutcome};
use crate::store::Store;
use crate::utils::output;
use crate::vasp;

use std::path::Path;

/// 执行 step 命令
pub fn execute(args: StepArgs, store: &Store) -> Result<()> {
    output::print_header(&format!("Extracting {} steps", args.kind));

    let outcome = run_step(store, args.kind, &args.id, &args.vasprun)?;
    report_outcome(args.kind, &args.id, &outcome);

    Ok(())
}

/// 加载对应累加器，提取并持久化
pub fn run_step(store: &Store, kind: StepKind, id: &CalcId, vasprun: &Path) -> Result<StepOutcome> {
    let outcome = match kind {
        StepKind::Energy => vasp::get_energy_step(store.load_energy_step()?, id, vasprun, store)?.1,
        StepKind::Struc => vasp::get_struc_step(store.load_struc_step()?, id, vasprun, store)?.1,
        StepKind::Fs => vasp::get_fs_step(store.load_fs_step()?, id, vasprun, store)?.1,
    };
    Ok(outcome)
}

/// 按顺序运行多个提取
pub fn run_steps(
    store: &Store,
    kinds: &[StepKind],
    id: &CalcId,
    vasprun: &Path,
) -> Result<Vec<(StepKind, StepOutcome)>> {
    kinds
        .iter()
        .map(|&kind| run_step(store, kind, id, vasprun).map(|o| (kind, o)))
        .collect()
}

pub fn report_outcome(kind: StepKind, id: &CalcId, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Parsed { steps } => output::print_success(&format!(
            "ID {}: appended {} {} steps",
            id, steps, kind
        )),
        _ => output::print_skip(&format!("ID {}: {} attempt recorded as null", id, kind)),
    }
}
