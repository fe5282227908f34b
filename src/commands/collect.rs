//! # collect 命令实现
//!
//! 收集单个完成的 VASP 计算，并按需追加弛豫步骤数据。
//!
//! ## 功能
//! - 判断上一阶段优化状态 (prev_OUTCAR)
//! - 提取自由能和磁矩 (OSZICAR)
//! - 读取最终结构 (CONTCAR)
//! - 重命名为 fin_* 并清理 STOPCAR / stat_job
//! - 可选：从 fin_vasprun.xml 提取能量/结构/力与应力步骤
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `vasp/`, `commands/step.rs`
//! - 使用 `utils/output.rs`

use crate::cli::collect::{stat_job_policy, CollectArgs};
use crate::commands::step;
use crate::error::{CollectError, Result};
use crate::models::CollectResult;
use crate::store::Store;
use crate::utils::output;
use crate::vasp;

/// 收集后 vasprun.xml 的文件名
pub const FIN_VASPRUN: &str = "fin_vasprun.xml";

/// 执行 collect 命令
pub fn execute(args: CollectArgs, store: &Store) -> Result<()> {
    output::print_header("Collecting VASP Result");

    if !args.work_dir.is_dir() {
        return Err(CollectError::DirectoryNotFound {
            path: args.work_dir.display().to_string(),
        });
    }

    let result = vasp::collect_vasp(
        &args.id,
        &args.work_dir,
        stat_job_policy(args.strict_stat_job),
    )?;
    print_summary(&args.id.to_string(), &result);

    if args.steps.any() {
        let vasprun = args
            .vasprun
            .clone()
            .unwrap_or_else(|| args.work_dir.join(FIN_VASPRUN));

        for (kind, outcome) in step::run_steps(store, &args.steps.kinds(), &args.id, &vasprun)? {
            step::report_outcome(kind, &args.id, &outcome);
        }
    }

    output::print_done(&format!("Structure ID {} collected", args.id));
    Ok(())
}

/// 格式化能量，NaN 显示为 "-"
pub fn format_energy(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{:.6}", value)
    }
}

fn print_summary(id: &str, result: &CollectResult) {
    output::print_info(&format!("ID:           {}", id));
    output::print_info(&format!("Optimization: {}", result.status));
    output::print_info(&format!("Energy (eV):  {}", format_energy(result.energy)));
    output::print_info(&format!("Magmom:       {}", format_energy(result.magmom)));

    match &result.structure {
        Some(s) => {
            let (a, b, c, alpha, beta, gamma) = s.lattice.parameters();
            output::print_info(&format!(
                "Structure:    {} ({} atoms)",
                s.formula(),
                s.atoms.len()
            ));
            output::print_info(&format!(
                "Lattice:      {:.4} {:.4} {:.4} {:.2} {:.2} {:.2}",
                a, b, c, alpha, beta, gamma
            ));
            if let Some(v) = s.volume_per_atom() {
                output::print_info(&format!("Volume/atom:  {:.4}", v));
            }
        }
        None => output::print_warning("Structure:    CONTCAR missing or unreadable"),
    }

    if let Some(e) = result.energy_per_atom() {
        output::print_info(&format!("Energy/atom:  {:.6}", e));
    }

    if !result.is_complete() {
        output::print_warning(&format!(
            "Structure ID {} is incomplete; treat it as a failed calculation",
            id
        ));
    }
}
