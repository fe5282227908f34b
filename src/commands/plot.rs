//! # plot 命令实现
//!
//! 从能量步骤数据绘制某个计算的能量轨迹。
//!
//! ## 依赖关系
//! - 使用 `cli/report.rs` 定义的参数
//! - 使用 `store/`, `utils/plot.rs`

use crate::cli::report::PlotArgs;
use crate::error::{CollectError, Result};
use crate::models::CalcId;
use crate::store::{EnergyStepData, Store};
use crate::utils::{output, plot};

use std::path::PathBuf;

/// 执行 plot 命令
pub fn execute(args: PlotArgs, store: &Store) -> Result<()> {
    output::print_header("Plotting Energy Trajectory");

    let data = store.load_energy_step()?;
    let (attempt, energies) = select_attempt(&data, &args.id, args.attempt)?;

    let ext = if args.svg { "svg" } else { "png" };
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("energy_step_{}.{}", args.id, ext)));

    let title = format!("ID {} (attempt {})", args.id, attempt);
    plot::generate_energy_plot(
        energies,
        &output_path,
        &title,
        args.width,
        args.height,
        args.svg,
    )?;

    output::print_success(&format!(
        "{} steps plotted to '{}'",
        energies.len(),
        output_path.display()
    ));
    Ok(())
}

/// 选择尝试记录，返回 (1 起始序号, 能量)
fn select_attempt<'a>(
    data: &'a EnergyStepData,
    id: &CalcId,
    attempt: Option<usize>,
) -> Result<(usize, &'a [f64])> {
    match attempt {
        None => data
            .last_success(id)
            .map(|(i, e)| (i + 1, e.as_slice()))
            .ok_or_else(|| {
                CollectError::InvalidArgument(format!("No successful energy steps for ID {}", id))
            }),
        Some(n) => {
            let attempts = data.attempts(id);
            match n.checked_sub(1).and_then(|i| attempts.get(i)) {
                Some(Some(e)) => Ok((n, e.as_slice())),
                Some(None) => Err(CollectError::InvalidArgument(format!(
                    "Attempt {} of ID {} failed to parse",
                    n, id
                ))),
                None => Err(CollectError::InvalidArgument(format!(
                    "ID {} has {} attempts, requested {}",
                    id,
                    attempts.len(),
                    n
                ))),
            }
        }
    }
}
