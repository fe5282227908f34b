//! # show 命令实现
//!
//! 汇总三个步骤数据存储，按计算标识输出表格，可选导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/report.rs` 定义的参数
//! - 使用 `store/`
//! - 使用 `utils/output.rs`

use crate::cli::report::ShowArgs;
use crate::commands::collect::format_energy;
use crate::error::{CollectError, Result};
use crate::models::CalcId;
use crate::store::{EnergyStepData, FsStepData, Store, StrucStepData};
use crate::utils::output;

use std::collections::BTreeSet;
use std::path::Path;
use tabled::{Table, Tabled};

/// 单个标识的汇总
#[derive(Debug, Clone, PartialEq)]
struct Summary {
    id: CalcId,
    energy_attempts: usize,
    energy_failed: usize,
    /// 最后一次成功能量提取的步数与首末能量
    steps: Option<usize>,
    first_energy: Option<f64>,
    last_energy: Option<f64>,
    struc_attempts: usize,
    fs_attempts: usize,
    /// 最后一次成功力/应力提取中带应力张量的步数
    stress_steps: Option<usize>,
}

impl Summary {
    fn energy_drop(&self) -> Option<f64> {
        Some(self.last_energy? - self.first_energy?)
    }
}

/// 表格行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Energy attempts")]
    attempts: String,
    #[tabled(rename = "Steps")]
    steps: String,
    #[tabled(rename = "E first (eV)")]
    first: String,
    #[tabled(rename = "E last (eV)")]
    last: String,
    #[tabled(rename = "ΔE (eV)")]
    drop: String,
    #[tabled(rename = "Struc")]
    struc: usize,
    #[tabled(rename = "Force/Stress")]
    fs: usize,
    #[tabled(rename = "Stress steps")]
    stress: String,
}

impl From<&Summary> for SummaryRow {
    fn from(s: &Summary) -> Self {
        let opt = |v: Option<f64>| v.map(format_energy).unwrap_or_else(|| "-".to_string());
        SummaryRow {
            id: s.id.to_string(),
            attempts: format!("{} ({} null)", s.energy_attempts, s.energy_failed),
            steps: s
                .steps
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            first: opt(s.first_energy),
            last: opt(s.last_energy),
            drop: opt(s.energy_drop()),
            struc: s.struc_attempts,
            fs: s.fs_attempts,
            stress: s
                .stress_steps
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// 执行 show 命令
pub fn execute(args: ShowArgs, store: &Store) -> Result<()> {
    output::print_header("Accumulated Step Data");
    output::print_info(&format!("Data directory: {}", store.dir().display()));

    let energy = store.load_energy_step()?;
    let struc = store.load_struc_step()?;
    let fs = store.load_fs_step()?;

    let mut summaries = summarize(&energy, &struc, &fs);
    if let Some(id) = &args.id {
        summaries.retain(|s| &s.id == id);
        if summaries.is_empty() {
            return Err(CollectError::InvalidArgument(format!(
                "No step data for ID {}",
                id
            )));
        }
    }

    if summaries.is_empty() {
        output::print_warning("No step data collected yet.");
        return Ok(());
    }

    let rows: Vec<SummaryRow> = summaries.iter().map(SummaryRow::from).collect();
    println!("{}", Table::new(&rows));

    if let Some(path) = &args.csv {
        save_summary_csv(&summaries, path)?;
        output::print_success(&format!("Summary saved to '{}'", path.display()));
    }

    Ok(())
}

fn summarize(energy: &EnergyStepData, struc: &StrucStepData, fs: &FsStepData) -> Vec<Summary> {
    let ids: BTreeSet<&CalcId> = energy
        .ids()
        .chain(struc.ids())
        .chain(fs.forces().ids())
        .collect();

    ids.into_iter()
        .map(|id| {
            let attempts = energy.attempts(id);
            let last = energy.last_success(id).map(|(_, e)| e);
            Summary {
                id: id.clone(),
                energy_attempts: attempts.len(),
                energy_failed: attempts.iter().filter(|a| a.is_none()).count(),
                steps: last.map(Vec::len),
                first_energy: last.and_then(|e| e.first().copied()),
                last_energy: last.and_then(|e| e.last().copied()),
                struc_attempts: struc.attempts(id).len(),
                fs_attempts: fs.forces().attempts(id).len(),
                stress_steps: fs
                    .stresses()
                    .last_success(id)
                    .map(|(_, s)| s.iter().filter(|m| !m.is_empty()).count()),
            }
        })
        .collect()
}

fn save_summary_csv(summaries: &[Summary], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "id",
        "energy_attempts",
        "energy_failed",
        "steps",
        "first_energy_eV",
        "last_energy_eV",
        "struc_attempts",
        "fs_attempts",
        "stress_steps",
    ])?;

    let opt = |v: Option<f64>| v.map(|x| format!("{:.10}", x)).unwrap_or_default();
    for s in summaries {
        wtr.write_record([
            s.id.to_string(),
            s.energy_attempts.to_string(),
            s.energy_failed.to_string(),
            s.steps.map(|n| n.to_string()).unwrap_or_default(),
            opt(s.first_energy),
            opt(s.last_energy),
            s.struc_attempts.to_string(),
            s.fs_attempts.to_string(),
            s.stress_steps.map(|n| n.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()
        .map_err(|e| CollectError::write(output_path, e))?;

    Ok(())
}
