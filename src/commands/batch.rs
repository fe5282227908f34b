//! # batch 命令实现
//!
//! 扫描根目录下以计算标识命名的子目录，依次收集所有已完成的计算。
//!
//! ## 功能
//! - glob 过滤目录名
//! - stat_job 含 `done` 行视为计算完成
//! - 按标识顺序串行处理（步骤数据存储不能并发写）
//! - 汇总表格输出
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `vasp/`, `commands/step.rs`, `commands/collect.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::collect::{stat_job_policy, BatchArgs, StepKind};
use crate::commands::collect::{format_energy, FIN_VASPRUN};
use crate::commands::step;
use crate::error::{CollectError, Result};
use crate::models::{CalcId, StepOutcome};
use crate::store::Store;
use crate::utils::{output, progress};
use crate::vasp::{self, result::STAT_JOB};

use std::fs;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use walkdir::WalkDir;

/// 汇总表格行
#[derive(Debug, Clone, Tabled)]
struct BatchRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Energy (eV)")]
    energy: String,
    #[tabled(rename = "Magmom")]
    magmom: String,
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "Steps")]
    steps: String,
    #[tabled(skip)]
    null_steps: usize,
}

/// 执行 batch 命令
pub fn execute(args: BatchArgs, store: &Store) -> Result<()> {
    output::print_header("Collecting Finished VASP Calculations");

    if !args.root.is_dir() {
        return Err(CollectError::DirectoryNotFound {
            path: args.root.display().to_string(),
        });
    }

    let pattern = glob::Pattern::new(&args.pattern).map_err(|e| {
        CollectError::InvalidArgument(format!("Invalid pattern '{}': {}", args.pattern, e))
    })?;

    let calcs = find_finished(&args.root, &pattern);
    if calcs.is_empty() {
        output::print_warning("No finished calculations found (stat_job with 'done').");
        return Ok(());
    }

    output::print_info(&format!("Found {} finished calculations", calcs.len()));

    let policy = stat_job_policy(args.strict_stat_job);
    let kinds = args.steps.kinds();
    let pb = progress::create_progress_bar(calcs.len() as u64, "Collecting");

    let mut rows = Vec::with_capacity(calcs.len());
    let mut failed = 0usize;
    let mut null_steps = 0usize;

    for (id, dir) in &calcs {
        let row = pb.suspend(|| collect_one(store, id, dir, policy, &kinds))?;
        match row {
            Some(row) => {
                null_steps += row.null_steps;
                rows.push(row);
            }
            None => failed += 1,
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    println!("{}", Table::new(&rows));

    if failed > 0 {
        output::print_warning(&format!("{} calculations could not be collected", failed));
    }
    if null_steps > 0 {
        output::print_warning(&format!(
            "{} step extractions recorded as null",
            null_steps
        ));
    }
    output::print_done(&format!("Collected {} calculations", rows.len()));

    Ok(())
}

/// 收集单个计算；收集失败返回 None，存储错误向上传播
fn collect_one(
    store: &Store,
    id: &CalcId,
    dir: &Path,
    policy: vasp::StatJobPolicy,
    kinds: &[StepKind],
) -> Result<Option<BatchRow>> {
    let result = match vasp::collect_vasp(id, dir, policy) {
        Ok(r) => r,
        Err(e) => {
            output::print_error(&format!("ID {}: {}", id, e));
            return Ok(None);
        }
    };

    let outcomes = step::run_steps(store, kinds, id, &dir.join(FIN_VASPRUN))?;
    let steps = outcomes
        .iter()
        .map(|(kind, outcome)| match outcome {
            StepOutcome::Parsed { steps } => format!("{}:{}", kind, steps),
            _ => format!("{}:null", kind),
        })
        .collect::<Vec<_>>()
        .join(" ");

    Ok(Some(BatchRow {
        id: id.to_string(),
        status: result.status.to_string(),
        energy: format_energy(result.energy),
        magmom: format_energy(result.magmom),
        formula: result
            .structure
            .as_ref()
            .map(|s| s.formula())
            .unwrap_or_else(|| "-".to_string()),
        steps: if steps.is_empty() { "-".to_string() } else { steps },
        null_steps: outcomes.iter().filter(|(_, o)| !o.is_parsed()).count(),
    }))
}

/// 找出已完成的计算目录，按标识排序
fn find_finished(root: &Path, pattern: &glob::Pattern) -> Vec<(CalcId, PathBuf)> {
    let mut calcs: Vec<(CalcId, PathBuf)> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            if pattern.matches(&name) && is_finished(e.path()) {
                Some((CalcId::new(name), e.into_path()))
            } else {
                None
            }
        })
        .collect();

    calcs.sort_by(|a, b| a.0.cmp(&b.0));
    calcs
}

/// stat_job 中有一行为 `done`
fn is_finished(dir: &Path) -> bool {
    fs::read_to_string(dir.join(STAT_JOB))
        .map(|s| s.lines().any(|l| l.trim() == "done"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc_dir(root: &Path, name: &str, stat: Option<&str>) {
        let dir = root.join(name);
        fs::create_dir(&dir).unwrap();
        if let Some(content) = stat {
            fs::write(dir.join(STAT_JOB), content).unwrap();
        }
    }

    #[test]
    fn test_find_finished_filters_and_sorts() {
        let root = tempfile::tempdir().unwrap();
        calc_dir(root.path(), "10", Some("    10    # ID\n     1    # Stage\ndone\n"));
        calc_dir(root.path(), "2", Some("     2    # ID\n     1    # Stage\ndone\n"));
        calc_dir(root.path(), "3", Some("     3    # ID\n     1    # Stage\nsubmitted\n"));
        calc_dir(root.path(), "4", None);
        fs::write(root.path().join("notes.txt"), "done\n").unwrap();

        let all = glob::Pattern::new("*").unwrap();
        let ids: Vec<String> = find_finished(root.path(), &all)
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect();
        assert_eq!(ids, vec!["2", "10"]);

        let only_one = glob::Pattern::new("1*").unwrap();
        assert_eq!(find_finished(root.path(), &only_one).len(), 1);
    }

    #[test]
    fn test_collect_one_with_steps() {
        let root = tempfile::tempdir().unwrap();
        let store = Store::new(root.path().join("data"));
        calc_dir(root.path(), "1", Some("done\n"));
        let dir = root.path().join("1");
        fs::write(dir.join("OSZICAR"), "   1 F= -2.0 E0= -2.0\n").unwrap();
        fs::write(
            dir.join("vasprun.xml"),
            crate::parsers::vasprun::tests::VASPRUN_TWO_STEPS,
        )
        .unwrap();

        let id = CalcId::from(1u64);
        let row = collect_one(
            &store,
            &id,
            &dir,
            vasp::StatJobPolicy::Strict,
            &[StepKind::Energy, StepKind::Fs],
        )
        .unwrap()
        .unwrap();

        assert_eq!(row.energy, "-2.000000");
        assert_eq!(row.steps, "energy:2 fs:2");
        assert_eq!(row.null_steps, 0);
        assert_eq!(store.load_energy_step().unwrap().attempts(&id).len(), 1);
        assert_eq!(store.load_fs_step().unwrap().stresses().attempts(&id).len(), 1);
    }

    #[test]
    fn test_collect_one_counts_null_steps() {
        let root = tempfile::tempdir().unwrap();
        let store = Store::new(root.path().join("data"));
        calc_dir(root.path(), "5", Some("done\n"));
        let dir = root.path().join("5");

        let id = CalcId::from(5u64);
        let row = collect_one(
            &store,
            &id,
            &dir,
            vasp::StatJobPolicy::Lenient,
            &[StepKind::Energy, StepKind::Struc],
        )
        .unwrap()
        .unwrap();

        assert_eq!(row.steps, "energy:null struc:null");
        assert_eq!(row.null_steps, 2);
        assert_eq!(store.load_struc_step().unwrap().attempts(&id), &[None]);
    }
}
