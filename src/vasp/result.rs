//! # VASP 结果收集
//!
//! 读取完成计算的最终状态（prev_OUTCAR、OSZICAR、CONTCAR），
//! 将工作文件重命名为 `fin_*`，并清理 STOPCAR 与 stat_job。
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs`, `commands/batch.rs` 使用
//! - 使用 `parsers/outcar.rs`, `parsers/oszicar.rs`, `parsers/poscar.rs`
//! - 使用 `utils/output.rs` 输出诊断信息

use crate::error::{CollectError, Result};
use crate::models::{CalcId, CollectResult};
use crate::parsers::{oszicar, outcar, poscar};
use crate::utils::output;

use std::fs;
use std::io;
use std::path::Path;

/// 收集后加 `fin_` 前缀的文件
pub const VASP_FILES: [&str; 7] = [
    "POSCAR",
    "CONTCAR",
    "OUTCAR",
    "OSZICAR",
    "WAVECAR",
    "CHGCAR",
    "vasprun.xml",
];

pub const PREV_OUTCAR: &str = "prev_OUTCAR";
pub const OSZICAR: &str = "OSZICAR";
pub const CONTCAR: &str = "CONTCAR";
pub const STOPCAR: &str = "STOPCAR";
pub const STAT_JOB: &str = "stat_job";
pub const FIN_PREFIX: &str = "fin_";

/// stat_job 缺失时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatJobPolicy {
    /// 缺失时只给出警告
    #[default]
    Lenient,
    /// 缺失时报错
    Strict,
}

/// 收集单个计算的结果
///
/// 读取失败以 NaN / `None` 表示；只有 stat_job 删除失败会返回错误
/// （`Lenient` 下文件不存在除外）。
pub fn collect_vasp(id: &CalcId, work_dir: &Path, policy: StatJobPolicy) -> Result<CollectResult> {
    // 上一阶段优化状态
    let status = outcar::check_optimization(&work_dir.join(PREV_OUTCAR));

    // 能量与磁矩
    let (energy, magmom) = match oszicar::parse_oszicar(&work_dir.join(OSZICAR)) {
        Ok(v) => v,
        Err(_) => {
            output::print_diagnostic(id, "could not obtain energy from OSZICAR");
            (f64::NAN, f64::NAN)
        }
    };

    // 最终结构
    let structure = poscar::parse_poscar_file(&work_dir.join(CONTCAR))
        .ok()
        .map(|mut c| {
            c.name = id.to_string();
            c
        });

    rename_finished_files(work_dir);
    remove_stopcar(work_dir);
    remove_stat_job(work_dir, policy)?;

    Ok(CollectResult {
        structure,
        energy,
        magmom,
        status,
    })
}

/// 存在的 VASP 文件重命名为 `fin_*`，返回实际重命名的文件名
pub fn rename_finished_files(work_dir: &Path) -> Vec<&'static str> {
    let mut renamed = Vec::new();
    for name in VASP_FILES {
        let src = work_dir.join(name);
        if !src.is_file() {
            continue;
        }
        let dst = work_dir.join(format!("{}{}", FIN_PREFIX, name));
        match fs::rename(&src, &dst) {
            Ok(()) => renamed.push(name),
            Err(e) => output::print_warning(&format!(
                "Failed to rename {} -> {}: {}",
                src.display(),
                dst.display(),
                e
            )),
        }
    }
    renamed
}

fn remove_stopcar(work_dir: &Path) {
    let stopcar = work_dir.join(STOPCAR);
    if stopcar.is_file() {
        if let Err(e) = fs::remove_file(&stopcar) {
            output::print_warning(&format!("Failed to remove {}: {}", stopcar.display(), e));
        }
    }
}

fn remove_stat_job(work_dir: &Path, policy: StatJobPolicy) -> Result<()> {
    let stat = work_dir.join(STAT_JOB);
    match fs::remove_file(&stat) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => match policy {
            StatJobPolicy::Lenient => {
                output::print_warning(&format!("{} already removed", stat.display()));
                Ok(())
            }
            StatJobPolicy::Strict => Err(CollectError::FileNotFound {
                path: stat.display().to_string(),
            }),
        },
        Err(e) => Err(CollectError::write(&stat, e)),
    }
}
