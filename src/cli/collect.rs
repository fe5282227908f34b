//! # 收集类子命令 CLI 定义
//!
//! `collect`, `step`, `batch` 三个子命令的参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/collect.rs`, `commands/step.rs`, `commands/batch.rs`

use crate::models::CalcId;
use crate::vasp::StatJobPolicy;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 需要运行的步骤提取
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct StepSelection {
    /// Append per-step energies from vasprun.xml
    #[arg(long, default_value_t = false)]
    pub energy_step: bool,

    /// Append per-step structures from vasprun.xml
    #[arg(long, default_value_t = false)]
    pub struc_step: bool,

    /// Append per-step forces and stresses from vasprun.xml
    #[arg(long, default_value_t = false)]
    pub fs_step: bool,
}

impl StepSelection {
    pub fn any(&self) -> bool {
        self.energy_step || self.struc_step || self.fs_step
    }

    /// 选中的提取种类，按固定顺序
    pub fn kinds(&self) -> Vec<StepKind> {
        let mut kinds = Vec::new();
        if self.energy_step {
            kinds.push(StepKind::Energy);
        }
        if self.struc_step {
            kinds.push(StepKind::Struc);
        }
        if self.fs_step {
            kinds.push(StepKind::Fs);
        }
        kinds
    }
}

/// 步骤提取种类
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum StepKind {
    /// Free energy per ionic step
    Energy,
    /// Structure per ionic step
    Struc,
    /// Forces and stress per ionic step
    Fs,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepKind::Energy => write!(f, "energy"),
            StepKind::Struc => write!(f, "struc"),
            StepKind::Fs => write!(f, "fs"),
        }
    }
}

/// collect 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Calculation identifier within the structure search
    pub id: CalcId,

    /// Working directory of the finished calculation
    pub work_dir: PathBuf,

    #[command(flatten)]
    pub steps: StepSelection,

    /// vasprun.xml used for step extraction [default: <WORK_DIR>/fin_vasprun.xml]
    #[arg(long)]
    pub vasprun: Option<PathBuf>,

    /// Fail if stat_job is already missing instead of warning
    #[arg(long, default_value_t = false)]
    pub strict_stat_job: bool,
}

/// step 子命令参数
#[derive(Args, Debug)]
pub struct StepArgs {
    /// Kind of per-step data to extract
    #[arg(value_enum)]
    pub kind: StepKind,

    /// Calculation identifier within the structure search
    pub id: CalcId,

    /// Path to vasprun.xml
    pub vasprun: PathBuf,
}

/// batch 子命令参数
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Root directory whose subdirectories are calculations named by ID
    pub root: PathBuf,

    /// Glob pattern selecting calculation directory names
    #[arg(long, default_value = "*")]
    pub pattern: String,

    #[command(flatten)]
    pub steps: StepSelection,

    /// Fail if stat_job is already missing instead of warning
    #[arg(long, default_value_t = false)]
    pub strict_stat_job: bool,
}

/// 由命令行开关得到 stat_job 策略
pub fn stat_job_policy(strict: bool) -> StatJobPolicy {
    if strict {
        StatJobPolicy::Strict
    } else {
        StatJobPolicy::Lenient
    }
}
