//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `collect`: 收集单个完成的计算
//! - `step`: 单独运行某一种步骤提取
//! - `batch`: 批量收集目录下所有完成的计算
//! - `show`: 汇总步骤数据
//! - `plot`: 绘制能量轨迹
//! - `export`: 导出弛豫步结构为 POSCAR
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: collect, report

pub mod collect;
pub mod report;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// vaspcollect - VASP 结构优化结果收集工具
#[derive(Parser)]
#[command(name = "vaspcollect")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Collect VASP relaxation results and per-step trajectories for structure searches",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the accumulated step data (*.json)
    #[arg(
        long,
        global = true,
        env = "VASPCOLLECT_DATA_DIR",
        default_value = "data"
    )]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Collect one finished VASP calculation (energy, structure, status)
    Collect(collect::CollectArgs),

    /// Extract per-step data from a vasprun.xml into the data store
    Step(collect::StepArgs),

    /// Collect every finished calculation under a root directory
    Batch(collect::BatchArgs),

    /// Summarize accumulated step data
    Show(report::ShowArgs),

    /// Plot the energy trajectory of a calculation
    Plot(report::PlotArgs),

    /// Export a relaxation-step structure as POSCAR
    Export(report::ExportArgs),
}
