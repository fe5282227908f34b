//! # 报告类子命令 CLI 定义
//!
//! `show`, `plot`, `export` 三个子命令的参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/show.rs`, `commands/plot.rs`, `commands/export.rs`

use crate::models::CalcId;
use clap::Args;
use std::path::PathBuf;

/// show 子命令参数
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Only show this calculation
    #[arg(long)]
    pub id: Option<CalcId>,

    /// Also write the summary to a CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// plot 子命令参数
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Calculation identifier
    pub id: CalcId,

    /// Attempt index (1-based) [default: last successful attempt]
    #[arg(long)]
    pub attempt: Option<usize>,

    /// Output image path [default: energy_step_<ID>.png/.svg]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output SVG instead of PNG
    #[arg(long, default_value_t = false)]
    pub svg: bool,

    /// Image width in pixels
    #[arg(long, default_value_t = 1000)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 700)]
    pub height: u32,
}

/// export 子命令参数
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Calculation identifier
    pub id: CalcId,

    /// Relaxation step (1-based) [default: final step]
    #[arg(long)]
    pub step: Option<usize>,

    /// Output POSCAR path [default: POSCAR_<ID>]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
