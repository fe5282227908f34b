//! # vaspcollect - VASP 结构优化结果收集工具
//!
//! 结构搜索中每完成一个 VASP 计算调用一次，收集最终能量、结构与优化状态，
//! 并把弛豫轨迹（能量、结构、力/应力）追加到按计算标识索引的数据存储中。
//!
//! ## 子命令
//! - `collect` - 收集单个完成的计算
//! - `step`    - 单独提取 vasprun.xml 步骤数据
//! - `batch`   - 批量收集目录下所有完成的计算
//! - `show`    - 汇总已累积的步骤数据
//! - `plot`    - 绘制能量轨迹
//! - `export`  - 导出弛豫步结构为 POSCAR
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── vasp/      (结果收集与步骤提取)
//!   │     ├── store/     (步骤数据持久化)
//!   │     ├── parsers/   (格式解析器)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod store;
mod utils;
mod vasp;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
