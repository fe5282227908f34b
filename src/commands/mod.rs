//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `vasp/`, `store/`, `utils/`
//! - 子模块: collect, step, batch, show, plot, export

pub mod batch;
pub mod collect;
pub mod export;
pub mod plot;
pub mod show;
pub mod step;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use crate::store::Store;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    let store = Store::new(cli.data_dir);

    match cli.command {
        Commands::Collect(args) => collect::execute(args, &store),
        Commands::Step(args) => step::execute(args, &store),
        Commands::Batch(args) => batch::execute(args, &store),
        Commands::Show(args) => show::execute(args, &store),
        Commands::Plot(args) => plot::execute(args, &store),
        Commands::Export(args) => export::execute(args, &store),
    }
}
