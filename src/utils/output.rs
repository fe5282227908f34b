//! # 美化输出工具
//!
//! 提供统一的终端输出样式。提取失败、清理失败等诊断信息也经由此处输出，
//! 诊断带上计算标识前缀，便于在结构搜索日志中检索。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `vasp/` 模块使用
//! - 使用 `colored` crate

use colored::{ColoredString, Colorize};
use std::fmt::Display;

/// 消息级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Ok,
    Err,
    Warn,
    Info,
    Skip,
    Done,
}

impl Level {
    fn tag(self) -> ColoredString {
        match self {
            Level::Ok => "[OK]".green().bold(),
            Level::Err => "[ERR]".red().bold(),
            Level::Warn => "[WARN]".yellow().bold(),
            Level::Info => "[*]".blue().bold(),
            Level::Skip => "[SKIP]".dimmed(),
            Level::Done => "[DONE]".green().bold(),
        }
    }
}

fn emit(level: Level, msg: &str) {
    match level {
        Level::Err => eprintln!("{} {}", level.tag(), msg),
        _ => println!("{} {}", level.tag(), msg),
    }
}

/// 打印成功消息
pub fn print_success(msg: &str) {
    emit(Level::Ok, msg);
}

/// 打印错误消息（stderr）
pub fn print_error(msg: &str) {
    emit(Level::Err, msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    emit(Level::Warn, msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    emit(Level::Info, msg);
}

/// 打印跳过消息
pub fn print_skip(msg: &str) {
    emit(Level::Skip, msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    emit(Level::Done, msg);
}

/// 打印带计算标识的诊断信息
pub fn print_diagnostic(id: &dyn Display, msg: &str) {
    emit(Level::Warn, &diagnostic_line(id, msg));
}

fn diagnostic_line(id: &dyn Display, msg: &str) -> String {
    format!("ID {}: {}", id, msg)
}

/// 打印导出消息 (结构名 -> 文件)
pub fn print_export(from: &str, to: &str) {
    println!(
        "{} {} {} {}",
        Level::Ok.tag(),
        from.dimmed(),
        "->".cyan(),
        to
    );
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}
