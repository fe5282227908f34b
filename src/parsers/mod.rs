//! # 解析器模块
//!
//! VASP 输入/输出文件解析器。
//!
//! ## 依赖关系
//! - 被 `vasp/` 和 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: outcar, oszicar, poscar, vasprun

pub mod oszicar;
pub mod outcar;
pub mod poscar;
pub mod vasprun;
