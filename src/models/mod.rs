//! # 数据模型模块
//!
//! 定义晶体结构和 VASP 计算结果数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `store/`, `vasp/` 和 `commands/` 使用
//! - 子模块: structure, calculation

pub mod calculation;
pub mod structure;

pub use calculation::{CalcId, CollectResult, Matrix3, OptStatus, StepOutcome};
pub use structure::{Atom, Crystal, Lattice};
