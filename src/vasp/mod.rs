//! # VASP 结果收集模块
//!
//! 结构搜索中每个完成的 VASP 计算调用一次：
//! 先收集最终结果，再按需提取弛豫步骤数据。
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `parsers/`, `store/`, `models/`
//! - 子模块: result, steps

pub mod result;
pub mod steps;

pub use result::{collect_vasp, StatJobPolicy};
pub use steps::{get_energy_step, get_fs_step, get_struc_step};
