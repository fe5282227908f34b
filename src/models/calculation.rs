//! # VASP 计算结果数据模型
//!
//! 计算标识、优化状态、收集结果与单次提取结果。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `store/`, `vasp/` 使用
//! - 被 `commands/` 使用

use super::structure::Crystal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// varray 的行向量矩阵（力或应力）
pub type Matrix3 = Vec<[f64; 3]>;

/// 计算标识
///
/// 整数或字符串均可；两边都是整数时按数值排序。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalcId(String);

impl CalcId {
    pub fn new(id: impl Into<String>) -> Self {
        CalcId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for CalcId {
    fn from(id: u64) -> Self {
        CalcId(id.to_string())
    }
}

impl From<&str> for CalcId {
    fn from(id: &str) -> Self {
        CalcId(id.to_string())
    }
}

impl FromStr for CalcId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(CalcId(s.trim().to_string()))
    }
}

impl fmt::Display for CalcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for CalcId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for CalcId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 上一阶段结构优化状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptStatus {
    /// prev_OUTCAR 中找到收敛标记
    Done,
    /// 文件存在但未收敛
    NotYet,
    /// prev_OUTCAR 缺失或不可读
    NoFile,
}

impl fmt::Display for OptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptStatus::Done => write!(f, "done"),
            OptStatus::NotYet => write!(f, "not_yet"),
            OptStatus::NoFile => write!(f, "no_file"),
        }
    }
}

/// 单个计算的收集结果
///
/// `energy`/`magmom` 以 NaN 表示提取失败，`structure` 以 `None` 表示缺失。
#[derive(Debug, Clone)]
pub struct CollectResult {
    pub structure: Option<Crystal>,
    pub energy: f64,
    pub magmom: f64,
    pub status: OptStatus,
}

impl CollectResult {
    /// 能量与结构均成功提取
    pub fn is_complete(&self) -> bool {
        !self.energy.is_nan() && self.structure.is_some()
    }

    /// 每原子能量
    pub fn energy_per_atom(&self) -> Option<f64> {
        match &self.structure {
            Some(s) if !s.atoms.is_empty() && !self.energy.is_nan() => {
                Some(self.energy / s.atoms.len() as f64)
            }
            _ => None,
        }
    }
}

/// 单次步骤提取的结果
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// 成功，附带弛豫步数
    Parsed { steps: usize },
    /// vasprun.xml 不存在
    MissingFile,
    /// 文件不可读或内容不符合预期
    Malformed(String),
}

impl StepOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, StepOutcome::Parsed { .. })
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Parsed { steps } => write!(f, "{} steps", steps),
            StepOutcome::MissingFile => write!(f, "missing file"),
            StepOutcome::Malformed(reason) => write!(f, "malformed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_id_numeric_ordering() {
        let mut ids: Vec<CalcId> = vec!["10".into(), "2".into(), "abc".into(), 1u64.into()];
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(ordered, vec!["1", "2", "10", "abc"]);
    }

    #[test]
    fn test_calc_id_integers_before_names() {
        let mut ids: Vec<CalcId> = vec!["1a".into(), "10".into(), "9".into()];
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(ordered, vec!["9", "10", "1a"]);
    }

    #[test]
    fn test_calc_id_json_is_plain_string() {
        let id = CalcId::from(7u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn test_opt_status_display() {
        assert_eq!(OptStatus::Done.to_string(), "done");
        assert_eq!(OptStatus::NotYet.to_string(), "not_yet");
        assert_eq!(OptStatus::NoFile.to_string(), "no_file");
    }

    #[test]
    fn test_collect_result_energy_per_atom() {
        let result = CollectResult {
            structure: None,
            energy: -10.0,
            magmom: f64::NAN,
            status: OptStatus::Done,
        };
        assert!(!result.is_complete());
        assert!(result.energy_per_atom().is_none());
    }
}
