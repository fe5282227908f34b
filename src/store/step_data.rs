//! # 步骤数据累加器
//!
//! 以计算标识为键的累加映射。每次提取对应一条尝试记录，只追加不覆盖。
//!
//! ## 依赖关系
//! - 被 `store/mod.rs` 和 `vasp/steps.rs` 使用
//! - 使用 `models/`

use crate::models::{CalcId, Crystal, Matrix3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 标识 -> 尝试记录列表；`None` 表示该次提取失败
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepData<T> {
    entries: BTreeMap<CalcId, Vec<Option<T>>>,
}

impl<T> Default for StepData<T> {
    fn default() -> Self {
        StepData {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> StepData<T> {
    /// 追加一条尝试记录，必要时创建条目
    pub fn append(&mut self, id: &CalcId, attempt: Option<T>) {
        self.entries.entry(id.clone()).or_default().push(attempt);
    }

    /// 某标识的全部尝试记录
    pub fn attempts(&self, id: &CalcId) -> &[Option<T>] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 最后一次成功的尝试：(尝试序号, 数据)
    pub fn last_success(&self, id: &CalcId) -> Option<(usize, &T)> {
        self.attempts(id)
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, a)| a.as_ref().map(|v| (i, v)))
    }

    pub fn ids(&self) -> impl Iterator<Item = &CalcId> {
        self.entries.keys()
    }
}

/// 能量步骤数据
pub type EnergyStepData = StepData<Vec<f64>>;

/// 结构步骤数据
pub type StrucStepData = StepData<Vec<Crystal>>;

/// 力/应力步骤数据
///
/// 两个累加器只能成对追加，对同一标识始终保持相同的尝试数与成败状态。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FsStepData {
    force_step_data: StepData<Vec<Matrix3>>,
    stress_step_data: StepData<Vec<Matrix3>>,
}

impl FsStepData {
    /// 成对追加；`None` 同时记入两侧
    pub fn append(&mut self, id: &CalcId, attempt: Option<(Vec<Matrix3>, Vec<Matrix3>)>) {
        let (force, stress) = match attempt {
            Some((f, s)) => (Some(f), Some(s)),
            None => (None, None),
        };
        self.force_step_data.append(id, force);
        self.stress_step_data.append(id, stress);
    }

    pub fn forces(&self) -> &StepData<Vec<Matrix3>> {
        &self.force_step_data
    }

    pub fn stresses(&self) -> &StepData<Vec<Matrix3>> {
        &self.stress_step_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_never_overwrites() {
        let mut data = EnergyStepData::default();
        let id = CalcId::from(3u64);

        data.append(&id, Some(vec![-1.0, -2.0]));
        data.append(&id, None);

        let attempts = data.attempts(&id);
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0], Some(vec![-1.0, -2.0]));
        assert_eq!(attempts[1], None);
    }

    #[test]
    fn test_last_success_skips_failures() {
        let mut data = EnergyStepData::default();
        let id = CalcId::from("a");
        assert!(data.last_success(&id).is_none());

        data.append(&id, Some(vec![-1.0]));
        data.append(&id, None);
        let (index, energies) = data.last_success(&id).unwrap();
        assert_eq!(index, 0);
        assert_eq!(energies, &vec![-1.0]);
    }

    #[test]
    fn test_unknown_id_has_no_attempts() {
        let data = StrucStepData::default();
        assert!(data.attempts(&CalcId::from(1u64)).is_empty());
        assert_eq!(data.ids().count(), 0);
    }

    #[test]
    fn test_fs_pair_stays_consistent() {
        let mut data = FsStepData::default();
        let id = CalcId::from(5u64);

        data.append(&id, Some((vec![vec![[0.0, 0.0, 1.0]]], vec![Vec::new()])));
        data.append(&id, None);

        let forces = data.forces().attempts(&id);
        let stresses = data.stresses().attempts(&id);
        assert_eq!(forces.len(), stresses.len());
        for (f, s) in forces.iter().zip(stresses) {
            assert_eq!(f.is_some(), s.is_some());
        }
        assert_eq!(stresses[0].as_ref().unwrap()[0].len(), 0);
    }

    #[test]
    fn test_json_shape_is_keyed_by_id() {
        let mut data = EnergyStepData::default();
        data.append(&CalcId::from(10u64), None);
        data.append(&CalcId::from(2u64), Some(vec![-3.5]));

        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"2":[[-3.5]],"10":[null]}"#);
    }
}
