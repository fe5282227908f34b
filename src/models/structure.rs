//! # 晶体结构数据模型
//!
//! 定义统一的晶体结构表示：晶格 + 元素标签 + 分数坐标。
//! 由 CONTCAR 和 vasprun.xml 解析得到，可序列化进步骤数据存储。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `vasp/` 使用
//! - 使用 `error.rs`

use crate::error::{CollectError, Result};
use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a_vec, b_vec, c_vec] = self.matrix;

        let norm = |v: [f64; 3]| (v[0].powi(2) + v[1].powi(2) + v[2].powi(2)).sqrt();
        let dot = |u: [f64; 3], v: [f64; 3]| u[0] * v[0] + u[1] * v[1] + u[2] * v[2];

        let a = norm(a_vec);
        let b = norm(b_vec);
        let c = norm(c_vec);

        let alpha = (dot(b_vec, c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(a_vec, c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(a_vec, b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积（有符号）
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;

        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
        }
    }

    /// 由元素标签列表和分数坐标列表构造，两者长度必须一致
    pub fn from_species(
        name: impl Into<String>,
        lattice: Lattice,
        species: &[String],
        coords: Vec<[f64; 3]>,
    ) -> Result<Self> {
        if species.len() != coords.len() {
            return Err(CollectError::InvalidStructure(format!(
                "{} species labels but {} coordinates",
                species.len(),
                coords.len()
            )));
        }

        let atoms = species
            .iter()
            .zip(coords)
            .map(|(el, pos)| Atom::new(el.clone(), pos))
            .collect();

        Ok(Crystal::new(name, lattice, atoms))
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for atom in &self.atoms {
            *counts.entry(atom.element.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 计算每原子体积
    pub fn volume_per_atom(&self) -> Option<f64> {
        if self.atoms.is_empty() {
            return None;
        }
        Some(self.lattice.volume().abs() / self.atoms.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(a: f64) -> Lattice {
        Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    #[test]
    fn test_lattice_volume_cubic() {
        let vol = cubic(5.0).volume().abs();

        // 5^3 = 125
        assert!((vol - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_parameters_hexagonal() {
        let lattice = Lattice::from_vectors([
            [3.0, 0.0, 0.0],
            [-1.5, 2.598076211353316, 0.0],
            [0.0, 0.0, 5.0],
        ]);
        let (a, b, c, alpha, beta, gamma) = lattice.parameters();

        assert!((a - 3.0).abs() < 0.01);
        assert!((b - 3.0).abs() < 0.01);
        assert!((c - 5.0).abs() < 0.01);
        assert!((alpha - 90.0).abs() < 0.01);
        assert!((beta - 90.0).abs() < 0.01);
        assert!((gamma - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_crystal_from_species() {
        let species = vec!["Na".to_string(), "Cl".to_string()];
        let crystal = Crystal::from_species(
            "NaCl",
            cubic(5.64),
            &species,
            vec![[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]],
        )
        .unwrap();

        assert_eq!(crystal.atoms.len(), 2);
        assert_eq!(crystal.atoms[1].element, "Cl");
        assert_eq!(crystal.formula(), "ClNa");
    }

    #[test]
    fn test_crystal_from_species_length_mismatch() {
        let species = vec!["Si".to_string()];
        let result = Crystal::from_species(
            "Si",
            cubic(5.43),
            &species,
            vec![[0.0, 0.0, 0.0], [0.25, 0.25, 0.25]],
        );
        assert!(matches!(result, Err(CollectError::InvalidStructure(_))));
    }

    #[test]
    fn test_crystal_volume_per_atom() {
        let crystal = Crystal::new(
            "Fe",
            cubic(2.0),
            vec![
                Atom::new("Fe", [0.0, 0.0, 0.0]),
                Atom::new("Fe", [0.5, 0.5, 0.5]),
            ],
        );
        assert!((crystal.volume_per_atom().unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(crystal.formula(), "Fe2");
    }
}
