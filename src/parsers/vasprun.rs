//! # VASP vasprun.xml 解析器
//!
//! 按弛豫步提取能量、结构、力和应力。每个 `<calculation>` 元素对应一个
//! 离子步，文档顺序即优化轨迹顺序。
//!
//! ## 结构说明
//! ```text
//! <modeling>
//!   <atominfo>
//!     <array name="atoms"><set><rc><c>Si</c><c>1</c></rc>...</set></array>
//!   </atominfo>
//!   <calculation>
//!     <structure>
//!       <crystal><varray name="basis"><v>...</v>x3</varray></crystal>
//!       <varray name="positions"><v>...</v>...</varray>
//!     </structure>
//!     <varray name="forces"><v>...</v>...</varray>
//!     <varray name="stress"><v>...</v>x3</varray>
//!     <energy><i name="e_fr_energy">...</i>...</energy>
//!   </calculation>
//!   ...
//! </modeling>
//! ```
//!
//! 任一步出错即整个文件失败，不返回部分结果。
//!
//! ## 依赖关系
//! - 被 `vasp/steps.rs` 使用
//! - 使用 `models/`
//! - 使用 `roxmltree` 解析 XML

use crate::error::{CollectError, Result};
use crate::models::{Crystal, Lattice, Matrix3};
use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;

const FORMAT: &str = "vasprun.xml";

/// 自由能标记
pub const FREE_ENERGY_MARKER: &str = "e_fr_energy";

/// 读取并解析 vasprun.xml，交给 `f` 处理文档
fn with_document<T>(path: &Path, f: impl FnOnce(Node) -> std::result::Result<T, String>) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| CollectError::read(path, e))?;
    // vasprun.xml 声明 ISO-8859-1，但内容实际为 ASCII
    let text = String::from_utf8_lossy(&bytes);
    let doc = Document::parse(&text).map_err(|e| CollectError::parse(FORMAT, path, e.to_string()))?;
    f(doc.root_element()).map_err(|reason| CollectError::parse(FORMAT, path, reason))
}

/// 提取每个离子步的自由能 (eV)
pub fn parse_energy_steps(path: &Path) -> Result<Vec<f64>> {
    with_document(path, |root| {
        calculations(root)
            .enumerate()
            .map(|(step, cal)| step_free_energy(cal).map_err(|e| format!("step {}: {}", step + 1, e)))
            .collect()
    })
}

/// 提取每个离子步的结构
///
/// 结构名称为 `<name_prefix>_step<N>`。
pub fn parse_structure_steps(path: &Path, name_prefix: &str) -> Result<Vec<Crystal>> {
    with_document(path, |root| {
        let species = atom_species(root)?;
        calculations(root)
            .enumerate()
            .map(|(step, cal)| {
                step_structure(cal, &species, &format!("{}_step{}", name_prefix, step + 1))
                    .map_err(|e| format!("step {}: {}", step + 1, e))
            })
            .collect()
    })
}

/// 每个离子步的力与应力
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForceStressSteps {
    pub forces: Vec<Matrix3>,
    pub stress: Vec<Matrix3>,
}

/// 提取每个离子步的力和应力
///
/// 某步缺少某类 varray 时，该步对应矩阵为空。
pub fn parse_force_stress_steps(path: &Path) -> Result<ForceStressSteps> {
    with_document(path, |root| {
        let mut steps = ForceStressSteps::default();
        for (step, cal) in calculations(root).enumerate() {
            let (force, stress) =
                step_force_stress(cal).map_err(|e| format!("step {}: {}", step + 1, e))?;
            steps.forces.push(force);
            steps.stress.push(stress);
        }
        Ok(steps)
    })
}

// ─────────────────────────────────────────────────────────────
// 节点查找
// ─────────────────────────────────────────────────────────────

/// 指定标签名的直接子元素
fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name(tag))
}

/// 指定标签名且 name 属性匹配的直接子元素
fn named_children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    children(node, tag).filter(move |n| n.attribute("name") == Some(name))
}

fn first_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> std::result::Result<Node<'a, 'input>, String> {
    node.children()
        .find(|n| n.is_element() && n.has_tag_name(tag))
        .ok_or_else(|| format!("missing <{}> in <{}>", tag, node.tag_name().name()))
}

fn calculations<'a, 'input: 'a>(root: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    children(root, "calculation")
}

// ─────────────────────────────────────────────────────────────
// 数值解析
// ─────────────────────────────────────────────────────────────

fn parse_float(text: &str) -> std::result::Result<f64, String> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| format!("invalid number '{}'", text.trim()))?;
    // 非有限值无法存入 JSON 存储
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("non-finite number '{}'", text.trim()))
    }
}

/// 解析 `<v>` 行向量，要求恰好三个分量
fn parse_row(v: Node) -> std::result::Result<[f64; 3], String> {
    let text = v.text().unwrap_or_default();
    let values = text
        .split_whitespace()
        .map(parse_float)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match values.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(format!("expected 3 components, got {}", values.len())),
    }
}

fn parse_rows<'a, 'input: 'a>(
    vs: impl Iterator<Item = Node<'a, 'input>>,
) -> std::result::Result<Matrix3, String> {
    vs.map(parse_row).collect()
}

// ─────────────────────────────────────────────────────────────
// 单步提取
// ─────────────────────────────────────────────────────────────

fn step_free_energy(cal: Node) -> std::result::Result<f64, String> {
    let energy = first_child(cal, "energy")?;
    let item = first_child(energy, "i")?;

    match item.attribute("name") {
        Some(FREE_ENERGY_MARKER) => parse_float(item.text().unwrap_or_default()),
        Some(other) => Err(format!(
            "first energy item is '{}', expected '{}'",
            other, FREE_ENERGY_MARKER
        )),
        None => Err("energy item without name".to_string()),
    }
}

/// atominfo 中的元素标签，整个文件共用
fn atom_species(root: Node) -> std::result::Result<Vec<String>, String> {
    let mut species = Vec::new();
    for atominfo in children(root, "atominfo") {
        for array in named_children(atominfo, "array", "atoms") {
            for set in children(array, "set") {
                for rc in children(set, "rc") {
                    let c = first_child(rc, "c")?;
                    species.push(c.text().unwrap_or_default().trim().to_string());
                }
            }
        }
    }
    Ok(species)
}

fn step_structure(cal: Node, species: &[String], name: &str) -> std::result::Result<Crystal, String> {
    let mut basis = Vec::new();
    let mut positions = Vec::new();

    for structure in children(cal, "structure") {
        for crystal in children(structure, "crystal") {
            for varray in named_children(crystal, "varray", "basis") {
                basis.extend(parse_rows(children(varray, "v"))?);
            }
        }
        for varray in named_children(structure, "varray", "positions") {
            positions.extend(parse_rows(children(varray, "v"))?);
        }
    }

    let matrix: [[f64; 3]; 3] = basis
        .try_into()
        .map_err(|b: Vec<[f64; 3]>| format!("basis has {} vectors, expected 3", b.len()))?;

    Crystal::from_species(name, Lattice::from_vectors(matrix), species, positions)
        .map_err(|e| e.to_string())
}

fn step_force_stress(cal: Node) -> std::result::Result<(Matrix3, Matrix3), String> {
    let mut force = Matrix3::new();
    let mut stress = Matrix3::new();

    for varray in children(cal, "varray") {
        // 只解析 forces/stress 的行，其他数组的宽度不受约束
        match varray.attribute("name") {
            Some("forces") => force.extend(parse_rows(children(varray, "v"))?),
            Some("stress") => stress.extend(parse_rows(children(varray, "v"))?),
            Some(_) => {}
            None if children(varray, "v").next().is_none() => {}
            None => return Err("varray without name".to_string()),
        }
    }

    Ok((force, stress))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 两步弛豫的最小 vasprun.xml
    pub(crate) const VASPRUN_TWO_STEPS: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<modeling>
 <generator>
  <i name="program" type="string">vasp </i>
 </generator>
 <atominfo>
  <atoms>       2 </atoms>
  <array name="atoms" >
   <dimension dim="1">ion</dimension>
   <field type="string">element</field>
   <field type="int">atomtype</field>
   <set>
    <rc><c>Si</c><c>   1</c></rc>
    <rc><c>O </c><c>   2</c></rc>
   </set>
  </array>
 </atominfo>
 <calculation>
  <structure>
   <crystal>
    <varray name="basis" >
     <v>       5.00000000       0.00000000       0.00000000 </v>
     <v>       0.00000000       5.00000000       0.00000000 </v>
     <v>       0.00000000       0.00000000       5.00000000 </v>
    </varray>
    <i name="volume">    125.00000000 </i>
   </crystal>
   <varray name="positions" >
    <v>       0.00000000       0.00000000       0.00000000 </v>
    <v>       0.50000000       0.50000000       0.50000000 </v>
   </varray>
  </structure>
  <varray name="forces" >
   <v>       0.10000000      -0.10000000       0.00000000 </v>
   <v>      -0.10000000       0.10000000       0.00000000 </v>
  </varray>
  <varray name="stress" >
   <v>      10.00000000       0.00000000       0.00000000 </v>
   <v>       0.00000000      10.00000000       0.00000000 </v>
   <v>       0.00000000       0.00000000      10.00000000 </v>
  </varray>
  <energy>
   <i name="e_fr_energy">    -10.50000000 </i>
   <i name="e_wo_entrp">    -10.49000000 </i>
   <i name="e_0_energy">    -10.49500000 </i>
  </energy>
 </calculation>
 <calculation>
  <structure>
   <crystal>
    <varray name="basis" >
     <v>       4.90000000       0.00000000       0.00000000 </v>
     <v>       0.00000000       4.90000000       0.00000000 </v>
     <v>       0.00000000       0.00000000       4.90000000 </v>
    </varray>
   </crystal>
   <varray name="positions" >
    <v>       0.01000000       0.00000000       0.00000000 </v>
    <v>       0.50000000       0.49000000       0.50000000 </v>
   </varray>
  </structure>
  <varray name="forces" >
   <v>       0.01000000      -0.01000000       0.00000000 </v>
   <v>      -0.01000000       0.01000000       0.00000000 </v>
  </varray>
  <energy>
   <i name="e_fr_energy">    -10.75000000 </i>
   <i name="e_wo_entrp">    -10.74000000 </i>
  </energy>
 </calculation>
</modeling>
"#;

    pub(crate) fn write_vasprun(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("vasprun.xml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_energy_steps_in_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vasprun(dir.path(), VASPRUN_TWO_STEPS);

        let energies = parse_energy_steps(&path).unwrap();
        assert_eq!(energies, vec![-10.5, -10.75]);
    }

    #[test]
    fn test_energy_wrong_marker_fails_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let content = VASPRUN_TWO_STEPS.replacen(
            r#"<i name="e_fr_energy">    -10.75000000 </i>"#,
            r#"<i name="e_0_energy">    -10.75000000 </i>"#,
            1,
        );
        let path = write_vasprun(dir.path(), &content);

        let err = parse_energy_steps(&path).unwrap_err();
        assert!(err.to_string().contains("step 2"));
    }

    #[test]
    fn test_energy_missing_node_fails() {
        let dir = tempfile::tempdir().unwrap();
        let content = VASPRUN_TWO_STEPS.replacen("<energy>", "<energy_missing>", 1).replacen(
            "</energy>",
            "</energy_missing>",
            1,
        );
        let path = write_vasprun(dir.path(), &content);
        assert!(parse_energy_steps(&path).is_err());
    }

    #[test]
    fn test_truncated_xml_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let cut = VASPRUN_TWO_STEPS.len() / 2;
        let path = write_vasprun(dir.path(), &VASPRUN_TWO_STEPS[..cut]);
        assert!(matches!(
            parse_energy_steps(&path),
            Err(CollectError::ParseError { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            parse_energy_steps(&dir.path().join("vasprun.xml")),
            Err(CollectError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_no_calculation_gives_empty_steps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vasprun(dir.path(), "<modeling><generator/></modeling>");
        assert!(parse_energy_steps(&path).unwrap().is_empty());
    }

    #[test]
    fn test_structure_steps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vasprun(dir.path(), VASPRUN_TWO_STEPS);

        let structures = parse_structure_steps(&path, "7").unwrap();
        assert_eq!(structures.len(), 2);
        assert_eq!(structures[0].name, "7_step1");

        let last = &structures[1];
        assert_eq!(last.atoms[0].element, "Si");
        assert_eq!(last.atoms[1].element, "O");
        assert!((last.lattice.matrix[0][0] - 4.9).abs() < 1e-12);
        assert!((last.atoms[1].position[1] - 0.49).abs() < 1e-12);
    }

    #[test]
    fn test_structure_species_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let content = VASPRUN_TWO_STEPS.replacen(
            "    <rc><c>O </c><c>   2</c></rc>\n",
            "",
            1,
        );
        let path = write_vasprun(dir.path(), &content);
        assert!(parse_structure_steps(&path, "7").is_err());
    }

    #[test]
    fn test_force_stress_steps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vasprun(dir.path(), VASPRUN_TWO_STEPS);

        let steps = parse_force_stress_steps(&path).unwrap();
        assert_eq!(steps.forces.len(), 2);
        assert_eq!(steps.stress.len(), 2);
        assert_eq!(steps.forces[0], vec![[0.1, -0.1, 0.0], [-0.1, 0.1, 0.0]]);
        assert_eq!(steps.stress[0].len(), 3);
        // 第二步没有 stress varray
        assert!(steps.stress[1].is_empty());
        assert_eq!(steps.forces[1].len(), 2);
    }

    #[test]
    fn test_force_bad_row_fails() {
        let dir = tempfile::tempdir().unwrap();
        let content = VASPRUN_TWO_STEPS.replacen(
            "<v>       0.01000000      -0.01000000       0.00000000 </v>",
            "<v>       0.01000000      ********* </v>",
            1,
        );
        let path = write_vasprun(dir.path(), &content);
        assert!(parse_force_stress_steps(&path).is_err());
    }

    #[test]
    fn test_force_ignores_other_varrays() {
        let dir = tempfile::tempdir().unwrap();
        let content = VASPRUN_TWO_STEPS.replacen(
            "  <varray name=\"stress\" >",
            "  <varray name=\"dipole\" >\n   <v> 1.0 2.0 </v>\n   <v> n/a </v>\n  </varray>\n  <varray name=\"stress\" >",
            1,
        );
        let path = write_vasprun(dir.path(), &content);

        let steps = parse_force_stress_steps(&path).unwrap();
        assert_eq!(steps.forces.len(), 2);
        assert_eq!(steps.forces[0], vec![[0.1, -0.1, 0.0], [-0.1, 0.1, 0.0]]);
        assert_eq!(steps.stress[0].len(), 3);
    }

    #[test]
    fn test_force_unnamed_varray() {
        let dir = tempfile::tempdir().unwrap();
        let empty = VASPRUN_TWO_STEPS.replacen(
            "  <varray name=\"stress\" >",
            "  <varray>\n  </varray>\n  <varray name=\"stress\" >",
            1,
        );
        let path = write_vasprun(dir.path(), &empty);
        assert!(parse_force_stress_steps(&path).is_ok());

        let with_rows = VASPRUN_TWO_STEPS.replacen(
            "  <varray name=\"stress\" >",
            "  <varray>\n   <v> 1.0 2.0 </v>\n  </varray>\n  <varray name=\"stress\" >",
            1,
        );
        let path = write_vasprun(dir.path(), &with_rows);
        assert!(parse_force_stress_steps(&path).is_err());
    }
}
