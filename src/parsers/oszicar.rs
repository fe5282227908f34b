//! # VASP OSZICAR 解析器
//!
//! 只检查 OSZICAR 最后一行，提取自由能与总磁矩。
//!
//! ## 格式说明
//! ```text
//!    3 F= -.10532143E+02 E0= -.10531958E+02  d E =-.107E-03  mag=     2.0001
//! ```
//! 第三个字段为自由能 (eV)，若含 `mag=` 则最后一个字段为总磁矩。
//!
//! ## 依赖关系
//! - 被 `vasp/result.rs` 使用

use crate::error::{CollectError, Result};
use std::fs;
use std::path::Path;

const ENERGY_MARKER: &str = "F=";
const MAGMOM_MARKER: &str = "mag=";

/// 解析 OSZICAR 文件，返回 (energy, magmom)
///
/// 没有 `mag=` 时 magmom 为 NaN。
pub fn parse_oszicar(path: &Path) -> Result<(f64, f64)> {
    let content = fs::read_to_string(path).map_err(|e| CollectError::read(path, e))?;

    let last = content
        .lines()
        .last()
        .ok_or_else(|| CollectError::parse("OSZICAR", path, "empty file"))?;

    parse_last_line(last).map_err(|reason| CollectError::parse("OSZICAR", path, reason))
}

/// 解析 OSZICAR 最后一行
pub fn parse_last_line(line: &str) -> std::result::Result<(f64, f64), String> {
    if !line.contains(ENERGY_MARKER) {
        return Err(format!("no '{}' in last line", ENERGY_MARKER));
    }

    let fields: Vec<&str> = line.split_whitespace().collect();

    let energy = fields
        .get(2)
        .ok_or_else(|| "missing energy field".to_string())?
        .parse::<f64>()
        .map_err(|e| format!("invalid energy '{}': {}", fields[2], e))?;

    let magmom = if line.contains(MAGMOM_MARKER) {
        let last = fields.last().copied().unwrap_or_default();
        last.parse::<f64>()
            .map_err(|e| format!("invalid magmom '{}': {}", last, e))?
    } else {
        f64::NAN
    };

    Ok((energy, magmom))
}
