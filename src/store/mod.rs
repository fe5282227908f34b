//! # 步骤数据存储
//!
//! 三个累加器分别持久化为数据目录下的 JSON 文件：
//! - `energy_step_data.json`
//! - `struc_step_data.json`
//! - `fs_step_data.json`
//!
//! 写入先落到同目录临时文件再原子重命名，崩溃时不会留下截断的存储。
//! 读-改-写之间不加锁，同一数据目录的调用必须由调用方串行化。
//!
//! ## 依赖关系
//! - 被 `vasp/steps.rs` 和 `commands/` 使用
//! - 使用 `serde_json` 序列化，`tempfile` 原子写入
//! - 子模块: step_data

pub mod step_data;

pub use step_data::{EnergyStepData, FsStepData, StrucStepData};

use crate::error::{CollectError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const ENERGY_STEP_FILE: &str = "energy_step_data.json";
pub const STRUC_STEP_FILE: &str = "struc_step_data.json";
pub const FS_STEP_FILE: &str = "fs_step_data.json";

/// 数据目录
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Store { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_energy_step(&self) -> Result<EnergyStepData> {
        self.load(ENERGY_STEP_FILE)
    }

    pub fn save_energy_step(&self, data: &EnergyStepData) -> Result<()> {
        self.save(ENERGY_STEP_FILE, data)
    }

    pub fn load_struc_step(&self) -> Result<StrucStepData> {
        self.load(STRUC_STEP_FILE)
    }

    pub fn save_struc_step(&self, data: &StrucStepData) -> Result<()> {
        self.save(STRUC_STEP_FILE, data)
    }

    pub fn load_fs_step(&self) -> Result<FsStepData> {
        self.load(FS_STEP_FILE)
    }

    pub fn save_fs_step(&self, data: &FsStepData) -> Result<()> {
        self.save(FS_STEP_FILE, data)
    }

    /// 文件不存在时返回空累加器；存在但无法读取或解码时报错
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(CollectError::read(&path, e)),
        };

        serde_json::from_str(&content).map_err(|e| CollectError::StoreDecodeError {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| CollectError::write(&self.dir, e))?;

        let path = self.dir.join(name);
        let tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| CollectError::write(&path, e))?;

        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, data).map_err(|e| {
                CollectError::StoreEncodeError {
                    path: path.display().to_string(),
                    source: e,
                }
            })?;
            writer.flush().map_err(|e| CollectError::write(&path, e))?;
        }

        tmp.persist(&path)
            .map_err(|e| CollectError::write(&path, e.error))?;
        Ok(())
    }
}
