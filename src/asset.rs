// 该文件是 Maogou （猫狗） 项目的一部分。
// src/asset.rs - 模型与标签资产读取
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{
  collections::HashMap,
  fs::File,
  ops::Deref,
  path::{Path, PathBuf},
};

use memmap2::Mmap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum AssetError {
  #[error("资产不存在: {0}")]
  NotFound(String),
  #[error("资产读取错误: {path}, 错误: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("标签文件不是有效的 UTF-8: {0}")]
  InvalidUtf8(String),
  #[error("标签文件为空: {0}")]
  EmptyLabels(String),
}

impl AssetError {
  fn io(path: &str, source: std::io::Error) -> Self {
    if source.kind() == std::io::ErrorKind::NotFound {
      AssetError::NotFound(path.to_string())
    } else {
      AssetError::Io {
        path: path.to_string(),
        source,
      }
    }
  }
}

/// 模型字节的只读视图，在分类器生命周期内保持有效。
pub enum ModelBytes {
  Mapped(Mmap),
  Owned(Box<[u8]>),
}

impl Deref for ModelBytes {
  type Target = [u8];

  fn deref(&self) -> &[u8] {
    match self {
      ModelBytes::Mapped(map) => map,
      ModelBytes::Owned(bytes) => bytes,
    }
  }
}

impl std::fmt::Debug for ModelBytes {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let kind = match self {
      ModelBytes::Mapped(_) => "Mapped",
      ModelBytes::Owned(_) => "Owned",
    };
    f.debug_struct("ModelBytes")
      .field("kind", &kind)
      .field("len", &self.len())
      .finish()
  }
}

/// 按路径提供模型与标签文件的资产来源。
pub trait AssetSource {
  fn open_model(&self, path: &str) -> Result<ModelBytes, AssetError>;
  fn read_labels(&self, path: &str) -> Result<String, AssetError>;
}

/// 以目录为根的资产来源，模型文件以只读方式内存映射。
#[derive(Debug, Clone)]
pub struct AssetDir {
  root: PathBuf,
}

impl AssetDir {
  pub fn new(root: impl AsRef<Path>) -> Self {
    Self {
      root: root.as_ref().to_path_buf(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn resolve(&self, path: &str) -> PathBuf {
    self.root.join(path)
  }
}

impl AssetSource for AssetDir {
  fn open_model(&self, path: &str) -> Result<ModelBytes, AssetError> {
    let full = self.resolve(path);
    let file = File::open(&full).map_err(|e| AssetError::io(path, e))?;
    // SAFETY: 文件以只读方式打开，映射期间资产文件不应被其他进程改写。
    let map = unsafe { Mmap::map(&file) }.map_err(|e| AssetError::io(path, e))?;
    debug!(
      "映射模型文件 {}: {:.2} MB",
      full.display(),
      map.len() as f64 / (1024.0 * 1024.0)
    );
    Ok(ModelBytes::Mapped(map))
  }

  fn read_labels(&self, path: &str) -> Result<String, AssetError> {
    let bytes = std::fs::read(self.resolve(path)).map_err(|e| AssetError::io(path, e))?;
    String::from_utf8(bytes).map_err(|_| AssetError::InvalidUtf8(path.to_string()))
  }
}

/// 内存中的资产，适用于随程序打包（如 `include_bytes!`）的模型与标签。
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
  files: HashMap<String, Box<[u8]>>,
}

impl MemoryAssets {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
    self.insert(path, bytes);
    self
  }

  pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
    self
      .files
      .insert(path.to_string(), bytes.into().into_boxed_slice());
  }

  fn get(&self, path: &str) -> Result<&[u8], AssetError> {
    self
      .files
      .get(path)
      .map(|bytes| &bytes[..])
      .ok_or_else(|| AssetError::NotFound(path.to_string()))
  }
}

impl AssetSource for MemoryAssets {
  fn open_model(&self, path: &str) -> Result<ModelBytes, AssetError> {
    Ok(ModelBytes::Owned(self.get(path)?.into()))
  }

  fn read_labels(&self, path: &str) -> Result<String, AssetError> {
    let bytes = self.get(path)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| AssetError::InvalidUtf8(path.to_string()))
  }
}

/// 有序标签列表，下标与模型输出向量位置一一对应。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelList {
  labels: Box<[String]>,
}

impl LabelList {
  /// 每行一个标签，保持文件顺序
  pub fn parse(text: &str) -> Self {
    Self {
      labels: text.lines().map(str::to_string).collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&str> {
    self.labels.get(index).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.labels.iter().map(String::as_str)
  }
}

impl<S: Into<String>> FromIterator<S> for LabelList {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      labels: iter.into_iter().map(Into::into).collect(),
    }
  }
}

pub fn load_label_list<A: AssetSource + ?Sized>(
  assets: &A,
  path: &str,
) -> Result<LabelList, AssetError> {
  let labels = LabelList::parse(&assets.read_labels(path)?);
  if labels.is_empty() {
    return Err(AssetError::EmptyLabels(path.to_string()));
  }
  debug!("标签数量: {}", labels.len());
  Ok(labels)
}
