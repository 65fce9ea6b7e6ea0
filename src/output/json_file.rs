// 该文件是 Maogou （猫狗） 项目的一部分。
// src/output/json_file.rs - 保存 JSON 结果文件
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

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, frame::Bitmap, model::Recognition, output::Render, url_file_path,
};

#[derive(Error, Debug)]
pub enum JsonFileOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("输出路径不是有效的 UTF-8: {0}")]
  InvalidPath(#[from] std::string::FromUtf8Error),
}

#[derive(Serialize)]
struct JsonRecord<'a> {
  width: u32,
  height: u32,
  recognitions: &'a [Recognition],
}

/// 将分类结果保存为 JSON 文件
pub struct JsonFileOutput {
  path: PathBuf,
}

impl FromUrlWithScheme for JsonFileOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonFileOutput {
  type Error = JsonFileOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(JsonFileOutputError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(JsonFileOutput {
      path: url_file_path(uri)?,
    })
  }
}

impl JsonFileOutput {
  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl Render<Bitmap, Vec<Recognition>> for JsonFileOutput {
  type Error = JsonFileOutputError;

  fn render_result(&self, frame: &Bitmap, result: &Vec<Recognition>) -> Result<(), Self::Error> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let record = JsonRecord {
      width: frame.width(),
      height: frame.height(),
      recognitions: result,
    };
    let file = std::fs::File::create(&self.path)?;
    serde_json::to_writer_pretty(file, &record)?;

    warn!("保存分类结果到文件: {}", self.path.display());
    Ok(())
  }
}
