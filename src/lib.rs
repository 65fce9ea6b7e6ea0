// 该文件是 Maogou （猫狗） 项目的一部分。
// src/lib.rs - 库主文件
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

use std::{path::PathBuf, string::FromUtf8Error};

pub mod asset;
pub mod config;
pub mod engine;
pub mod frame;
pub mod input;
pub mod model;
pub mod output;
pub mod preprocess;
pub mod task;

pub use crate::config::ClassifierConfig;
pub use crate::model::{ImageClassifier, Model, Recognition};

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

/// URL 的路径部分经百分号解码后的文件路径，`image:///my%20cats/a.png` 对应 `/my cats/a.png`
pub fn url_file_path(url: &url::Url) -> Result<PathBuf, FromUtf8Error> {
  Ok(PathBuf::from(urlencoding::decode(url.path())?.into_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_path_is_percent_decoded() {
    let url = url::Url::parse("image:///tmp/my cats/%E7%8C%AB.png").unwrap();
    assert_eq!(url.path(), "/tmp/my%20cats/%E7%8C%AB.png");
    assert_eq!(
      url_file_path(&url).unwrap(),
      PathBuf::from("/tmp/my cats/猫.png")
    );
  }

  #[test]
  fn non_utf8_url_path_is_rejected() {
    let url = url::Url::parse("image:///tmp/%FF.png").unwrap();
    assert!(url_file_path(&url).is_err());
  }
}
