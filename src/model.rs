// 该文件是 Maogou （猫狗） 项目的一部分。
// src/model.rs - 模型
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

use serde::Serialize;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 单条分类结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recognition {
  /// 标签下标的字符串形式
  pub id: String,
  pub title: String,
  /// 模型原始输出，不做重新归一化
  pub confidence: f32,
}

impl std::fmt::Display for Recognition {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Title = {}, Confidence = {}", self.title, self.confidence)
  }
}

mod classifier;
mod rank;

pub use self::classifier::{ClassifierBuilder, ClassifierError, ImageClassifier, ModelLoadError};
pub use self::rank::rank;
