// 该文件是 Maogou （猫狗） 项目的一部分。
// src/engine.rs - 推理引擎接口
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

use thiserror::Error;

use crate::frame::InputTensor;

#[derive(Error, Debug)]
pub enum EngineError {
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("推理错误: {0}")]
  Inference(String),
  #[error("输入张量形状不匹配: 期望 {expected:?}, 实际 {actual:?}")]
  InputShape {
    expected: [usize; 4],
    actual: [usize; 4],
  },
  #[cfg(feature = "engine_tract")]
  #[error("tract 错误: {0}")]
  Tract(#[from] tract_onnx::prelude::TractError),
}

/// 引擎初始化参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
  pub input_size: u32,
  pub num_threads: usize,
  pub use_acceleration: bool,
}

/// 推理后端。`run` 只借用 `&self`，实现必须支持同一实例上的并发调用。
pub trait Engine: Sized + Send + Sync {
  /// 从模型字节创建引擎，字节在调用期间借用
  fn load(model: &[u8], options: &EngineOptions) -> Result<Self, EngineError>;

  /// 加载时即可确定的输出长度
  fn output_len(&self) -> Option<usize> {
    None
  }

  /// 执行一次推理，按模型输出顺序返回每个输出张量的扁平数据
  fn run(&self, input: &InputTensor) -> Result<Vec<Box<[f32]>>, EngineError>;
}

#[cfg(feature = "engine_tract")]
mod tract;
#[cfg(feature = "engine_tract")]
pub use self::tract::TractEngine;
