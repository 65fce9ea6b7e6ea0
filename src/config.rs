// 该文件是 Maogou （猫狗） 项目的一部分。
// src/config.rs - 分类器配置
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

use crate::engine::EngineOptions;

const DEFAULT_INPUT_SIZE: u32 = 224;
const DEFAULT_NUM_THREADS: usize = 5;
const DEFAULT_MAX_RESULTS: usize = 3;
const DEFAULT_IMAGE_MEAN: f32 = 0.0;
const DEFAULT_IMAGE_STD: f32 = 255.0;
const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
  #[error("输入尺寸必须大于 0")]
  ZeroInputSize,
  #[error("线程数必须大于 0")]
  ZeroThreads,
  #[error("最大结果数必须大于 0")]
  ZeroMaxResults,
  #[error("归一化常数无效: {0}")]
  InvalidImageStd(f32),
  #[error("均值偏移无效: {0}")]
  InvalidImageMean(f32),
  #[error("置信度阈值无效: {0}")]
  InvalidThreshold(f32),
}

/// 分类器的不可变配置，构造时传入，整个实例生命周期内不变。
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
  /// 模型输入边长，图像会被直接拉伸为 `input_size × input_size`
  pub input_size: u32,
  /// 推理引擎内部并行线程数提示
  pub num_threads: usize,
  /// 是否请求硬件加速（不可用时由引擎回退到 CPU）
  pub use_acceleration: bool,
  /// 通道均值偏移
  pub image_mean: f32,
  /// 通道归一化常数
  pub image_std: f32,
  /// 置信度接受阈值（包含）
  pub confidence_threshold: f32,
  /// 最多返回的结果数
  pub max_results: usize,
}

impl Default for ClassifierConfig {
  fn default() -> Self {
    Self {
      input_size: DEFAULT_INPUT_SIZE,
      num_threads: DEFAULT_NUM_THREADS,
      use_acceleration: true,
      image_mean: DEFAULT_IMAGE_MEAN,
      image_std: DEFAULT_IMAGE_STD,
      confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
      max_results: DEFAULT_MAX_RESULTS,
    }
  }
}

impl ClassifierConfig {
  pub fn with_input_size(input_size: u32) -> Self {
    Self {
      input_size,
      ..Self::default()
    }
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.input_size == 0 {
      return Err(ConfigError::ZeroInputSize);
    }
    if self.num_threads == 0 {
      return Err(ConfigError::ZeroThreads);
    }
    if self.max_results == 0 {
      return Err(ConfigError::ZeroMaxResults);
    }
    if !self.image_std.is_finite() || self.image_std == 0.0 {
      return Err(ConfigError::InvalidImageStd(self.image_std));
    }
    if !self.image_mean.is_finite() {
      return Err(ConfigError::InvalidImageMean(self.image_mean));
    }
    if !self.confidence_threshold.is_finite() {
      return Err(ConfigError::InvalidThreshold(self.confidence_threshold));
    }
    Ok(())
  }

  pub fn engine_options(&self) -> EngineOptions {
    EngineOptions {
      input_size: self.input_size,
      num_threads: self.num_threads,
      use_acceleration: self.use_acceleration,
    }
  }
}
