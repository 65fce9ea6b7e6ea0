// 该文件是 Maogou （猫狗） 项目的一部分。
// src/preprocess.rs - 图像预处理
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
use tracing::debug;

use crate::{
  config::ClassifierConfig,
  frame::{Bitmap, FrameError, InputTensor, RGB_CHANNELS},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreprocessError {
  #[error("图像无效: {0}")]
  InvalidImage(#[from] FrameError),
  #[error("张量字节数不匹配: 期望 {expected}, 实际 {actual}")]
  TensorSize { expected: usize, actual: usize },
}

/// 将位图拉伸到模型输入尺寸，并按 `(通道 - 均值) / 归一化常数` 转为 RGB 交错的 f32 张量
pub fn to_input_tensor(
  bitmap: &Bitmap,
  config: &ClassifierConfig,
) -> Result<InputTensor, PreprocessError> {
  let side = config.input_size;
  let scaled = bitmap.scale(side)?;
  debug!(
    "缩放图像: {}x{} -> {}x{}",
    bitmap.width(),
    bitmap.height(),
    side,
    side
  );

  let mut data = Vec::with_capacity(side as usize * side as usize * RGB_CHANNELS);
  for pixel in scaled.argb_pixels() {
    let red = ((pixel >> 16) & 0xFF) as f32 - config.image_mean;
    let green = ((pixel >> 8) & 0xFF) as f32 - config.image_mean;
    let blue = (pixel & 0xFF) as f32 - config.image_mean;

    data.push(red / config.image_std);
    data.push(green / config.image_std);
    data.push(blue / config.image_std);
  }

  let tensor = InputTensor::new(side, data.into_boxed_slice());
  let expected = InputTensor::expected_byte_len(side);
  if tensor.byte_len() != expected {
    return Err(PreprocessError::TensorSize {
      expected,
      actual: tensor.byte_len(),
    });
  }

  Ok(tensor)
}
