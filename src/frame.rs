// 该文件是 Maogou （猫狗） 项目的一部分。
// src/frame.rs - 位图与输入张量定义
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

use image::{DynamicImage, Rgba, RgbaImage, imageops::FilterType};
use thiserror::Error;

pub const RGB_CHANNELS: usize = 3;
pub const BYTES_PER_FLOAT: usize = std::mem::size_of::<f32>();

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
  #[error("图像尺寸无效: {0}x{1}")]
  ZeroSize(u32, u32),
  #[error("像素数量不匹配: 期望 {expected}, 实际 {actual}")]
  PixelCountMismatch { expected: usize, actual: usize },
}

/// 已解码的位图，宽高均大于 0。
#[derive(Debug, Clone)]
pub struct Bitmap {
  image: RgbaImage,
}

impl Bitmap {
  /// 由行优先的 `0xAARRGGBB` 像素构造
  pub fn from_argb(width: u32, height: u32, pixels: &[u32]) -> Result<Self, FrameError> {
    check_size(width, height)?;
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
      return Err(FrameError::PixelCountMismatch {
        expected,
        actual: pixels.len(),
      });
    }

    let image = RgbaImage::from_fn(width, height, |x, y| {
      unpack_argb(pixels[y as usize * width as usize + x as usize])
    });
    Ok(Self { image })
  }

  pub fn from_rgba(image: RgbaImage) -> Result<Self, FrameError> {
    check_size(image.width(), image.height())?;
    Ok(Self { image })
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  /// 最近邻拉伸到 `side × side`，不保持宽高比
  pub fn scale(&self, side: u32) -> Result<Bitmap, FrameError> {
    check_size(side, side)?;
    if self.width() == side && self.height() == side {
      return Ok(self.clone());
    }
    let image = image::imageops::resize(&self.image, side, side, FilterType::Nearest);
    Ok(Self { image })
  }

  /// 行优先遍历像素，每个像素为打包的 ARGB 整数
  pub fn argb_pixels(&self) -> impl Iterator<Item = u32> + '_ {
    self.image.pixels().map(pack_argb)
  }

  pub fn as_rgba(&self) -> &RgbaImage {
    &self.image
  }
}

impl TryFrom<DynamicImage> for Bitmap {
  type Error = FrameError;

  fn try_from(image: DynamicImage) -> Result<Self, Self::Error> {
    Bitmap::from_rgba(image.to_rgba8())
  }
}

fn check_size(width: u32, height: u32) -> Result<(), FrameError> {
  if width == 0 || height == 0 {
    return Err(FrameError::ZeroSize(width, height));
  }
  Ok(())
}

fn pack_argb(pixel: &Rgba<u8>) -> u32 {
  let [r, g, b, a] = pixel.0;
  u32::from_be_bytes([a, r, g, b])
}

fn unpack_argb(value: u32) -> Rgba<u8> {
  let [a, r, g, b] = value.to_be_bytes();
  Rgba([r, g, b, a])
}

/// NHWC 排布的 f32 输入张量：`[1, side, side, 3]`，逐像素 R、G、B 交错。
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
  side: u32,
  data: Box<[f32]>,
}

impl InputTensor {
  pub(crate) fn new(side: u32, data: Box<[f32]>) -> Self {
    Self { side, data }
  }

  pub fn side(&self) -> u32 {
    self.side
  }

  pub fn shape(&self) -> [usize; 4] {
    let side = self.side as usize;
    [1, side, side, RGB_CHANNELS]
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn byte_len(&self) -> usize {
    self.data.len() * BYTES_PER_FLOAT
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }

  /// 本机字节序的原始字节
  pub fn to_ne_bytes(&self) -> Vec<u8> {
    self.data.iter().flat_map(|v| v.to_ne_bytes()).collect()
  }

  pub fn expected_byte_len(side: u32) -> usize {
    side as usize * side as usize * RGB_CHANNELS * BYTES_PER_FLOAT
  }
}
