// 该文件是 Maogou （猫狗） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{Bitmap, FrameError},
  url_file_path,
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI 方案不匹配")]
  SchemaMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像加载错误: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("图像无效: {0}")]
  InvalidImage(#[from] FrameError),
  #[error("图像路径不是有效的 UTF-8: {0}")]
  InvalidPath(#[from] std::string::FromUtf8Error),
}

/// 单张图像文件输入，迭代时只产出一帧
pub struct ImageFileInput {
  image: Option<Bitmap>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = url_file_path(url)?;
    let image = ImageReader::open(&path)?.with_guessed_format()?.decode()?;
    let bitmap = Bitmap::try_from(image)?;
    debug!(
      "读取图像 {}: {}x{}",
      path.display(),
      bitmap.width(),
      bitmap.height()
    );

    Ok(ImageFileInput {
      image: Some(bitmap),
    })
  }
}

impl ImageFileInput {
  pub fn from_bitmap(bitmap: Bitmap) -> Self {
    ImageFileInput {
      image: Some(bitmap),
    }
  }
}

impl Iterator for ImageFileInput {
  type Item = Bitmap;

  fn next(&mut self) -> Option<Self::Item> {
    self.image.take()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgba, RgbaImage};

  #[test]
  fn reads_png_from_image_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cat.png");
    RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]))
      .save(&path)
      .unwrap();

    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    let mut input = ImageFileInput::from_url(&url).unwrap();

    let bitmap = input.next().unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (3, 2));
    assert!(bitmap.argb_pixels().all(|p| p == 0xFF0A_141E));
    assert!(input.next().is_none());
  }

  #[test]
  fn reads_path_with_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my cats").join("tabby cat.png");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]))
      .save(&path)
      .unwrap();

    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    assert!(url.path().contains("my%20cats"));
    let bitmap = ImageFileInput::from_url(&url).unwrap().next().unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (2, 2));
  }

  #[test]
  fn rejects_other_schemes() {
    let url = Url::parse("file:///tmp/cat.png").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemaMismatch)
    ));
  }

  #[test]
  fn missing_file_is_io_error() {
    let url = Url::parse("image:///definitely/not/here.png").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::IoError(_))
    ));
  }
}
