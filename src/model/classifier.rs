// 该文件是 Maogou （猫狗） 项目的一部分。
// src/model/classifier.rs - 图像分类器
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  asset::{AssetDir, AssetError, AssetSource, LabelList, ModelBytes, load_label_list},
  config::{ClassifierConfig, ConfigError},
  engine::{Engine, EngineError},
  frame::Bitmap,
  model::{Model, Recognition, rank},
  preprocess::{PreprocessError, to_input_tensor},
  url_file_path,
};

/// 分类模型只有一个输出张量，即各类别得分
const OUTPUT_TENSORS_COUNT: usize = 1;

const DEFAULT_MODEL_PATH: &str = "model.onnx";
const DEFAULT_LABEL_PATH: &str = "labels.txt";

#[derive(Error, Debug)]
pub enum ModelLoadError {
  #[error("{0}")]
  Asset(#[from] AssetError),
  #[error("{0}")]
  Engine(#[from] EngineError),
}

#[derive(Error, Debug)]
pub enum ClassifierError {
  #[error("配置无效: {0}")]
  Config(#[from] ConfigError),
  #[error("模型加载错误: {path}, 错误: {source}")]
  ModelLoad {
    path: String,
    #[source]
    source: ModelLoadError,
  },
  #[error("标签加载错误: {path}, 错误: {source}")]
  LabelLoad {
    path: String,
    #[source]
    source: AssetError,
  },
  #[error("预期模型输出数量为 {expected}, 实际为 {actual}")]
  OutputCount { expected: usize, actual: usize },
  #[error("模型输出长度 {outputs} 与标签数量 {labels} 不一致")]
  ShapeMismatch { labels: usize, outputs: usize },
  #[error("预处理错误: {0}")]
  Preprocess(#[from] PreprocessError),
  #[error("推理错误: {0}")]
  Inference(#[from] EngineError),
  #[error("模型路径错误: {0}")]
  ModelPath(String),
}

impl ClassifierError {
  fn model_load(path: &str, source: impl Into<ModelLoadError>) -> Self {
    ClassifierError::ModelLoad {
      path: path.to_string(),
      source: source.into(),
    }
  }

  pub fn is_model_load(&self) -> bool {
    matches!(self, ClassifierError::ModelLoad { .. })
  }

  pub fn is_label_load(&self) -> bool {
    matches!(self, ClassifierError::LabelLoad { .. })
  }
}

/// 猫狗图像分类器。
///
/// 模型与标签在构造后只读；引擎本身支持并发推理，
/// 因此同一实例可以在多个线程间共享且无需加锁。
pub struct ImageClassifier<E> {
  engine: E,
  labels: LabelList,
  config: ClassifierConfig,
  model: ModelBytes,
}

impl<E: Engine> ImageClassifier<E> {
  pub fn load<A: AssetSource + ?Sized>(
    assets: &A,
    model_path: &str,
    label_path: &str,
    config: ClassifierConfig,
  ) -> Result<Self, ClassifierError> {
    config.validate()?;

    info!("加载模型文件: {}", model_path);
    let model = assets
      .open_model(model_path)
      .map_err(|e| ClassifierError::model_load(model_path, e))?;
    debug!(
      "模型文件大小: {:.2} MB",
      model.len() as f64 / (1024.0 * 1024.0)
    );

    info!(
      "创建推理引擎: 线程数 {}, 硬件加速 {}",
      config.num_threads, config.use_acceleration
    );
    let engine = E::load(&model, &config.engine_options())
      .map_err(|e| ClassifierError::model_load(model_path, e))?;

    info!("加载标签文件: {}", label_path);
    let labels = load_label_list(assets, label_path).map_err(|source| {
      ClassifierError::LabelLoad {
        path: label_path.to_string(),
        source,
      }
    })?;

    if let Some(outputs) = engine.output_len()
      && outputs != labels.len()
    {
      error!(
        "模型输出长度 {} 与标签数量 {} 不一致",
        outputs,
        labels.len()
      );
      return Err(ClassifierError::ShapeMismatch {
        labels: labels.len(),
        outputs,
      });
    }

    info!("模型加载完成, 共 {} 个标签", labels.len());
    Ok(ImageClassifier {
      engine,
      labels,
      config,
      model,
    })
  }

  /// 预处理、推理并返回排序后的结果；没有标签通过阈值时返回空列表
  pub fn classify(&self, bitmap: &Bitmap) -> Result<Vec<Recognition>, ClassifierError> {
    let input = to_input_tensor(bitmap, &self.config)?;
    debug!("输入张量: {:?}, {} 字节", input.shape(), input.byte_len());

    let outputs = self.engine.run(&input)?;
    let scores = self.single_output(outputs)?;
    debug!("模型输出: {:?}", scores);

    let result = rank(
      &scores,
      &self.labels,
      self.config.confidence_threshold,
      self.config.max_results,
    );
    debug!("分类结果: {:?}", result);
    Ok(result)
  }

  fn single_output(&self, mut outputs: Vec<Box<[f32]>>) -> Result<Box<[f32]>, ClassifierError> {
    if outputs.len() != OUTPUT_TENSORS_COUNT {
      error!(
        "预期模型输出数量为 {}, 实际为 {}",
        OUTPUT_TENSORS_COUNT,
        outputs.len()
      );
      return Err(ClassifierError::OutputCount {
        expected: OUTPUT_TENSORS_COUNT,
        actual: outputs.len(),
      });
    }

    let scores = outputs.swap_remove(0);
    if scores.len() != self.labels.len() {
      error!(
        "模型输出长度 {} 与标签数量 {} 不一致",
        scores.len(),
        self.labels.len()
      );
      return Err(ClassifierError::ShapeMismatch {
        labels: self.labels.len(),
        outputs: scores.len(),
      });
    }
    Ok(scores)
  }
}

impl<E> ImageClassifier<E> {
  pub fn labels(&self) -> &LabelList {
    &self.labels
  }

  pub fn config(&self) -> &ClassifierConfig {
    &self.config
  }

  pub fn model_bytes(&self) -> &[u8] {
    &self.model
  }
}

impl<E: Engine> Model for ImageClassifier<E> {
  type Input = Bitmap;
  type Output = Vec<Recognition>;
  type Error = ClassifierError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self.classify(input)
  }
}

/// 从 `classifier:///<资产目录>?model=..&labels=..&size=..` 形式的 URL 构造分类器
#[derive(Debug, Clone)]
pub struct ClassifierBuilder {
  asset_dir: PathBuf,
  model_path: String,
  label_path: String,
  config: ClassifierConfig,
}

impl FromUrlWithScheme for ClassifierBuilder {
  const SCHEME: &'static str = "classifier";
}

impl FromUrl for ClassifierBuilder {
  type Error = ClassifierError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ClassifierError::ModelPath(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    let asset_dir = url_file_path(url)
      .map_err(|e| ClassifierError::ModelPath(format!("资产目录路径无效: {}", e)))?;
    let mut builder = ClassifierBuilder {
      asset_dir,
      model_path: DEFAULT_MODEL_PATH.to_string(),
      label_path: DEFAULT_LABEL_PATH.to_string(),
      config: ClassifierConfig::default(),
    };

    for (key, value) in url.query_pairs() {
      match key.as_ref() {
        "model" => builder.model_path = value.into_owned(),
        "labels" => builder.label_path = value.into_owned(),
        "size" => builder.config.input_size = parse_query(&key, &value)?,
        "threads" => builder.config.num_threads = parse_query(&key, &value)?,
        "accel" => builder.config.use_acceleration = parse_query(&key, &value)?,
        "threshold" => builder.config.confidence_threshold = parse_query(&key, &value)?,
        "max" => builder.config.max_results = parse_query(&key, &value)?,
        "mean" => builder.config.image_mean = parse_query(&key, &value)?,
        "std" => builder.config.image_std = parse_query(&key, &value)?,
        other => debug!("忽略未知参数: {}", other),
      }
    }

    Ok(builder)
  }
}

fn parse_query<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ClassifierError> {
  value
    .parse()
    .map_err(|_| ClassifierError::ModelPath(format!("参数 {} 的值无效: {}", key, value)))
}

impl ClassifierBuilder {
  pub fn config(mut self, config: ClassifierConfig) -> Self {
    self.config = config;
    self
  }

  pub fn classifier_config(&self) -> &ClassifierConfig {
    &self.config
  }

  pub fn build<E: Engine>(self) -> Result<ImageClassifier<E>, ClassifierError> {
    let assets = AssetDir::new(&self.asset_dir);
    ImageClassifier::load(&assets, &self.model_path, &self.label_path, self.config)
  }
}
