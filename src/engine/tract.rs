// 该文件是 Maogou （猫狗） 项目的一部分。
// src/engine/tract.rs - tract ONNX 推理后端
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

use tracing::{debug, info, warn};
use tract_onnx::prelude::*;

use crate::{
  engine::{Engine, EngineError, EngineOptions},
  frame::{InputTensor, RGB_CHANNELS},
};

type TractPlan = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

pub struct TractEngine {
  plan: TractPlan,
  input_shape: [usize; 4],
  output_len: Option<usize>,
}

impl Engine for TractEngine {
  fn load(model: &[u8], options: &EngineOptions) -> Result<Self, EngineError> {
    let side = options.input_size as usize;
    let input_shape = [1, side, side, RGB_CHANNELS];

    if options.use_acceleration {
      warn!("tract 后端没有可用的硬件加速，回退到 CPU 执行");
    }
    debug!(
      "tract 后端在调用线程上执行，线程数提示: {}",
      options.num_threads
    );

    info!("解析 ONNX 模型: {} 字节", model.len());
    let mut reader = model;
    let plan = tract_onnx::onnx()
      .model_for_read(&mut reader)?
      .with_input_fact(0, f32::fact(input_shape).into())?
      .into_optimized()?
      .into_runnable()?;

    let num_outputs = plan.model().outputs.len();
    if num_outputs == 0 {
      return Err(EngineError::ModelInvalid("模型没有输出".to_string()));
    }
    debug!("模型输出数量: {}", num_outputs);

    let output_len = plan
      .model()
      .output_fact(0)?
      .shape
      .as_concrete()
      .map(|dims| dims.iter().product::<usize>());
    debug!("模型输出长度: {:?}", output_len);

    Ok(TractEngine {
      plan,
      input_shape,
      output_len,
    })
  }

  fn output_len(&self) -> Option<usize> {
    self.output_len
  }

  fn run(&self, input: &InputTensor) -> Result<Vec<Box<[f32]>>, EngineError> {
    if input.shape() != self.input_shape {
      return Err(EngineError::InputShape {
        expected: self.input_shape,
        actual: input.shape(),
      });
    }

    let tensor = Tensor::from_shape(&input.shape(), input.as_slice())?;
    let outputs = self.plan.run(tvec!(tensor.into()))?;

    outputs
      .iter()
      .map(|value| -> Result<Box<[f32]>, EngineError> { Ok(value.as_slice::<f32>()?.into()) })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    ClassifierConfig, ImageClassifier, Recognition, asset::MemoryAssets, frame::Bitmap,
    model::ClassifierError,
  };
  use prost::Message;
  use tract_onnx::pb::{
    GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorShapeProto, TypeProto,
    ValueInfoProto, tensor_proto::DataType, tensor_shape_proto, type_proto,
  };

  fn float_value(name: &str, dims: &[i64]) -> ValueInfoProto {
    let dim = dims
      .iter()
      .map(|&d| tensor_shape_proto::Dimension {
        value: Some(tensor_shape_proto::dimension::Value::DimValue(d)),
        ..Default::default()
      })
      .collect();
    ValueInfoProto {
      name: name.to_string(),
      r#type: Some(TypeProto {
        value: Some(type_proto::Value::TensorType(type_proto::Tensor {
          elem_type: DataType::Float as i32,
          shape: Some(TensorShapeProto { dim }),
        })),
        ..Default::default()
      }),
      ..Default::default()
    }
  }

  /// 单个 Flatten 节点：[1,s,s,3] 的 NHWC 输入原样展开为 s*s*3 个得分
  fn flatten_model(side: i64) -> Vec<u8> {
    let node = NodeProto {
      input: vec!["x".to_string()],
      output: vec!["y".to_string()],
      op_type: "Flatten".to_string(),
      ..Default::default()
    };
    let graph = GraphProto {
      name: "flatten".to_string(),
      node: vec![node],
      input: vec![float_value("x", &[1, side, side, 3])],
      output: vec![float_value("y", &[1, side * side * 3])],
      ..Default::default()
    };
    ModelProto {
      ir_version: 7,
      opset_import: vec![OperatorSetIdProto {
        domain: String::new(),
        version: 13,
      }],
      graph: Some(graph),
      ..Default::default()
    }
    .encode_to_vec()
  }

  fn options(input_size: u32) -> EngineOptions {
    EngineOptions {
      input_size,
      num_threads: 1,
      use_acceleration: false,
    }
  }

  fn config(input_size: u32) -> ClassifierConfig {
    ClassifierConfig {
      use_acceleration: false,
      ..ClassifierConfig::with_input_size(input_size)
    }
  }

  #[test]
  fn garbage_bytes_are_rejected() {
    assert!(TractEngine::load(b"definitely not onnx", &options(4)).is_err());
  }

  #[test]
  fn output_length_comes_from_the_optimized_plan() {
    let engine = TractEngine::load(&flatten_model(2), &options(2)).unwrap();
    assert_eq!(engine.output_len(), Some(12));
  }

  #[test]
  fn classifies_through_an_onnx_graph() {
    let assets = MemoryAssets::new()
      .with("model.onnx", flatten_model(1))
      .with("labels.txt", "r\ng\nb\n");
    let classifier =
      ImageClassifier::<TractEngine>::load(&assets, "model.onnx", "labels.txt", config(1))
        .unwrap();

    // R=255, G=128, B=0；NHWC 布局下得分依次为 R、G、B 通道
    let bitmap = Bitmap::from_argb(3, 2, &[0xFFFF_8000u32; 6]).unwrap();
    let result = classifier.classify(&bitmap).unwrap();
    assert_eq!(
      result,
      [
        Recognition {
          id: "0".to_string(),
          title: "r".to_string(),
          confidence: 1.0,
        },
        Recognition {
          id: "1".to_string(),
          title: "g".to_string(),
          confidence: 128.0 / 255.0,
        },
      ]
    );
  }

  #[test]
  fn label_count_is_checked_against_the_graph_at_load() {
    let assets = MemoryAssets::new()
      .with("model.onnx", flatten_model(2))
      .with("labels.txt", "cat\ndog\n");
    let err =
      ImageClassifier::<TractEngine>::load(&assets, "model.onnx", "labels.txt", config(2))
        .err()
        .unwrap();
    assert!(matches!(
      err,
      ClassifierError::ShapeMismatch {
        labels: 2,
        outputs: 12
      }
    ));
  }

  #[test]
  fn input_of_another_size_is_rejected() {
    let engine = TractEngine::load(&flatten_model(1), &options(1)).unwrap();
    let input = InputTensor::new(2, vec![0.0; 12].into_boxed_slice());
    assert!(matches!(
      engine.run(&input),
      Err(EngineError::InputShape {
        expected: [1, 1, 1, 3],
        actual: [1, 2, 2, 3]
      })
    ));
  }
}
