// 该文件是 Maogou （猫狗） 项目的一部分。
// src/model/rank.rs - 结果过滤与排序
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

use tracing::debug;

use crate::{asset::LabelList, model::Recognition};

/// 保留置信度不低于 `threshold` 的标签，按置信度降序取前 `max_results` 个。
///
/// 排序是稳定的：置信度相同的候选保持标签下标升序，截断边界上的并列也按此规则取舍。
/// NaN 永远不会通过阈值。调用方需保证 `scores.len() == labels.len()`。
pub fn rank(
  scores: &[f32],
  labels: &LabelList,
  threshold: f32,
  max_results: usize,
) -> Vec<Recognition> {
  debug_assert_eq!(scores.len(), labels.len());

  let mut candidates: Vec<(usize, f32)> = scores
    .iter()
    .copied()
    .enumerate()
    .filter(|&(_, confidence)| confidence >= threshold)
    .collect();
  debug!("{} 个候选通过阈值 {}", candidates.len(), threshold);

  candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
  candidates.truncate(max_results);

  candidates
    .into_iter()
    .filter_map(|(index, confidence)| {
      labels.get(index).map(|title| Recognition {
        id: index.to_string(),
        title: title.to_string(),
        confidence,
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cat_dog() -> LabelList {
    ["cat", "dog"].into_iter().collect()
  }

  fn recognition(id: &str, title: &str, confidence: f32) -> Recognition {
    Recognition {
      id: id.to_string(),
      title: title.to_string(),
      confidence,
    }
  }

  #[test]
  fn single_label_above_threshold() {
    let result = rank(&[0.9, 0.2], &cat_dog(), 0.4, 3);
    assert_eq!(result, [recognition("0", "cat", 0.9)]);
  }

  #[test]
  fn sorted_by_confidence_descending() {
    let result = rank(&[0.5, 0.6], &cat_dog(), 0.4, 3);
    assert_eq!(
      result,
      [recognition("1", "dog", 0.6), recognition("0", "cat", 0.5)]
    );
  }

  #[test]
  fn nothing_above_threshold_is_empty() {
    assert!(rank(&[0.1, 0.2], &cat_dog(), 0.4, 3).is_empty());
  }

  #[test]
  fn threshold_is_inclusive() {
    let result = rank(&[0.4, 0.39], &cat_dog(), 0.4, 3);
    assert_eq!(result, [recognition("0", "cat", 0.4)]);
  }

  #[test]
  fn truncated_to_max_results() {
    let labels: LabelList = ["a", "b", "c", "d", "e"].into_iter().collect();
    let result = rank(&[0.5, 0.9, 0.7, 0.8, 0.6], &labels, 0.4, 3);
    let ids: Vec<&str> = result.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["1", "3", "2"]);
  }

  #[test]
  fn ties_keep_ascending_label_index() {
    let labels: LabelList = ["a", "b", "c", "d"].into_iter().collect();
    let result = rank(&[0.5, 0.7, 0.5, 0.5], &labels, 0.4, 3);
    let ids: Vec<&str> = result.iter().map(|r| r.id.as_str()).collect();
    // 下标 3 与 0、2 并列，但在截断边界之外
    assert_eq!(ids, ["1", "0", "2"]);
  }

  #[test]
  fn nan_scores_never_pass() {
    let result = rank(&[f32::NAN, 0.8], &cat_dog(), 0.4, 3);
    assert_eq!(result, [recognition("1", "dog", 0.8)]);
  }

  #[test]
  fn filtered_output_is_sorted_and_bounded() {
    let labels: LabelList = (0..32).map(|i| format!("label-{i}")).collect();
    let scores: Vec<f32> = (0..32).map(|i| ((i * 37) % 32) as f32 / 31.0).collect();
    for threshold in [0.0, 0.25, 0.4, 0.9, 1.0] {
      let result = rank(&scores, &labels, threshold, 3);
      assert!(result.len() <= 3);
      assert!(result.iter().all(|r| r.confidence >= threshold));
      assert!(
        result
          .windows(2)
          .all(|pair| pair[0].confidence >= pair[1].confidence)
      );
    }
  }

  #[test]
  fn displays_title_and_confidence() {
    assert_eq!(
      recognition("0", "cat", 0.9).to_string(),
      "Title = cat, Confidence = 0.9"
    );
  }
}
