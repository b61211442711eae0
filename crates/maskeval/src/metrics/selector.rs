//! Validity selection
//!
//! Regroups a prediction/target grid by task or by item, keeping only cells
//! whose target is present.

use crate::error::{EvalError, EvalResult};
use crate::types::{Axis, Prediction, Target};

/// Valid-only prediction/target sequences, one pair per group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidGroups {
    pub preds: Vec<Vec<Prediction>>,
    pub targets: Vec<Vec<f64>>,
}

impl ValidGroups {
    fn with_groups(count: usize) -> Self {
        Self {
            preds: vec![Vec::new(); count],
            targets: vec![Vec::new(); count],
        }
    }

    /// Number of groups (tasks or items, depending on the axis)
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Predictions and targets of one group
    pub fn group(&self, index: usize) -> (&[Prediction], &[f64]) {
        (&self.preds[index], &self.targets[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[Prediction], &[f64])> {
        self.preds
            .iter()
            .zip(self.targets.iter())
            .map(|(p, t)| (p.as_slice(), t.as_slice()))
    }
}

/// Check that both grids have the same item count and `num_tasks` cells per item
pub fn check_shape(
    preds: &[Vec<Prediction>],
    targets: &[Vec<Target>],
    num_tasks: usize,
) -> EvalResult<()> {
    if preds.len() != targets.len() {
        return Err(EvalError::shape(
            format!(
                "prediction grid has {} items but target grid has {}",
                preds.len(),
                targets.len()
            ),
            preds.len(),
            targets.len(),
        ));
    }

    for (item, (pred_row, target_row)) in preds.iter().zip(targets.iter()).enumerate() {
        if pred_row.len() != num_tasks {
            return Err(EvalError::shape(
                format!(
                    "prediction row {} has {} tasks, expected {}",
                    item,
                    pred_row.len(),
                    num_tasks
                ),
                num_tasks,
                pred_row.len(),
            ));
        }
        if target_row.len() != num_tasks {
            return Err(EvalError::shape(
                format!(
                    "target row {} has {} tasks, expected {}",
                    item,
                    target_row.len(),
                    num_tasks
                ),
                num_tasks,
                target_row.len(),
            ));
        }
    }

    Ok(())
}

/// Split the grid into valid-only groups along `axis`
///
/// With [`Axis::Task`] there are `num_tasks` groups, each in item order. With
/// [`Axis::Row`] there is one group per item, each in task order. Cells whose
/// target is absent appear in no group.
pub fn select_valid(
    preds: &[Vec<Prediction>],
    targets: &[Vec<Target>],
    num_tasks: usize,
    axis: Axis,
) -> EvalResult<ValidGroups> {
    check_shape(preds, targets, num_tasks)?;

    let group_count = match axis {
        Axis::Task => num_tasks,
        Axis::Row => preds.len(),
    };
    let mut groups = ValidGroups::with_groups(group_count);

    for (item, (pred_row, target_row)) in preds.iter().zip(targets.iter()).enumerate() {
        for (task, (pred, target)) in pred_row.iter().zip(target_row.iter()).enumerate() {
            let Some(value) = target.value() else {
                continue;
            };
            let index = match axis {
                Axis::Task => task,
                Axis::Row => item,
            };
            groups.preds[index].push(pred.clone());
            groups.targets[index].push(value);
        }
    }

    Ok(groups)
}
