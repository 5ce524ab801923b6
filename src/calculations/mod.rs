pub mod backward_pass;
pub mod float_analysis;
pub mod forward_pass;

use chrono::NaiveDate;

use crate::calendar::{add_business_days, subtract_business_days};
use crate::task::DependencyType;

/// Earliest start a successor may take given one predecessor edge. Shared by
/// the forward pass and the incremental propagation engine so the two can
/// never drift apart. For finish-anchored types (FF/SF) the successor's own
/// duration is needed to work back from the constrained finish.
pub(crate) fn dependency_start_candidate(
    pred_start: NaiveDate,
    pred_finish: NaiveDate,
    dependency_type: DependencyType,
    lag_days: i64,
    successor_duration: i64,
) -> NaiveDate {
    match dependency_type {
        DependencyType::FinishToStart => add_business_days(pred_finish, 1 + lag_days),
        DependencyType::StartToStart => add_business_days(pred_start, lag_days),
        DependencyType::FinishToFinish => add_business_days(
            subtract_business_days(pred_finish, successor_duration - 1),
            lag_days,
        ),
        DependencyType::StartToFinish => add_business_days(
            subtract_business_days(pred_start, successor_duration - 1),
            lag_days,
        ),
    }
}
