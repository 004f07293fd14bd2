use super::Stage;

/// A stage is interactive only while every stage before it reports zero
/// issues. Incomplete stages without issues do not block.
pub fn stage_enablement(stages: &[Stage]) -> Vec<bool> {
    let mut clear_so_far = true;
    stages
        .iter()
        .map(|stage| {
            let enabled = clear_so_far;
            clear_so_far &= !stage.is_blocking();
            enabled
        })
        .collect()
}
