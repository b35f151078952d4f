/// Aggregated view of test progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub time_remaining_secs: u32,
    pub is_complete: bool,
}
