/// Display-only stages shown while a design request is in flight. They do
/// not reflect anything the server reports.
pub const PROCESSING_PHASES: [&str; 6] = [
    "Image Upload",
    "Image Preprocessing",
    "Depth Map Generation",
    "AI Design Generation",
    "Image Enhancement",
    "Ready for Download",
];

#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    step: usize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next phase, stopping short of the final one.
    pub fn advance(&mut self) {
        if self.step + 2 < PROCESSING_PHASES.len() {
            self.step += 1;
        }
    }

    pub fn complete(&mut self) {
        self.step = PROCESSING_PHASES.len() - 1;
    }

    pub fn is_complete(&self) -> bool {
        self.step == PROCESSING_PHASES.len() - 1
    }

    pub fn current_phase(&self) -> &'static str {
        PROCESSING_PHASES[self.step]
    }

    pub fn percent(&self) -> u8 {
        ((self.step * 100) / (PROCESSING_PHASES.len() - 1)) as u8
    }
}
