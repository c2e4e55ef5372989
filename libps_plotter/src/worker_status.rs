#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    pub progress: f32,
    pub run_number: i32,
}

impl WorkerStatus {
    pub fn new(progress: f32, run_number: i32) -> Self {
        Self {
            progress,
            run_number,
        }
    }
}
