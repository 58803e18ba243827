use sysinfo::System;

/// 同時編碼多個檔案時，以整體 CPU 使用率決定是否再啟動新的工作
pub struct CpuGate {
    system: System,
    usage_threshold: f32,
}

impl CpuGate {
    #[must_use]
    pub fn new(usage_threshold: f32) -> Self {
        let mut system = System::new();
        // 第一次取樣只建立基準值
        system.refresh_cpu_usage();
        Self {
            system,
            usage_threshold,
        }
    }

    pub fn current_usage(&mut self) -> f32 {
        self.system.refresh_cpu_usage();
        self.system.global_cpu_usage()
    }

    /// 沒有執行中的工作時一律允許
    pub fn allows_new_job(&mut self, running: usize, max_parallel: usize) -> bool {
        if running >= max_parallel.max(1) {
            return false;
        }
        running == 0 || self.current_usage() < self.usage_threshold
    }
}
