use serde::{Deserialize, Serialize};

const GB: u64 = 1024 * 1024 * 1024;

/// Resource tier definition as the farm stores it.
/// Cores are in hundredths (100 = one core), memory in bytes, timeouts in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub name: String,
    pub threadable: bool,
    pub min_cores: u32,
    /// Zero means unlimited.
    pub max_cores: u32,
    pub min_memory: u64,
    pub min_gpu_memory: u64,
    pub min_gpus: u32,
    pub max_gpus: u32,
    pub min_memory_increase: u64,
    pub timeout: u32,
    pub timeout_llu: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ServiceDefinition {
    fn cpu(name: &str, threadable: bool, min_cores: u32, max_cores: u32, min_memory: u64) -> Self {
        Self {
            name: name.to_owned(),
            threadable,
            min_cores,
            max_cores,
            min_memory,
            min_gpu_memory: 0,
            min_gpus: 0,
            max_gpus: 0,
            min_memory_increase: 2 * 1024 * 1024,
            timeout: 0,
            timeout_llu: 0,
            tags: Vec::new(),
        }
    }

    /// Generic shell tier for utility and test jobs.
    pub fn shell() -> Self {
        let mut service = Self::cpu("shell", true, 100, 0, GB);
        service.min_memory_increase = GB;
        service.tags = vec!["shell".into(), "utility".into()];
        service
    }

    pub fn maya2026() -> Self {
        let mut service = Self::cpu("maya2026", true, 200, 800, 8 * GB);
        service.tags = vec!["maya".into(), "maya2026".into(), "dcc".into()];
        service
    }

    pub fn arnold() -> Self {
        let mut service = Self::cpu("arnold", false, 400, 1600, 16 * GB);
        service.timeout = 3600;
        service.timeout_llu = 1800;
        service.tags = vec!["arnold".into(), "renderer".into(), "cpu".into()];
        service
    }

    pub fn cores_range(&self) -> (f32, f32) {
        (self.min_cores as f32 / 100.0, self.max_cores as f32 / 100.0)
    }

    pub fn min_memory_gb(&self) -> u64 {
        self.min_memory / GB
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub name: String,
}

/// Render node registered with the farm. Same units as [`ServiceDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRecord {
    pub name: String,
    pub cores_total: u32,
    pub memory: u64,
    pub state: String,
}

impl HostRecord {
    pub fn cores(&self) -> f32 {
        self.cores_total as f32 / 100.0
    }

    pub fn memory_gb(&self) -> f64 {
        self.memory as f64 / GB as f64
    }
}
