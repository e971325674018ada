//! Per-node compute resource hints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Optional demand a node places on the worker that evaluates it. `None`
/// fields mean "no particular requirement".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub num_cpus: Option<f64>,
    pub num_gpus: Option<f64>,
    pub memory_bytes: Option<u64>,
}

impl ResourceRequest {
    pub fn new(num_cpus: Option<f64>, num_gpus: Option<f64>, memory_bytes: Option<u64>) -> Self {
        Self {
            num_cpus,
            num_gpus,
            memory_bytes,
        }
    }

    pub fn with_cpus(mut self, n: f64) -> Self {
        self.num_cpus = Some(n);
        self
    }

    pub fn with_gpus(mut self, n: f64) -> Self {
        self.num_gpus = Some(n);
        self
    }

    pub fn with_memory_bytes(mut self, n: u64) -> Self {
        self.memory_bytes = Some(n);
        self
    }
}

impl fmt::Display for ResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ResourceRequest(num_cpus={:?}, num_gpus={:?}, memory_bytes={:?})",
            self.num_cpus, self.num_gpus, self.memory_bytes
        )
    }
}
