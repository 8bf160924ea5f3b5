use std::collections::HashMap;

/// Client-level configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Raise remote faults and transport failures as errors. When false,
    /// every invocation returns a `(status, detail)` pair instead.
    pub raise_faults: bool,
    /// Proxy URL per endpoint URL scheme, e.g. `"http" -> "http://proxy:3128"`.
    pub proxies: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            raise_faults: true,
            proxies: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// The fault policy derived from `raise_faults`.
    #[must_use]
    pub fn fault_policy(&self) -> FaultPolicy {
        if self.raise_faults {
            FaultPolicy::Raise
        } else {
            FaultPolicy::Return
        }
    }
}

/// How the call boundary surfaces faults and transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Unwrap the payload or raise the error.
    Raise,
    /// Always return the `(status, detail)` pair.
    Return,
}
