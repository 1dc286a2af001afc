//! Host Device Identification
//!
//! Linux reads the CPU model from /proc/cpuinfo; other platforms degrade to
//! "unknown".

use peakbench_core::{DeviceInfo, UNKNOWN};

/// Identify the host CPU as a compute device
pub(crate) fn identify(threads: usize) -> DeviceInfo {
    DeviceInfo {
        platform_name: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        library_version: env!("CARGO_PKG_VERSION").to_string(),
        device_name: cpu_model().unwrap_or_else(|| UNKNOWN.to_string()),
        api_version: format!("rayon {} threads", threads),
        driver_version: "n/a".to_string(),
    }
}

fn cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| parse_cpu_model(&content))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// First non-empty "model name" (x86) or "Hardware"/"Model" (arm) value
fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    ["model name", "Hardware", "Model"].iter().find_map(|key| {
        cpuinfo
            .lines()
            .filter(|l| l.starts_with(key))
            .filter_map(|l| l.split_once(':'))
            .map(|(_, v)| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    })
}
