//! System snapshot for the status endpoint
//!
//! Captures accumulate with no eviction policy, so disk headroom under the
//! picture tree is the number an operator actually watches.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sysinfo::{Disks, System};

/// System snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSnapshot {
    /// Hostname
    pub hostname: String,

    /// System uptime in seconds
    pub uptime_secs: u64,

    /// Memory usage in bytes
    pub memory_used: u64,

    /// Total memory in bytes
    pub memory_total: u64,

    /// Usage of the disk holding the picture tree
    pub disk: DiskSnapshot,
}

/// Usage of one mounted disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskSnapshot {
    pub mount_point: String,
    pub used: u64,
    pub total: u64,
    pub used_percent: f32,
}

/// Collect a system snapshot, pinning disk usage to the disk that holds
/// `pictures_root`.
pub fn collect_snapshot(pictures_root: &Path) -> SystemSnapshot {
    let mut sys = System::new();
    sys.refresh_memory();

    SystemSnapshot {
        hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
        uptime_secs: System::uptime(),
        memory_used: sys.used_memory(),
        memory_total: sys.total_memory(),
        disk: disk_for(pictures_root),
    }
}

/// The mounted disk with the longest mount-point prefix of `path`.
fn disk_for(path: &Path) -> DiskSnapshot {
    let disks = Disks::new_with_refreshed_list();
    let best = disks
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len());

    match best {
        Some(disk) => {
            let total = disk.total_space();
            let used = total - disk.available_space();
            DiskSnapshot {
                mount_point: disk.mount_point().display().to_string(),
                used,
                total,
                used_percent: if total > 0 {
                    (used as f32 / total as f32) * 100.0
                } else {
                    0.0
                },
            }
        }
        None => DiskSnapshot {
            mount_point: "unknown".to_string(),
            used: 0,
            total: 0,
            used_percent: 0.0,
        },
    }
}
