//! Short-range radio wake support
//!
//! Some cameras keep WiFi down until poked over Bluetooth LE. The
//! `WakeRadio` trait keeps that step an explicit, optional capability: the
//! protocol asks, ignores the answer, and hosts without BLE hardware
//! simply run without a radio. The real implementation sits behind the
//! `ble` cargo feature.

use async_trait::async_trait;

use crate::errors::CamError;

/// GATT characteristic that toggles the camera's WiFi access point.
pub const AP_CONTROL_CHARACTERISTIC: &str = "d44bc439-abfd-45a2-b575-925416129600";

/// Value written to the characteristic to enable the access point.
pub const AP_ENABLE: u8 = 0x03;

#[async_trait]
pub trait WakeRadio: Send + Sync {
    /// Ask the device at `address` to bring up its network interface.
    async fn enable_networking(&self, address: &str) -> Result<(), CamError>;
}

/// The radio available on this build, if any.
#[cfg(feature = "ble")]
pub fn default_radio() -> Option<std::sync::Arc<dyn WakeRadio>> {
    Some(std::sync::Arc::new(BleRadio::default()))
}

/// The radio available on this build, if any.
#[cfg(not(feature = "ble"))]
pub fn default_radio() -> Option<std::sync::Arc<dyn WakeRadio>> {
    None
}

#[cfg(feature = "ble")]
pub use self::radio::BleRadio;

#[cfg(feature = "ble")]
mod radio {
    use std::time::Duration;

    use async_trait::async_trait;
    use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter, WriteType};
    use btleplug::platform::Manager;
    use tracing::debug;

    use super::{WakeRadio, AP_CONTROL_CHARACTERISTIC, AP_ENABLE};
    use crate::errors::CamError;

    /// BLE wake via the first local adapter.
    pub struct BleRadio {
        /// How long to scan before matching advertised addresses.
        pub scan_window: Duration,
    }

    impl Default for BleRadio {
        fn default() -> Self {
            Self {
                scan_window: Duration::from_secs(5),
            }
        }
    }

    fn hw(e: impl std::fmt::Display) -> CamError {
        CamError::HardwareError(e.to_string())
    }

    #[async_trait]
    impl WakeRadio for BleRadio {
        async fn enable_networking(&self, address: &str) -> Result<(), CamError> {
            let target: uuid::Uuid = AP_CONTROL_CHARACTERISTIC.parse().map_err(hw)?;

            let manager = Manager::new().await.map_err(hw)?;
            let adapter = manager
                .adapters()
                .await
                .map_err(hw)?
                .into_iter()
                .next()
                .ok_or_else(|| CamError::HardwareError("no bluetooth adapter".to_string()))?;

            adapter.start_scan(ScanFilter::default()).await.map_err(hw)?;
            tokio::time::sleep(self.scan_window).await;
            let peripherals = adapter.peripherals().await.map_err(hw)?;
            let _ = adapter.stop_scan().await;

            let peripheral = peripherals
                .into_iter()
                .find(|p| p.address().to_string().eq_ignore_ascii_case(address))
                .ok_or_else(|| {
                    CamError::HardwareError(format!("{} not seen during scan", address))
                })?;

            peripheral.connect().await.map_err(hw)?;
            peripheral.discover_services().await.map_err(hw)?;

            let characteristic = peripheral
                .characteristics()
                .into_iter()
                .find(|c| c.uuid == target)
                .ok_or_else(|| {
                    CamError::HardwareError("AP control characteristic not found".to_string())
                })?;

            peripheral
                .write(&characteristic, &[AP_ENABLE], WriteType::WithResponse)
                .await
                .map_err(hw)?;
            debug!("wifi enable written to {}", address);

            let _ = peripheral.disconnect().await;
            Ok(())
        }
    }
}
