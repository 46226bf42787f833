use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    #[error("Core list unavailable on this platform")]
    NoCores,
    #[error("Core {core} out of range ({available} available)")]
    OutOfRange { core: usize, available: usize },
    #[error("OS rejected affinity for core {0}")]
    Rejected(usize),
}

pub struct RuntimeConfig;

impl RuntimeConfig {
    /// Number of logical cores the affinity API can address.
    pub fn core_count() -> usize {
        core_affinity::get_core_ids().map(|ids| ids.len()).unwrap_or(0)
    }

    /// Pin current thread to a specific core ID, so every CPUID that follows
    /// runs on the same logical core.
    pub fn pin_thread(core_id: usize) -> Result<(), PinError> {
        let ids = core_affinity::get_core_ids().ok_or(PinError::NoCores)?;
        if ids.is_empty() {
            return Err(PinError::NoCores);
        }
        let id = *ids.get(core_id).ok_or(PinError::OutOfRange {
            core: core_id,
            available: ids.len(),
        })?;

        if core_affinity::set_for_current(id) {
            tracing::debug!(core = core_id, "pinned probing thread");
            Ok(())
        } else {
            tracing::warn!(core = core_id, "failed to pin probing thread");
            Err(PinError::Rejected(core_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_out_of_range() {
        let count = RuntimeConfig::core_count();
        match RuntimeConfig::pin_thread(count + 1000) {
            Err(PinError::OutOfRange { core, available }) => {
                assert_eq!(core, count + 1000);
                assert_eq!(available, count);
            }
            Err(PinError::NoCores) => println!("Skipping (no core list on this platform)"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_pin_first_core() {
        if RuntimeConfig::core_count() == 0 {
            println!("Skipping (no core list on this platform)");
            return;
        }
        // Run on a scratch thread so the test harness thread keeps its affinity.
        let result = std::thread::spawn(|| RuntimeConfig::pin_thread(0)).join().unwrap();
        assert!(matches!(result, Ok(()) | Err(PinError::Rejected(0))));
    }
}
