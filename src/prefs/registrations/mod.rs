//! Registration of every preference the robot declares

pub mod drive_manually;
pub mod drive_straight;

use super::PreferencesRegistry;

/// Register all preferences from all modules
///
/// Entries that fail to register are logged and skipped. Returns how many
/// were registered.
pub fn register_all(registry: &PreferencesRegistry) -> usize {
    let registered = registry.discover(
        drive_straight::definitions()
            .into_iter()
            .chain(drive_manually::definitions()),
    );
    log::debug!("Registered {} robot preferences", registered);
    registered
}
