mod gate;

pub use gate::{
    ConfigChange, ConfigChangeOutcome, MAINTENANCE_KEY, MaintenanceGate, MaintenanceState,
    spawn_config_observer,
};
