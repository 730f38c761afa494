//! ---
//! ftb_section: "01-core-functionality"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Telemetry dispatch scheduler and control relay."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use ftb_link::{ActuatorCommand, DynamicsConsole};
use ftb_state::ControlCommand;

/// Converts inbound actuator commands and relays them to the dynamics
/// engine's console.
#[derive(Debug, Default, Clone, Copy)]
pub struct ControlRelay;

impl ControlRelay {
    pub fn new() -> Self {
        Self
    }

    /// Convert a link-protocol actuator command into the canonical record.
    pub fn accept_from_link(&self, command: &ActuatorCommand) -> ControlCommand {
        ControlCommand {
            aileron: command.aileron,
            elevator: command.elevator,
            rudder: command.rudder,
            throttle: command.throttle,
        }
    }

    /// Write the command to the dynamics-engine console.
    ///
    /// A failed write surfaces to the caller; the relay never drops a
    /// command silently and performs no retries.
    pub fn relay_to_dynamics(
        &self,
        command: &ControlCommand,
        console: &mut dyn DynamicsConsole,
    ) -> ftb_link::Result<()> {
        console.write_line(&format!("set fcs/aileron-cmd-norm {:.6}", command.aileron))?;
        console.write_line(&format!("set fcs/elevator-cmd-norm {:.6}", command.elevator))?;
        console.write_line(&format!("set fcs/rudder-cmd-norm {:.6}", command.rudder))?;
        console.write_line(&format!("set fcs/throttle-cmd-norm {:.6}", command.throttle))?;
        Ok(())
    }
}
