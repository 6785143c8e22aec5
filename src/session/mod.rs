// Session Supervisor: liveness, reconnect grace and forfeits
pub use supervisor::SessionSupervisor;

mod supervisor;
