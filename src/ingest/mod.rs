/// Sensor data ingestion.
///
/// `serial` owns the transport (one exclusive port for the process
/// lifetime); `frame` turns its raw lines into validated channel values.

pub mod frame;
pub mod serial;
