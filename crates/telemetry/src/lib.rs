mod trace;

pub use trace::{init, LogFormat, TraceExporter, TraceGuard, TraceInitError};
