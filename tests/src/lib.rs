//! End-to-end checks of a scan run against real `sh` subprocesses.

mod dispatch;
mod pipeline;
