pub mod cli;
pub mod config;
pub mod dap;
pub mod debugger;
pub mod logging;
