pub mod app;
pub mod cli;
pub mod context;
pub mod flow;
pub mod routines;
