pub mod invoker;
pub mod plan;
pub mod runner;
pub mod stop;
