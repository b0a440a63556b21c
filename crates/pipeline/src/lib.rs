pub mod processor;

pub use processor::Pipeline;
