// Storage adapters that live alongside the pipeline

pub mod in_memory;

pub use in_memory::InMemoryStore;
