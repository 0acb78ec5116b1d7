pub mod agents;
pub mod env;
pub mod error;
pub mod games;
pub mod process;

#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;
