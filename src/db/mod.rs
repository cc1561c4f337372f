pub mod pool;
pub mod wallet;

pub use pool::create_pool;
