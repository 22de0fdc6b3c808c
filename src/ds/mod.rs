pub mod byte_queue;

pub use byte_queue::ByteQueue;
