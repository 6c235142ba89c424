pub mod postgres_queue;
