pub mod controller;
pub mod notice;
pub mod stats;
pub mod task_ops;
pub mod view;
