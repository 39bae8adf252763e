pub mod live;
pub mod logs;
