pub mod activity;
pub mod seed;
pub mod teacher;
