pub mod bulk_replace;
pub mod health;
