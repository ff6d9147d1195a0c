pub mod bulk_replace;
