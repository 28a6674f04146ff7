pub mod tmd;
