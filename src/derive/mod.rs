pub mod speed;
