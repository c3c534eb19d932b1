pub mod aggregator;
pub mod camera;
pub mod config;
pub mod film;
pub mod geometry;
pub mod light;
pub mod material;
pub mod scene;
pub mod shading;
pub mod spectrum;
pub mod threading;
pub mod threadpool;
pub mod transform;
