pub mod cameras;
pub mod capture;
pub mod color;
pub mod compositor;
pub mod export;
pub mod filters;
pub mod pattern;
pub mod session;
pub mod slots;
pub mod text;
