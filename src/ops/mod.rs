pub mod render;
pub mod scripting;
pub mod shapes;
