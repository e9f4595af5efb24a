pub mod grid;
pub mod edges;
pub mod forest;
pub mod driver;
pub mod recolor;
