pub mod constraint;
pub mod delete;
pub mod entity;
pub mod graph;
pub mod session;

pub fn version() -> &'static str {
    "0.1.0"
}
