pub mod index;
pub mod widget;
