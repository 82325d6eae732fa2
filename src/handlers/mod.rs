pub mod compositor;
pub mod inline;
pub mod remover;
pub mod resize;
