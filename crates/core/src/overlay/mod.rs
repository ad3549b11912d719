pub mod debounce;
pub mod domain;
pub mod renderer;
