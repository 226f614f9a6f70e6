pub mod advisor;
pub mod avl;
pub mod reporter;
pub mod shared;
