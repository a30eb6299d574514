pub mod health;
pub mod refresh;
pub mod search;
