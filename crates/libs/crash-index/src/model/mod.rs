pub mod health;
pub mod sweep;
