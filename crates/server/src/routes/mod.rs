pub mod health;
pub mod notation;
