//! `SeaORM` entities.

pub mod uploads;
pub mod users;
