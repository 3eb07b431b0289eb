//! Permission bits persisted with file records.
//!
//! Numeric values follow the host filesystem layer's convention so the
//! metadata schema can store them as plain integers.

pub const READ: i32 = 1;
pub const UPDATE: i32 = 2;
pub const CREATE: i32 = 4;
pub const DELETE: i32 = 8;
pub const SHARE: i32 = 16;
pub const ALL: i32 = READ | UPDATE | CREATE | DELETE | SHARE;
