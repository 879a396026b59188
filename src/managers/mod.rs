// linkmark stores
// Managers own the SQL for one table each and enforce per-user ownership.

pub mod bookmark_manager;
pub mod category_manager;
