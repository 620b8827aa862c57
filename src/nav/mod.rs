pub mod route;
pub mod sidebar;
