// =============================================================================
// VIEW PATHS
// =============================================================================
// Cached view paths invalidated by mutations. These mirror the pages the
// frontend renders from the list endpoints.

pub const VIEW_HOME: &str = "/";
pub const VIEW_SUBMISSIONS: &str = "/submissions";
pub const VIEW_ADMIN_SUBMISSIONS: &str = "/admin/submissions";
pub const VIEW_ADMIN_USERS: &str = "/admin/users";
pub const VIEW_ADMIN_CATEGORIES: &str = "/admin/categories";
