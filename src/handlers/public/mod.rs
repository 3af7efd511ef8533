pub mod auth;
pub mod user;

// Re-export handler functions for use in routing
pub use auth::{login, logout, register};

pub use user::educations as user_educations;
pub use user::experiences as user_experiences;
pub use user::profile as user_profile;
pub use user::project_detail as user_project_detail;
pub use user::projects as user_projects;
pub use user::skills as user_skills;
