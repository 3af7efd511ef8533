// Published portfolio reads, addressed by username.

pub mod education; // GET /api/v1/public/user/:username/education
pub mod experience; // GET /api/v1/public/user/:username/experience
pub mod profile; // GET /api/v1/public/user/:username
pub mod project; // GET /api/v1/public/user/:username/project
pub mod project_detail; // GET /api/v1/public/user/:username/project/:slug
pub mod skill; // GET /api/v1/public/user/:username/skill

pub use education::educations;
pub use experience::experiences;
pub use profile::profile;
pub use project::projects;
pub use project_detail::project_detail;
pub use skill::skills;
