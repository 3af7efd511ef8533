pub mod attachment;
pub mod catalog;
pub mod content;
pub mod translation;
pub mod user;

pub use attachment::Attachment;
pub use catalog::{CatalogEntry, Language, ProjectPlatformTranslation, SkillTranslation};
pub use content::{UserEducation, UserExperience, UserLanguage, UserPosition, UserProject, UserSkill};
pub use translation::{EducationTranslation, ExperienceTranslation, LanguageTranslation, ProjectTranslation};
pub use user::User;
