/// Every table the service reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Languages,
    Skills,
    Companies,
    Schools,
    ProjectPlatforms,
    SkillTranslations,
    ProjectPlatformTranslations,
    UserSkills,
    UserExperiences,
    UserExperienceTranslations,
    UserEducations,
    UserEducationTranslations,
    UserLanguages,
    UserLanguageTranslations,
    UserPositions,
    UserProjects,
    UserProjectTranslations,
    UserAttachments,
    UserProjectAttachments,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Languages => "languages",
            Table::Skills => "skills",
            Table::Companies => "companies",
            Table::Schools => "schools",
            Table::ProjectPlatforms => "project_platforms",
            Table::SkillTranslations => "skill_translations",
            Table::ProjectPlatformTranslations => "project_platform_translations",
            Table::UserSkills => "user_skills",
            Table::UserExperiences => "user_experiences",
            Table::UserExperienceTranslations => "user_experience_translations",
            Table::UserEducations => "user_educations",
            Table::UserEducationTranslations => "user_education_translations",
            Table::UserLanguages => "user_languages",
            Table::UserLanguageTranslations => "user_language_translations",
            Table::UserPositions => "user_positions",
            Table::UserProjects => "user_projects",
            Table::UserProjectTranslations => "user_project_translations",
            Table::UserAttachments => "user_attachments",
            Table::UserProjectAttachments => "user_project_attachments",
        }
    }

    /// Human readable entity name used in client messages.
    pub fn label(self) -> &'static str {
        match self {
            Table::Users => "User",
            Table::Languages => "Language",
            Table::Skills => "Skill",
            Table::Companies => "Company",
            Table::Schools => "School",
            Table::ProjectPlatforms => "Project platform",
            Table::SkillTranslations => "Skill translation",
            Table::ProjectPlatformTranslations => "Project platform translation",
            Table::UserSkills => "User skill",
            Table::UserExperiences => "User experience",
            Table::UserExperienceTranslations => "User experience translation",
            Table::UserEducations => "User education",
            Table::UserEducationTranslations => "User education translation",
            Table::UserLanguages => "User language",
            Table::UserLanguageTranslations => "User language translation",
            Table::UserPositions => "User position",
            Table::UserProjects => "User project",
            Table::UserProjectTranslations => "User project translation",
            Table::UserAttachments => "User attachment",
            Table::UserProjectAttachments => "User project attachment",
        }
    }

    /// Column sets declared UNIQUE in the schema.
    pub fn unique_keys(self) -> &'static [&'static [&'static str]] {
        match self {
            Table::Users => &[&["username"]],
            Table::Languages | Table::Skills | Table::Companies | Table::Schools | Table::ProjectPlatforms => {
                &[&["code"], &["name"]]
            }
            Table::SkillTranslations => &[&["skill_id", "language_id"]],
            Table::ProjectPlatformTranslations => &[&["project_platform_id", "language_id"]],
            Table::UserSkills => &[&["user_id", "skill_id"]],
            Table::UserExperiences => &[&["user_id", "company_id"]],
            Table::UserExperienceTranslations => &[&["user_experience_id", "language_id"]],
            Table::UserEducations => &[&["user_id", "school_id"]],
            Table::UserEducationTranslations => &[&["user_education_id", "language_id"]],
            Table::UserLanguages => &[&["user_id", "language_id"]],
            Table::UserLanguageTranslations => &[&["user_language_id", "language_id"]],
            Table::UserProjects => &[&["user_id", "slug"]],
            Table::UserProjectTranslations => &[&["user_project_id", "language_id"]],
            Table::UserPositions | Table::UserAttachments | Table::UserProjectAttachments => &[],
        }
    }

    /// Foreign key columns and the table they reference. All cascade on delete.
    pub fn references(self) -> &'static [(&'static str, Table)] {
        match self {
            Table::Users
            | Table::Languages
            | Table::Skills
            | Table::Companies
            | Table::Schools
            | Table::ProjectPlatforms => &[],
            Table::SkillTranslations => &[("skill_id", Table::Skills), ("language_id", Table::Languages)],
            Table::ProjectPlatformTranslations => &[
                ("project_platform_id", Table::ProjectPlatforms),
                ("language_id", Table::Languages),
            ],
            Table::UserSkills => &[("user_id", Table::Users), ("skill_id", Table::Skills)],
            Table::UserExperiences => &[("user_id", Table::Users), ("company_id", Table::Companies)],
            Table::UserExperienceTranslations => &[
                ("user_experience_id", Table::UserExperiences),
                ("language_id", Table::Languages),
            ],
            Table::UserEducations => &[("user_id", Table::Users), ("school_id", Table::Schools)],
            Table::UserEducationTranslations => &[
                ("user_education_id", Table::UserEducations),
                ("language_id", Table::Languages),
            ],
            Table::UserLanguages => &[("user_id", Table::Users), ("language_id", Table::Languages)],
            Table::UserLanguageTranslations => &[
                ("user_language_id", Table::UserLanguages),
                ("language_id", Table::Languages),
            ],
            Table::UserPositions => &[("user_id", Table::Users)],
            Table::UserProjects => &[("user_id", Table::Users), ("project_platform_id", Table::ProjectPlatforms)],
            Table::UserProjectTranslations => &[
                ("user_project_id", Table::UserProjects),
                ("language_id", Table::Languages),
            ],
            Table::UserAttachments => &[("user_id", Table::Users)],
            Table::UserProjectAttachments => &[("user_project_id", Table::UserProjects)],
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
