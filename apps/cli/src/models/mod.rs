pub mod resume;

pub use resume::{
    format_date, Certification, Education, Experience, Language, Personal, PhotoShape, Project,
    Resume, SkillCategory,
};
