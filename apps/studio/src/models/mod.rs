pub mod resume;
pub mod template;

pub use resume::{
    DocumentError, EducationEntry, EducationField, ExperienceEntry, ExperienceField,
    PersonalField, PersonalInfo, ResumeDocument,
};
pub use template::{
    find_template, lookup_template, template_catalog, LayoutFamily, TemplateDescriptor, TemplateId,
};
