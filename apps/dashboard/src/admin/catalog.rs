//! Static page descriptions for every administrative list.

use crate::resources::{Column, FieldKind, FormField, ResourceConfig};

use FieldKind::*;

pub static ADMINS: ResourceConfig = ResourceConfig {
    key: "admins",
    title: "Admin",
    endpoint: "/admin/admins",
    columns: &[
        Column::new("name", "Name"),
        Column::new("email", "Email"),
        Column::new("role", "Role"),
        Column::new("isActive", "Active"),
    ],
    form: &[
        FormField::required("name", "Name", Text),
        FormField::required("email", "Email", Email),
        FormField::optional("password", "Password", Text),
        FormField::optional("role", "Role", Text),
        FormField::optional("permissions", "Permissions", Tags),
    ],
    filters: &["role"],
    searchable: true,
    soft_delete: false,
    empty_message: "No admins found",
};

pub static COMPANIES: ResourceConfig = ResourceConfig {
    key: "companies",
    title: "Company",
    endpoint: "/admin/companies",
    columns: &[
        Column::new("name", "Name"),
        Column::new("email", "Email"),
        Column::new("industry", "Industry"),
        Column::new("verificationStatus", "Verification"),
        Column::new("isActive", "Active"),
    ],
    form: &[
        FormField::required("name", "Name", Text),
        FormField::optional("email", "Email", Email),
        FormField::optional("phone", "Phone", Text),
        FormField::optional("website", "Website", Url),
        FormField::optional("industry", "Industry", Text),
        FormField::optional("size", "Company size", Select(&["1-10", "11-50", "51-200", "201-500", "500+"])),
        FormField::optional("address", "Address", TextArea),
    ],
    filters: &["verificationStatus", "isActive"],
    searchable: true,
    soft_delete: true,
    empty_message: "No companies found",
};

pub static EMPLOYERS: ResourceConfig = ResourceConfig {
    key: "employers",
    title: "Employer",
    endpoint: "/admin/employers",
    columns: &[
        Column::new("name", "Name"),
        Column::new("email", "Email"),
        Column::new("companyName", "Company"),
        Column::new("designation", "Designation"),
        Column::new("isActive", "Active"),
    ],
    form: &[
        FormField::required("name", "Name", Text),
        FormField::required("email", "Email", Email),
        FormField::optional("phone", "Phone", Text),
        FormField::optional("companyId", "Company", Text),
        FormField::optional("designation", "Designation", Text),
    ],
    filters: &["isActive", "companyId"],
    searchable: true,
    soft_delete: true,
    empty_message: "No employers found",
};

pub static CANDIDATES: ResourceConfig = ResourceConfig {
    key: "candidates",
    title: "Candidate",
    endpoint: "/admin/candidates",
    columns: &[
        Column::new("name", "Name"),
        Column::new("email", "Email"),
        Column::new("headline", "Headline"),
        Column::new("location", "Location"),
        Column::new("isActive", "Active"),
    ],
    form: &[
        FormField::required("name", "Name", Text),
        FormField::required("email", "Email", Email),
        FormField::optional("phone", "Phone", Text),
        FormField::optional("headline", "Headline", Text),
        FormField::optional("location", "Location", Text),
        FormField::optional("skills", "Skills", Tags),
    ],
    filters: &["isActive"],
    searchable: true,
    soft_delete: true,
    empty_message: "No candidates found",
};

pub static SKILLS: ResourceConfig = ResourceConfig {
    key: "skills",
    title: "Skill",
    endpoint: "/admin/skills",
    columns: &[
        Column::new("name", "Name"),
        Column::new("skillType", "Type"),
        Column::new("isActive", "Active"),
    ],
    form: &[
        FormField::required("name", "Name", Text),
    ],
    filters: &["type"],
    searchable: true,
    soft_delete: true,
    empty_message: "No skills found",
};

pub static DEGREES: ResourceConfig = ResourceConfig {
    key: "degrees",
    title: "Degree",
    endpoint: "/admin/degrees",
    columns: &[
        Column::new("name", "Name"),
        Column::new("shortName", "Short name"),
        Column::new("level", "Level"),
        Column::new("isActive", "Active"),
    ],
    form: &[
        FormField::required("name", "Name", Text),
        FormField::optional("shortName", "Short name", Text),
        FormField::optional("level", "Level", Select(&["diploma", "bachelor", "master", "doctorate"])),
    ],
    filters: &["level"],
    searchable: true,
    soft_delete: true,
    empty_message: "No degrees found",
};

pub static FIELDS_OF_STUDY: ResourceConfig = ResourceConfig {
    key: "fieldsOfStudy",
    title: "Field of study",
    endpoint: "/admin/fields-of-study",
    columns: &[
        Column::new("name", "Name"),
        Column::new("degreeId", "Degree"),
        Column::new("isActive", "Active"),
    ],
    form: &[
        FormField::required("name", "Name", Text),
        FormField::required("degreeId", "Degree", Text),
    ],
    filters: &["degreeId"],
    searchable: true,
    soft_delete: true,
    empty_message: "No fields of study found",
};

pub static RESUME_TEMPLATES: ResourceConfig = ResourceConfig {
    key: "templates",
    title: "Template",
    endpoint: "/admin/resume-templates",
    columns: &[
        Column::new("name", "Name"),
        Column::new("isPremium", "Premium"),
        Column::new("isActive", "Active"),
    ],
    form: &[
        FormField::required("name", "Name", Text),
        FormField::optional("description", "Description", TextArea),
        FormField::optional("previewUrl", "Preview URL", Url),
        FormField::required("fileUrl", "Template file URL", Url),
        FormField::optional("isPremium", "Premium", Bool),
    ],
    filters: &["isActive"],
    searchable: true,
    soft_delete: false,
    empty_message: "No templates found",
};

pub static VIDEO_RESUMES: ResourceConfig = ResourceConfig {
    key: "videoResumes",
    title: "Video resume",
    endpoint: "/admin/video-resumes",
    columns: &[
        Column::new("candidateName", "Candidate"),
        Column::new("status", "Status"),
        Column::new("rejectionReason", "Rejection reason"),
        Column::new("submittedAt", "Submitted"),
    ],
    form: &[],
    filters: &["status"],
    searchable: true,
    soft_delete: false,
    empty_message: "No video resumes to review",
};

pub static POSTS: ResourceConfig = ResourceConfig {
    key: "posts",
    title: "Post",
    endpoint: "/admin/posts",
    columns: &[
        Column::new("author", "Author"),
        Column::new("reason", "Reason"),
        Column::new("reportCount", "Reports"),
        Column::new("status", "Status"),
    ],
    form: &[],
    filters: &["status"],
    searchable: true,
    soft_delete: false,
    empty_message: "No flagged posts",
};

pub static ROLES: ResourceConfig = ResourceConfig {
    key: "roles",
    title: "Role",
    endpoint: "",
    columns: &[
        Column::new("name", "Name"),
        Column::new("description", "Description"),
        Column::new("permissions", "Permissions"),
        Column::new("isSystem", "Built-in"),
    ],
    form: &[
        FormField::required("name", "Name", Text),
        FormField::optional("description", "Description", TextArea),
        FormField::optional("permissions", "Permissions", Tags),
    ],
    filters: &[],
    searchable: true,
    soft_delete: false,
    empty_message: "No roles defined",
};

pub static MEMBERS: ResourceConfig = ResourceConfig {
    key: "members",
    title: "Member",
    endpoint: "",
    columns: &[
        Column::new("name", "Name"),
        Column::new("email", "Email"),
        Column::new("roleId", "Role"),
        Column::new("isActive", "Active"),
    ],
    form: &[
        FormField::required("name", "Name", Text),
        FormField::required("email", "Email", Email),
        FormField::required("roleId", "Role", Text),
    ],
    filters: &["roleId"],
    searchable: true,
    soft_delete: false,
    empty_message: "No members yet",
};

pub static FLAGGED_POSTS: ResourceConfig = ResourceConfig {
    key: "flaggedPosts",
    title: "Flagged post",
    endpoint: "",
    columns: &[
        Column::new("author", "Author"),
        Column::new("content", "Content"),
        Column::new("reason", "Reason"),
        Column::new("reportCount", "Reports"),
        Column::new("status", "Status"),
    ],
    form: &[
        FormField::required("postId", "Post", Text),
        FormField::required("author", "Author", Text),
        FormField::required("content", "Content", TextArea),
        FormField::required("reason", "Reason", Text),
    ],
    filters: &["status"],
    searchable: true,
    soft_delete: false,
    empty_message: "Nothing flagged for review",
};

/// Every page, for hosts that build navigation from the catalogue.
pub static ALL: &[&ResourceConfig] = &[
    &ADMINS,
    &COMPANIES,
    &EMPLOYERS,
    &CANDIDATES,
    &SKILLS,
    &DEGREES,
    &FIELDS_OF_STUDY,
    &RESUME_TEMPLATES,
    &VIDEO_RESUMES,
    &POSTS,
    &ROLES,
    &MEMBERS,
    &FLAGGED_POSTS,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<_> = ALL.iter().map(|c| c.key).collect();
        assert_eq!(keys.len(), ALL.len());
    }

    #[test]
    fn test_remote_pages_have_endpoints() {
        let local: HashSet<_> = [ROLES.key, MEMBERS.key, FLAGGED_POSTS.key].into_iter().collect();
        for config in ALL.iter().filter(|c| !local.contains(c.key)) {
            assert!(config.endpoint.starts_with("/admin/"), "{}", config.key);
        }
    }
}
