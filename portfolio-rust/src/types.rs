use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Everything the portfolio renders. Only `blogs` ever changes after the
/// snapshot is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub general_details: GeneralDetails,
    pub about_me: Vec<String>,
    pub skills: Vec<SkillGroup>,
    pub roles_and_responsibilities: Vec<String>,
    pub work_experience: Vec<WorkExperience>,
    pub projects: Vec<Project>,
    pub education: Vec<Education>,
    pub social_media: Vec<SocialLink>,
    pub preview_websites: Vec<WebsitePreview>,
    pub blogs: Vec<Article>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct GeneralDetails {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub dob: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SkillGroup {
    pub title: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub job_title: String,
    pub employer: String,
    pub city: String,
    pub country: String,
    pub start_date: NaiveDate,
    /// `None` while the position is held.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current_employer: bool,
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub tags: Vec<String>,
    pub title: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current_project: bool,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub school: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub city: String,
    pub country: String,
    pub gpa: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SocialLink {
    pub name: String,
    pub url: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WebsitePreview {
    pub name: String,
    pub description: String,
    pub preview_url: String,
    pub repo_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A blog post as served by the blog platform. Field names follow the
/// platform's API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    /// RFC 3339 timestamp.
    pub published_at: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub type_of: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub public_reactions_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub positive_reactions_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_views_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published_timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body_markdown: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_list: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub canonical_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reading_time_minutes: u32,
    #[serde(default)]
    pub user: Option<ArticleUser>,
}

impl Article {
    /// `published_at` parsed, if it is a valid RFC 3339 timestamp.
    #[must_use]
    pub fn published_date(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.published_at).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ArticleUser {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub github_username: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: u64,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profile_image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profile_image_90: String,
}

/// The blog platform sends `null` for fields it has no value for. Treat it
/// like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
