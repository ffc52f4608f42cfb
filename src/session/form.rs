//! Project description form
//!
//! The form is the first thing a student submits. It is validated before it
//! touches the session and then serialized into a labelled key/value block
//! that becomes the first user turn.

use crate::error::{FeedloopError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Kind of project being described
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Social,
    Technological,
    Research,
    Entrepreneurship,
}

impl ProjectType {
    /// All variants in menu order
    pub const ALL: [ProjectType; 4] = [
        Self::Social,
        Self::Technological,
        Self::Research,
        Self::Entrepreneurship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Technological => "technological",
            Self::Research => "research",
            Self::Entrepreneurship => "entrepreneurship",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = FeedloopError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                FeedloopError::Validation(format!(
                    "Unknown project type '{}'. Expected one of: social, technological, research, entrepreneurship",
                    s
                ))
            })
    }
}

/// Profile of the person submitting the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserProfile {
    Student,
    Teacher,
    Researcher,
    Entrepreneur,
    Other,
}

impl UserProfile {
    /// All variants in menu order
    pub const ALL: [UserProfile; 5] = [
        Self::Student,
        Self::Teacher,
        Self::Researcher,
        Self::Entrepreneur,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Researcher => "researcher",
            Self::Entrepreneur => "entrepreneur",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserProfile {
    type Err = FeedloopError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                FeedloopError::Validation(format!(
                    "Unknown user profile '{}'. Expected one of: student, teacher, researcher, entrepreneur, other",
                    s
                ))
            })
    }
}

/// Snapshot of the project form
///
/// Text fields are free-form; required fields must be non-blank after
/// trimming. `partner_name` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectForm {
    pub project_name: String,
    pub context: String,
    pub problem: String,
    pub impact: String,
    pub proposed_solution: String,
    pub project_type: ProjectType,
    pub user_profile: UserProfile,
    #[serde(default)]
    pub partner_name: Option<String>,
}

impl ProjectForm {
    /// Loads a form from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid form
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FeedloopError::Validation(format!(
                "Failed to read form file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parses a form from YAML text
    ///
    /// # Errors
    ///
    /// Returns error if the YAML does not describe a form
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml).map_err(FeedloopError::Yaml)?)
    }

    /// Required text fields with their display labels
    fn required_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("Project name", &self.project_name),
            ("Context", &self.context),
            ("Problem", &self.problem),
            ("Impact", &self.impact),
            ("Proposed solution", &self.proposed_solution),
        ]
    }

    /// Checks that every required field is filled in
    ///
    /// # Errors
    ///
    /// Returns `IncompleteForm` listing the labels of blank fields in form order
    ///
    /// # Examples
    ///
    /// ```
    /// use feedloop::session::{ProjectForm, ProjectType, UserProfile};
    ///
    /// let form = ProjectForm {
    ///     project_name: "Solar Kiosks".into(),
    ///     context: "Rural schools".into(),
    ///     problem: " ".into(),
    ///     impact: "300 students".into(),
    ///     proposed_solution: "Shared kiosks".into(),
    ///     project_type: ProjectType::Social,
    ///     user_profile: UserProfile::Student,
    ///     partner_name: None,
    /// };
    /// let err = form.validate().unwrap_err();
    /// assert!(err.to_string().contains("Problem"));
    /// ```
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<String> = self
            .required_fields()
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| label.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FeedloopError::IncompleteForm { missing }.into())
        }
    }

    /// Serializes the form into the text of the first user turn
    pub fn to_prompt(&self) -> String {
        let mut lines: Vec<String> = self
            .required_fields()
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value.trim()))
            .collect();
        lines.push(format!("Project type: {}", self.project_type));
        lines.push(format!("User profile: {}", self.user_profile));

        if let Some(partner) = self
            .partner_name
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            lines.push(format!("Partner: {}", partner));
        }

        lines.join("\n")
    }
}
