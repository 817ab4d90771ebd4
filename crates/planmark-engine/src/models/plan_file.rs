use relative_path::{RelativePath, RelativePathBuf};

/// A `.plan` file with a project-relative path and display-friendly name.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanFile {
    relative_path: RelativePathBuf,
    display_name: String,
    display_path: String,
}

impl PlanFile {
    /// Create a new PlanFile from a project-relative path.
    pub fn new(relative_path: RelativePathBuf) -> Self {
        let display_name = Self::extract_display_name(&relative_path);
        let display_path = {
            let path_str = relative_path.as_str();
            path_str
                .strip_suffix(".plan")
                .unwrap_or(path_str)
                .to_string()
        };

        Self {
            relative_path,
            display_name,
            display_path,
        }
    }

    /// Create from a relative path string.
    pub fn from_relative_str(path: &str) -> Self {
        Self::new(RelativePathBuf::from(path))
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// File name without the `.plan` extension.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Full relative path without the `.plan` extension; used as the
    /// document key when frontmatter has no id.
    pub fn display_path(&self) -> &str {
        &self.display_path
    }

    fn extract_display_name(path: &RelativePath) -> String {
        path.file_name()
            .map(|name| name.strip_suffix(".plan").unwrap_or(name))
            .unwrap_or("untitled")
            .to_string()
    }
}

impl From<RelativePathBuf> for PlanFile {
    fn from(path: RelativePathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&str> for PlanFile {
    fn from(path: &str) -> Self {
        Self::from_relative_str(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_plan_extension_for_display() {
        let f = PlanFile::from_relative_str("auth/feat-social-login.plan");
        assert_eq!(f.display_name(), "feat-social-login");
        assert_eq!(f.display_path(), "auth/feat-social-login");
        assert_eq!(f.relative_path().as_str(), "auth/feat-social-login.plan");
    }

    #[test]
    fn keeps_non_plan_paths_as_is() {
        let f = PlanFile::from_relative_str("notes.txt");
        assert_eq!(f.display_name(), "notes.txt");
        assert_eq!(f.display_path(), "notes.txt");
    }
}
