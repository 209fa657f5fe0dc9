//! Stage definitions.
//!
//! A stage is one source → transform → destination operation for a single
//! asset class. The full build runs a fixed subset of them in order.

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Compile the SCSS entry into CSS inside the source tree
    Style,
    /// Minify and concatenate CSS into `main.css`
    Css,
    /// Minify and concatenate the JS entry into `main.js`
    Js,
    /// Copy HTML pages
    Html,
    /// Copy fonts
    Fonts,
    /// Optimize images
    Img,
    /// Delete the output root
    CleanBuild,
}

impl Stage {
    /// Stages run by `build`, in order.
    pub const BUILD_ORDER: [Stage; 6] =
        [Stage::CleanBuild, Stage::Img, Stage::Html, Stage::Fonts, Stage::Css, Stage::Js];

    /// Task name used on the command line and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Style => "style",
            Stage::Css => "css",
            Stage::Js => "js",
            Stage::Html => "html",
            Stage::Fonts => "fonts",
            Stage::Img => "img",
            Stage::CleanBuild => "cleanBuild",
        }
    }

    /// Whether completing this stage should reload connected browsers.
    pub fn triggers_reload(&self) -> bool {
        matches!(self, Stage::Style | Stage::Css | Stage::Js | Stage::Html | Stage::Fonts)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_order() {
        let names: Vec<&str> = Stage::BUILD_ORDER.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["cleanBuild", "img", "html", "fonts", "css", "js"]);
    }

    #[test]
    fn test_reload_scope() {
        assert!(Stage::Style.triggers_reload());
        assert!(Stage::Html.triggers_reload());
        assert!(!Stage::Img.triggers_reload());
        assert!(!Stage::CleanBuild.triggers_reload());
    }
}
