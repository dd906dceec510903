use std::sync::Arc;

use markdown::Options;

/// Renderer extension a plugin applies per record during the render phase.
/// Receives the record and the renderer built so far, returns the renderer to
/// use from there on, so extensions can be conditional (e.g. math only for
/// posts carrying a "math" tag).
pub type RendererTransform<T> = Arc<dyn Fn(&T, MarkdownRenderer) -> MarkdownRenderer + Send + Sync>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Flavor {
    Gfm,
    CommonMark,
}

/// The markdown-to-HTML capability used by the render phase. Cheap to clone;
/// the actual options are assembled when `render` runs.
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    flavor: Flavor,
    math: bool,
}

impl MarkdownRenderer {
    pub fn gfm() -> MarkdownRenderer {
        MarkdownRenderer {
            flavor: Flavor::Gfm,
            math: false,
        }
    }

    pub fn commonmark() -> MarkdownRenderer {
        MarkdownRenderer {
            flavor: Flavor::CommonMark,
            math: false,
        }
    }

    pub fn with_math(mut self, enabled: bool) -> MarkdownRenderer {
        self.math = enabled;
        self
    }

    pub fn render(&self, md_text: &str) -> Result<String, String> {
        let mut options = match self.flavor {
            Flavor::Gfm => Options::gfm(),
            Flavor::CommonMark => Options::default(),
        };
        if self.math {
            options.parse.constructs.math_flow = true;
            options.parse.constructs.math_text = true;
        }

        match markdown::to_html_with_options(md_text, &options) {
            Ok(html) => Ok(html),
            Err(e) => Err(e.reason),
        }
    }
}
