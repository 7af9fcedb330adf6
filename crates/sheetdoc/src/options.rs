//! Render configuration

/// What to do when a table tag does not occur in the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTagPolicy {
    /// Append a diagnostic paragraph to the output document
    #[default]
    Warn,
    /// Skip the entry silently (it is still reported as failed)
    Skip,
}

/// Options for one render
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Sheet used when an entry names none
    pub default_sheet: Option<String>,
    pub missing_tag: MissingTagPolicy,
    /// Turn bare mapping keys (`NAME`) into `{{NAME}}`
    pub wrap_bare_tags: bool,
    /// Usable text width in twips (default 6in)
    pub text_width_twips: u32,
    /// Separator between cells in plain-text mode
    pub plain_text_separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_sheet: None,
            missing_tag: MissingTagPolicy::Warn,
            wrap_bare_tags: true,
            text_width_twips: 6 * sheetdoc_docx::TWIPS_PER_INCH,
            plain_text_separator: "    ".to_string(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_sheet<S: Into<String>>(mut self, sheet: S) -> Self {
        self.default_sheet = Some(sheet.into());
        self
    }

    pub fn with_missing_tag(mut self, policy: MissingTagPolicy) -> Self {
        self.missing_tag = policy;
        self
    }

    pub fn with_wrap_bare_tags(mut self, wrap: bool) -> Self {
        self.wrap_bare_tags = wrap;
        self
    }

    pub fn with_text_width_twips(mut self, twips: u32) -> Self {
        self.text_width_twips = twips;
        self
    }

    pub fn with_plain_text_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.plain_text_separator = separator.into();
        self
    }
}
