//! Mapper configuration.

/// Which field values writers include in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inclusion {
    /// Every field is written.
    #[default]
    Always,
    /// Fields whose encoder reports them as empty are skipped.
    NonEmpty,
}

/// Options for an [`ObjectMapper`](crate::ObjectMapper).
#[derive(Debug, Clone, Default)]
pub struct MapperConfig {
    pub inclusion: Inclusion,
    /// Reject input objects carrying keys no field declares.
    pub fail_on_unknown_keys: bool,
    /// Reject input objects missing a field whose decoder has no absent value.
    /// When off, such fields keep their `Default` value.
    pub fail_on_missing_fields: bool,
    /// Treat `""` as empty input rather than as string content.
    pub accept_empty_string_as_null: bool,
}

impl MapperConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn inclusion(mut self, inclusion: Inclusion) -> Self {
        self.inclusion = inclusion;
        self
    }
    pub fn fail_on_unknown_keys(mut self, v: bool) -> Self {
        self.fail_on_unknown_keys = v;
        self
    }
    pub fn fail_on_missing_fields(mut self, v: bool) -> Self {
        self.fail_on_missing_fields = v;
        self
    }
    pub fn accept_empty_string_as_null(mut self, v: bool) -> Self {
        self.accept_empty_string_as_null = v;
        self
    }
}
