//! Settings for proxy generation.

/// Settings handed to the generator context by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorOptions {
    /// Extra namespace wrapped around everything generated. Empty means no wrapper.
    pub custom_ns: String,

    /// Identifier of the renderer in the `TargetRegistry`.
    pub target: String,

    /// Spaces per nesting level in the formatted output.
    pub indent_width: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            custom_ns:    String::new(),
            target:       "csharp".to_string(),
            indent_width: 4,
        }
    }
}

impl GeneratorOptions {
    pub fn with_custom_ns(mut self, custom_ns: impl Into<String>) -> Self {
        self.custom_ns = custom_ns.into();
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }
}
