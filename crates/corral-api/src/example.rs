//! Validating serializer for the engine's textual example format.
//!
//! One example line is `label [importance] ['tag]|namespace feature …` with
//! any number of namespaces. Whitespace, `:` and `|` are control characters
//! of the format: they are rejected in names and tags, and scrubbed out of
//! free text.

use crate::error::{ApiError, ApiResult};

/// Whether `value` contains a character the example format reserves.
fn has_control_chars(value: &str) -> bool {
    value.chars().any(is_control_char)
}

fn is_control_char(c: char) -> bool {
    c.is_whitespace() || c == ':' || c == '|'
}

/// Replace every run of control characters with a single space.
fn scrub(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if is_control_char(c) {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

fn ensure_finite(context: &'static str, value: f64) -> ApiResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ApiError::NonFiniteValue { context, value })
    }
}

/// Builder for one namespace of an example.
#[derive(Debug, Clone)]
pub struct NamespaceBuilder {
    name: String,
    weight: Option<f64>,
    features: String,
}

impl NamespaceBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            weight: None,
            features: String::new(),
        }
    }

    /// Namespace weight, a global scaling of every feature value in this
    /// namespace. Defaults to 1 when omitted.
    pub fn weight(&mut self, weight: f64) -> ApiResult<&mut Self> {
        ensure_finite("namespace weight", weight)?;
        self.weight = Some(weight);
        Ok(self)
    }

    /// Add a categorical feature (e.g. a user id or a color).
    pub fn categorical(&mut self, feature: impl ToString) -> ApiResult<&mut Self> {
        let feature = feature.to_string();
        if has_control_chars(&feature) {
            return Err(ApiError::InvalidFeature {
                namespace: self.name.clone(),
                feature,
            });
        }
        self.features.push_str(&feature);
        self.features.push(' ');
        Ok(self)
    }

    /// Add a categorical feature under a sub-namespace, rendered as
    /// `sub=value` (e.g. sub-namespace `gender`, value `Female`).
    pub fn categorical_in(
        &mut self,
        sub_namespace: &str,
        value: impl ToString,
    ) -> ApiResult<&mut Self> {
        self.categorical(format!("{sub_namespace}={}", value.to_string()))
    }

    /// Add raw text as features; control characters become spaces.
    pub fn text(&mut self, text: &str) -> ApiResult<&mut Self> {
        self.features.push_str(&scrub(text));
        self.features.push(' ');
        Ok(self)
    }

    /// Add a numerical feature (e.g. `ctr:0.032`), or a categorical feature
    /// with an explicit weight (e.g. tf-idf terms).
    pub fn numerical(&mut self, name: &str, value: f64) -> ApiResult<&mut Self> {
        if has_control_chars(name) {
            return Err(ApiError::InvalidFeature {
                namespace: self.name.clone(),
                feature: name.to_string(),
            });
        }
        ensure_finite("feature value", value)?;
        self.features.push_str(name);
        self.features.push(':');
        self.features.push_str(&value.to_string());
        self.features.push(' ');
        Ok(self)
    }

    fn render(&self) -> String {
        let mut out = String::new();
        out.push('|');
        out.push_str(&self.name);
        if let Some(weight) = self.weight {
            out.push(':');
            out.push_str(&weight.to_string());
        }
        out.push(' ');
        out.push_str(&self.features);
        out.trim_end().to_string()
    }
}

/// Builder for one example line in the engine's input format.
///
/// ```
/// use corral_api::ExampleBuilder;
///
/// let mut example = ExampleBuilder::new();
/// example.label(1.0)?;
/// example
///     .namespace("features")?
///     .numerical("price", 0.23)?
///     .categorical("downtown")?;
/// assert_eq!(example.build(), "1 |features price:0.23 downtown");
/// # Ok::<(), corral_api::ApiError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExampleBuilder {
    skip_namespace_check: bool,
    label: Option<String>,
    tag: Option<String>,
    importance: Option<f64>,
    namespaces: Vec<NamespaceBuilder>,
}

impl ExampleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Like [`Self::new`] but namespaces may share a first character.
    ///
    /// Engine options such as `--keep`, `--quadratic` and `--cubic` address
    /// namespaces by first character only, so the default builder rejects
    /// collisions.
    pub fn without_namespace_check() -> Self {
        Self {
            skip_namespace_check: true,
            ..Self::default()
        }
    }

    /// The real number this example trains towards.
    ///
    /// With logistic or hinge loss the label must be -1 or +1; see
    /// [`Self::binary_label`].
    pub fn label(&mut self, label: f64) -> ApiResult<&mut Self> {
        ensure_finite("label", label)?;
        self.label = Some(label.to_string());
        Ok(self)
    }

    /// Set a {-1, +1} label from a boolean, for logistic or hinge loss.
    pub fn binary_label(&mut self, positive: bool) -> &mut Self {
        self.label = Some(if positive { "1" } else { "-1" }.to_string());
        self
    }

    /// Set a raw label string, e.g. multiclass or cost-sensitive labels.
    pub fn label_string(&mut self, label: &str) -> &mut Self {
        self.label = Some(label.to_string());
        self
    }

    /// Drop the label: the engine predicts for the example without training
    /// on it.
    pub fn omit_label(&mut self) -> &mut Self {
        self.label = None;
        self
    }

    /// Read the label back as a number.
    pub fn label_as_f64(&self) -> ApiResult<f64> {
        let label = self.label.as_deref().ok_or(ApiError::MissingLabel)?;
        label
            .parse()
            .map_err(|_| ApiError::InvalidLabel(label.to_string()))
    }

    /// Non-negative relative importance of this example; defaults to 1.
    ///
    /// Pass the `invariant` option to the engine for importance weights to
    /// be handled properly.
    pub fn importance(&mut self, importance: f64) -> ApiResult<&mut Self> {
        ensure_finite("example importance", importance)?;
        self.importance = Some(importance);
        Ok(self)
    }

    /// Identifier string reported back with predictions. Not required to be
    /// unique.
    pub fn example_tag(&mut self, tag: &str) -> ApiResult<&mut Self> {
        if has_control_chars(tag) {
            return Err(ApiError::InvalidTag(tag.to_string()));
        }
        self.tag = Some(tag.to_string());
        Ok(self)
    }

    /// The example's tag, if one was set.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Open a new namespace and return its builder.
    pub fn namespace(&mut self, name: &str) -> ApiResult<&mut NamespaceBuilder> {
        if name.is_empty() || has_control_chars(name) {
            return Err(ApiError::InvalidNamespace(name.to_string()));
        }
        if !self.skip_namespace_check {
            let first = name.chars().next().unwrap_or_default();
            if let Some(existing) = self
                .namespaces
                .iter()
                .find(|ns| ns.name.starts_with(first))
            {
                return Err(ApiError::DuplicateNamespaceFirstChar {
                    namespace: name.to_string(),
                    existing: existing.name.clone(),
                });
            }
        }
        self.namespaces.push(NamespaceBuilder::new(name.to_string()));
        Ok(self.namespaces.last_mut().expect("namespace just pushed"))
    }

    /// Render the example line.
    pub fn build(&self) -> String {
        let mut out = String::new();
        if let Some(label) = &self.label {
            out.push_str(label);
        }
        out.push(' ');
        if let Some(importance) = self.importance {
            out.push_str(&importance.to_string());
            out.push(' ');
        }
        if let Some(tag) = &self.tag {
            out.push('\'');
            out.push_str(tag);
        }
        let rendered: Vec<String> = self.namespaces.iter().map(NamespaceBuilder::render).collect();
        out.push_str(&rendered.join(" "));
        out
    }
}

impl std::fmt::Display for ExampleBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.build())
    }
}
