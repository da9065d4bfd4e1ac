//! Fluent assembly of engine configuration argument vectors.
//!
//! The builder collects long-option tokens into an argv whose first token is
//! the conventional program-name placeholder; nothing here is interpreted,
//! the engine parses the options itself. The learner runtime treats the
//! result as opaque.
//!
//! Output is quiet by default; call [`CommandBuilder::verbose`] to let the
//! engine write progress information to stderr.

use std::path::Path;

use tracing::info;

use corral_learner::{
    create_from_args, ActionProbsLearner, ActionScoresLearner, Learner, MulticlassLearner,
    MultilabelsLearner, ProbLearner, ScalarLearner, ScalarsLearner, COMMAND_PLACEHOLDER,
};

use crate::error::ApiResult;

/// Loss function measuring the discrepancy between prediction and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loss {
    Squared,
    Classic,
    Hinge,
    Logistic,
    Quantile,
    Poisson,
}

impl Loss {
    fn token(self) -> &'static str {
        match self {
            Self::Squared => "squared",
            Self::Classic => "classic",
            Self::Hinge => "hinge",
            Self::Logistic => "logistic",
            Self::Quantile => "quantile",
            Self::Poisson => "poisson",
        }
    }
}

/// Link function applied to the linear prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Identity,
    Logistic,
    Glf1,
    Poisson,
}

impl Link {
    fn token(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Logistic => "logistic",
            Self::Glf1 => "glf1",
            Self::Poisson => "poisson",
        }
    }
}

/// Feature hashing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hash {
    Strings,
    All,
}

impl Hash {
    fn token(self) -> &'static str {
        match self {
            Self::Strings => "strings",
            Self::All => "all",
        }
    }
}

/// Label-dependent-features mode for cost-sensitive reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ldf {
    Singleline,
    Multiline,
}

impl Ldf {
    fn token(self) -> &'static str {
        match self {
            Self::Singleline => "s",
            Self::Multiline => "m",
        }
    }
}

/// Fluent builder for an engine configuration.
///
/// ```no_run
/// use corral_api::CommandBuilder;
///
/// let mut learner = CommandBuilder::new()
///     .adaptive()
///     .invariant()
///     .l2(0.0001)
///     .build_scalar_learner()?;
/// learner.learn("1 |f price:0.23")?;
/// # Ok::<(), corral_api::ApiError>(())
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct CommandBuilder {
    args: Vec<String>,
    verbose: bool,
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(mut self, flag: &str) -> Self {
        self.args.push(flag.to_string());
        self
    }

    fn parameter(mut self, option: &str, value: impl ToString) -> Self {
        self.args.push(option.to_string());
        self.args.push(value.to_string());
        self
    }

    fn path_parameter(self, option: &str, path: &Path) -> Self {
        self.parameter(option, path.display())
    }

    // ========== General Options ==========

    /// Let the engine write debug and progress information to stderr.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Seed the engine's random number generator.
    pub fn random_seed(self, seed: i32) -> Self {
        self.parameter("--random_seed", seed)
    }

    /// Size of the example ring buffer.
    pub fn ring_size(self, ring_size: u32) -> Self {
        self.parameter("--ring_size", ring_size)
    }

    // ========== Update Rule Options ==========

    pub fn learning_rate(self, rate: f64) -> Self {
        self.parameter("--learning_rate", rate)
    }

    pub fn power_t(self, power_t: f64) -> Self {
        self.parameter("--power_t", power_t)
    }

    pub fn decay_learning_rate(self, decay: f64) -> Self {
        self.parameter("--decay_learning_rate", decay)
    }

    pub fn initial_t(self, initial_t: f64) -> Self {
        self.parameter("--initial_t", initial_t)
    }

    /// Use adaptive, individual learning rates.
    pub fn adaptive(self) -> Self {
        self.flag("--adaptive")
    }

    /// Use safe/importance-aware updates.
    pub fn invariant(self) -> Self {
        self.flag("--invariant")
    }

    /// Use per-feature normalized updates.
    pub fn normalized(self) -> Self {
        self.flag("--normalized")
    }

    /// Use classic unadorned stochastic gradient descent.
    pub fn sgd(self) -> Self {
        self.flag("--sgd")
    }

    /// FTRL-proximal optimization.
    pub fn ftrl(self) -> Self {
        self.flag("--ftrl")
    }

    // ========== Regularization ==========

    pub fn l1(self, l1: f64) -> Self {
        self.parameter("--l1", l1)
    }

    pub fn l2(self, l2: f64) -> Self {
        self.parameter("--l2", l2)
    }

    // ========== Feature Options ==========

    /// Number of bits in the feature table index.
    pub fn bit_precision(self, bits: u32) -> Self {
        self.parameter("--bit_precision", bits)
    }

    pub fn hash(self, hash: Hash) -> Self {
        self.parameter("--hash", hash.token())
    }

    /// Ignore the namespaces beginning with this character.
    pub fn ignore(self, namespace: &str) -> Self {
        self.parameter("--ignore", first_char(namespace))
    }

    /// Keep only the namespaces beginning with this character.
    pub fn keep(self, namespace: &str) -> Self {
        self.parameter("--keep", first_char(namespace))
    }

    /// Do not add a constant feature.
    pub fn noconstant(self) -> Self {
        self.flag("--noconstant")
    }

    /// Initial value of the constant feature.
    pub fn constant(self, value: f64) -> Self {
        self.parameter("--constant", value)
    }

    /// Generate n-grams inside a namespace.
    pub fn ngram(self, namespace: &str, n: u32) -> Self {
        self.parameter("--ngram", format!("{}{}", first_char(namespace), n))
    }

    /// Generate skips inside a namespace; use with [`Self::ngram`].
    pub fn skips(self, namespace: &str, n: u32) -> Self {
        self.parameter("--skips", format!("{}{}", first_char(namespace), n))
    }

    /// Generate prefixes/suffixes of features, e.g. `+2a,-3b`.
    pub fn affix(self, arg: &str) -> Self {
        self.parameter("--affix", arg)
    }

    /// Interact the features of two namespaces (by first character).
    pub fn quadratic(self, first: &str, second: &str) -> Self {
        self.parameter(
            "--quadratic",
            format!("{}{}", first_char(first), first_char(second)),
        )
    }

    /// Interact the features of three namespaces (by first character).
    pub fn cubic(self, first: &str, second: &str, third: &str) -> Self {
        self.parameter(
            "--cubic",
            format!(
                "{}{}{}",
                first_char(first),
                first_char(second),
                first_char(third)
            ),
        )
    }

    /// Interact the features of any number of namespaces (by first
    /// character).
    pub fn interactions(self, namespaces: &[&str]) -> Self {
        let arg: String = namespaces.iter().map(|ns| first_char(ns)).collect();
        self.parameter("--interactions", arg)
    }

    /// Low-rank quadratic interaction between two namespaces.
    pub fn lrq(self, first: &str, second: &str, rank: u32) -> Self {
        self.parameter(
            "--lrq",
            format!("{}{}{}", first_char(first), first_char(second), rank),
        )
    }

    /// Use dropout training for low-rank quadratic features.
    pub fn lrq_dropout(self) -> Self {
        self.flag("--lrqdropout")
    }

    // ========== Input/Output Options ==========

    /// Initial model to start training from.
    pub fn initial_regressor(self, model: &Path) -> Self {
        self.path_parameter("--initial_regressor", model)
    }

    /// Final model location.
    pub fn final_regressor(self, model: &Path) -> Self {
        self.path_parameter("--final_regressor", model)
    }

    /// Human-readable final model location.
    pub fn readable_model(self, model: &Path) -> Self {
        self.path_parameter("--readable_model", model)
    }

    /// Human-readable model with feature names resolved.
    pub fn invert_hash(self, model: &Path) -> Self {
        self.path_parameter("--invert_hash", model)
    }

    pub fn cache_file(self, cache: &Path) -> Self {
        self.path_parameter("--cache_file", cache)
    }

    /// Do not reuse an existing cache; always create a new one.
    pub fn kill_cache(self) -> Self {
        self.flag("--kill_cache")
    }

    /// Number of training passes; requires a cache.
    pub fn passes(self, passes: u32) -> Self {
        self.parameter("--passes", passes)
    }

    /// Save extra state so training can resume later.
    pub fn save_resume(self) -> Self {
        self.flag("--save_resume")
    }

    /// Ignore label information and just test.
    pub fn testonly(self) -> Self {
        self.flag("--testonly")
    }

    /// No holdout data in multi-pass learning.
    pub fn holdout_off(self) -> Self {
        self.flag("--holdout_off")
    }

    /// Smallest prediction to output.
    pub fn min_prediction(self, min: f64) -> Self {
        self.parameter("--min_prediction", min)
    }

    /// Largest prediction to output.
    pub fn max_prediction(self, max: f64) -> Self {
        self.parameter("--max_prediction", max)
    }

    // ========== Loss and Link ==========

    pub fn loss_function(self, loss: Loss) -> Self {
        self.parameter("--loss_function", loss.token())
    }

    /// Quantile parameter for quantile loss.
    pub fn quantile_tau(self, tau: f64) -> Self {
        self.parameter("--quantile_tau", tau)
    }

    pub fn link(self, link: Link) -> Self {
        self.parameter("--link", link.token())
    }

    /// Report loss as binary classification with -1/1 labels.
    pub fn binary(self) -> Self {
        self.flag("--binary")
    }

    // ========== Reductions ==========

    /// One-against-all multiclass with `k` labels.
    pub fn oaa(self, k: u32) -> Self {
        self.parameter("--oaa", k)
    }

    /// Error-correcting tournament multiclass with `k` labels.
    pub fn ect(self, k: u32) -> Self {
        self.parameter("--ect", k)
    }

    /// Cost-sensitive one-against-all with `k` costs.
    pub fn csoaa(self, k: u32) -> Self {
        self.parameter("--csoaa", k)
    }

    /// Cost-sensitive one-against-all with label-dependent features.
    pub fn csoaa_ldf(self, ldf: Ldf) -> Self {
        self.parameter("--csoaa_ldf", ldf.token())
    }

    /// Multilabel one-against-all with `k` labels.
    pub fn multilabel_oaa(self, k: u32) -> Self {
        self.parameter("--multilabel_oaa", k)
    }

    /// Contextual bandit with `k` actions.
    pub fn cb(self, k: u32) -> Self {
        self.parameter("--cb", k)
    }

    /// Contextual bandit exploration with `k` actions.
    pub fn cb_explore(self, k: u32) -> Self {
        self.parameter("--cb_explore", k)
    }

    /// Contextual bandit with action-dependent features.
    pub fn cb_adf(self) -> Self {
        self.flag("--cb_adf")
    }

    /// Contextual bandit exploration with action-dependent features.
    pub fn cb_explore_adf(self) -> Self {
        self.flag("--cb_explore_adf")
    }

    /// Convert a `k`-class multiclass problem into a contextual bandit one.
    pub fn cbify(self, k: u32) -> Self {
        self.parameter("--cbify", k)
    }

    /// Sigmoidal feed-forward network with `n` hidden units.
    pub fn nn(self, hidden_units: u32) -> Self {
        self.parameter("--nn", hidden_units)
    }

    /// Latent Dirichlet allocation with `topics` topics.
    pub fn lda(self, topics: u32) -> Self {
        self.parameter("--lda", topics)
    }

    /// Online boosting with `n` weak learners.
    pub fn boosting(self, n: u32) -> Self {
        self.parameter("--boosting", n)
    }

    /// k-way bootstrap by online importance resampling.
    pub fn bootstrap(self, k: u32) -> Self {
        self.parameter("--bootstrap", k)
    }

    /// Top-k recommendation.
    pub fn top(self, k: u32) -> Self {
        self.parameter("--top", k)
    }

    // ========== Escape Hatch ==========

    /// Append a raw token; for options without a dedicated method.
    pub fn argument(self, token: &str) -> Self {
        self.flag(token)
    }

    // ========== Terminals ==========

    /// The full argument vector, placeholder token first.
    pub fn command_arguments(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 2);
        args.push(COMMAND_PLACEHOLDER.to_string());
        args.extend(self.args.iter().cloned());
        if !self.verbose {
            args.push("--quiet".to_string());
        }
        args
    }

    /// The assembled options as one command string, without the placeholder.
    pub fn command(&self) -> String {
        self.command_arguments()[1..].join(" ")
    }

    /// Create a learner of engine-determined type from this configuration.
    pub fn build(&self) -> ApiResult<Learner> {
        info!(command = %self.command(), "building learner");
        Ok(create_from_args(self.command_arguments())?)
    }

    /// Create a learner and narrow it to the scalar variant.
    pub fn build_scalar_learner(&self) -> ApiResult<ScalarLearner> {
        Ok(self.build()?.into_scalar()?)
    }

    /// Create a learner and narrow it to the probability variant.
    pub fn build_prob_learner(&self) -> ApiResult<ProbLearner> {
        Ok(self.build()?.into_prob()?)
    }

    /// Create a learner and narrow it to the scalar-array variant.
    pub fn build_scalars_learner(&self) -> ApiResult<ScalarsLearner> {
        Ok(self.build()?.into_scalars()?)
    }

    /// Create a learner and narrow it to the multiclass variant.
    pub fn build_multiclass_learner(&self) -> ApiResult<MulticlassLearner> {
        Ok(self.build()?.into_multiclass()?)
    }

    /// Create a learner and narrow it to the multilabel variant.
    pub fn build_multilabels_learner(&self) -> ApiResult<MultilabelsLearner> {
        Ok(self.build()?.into_multilabels()?)
    }

    /// Create a learner and narrow it to the action-scores variant.
    pub fn build_action_scores_learner(&self) -> ApiResult<ActionScoresLearner> {
        Ok(self.build()?.into_action_scores()?)
    }

    /// Create a learner and narrow it to the action-probs variant.
    pub fn build_action_probs_learner(&self) -> ApiResult<ActionProbsLearner> {
        Ok(self.build()?.into_action_probs()?)
    }
}

/// Namespace options address namespaces by first character only.
fn first_char(namespace: &str) -> String {
    namespace.chars().take(1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder_is_quiet_by_default() {
        let args = CommandBuilder::new().command_arguments();
        assert_eq!(args, vec!["corral", "--quiet"]);
    }

    #[test]
    fn test_verbose_drops_quiet() {
        let args = CommandBuilder::new().verbose().command_arguments();
        assert_eq!(args, vec!["corral"]);
    }

    #[test]
    fn test_command_omits_placeholder() {
        let command = CommandBuilder::new()
            .adaptive()
            .invariant()
            .l2(0.0001)
            .command();
        assert_eq!(command, "--adaptive --invariant --l2 0.0001 --quiet");
    }

    #[test]
    fn test_parameter_options_emit_two_tokens() {
        let args = CommandBuilder::new()
            .learning_rate(0.5)
            .passes(10)
            .loss_function(Loss::Logistic)
            .command_arguments();
        assert_eq!(
            args,
            vec![
                "corral",
                "--learning_rate",
                "0.5",
                "--passes",
                "10",
                "--loss_function",
                "logistic",
                "--quiet"
            ]
        );
    }

    #[test]
    fn test_namespace_options_use_first_character() {
        let command = CommandBuilder::new()
            .quadratic("features", "bias")
            .cubic("alpha", "beta", "gamma")
            .ngram("text", 2)
            .interactions(&["alpha", "beta", "gamma"])
            .command();
        assert!(command.contains("--quadratic fb"));
        assert!(command.contains("--cubic abg"));
        assert!(command.contains("--ngram t2"));
        assert!(command.contains("--interactions abg"));
    }

    #[test]
    fn test_path_with_whitespace_stays_one_token() {
        let args = CommandBuilder::new()
            .initial_regressor(Path::new("/tmp/model with space.bin"))
            .command_arguments();
        assert!(args.contains(&"/tmp/model with space.bin".to_string()));
    }

    #[test]
    fn test_reduction_options() {
        let command = CommandBuilder::new()
            .cb(4)
            .csoaa_ldf(Ldf::Multiline)
            .link(Link::Logistic)
            .command();
        assert!(command.contains("--cb 4"));
        assert!(command.contains("--csoaa_ldf m"));
        assert!(command.contains("--link logistic"));
    }

    #[test]
    fn test_argument_escape_hatch() {
        let command = CommandBuilder::new().argument("--audit").command();
        assert!(command.contains("--audit"));
    }

    #[test]
    fn test_builder_is_reusable() {
        let builder = CommandBuilder::new().l1(0.0001);
        let first = builder.command_arguments();
        let second = builder.command_arguments();
        assert_eq!(first, second);
    }
}
