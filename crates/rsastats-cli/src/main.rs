//! CLI for rsastats: RDM pooling and model-comparison tests from JSON files.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rsastats")]
#[command(about = "rsastats: pool RDMs and test model comparisons for representational similarity analysis")]
#[command(version = rsastats_core::VERSION)]
struct Cli {
    /// Log debug diagnostics to stderr (RUST_LOG is used otherwise)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pool an RDM collection into one consensus RDM
    Pool {
        /// RDM collection JSON (`dissimilarities`, null = missing)
        #[arg(long)]
        input: String,

        /// Comparison method the pooled RDM is built for
        #[arg(long, default_value = "cosine", value_parser = [
            "euclid", "cosine", "cosine_cov", "corr", "corr_cov",
            "spearman", "rho-a", "kendall", "tau-b", "tau-a",
        ])]
        method: String,

        /// Write the pooled RDM as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Bootstrap test of every model pair
    PairTest {
        /// Evaluation tensor JSON (`shape`, `values`, `trailing_axes`, `models`)
        #[arg(long)]
        input: String,

        /// Write p-values as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Two-sided t-test of every model pair
    TTest {
        /// Evaluation tensor JSON
        #[arg(long)]
        input: String,

        /// Variance JSON: per-model array or covariance matrix
        #[arg(long)]
        variances: String,

        /// Degrees of freedom of the t distribution
        #[arg(long, default_value = "1")]
        dof: f64,

        /// Write p-values as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// One-sided t-test of each model against 0
    TTestZero {
        /// Evaluation tensor JSON
        #[arg(long)]
        input: String,

        /// Variance JSON: per-model array or covariance matrix
        #[arg(long)]
        variances: String,

        /// Degrees of freedom of the t distribution
        #[arg(long, default_value = "1")]
        dof: f64,

        /// Write p-values as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Two-sided t-test of each model against the noise ceiling
    TTestNc {
        /// Evaluation tensor JSON
        #[arg(long)]
        input: String,

        /// Variance JSON: per-model array or covariance matrix
        #[arg(long)]
        variances: String,

        /// Noise ceiling value the models are tested against
        #[arg(long)]
        noise_ceiling: f64,

        /// Variance of a noise ceiling estimated independently of the models
        #[arg(long, conflicts_with = "ceiling_covariance")]
        ceiling_variance: Option<f64>,

        /// JSON array: ceiling covariance with each model, then the ceiling's own variance
        #[arg(long)]
        ceiling_covariance: Option<String>,

        /// Degrees of freedom of the t distribution
        #[arg(long, default_value = "1")]
        dof: f64,

        /// Write p-values as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Summarise a model comparison: means, error bars, significant pairs
    Compare {
        /// Evaluation tensor JSON
        #[arg(long)]
        input: String,

        /// Significance level (FDR q for --correction fdr)
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Multiple-testing correction
        #[arg(long, default_value = "fdr", value_parser = ["fdr", "bonferroni", "fwer", "uncorrected", "none"])]
        correction: String,

        /// Model order
        #[arg(long, default_value = "none", value_parser = ["none", "ascending", "descending"])]
        sort: String,

        /// Error bars: sem (bootstrap standard deviation) or ci (percentile interval)
        #[arg(long, default_value = "sem", value_parser = ["sem", "ci"])]
        error_bars: String,

        /// Share of bootstrap samples outside the interval for --error-bars ci
        #[arg(long, default_value = "0.05")]
        ci_alpha: f64,

        /// What the bootstrap resampled: rdm, pattern or both
        #[arg(long, value_parser = ["rdm", "pattern", "both"])]
        resampling: Option<String>,

        /// Write the summary as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Default number of cross-validation groups
    KDefault {
        /// Number of conditions (patterns)
        #[arg(long, required_unless_present = "rdms")]
        patterns: Option<usize>,

        /// Number of RDMs (subjects)
        #[arg(long)]
        rdms: Option<usize>,

        /// Rescale to the items retained by a bootstrap sample
        #[arg(long)]
        bootstrap: bool,
    },
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Pool {
            input,
            method,
            output,
        } => commands::pool::run(commands::pool::PoolCommandConfig {
            input_path: &input,
            method: &method,
            output_path: output.as_deref(),
        }),
        Commands::PairTest { input, output } => {
            commands::pair_test::run(commands::pair_test::PairTestCommandConfig {
                input_path: &input,
                output_path: output.as_deref(),
            })
        }
        Commands::TTest {
            input,
            variances,
            dof,
            output,
        } => commands::ttest::run(commands::ttest::TTestCommandConfig {
            input_path: &input,
            variances_path: &variances,
            dof,
            kind: commands::ttest::TTestKind::Pairwise,
            output_path: output.as_deref(),
        }),
        Commands::TTestZero {
            input,
            variances,
            dof,
            output,
        } => commands::ttest::run(commands::ttest::TTestCommandConfig {
            input_path: &input,
            variances_path: &variances,
            dof,
            kind: commands::ttest::TTestKind::Zero,
            output_path: output.as_deref(),
        }),
        Commands::TTestNc {
            input,
            variances,
            noise_ceiling,
            ceiling_variance,
            ceiling_covariance,
            dof,
            output,
        } => commands::ttest::run(commands::ttest::TTestCommandConfig {
            input_path: &input,
            variances_path: &variances,
            dof,
            kind: commands::ttest::TTestKind::NoiseCeiling {
                noise_ceiling,
                ceiling_variance,
                ceiling_covariance_path: ceiling_covariance.as_deref(),
            },
            output_path: output.as_deref(),
        }),
        Commands::Compare {
            input,
            alpha,
            correction,
            sort,
            error_bars,
            ci_alpha,
            resampling,
            output,
        } => commands::compare::run(commands::compare::CompareCommandConfig {
            input_path: &input,
            alpha,
            correction: &correction,
            sort: &sort,
            error_bars: &error_bars,
            ci_alpha,
            resampling: resampling.as_deref(),
            output_path: output.as_deref(),
        }),
        Commands::KDefault {
            patterns,
            rdms,
            bootstrap,
        } => commands::k_default::run(commands::k_default::KDefaultCommandConfig {
            patterns,
            rdms,
            bootstrap,
        }),
    }
}
