use rsastats_tests::{
    ComparisonConfig, ErrorBars, ModelComparison, MultipleTesting, Resampling, SortOrder,
    compare_models,
};
use serde_json::json;

pub struct CompareCommandConfig<'a> {
    pub input_path: &'a str,
    pub alpha: f64,
    pub correction: &'a str,
    pub sort: &'a str,
    pub error_bars: &'a str,
    pub ci_alpha: f64,
    pub resampling: Option<&'a str>,
    pub output_path: Option<&'a str>,
}

/// Turn the command-line strings into a [`ComparisonConfig`].
pub fn comparison_config(cfg: &CompareCommandConfig<'_>) -> Result<ComparisonConfig, String> {
    let correction: MultipleTesting = cfg.correction.parse().map_err(|e| format!("{e}"))?;
    let sort: SortOrder = cfg.sort.parse().map_err(|e| format!("{e}"))?;
    let error_bars = match cfg.error_bars.to_ascii_lowercase().as_str() {
        "sem" => ErrorBars::Sem,
        "ci" => ErrorBars::Ci {
            alpha: cfg.ci_alpha,
        },
        other => return Err(format!("unknown error bar kind '{other}' (expected sem or ci)")),
    };
    let resampling = cfg
        .resampling
        .map(str::parse::<Resampling>)
        .transpose()
        .map_err(|e| format!("{e}"))?;
    Ok(ComparisonConfig {
        alpha: cfg.alpha,
        correction,
        sort,
        error_bars,
        resampling,
    })
}

pub fn run(cfg: CompareCommandConfig<'_>) {
    let config = comparison_config(&cfg).unwrap_or_else(|e| super::fail(e));
    let (evals, names) = super::load_evaluations(cfg.input_path).unwrap_or_else(|e| super::fail(e));
    let summary = compare_models(&evals, &names, &config).unwrap_or_else(|e| super::fail(e));

    print_summary(&summary);

    if let Some(path) = cfg.output_path {
        let json = json!({
            "models": summary.models,
            "means": summary.means.to_vec(),
            "error_low": summary.error_low.to_vec(),
            "error_high": summary.error_high.to_vec(),
            "p_values": super::matrix_rows(summary.p_values.view()),
            "threshold": summary.threshold,
            "significant": summary
                .significant
                .outer_iter()
                .map(|row| row.to_vec())
                .collect::<Vec<_>>(),
            "n_samples": summary.n_samples,
            "config": config,
            "description": summary.description,
        });
        super::write_json(path, &json).unwrap_or_else(|e| super::fail(e));
        println!("\nResults written to {path}");
    }
}

fn print_summary(summary: &ModelComparison) {
    let width = summary
        .models
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(8);
    println!("Model comparison over {} bootstrap samples\n", summary.n_samples);
    println!(
        "  {:<width$} {:>9} {:>9} {:>9}",
        "Model", "Mean", "-Err", "+Err"
    );
    println!("  {}", "-".repeat(width + 30));
    for (k, name) in summary.models.iter().enumerate() {
        println!(
            "  {name:<width$} {:>9.4} {:>9.4} {:>9.4}",
            summary.means[k], summary.error_low[k], summary.error_high[k]
        );
    }

    println!("\nSignificant pairs (p < {:.4}):", summary.threshold);
    let mut any = false;
    for (i, row) in summary.significant.outer_iter().enumerate() {
        for (j, &significant) in row.iter().enumerate().skip(i + 1) {
            if significant {
                any = true;
                println!(
                    "  {} vs {}  p = {:.4}",
                    summary.models[i], summary.models[j], summary.p_values[[i, j]]
                );
            }
        }
    }
    if !any {
        println!("  none");
    }
    println!("\n{}", summary.description);
}
