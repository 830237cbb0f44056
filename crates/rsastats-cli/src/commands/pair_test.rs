use rsastats_tests::pair_tests;
use serde_json::json;

pub struct PairTestCommandConfig<'a> {
    pub input_path: &'a str,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: PairTestCommandConfig<'_>) {
    let (evals, names) = super::load_evaluations(cfg.input_path).unwrap_or_else(|e| super::fail(e));
    let p = pair_tests(&evals).unwrap_or_else(|e| super::fail(e));

    println!(
        "Bootstrap pairwise test: {} models, {} samples\n",
        evals.n_models(),
        evals.n_samples()
    );
    super::print_p_matrix(&names, p.view());

    if let Some(path) = cfg.output_path {
        let json = json!({
            "test": "bootstrap",
            "models": names,
            "n_samples": evals.n_samples(),
            "p_values": super::matrix_rows(p.view()),
        });
        super::write_json(path, &json).unwrap_or_else(|e| super::fail(e));
        println!("\nResults written to {path}");
    }
}
