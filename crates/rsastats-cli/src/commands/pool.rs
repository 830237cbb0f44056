use rsastats_core::{PoolMethod, RdmsRecord, pool_rdm};

pub struct PoolCommandConfig<'a> {
    pub input_path: &'a str,
    pub method: &'a str,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: PoolCommandConfig<'_>) {
    let method: PoolMethod = cfg.method.parse().unwrap_or_else(|e| super::fail(e));
    let rdms = super::load_rdms(cfg.input_path).unwrap_or_else(|e| super::fail(e));

    println!(
        "Pooling {} RDM(s) over {} conditions (method: {method})",
        rdms.n_rdm(),
        rdms.n_cond()
    );
    let pooled = pool_rdm(&rdms, method);

    let vector = pooled.vectors().row(0).to_owned();
    let missing = vector.iter().filter(|v| v.is_nan()).count();
    println!("  {} dissimilarities, {missing} unobserved", vector.len());

    match cfg.output_path {
        Some(path) => {
            let json = serde_json::to_value(RdmsRecord::from(&pooled))
                .unwrap_or_else(|e| super::fail(e));
            super::write_json(path, &json).unwrap_or_else(|e| super::fail(e));
            println!("\nPooled RDM written to {path}");
        }
        None => {
            let values: Vec<String> = vector.iter().map(|v| format!("{v:.4}")).collect();
            println!("  [{}]", values.join(", "));
        }
    }
}
