use rsastats_tests::{CeilingVariance, t_test_0, t_test_nc, t_tests};
use serde_json::json;

/// Which of the three parametric tests to run.
pub enum TTestKind<'a> {
    Pairwise,
    Zero,
    NoiseCeiling {
        noise_ceiling: f64,
        ceiling_variance: Option<f64>,
        ceiling_covariance_path: Option<&'a str>,
    },
}

pub struct TTestCommandConfig<'a> {
    pub input_path: &'a str,
    pub variances_path: &'a str,
    pub dof: f64,
    pub kind: TTestKind<'a>,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: TTestCommandConfig<'_>) {
    let (evals, names) = super::load_evaluations(cfg.input_path).unwrap_or_else(|e| super::fail(e));
    let variances = super::load_variances(cfg.variances_path).unwrap_or_else(|e| super::fail(e));

    let json = match cfg.kind {
        TTestKind::Pairwise => {
            let p = t_tests(&evals, Some(&variances), cfg.dof).unwrap_or_else(|e| super::fail(e));
            println!("Pairwise t-test (dof = {})\n", cfg.dof);
            super::print_p_matrix(&names, p.view());
            json!({
                "test": "t_tests",
                "dof": cfg.dof,
                "models": names,
                "p_values": super::matrix_rows(p.view()),
            })
        }
        TTestKind::Zero => {
            let p = t_test_0(&evals, Some(&variances), cfg.dof).unwrap_or_else(|e| super::fail(e));
            println!("One-sided t-test against 0 (dof = {})\n", cfg.dof);
            super::print_p_vector(&names, p.view());
            json!({
                "test": "t_test_0",
                "dof": cfg.dof,
                "models": names,
                "p_values": p.to_vec(),
            })
        }
        TTestKind::NoiseCeiling {
            noise_ceiling,
            ceiling_variance,
            ceiling_covariance_path,
        } => {
            let ceiling = ceiling_mode(ceiling_variance, ceiling_covariance_path)
                .unwrap_or_else(|e| super::fail(e));
            let p = t_test_nc(&evals, Some(&variances), noise_ceiling, &ceiling, cfg.dof)
                .unwrap_or_else(|e| super::fail(e));
            println!(
                "Two-sided t-test against noise ceiling {noise_ceiling} (dof = {})\n",
                cfg.dof
            );
            super::print_p_vector(&names, p.view());
            json!({
                "test": "t_test_nc",
                "dof": cfg.dof,
                "noise_ceiling": noise_ceiling,
                "models": names,
                "p_values": p.to_vec(),
            })
        }
    };

    if let Some(path) = cfg.output_path {
        super::write_json(path, &json).unwrap_or_else(|e| super::fail(e));
        println!("\nResults written to {path}");
    }
}

/// Noise-ceiling uncertainty from the command-line options.
pub fn ceiling_mode(
    ceiling_variance: Option<f64>,
    ceiling_covariance_path: Option<&str>,
) -> Result<CeilingVariance, String> {
    match (ceiling_variance, ceiling_covariance_path) {
        (Some(_), Some(_)) => {
            Err("--ceiling-variance and --ceiling-covariance are mutually exclusive".into())
        }
        (Some(s), None) => Ok(CeilingVariance::IndependentCeilingVariance(s)),
        (None, Some(path)) => {
            let values: Vec<f64> = super::read_json(path)?;
            Ok(CeilingVariance::PairedCeilingVariance(values.into()))
        }
        (None, None) => Ok(CeilingVariance::NoCeilingVariance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;

    #[test]
    fn test_ceiling_mode_selection() {
        assert_eq!(ceiling_mode(None, None).unwrap(), CeilingVariance::NoCeilingVariance);
        assert_eq!(
            ceiling_mode(Some(0.02), None).unwrap(),
            CeilingVariance::IndependentCeilingVariance(0.02)
        );
        assert!(ceiling_mode(Some(0.02), Some("c.json")).is_err());
    }

    #[test]
    fn test_ceiling_covariance_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[0.01, 0.02, 0.05]").unwrap();
        let mode = ceiling_mode(None, file.path().to_str()).unwrap();
        assert_eq!(
            mode,
            CeilingVariance::PairedCeilingVariance(array![0.01, 0.02, 0.05])
        );
    }
}
