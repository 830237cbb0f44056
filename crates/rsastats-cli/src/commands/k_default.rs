use rsastats_core::crossval::{
    bootstrap_retained, default_k_pattern, default_k_pattern_bootstrap, default_k_rdm,
    default_k_rdm_bootstrap,
};

pub struct KDefaultCommandConfig {
    pub patterns: Option<usize>,
    pub rdms: Option<usize>,
    pub bootstrap: bool,
}

/// `(what, n, k)` lines for the requested counts.
pub fn group_counts(cfg: &KDefaultCommandConfig) -> Vec<(&'static str, usize, usize)> {
    let mut out = Vec::new();
    if let Some(n) = cfg.patterns {
        let k = if cfg.bootstrap {
            default_k_pattern_bootstrap(n)
        } else {
            default_k_pattern(n)
        };
        out.push(("patterns", n, k));
    }
    if let Some(n) = cfg.rdms {
        let k = if cfg.bootstrap {
            default_k_rdm_bootstrap(n)
        } else {
            default_k_rdm(n)
        };
        out.push(("rdms", n, k));
    }
    out
}

pub fn run(cfg: KDefaultCommandConfig) {
    let counts = group_counts(&cfg);
    if counts.is_empty() {
        super::fail("pass --patterns <n> and/or --rdms <n>");
    }
    for (what, n, k) in counts {
        if cfg.bootstrap {
            println!(
                "{what}: {k} groups for n = {n} (~{} retained per bootstrap sample)",
                bootstrap_retained(n)
            );
        } else {
            println!("{what}: {k} groups for n = {n}");
        }
    }
}
