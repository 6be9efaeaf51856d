use anyhow::Context;

use crate::planner::OptimizerSettings;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub cors_origins: Vec<String>,
    pub planner_max_iterations: usize,
    pub planner_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let planner_max_iterations: usize = std::env::var("PLANNER_MAX_ITERATIONS")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("PLANNER_MAX_ITERATIONS must be a number")?;
        if planner_max_iterations == 0 {
            anyhow::bail!("PLANNER_MAX_ITERATIONS must be greater than 0");
        }

        let planner_seed: Option<u64> = match std::env::var("PLANNER_SEED") {
            Ok(raw) => Some(raw.parse().context("PLANNER_SEED must be an unsigned integer")?),
            Err(_) => None,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            planner_max_iterations,
            planner_seed,
        })
    }

    pub fn optimizer_settings(&self) -> OptimizerSettings {
        OptimizerSettings {
            max_iterations: self.planner_max_iterations,
            seed: self.planner_seed,
            ..OptimizerSettings::default()
        }
    }
}
