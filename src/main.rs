use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use argh::FromArgs;
use drone_sim::{
    SimConfig, Simulation,
    record::{TrajectoryWriter, write_json},
};
use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::Vector3;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs, Debug)]
/// Random-walk kinematic simulation of a single drone.
struct Args {
    /// path to a JSON config file, command line values override it
    #[argh(option)]
    config: Option<PathBuf>,

    /// simulation timestep in seconds
    #[argh(option)]
    timestep: Option<f32>,

    /// velocity noise scale in m/s (std dev is 0.2x this)
    #[argh(option)]
    max_velocity: Option<f32>,

    /// simulated duration in seconds
    #[argh(option)]
    duration: Option<f32>,

    /// seed for the noise generator
    #[argh(option)]
    seed: Option<u64>,

    /// binary trajectory output file
    #[argh(option, default = "PathBuf::from(\"sim.dat\")")]
    output: PathBuf,

    /// also write the trajectory as JSON
    #[argh(option)]
    json: Option<PathBuf>,

    /// show a progress bar instead of printing every step
    #[argh(switch, short = 'q')]
    quiet: bool,
}

impl Args {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SimConfig::default(),
        };
        if let Some(timestep) = self.timestep {
            config.timestep = timestep;
        }
        if let Some(max_velocity) = self.max_velocity {
            config.max_velocity = max_velocity;
        }
        if let Some(duration) = self.duration {
            config.duration = duration;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn fmt_vec(v: &Vector3<f32>) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("drone_sim=info".parse()?))
        .init();

    let args: Args = argh::from_env();
    let config = args.sim_config()?;
    info!(?config, "Simulating drone");

    let mut sim = Simulation::new(&config)?;
    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = TrajectoryWriter::new(file);
    let mut samples = Vec::new();

    let pbar = if args.quiet {
        let pbar = ProgressBar::new(sim.total_steps() as u64);
        pbar.set_style(ProgressStyle::with_template(
            "[{elapsed_precise}/{eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
        )?);
        Some(pbar)
    } else {
        None
    };

    let summary = sim.run(|sample| {
        writer.write(sample)?;
        if args.json.is_some() {
            samples.push(*sample);
        }
        match &pbar {
            Some(pbar) => pbar.inc(1),
            None => println!(
                "{}] Position: {}, Velocity: {}",
                sample.index,
                fmt_vec(&sample.position),
                fmt_vec(&sample.velocity)
            ),
        }
        Ok(())
    })?;
    if let Some(pbar) = pbar {
        pbar.finish();
    }

    let (records, _) = writer.finish()?;
    info!(records, path = %args.output.display(), "trajectory written");

    if let Some(path) = &args.json {
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_json(file, &samples)?;
        info!(path = %path.display(), "JSON trajectory written");
    }

    println!(
        "\nSimulation took {} milliseconds to simulate {} timesteps ({} seconds).",
        summary.elapsed.as_millis(),
        summary.steps,
        config.duration
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: Option<PathBuf>) -> Args {
        Args {
            config,
            timestep: None,
            max_velocity: None,
            duration: None,
            seed: None,
            output: PathBuf::from("sim.dat"),
            json: None,
            quiet: false,
        }
    }

    #[test]
    fn test_overrides_fix_invalid_file_config() {
        let path = std::env::temp_dir().join(format!("drone_sim_cli_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"timestep": 0.0, "duration": 1.0}"#).unwrap();

        let mut cli = args(Some(path.clone()));
        assert!(cli.sim_config().is_err());

        cli.timestep = Some(0.02);
        cli.seed = Some(4);
        let config = cli.sim_config().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.timestep, 0.02);
        assert_eq!(config.seed, Some(4));
        assert_eq!(config.total_steps(), 50);
    }

    #[test]
    fn test_defaults_without_config_file() {
        let config = args(None).sim_config().unwrap();
        assert_eq!(config, SimConfig::default());
    }
}
